//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch.
//!
//! ```text
//!  MONITORING ──[quiet→loud]──▶ ALERTING ──[escalation]──▶ SOUNDING
//!     ▲  │                         │                          │
//!     │  │                    [valid code]               [valid code]
//!     │  │                         ▼                          ▼
//!     │  └──[valid defuse]──▶  SETTLING ◀──────[defuse]───────┤
//!     │                           │                           │
//!     └────────[settle fires]─────┘                      [disable]
//!                                 ▲                           ▼
//!                                 └───────[defuse]──────  DISABLED
//! ```
//!
//! A valid disable from Monitoring goes straight to Disabled.

use super::context::AlarmContext;
use super::{StateDescriptor, StateId};
use crate::app::commands::Purpose;
use crate::app::events::AlarmEvent;
use crate::app::ports::Indicator;
use crate::timers::TimerSlot;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Monitoring
        StateDescriptor {
            id: StateId::Monitoring,
            name: "Monitoring",
            on_enter: Some(monitoring_enter),
            on_exit: None,
            on_update: monitoring_update,
        },
        // Index 1 — Alerting
        StateDescriptor {
            id: StateId::Alerting,
            name: "Alerting",
            on_enter: Some(alerting_enter),
            on_exit: None,
            on_update: alerting_update,
        },
        // Index 2 — Sounding
        StateDescriptor {
            id: StateId::Sounding,
            name: "Sounding",
            on_enter: Some(sounding_enter),
            on_exit: None,
            on_update: sounding_update,
        },
        // Index 3 — Settling
        StateDescriptor {
            id: StateId::Settling,
            name: "Settling",
            on_enter: Some(settling_enter),
            on_exit: Some(settling_exit),
            on_update: settling_update,
        },
        // Index 4 — Disabled
        StateDescriptor {
            id: StateId::Disabled,
            name: "Disabled",
            on_enter: Some(disabled_enter),
            on_exit: None,
            on_update: disabled_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared: accepting a valid code
// ═══════════════════════════════════════════════════════════════════════════

/// Apply a validated submission and pick the next state.
///
/// Emits `validated-entry`, then `alarm-stopping` if the alarm was
/// sounding.  Escalation and code-check are cancelled before leaving.
fn accept(ctx: &mut AlarmContext, purpose: Purpose) -> StateId {
    ctx.log(AlarmEvent::ValidatedEntry);
    if ctx.alarm_active {
        ctx.alarm_active = false;
        ctx.log(AlarmEvent::AlarmStopping);
    }
    ctx.timers.cancel(TimerSlot::Escalation);
    ctx.timers.cancel(TimerSlot::CodeCheck);

    match purpose {
        Purpose::Disable => {
            ctx.disabled = true;
            StateId::Disabled
        }
        Purpose::Defuse => {
            ctx.disabled = false;
            StateId::Settling
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MONITORING — polling for a quiet→loud edge
// ═══════════════════════════════════════════════════════════════════════════

fn monitoring_enter(ctx: &mut AlarmContext) {
    ctx.prev_loud = false;
    ctx.log(AlarmEvent::LookingForNoise);
    ctx.show(Indicator::White, "READY");
    info!("MONITORING: threshold {}", ctx.noise_threshold);
}

fn monitoring_update(ctx: &mut AlarmContext) -> Option<StateId> {
    if let Some(purpose) = ctx.take_valid_submission() {
        return Some(accept(ctx, purpose));
    }

    let loud = ctx.is_loud();
    let edge = !ctx.prev_loud && loud;
    ctx.prev_loud = loud;

    if edge && !ctx.disabled {
        info!("MONITORING: noise edge at level {:?}", ctx.noise);
        return Some(StateId::Alerting);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALERTING — countdown running, waiting for a code
// ═══════════════════════════════════════════════════════════════════════════

fn alerting_enter(ctx: &mut AlarmContext) {
    ctx.log(AlarmEvent::NoiseDetected);
    ctx.show(Indicator::Blue, "ALERT");

    let now = ctx.now_ms;
    let (escalation_ms, check_ms) = (ctx.timing.escalation_ms, ctx.timing.code_check_ms);
    ctx.timers.arm_once(TimerSlot::Escalation, now, escalation_ms);
    ctx.timers.arm_every(TimerSlot::CodeCheck, now, check_ms);
    info!("ALERTING: escalation in {escalation_ms} ms");
}

fn alerting_update(ctx: &mut AlarmContext) -> Option<StateId> {
    let now = ctx.now_ms;
    let escalate = ctx.timers.poll(TimerSlot::Escalation, now);
    let check = ctx.timers.poll(TimerSlot::CodeCheck, now);

    // Codes queued before the deadline tick win over the deadline.
    if check || escalate {
        if let Some(purpose) = ctx.take_valid_submission() {
            return Some(accept(ctx, purpose));
        }
    }

    escalate.then_some(StateId::Sounding)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SOUNDING — alarm on until a valid code
// ═══════════════════════════════════════════════════════════════════════════

fn sounding_enter(ctx: &mut AlarmContext) {
    ctx.alarm_active = true;
    ctx.log(AlarmEvent::AlarmStarting);
    ctx.show(Indicator::Red, "ALARM");
    info!("SOUNDING: no valid code before the deadline");
}

fn sounding_update(ctx: &mut AlarmContext) -> Option<StateId> {
    if ctx.timers.poll(TimerSlot::CodeCheck, ctx.now_ms) {
        if let Some(purpose) = ctx.take_valid_submission() {
            return Some(accept(ctx, purpose));
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SETTLING — grace period, input blocked
// ═══════════════════════════════════════════════════════════════════════════

fn settling_enter(ctx: &mut AlarmContext) {
    ctx.reject_remaining();
    ctx.block_input = true;
    ctx.log(AlarmEvent::AlarmWaiting);

    let secs = ctx.timing.settle_secs();
    ctx.show(Indicator::White, &format!("Waiting {secs}s"));

    let (now, settle_ms) = (ctx.now_ms, ctx.timing.settle_ms);
    ctx.timers.arm_once(TimerSlot::Settle, now, settle_ms);
    info!("SETTLING: input blocked for {secs}s");
}

fn settling_exit(ctx: &mut AlarmContext) {
    ctx.block_input = false;
    debug!("SETTLING: input unblocked");
}

fn settling_update(ctx: &mut AlarmContext) -> Option<StateId> {
    if !ctx.pending.is_empty() {
        debug!("SETTLING: dropping {} blocked submission(s)", ctx.pending.len());
        ctx.discard_pending();
    }

    ctx.timers
        .poll(TimerSlot::Settle, ctx.now_ms)
        .then_some(StateId::Monitoring)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISABLED — monitoring suspended until a valid defuse
// ═══════════════════════════════════════════════════════════════════════════

fn disabled_enter(ctx: &mut AlarmContext) {
    ctx.log(AlarmEvent::AlarmDisabled);
    ctx.show(Indicator::Black, "");
    info!("DISABLED: monitoring suspended");
}

fn disabled_update(ctx: &mut AlarmContext) -> Option<StateId> {
    match ctx.take_valid_submission()? {
        Purpose::Defuse => Some(accept(ctx, Purpose::Defuse)),
        Purpose::Disable => {
            // Already disabled: acknowledge without re-entering.
            accept(ctx, Purpose::Disable);
            ctx.log(AlarmEvent::AlarmDisabled);
            None
        }
    }
}
