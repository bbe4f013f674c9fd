//! Application service — the hexagonal core.
//!
//! [`AlarmController`] owns the FSM and its context.  All I/O flows
//! through port traits injected at call sites, so the whole controller is
//! testable with mock adapters and a synthetic clock.
//!
//! ```text
//!  SubmissionInbox ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                      │    AlarmController      │
//!        BoardPort ◀──▶│  FSM · timers · code    │
//!                      └────────────────────────┘
//! ```

use chrono::Utc;
use log::{debug, info};

use crate::channels::SubmissionInbox;
use crate::config::SystemConfig;
use crate::fsm::context::AlarmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::timers::TimerSlot;

use super::ports::{BoardPort, EventSink};

// ───────────────────────────────────────────────────────────────
// AlarmController
// ───────────────────────────────────────────────────────────────

/// The controller orchestrates all domain logic.
pub struct AlarmController {
    fsm: Fsm,
    ctx: AlarmContext,
    inbox: SubmissionInbox,
    started: bool,
}

impl AlarmController {
    /// Construct the controller from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig, inbox: SubmissionInbox) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Monitoring),
            ctx: AlarmContext::new(config),
            inbox,
            started: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter Monitoring, paint the panel and emit `looking-for-noise`.
    pub fn start(&mut self, now_ms: u64, board: &mut impl BoardPort, sink: &mut impl EventSink) {
        if self.started {
            return;
        }
        self.started = true;
        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        self.flush(board, sink);
        info!("AlarmController started in {}", self.fsm.current_name());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cycle: drain submissions → sample → FSM → panel → events.
    ///
    /// The sensor is read only while Monitoring; every other mode either
    /// has a cycle in progress or has polling suspended.
    pub fn tick(&mut self, now_ms: u64, board: &mut impl BoardPort, sink: &mut impl EventSink) {
        if !self.started {
            self.start(now_ms, board, sink);
        }
        self.ctx.now_ms = now_ms;

        // 1. Submissions from the endpoint, oldest first
        self.inbox.drain_into(&mut self.ctx.pending);

        // 2. Noise sample
        self.ctx.noise = if self.fsm.current_state() == StateId::Monitoring && !self.ctx.disabled
        {
            board.sample_noise(self.ctx.noise_threshold)
        } else {
            None
        };

        // 3. FSM tick (pure state logic)
        let prev = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        let next = self.fsm.current_state();
        if next != prev {
            debug!("AlarmController: {prev:?} -> {next:?} at {now_ms} ms");
        }

        // 4. Panel + events
        self.flush(board, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_disabled(&self) -> bool {
        self.ctx.disabled
    }

    pub fn is_input_blocked(&self) -> bool {
        self.ctx.block_input
    }

    pub fn alarm_active(&self) -> bool {
        self.ctx.alarm_active
    }

    /// Timer slots currently armed, in slot order.
    pub fn armed_timers(&self) -> Vec<TimerSlot> {
        self.ctx.timers.armed().collect()
    }

    /// Deadline of `slot` on the controller clock, if armed.
    pub fn timer_deadline(&self, slot: TimerSlot) -> Option<u64> {
        self.ctx.timers.deadline(slot)
    }

    /// Submissions received but not yet evaluated.
    pub fn pending_submissions(&self) -> usize {
        self.ctx.pending.len() + self.inbox.len()
    }

    /// Handle for producers (the admission endpoint).
    pub fn inbox(&self) -> SubmissionInbox {
        self.inbox.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Push panel changes to the board and hand queued events to the sink.
    fn flush(&mut self, board: &mut impl BoardPort, sink: &mut impl EventSink) {
        if self.ctx.panel.dirty {
            board.set_indicator(self.ctx.panel.indicator);
            board.set_display(&self.ctx.panel.text, 0);
            self.ctx.panel.dirty = false;
        }

        if !self.ctx.outbox.is_empty() {
            let at = Utc::now();
            for event in self.ctx.outbox.drain(..) {
                sink.record(&event, at);
            }
        }
    }
}
