//! Named timer slots owned by the controller.
//!
//! Every timer the state machine uses lives in a fixed slot, so there can
//! never be two escalation timers or two code-check timers alive at once:
//! arming a slot overwrites whatever it held.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  TimerBank                                                │
//! │  ┌─────────────┬───────────────┬───────────────────────┐  │
//! │  │ Escalation  │ one-shot 30 s │ Alerting → Sounding   │  │
//! │  │ CodeCheck   │ every 100 ms  │ evaluate pending code │  │
//! │  │ Settle      │ one-shot 30 s │ Settling → Monitoring │  │
//! │  └─────────────┴───────────────┴───────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Deadlines are absolute milliseconds on the controller's monotonic clock.
//! Nothing here runs on its own: the state handlers [`poll`](TimerBank::poll)
//! their slots on each tick.

use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Slot identity
// ═══════════════════════════════════════════════════════════════

/// The controller's timer classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerSlot {
    Escalation = 0,
    CodeCheck = 1,
    Settle = 2,
}

impl TimerSlot {
    /// Number of slots — used to size the bank.
    pub const COUNT: usize = 3;

    pub const ALL: [Self; Self::COUNT] = [Self::Escalation, Self::CodeCheck, Self::Settle];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Escalation => "escalation",
            Self::CodeCheck => "code_check",
            Self::Settle => "settle",
        }
    }
}

/// How an armed slot behaves once its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fire once, then the slot is empty.
    OneShot,
    /// Fire, then re-arm `period_ms` later.
    Repeating { period_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    deadline_ms: u64,
    kind: TimerKind,
}

// ═══════════════════════════════════════════════════════════════
//  Timer bank
// ═══════════════════════════════════════════════════════════════

/// Fixed set of timer slots, indexed by [`TimerSlot`].
#[derive(Debug, Default)]
pub struct TimerBank {
    slots: [Option<TimerEntry>; TimerSlot::COUNT],
}

impl TimerBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `slot` to fire once, `delay_ms` after `now_ms`.
    /// Any timer previously held by the slot is discarded.
    pub fn arm_once(&mut self, slot: TimerSlot, now_ms: u64, delay_ms: u64) {
        self.arm(slot, now_ms + delay_ms, TimerKind::OneShot);
    }

    /// Arm `slot` to fire every `period_ms`, first at `now_ms + period_ms`.
    /// Any timer previously held by the slot is discarded.
    pub fn arm_every(&mut self, slot: TimerSlot, now_ms: u64, period_ms: u64) {
        let period_ms = period_ms.max(1);
        self.arm(slot, now_ms + period_ms, TimerKind::Repeating { period_ms });
    }

    /// Disarm `slot`.  Returns `true` if something was armed.
    pub fn cancel(&mut self, slot: TimerSlot) -> bool {
        let was_armed = self.slots[slot as usize].take().is_some();
        if was_armed {
            debug!("Timers: cancelled {}", slot.label());
        }
        was_armed
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.slots[slot as usize].is_some()
    }

    /// Deadline of `slot`, if armed.
    pub fn deadline(&self, slot: TimerSlot) -> Option<u64> {
        self.slots[slot as usize].map(|e| e.deadline_ms)
    }

    /// Consume a fire of `slot` if its deadline has passed.
    ///
    /// One-shot slots are emptied.  Repeating slots move to the next
    /// period boundary after `now_ms`; missed periods are coalesced into
    /// this single fire rather than replayed.
    pub fn poll(&mut self, slot: TimerSlot, now_ms: u64) -> bool {
        let Some(entry) = self.slots[slot as usize].as_mut() else {
            return false;
        };
        if now_ms < entry.deadline_ms {
            return false;
        }
        match entry.kind {
            TimerKind::OneShot => {
                self.slots[slot as usize] = None;
                debug!("Timers: {} fired (one-shot)", slot.label());
            }
            TimerKind::Repeating { period_ms } => {
                let behind = (now_ms - entry.deadline_ms) / period_ms;
                entry.deadline_ms += (behind + 1) * period_ms;
            }
        }
        true
    }

    /// Currently armed slots, in slot order.
    pub fn armed(&self) -> impl Iterator<Item = TimerSlot> + '_ {
        TimerSlot::ALL
            .into_iter()
            .filter(|slot| self.is_armed(*slot))
    }

    /// Number of armed slots.
    pub fn armed_count(&self) -> usize {
        self.armed().count()
    }

    fn arm(&mut self, slot: TimerSlot, deadline_ms: u64, kind: TimerKind) {
        if self.slots[slot as usize].is_some() {
            debug!("Timers: re-arming {} (previous discarded)", slot.label());
        }
        self.slots[slot as usize] = Some(TimerEntry { deadline_ms, kind });
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
