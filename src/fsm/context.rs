//! Shared mutable context threaded through every FSM handler.
//!
//! `AlarmContext` is the single struct that state handlers read from and
//! write to: the latest noise sample, queued code submissions, the timer
//! bank, panel outputs and the events produced this tick.  The controller
//! fills the inputs before each tick and drains the outputs after it.

use std::collections::VecDeque;

use crate::app::commands::{CodeSubmission, Purpose};
use crate::app::events::AlarmEvent;
use crate::app::ports::Indicator;
use crate::auth::AccessCode;
use crate::config::SystemConfig;
use crate::timers::TimerBank;

// ---------------------------------------------------------------------------
// Timing (copied out of SystemConfig once, in milliseconds)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub code_check_ms: u64,
    pub escalation_ms: u64,
    pub settle_ms: u64,
}

impl Timing {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            code_check_ms: u64::from(config.code_check_interval_ms),
            escalation_ms: u64::from(config.escalation_secs) * 1000,
            settle_ms: u64::from(config.settle_secs) * 1000,
        }
    }

    /// Settle window in whole seconds, as shown on the display.
    pub fn settle_secs(&self) -> u64 {
        self.settle_ms / 1000
    }
}

// ---------------------------------------------------------------------------
// Panel outputs (written by state handlers; applied to the board by the controller)
// ---------------------------------------------------------------------------

/// What the indicator and display should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOutputs {
    pub indicator: Indicator,
    pub text: String,
    /// Set when either field changed since the controller last applied it.
    pub dirty: bool,
}

impl Default for PanelOutputs {
    fn default() -> Self {
        Self {
            indicator: Indicator::Black,
            text: String::new(),
            dirty: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AlarmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct AlarmContext {
    // -- Timing --
    /// Controller clock at the start of this tick (milliseconds).
    pub now_ms: u64,
    pub timing: Timing,

    // -- Access control --
    pub access_code: AccessCode,
    /// Samples at or above this level are loud.
    pub noise_threshold: u32,
    /// Submissions are dropped without an event while set.
    pub block_input: bool,
    /// Survives alert cycles; only a valid defuse clears it.
    pub disabled: bool,
    /// The alarm has sounded and not yet been silenced.
    pub alarm_active: bool,

    // -- Inputs (filled before each tick) --
    /// This tick's noise sample, `None` when the sensor was not read or
    /// had nothing to report.
    pub noise: Option<u32>,
    /// Whether the previous Monitoring sample was loud.
    pub prev_loud: bool,
    /// Submissions awaiting evaluation, oldest first.
    pub pending: VecDeque<CodeSubmission>,

    // -- Timers --
    pub timers: TimerBank,

    // -- Outputs (drained after each tick) --
    pub panel: PanelOutputs,
    pub outbox: Vec<AlarmEvent>,
}

impl AlarmContext {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            now_ms: 0,
            timing: Timing::from_config(config),
            access_code: AccessCode::new(&config.access_code),
            noise_threshold: config.noise_threshold,
            block_input: false,
            disabled: false,
            alarm_active: false,
            noise: None,
            prev_loud: false,
            pending: VecDeque::new(),
            timers: TimerBank::new(),
            panel: PanelOutputs::default(),
            outbox: Vec::new(),
        }
    }

    /// Queue an event for the sink.
    pub fn log(&mut self, event: AlarmEvent) {
        self.outbox.push(event);
    }

    /// Request new panel contents.
    pub fn show(&mut self, indicator: Indicator, text: &str) {
        if self.panel.indicator != indicator || self.panel.text != text {
            self.panel.indicator = indicator;
            self.panel.text.clear();
            self.panel.text.push_str(text);
            self.panel.dirty = true;
        }
    }

    /// Is this tick's sample loud?  A missing sample is quiet.
    pub fn is_loud(&self) -> bool {
        self.noise.is_some_and(|level| level >= self.noise_threshold)
    }

    /// Evaluate pending submissions in arrival order.
    ///
    /// Returns the purpose of the first valid one; submissions queued
    /// behind it stay pending.  While `block_input` is set every
    /// submission is dropped without an event.  Each wrong code logs
    /// `invalid-code <value>`.
    pub fn take_valid_submission(&mut self) -> Option<Purpose> {
        while let Some(submission) = self.pending.pop_front() {
            if self.block_input {
                continue;
            }
            if self.access_code.matches(&submission.code) {
                return Some(submission.purpose);
            }
            self.log(AlarmEvent::InvalidCode(submission.code));
        }
        None
    }

    /// Close out the submissions that were queued behind an accepted code.
    /// They arrived before input was blocked, so each wrong one still logs
    /// `invalid-code <value>`; further valid ones are dropped.
    pub fn reject_remaining(&mut self) {
        for submission in core::mem::take(&mut self.pending) {
            if !self.access_code.matches(&submission.code) {
                self.log(AlarmEvent::InvalidCode(submission.code));
            }
        }
    }

    /// Drop every pending submission without an event.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }
}
