//! Mock board and event recorder for integration tests.
//!
//! The board returns whatever noise level the test sets and records every
//! panel write so tests can assert on the full history without hardware.

use chrono::{DateTime, Utc};
use quietguard::app::events::AlarmEvent;
use quietguard::app::ports::{BoardPort, EventSink, Indicator};
use quietguard::app::service::AlarmController;
use quietguard::channels::SubmissionInbox;
use quietguard::config::SystemConfig;
use quietguard::error::InitError;

// ── MockBoard ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Indicator(Indicator),
    Text(String),
}

#[derive(Default)]
pub struct MockBoard {
    /// Level reported by the next samples; `None` means no sample.
    pub level: Option<u32>,
    pub samples: usize,
    pub panel: Vec<PanelCall>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn quiet() -> Self {
        Self {
            level: Some(0),
            ..Self::default()
        }
    }

    pub fn last_indicator(&self) -> Option<Indicator> {
        self.panel.iter().rev().find_map(|c| match c {
            PanelCall::Indicator(i) => Some(*i),
            PanelCall::Text(_) => None,
        })
    }

    pub fn last_text(&self) -> Option<&str> {
        self.panel.iter().rev().find_map(|c| match c {
            PanelCall::Text(t) => Some(t.as_str()),
            PanelCall::Indicator(_) => None,
        })
    }
}

impl BoardPort for MockBoard {
    fn init(&mut self, _config: &SystemConfig) -> Result<(), InitError> {
        Ok(())
    }

    fn set_indicator(&mut self, colour: Indicator) {
        self.panel.push(PanelCall::Indicator(colour));
    }

    fn set_display(&mut self, text: &str, _line: u8) {
        self.panel.push(PanelCall::Text(text.to_owned()));
    }

    fn sample_noise(&mut self, _threshold: u32) -> Option<u32> {
        self.samples += 1;
        self.level
    }
}

// ── Recorder ──────────────────────────────────────────────────

#[derive(Default)]
pub struct Recorder {
    pub events: Vec<AlarmEvent>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn names(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    /// Drain and return what was recorded so far.
    pub fn take(&mut self) -> Vec<AlarmEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for Recorder {
    fn record(&mut self, event: &AlarmEvent, _at: DateTime<Utc>) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Config with one-second escalation and settle windows.
pub fn fast_config() -> SystemConfig {
    SystemConfig {
        escalation_secs: 1,
        settle_secs: 1,
        poll_interval_ms: 20,
        code_check_interval_ms: 100,
        ..SystemConfig::default()
    }
}

/// Controller wired to a mock board, a recorder and a synthetic clock.
pub struct Rig {
    pub ctl: AlarmController,
    pub board: MockBoard,
    pub sink: Recorder,
    pub inbox: SubmissionInbox,
    pub now_ms: u64,
    pub step_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: &SystemConfig) -> Self {
        let inbox = SubmissionInbox::new();
        let mut rig = Self {
            ctl: AlarmController::new(config, inbox.clone()),
            board: MockBoard::quiet(),
            sink: Recorder::default(),
            inbox,
            now_ms: 0,
            step_ms: u64::from(config.poll_interval_ms),
        };
        rig.ctl.start(0, &mut rig.board, &mut rig.sink);
        rig
    }

    pub fn fast() -> Self {
        Self::new(&fast_config())
    }

    /// Advance one poll interval and tick.
    pub fn step(&mut self) {
        self.now_ms += self.step_ms;
        self.ctl.tick(self.now_ms, &mut self.board, &mut self.sink);
    }

    /// Step until the clock reaches `t_ms`.
    pub fn run_until(&mut self, t_ms: u64) {
        while self.now_ms + self.step_ms <= t_ms {
            self.step();
        }
    }

    /// Step `n` times.
    pub fn steps(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// One loud sample, then quiet again.
    pub fn clap(&mut self) {
        self.board.level = Some(1000);
        self.step();
        self.board.level = Some(0);
    }
}
