//! Fuzz target: `AlarmController` driven by arbitrary input
//!
//! Each input byte is one operation: a noise sample, a code submission,
//! or a clock jump.  After every tick the controller's mode flags and
//! armed timers must agree with its state.
//!
//! Invariants checked:
//! - No panics under any operation sequence
//! - `block_input` is set only in Settling; `disabled` only in Disabled
//! - Alerting owns escalation + code-check, Sounding only code-check,
//!   Settling only settle, Monitoring and Disabled nothing
//!
//! cargo fuzz run fuzz_controller

#![no_main]

use chrono::{DateTime, Utc};
use libfuzzer_sys::fuzz_target;
use quietguard::app::commands::CodeSubmission;
use quietguard::app::events::AlarmEvent;
use quietguard::app::ports::{BoardPort, EventSink, Indicator};
use quietguard::app::service::AlarmController;
use quietguard::config::SystemConfig;
use quietguard::channels::SubmissionInbox;
use quietguard::error::InitError;
use quietguard::fsm::StateId;
use quietguard::timers::TimerSlot;

struct Board(Option<u32>);

impl BoardPort for Board {
    fn init(&mut self, _: &SystemConfig) -> Result<(), InitError> {
        Ok(())
    }
    fn set_indicator(&mut self, _: Indicator) {}
    fn set_display(&mut self, _: &str, _: u8) {}
    fn sample_noise(&mut self, _: u32) -> Option<u32> {
        self.0
    }
}

struct Discard;

impl EventSink for Discard {
    fn record(&mut self, _: &AlarmEvent, _: DateTime<Utc>) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig {
        escalation_secs: 1,
        settle_secs: 1,
        ..SystemConfig::default()
    };
    let inbox = SubmissionInbox::new();
    let mut ctl = AlarmController::new(&config, inbox.clone());
    let (mut board, mut sink) = (Board(Some(0)), Discard);
    let mut now: u64 = 0;
    ctl.start(now, &mut board, &mut sink);

    for &op in data {
        match op >> 5 {
            0 => board.0 = None,
            1 | 2 => board.0 = Some(u32::from(op & 0x1F) * 4),
            3 => {
                inbox.submit(CodeSubmission::defuse(if op & 1 == 0 { "1234" } else { "9" }));
            }
            4 => {
                inbox.submit(CodeSubmission::disable(if op & 1 == 0 { "1234" } else { "9" }));
            }
            _ => now += u64::from(op & 0x1F) * 100,
        }
        now += 20;
        ctl.tick(now, &mut board, &mut sink);

        let armed = ctl.armed_timers();
        let expected: &[TimerSlot] = match ctl.state() {
            StateId::Alerting => &[TimerSlot::Escalation, TimerSlot::CodeCheck],
            StateId::Sounding => &[TimerSlot::CodeCheck],
            StateId::Settling => &[TimerSlot::Settle],
            StateId::Monitoring | StateId::Disabled => &[],
        };
        assert_eq!(armed.as_slice(), expected, "timers out of step in {:?}", ctl.state());
        assert_eq!(ctl.is_input_blocked(), ctl.state() == StateId::Settling);
        assert_eq!(ctl.is_disabled(), ctl.state() == StateId::Disabled);
        assert_eq!(ctl.alarm_active(), ctl.state() == StateId::Sounding);
    }
});
