//! Integration tests: AlarmController → FSM → timers → board + event log.

use quietguard::app::commands::CodeSubmission;
use quietguard::app::events::AlarmEvent;
use quietguard::app::ports::Indicator;
use quietguard::config::SystemConfig;
use quietguard::fsm::StateId;
use quietguard::timers::TimerSlot;

use super::mock_board::Rig;

fn invalid(code: &str) -> AlarmEvent {
    AlarmEvent::InvalidCode(code.into())
}

// ── Walkthroughs ──────────────────────────────────────────────

#[test]
fn startup_paints_ready_and_logs_looking_for_noise() {
    let rig = Rig::new(&SystemConfig::default());
    assert_eq!(rig.ctl.state(), StateId::Monitoring);
    assert_eq!(rig.sink.events, vec![AlarmEvent::LookingForNoise]);
    assert_eq!(rig.board.last_indicator(), Some(Indicator::White));
    assert_eq!(rig.board.last_text(), Some("READY"));
    assert!(rig.ctl.armed_timers().is_empty());
}

#[test]
fn third_sample_crossing_threshold_starts_alerting() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.sink.take();

    for level in [0, 0, 40] {
        rig.board.level = Some(level);
        rig.step();
    }

    assert_eq!(rig.ctl.state(), StateId::Alerting);
    assert_eq!(rig.sink.events, vec![AlarmEvent::NoiseDetected]);
    assert_eq!(rig.board.last_indicator(), Some(Indicator::Blue));
    assert_eq!(rig.board.last_text(), Some("ALERT"));
    assert_eq!(
        rig.ctl.armed_timers(),
        vec![TimerSlot::Escalation, TimerSlot::CodeCheck]
    );
}

#[test]
fn thirty_silent_seconds_sound_the_alarm() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.clap(); // t = 20
    rig.sink.take();

    rig.run_until(30_000);
    assert_eq!(rig.ctl.state(), StateId::Alerting);
    assert!(rig.sink.events.is_empty());

    rig.step(); // t = 30_020
    assert_eq!(rig.ctl.state(), StateId::Sounding);
    assert_eq!(rig.sink.events, vec![AlarmEvent::AlarmStarting]);
    assert!(rig.ctl.alarm_active());
    assert_eq!(rig.board.last_indicator(), Some(Indicator::Red));
    assert_eq!(rig.board.last_text(), Some("ALARM"));
    assert_eq!(rig.ctl.armed_timers(), vec![TimerSlot::CodeCheck]);
}

#[test]
fn defuse_while_sounding_settles_then_resumes() {
    let mut rig = Rig::fast();
    rig.clap(); // alerting at 20, escalation due 1020
    rig.run_until(1020);
    assert_eq!(rig.ctl.state(), StateId::Sounding);
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::defuse("1234"));
    rig.step(); // 1040: queued, next code check at 1120
    assert_eq!(rig.ctl.state(), StateId::Sounding);
    assert_eq!(rig.ctl.pending_submissions(), 1);

    rig.run_until(1120);
    assert_eq!(rig.ctl.state(), StateId::Settling);
    assert_eq!(
        rig.sink.take(),
        vec![
            AlarmEvent::ValidatedEntry,
            AlarmEvent::AlarmStopping,
            AlarmEvent::AlarmWaiting,
        ]
    );
    assert!(!rig.ctl.alarm_active());
    assert!(rig.ctl.is_input_blocked());
    assert_eq!(rig.board.last_text(), Some("Waiting 1s"));
    assert_eq!(rig.ctl.armed_timers(), vec![TimerSlot::Settle]);
    assert_eq!(rig.ctl.timer_deadline(TimerSlot::Settle), Some(2120));

    rig.run_until(2100);
    assert_eq!(rig.ctl.state(), StateId::Settling);
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Monitoring);
    assert_eq!(rig.sink.take(), vec![AlarmEvent::LookingForNoise]);
    assert!(!rig.ctl.is_input_blocked());
    assert!(rig.ctl.armed_timers().is_empty());
}

#[test]
fn wrong_code_is_logged_and_escalation_keeps_running() {
    let mut rig = Rig::fast();
    rig.clap();
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::defuse("9999"));
    rig.run_until(120);
    assert_eq!(rig.sink.take(), vec![invalid("9999")]);
    assert_eq!(rig.ctl.state(), StateId::Alerting);
    assert_eq!(rig.ctl.timer_deadline(TimerSlot::Escalation), Some(1020));

    rig.run_until(1020);
    assert_eq!(rig.ctl.state(), StateId::Sounding);
    assert_eq!(rig.sink.take(), vec![AlarmEvent::AlarmStarting]);
}

#[test]
fn disable_from_monitoring_ignores_noise() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::disable("1234"));
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Disabled);
    assert_eq!(
        rig.sink.take(),
        vec![AlarmEvent::ValidatedEntry, AlarmEvent::AlarmDisabled]
    );
    assert_eq!(rig.board.last_indicator(), Some(Indicator::Black));
    assert_eq!(rig.board.last_text(), Some(""));

    let sampled = rig.board.samples;
    rig.board.level = Some(1000);
    rig.steps(500);
    rig.board.level = Some(0);
    rig.steps(5);
    rig.board.level = Some(1000);
    rig.steps(5);

    assert_eq!(rig.ctl.state(), StateId::Disabled);
    assert!(rig.sink.events.is_empty());
    assert_eq!(rig.board.samples, sampled, "sensor must not be read while disabled");
    assert!(rig.ctl.armed_timers().is_empty());
}

// ── Disabled mode ─────────────────────────────────────────────

#[test]
fn defuse_from_disabled_pays_the_full_settle_window() {
    let mut rig = Rig::fast();
    rig.inbox.submit(CodeSubmission::disable("1234"));
    rig.step();
    rig.steps(100);
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::defuse("1234"));
    rig.step();
    let entered = rig.now_ms;
    assert_eq!(rig.ctl.state(), StateId::Settling);
    assert!(!rig.ctl.is_disabled());
    assert_eq!(
        rig.sink.take(),
        vec![AlarmEvent::ValidatedEntry, AlarmEvent::AlarmWaiting]
    );
    assert_eq!(rig.ctl.timer_deadline(TimerSlot::Settle), Some(entered + 1000));

    rig.run_until(entered + 1000);
    assert_eq!(rig.ctl.state(), StateId::Monitoring);
}

#[test]
fn disable_while_sounding_stops_the_alarm() {
    let mut rig = Rig::fast();
    rig.clap();
    rig.run_until(1020);
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::disable("1234"));
    rig.run_until(1120);
    assert_eq!(rig.ctl.state(), StateId::Disabled);
    assert_eq!(
        rig.sink.take(),
        vec![
            AlarmEvent::ValidatedEntry,
            AlarmEvent::AlarmStopping,
            AlarmEvent::AlarmDisabled,
        ]
    );
    assert!(!rig.ctl.alarm_active());
    assert!(rig.ctl.armed_timers().is_empty());
}

#[test]
fn repeated_disable_stays_disabled() {
    let mut rig = Rig::fast();
    rig.inbox.submit(CodeSubmission::disable("1234"));
    rig.step();
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::disable("1234"));
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Disabled);
    assert_eq!(
        rig.sink.take(),
        vec![AlarmEvent::ValidatedEntry, AlarmEvent::AlarmDisabled]
    );
}

#[test]
fn wrong_code_does_not_leave_disabled() {
    let mut rig = Rig::fast();
    rig.inbox.submit(CodeSubmission::disable("1234"));
    rig.step();
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::defuse("4321"));
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Disabled);
    assert_eq!(rig.sink.take(), vec![invalid("4321")]);
}

// ── Ordering and timing ───────────────────────────────────────

#[test]
fn code_on_the_deadline_tick_beats_escalation() {
    let mut rig = Rig::fast();
    rig.clap(); // escalation due at 1020, checks at 120, 220, ..., 1020
    rig.run_until(1000);
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::defuse("1234"));
    rig.step(); // 1020
    assert_eq!(rig.ctl.state(), StateId::Settling);
    assert_eq!(
        rig.sink.take(),
        vec![AlarmEvent::ValidatedEntry, AlarmEvent::AlarmWaiting]
    );
    assert!(!rig.ctl.alarm_active());

    rig.steps(20);
    assert!(!rig.sink.events.contains(&AlarmEvent::AlarmStarting));
}

#[test]
fn submissions_during_settling_are_dropped_silently() {
    let mut rig = Rig::fast();
    rig.clap();
    rig.inbox.submit(CodeSubmission::defuse("1234"));
    rig.run_until(120);
    assert_eq!(rig.ctl.state(), StateId::Settling);
    rig.sink.take();

    rig.inbox.submit(CodeSubmission::defuse("0000"));
    rig.inbox.submit(CodeSubmission::disable("1234"));
    rig.step();
    assert_eq!(rig.ctl.pending_submissions(), 0);

    rig.run_until(1120);
    assert_eq!(rig.ctl.state(), StateId::Monitoring);
    assert_eq!(rig.sink.take(), vec![AlarmEvent::LookingForNoise]);
    assert!(!rig.ctl.is_disabled());
}

#[test]
fn settle_length_is_the_same_from_every_entry() {
    // From Alerting.
    let mut rig = Rig::fast();
    rig.clap();
    rig.inbox.submit(CodeSubmission::defuse("1234"));
    rig.run_until(120);
    let from_alerting = rig.ctl.timer_deadline(TimerSlot::Settle).map(|d| d - rig.now_ms);

    // From Monitoring.
    let mut rig = Rig::fast();
    rig.inbox.submit(CodeSubmission::defuse("1234"));
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Settling);
    let from_monitoring = rig.ctl.timer_deadline(TimerSlot::Settle).map(|d| d - rig.now_ms);

    assert_eq!(from_alerting, Some(1000));
    assert_eq!(from_monitoring, Some(1000));
}

#[test]
fn second_cycle_rearms_fresh_timers() {
    let mut rig = Rig::fast();
    rig.clap();
    rig.inbox.submit(CodeSubmission::defuse("1234"));
    rig.run_until(120);
    rig.run_until(1120);
    assert_eq!(rig.ctl.state(), StateId::Monitoring);

    rig.clap();
    let t = rig.now_ms;
    assert_eq!(rig.ctl.state(), StateId::Alerting);
    assert_eq!(
        rig.ctl.armed_timers(),
        vec![TimerSlot::Escalation, TimerSlot::CodeCheck]
    );
    assert_eq!(rig.ctl.timer_deadline(TimerSlot::Escalation), Some(t + 1000));
    assert_eq!(rig.ctl.timer_deadline(TimerSlot::CodeCheck), Some(t + 100));
}

// ── Sensor edge cases ─────────────────────────────────────────

#[test]
fn missing_samples_count_as_quiet() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.board.level = None;
    rig.steps(10);
    assert_eq!(rig.ctl.state(), StateId::Monitoring);

    rig.board.level = Some(30);
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Alerting, "threshold itself is loud");
}

#[test]
fn invalid_code_in_monitoring_changes_nothing() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.sink.take();
    rig.inbox.submit(CodeSubmission::disable("12345"));
    rig.step();
    assert_eq!(rig.ctl.state(), StateId::Monitoring);
    assert_eq!(rig.sink.names(), vec!["invalid-code 12345".to_string()]);
}
