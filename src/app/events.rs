//! Outbound controller events.
//!
//! The [`AlarmController`](super::service::AlarmController) emits these
//! through the [`EventSink`](super::ports::EventSink) port on every
//! transition.  The `Display` form is the wire vocabulary that external log
//! consumers depend on; it must not change.

use core::fmt;

/// Discrete named events emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmEvent {
    /// Quiet→loud edge while monitoring.
    NoiseDetected,
    /// Escalation deadline passed without a valid code.
    AlarmStarting,
    /// A valid code silenced a sounding alarm.
    AlarmStopping,
    /// A valid code was accepted.
    ValidatedEntry,
    /// Monitoring is suspended until a later defuse.
    AlarmDisabled,
    /// Settle window started.
    AlarmWaiting,
    /// Monitoring (re)started.
    LookingForNoise,
    /// A submitted code did not match; carries the submitted value.
    InvalidCode(String),
}

impl AlarmEvent {
    /// Fixed event name, without the `invalid-code` payload.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoiseDetected => "noise-detected",
            Self::AlarmStarting => "alarm-starting",
            Self::AlarmStopping => "alarm-stopping",
            Self::ValidatedEntry => "validated-entry",
            Self::AlarmDisabled => "alarm-disabled",
            Self::AlarmWaiting => "alarm-waiting",
            Self::LookingForNoise => "looking-for-noise",
            Self::InvalidCode(_) => "invalid-code",
        }
    }
}

impl fmt::Display for AlarmEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCode(value) => write!(f, "invalid-code {value}"),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_is_stable() {
        let cases = [
            (AlarmEvent::NoiseDetected, "noise-detected"),
            (AlarmEvent::AlarmStarting, "alarm-starting"),
            (AlarmEvent::AlarmStopping, "alarm-stopping"),
            (AlarmEvent::ValidatedEntry, "validated-entry"),
            (AlarmEvent::AlarmDisabled, "alarm-disabled"),
            (AlarmEvent::AlarmWaiting, "alarm-waiting"),
            (AlarmEvent::LookingForNoise, "looking-for-noise"),
        ];
        for (event, text) in cases {
            assert_eq!(event.to_string(), text);
        }
    }

    #[test]
    fn invalid_code_carries_value() {
        let e = AlarmEvent::InvalidCode("9999".into());
        assert_eq!(e.to_string(), "invalid-code 9999");
        assert_eq!(e.name(), "invalid-code");
    }
}
