//! Inbound commands to the controller.
//!
//! A [`CodeSubmission`] is what the admission endpoint hands over.  It is
//! queued in the [`SubmissionInbox`](crate::channels::SubmissionInbox) and
//! applied by the controller on its own tick, never in the caller's context.

use core::fmt;

use serde::{Deserialize, Serialize};

/// What a valid code should do to the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Silence the current cycle and resume monitoring after the settle window.
    Defuse,
    /// Silence and suspend monitoring until a later defuse.
    Disable,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defuse => f.write_str("defuse"),
            Self::Disable => f.write_str("disable"),
        }
    }
}

/// A code submitted for a purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSubmission {
    pub code: String,
    pub purpose: Purpose,
}

impl CodeSubmission {
    pub fn new(code: impl Into<String>, purpose: Purpose) -> Self {
        Self {
            code: code.into(),
            purpose,
        }
    }

    pub fn defuse(code: impl Into<String>) -> Self {
        Self::new(code, Purpose::Defuse)
    }

    pub fn disable(code: impl Into<String>) -> Self {
        Self::new(code, Purpose::Disable)
    }
}
