//! Port traits — the hexagonal boundary between the controller and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmController (domain)
//! ```
//!
//! Driven adapters (board kits, event log) implement these traits.  The
//! [`AlarmController`](super::service::AlarmController) consumes them via
//! generics, so the domain core never touches hardware directly and never
//! knows which board kit is attached.

use chrono::{DateTime, Utc};

use crate::config::SystemConfig;
use crate::error::InitError;

use super::events::AlarmEvent;

// ───────────────────────────────────────────────────────────────
// Board port (driven adapter: domain ↔ sensor + panel)
// ───────────────────────────────────────────────────────────────

/// Indicator colours the controller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Red,
    Blue,
    White,
    /// Off.
    Black,
}

impl Indicator {
    /// Backlight RGB triple for boards with a colour backlight.
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (255, 0, 0),
            Self::Blue => (0, 0, 255),
            Self::White => (255, 255, 255),
            Self::Black => (0, 0, 0),
        }
    }
}

/// Capability set the controller needs from a board kit.
///
/// Every method except [`init`](Self::init) is infallible from the
/// controller's point of view: adapters log their own bus errors.
pub trait BoardPort {
    /// Bring up the sensor and display.  Failure here aborts startup.
    fn init(&mut self, config: &SystemConfig) -> Result<(), InitError>;

    /// Set the indicator / backlight colour.  Boards without one ignore it.
    fn set_indicator(&mut self, colour: Indicator);

    /// Show `text` on display `line`.  The adapter pads or truncates to its
    /// fixed width.
    fn set_display(&mut self, text: &str, line: u8);

    /// Take one noise reading.  `None` means no sample was available this
    /// tick, which is not an error.
    fn sample_noise(&mut self, threshold: u32) -> Option<u32>;
}

impl<B: BoardPort + ?Sized> BoardPort for Box<B> {
    fn init(&mut self, config: &SystemConfig) -> Result<(), InitError> {
        (**self).init(config)
    }

    fn set_indicator(&mut self, colour: Indicator) {
        (**self).set_indicator(colour);
    }

    fn set_display(&mut self, text: &str, line: u8) {
        (**self).set_display(text, line);
    }

    fn sample_noise(&mut self, threshold: u32) -> Option<u32> {
        (**self).sample_noise(threshold)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / notification)
// ───────────────────────────────────────────────────────────────

/// The controller emits [`AlarmEvent`]s through this port.
///
/// Implementations must not block and must not fail the caller: delivery
/// problems are the adapter's to log.
pub trait EventSink {
    fn record(&mut self, event: &AlarmEvent, at: DateTime<Utc>);
}
