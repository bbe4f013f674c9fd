//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                           |
//! |-------------|--------------|---------------------------------------|
//! | `board`     | BoardPort    | Grove / DFRobot kit over sysfs + I2C  |
//! | `event_log` | EventSink    | `log` output + notification queue     |
//! | `http`      | (inbound)    | axum admission endpoint               |
//! | `notify`    | (outbound)   | datastore PUT, SMS gateway GET        |
//! | `time`      | (clock)      | monotonic `Instant`                   |

pub mod board;
pub mod event_log;
pub mod http;
pub mod notify;
pub mod time;
