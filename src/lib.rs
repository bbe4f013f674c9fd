//! QuietGuard alarm controller library.
//!
//! Exposes the controller core, the board drivers and the outer adapters
//! so the binary and the integration tests share one crate.  Everything
//! below `app` and `fsm` is free of I/O and runs on a synthetic clock.

#![deny(unused_must_use)]

pub mod app;
pub mod auth;
pub mod channels;
pub mod config;
pub mod error;
pub mod fsm;
pub mod timers;

pub mod adapters;
pub mod drivers;
pub mod pins;
