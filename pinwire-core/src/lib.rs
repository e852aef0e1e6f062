//! Board-agnostic core logic for the Pinwire I/O board firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Board configuration and the board-file parser
//! - Sensor adapter trait
//! - Command dispatcher (frame → GPIO/sensor operation → reply)
//! - Poll-driven command engine over a serial port

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use dispatch::{Dispatcher, Outcome};
pub use engine::{CommandEngine, Poll};
