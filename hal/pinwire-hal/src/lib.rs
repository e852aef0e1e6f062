//! Pinwire Hardware Abstraction Layer
//!
//! This crate defines the capability contract between the protocol engine
//! and a concrete board. A board support crate implements these traits on
//! top of its chip HAL; the engine never touches registers directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pinwire-core (dispatcher, engine)      │
//! └─────────────────────────────────────────┘
//!            │                    │
//!            ▼                    ▼
//! ┌───────────────────┐  ┌───────────────────┐
//! │ pinwire-hal       │◄─┤ pinwire-drivers   │
//! │ (this crate)      │  │ (DS18B20, DHT)    │
//! └───────────────────┘  └───────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────────────────────────┐
//! │  board support (AVR, RP2040, host mock) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::DigitalIo`], [`gpio::AnalogIo`], [`gpio::PinModeControl`] - Pin I/O
//! - [`uart::SerialPort`] - Byte-stream transport to the host
//! - [`onewire::OneWireBus`], [`onewire::OneWireFactory`] - One-wire bus sessions
//! - [`dht::DhtLine`], [`dht::DhtFactory`] - DHT data line sessions
//! - [`system::SystemInfo`] - Memory introspection and uptime clock

#![no_std]
#![deny(unsafe_code)]

pub mod dht;
pub mod gpio;
pub mod onewire;
pub mod system;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use dht::{DhtFactory, DhtLine, DhtLineError};
pub use gpio::{AnalogIo, DigitalIo, Gpio, Level, ModeRegisters, PinMode, PinModeControl};
pub use onewire::{OneWireBus, OneWireFactory};
pub use system::SystemInfo;
pub use uart::{DataBits, Parity, SerialPort, StopBits, UartConfig};
