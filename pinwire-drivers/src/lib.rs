//! Sensor driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pinwire-core, built on the bus primitives of pinwire-hal:
//!
//! - One-wire ROM search and CRC-8
//! - DS18B20 temperature probes
//! - DHT11/12/21/22 humidity/temperature sensors
//! - A scoped sensor adapter that opens a bus per command

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod sensor;

pub use sensor::ScopedSensors;
