//! Collaborator traits
//!
//! Pin I/O comes straight from `pinwire-hal`. Sensors need more than a bus
//! primitive, so the core defines the adapter it dispatches to here and
//! `pinwire-drivers` implements it.

pub mod sensor;

pub use sensor::{HumidityReading, SensorAdapter, SensorError, DEVICE_DISCONNECTED_C};
