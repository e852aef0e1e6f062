//! Sensor drivers

pub mod dht;
pub mod ds18b20;
pub mod onewire;
pub mod scoped;

#[cfg(test)]
mod fake;

pub use dht::{Dht, DhtKind};
pub use ds18b20::{Ds18b20, Resolution};
pub use onewire::{crc8, find_device, DeviceSearch, RomCode};
pub use scoped::ScopedSensors;
