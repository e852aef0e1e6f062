//! DHT-family humidity/temperature sensors
//!
//! All variants send the same 40-bit frame: two humidity bytes, two
//! temperature bytes, and an 8-bit sum of the first four. They differ in how
//! those bytes encode the values.

use pinwire_core::traits::{HumidityReading, SensorError};
use pinwire_hal::{DhtLine, DhtLineError};

/// Sensor variant, selected by the host's type code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhtKind {
    /// DHT11: whole units plus a tenths byte
    Dht11,
    /// DHT12: like DHT11, sign in the temperature integer byte
    Dht12,
    /// DHT21 / AM2301: 16-bit tenths, sign-magnitude temperature
    Dht21,
    /// DHT22 / AM2302: same encoding as DHT21
    Dht22,
}

impl DhtKind {
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            11 => Some(DhtKind::Dht11),
            12 => Some(DhtKind::Dht12),
            21 => Some(DhtKind::Dht21),
            22 => Some(DhtKind::Dht22),
            _ => None,
        }
    }

    pub const fn code(self) -> u16 {
        match self {
            DhtKind::Dht11 => 11,
            DhtKind::Dht12 => 12,
            DhtKind::Dht21 => 21,
            DhtKind::Dht22 => 22,
        }
    }
}

fn line_error(e: DhtLineError) -> SensorError {
    match e {
        DhtLineError::NoResponse => SensorError::NoDevice,
        DhtLineError::Timeout => SensorError::Timeout,
    }
}

/// Decode a checked 5-byte frame
pub fn decode(kind: DhtKind, frame: [u8; 5]) -> Result<HumidityReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(SensorError::CrcMismatch);
    }

    let tenths = |b: u8| f32::from(b & 0x0F) * 0.1;

    let reading = match kind {
        DhtKind::Dht11 => {
            let mut temperature = f32::from(frame[2]);
            if frame[3] & 0x80 != 0 {
                temperature = -1.0 - temperature;
            }
            HumidityReading {
                humidity: f32::from(frame[0]) + f32::from(frame[1]) * 0.1,
                temperature: temperature + tenths(frame[3]),
            }
        }
        DhtKind::Dht12 => {
            let mut temperature = f32::from(frame[2] & 0x7F) + tenths(frame[3]);
            if frame[2] & 0x80 != 0 {
                temperature = -temperature;
            }
            HumidityReading {
                humidity: f32::from(frame[0]) + f32::from(frame[1]) * 0.1,
                temperature,
            }
        }
        DhtKind::Dht21 | DhtKind::Dht22 => {
            let humidity = u16::from_be_bytes([frame[0], frame[1]]);
            let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
            let mut temperature = f32::from(magnitude) * 0.1;
            if frame[2] & 0x80 != 0 {
                temperature = -temperature;
            }
            HumidityReading {
                humidity: f32::from(humidity) * 0.1,
                temperature,
            }
        }
    };
    Ok(reading)
}

/// A DHT sensor of known kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dht {
    kind: DhtKind,
}

impl Dht {
    pub fn new(kind: DhtKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> DhtKind {
        self.kind
    }

    /// Trigger a measurement on `line` and decode it
    pub fn read<L: DhtLine>(&self, line: &mut L) -> Result<HumidityReading, SensorError> {
        let frame = line.read_frame().map_err(line_error)?;
        decode(self.kind, frame)
    }
}
