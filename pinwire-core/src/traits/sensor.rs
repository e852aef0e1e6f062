//! Sensor adapter trait

/// Temperature the Dallas library reports for a device that did not answer
pub const DEVICE_DISCONNECTED_C: f32 = -127.0;

/// Errors that can occur during a one-shot sensor read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No presence pulse, or no device at the requested index
    NoDevice,
    /// Data arrived but its checksum did not match
    CrcMismatch,
    /// Sensor stopped responding mid-transfer
    Timeout,
    /// Sensor returned a reading that is not a number
    NotANumber,
    /// Sensor-type code is not one the driver knows
    UnsupportedKind,
}

/// Humidity and temperature from a DHT-class sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HumidityReading {
    /// Relative humidity in percent
    pub humidity: f32,
    /// Temperature in degrees Celsius
    pub temperature: f32,
}

impl HumidityReading {
    /// Reading reported when the sensor did not deliver data
    pub const NAN: Self = Self {
        humidity: f32::NAN,
        temperature: f32::NAN,
    };

    /// True if either value is not a number
    pub fn is_nan(&self) -> bool {
        self.humidity.is_nan() || self.temperature.is_nan()
    }
}

/// One-shot reads against external sensors
///
/// Each call opens whatever bus or line session it needs for the given
/// pin and releases it before returning, whether the read succeeded or not.
/// Reads block until the sensor answers; there is no timeout above what the
/// driver itself enforces.
pub trait SensorAdapter {
    /// Temperature in degrees Celsius of the `index`-th one-wire device on
    /// the bus at `bus_pin`
    fn one_wire_celsius(&mut self, bus_pin: u8, index: u16) -> Result<f32, SensorError>;

    /// Humidity and temperature from the sensor on `pin`
    ///
    /// `kind` is the sensor-type code sent by the host (11, 12, 21, 22).
    fn humidity_temperature(&mut self, pin: u8, kind: u16)
        -> Result<HumidityReading, SensorError>;
}
