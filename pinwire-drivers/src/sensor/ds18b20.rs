//! DS18B20 one-wire temperature sensor
//!
//! Scratchpad layout:
//!
//! | byte | content |
//! |------|---------|
//! | 0-1  | temperature, little-endian, 1/16 °C |
//! | 2-3  | alarm high / low |
//! | 4    | configuration (resolution in bits 5-6) |
//! | 5-7  | reserved |
//! | 8    | CRC-8 of bytes 0-7 |

use pinwire_core::traits::SensorError;
use pinwire_hal::OneWireBus;

use super::onewire::{crc8, select, RomCode};

/// Start a temperature conversion
pub const CONVERT_T: u8 = 0x44;
/// Write alarm and configuration bytes
pub const WRITE_SCRATCHPAD: u8 = 0x4E;
/// Read the 9-byte scratchpad
pub const READ_SCRATCHPAD: u8 = 0xBE;

/// Conversion time at 12-bit resolution
pub const MAX_CONVERSION_MS: u32 = 750;

/// Degrees Celsius per raw count
const CELSIUS_PER_LSB: f32 = 0.0625;

/// Measurement resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Bits9,
    Bits10,
    Bits11,
    Bits12,
}

impl Resolution {
    pub const fn bits(self) -> u8 {
        match self {
            Resolution::Bits9 => 9,
            Resolution::Bits10 => 10,
            Resolution::Bits11 => 11,
            Resolution::Bits12 => 12,
        }
    }

    /// Decode from the scratchpad configuration byte
    pub const fn from_config(config: u8) -> Self {
        match (config >> 5) & 0x03 {
            0 => Resolution::Bits9,
            1 => Resolution::Bits10,
            2 => Resolution::Bits11,
            _ => Resolution::Bits12,
        }
    }

    /// Configuration byte selecting this resolution
    pub const fn config_byte(self) -> u8 {
        ((self.bits() - 9) << 5) | 0x1F
    }

    /// Worst-case conversion time
    pub const fn conversion_ms(self) -> u32 {
        MAX_CONVERSION_MS >> (12 - self.bits())
    }

    /// Mask clearing the raw bits left undefined at this resolution
    const fn raw_mask(self) -> i16 {
        !((1i16 << (12 - self.bits())) - 1)
    }
}

/// A DS18B20 addressed by ROM code
///
/// Holds no bus; every operation borrows one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ds18b20 {
    rom: RomCode,
    resolution: Resolution,
}

impl Ds18b20 {
    /// Device at `rom`, assumed at its power-on 12-bit resolution
    pub fn new(rom: RomCode) -> Self {
        Self {
            rom,
            resolution: Resolution::Bits12,
        }
    }

    pub fn rom(&self) -> &RomCode {
        &self.rom
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Read and CRC-check the scratchpad
    pub fn read_scratchpad<B: OneWireBus>(&self, bus: &mut B) -> Result<[u8; 9], SensorError> {
        select(bus, Some(&self.rom))?;
        bus.write_byte(READ_SCRATCHPAD);
        let mut scratchpad = [0u8; 9];
        bus.read_bytes(&mut scratchpad);
        if crc8(&scratchpad[..8]) != scratchpad[8] {
            return Err(SensorError::CrcMismatch);
        }
        Ok(scratchpad)
    }

    /// Change resolution, keeping the alarm bytes
    pub fn set_resolution<B: OneWireBus>(
        &mut self,
        bus: &mut B,
        resolution: Resolution,
    ) -> Result<(), SensorError> {
        let scratchpad = self.read_scratchpad(bus)?;
        if Resolution::from_config(scratchpad[4]) != resolution {
            select(bus, Some(&self.rom))?;
            bus.write_bytes(&[
                WRITE_SCRATCHPAD,
                scratchpad[2],
                scratchpad[3],
                resolution.config_byte(),
            ]);
        }
        self.resolution = resolution;
        Ok(())
    }

    /// Temperature from the last conversion
    pub fn read_celsius<B: OneWireBus>(&self, bus: &mut B) -> Result<f32, SensorError> {
        let scratchpad = self.read_scratchpad(bus)?;
        Ok(raw_to_celsius(
            i16::from_le_bytes([scratchpad[0], scratchpad[1]]),
            Resolution::from_config(scratchpad[4]),
        ))
    }
}

/// Start a conversion on every device on the bus
pub fn convert_all<B: OneWireBus>(bus: &mut B) -> Result<(), SensorError> {
    select(bus, None)?;
    bus.write_byte(CONVERT_T);
    Ok(())
}

fn raw_to_celsius(raw: i16, resolution: Resolution) -> f32 {
    f32::from(raw & resolution.raw_mask()) * CELSIUS_PER_LSB
}
