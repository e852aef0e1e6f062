//! One-wire ROM layer
//!
//! Device discovery follows the Maxim search algorithm (application note
//! 187): one pass per device, walking the 64-bit ROM tree and taking the
//! 0 branch first at every unresolved discrepancy.

use pinwire_core::traits::SensorError;
use pinwire_hal::OneWireBus;

/// Enumerate device ROM codes
pub const SEARCH_ROM: u8 = 0xF0;
/// Address a single device by ROM code
pub const MATCH_ROM: u8 = 0x55;
/// Address every device on the bus
pub const SKIP_ROM: u8 = 0xCC;

/// Dallas/Maxim CRC-8 (polynomial x^8 + x^5 + x^4 + 1, reflected)
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

/// 64-bit device ROM code: family, 48-bit serial, CRC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RomCode(pub [u8; 8]);

impl RomCode {
    pub const fn family(&self) -> u8 {
        self.0[0]
    }

    /// True if the trailing byte is the CRC of the first seven
    pub fn is_valid(&self) -> bool {
        crc8(&self.0[..7]) == self.0[7]
    }

    fn bit(&self, n: usize) -> bool {
        self.0[n / 8] & (1 << (n % 8)) != 0
    }

    fn set_bit(&mut self, n: usize, value: bool) {
        let mask = 1 << (n % 8);
        if value {
            self.0[n / 8] |= mask;
        } else {
            self.0[n / 8] &= !mask;
        }
    }
}

/// Address the device with `rom`, or every device if `rom` is `None`
///
/// Fails with [`SensorError::NoDevice`] if nothing answers the reset.
pub fn select<B: OneWireBus>(bus: &mut B, rom: Option<&RomCode>) -> Result<(), SensorError> {
    if !bus.reset() {
        return Err(SensorError::NoDevice);
    }
    match rom {
        Some(rom) => {
            bus.write_byte(MATCH_ROM);
            bus.write_bytes(&rom.0);
        }
        None => bus.write_byte(SKIP_ROM),
    }
    Ok(())
}

/// Incremental ROM search over a bus
pub struct DeviceSearch<'b, B> {
    bus: &'b mut B,
    rom: RomCode,
    /// Bit position (1-based) of the last 0-branch taken, 0 if none
    last_discrepancy: usize,
    done: bool,
}

impl<'b, B: OneWireBus> DeviceSearch<'b, B> {
    pub fn new(bus: &'b mut B) -> Self {
        Self {
            bus,
            rom: RomCode([0; 8]),
            last_discrepancy: 0,
            done: false,
        }
    }

    /// Find the next device
    ///
    /// Returns `Ok(None)` once every device has been reported, or when the
    /// bus is empty.
    pub fn next_device(&mut self) -> Result<Option<RomCode>, SensorError> {
        if self.done {
            return Ok(None);
        }
        if !self.bus.reset() {
            self.done = true;
            return Ok(None);
        }
        self.bus.write_byte(SEARCH_ROM);

        let mut last_zero = 0;
        for bit_number in 1..=64 {
            let id_bit = self.bus.read_bit();
            let cmp_bit = self.bus.read_bit();

            let direction = match (id_bit, cmp_bit) {
                // Nobody left participating
                (true, true) => {
                    self.done = true;
                    return Ok(None);
                }
                (a, b) if a != b => id_bit,
                _ => {
                    let direction = if bit_number < self.last_discrepancy {
                        self.rom.bit(bit_number - 1)
                    } else {
                        bit_number == self.last_discrepancy
                    };
                    if !direction {
                        last_zero = bit_number;
                    }
                    direction
                }
            };

            self.rom.set_bit(bit_number - 1, direction);
            self.bus.write_bit(direction);
        }

        self.last_discrepancy = last_zero;
        if last_zero == 0 {
            self.done = true;
        }

        if !self.rom.is_valid() {
            self.done = true;
            return Err(SensorError::CrcMismatch);
        }
        Ok(Some(self.rom))
    }
}

/// ROM code of the `index`-th device in search order
pub fn find_device<B: OneWireBus>(bus: &mut B, index: u16) -> Result<RomCode, SensorError> {
    let mut search = DeviceSearch::new(bus);
    let mut seen = 0u16;
    while let Some(rom) = search.next_device()? {
        if seen == index {
            return Ok(rom);
        }
        seen += 1;
    }
    Err(SensorError::NoDevice)
}
