//! One-wire bus abstractions
//!
//! A one-wire bus is a single open-drain data line shared by any number of
//! addressable devices. Implementations only provide the bit-level time
//! slots; ROM search and device protocols live in `pinwire-drivers`.

/// Bit-level access to a one-wire bus
///
/// Bytes go out least-significant bit first.
pub trait OneWireBus {
    /// Issue a reset pulse
    ///
    /// Returns `true` if at least one device answered with a presence pulse.
    fn reset(&mut self) -> bool;

    /// Write a single bit time slot
    fn write_bit(&mut self, bit: bool);

    /// Read a single bit time slot
    fn read_bit(&mut self) -> bool;

    /// Write a byte, LSB first
    fn write_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.write_bit((byte >> i) & 1 == 1);
        }
    }

    /// Read a byte, LSB first
    fn read_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit() {
                byte |= 1 << i;
            }
        }
        byte
    }

    /// Write a sequence of bytes
    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Fill a buffer with bytes read from the bus
    fn read_bytes(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.read_byte();
        }
    }
}

/// Opens one-wire bus sessions on a pin
///
/// A session claims the pin for the lifetime of the returned bus and
/// releases it on drop.
pub trait OneWireFactory {
    /// Bus session type, borrowing the factory while open
    type Bus<'a>: OneWireBus
    where
        Self: 'a;

    /// Claim `pin` as a one-wire bus
    fn open(&mut self, pin: u8) -> Self::Bus<'_>;
}
