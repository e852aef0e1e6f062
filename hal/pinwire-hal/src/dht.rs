//! DHT-style humidity/temperature sensor line
//!
//! DHT sensors answer a start pulse with a 40-bit frame. Pulse timing is
//! the board's business; this trait hands back the decoded bytes.

/// Errors on the DHT data line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhtLineError {
    /// Sensor did not answer the start pulse
    NoResponse,
    /// A bit pulse did not end in time
    Timeout,
}

/// Raw access to a DHT data line
pub trait DhtLine {
    /// Trigger a measurement and read the 5-byte frame
    ///
    /// Bytes are humidity high/low, temperature high/low, checksum.
    fn read_frame(&mut self) -> Result<[u8; 5], DhtLineError>;
}

/// Opens DHT line sessions on a pin
///
/// The line is claimed for the lifetime of the returned value and released
/// on drop.
pub trait DhtFactory {
    /// Line session type, borrowing the factory while open
    type Line<'a>: DhtLine
    where
        Self: 'a;

    /// Claim `pin` as a DHT data line
    fn open(&mut self, pin: u8) -> Self::Line<'_>;
}
