//! Reply encoding
//!
//! Replies are percent-delimited tokens terminated by a line break:
//!
//! ```text
//! <device-id>%[<pin>%][<label>%]<payload>\n
//! ```
//!
//! The encoder writes each token straight to the transport as soon as it
//! is known. Nothing is buffered, so a preamble that has been written stays
//! written even if no payload follows.

use core::fmt::{self, Display, Write as _};

use embedded_io::Write;

use crate::frame::{PinAddress, RawFrame};

/// Token delimiter
pub const DELIMITER: char = '%';

/// Separator between humidity and temperature in sensor replies
pub const PAIR_SEPARATOR: char = ':';

/// Label preceding the free-memory payload
pub const LABEL_FREE_MEMORY: &str = "free_mem";

/// Label preceding the firmware version payload
pub const LABEL_VERSION: &str = "version";

/// Payload sent when a humidity sensor returns no number
pub const DHT_READ_FAILURE: &str = "Failed to read from DHT sensor!";

/// Prefix of the diagnostic line for rejected frames
pub const INVALID_COMMAND: &str = "Invalid command:";

/// Line sent once the board is ready for commands
pub const BOOT_COMPLETE: &str = "Boot complete";

/// Errors that can occur while writing a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError<E> {
    /// The transport rejected a write
    Transport(E),
    /// A payload failed to format
    Format,
}

/// Bridges `core::fmt` onto a byte transport, keeping the transport error
struct Sink<'a, W: Write> {
    out: &'a mut W,
    error: Option<W::Error>,
}

impl<W: Write> fmt::Write for Sink<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

fn emit<W: Write>(out: &mut W, args: fmt::Arguments<'_>) -> Result<(), ReplyError<W::Error>> {
    let mut sink = Sink { out, error: None };
    match sink.write_fmt(args) {
        Ok(()) => Ok(()),
        Err(_) => Err(sink
            .error
            .take()
            .map_or(ReplyError::Format, ReplyError::Transport)),
    }
}

/// Append-only writer for a single reply
///
/// Created by [`ResponseEncoder::begin`], which writes the preamble. The
/// reply is complete once [`finish`](Self::finish) or
/// [`finish_pair`](Self::finish_pair) has written the final payload and
/// line break; dropping the encoder earlier leaves the preamble on the
/// wire without a terminator.
pub struct ResponseEncoder<'w, W: Write> {
    out: &'w mut W,
}

impl<'w, W: Write> ResponseEncoder<'w, W> {
    /// Write the device identifier and, if given, the pin address
    pub fn begin(
        out: &'w mut W,
        device_id: u16,
        pin: Option<PinAddress>,
    ) -> Result<Self, ReplyError<W::Error>> {
        let mut encoder = Self { out };
        encoder.token(device_id)?;
        if let Some(pin) = pin {
            encoder.token(pin)?;
        }
        Ok(encoder)
    }

    /// Write an intermediate token followed by the delimiter
    pub fn token(&mut self, value: impl Display) -> Result<(), ReplyError<W::Error>> {
        emit(self.out, format_args!("{}{}", value, DELIMITER))
    }

    /// Write the final payload and end the line
    pub fn finish(self, payload: impl Display) -> Result<(), ReplyError<W::Error>> {
        emit(self.out, format_args!("{}\n", payload))
    }

    /// Write a two-part payload (`first:second`) and end the line
    pub fn finish_pair(
        self,
        first: impl Display,
        second: impl Display,
    ) -> Result<(), ReplyError<W::Error>> {
        emit(
            self.out,
            format_args!("{}{}{}\n", first, PAIR_SEPARATOR, second),
        )
    }
}

/// Two-decimal rendering used for every floating-point payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixed2(pub f32);

impl Display for Fixed2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Write the diagnostic line for a rejected frame
///
/// The raw interior is echoed byte for byte, whatever it contains.
pub fn write_invalid_frame<W: Write>(out: &mut W, raw: &RawFrame) -> Result<(), W::Error> {
    out.write_all(INVALID_COMMAND.as_bytes())?;
    out.write_all(raw.as_bytes())?;
    out.write_all(b"\n")
}

/// Write the boot banner
pub fn write_boot_banner<W: Write>(out: &mut W) -> Result<(), W::Error> {
    out.write_all(BOOT_COMPLETE.as_bytes())?;
    out.write_all(b"\n")
}
