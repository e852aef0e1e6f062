//! Frame decoding for the host command protocol.
//!
//! Frame format:
//! - START (1 byte): `<`
//! - COMMAND (1 byte): subsystem selector
//! - OPERATION (1 byte): read, write or a command-specific sub-code
//! - PIN (2 bytes): decimal pin index or analog channel
//! - VALUE (3 bytes): decimal argument (duty, level, sensor index, ...)
//! - END (1 byte): `>`
//!
//! Bytes received outside a frame that are not START are discarded.

use core::fmt;
use core::ops::Range;

use heapless::Vec;

/// Frame start delimiter
pub const FRAME_START: u8 = b'<';

/// Frame end delimiter
pub const FRAME_END: u8 = b'>';

/// Exact number of bytes between the delimiters
pub const FRAME_LEN: usize = 7;

/// Interior bytes kept for diagnostics when a frame is rejected
pub const MAX_RAW_LEN: usize = 32;

const PIN_FIELD: Range<usize> = 2..4;
const VALUE_FIELD: Range<usize> = 4..7;

/// System/meta command selector; replies to it carry no pin token
const SYSTEM_COMMAND: u8 = b'z';

/// Pin index or analog channel decoded from the PIN field
///
/// Whether this names a digital pin or an analog channel depends on the
/// command, so the address itself carries no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAddress(u8);

impl PinAddress {
    /// Largest address a two-digit field can carry
    pub const MAX: u8 = 99;

    pub const fn new(pin: u8) -> Option<Self> {
        if pin <= Self::MAX {
            Some(Self(pin))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for PinAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Argument decoded from the VALUE field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandValue(u16);

impl CommandValue {
    /// Largest value a three-digit field can carry
    pub const MAX: u16 = 999;

    pub const fn new(value: u16) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Boolean reading of the value (non-zero is true)
    pub const fn is_set(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for CommandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interior bytes of a rejected frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame {
    bytes: Vec<u8, MAX_RAW_LEN>,
    len: usize,
}

impl RawFrame {
    fn from_slice(interior: &[u8]) -> Self {
        let keep = interior.len().min(MAX_RAW_LEN);
        let mut bytes = Vec::new();
        // Cannot fail: `keep` is bounded by the capacity
        let _ = bytes.extend_from_slice(&interior[..keep]);
        Self {
            bytes,
            len: interior.len(),
        }
    }

    /// Stored interior bytes (at most [`MAX_RAW_LEN`])
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of interior bytes actually received
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the interior was longer than the stored prefix
    pub fn is_truncated(&self) -> bool {
        self.len > self.bytes.len()
    }
}

/// Errors that can occur during frame decoding
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Interior length between the delimiters was not [`FRAME_LEN`]
    InvalidFrame(RawFrame),
}

/// A decoded request frame
///
/// Frames are plain values: decoding never leaves state behind for the
/// next command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    command: u8,
    operation: u8,
    pin: PinAddress,
    value: CommandValue,
}

impl Frame {
    pub const fn new(command: u8, operation: u8, pin: PinAddress, value: CommandValue) -> Self {
        Self {
            command,
            operation,
            pin,
            value,
        }
    }

    /// Decode the interior of a frame (delimiters already stripped)
    ///
    /// Numeric fields that are not all decimal digits decode to zero.
    pub fn decode(interior: &[u8]) -> Result<Self, FrameError> {
        if interior.len() != FRAME_LEN {
            return Err(FrameError::InvalidFrame(RawFrame::from_slice(interior)));
        }

        Ok(Self {
            command: interior[0],
            operation: interior[1],
            // Two digits never exceed PinAddress::MAX
            pin: PinAddress(parse_field(&interior[PIN_FIELD]) as u8),
            value: CommandValue(parse_field(&interior[VALUE_FIELD])),
        })
    }

    /// Encode this frame including delimiters
    ///
    /// This is the host side of the protocol; the board only decodes.
    pub fn encode(&self) -> [u8; FRAME_LEN + 2] {
        let pin = self.pin.0;
        let value = self.value.0;
        [
            FRAME_START,
            self.command,
            self.operation,
            b'0' + pin / 10,
            b'0' + pin % 10,
            b'0' + (value / 100) as u8,
            b'0' + (value / 10 % 10) as u8,
            b'0' + (value % 10) as u8,
            FRAME_END,
        ]
    }

    pub const fn command(&self) -> u8 {
        self.command
    }

    pub const fn operation(&self) -> u8 {
        self.operation
    }

    pub const fn pin(&self) -> PinAddress {
        self.pin
    }

    pub const fn value(&self) -> CommandValue {
        self.value
    }

    /// System commands are answered without echoing the pin
    pub const fn is_system(&self) -> bool {
        self.command == SYSTEM_COMMAND
    }
}

/// Tolerant decimal parse: anything other than pure digits reads as 0
///
/// A field with a stray byte decodes to 0, never to its leading digits, so
/// `1a` is pin 0 rather than pin 1. This is deliberate: a damaged field must
/// not address a neighbouring pin or value.
fn parse_field(digits: &[u8]) -> u16 {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return 0;
    }
    digits
        .iter()
        .fold(0u16, |acc, &d| acc * 10 + (d - b'0') as u16)
}

/// State machine for extracting frames from a byte stream
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_RAW_LEN>,
    /// Interior bytes seen, including any that did not fit in `buffer`
    seen: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Discarding noise until START
    WaitingForStart,
    /// Collecting interior bytes until END
    ReadingInterior,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            buffer: Vec::new(),
            seen: 0,
        }
    }

    /// Reset the parser state, dropping any partial frame
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.buffer.clear();
        self.seen = 0;
    }

    /// True while no frame is partially received
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForStart
    }

    /// Abandon the frame in progress
    ///
    /// Returns the interior received so far, or `None` if no frame was
    /// open. The parser goes back to scanning for START.
    pub fn abort(&mut self) -> Option<RawFrame> {
        if self.is_idle() {
            return None;
        }
        let raw = RawFrame {
            bytes: self.buffer.clone(),
            len: self.seen,
        };
        self.reset();
        Some(raw)
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when END closes a well-formed frame,
    /// `Ok(None)` when more bytes are needed, or `Err` when END closes a
    /// frame of the wrong length. Either way the parser goes back to
    /// scanning for START.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForStart => {
                if byte == FRAME_START {
                    self.buffer.clear();
                    self.seen = 0;
                    self.state = ParseState::ReadingInterior;
                }
                // Silently ignore noise while waiting
                Ok(None)
            }
            ParseState::ReadingInterior => {
                if byte != FRAME_END {
                    self.seen = self.seen.saturating_add(1);
                    // Overlong interiors are counted but only the prefix is kept
                    let _ = self.buffer.push(byte);
                    return Ok(None);
                }

                let result = if self.seen == FRAME_LEN {
                    Frame::decode(&self.buffer).map(Some)
                } else {
                    Err(FrameError::InvalidFrame(RawFrame {
                        bytes: self.buffer.clone(),
                        len: self.seen,
                    }))
                };

                self.reset();
                result
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame or error found, if any.
    /// Remaining bytes after it are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
