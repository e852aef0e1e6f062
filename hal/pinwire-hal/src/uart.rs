//! Serial transport abstractions
//!
//! The host link is a plain byte stream. Boards expose it through the
//! `embedded-io` traits; [`SerialPort`] bundles the three the engine needs.

use embedded_io::{Read, ReadReady, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Byte-stream transport to the host
///
/// `read_ready` must never block: the engine uses it to busy-poll for
/// input. Reads and writes may block.
pub trait SerialPort: Read + ReadReady + Write {}

// Blanket implementation
impl<T: Read + ReadReady + Write> SerialPort for T {}

/// Serial line parameters
///
/// Framing is written the Arduino way: data bits, parity letter, stop bits,
/// as in `8N1` or `7E2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartConfig {
    pub baudrate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::with_baudrate(115_200)
    }
}

impl UartConfig {
    /// 8N1 at `baudrate`
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Same baud rate with framing taken from `notation`
    ///
    /// Returns `None` unless `notation` is exactly three characters naming
    /// a framing the AVR USART supports.
    pub fn with_framing(self, notation: &str) -> Option<Self> {
        let &[data, parity, stop] = notation.as_bytes() else {
            return None;
        };
        Some(Self {
            data_bits: DataBits::from_digit(data)?,
            parity: Parity::from_letter(parity)?,
            stop_bits: StopBits::from_digit(stop)?,
            ..self
        })
    }

    /// Framing in `8N1` notation
    pub fn framing(&self) -> [u8; 3] {
        [
            b'0' + self.data_bits.count(),
            self.parity.letter(),
            b'0' + self.stop_bits.count(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    pub const fn count(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }

    const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            b'5' => Some(DataBits::Five),
            b'6' => Some(DataBits::Six),
            b'7' => Some(DataBits::Seven),
            b'8' => Some(DataBits::Eight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    pub const fn letter(self) -> u8 {
        match self {
            Parity::None => b'N',
            Parity::Even => b'E',
            Parity::Odd => b'O',
        }
    }

    const fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'N' => Some(Parity::None),
            b'E' => Some(Parity::Even),
            b'O' => Some(Parity::Odd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub const fn count(self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }

    const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            b'1' => Some(StopBits::One),
            b'2' => Some(StopBits::Two),
            _ => None,
        }
    }
}
