//! Command catalogue
//!
//! Maps the command/operation bytes of a [`Frame`] onto the closed set of
//! operations the board performs:
//!
//! | command | meaning              | operations                      |
//! |---------|----------------------|---------------------------------|
//! | `A`     | analog I/O           | `R` read, `W` PWM write         |
//! | `D`     | digital I/O          | `R` read, `W` write + read back |
//! | `M`     | pin mode             | `I`, `P`, `O` set, `R` query    |
//! | `z`     | system               | `z` free memory, `v` version    |
//! | `w`/`W` | one-wire temperature | any (pin = bus, value = index)  |
//! | `S`     | humidity sensor      | any (pin = data, value = kind)  |

use crate::frame::{CommandValue, Frame, PinAddress};

// Command bytes
pub const CMD_ANALOG: u8 = b'A';
pub const CMD_DIGITAL: u8 = b'D';
pub const CMD_MODE: u8 = b'M';
pub const CMD_SYSTEM: u8 = b'z';
pub const CMD_ONE_WIRE: u8 = b'w';
pub const CMD_ONE_WIRE_ALT: u8 = b'W';
pub const CMD_HUMIDITY: u8 = b'S';

// Operation bytes
pub const OP_READ: u8 = b'R';
pub const OP_WRITE: u8 = b'W';
pub const OP_FREE_MEMORY: u8 = b'z';
pub const OP_VERSION: u8 = b'v';
pub const OP_MODE_INPUT: u8 = b'I';
pub const OP_MODE_PULLUP: u8 = b'P';
pub const OP_MODE_OUTPUT: u8 = b'O';
pub const OP_MODE_QUERY: u8 = b'R';

/// Pin mode requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeRequest {
    Input,
    InputPullup,
    Output,
}

/// A decoded host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Report free RAM
    FreeMemory,
    /// Report the firmware version
    Version,
    /// Read an analog channel
    AnalogRead { channel: PinAddress },
    /// PWM write to a pin
    AnalogWrite { pin: PinAddress, duty: CommandValue },
    /// Read a digital pin
    DigitalRead { pin: PinAddress },
    /// Drive a digital pin, then read it back
    DigitalWrite { pin: PinAddress, high: bool },
    /// Configure a pin's electrical mode
    SetMode { pin: PinAddress, mode: ModeRequest },
    /// Report a pin's electrical mode from its registers
    QueryMode { pin: PinAddress },
    /// Read a one-wire temperature probe by its index on the bus
    OneWireTemperature {
        bus_pin: PinAddress,
        index: CommandValue,
    },
    /// Read a DHT-class humidity/temperature sensor
    HumidityTemperature { pin: PinAddress, kind: CommandValue },
    /// Command/operation pair outside the catalogue
    Unrecognized { command: u8, operation: u8 },
}

impl Command {
    /// Classify a frame
    pub fn from_frame(frame: &Frame) -> Self {
        let pin = frame.pin();
        let value = frame.value();

        match (frame.command(), frame.operation()) {
            (CMD_SYSTEM, OP_FREE_MEMORY) => Command::FreeMemory,
            (CMD_SYSTEM, OP_VERSION) => Command::Version,
            (CMD_ANALOG, OP_READ) => Command::AnalogRead { channel: pin },
            (CMD_ANALOG, OP_WRITE) => Command::AnalogWrite { pin, duty: value },
            (CMD_DIGITAL, OP_READ) => Command::DigitalRead { pin },
            (CMD_DIGITAL, OP_WRITE) => Command::DigitalWrite {
                pin,
                high: value.is_set(),
            },
            (CMD_MODE, OP_MODE_INPUT) => Command::SetMode {
                pin,
                mode: ModeRequest::Input,
            },
            (CMD_MODE, OP_MODE_PULLUP) => Command::SetMode {
                pin,
                mode: ModeRequest::InputPullup,
            },
            (CMD_MODE, OP_MODE_OUTPUT) => Command::SetMode {
                pin,
                mode: ModeRequest::Output,
            },
            (CMD_MODE, OP_MODE_QUERY) => Command::QueryMode { pin },
            (CMD_ONE_WIRE | CMD_ONE_WIRE_ALT, _) => Command::OneWireTemperature {
                bus_pin: pin,
                index: value,
            },
            (CMD_HUMIDITY, _) => Command::HumidityTemperature { pin, kind: value },
            (command, operation) => Command::Unrecognized { command, operation },
        }
    }
}
