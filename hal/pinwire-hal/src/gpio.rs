//! GPIO capability surface
//!
//! Pins are addressed by index, the way the host protocol names them.
//! Whether an index is a digital pin or an analog channel is decided by
//! the caller, not by these traits.

/// Logic level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Numeric form used on the wire (0 or 1)
    pub const fn as_u8(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }

    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Electrical mode of a pin
///
/// The discriminants are the platform constants reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PinMode {
    /// High-impedance input
    Input = 0,
    /// Push-pull output
    Output = 1,
    /// Input with internal pull-up enabled
    InputPullup = 2,
}

impl PinMode {
    /// Platform constant for this mode
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Derive the mode from raw port register bits
    ///
    /// A set direction bit means output. Otherwise the output latch of an
    /// input pin selects the pull-up.
    pub const fn from_registers(regs: ModeRegisters) -> Self {
        if regs.direction {
            PinMode::Output
        } else if regs.output_latch {
            PinMode::InputPullup
        } else {
            PinMode::Input
        }
    }
}

/// Snapshot of the port register bits that define a pin's mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeRegisters {
    /// Data direction bit (set = output)
    pub direction: bool,
    /// Output latch bit (doubles as pull-up enable for inputs)
    pub output_latch: bool,
}

/// Digital read/write by pin index
pub trait DigitalIo {
    /// Sample the input level of a pin
    fn digital_read(&mut self, pin: u8) -> Level;

    /// Drive a pin to the given level
    fn digital_write(&mut self, pin: u8, level: Level);
}

/// Analog input and PWM output
pub trait AnalogIo {
    /// Read the raw ADC value of an analog channel
    fn analog_read(&mut self, channel: u8) -> u16;

    /// Write a PWM duty cycle (0-255) to a pin
    ///
    /// Callers are responsible for only passing PWM-capable pins.
    fn analog_write(&mut self, pin: u8, duty: u8);
}

/// Pin mode configuration and inspection
pub trait PinModeControl {
    /// Configure the electrical mode of a pin
    fn set_pin_mode(&mut self, pin: u8, mode: PinMode);

    /// Read the mode registers of a pin directly from hardware
    ///
    /// Implementations must not answer from a cached copy: the registers
    /// may have been changed by code outside the protocol engine.
    fn mode_registers(&self, pin: u8) -> ModeRegisters;

    /// Current electrical mode, derived from the registers
    fn current_mode(&self, pin: u8) -> PinMode {
        PinMode::from_registers(self.mode_registers(pin))
    }
}

/// Complete GPIO capability surface
pub trait Gpio: DigitalIo + AnalogIo + PinModeControl {}

// Blanket implementation for types that implement all three traits
impl<T: DigitalIo + AnalogIo + PinModeControl> Gpio for T {}
