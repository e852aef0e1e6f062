//! Board configuration types

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use pinwire_hal::UartConfig;

use super::parser::parse_board_config;

/// Maximum pins per board
pub const MAX_PINS: usize = 32;

/// Maximum label length (board name, firmware version)
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum pin alias length
pub const MAX_ALIAS_LEN: usize = 8;

/// Firmware version reported to the host
pub const FIRMWARE_VERSION: &str = "0.7.0";

/// Serial link speed when the board file names none
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Board file for the Arduino Nano, compiled into the firmware
const NANO_BOARD: &str = include_str!("../../boards/nano.toml");

/// PWM-capable pins of the ATmega328P, used if the embedded board file
/// fails to parse
const NANO_PWM_PINS: [u8; 6] = [3, 5, 6, 9, 10, 11];

/// Per-pin configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// Physical pin index as used on the wire
    pub id: u8,
    /// Human-readable name ("D13", "A0")
    pub alias: String<MAX_ALIAS_LEN>,
    /// Pin is an analog input channel
    pub analog: bool,
    /// Pin supports PWM output
    pub pwm: bool,
}

impl PinConfig {
    /// Plain digital pin
    pub fn digital(id: u8) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// PWM-capable digital pin
    pub fn pwm(id: u8) -> Self {
        Self {
            id,
            pwm: true,
            ..Default::default()
        }
    }

    /// Analog input pin
    pub fn analog(id: u8) -> Self {
        Self {
            id,
            analog: true,
            ..Default::default()
        }
    }
}

/// Board identity and pin table
///
/// Immutable once the engine starts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Board name (e.g. "nanoatmega328")
    pub name: String<MAX_LABEL_LEN>,
    /// Identifier leading every reply
    pub device_id: u16,
    /// Version string reported by the `zv` command
    pub firmware_version: String<MAX_LABEL_LEN>,
    /// Host link speed and framing
    pub uart: UartConfig,
    /// Pin table, sorted by pin id
    pub pins: Vec<PinConfig, MAX_PINS>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let mut firmware_version = String::new();
        // Cannot fail: the constant is shorter than MAX_LABEL_LEN
        let _ = firmware_version.push_str(FIRMWARE_VERSION);
        Self {
            name: String::new(),
            device_id: 0,
            firmware_version,
            uart: UartConfig::with_baudrate(DEFAULT_BAUDRATE),
            pins: Vec::new(),
        }
    }
}

impl BoardConfig {
    /// Create an empty board with default identity
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for the Arduino Nano
    ///
    /// Parses the embedded board file, falling back to a minimal pin table
    /// if that fails.
    pub fn nano() -> Self {
        match parse_board_config(NANO_BOARD) {
            Ok(config) => config,
            Err(e) => {
                error!("Embedded board file invalid: {:?}", e);
                Self::minimal_nano()
            }
        }
    }

    /// Last-resort Nano config: PWM pins only
    fn minimal_nano() -> Self {
        let mut config = Self::default();
        let _ = config.name.push_str("nanoatmega328");
        for id in NANO_PWM_PINS {
            let _ = config.pins.push(PinConfig::pwm(id));
        }
        config
    }

    /// Add a pin, replacing any previous entry with the same id
    ///
    /// Returns the pin back if the table is full.
    pub fn insert_pin(&mut self, pin: PinConfig) -> Result<(), PinConfig> {
        if let Some(existing) = self.pins.iter_mut().find(|p| p.id == pin.id) {
            *existing = pin;
            return Ok(());
        }
        self.pins.push(pin)?;
        self.pins.sort_unstable_by_key(|p| p.id);
        Ok(())
    }

    /// Look up a pin by id
    pub fn find_pin(&self, id: u8) -> Option<&PinConfig> {
        self.pins.iter().find(|p| p.id == id)
    }

    /// Resolve a pin name to its id
    ///
    /// Accepts a decimal id ("13") or an alias ("D13", "A0"). The pin must
    /// exist on the board.
    pub fn resolve_pin(&self, name: &str) -> Option<u8> {
        let name = name.trim();
        let id = match name.parse::<u8>() {
            Ok(id) => id,
            Err(_) => self.pins.iter().find(|p| p.alias.as_str() == name)?.id,
        };
        self.find_pin(id).map(|p| p.id)
    }

    /// True if `pin` may receive PWM writes
    pub fn is_pwm_capable(&self, pin: u8) -> bool {
        self.find_pin(pin).is_some_and(|p| p.pwm)
    }

    /// PWM-capable pin ids in ascending order
    pub fn pwm_pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.pins.iter().filter(|p| p.pwm).map(|p| p.id)
    }

    /// Analog input pin ids in ascending order
    pub fn analog_pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.pins.iter().filter(|p| p.analog).map(|p| p.id)
    }

    /// Digital (non-analog) pin ids in ascending order
    pub fn digital_pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.pins.iter().filter(|p| !p.analog).map(|p| p.id)
    }

    /// Serial parameters for the host link
    pub fn uart_config(&self) -> UartConfig {
        self.uart
    }
}
