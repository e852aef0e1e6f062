//! Board file parser
//!
//! A minimal TOML subset, enough for board description files. It does NOT
//! support the full TOML spec.
//!
//! Supported:
//! - Key = value pairs (string, integer, boolean)
//! - `[board]` and `[pin.N]` / `[pin N]` section headers
//! - Comments (# ...)
//!
//! Unknown keys are ignored so newer board files still load.

use heapless::String as HString;

use super::board::{BoardConfig, PinConfig};

/// Parse error
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Pin id out of range or not a number
    InvalidPin,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy)]
enum Section {
    Root,
    Board,
    Pin(u8),
}

/// Parse a board file into a [`BoardConfig`]
pub fn parse_board_config(input: &str) -> Result<BoardConfig, ParseError> {
    let mut config = BoardConfig::new();
    let mut section = Section::Root;
    let mut current_pin: Option<PinConfig> = None;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            save_pin(&mut config, &mut current_pin)?;

            section = parse_section_header(&line[1..line.len() - 1])?;
            if let Section::Pin(id) = section {
                current_pin = Some(PinConfig::digital(id));
            }
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config, &mut current_pin)?;
        }
    }

    save_pin(&mut config, &mut current_pin)?;

    debug!("Board '{}': {} pins", config.name.as_str(), config.pins.len());
    Ok(config)
}

/// Parse section header like "board", "pin.13" or "pin 13"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    let (kind, id) = match header.split_once('.') {
        Some((kind, id)) => (kind.trim(), Some(id.trim())),
        None => {
            let mut parts = header.split_whitespace();
            let kind = parts.next().ok_or(ParseError::InvalidSection)?;
            (kind, parts.next())
        }
    };

    match (kind, id) {
        ("board", None) => Ok(Section::Board),
        ("pin", Some(id)) => {
            let id: u8 = id.parse().map_err(|_| ParseError::InvalidPin)?;
            Ok(Section::Pin(id))
        }
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split a `key = value` line, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let (key, mut value) = (key.trim(), value.trim());

    // A '#' after an even number of quotes starts a comment
    if let Some(hash) = value.find('#') {
        if value[..hash].matches('"').count() % 2 == 0 {
            value = value[..hash].trim_end();
        }
    }

    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

/// Strip surrounding quotes; bare words pass through
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Quoted or bare text into bounded storage
fn parse_label<const N: usize>(value: &str) -> Result<HString<N>, ParseError> {
    HString::try_from(parse_string(value)).map_err(|_| ParseError::InvalidValue)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Only the literal words `true` and `false`
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut BoardConfig,
    current_pin: &mut Option<PinConfig>,
) -> Result<(), ParseError> {
    match section {
        Section::Board => match key {
            "name" => config.name = parse_label(value)?,
            "device_id" => config.device_id = parse_int(value)?,
            "firmware_version" => config.firmware_version = parse_label(value)?,
            "baudrate" => config.uart.baudrate = parse_int(value)?,
            "framing" => {
                config.uart = config
                    .uart
                    .with_framing(parse_string(value))
                    .ok_or(ParseError::InvalidValue)?
            }
            _ => trace!("Ignoring board key '{}'", key),
        },
        Section::Pin(_) => {
            if let Some(pin) = current_pin {
                match key {
                    "alias" => pin.alias = parse_label(value)?,
                    "analog" => pin.analog = parse_bool(value)?,
                    "pwm" => pin.pwm = parse_bool(value)?,
                    _ => trace!("Ignoring pin key '{}'", key),
                }
            }
        }
        Section::Root => trace!("Ignoring top-level key '{}'", key),
    }
    Ok(())
}

fn save_pin(config: &mut BoardConfig, current_pin: &mut Option<PinConfig>) -> Result<(), ParseError> {
    if let Some(pin) = current_pin.take() {
        config
            .insert_pin(pin)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}
