//! Minimal TOML reader for the kiosk configuration
//!
//! Handles only the subset `kiosk.toml` uses: no arrays, inline tables or
//! multi-line strings.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs (string, integer, boolean)
//! - Decimal integers with `_` separators and `0x` hex integers
//! - Comments (`# ...`), also after a value
//!
//! Keys missing from the input keep their defaults. Unknown sections and
//! keys are errors so that a typo does not silently fall back.

use heapless::String;

use super::types::{KioskConfig, Rotation};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String does not fit its field
    ValueTooLong,
    /// Display geometry the driver cannot handle
    InvalidDisplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
    Port,
    Commands,
    Display,
    Input,
    Job,
}

/// Largest panel the driver supports
const MAX_WIDTH: u8 = 128;
const MAX_HEIGHT: u8 = 64;

/// Parse `kiosk.toml` content on top of the defaults
pub fn parse_config(input: &str) -> Result<KioskConfig, ParseError> {
    let mut config = KioskConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header.strip_suffix(']').ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&mut config, section, key, value).map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Config key '{=str}': {}", key, e);
            e
        })?;
    }

    validate_display(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "link" => Ok(Section::Link),
        "port" => Ok(Section::Port),
        "commands" => Ok(Section::Commands),
        "display" => Ok(Section::Display),
        "input" => Ok(Section::Input),
        "job" => Ok(Section::Job),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    config: &mut KioskConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Link, "reconnect_delay_ms") => config.link.reconnect_delay_ms = parse_int(value)?,
        (Section::Link, "settle_delay_ms") => config.link.settle_delay_ms = parse_int(value)?,
        (Section::Link, "handshake_timeout_ms") => {
            config.link.handshake_timeout_ms = parse_timeout(value)?
        }
        (Section::Link, "connect_timeout_ms") => config.link.connect_timeout_ms = parse_int(value)?,
        (Section::Link, "link_timeout_ms") => config.link.link_timeout_ms = parse_timeout(value)?,
        (Section::Link, "baudrate") => config.link.baudrate = parse_int(value)?,

        (Section::Port, "transport") => config.port.transport = parse_text(value)?,
        (Section::Port, "path") => config.port.path = parse_text(value)?,
        (Section::Port, "baudrate") => config.port.baudrate = parse_int(value)?,

        (Section::Commands, "clear_alarm") => config.commands.clear_alarm = parse_text(value)?,
        (Section::Commands, "set_zero_axes") => config.commands.set_zero_axes = parse_text(value)?,
        (Section::Commands, "laser_test") => config.commands.laser_test = parse_text(value)?,

        (Section::Display, "width") => config.display.width = parse_u8(value)?,
        (Section::Display, "height") => config.display.height = parse_u8(value)?,
        (Section::Display, "i2c_address") => config.display.i2c_address = parse_u8(value)?,
        (Section::Display, "rotation") => config.display.rotation = parse_rotation(value)?,
        (Section::Display, "external_vcc") => config.display.external_vcc = parse_bool(value)?,

        (Section::Input, "debounce_us") => config.input.debounce_us = parse_int(value)?,

        (Section::Job, "max_size") => config.job.max_size = parse_int(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn validate_display(config: &KioskConfig) -> Result<(), ParseError> {
    let display = &config.display;
    let width_ok = (1..=MAX_WIDTH).contains(&display.width);
    let height_ok = (8..=MAX_HEIGHT).contains(&display.height) && display.height % 8 == 0;
    if width_ok && height_ok && display.i2c_address <= 0x7F {
        Ok(())
    } else {
        Err(ParseError::InvalidDisplay)
    }
}

/// Drop a trailing comment, leaving `#` inside strings alone
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// String value, quotes optional
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_text<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    String::try_from(parse_string(value)).map_err(|_| ParseError::ValueTooLong)
}

fn parse_int(value: &str) -> Result<u32, ParseError> {
    let (digits, radix) = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };
    if digits.is_empty() || digits.starts_with('_') {
        return Err(ParseError::InvalidValue);
    }

    let mut n: u32 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let digit = c.to_digit(radix).ok_or(ParseError::InvalidValue)?;
        n = n
            .checked_mul(radix)
            .and_then(|n| n.checked_add(digit))
            .ok_or(ParseError::InvalidValue)?;
    }
    Ok(n)
}

fn parse_u8(value: &str) -> Result<u8, ParseError> {
    u8::try_from(parse_int(value)?).map_err(|_| ParseError::InvalidValue)
}

/// Timeout in ms; 0 disables it
fn parse_timeout(value: &str) -> Result<Option<u32>, ParseError> {
    let ms = parse_int(value)?;
    Ok((ms > 0).then_some(ms))
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_rotation(value: &str) -> Result<Rotation, ParseError> {
    match parse_string(value) {
        "normal" => Ok(Rotation::Normal),
        "upside_down" => Ok(Rotation::UpsideDown),
        _ => Err(ParseError::InvalidValue),
    }
}
