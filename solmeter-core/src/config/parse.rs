//! Minimal TOML reader for `meter.toml`
//!
//! Handles only the subset the station configuration uses. It does NOT
//! support the full TOML spec.
//!
//! Supported features:
//! - `[section]` headers
//! - `key = value` pairs (string, integer, hex integer, float)
//! - Comments (`# ...`), also after a value
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings and escapes
//! - Dotted keys

use super::types::{truncated, MeterConfig, MAX_PASSPHRASE_LEN, MAX_SSID_LEN};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Malformed or unknown `[section]` header
    InvalidSection,
    /// Key not known in its section (or given before any section)
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String longer than its field allows
    ValueTooLong,
    /// Line is neither a header nor `key = value`
    InvalidLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sensor,
    Panel,
    Schedule,
    Network,
    Display,
}

/// A raw value as written in the file
#[derive(Debug, Clone, Copy, PartialEq)]
enum Value<'a> {
    Str(&'a str),
    Int(i64),
    Float(f32),
}

impl<'a> Value<'a> {
    fn as_f32(self) -> Result<f32, ParseError> {
        match self {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f32),
            _ => Err(ParseError::InvalidValue),
        }
    }

    fn as_uint<T: TryFrom<i64>>(self) -> Result<T, ParseError> {
        match self {
            Value::Int(v) => T::try_from(v).map_err(|_| ParseError::InvalidValue),
            _ => Err(ParseError::InvalidValue),
        }
    }

    fn as_str(self) -> Result<&'a str, ParseError> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(ParseError::InvalidValue),
        }
    }
}

/// Parse configuration text, starting from defaults
pub fn parse_config(input: &str) -> Result<MeterConfig, ParseError> {
    let mut config = MeterConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(line[1..line.len() - 1].trim())?;
            continue;
        }

        let (key, raw) = line.split_once('=').ok_or(ParseError::InvalidLine)?;
        let key = key.trim();
        let value = parse_value(raw.trim())?;
        apply(&mut config, section, key, value)?;
    }

    Ok(config)
}

fn parse_section_header(name: &str) -> Result<Section, ParseError> {
    match name {
        "sensor" => Ok(Section::Sensor),
        "panel" => Ok(Section::Panel),
        "schedule" => Ok(Section::Schedule),
        "network" => Ok(Section::Network),
        "display" => Ok(Section::Display),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing `# comment` that is not inside a string
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

fn parse_value(raw: &str) -> Result<Value<'_>, ParseError> {
    if let Some(rest) = raw.strip_prefix('"') {
        let inner = rest.strip_suffix('"').ok_or(ParseError::InvalidValue)?;
        return Ok(Value::Str(inner));
    }

    // TOML allows underscores as digit separators
    let mut digits: heapless::String<32> = heapless::String::new();
    for c in raw.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }

    if let Some(hex) = digits.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16)
            .map(Value::Int)
            .map_err(|_| ParseError::InvalidValue);
    }

    if let Ok(v) = digits.parse::<i64>() {
        return Ok(Value::Int(v));
    }

    digits
        .parse::<f32>()
        .map(Value::Float)
        .map_err(|_| ParseError::InvalidValue)
}

fn parse_address(text: &str) -> Result<[u8; 4], ParseError> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next().ok_or(ParseError::InvalidValue)?;
        *octet = part.parse().map_err(|_| ParseError::InvalidValue)?;
    }
    if parts.next().is_some() {
        return Err(ParseError::InvalidValue);
    }
    Ok(octets)
}

fn bounded<const N: usize>(text: &str) -> Result<heapless::String<N>, ParseError> {
    if text.len() > N {
        return Err(ParseError::ValueTooLong);
    }
    Ok(truncated(text))
}

fn apply(
    config: &mut MeterConfig,
    section: Section,
    key: &str,
    value: Value<'_>,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Sensor, "mv_per_amp") => config.sensor.mv_per_amp = value.as_f32()?,
        (Section::Sensor, "middle_mv") => config.sensor.middle_mv = value.as_f32()?,
        (Section::Sensor, "supply_mv") => config.sensor.supply_mv = value.as_f32()?,
        (Section::Sensor, "adc_full_scale") => config.sensor.adc_full_scale = value.as_uint()?,
        (Section::Sensor, "sample_count") => config.sensor.sample_count = value.as_uint()?,
        (Section::Sensor, "sample_interval_ms") => {
            config.sensor.sample_interval_ms = value.as_uint()?
        }

        (Section::Panel, "short_circuit_current_a") => {
            config.panel.short_circuit_current_a = value.as_f32()?
        }
        (Section::Panel, "irradiance_stc") => config.panel.irradiance_stc = value.as_f32()?,

        (Section::Schedule, "metrics_period_ms") => {
            config.schedule.metrics_period_ms = value.as_uint()?
        }
        (Section::Schedule, "environment_period_ms") => {
            config.schedule.environment_period_ms = value.as_uint()?
        }
        (Section::Schedule, "loop_pacing_ms") => config.schedule.loop_pacing_ms = value.as_uint()?,
        (Section::Schedule, "error_backoff_ms") => {
            config.schedule.error_backoff_ms = value.as_uint()?
        }
        (Section::Schedule, "splash_ms") => config.schedule.splash_ms = value.as_uint()?,

        (Section::Network, "ssid") => {
            config.network.ssid = bounded::<MAX_SSID_LEN>(value.as_str()?)?
        }
        (Section::Network, "passphrase") => {
            config.network.passphrase = bounded::<MAX_PASSPHRASE_LEN>(value.as_str()?)?
        }
        (Section::Network, "port") => config.network.port = value.as_uint()?,
        (Section::Network, "channel") => config.network.channel = value.as_uint()?,
        (Section::Network, "address") => config.network.address = parse_address(value.as_str()?)?,
        (Section::Network, "prefix_len") => config.network.prefix_len = value.as_uint()?,

        (Section::Display, "i2c_address") => config.display.i2c_address = value.as_uint()?,
        (Section::Display, "columns") => config.display.columns = value.as_uint()?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
