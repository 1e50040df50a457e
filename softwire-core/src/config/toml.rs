//! Minimal TOML parser for `monitor.toml`
//!
//! Handles only the subset the monitor needs. It does NOT support the full
//! TOML grammar.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs with decimal or `0x` hex integers
//! - Comments (`# ...`), whole-line or trailing
//!
//! Anything else is rejected rather than skipped, so a typo in a key name
//! never silently falls back to a default.

use softwire_hal::Address;

use super::MonitorConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line is neither a header, a key/value pair nor a comment
    InvalidLine,
    /// Section header not recognized
    UnknownSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value is not an integer or is out of range
    InvalidValue,
    /// Device address does not fit in 7 bits
    InvalidAddress,
    /// Clock and data configured on the same GPIO
    SamePin,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ParseError::InvalidLine => "malformed line",
            ParseError::UnknownSection => "unknown section",
            ParseError::UnknownKey => "unknown key",
            ParseError::InvalidValue => "invalid value",
            ParseError::InvalidAddress => "address out of 7-bit range",
            ParseError::SamePin => "scl_pin and sda_pin must differ",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Bus,
    Sensor,
    Display,
    Monitor,
}

/// Parse `monitor.toml` contents
///
/// Missing keys keep their [`MonitorConfig::default`] values.
pub fn parse_config(input: &str) -> Result<MonitorConfig, ParseError> {
    let mut config = MonitorConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header.strip_suffix(']').ok_or(ParseError::InvalidLine)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    validate(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "bus" => Ok(Section::Bus),
        "sensor" => Ok(Section::Sensor),
        "display" => Ok(Section::Display),
        "monitor" => Ok(Section::Monitor),
        _ => Err(ParseError::UnknownSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MonitorConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Bus, "scl_pin") => config.bus.scl_pin = parse_int(value)?,
        (Section::Bus, "sda_pin") => config.bus.sda_pin = parse_int(value)?,
        (Section::Bus, "delay") => config.bus.timing.delay = parse_int(value)?,
        (Section::Bus, "ack_retries") => config.bus.timing.ack_retries = parse_int(value)?,
        (Section::Sensor, "address") => config.sensor.address = parse_address(value)?,
        (Section::Sensor, "calibration_numerator") => {
            config.sensor.calibration.numerator = parse_int(value)?
        }
        (Section::Sensor, "calibration_denominator") => {
            config.sensor.calibration.denominator = parse_int(value)?
        }
        (Section::Display, "address") => config.display.address = parse_address(value)?,
        (Section::Monitor, "poll_interval_ms") => config.poll_interval_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn validate(config: &MonitorConfig) -> Result<(), ParseError> {
    if config.bus.scl_pin == config.bus.sda_pin {
        return Err(ParseError::SamePin);
    }
    if config.sensor.calibration.denominator == 0 {
        return Err(ParseError::InvalidValue);
    }
    if config.poll_interval_ms == 0 {
        return Err(ParseError::InvalidValue);
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
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

/// Parse a decimal or `0x` hex integer, allowing `_` separators
fn parse_int<T: TryFrom<i64>>(value: &str) -> Result<T, ParseError> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    let mut magnitude: i64 = 0;
    let mut any_digit = false;
    for c in digits.chars().filter(|&c| c != '_') {
        let digit = c.to_digit(radix).ok_or(ParseError::InvalidValue)?;
        magnitude = magnitude
            .checked_mul(radix as i64)
            .and_then(|m| m.checked_add(digit as i64))
            .ok_or(ParseError::InvalidValue)?;
        any_digit = true;
    }
    if !any_digit {
        return Err(ParseError::InvalidValue);
    }

    let signed = if negative { -magnitude } else { magnitude };
    T::try_from(signed).map_err(|_| ParseError::InvalidValue)
}

fn parse_address(value: &str) -> Result<Address, ParseError> {
    let raw: i64 = parse_int(value)?;
    u8::try_from(raw)
        .ok()
        .and_then(|raw| Address::new(raw).ok())
        .ok_or(ParseError::InvalidAddress)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Power monitor on a two-wire bus

[bus]
scl_pin = 1
sda_pin = 4
delay = 10        # spin units per edge
ack_retries = 10

[sensor]
address = 0x40
calibration_numerator = 5000
calibration_denominator = 10000

[display]
address = 0x3C

[monitor]
poll_interval_ms = 100
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.sensor.address.get(), 0x40);
        assert_eq!(config.display.address.get(), 0x3C);
    }

    #[test]
    fn test_empty_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), MonitorConfig::default());
    }

    #[test]
    fn test_overrides() {
        let input = "[bus]\nscl_pin = 2\nsda_pin = 3\ndelay = 0\n\
                     [sensor]\naddress = 0x41\ncalibration_numerator = 1_000\n";
        let config = parse_config(input).unwrap();
        assert_eq!(config.bus.scl_pin, 2);
        assert_eq!(config.bus.sda_pin, 3);
        assert_eq!(config.bus.timing.delay, 0);
        assert_eq!(config.bus.timing.ack_retries, 10);
        assert_eq!(config.sensor.address.get(), 0x41);
        assert_eq!(config.sensor.calibration.numerator, 1000);
    }

    #[test]
    fn test_same_pin_rejected() {
        let err = parse_config("[bus]\nscl_pin = 4\nsda_pin = 4\n").unwrap_err();
        assert_eq!(err, ParseError::SamePin);
    }

    #[test]
    fn test_address_out_of_range() {
        assert_eq!(
            parse_config("[sensor]\naddress = 0x80\n").unwrap_err(),
            ParseError::InvalidAddress
        );
        assert_eq!(
            parse_config("[display]\naddress = 300\n").unwrap_err(),
            ParseError::InvalidAddress
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[sensor]\ncalibration_denominator = 0\n").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("[bus]\nack_retries = 256\n").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("[bus]\ndelay = fast\n").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("[monitor]\npoll_interval_ms = 0\n").unwrap_err(),
            ParseError::InvalidValue
        );
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(
            parse_config("[heater]\n").unwrap_err(),
            ParseError::UnknownSection
        );
        assert_eq!(
            parse_config("[bus]\nspeed = 100\n").unwrap_err(),
            ParseError::UnknownKey
        );
        assert_eq!(
            parse_config("address = 0x40\n").unwrap_err(),
            ParseError::UnknownKey
        );
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_config("[bus\n").unwrap_err(),
            ParseError::InvalidLine
        );
        assert_eq!(
            parse_config("[bus]\nscl_pin\n").unwrap_err(),
            ParseError::InvalidLine
        );
    }

    #[test]
    fn test_parse_int_forms() {
        assert_eq!(parse_int::<u8>("0x3C"), Ok(0x3C));
        assert_eq!(parse_int::<u8>("0X7f"), Ok(0x7F));
        assert_eq!(parse_int::<i32>("-25"), Ok(-25));
        assert_eq!(parse_int::<u32>("10_000"), Ok(10_000));
        assert_eq!(parse_int::<u32>("-1"), Err(ParseError::InvalidValue));
        assert_eq!(parse_int::<u32>("0x"), Err(ParseError::InvalidValue));
    }
}
