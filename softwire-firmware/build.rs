//! Build script for softwire-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates monitor.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIOs usable for the bus on the RP2040
const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate monitor.toml at compile time
///
/// The firmware parses the same file at boot and falls back to defaults
/// when it is rejected; catching mistakes here keeps that from happening
/// silently.
fn validate_config() {
    println!("cargo:rerun-if-changed=monitor.toml");

    let config_path = Path::new("monitor.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read monitor.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in monitor.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    check_keys(&config, &mut errors);
    validate_bus(&config, &mut errors);
    validate_addresses(&config, &mut errors);
    validate_calibration(&config, &mut errors);

    if let Some(interval) = integer(&config, "monitor", "poll_interval_ms") {
        if interval <= 0 || interval > u32::MAX as i64 {
            errors.push("[monitor] poll_interval_ms must be 1-4294967295".to_string());
        }
    }

    if !errors.is_empty() {
        fail("Invalid monitor.toml", &errors);
    }

    println!("cargo:warning=monitor.toml validated successfully");
}

/// Sections and the keys each one accepts
const SCHEMA: &[(&str, &[&str])] = &[
    ("bus", &["scl_pin", "sda_pin", "delay", "ack_retries"]),
    (
        "sensor",
        &["address", "calibration_numerator", "calibration_denominator"],
    ),
    ("display", &["address"]),
    ("monitor", &["poll_interval_ms"]),
];

/// Reject unknown sections and keys, and anything that is not an integer
fn check_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (section, value) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };
        for (key, value) in table {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            } else if !value.is_integer() {
                errors.push(format!("[{}] {} must be an integer", section, key));
            }
        }
    }
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    let scl = integer(config, "bus", "scl_pin").unwrap_or(1);
    let sda = integer(config, "bus", "sda_pin").unwrap_or(4);

    for (name, pin) in [("scl_pin", scl), ("sda_pin", sda)] {
        if !(0..GPIO_COUNT).contains(&pin) {
            errors.push(format!("[bus] {} must be 0-{}", name, GPIO_COUNT - 1));
        }
    }
    if scl == sda {
        errors.push("[bus] scl_pin and sda_pin must differ".to_string());
    }

    if let Some(delay) = integer(config, "bus", "delay") {
        if !(0..=u32::MAX as i64).contains(&delay) {
            errors.push("[bus] delay must be 0-4294967295".to_string());
        }
    }
    if let Some(retries) = integer(config, "bus", "ack_retries") {
        if !(0..=255).contains(&retries) {
            errors.push("[bus] ack_retries must be 0-255".to_string());
        }
    }
}

fn validate_addresses(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["sensor", "display"] {
        if let Some(address) = integer(config, section, "address") {
            if !(0..=0x7F).contains(&address) {
                errors.push(format!("[{}] address must be 0x00-0x7F", section));
            }
        }
    }
}

fn validate_calibration(config: &toml::Value, errors: &mut Vec<String>) {
    let range = i32::MIN as i64..=i32::MAX as i64;
    for key in ["calibration_numerator", "calibration_denominator"] {
        if let Some(value) = integer(config, "sensor", key) {
            if !range.contains(&value) {
                errors.push(format!("[sensor] {} must fit in 32 bits", key));
            }
        }
    }
    if integer(config, "sensor", "calibration_denominator") == Some(0) {
        errors.push("[sensor] calibration_denominator must not be 0".to_string());
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let line = if line.chars().count() > 62 {
                    format!("{}...", line.chars().take(59).collect::<String>())
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
