//! Configuration types
//!
//! Board-agnostic description of how the monitor is wired: which GPIOs
//! carry the bus, how fast it runs, where the devices live and how the
//! shunt is calibrated. Loaded from `monitor.toml` by [`parse_config`].

pub mod toml;

pub use self::toml::{parse_config, ParseError};

use softwire_hal::Address;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bus::BusConfig;

/// Default INA219 address
pub const DEFAULT_SENSOR_ADDRESS: Address = Address::const_new(0x40);

/// Default SSD1306 address
pub const DEFAULT_DISPLAY_ADDRESS: Address = Address::const_new(0x3C);

/// Bus wiring and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusHwConfig {
    /// Clock GPIO number
    pub scl_pin: u8,
    /// Data GPIO number
    pub sda_pin: u8,
    /// Edge timing
    pub timing: BusConfig,
}

impl Default for BusHwConfig {
    fn default() -> Self {
        Self {
            scl_pin: 1,
            sda_pin: 4,
            timing: BusConfig::default(),
        }
    }
}

/// Shunt calibration as a ratio
///
/// Current in mA = shunt voltage in µV × numerator / denominator. A 2 mΩ
/// shunt is 5000 / 10000, a 10 mΩ shunt 1000 / 10000. Board layout shifts
/// the effective value, so it is best measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShuntCalibration {
    /// Scale numerator
    pub numerator: i32,
    /// Scale denominator (never zero)
    pub denominator: i32,
}

impl Default for ShuntCalibration {
    fn default() -> Self {
        Self {
            numerator: 5000,
            denominator: 10000,
        }
    }
}

impl ShuntCalibration {
    /// Convert a shunt voltage (µV) to current (mA)
    pub fn current_ma(&self, shunt_uv: i32) -> i32 {
        let scaled = shunt_uv as i64 * self.numerator as i64 / self.denominator as i64;
        scaled.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// Power sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// 7-bit device address
    pub address: Address,
    /// Shunt calibration
    pub calibration: ShuntCalibration,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SENSOR_ADDRESS,
            calibration: ShuntCalibration::default(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// 7-bit device address
    pub address: Address,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_DISPLAY_ADDRESS,
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorConfig {
    /// Bus wiring and timing
    pub bus: BusHwConfig,
    /// Power sensor
    pub sensor: SensorConfig,
    /// OLED display
    pub display: DisplayConfig,
    /// Time between readings in milliseconds
    pub poll_interval_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bus: BusHwConfig::default(),
            sensor: SensorConfig::default(),
            display: DisplayConfig::default(),
            poll_interval_ms: 100,
        }
    }
}
