//! Power sensors

pub mod ina219;

pub use ina219::{BusVoltage, Ina219, PowerReading};
pub use softwire_core::config::ShuntCalibration;
