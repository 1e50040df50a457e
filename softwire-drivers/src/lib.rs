//! Device clients
//!
//! Register-level drivers for the devices hanging off the soft bus, written
//! against [`softwire_hal::RegisterBus`] so they run on any transport:
//!
//! - Power sensor (INA219)
//! - OLED display (SSD1306, 128x32)
//! - The monitor that ties both together

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod display;
pub mod monitor;
pub mod sensor;

#[cfg(test)]
mod mock;
