//! RP2040 backend for the softwire bus master
//!
//! Implements the `softwire-hal` capabilities on RP2040 GPIO:
//!
//! - Open-drain emulation on a bidirectional pin
//! - Cycle-counted busy-wait delay
//! - Config-driven pin allocation by GPIO number

#![no_std]

pub mod delay;
pub mod gpio;
pub mod pins;

pub use delay::SpinDelay;
pub use gpio::OpenDrainPin;
pub use pins::{PinBank, PinError};
