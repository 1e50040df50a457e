//! Board-agnostic core of the softwire power monitor
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Bit-banged two-wire bus master and register transport
//! - Bus error types
//! - Monitor configuration types and the `monitor.toml` parser
//! - A simulated wire with pluggable slave devices (`sim` feature)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod bus;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use bus::{BusConfig, SoftI2c};
pub use error::{AckPhase, BusError};
