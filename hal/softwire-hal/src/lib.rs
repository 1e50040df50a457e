//! Softwire Hardware Abstraction Layer
//!
//! This crate defines the narrow capabilities the bit-banged bus master is
//! built from, plus the register transport interface that device clients
//! consume. Chip-specific crates (RP2040, simulated wire, ...) implement the
//! pin and delay traits; the bus master implements the transport.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device clients (sensor, display)       │
//! └─────────────────────────────────────────┘
//!                     │  RegisterBus
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softwire-core (bit-banged bus master)  │
//! └─────────────────────────────────────────┘
//!                     │  OutputPin / FlexPin / BusDelay
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ softwire-hal- │       │  simulated    │
//! │    rp2040     │       │  wire (tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::FlexPin`] - Digital I/O
//! - [`delay::BusDelay`] - Bit timing
//! - [`i2c::RegisterBus`] - Register-addressed transfers

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use delay::BusDelay;
pub use gpio::{FlexPin, InputPin, OutputPin, PinDirection};
pub use i2c::{Address, InvalidAddress, RegisterAddress, RegisterBus};
