//! Bit-banged two-wire bus master
//!
//! Emulates the bus electrically and temporally using only pin writes,
//! pin reads and a busy-wait. Every edge is separated from the previous
//! edge by at least one delay unit.
//!
//! # Wire framing
//!
//! ```text
//!         start        bit (MSB first)        ack         stop
//! SCL  ‾‾‾‾‾‾‾‾\____/‾‾‾‾‾\____ ... ____/‾‾‾‾‾\______/‾‾‾‾‾‾‾‾
//! SDA  ‾‾‾‾\________XXXXXXXXXXX ... XXXX  (slave)  ____/‾‾‾‾‾
//! ```
//!
//! - Start: data falls while clock is high
//! - Stop: data rises while clock is high
//! - Data changes only while clock is low and is sampled while clock is high
//!
//! The primitives here are public so unusual devices can be driven by
//! hand, but callers are then responsible for framing: every sequence must
//! begin with [`SoftI2c::start`] and end with [`SoftI2c::stop`]. The
//! register transactions in [`register`] do this for you.

pub mod hal;
pub mod register;

use softwire_hal::{BusDelay, FlexPin, InputPin, OutputPin, PinDirection};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of extra acknowledge samples before giving up
pub const DEFAULT_ACK_RETRIES: u8 = 10;

/// Default delay unit count between edges
pub const DEFAULT_DELAY: u32 = 10;

/// Bus timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// Delay units between edges (larger = slower, more tolerant bus)
    pub delay: u32,
    /// Extra data samples taken while waiting for an acknowledge
    pub ack_retries: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            ack_retries: DEFAULT_ACK_RETRIES,
        }
    }
}

impl BusConfig {
    /// Create a config with the given delay and the default retry count
    pub const fn with_delay(delay: u32) -> Self {
        Self {
            delay,
            ack_retries: DEFAULT_ACK_RETRIES,
        }
    }
}

/// Software two-wire bus master
///
/// Owns the clock pin, the data pin and the delay used to time them. A
/// single instance is created at startup and handed by `&mut` to every
/// device client, so at most one transaction can be in flight.
pub struct SoftI2c<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    config: BusConfig,
}

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: FlexPin,
    D: BusDelay,
{
    /// Create a bus master and release both lines (bus idle)
    pub fn new(scl: SCL, sda: SDA, delay: D, config: BusConfig) -> Self {
        let mut bus = Self {
            scl,
            sda,
            delay,
            config,
        };
        bus.sda.set_direction(PinDirection::Output);
        bus.sda.set_high();
        bus.scl.set_high();
        bus
    }

    /// Timing configuration
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Give the pins and delay back
    pub fn free(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    fn wait(&mut self) {
        self.delay.delay(self.config.delay);
    }

    /// Generate a start condition (or a repeated start mid-transaction)
    ///
    /// Leaves the clock low, ready for the first bit.
    pub fn start(&mut self) {
        self.sda.set_high();
        self.wait();
        self.scl.set_high();
        self.wait();
        self.sda.set_low();
        self.wait();
        self.scl.set_low();
        self.wait();
    }

    /// Generate a stop condition and leave the bus idle
    pub fn stop(&mut self) {
        self.sda.set_low();
        self.wait();
        self.scl.set_high();
        self.wait();
        self.sda.set_high();
        self.wait();
    }

    /// Clock out one bit
    pub fn write_bit(&mut self, bit: bool) {
        self.sda.set_state(bit);
        self.wait();
        self.scl.set_high();
        self.wait();
        self.scl.set_low();
        self.wait();
    }

    /// Clock in one bit; the data line must already be released
    pub fn read_bit(&mut self) -> bool {
        self.scl.set_high();
        self.wait();
        let bit = self.sda.is_high();
        self.scl.set_low();
        self.wait();
        bit
    }

    /// Clock out a byte, most significant bit first
    pub fn write_byte(&mut self, byte: u8) {
        for i in (0..8).rev() {
            self.write_bit(byte & (1 << i) != 0);
        }
    }

    /// Clock in a byte, most significant bit first
    pub fn read_byte(&mut self) -> u8 {
        self.sda.set_high();
        self.sda.set_direction(PinDirection::Input);
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.read_bit() as u8;
        }
        self.sda.set_direction(PinDirection::Output);
        byte
    }

    /// Wait for the slave to acknowledge the last byte
    ///
    /// Samples the data line once, then up to `ack_retries` more times
    /// while it stays high. Returns `true` if the slave pulled it low.
    pub fn wait_ack(&mut self) -> bool {
        self.sda.set_high();
        self.sda.set_direction(PinDirection::Input);
        self.wait();
        self.scl.set_high();
        self.wait();

        let mut acked = self.sda.is_low();
        let mut retries = self.config.ack_retries;
        while !acked && retries > 0 {
            retries -= 1;
            self.wait();
            acked = self.sda.is_low();
        }

        self.scl.set_low();
        self.sda.set_direction(PinDirection::Output);
        self.wait();
        acked
    }

    /// Acknowledge a received byte (more bytes wanted)
    pub fn write_ack(&mut self) {
        self.sda.set_low();
        self.wait();
        self.scl.set_high();
        self.wait();
        self.scl.set_low();
        self.wait();
        self.sda.set_high();
        self.wait();
    }

    /// Not-acknowledge a received byte (last byte of a read)
    pub fn write_nack(&mut self) {
        self.sda.set_high();
        self.wait();
        self.scl.set_high();
        self.wait();
        self.scl.set_low();
        self.wait();
    }
}
