//! GPIO pin abstractions
//!
//! The bus lines are assumed to be open-drain with an external pull-up:
//! "high" means released and "low" means actively pulled down. Pins wired
//! push-pull instead must switch the data line to an input whenever the
//! slave is expected to drive it, which is what [`FlexPin::set_direction`]
//! is for.

/// Direction of a bidirectional pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    /// Pin is driven by this side
    Output,
    /// Pin floats and is only sampled
    Input,
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (released, for open-drain lines)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Pin that is both driven and read back
///
/// Used for the data line, which the master drives while transmitting and
/// samples while the slave transmits or acknowledges.
pub trait FlexPin: OutputPin + InputPin {
    /// Switch the pin direction
    ///
    /// Open-drain implementations can leave this empty: a released line is
    /// already readable.
    fn set_direction(&mut self, direction: PinDirection);
}
