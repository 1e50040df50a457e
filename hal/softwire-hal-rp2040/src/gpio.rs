//! Open-drain GPIO
//!
//! The RP2040 has no open-drain output mode, so it is emulated: the output
//! latch is kept low and only the pad direction changes. Driving the line
//! high means releasing it to the pull-up, which is also what lets a slave
//! pull it low for an acknowledge.

use embassy_rp::gpio::{AnyPin, Flex, Pull};
use embassy_rp::Peri;
use softwire_hal::{FlexPin, InputPin, OutputPin, PinDirection};

/// Bus line with emulated open-drain output
pub struct OpenDrainPin<'d> {
    pin: Flex<'d>,
}

impl<'d> OpenDrainPin<'d> {
    /// Configure `pin` as a released open-drain line
    ///
    /// The internal pull-up is enabled; it is too weak for fast buses, so
    /// boards should still fit external pull-ups.
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(Pull::Up);
        pin.set_low();
        pin.set_as_input();
        Self { pin }
    }
}

impl OutputPin for OpenDrainPin<'_> {
    fn set_high(&mut self) {
        self.pin.set_as_input();
    }

    fn set_low(&mut self) {
        self.pin.set_as_output();
    }
}

impl InputPin for OpenDrainPin<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl FlexPin for OpenDrainPin<'_> {
    fn set_direction(&mut self, direction: PinDirection) {
        // Output needs no change: the next level write picks the pad mode
        if direction == PinDirection::Input {
            self.pin.set_as_input();
        }
    }
}
