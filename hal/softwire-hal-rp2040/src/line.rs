//! Open-drain bus line on an RP2040 GPIO
//!
//! The RP2040 has no open-drain output mode, so a line is emulated with a
//! `Flex` pin: output-low to pull the line down, input with pull-up to let
//! it float. The internal pull-up (~50k) is weak; real buses still want
//! external resistors.

use embassy_rp::gpio::{AnyPin, Flex, Pull};
use embassy_rp::Peri;
use softwire_hal::OpenDrainLine;

/// One I2C line on a GPIO pin
pub struct FlexLine<'d> {
    pin: Flex<'d>,
}

impl<'d> FlexLine<'d> {
    /// Take a pin and leave it released
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        let mut line = Self {
            pin: Flex::new(pin),
        };
        // Output latch stays low; only the direction changes from here on
        line.pin.set_low();
        line.release();
        line
    }
}

impl OpenDrainLine for FlexLine<'_> {
    fn drive_low(&mut self) {
        self.pin.set_low();
        self.pin.set_as_output();
    }

    fn release(&mut self) {
        self.pin.set_as_input();
        self.pin.set_pull(Pull::Up);
    }

    fn is_high(&mut self) -> bool {
        self.release();
        self.pin.is_high()
    }
}
