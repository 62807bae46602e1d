//! Pin allocation for config-driven bus setup
//!
//! Bus pins come from configuration as plain GPIO numbers. The bank hands
//! each pin out at most once, so two buses can never end up sharing a line.

use embassy_rp::gpio::AnyPin;
use embassy_rp::{Peri, Peripherals};

use crate::line::FlexLine;

/// Number of user GPIOs on the RP2040
pub const PIN_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// SDA and SCL given the same pin
    SamePin,
}

/// Move numbered pins out of the peripherals into an array of `AnyPin`
macro_rules! pin_array {
    ($p:ident, $($pin:ident),* $(,)?) => {
        [$(Some(Peri::<'static, AnyPin>::from($p.$pin))),*]
    };
}

/// Holds every GPIO pin and gives them out by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; PIN_COUNT],
}

impl PinBank {
    /// Create a bank from Embassy peripherals
    ///
    /// Returns the hardware I2C blocks alongside, since boards that bit-bang
    /// one bus usually still drive another from the peripheral.
    pub fn from_peripherals(p: Peripherals) -> (Self, RemainingPeripherals) {
        let pins = pin_array!(
            p, PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9, PIN_10,
            PIN_11, PIN_12, PIN_13, PIN_14, PIN_15, PIN_16, PIN_17, PIN_18, PIN_19, PIN_20,
            PIN_21, PIN_22, PIN_23, PIN_24, PIN_25, PIN_26, PIN_27, PIN_28, PIN_29,
        );
        let remaining = RemainingPeripherals {
            i2c0: p.I2C0,
            i2c1: p.I2C1,
        };
        (Self { pins }, remaining)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin)?
            .take()
            .ok_or(PinError::AlreadyTaken)
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin_num: u8) -> bool {
        matches!(self.pins.get(pin_num as usize), Some(Some(_)))
    }

    /// Return a pin to the bank
    pub fn return_pin(&mut self, pin_num: u8, pin: Peri<'static, AnyPin>) {
        if let Some(slot) = self.pins.get_mut(pin_num as usize) {
            *slot = Some(pin);
        }
    }

    /// Take an SDA/SCL pair as released bus lines
    ///
    /// Nothing is taken unless both pins are available.
    pub fn take_bus_lines(
        &mut self,
        sda: u8,
        scl: u8,
    ) -> Result<(FlexLine<'static>, FlexLine<'static>), PinError> {
        if sda == scl {
            return Err(PinError::SamePin);
        }
        for pin in [sda, scl] {
            if pin as usize >= PIN_COUNT {
                return Err(PinError::InvalidPin);
            }
            if !self.is_available(pin) {
                return Err(PinError::AlreadyTaken);
            }
        }

        let sda = self.take(sda)?;
        let scl = self.take(scl)?;
        Ok((FlexLine::new(sda), FlexLine::new(scl)))
    }
}

/// Peripherals not consumed by the pin bank
pub struct RemainingPeripherals {
    pub i2c0: Peri<'static, embassy_rp::peripherals::I2C0>,
    pub i2c1: Peri<'static, embassy_rp::peripherals::I2C1>,
}
