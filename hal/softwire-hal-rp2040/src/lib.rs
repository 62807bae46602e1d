//! RP2040 bindings for the Softwire I2C master
//!
//! This crate connects the bit-banged engine to RP2040 GPIOs:
//!
//! - [`line::FlexLine`] - open-drain line emulated on a `Flex` pin
//! - [`pins::PinBank`] - config-driven pin allocation
//! - [`soft_i2c`] - a ready bus timed by `embassy_time::Delay`
//!
//! ```ignore
//! let (mut bank, _rest) = PinBank::from_peripherals(embassy_rp::init(Default::default()));
//! let mut bus = soft_i2c(&mut bank, 14, 15, I2cConfig::default())?;
//! bus.begin();
//! ```

#![no_std]

pub mod line;
pub mod pins;

pub use line::FlexLine;
pub use pins::{PinBank, PinError};
// Re-export shared traits for convenience
pub use softwire_hal::{I2cConfig, TwoWire};

use embassy_time::Delay;
use softwire::SoftI2c;

/// Software I2C bus on two RP2040 GPIOs
pub type Rp2040SoftI2c = SoftI2c<FlexLine<'static>, FlexLine<'static>, Delay>;

/// Build a bus on the given GPIO numbers
///
/// The lines are left released; call `begin()` before the first transfer.
pub fn soft_i2c(
    bank: &mut PinBank,
    sda: u8,
    scl: u8,
    config: I2cConfig,
) -> Result<Rp2040SoftI2c, PinError> {
    let (sda, scl) = bank.take_bus_lines(sda, scl)?;
    Ok(SoftI2c::with_config(sda, scl, Delay, config))
}
