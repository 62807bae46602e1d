//! Bit-banged I2C master
//!
//! This crate drives an I2C bus from two ordinary GPIO pins, for boards
//! where the hardware I2C peripheral is taken or where several independent
//! buses are needed. It provides:
//!
//! - Line primitives on top of [`softwire_hal::OpenDrainLine`]
//! - Start/stop conditions, bit and byte transfers, clock stretching
//! - A buffered transaction API ([`softwire_hal::TwoWire`])
//! - [`embedded_hal::i2c::I2c`] and [`softwire_hal::I2cBus`] implementations
//! - A bus scanner
//!
//! # Usage
//!
//! ```ignore
//! let mut bus = SoftI2c::new(sda, scl, delay);
//! bus.begin();
//!
//! bus.begin_transmission(0x02);
//! bus.write(0x45)?;
//! bus.write(0x32)?;
//! bus.end_transmission()?;
//!
//! bus.request_from(0x02, 4)?;
//! while let Some(byte) = bus.read() {
//!     // ...
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod bus;
pub mod error;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use bus::scan::{ScanResult, DEFAULT_END_ADDR, DEFAULT_START_ADDR};
pub use bus::SoftI2c;
pub use error::I2cError;
pub use softwire_hal::i2c::BUFFER_SIZE;
pub use softwire_hal::{I2cBus, I2cConfig, OpenDrainLine, TwoWire};
