//! Softwire Hardware Abstraction Layer
//!
//! This crate defines the traits shared by the bit-banged I2C engine, the
//! chip-specific line bindings (RP2040, ...) and the device drivers that sit
//! on top of an I2C bus. Drivers written against these traits run unchanged
//! on a hardware I2C peripheral or on the software engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device drivers (motor, servo, ...)     │
//! └─────────────────────────────────────────┘
//!                     │  TwoWire / I2cBus
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softwire (bit-banged I2C engine)       │
//! └─────────────────────────────────────────┘
//!                     │  OpenDrainLine + DelayNs
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  softwire-hal │       │ any embedded- │
//! │    -rp2040    │       │ hal 1.0 pin   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OpenDrainLine`] - One open-drain bus line
//! - [`i2c::TwoWire`] - Buffered, Wire-style I2C master surface
//! - [`i2c::I2cBus`] - Transfer-style I2C master operations

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use embedded_hal::delay::DelayNs;
pub use gpio::{OpenDrainLine, PinLine};
pub use i2c::{I2cBus, I2cConfig, TwoWire};
