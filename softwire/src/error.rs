//! Bus error type

use core::fmt;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Error from a bit-banged I2C operation
///
/// Every variant that comes out of a transaction is returned only after
/// the stop condition has been issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// No device acknowledged the address byte
    AddressNack,
    /// The device rejected a data byte
    DataNack {
        /// Position of the rejected byte in the outgoing data
        ///
        /// In a multi-operation transaction this counts from the start of
        /// the write operation that failed, not of the whole transaction.
        index: usize,
    },
    /// The transmit buffer was already full; the byte was not queued
    BufferOverflow,
    /// A device held the clock low longer than the configured timeout
    ClockStretchTimeout,
    /// Byte written without a transmission in progress
    NoTransmission,
}

impl I2cError {
    /// Status code in the Arduino Wire convention
    ///
    /// 1 = data too long, 2 = address NACK, 3 = data NACK, 4 = other,
    /// 5 = timeout. Success (0) has no error value.
    pub fn code(&self) -> u8 {
        match self {
            I2cError::BufferOverflow => 1,
            I2cError::AddressNack => 2,
            I2cError::DataNack { .. } => 3,
            I2cError::NoTransmission => 4,
            I2cError::ClockStretchTimeout => 5,
        }
    }
}

impl fmt::Display for I2cError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            I2cError::AddressNack => write!(f, "address not acknowledged"),
            I2cError::DataNack { index } => write!(f, "data byte {} not acknowledged", index),
            I2cError::BufferOverflow => write!(f, "transmit buffer full"),
            I2cError::ClockStretchTimeout => write!(f, "clock stretch timeout"),
            I2cError::NoTransmission => write!(f, "no transmission in progress"),
        }
    }
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> ErrorKind {
        match self {
            I2cError::AddressNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            I2cError::DataNack { .. } => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            I2cError::BufferOverflow => ErrorKind::Overrun,
            I2cError::ClockStretchTimeout | I2cError::NoTransmission => ErrorKind::Other,
        }
    }
}
