//! I2C bus abstractions
//!
//! Provides the two master-side surfaces device drivers are written against:
//! the buffered [`TwoWire`] surface (queue bytes, then send them as one
//! transaction) and the transfer-style [`I2cBus`]. Both can be implemented
//! by a hardware peripheral or by the bit-banged engine.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest number of bytes a single buffered transaction can carry
pub const BUFFER_SIZE: usize = 32;

/// Buffered I2C master with a Wire-style interface
///
/// A write transaction is built with [`begin_transmission`](Self::begin_transmission)
/// and [`write`](Self::write), then sent by
/// [`end_transmission`](Self::end_transmission). A read transaction is
/// executed by [`request_from`](Self::request_from) and drained with
/// [`read`](Self::read).
pub trait TwoWire {
    /// Error type for bus operations
    type Error;

    /// Put both lines into the idle state and let the bus settle
    fn begin(&mut self);

    /// Start queueing a write to a 7-bit address
    fn begin_transmission(&mut self, address: u8);

    /// Queue one byte for the current transmission
    fn write(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send the queued bytes as one transaction
    ///
    /// The queue is emptied whatever the outcome.
    fn end_transmission(&mut self) -> Result<(), Self::Error>;

    /// Drop the queued bytes without touching the bus
    fn cancel_transmission(&mut self);

    /// Read up to [`BUFFER_SIZE`] bytes from a 7-bit address
    ///
    /// Returns the number of bytes now waiting in the receive buffer.
    fn request_from(&mut self, address: u8, count: usize) -> Result<usize, Self::Error>;

    /// Take the next received byte, `None` once the buffer is drained
    fn read(&mut self) -> Option<u8>;

    /// Number of received bytes not yet taken by [`read`](Self::read)
    fn available(&self) -> usize;

    /// Write a single register
    fn write_register(&mut self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write_registers(address, register, &[value])
    }

    /// Write consecutive registers starting at `register`
    ///
    /// If the block does not fit the transmit buffer nothing is sent.
    fn write_registers(
        &mut self,
        address: u8,
        register: u8,
        values: &[u8],
    ) -> Result<(), Self::Error> {
        self.begin_transmission(address);
        for &byte in core::iter::once(&register).chain(values) {
            if let Err(e) = self.write(byte) {
                self.cancel_transmission();
                return Err(e);
            }
        }
        self.end_transmission()
    }

    /// Set the register pointer, then read `buf.len()` bytes
    ///
    /// Returns how many bytes were actually stored in `buf`.
    fn read_registers(
        &mut self,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> Result<usize, Self::Error> {
        self.begin_transmission(address);
        self.write(register)?;
        self.end_transmission()?;

        self.request_from(address, buf.len())?;
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.read() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// This is commonly used to write a register address then read data.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// How long a peripheral may hold the clock low before the transfer fails
    pub clock_stretch_timeout_us: u32,
    /// Settling time after the lines are first released
    pub startup_delay_ms: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        clock_stretch_timeout_us: 1_000,
        startup_delay_ms: 10,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        clock_stretch_timeout_us: 1_000,
        startup_delay_ms: 10,
    };

    /// Half of one clock period in nanoseconds
    ///
    /// A zero frequency is treated as 1 Hz.
    pub fn half_period_ns(&self) -> u32 {
        500_000_000 / self.frequency.max(1)
    }
}
