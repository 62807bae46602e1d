//! The bit-banged bus
//!
//! [`SoftI2c`] owns one SDA/SCL line pair, a delay provider and the transmit
//! and receive buffers. All transfers are blocking; `&mut self` keeps a bus
//! to one transaction at a time.
//!
//! # Transactions
//!
//! A write is queued with `begin_transmission`/`write` and sent by
//! `end_transmission`; a read is executed by `request_from` and drained with
//! `read`. Both always end with a STOP, so a failed transfer leaves the bus
//! idle and the caller decides whether to retry.

mod protocol;
pub mod scan;
mod transfer;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use softwire_hal::i2c::BUFFER_SIZE;
use softwire_hal::{I2cConfig, OpenDrainLine, TwoWire};

use crate::error::I2cError;

/// Bit-banged I2C master on two GPIO lines
pub struct SoftI2c<SDA, SCL, D> {
    sda: SDA,
    scl: SCL,
    delay: D,
    config: I2cConfig,
    /// Cached from `config`
    half_period_ns: u32,
    /// Target of the queued transmission
    address: u8,
    tx: Vec<u8, BUFFER_SIZE>,
    rx: Vec<u8, BUFFER_SIZE>,
    /// Next unread position in `rx`
    rx_pos: usize,
    transmitting: bool,
}

impl<SDA, SCL, D> SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainLine,
    SCL: OpenDrainLine,
    D: DelayNs,
{
    /// Create a standard-mode (100 kHz) bus
    pub fn new(sda: SDA, scl: SCL, delay: D) -> Self {
        Self::with_config(sda, scl, delay, I2cConfig::default())
    }

    /// Create a bus with explicit timing
    pub fn with_config(sda: SDA, scl: SCL, delay: D, config: I2cConfig) -> Self {
        Self {
            sda,
            scl,
            delay,
            config,
            half_period_ns: config.half_period_ns(),
            address: 0,
            tx: Vec::new(),
            rx: Vec::new(),
            rx_pos: 0,
            transmitting: false,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    /// Check if a transmission has been started and not yet sent
    pub fn is_transmitting(&self) -> bool {
        self.transmitting
    }

    /// Bytes queued for the current transmission
    pub fn queued(&self) -> &[u8] {
        &self.tx
    }

    /// Release both lines and give back the pins and delay
    pub fn free(mut self) -> (SDA, SCL, D) {
        self.sda.release();
        self.scl.release();
        (self.sda, self.scl, self.delay)
    }

    fn transmit_queued(&mut self) -> Result<(), I2cError> {
        self.send_address(self.address, false)?;
        let queued = core::mem::take(&mut self.tx);
        self.write_all(&queued)
    }

    fn receive(&mut self, address: u8, count: usize) -> Result<(), I2cError> {
        if count == 0 {
            // A device that acknowledged a read already drives its first bit
            // and could hold SDA through the stop, so probe in write direction
            return self.send_address(address, false);
        }
        self.send_address(address, true)?;
        for index in 0..count {
            let byte = self.read_byte(index + 1 < count)?;
            // `count` never exceeds the buffer capacity
            let _ = self.rx.push(byte);
        }
        Ok(())
    }
}

impl<SDA, SCL, D> TwoWire for SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainLine,
    SCL: OpenDrainLine,
    D: DelayNs,
{
    type Error = I2cError;

    fn begin(&mut self) {
        self.sda.release();
        self.scl.release();
        self.delay.delay_ms(self.config.startup_delay_ms);
    }

    fn begin_transmission(&mut self, address: u8) {
        self.address = address & 0x7F;
        self.tx.clear();
        self.transmitting = true;
    }

    fn write(&mut self, byte: u8) -> Result<(), I2cError> {
        if !self.transmitting {
            return Err(I2cError::NoTransmission);
        }
        self.tx.push(byte).map_err(|_| {
            log_warn!("transmit buffer full, dropped {:#x}", byte);
            I2cError::BufferOverflow
        })
    }

    fn end_transmission(&mut self) -> Result<(), I2cError> {
        let result = self.transmit_queued();
        let result = self.finish(result);

        self.tx.clear();
        self.transmitting = false;
        result
    }

    fn request_from(&mut self, address: u8, count: usize) -> Result<usize, I2cError> {
        let count = count.min(BUFFER_SIZE);
        self.rx.clear();
        self.rx_pos = 0;

        let result = self.receive(address & 0x7F, count);
        if let Err(e) = self.finish(result) {
            self.rx.clear();
            return Err(e);
        }
        Ok(self.rx.len())
    }

    fn cancel_transmission(&mut self) {
        self.tx.clear();
        self.transmitting = false;
    }

    fn read(&mut self) -> Option<u8> {
        let byte = self.rx.get(self.rx_pos).copied()?;
        self.rx_pos += 1;
        Some(byte)
    }

    fn available(&self) -> usize {
        self.rx.len() - self.rx_pos
    }
}
