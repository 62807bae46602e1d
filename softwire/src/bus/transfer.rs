//! Transfer-style interfaces: `embedded_hal::i2c::I2c` and `I2cBus`
//!
//! These bypass the Wire-style buffers and clock caller-owned slices
//! directly, so they are not limited to 32 bytes.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use softwire_hal::{I2cBus, OpenDrainLine};

use super::SoftI2c;
use crate::error::I2cError;

impl<SDA, SCL, D> SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainLine,
    SCL: OpenDrainLine,
    D: DelayNs,
{
    /// Run operations back to back, without the final STOP
    ///
    /// Adjacent operations in the same direction share one address phase;
    /// a change of direction issues a repeated START. Empty reads are
    /// skipped: a device addressed for reading drives SDA until it sees a
    /// NACK, so reading zero bytes cannot be ended cleanly. A transaction
    /// of only empty reads becomes an address-only write probe.
    fn run_operations(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), I2cError> {
        let mut previous_read = None;

        for i in 0..operations.len() {
            if is_empty_read(&operations[i]) {
                continue;
            }
            let is_read = matches!(operations[i], Operation::Read(_));
            let next_is_read = matches!(
                operations[i + 1..].iter().find(|op| !is_empty_read(op)),
                Some(Operation::Read(_))
            );

            if previous_read != Some(is_read) {
                self.send_address(address, is_read)?;
            }

            match &mut operations[i] {
                Operation::Write(bytes) => self.write_all(bytes)?,
                Operation::Read(buf) => self.read_into(buf, next_is_read)?,
            }
            previous_read = Some(is_read);
        }

        if previous_read.is_none() {
            self.send_address(address, false)?;
        }
        Ok(())
    }
}

fn is_empty_read(operation: &Operation<'_>) -> bool {
    matches!(operation, Operation::Read(buf) if buf.is_empty())
}

impl<SDA, SCL, D> ErrorType for SoftI2c<SDA, SCL, D> {
    type Error = I2cError;
}

impl<SDA, SCL, D> I2c<SevenBitAddress> for SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainLine,
    SCL: OpenDrainLine,
    D: DelayNs,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }
        let result = self.run_operations(address, operations);
        self.finish(result)
    }
}

impl<SDA, SCL, D> I2cBus for SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainLine,
    SCL: OpenDrainLine,
    D: DelayNs,
{
    type Error = I2cError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
        I2c::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cError> {
        I2c::read(self, address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), I2cError> {
        I2c::write_read(self, address, write_data, read_buf)
    }
}
