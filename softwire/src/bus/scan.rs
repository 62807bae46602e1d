//! Bus scanning
//!
//! Each address is probed with an address-only write (START, address, STOP).
//! No data byte is sent, so register pointers on the devices are left alone.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use softwire_hal::OpenDrainLine;

use super::SoftI2c;
use crate::error::I2cError;

/// Lowest 7-bit address normally probed (0x00-0x07 are reserved)
pub const DEFAULT_START_ADDR: u8 = 0x08;
/// Highest 7-bit address normally probed (0x78-0x7F are reserved)
pub const DEFAULT_END_ADDR: u8 = 0x77;

/// Addresses that acknowledged a probe, in ascending order
///
/// Sized for the whole 7-bit space, since `scan_range` accepts any range.
pub type ScanResult = Vec<u8, 128>;

impl<SDA, SCL, D> SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainLine,
    SCL: OpenDrainLine,
    D: DelayNs,
{
    /// Probe the non-reserved address range
    pub fn scan(&mut self) -> Result<ScanResult, I2cError> {
        self.scan_range(DEFAULT_START_ADDR, DEFAULT_END_ADDR)
    }

    /// Probe every address in `start..=end`
    ///
    /// Stops early only on a clock stretch timeout, since a stuck clock
    /// would make every later probe fail the same way.
    pub fn scan_range(&mut self, start: u8, end: u8) -> Result<ScanResult, I2cError> {
        let mut found = ScanResult::new();

        for address in start..=end.min(0x7F) {
            let probe = self.send_address(address, false);
            match self.finish(probe) {
                Ok(()) => {
                    log_debug!("found device at {:#x}", address);
                    let _ = found.push(address);
                }
                Err(I2cError::AddressNack) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(found)
    }
}
