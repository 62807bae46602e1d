//! Line and protocol primitives
//!
//! Every line transition is followed by a half clock period so setup and
//! hold times are met at the configured frequency. SCL is only ever released
//! through `release_scl`, which waits out clock stretching.

use embedded_hal::delay::DelayNs;
use softwire_hal::OpenDrainLine;

use super::SoftI2c;
use crate::error::I2cError;

impl<SDA, SCL, D> SoftI2c<SDA, SCL, D>
where
    SDA: OpenDrainLine,
    SCL: OpenDrainLine,
    D: DelayNs,
{
    fn delay_half(&mut self) {
        self.delay.delay_ns(self.half_period_ns);
    }

    /// Drive SDA low or release it
    fn set_sda(&mut self, high: bool) {
        self.sda.set_level(high);
        self.delay_half();
    }

    /// Release SDA and sample it after half a period
    fn sample_sda(&mut self) -> bool {
        self.sda.release();
        self.delay_half();
        self.sda.is_high()
    }

    fn drive_scl_low(&mut self) {
        self.scl.drive_low();
        self.delay_half();
    }

    /// Release SCL and wait until it actually reads high
    fn release_scl(&mut self) -> Result<(), I2cError> {
        self.scl.release();

        let mut waited_us = 0;
        while self.scl.is_low() {
            if waited_us >= self.config.clock_stretch_timeout_us {
                log_warn!("clock held low for {} us", waited_us);
                return Err(I2cError::ClockStretchTimeout);
            }
            self.delay.delay_us(1);
            waited_us += 1;
        }

        self.delay_half();
        Ok(())
    }

    /// START (or repeated START): SDA falls while SCL is high
    pub(super) fn start_condition(&mut self) -> Result<(), I2cError> {
        self.set_sda(true);
        self.release_scl()?;
        self.set_sda(false);
        self.drive_scl_low();
        Ok(())
    }

    /// STOP: SDA rises while SCL is high
    ///
    /// SDA is released even when SCL never comes back, so the master
    /// leaves both lines alone afterwards.
    pub(super) fn stop_condition(&mut self) -> Result<(), I2cError> {
        self.set_sda(false);
        let clock = self.release_scl();
        self.set_sda(true);
        clock
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), I2cError> {
        self.set_sda(bit);
        self.release_scl()?;
        self.drive_scl_low();
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, I2cError> {
        self.set_sda(true);
        self.release_scl()?;
        let bit = self.sample_sda();
        self.drive_scl_low();
        Ok(bit)
    }

    /// Clock out one byte MSB first; returns whether it was acknowledged
    pub(super) fn write_byte(&mut self, byte: u8) -> Result<bool, I2cError> {
        for shift in (0..8).rev() {
            self.write_bit(byte & (1 << shift) != 0)?;
        }
        let nack = self.read_bit()?;
        Ok(!nack)
    }

    /// Clock in one byte MSB first, then ACK (more to come) or NACK (last)
    pub(super) fn read_byte(&mut self, ack: bool) -> Result<u8, I2cError> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit()?);
        }
        self.write_bit(!ack)?;
        Ok(byte)
    }

    /// START followed by the address byte with the direction bit
    pub(super) fn send_address(&mut self, address: u8, read: bool) -> Result<(), I2cError> {
        self.start_condition()?;
        let header = ((address & 0x7F) << 1) | u8::from(read);
        if self.write_byte(header)? {
            Ok(())
        } else {
            log_debug!("address {:#x} not acknowledged", address);
            Err(I2cError::AddressNack)
        }
    }

    /// Write bytes after an acknowledged address, stopping at the first NACK
    pub(super) fn write_all(&mut self, bytes: &[u8]) -> Result<(), I2cError> {
        for (index, &byte) in bytes.iter().enumerate() {
            if !self.write_byte(byte)? {
                log_debug!("data byte {} not acknowledged", index);
                return Err(I2cError::DataNack { index });
            }
        }
        Ok(())
    }

    /// Fill `buf`, NACKing the final byte unless more reads follow
    pub(super) fn read_into(&mut self, buf: &mut [u8], more_follow: bool) -> Result<(), I2cError> {
        let len = buf.len();
        for (index, slot) in buf.iter_mut().enumerate() {
            let ack = index + 1 < len || more_follow;
            *slot = self.read_byte(ack)?;
        }
        Ok(())
    }

    /// End the transaction with a STOP whatever `result` holds
    ///
    /// The first error wins: a stop that times out after a NACK still
    /// reports the NACK.
    pub(super) fn finish<T>(&mut self, result: Result<T, I2cError>) -> Result<T, I2cError> {
        let stop = self.stop_condition();
        let value = result?;
        stop?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use crate::bus::SoftI2c;
    use crate::error::I2cError;
    use crate::sim::{SimBus, SimDevice, WireEvent};

    #[test]
    fn test_start_then_stop_frames_the_bus() {
        let wire = RefCell::new(SimBus::new(None));
        let (sda, scl, delay) = SimBus::lines(&wire);
        let mut bus = SoftI2c::new(sda, scl, delay);

        bus.start_condition().unwrap();
        assert!(!wire.borrow().scl());
        assert!(!wire.borrow().sda());

        bus.stop_condition().unwrap();
        let wire = wire.borrow();
        assert_eq!(wire.events(), &[WireEvent::Start, WireEvent::Stop]);
        assert!(wire.sda() && wire.scl());
        assert!(wire.master_released());
    }

    #[test]
    fn test_write_byte_msb_first() {
        let wire = RefCell::new(SimBus::new(Some(SimDevice::new(0x52))));
        let (sda, scl, delay) = SimBus::lines(&wire);
        let mut bus = SoftI2c::new(sda, scl, delay);

        bus.start_condition().unwrap();
        assert!(bus.write_byte(0xA4).unwrap());
        assert_eq!(
            wire.borrow().events()[1],
            WireEvent::Written {
                byte: 0xA4,
                acked: true
            }
        );
    }

    #[test]
    fn test_write_byte_reports_nack() {
        let wire = RefCell::new(SimBus::new(None));
        let (sda, scl, delay) = SimBus::lines(&wire);
        let mut bus = SoftI2c::new(sda, scl, delay);

        bus.start_condition().unwrap();
        assert!(!bus.write_byte(0x10).unwrap());
    }

    #[test]
    fn test_read_byte_ack_and_nack() {
        let device = SimDevice::new(0x02).with_response(&[0x81, 0x7E]);
        let wire = RefCell::new(SimBus::new(Some(device)));
        let (sda, scl, delay) = SimBus::lines(&wire);
        let mut bus = SoftI2c::new(sda, scl, delay);

        bus.send_address(0x02, true).unwrap();
        assert_eq!(bus.read_byte(true).unwrap(), 0x81);
        assert_eq!(bus.read_byte(false).unwrap(), 0x7E);
        bus.stop_condition().unwrap();

        let wire = wire.borrow();
        let events = wire.events();
        assert_eq!(
            events[2],
            WireEvent::Read {
                byte: 0x81,
                acked: true
            }
        );
        assert_eq!(
            events[3],
            WireEvent::Read {
                byte: 0x7E,
                acked: false
            }
        );
        assert_eq!(events[4], WireEvent::Stop);
    }

    #[test]
    fn test_clock_stretch_is_waited_out() {
        let device = SimDevice::new(0x02).with_stretch_ns(40_000);
        let wire = RefCell::new(SimBus::new(Some(device)));
        let (sda, scl, delay) = SimBus::lines(&wire);
        let mut bus = SoftI2c::new(sda, scl, delay);

        bus.send_address(0x02, false).unwrap();
        let before = wire.borrow().elapsed_ns();
        assert!(bus.write_byte(0x45).unwrap());
        let after = wire.borrow().elapsed_ns();

        // Unstretched the byte takes 140 us; 30 us of the stretch remain
        // once the first data bit has been set up
        assert!(after - before > 160_000);
        assert!(after - before < 180_000);
    }

    #[test]
    fn test_clock_stretch_timeout() {
        let device = SimDevice::new(0x02).with_stretch_ns(u64::MAX);
        let wire = RefCell::new(SimBus::new(Some(device)));
        let (sda, scl, delay) = SimBus::lines(&wire);
        let mut bus = SoftI2c::new(sda, scl, delay);

        bus.send_address(0x02, false).unwrap();
        let result = bus.write_byte(0x45);
        assert_eq!(result, Err(I2cError::ClockStretchTimeout));

        let stopped = bus.finish(result);
        assert_eq!(stopped, Err(I2cError::ClockStretchTimeout));
        assert!(wire.borrow().master_released());
    }
}
