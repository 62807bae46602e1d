//! Open-drain line abstractions
//!
//! An I2C line is never driven high. The master either pulls it low or lets
//! go of it, and the bus pull-up brings it back high unless some other device
//! is holding it down. Chip bindings implement [`OpenDrainLine`] with whatever
//! pin primitives they have; [`PinLine`] covers pins that a HAL already
//! configures as open-drain.

use embedded_hal::digital::{InputPin, OutputPin};

/// One line of a two-wire bus (SDA or SCL)
///
/// Every method may change the pin direction. Implementations should not add
/// any delay of their own; bit timing is owned by the bus engine.
pub trait OpenDrainLine {
    /// Actively pull the line low (output, logic 0)
    fn drive_low(&mut self);

    /// Stop driving the line so the pull-up floats it high
    ///
    /// Any device on the bus, the master included, may still hold it low.
    fn release(&mut self);

    /// Release the line and sample its level
    fn is_high(&mut self) -> bool;

    /// Release the line and check whether something holds it low
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }

    /// Drive low or release depending on the bit value
    fn set_level(&mut self, high: bool) {
        if high {
            self.release();
        } else {
            self.drive_low();
        }
    }
}

/// Adapter for embedded-hal pins configured as open-drain outputs
///
/// On such pins `set_high` releases the line and `is_high` reads the actual
/// bus level, which is exactly the open-drain contract. Pin errors are
/// treated as a released line.
pub struct PinLine<P> {
    pin: P,
}

impl<P> PinLine<P>
where
    P: OutputPin + InputPin,
{
    /// Wrap an open-drain pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OpenDrainLine for PinLine<P>
where
    P: OutputPin + InputPin,
{
    fn drive_low(&mut self) {
        let _ = self.pin.set_low();
    }

    fn release(&mut self) {
        let _ = self.pin.set_high();
    }

    fn is_high(&mut self) -> bool {
        self.release();
        self.pin.is_high().unwrap_or(true)
    }
}
