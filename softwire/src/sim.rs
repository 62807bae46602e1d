//! Wire-level bus simulator
//!
//! [`SimBus`] models the two open-drain lines of a bus with one optional
//! peripheral attached. The peripheral decodes START/STOP edges and clocked
//! bits exactly like a real device would, acknowledges its address, serves
//! read data, can reject a data byte and can stretch the clock. Everything
//! observed on the wire is recorded as [`WireEvent`]s.
//!
//! ```ignore
//! let wire = RefCell::new(SimBus::new(Some(SimDevice::new(0x02))));
//! let (sda, scl, delay) = SimBus::lines(&wire);
//! let mut bus = SoftI2c::new(sda, scl, delay);
//! // ... run transactions ...
//! assert_eq!(wire.borrow().events()[0], WireEvent::Start);
//! ```
//!
//! Time only moves when the engine delays, so clock stretching is measured
//! in simulated nanoseconds.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use softwire_hal::i2c::BUFFER_SIZE;
use softwire_hal::OpenDrainLine;

/// Number of wire events kept before new ones are dropped
pub const EVENT_CAPACITY: usize = 1024;

/// Something observed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    /// SDA fell while SCL was high
    Start,
    /// SDA rose while SCL was high
    Stop,
    /// Byte clocked out by the master, and whether the peripheral ACKed it
    Written { byte: u8, acked: bool },
    /// Byte clocked out by the peripheral, and whether the master ACKed it
    Read { byte: u8, acked: bool },
}

/// Simulated I2C peripheral
#[derive(Debug, Clone)]
pub struct SimDevice {
    /// 7-bit address the device answers to
    pub address: u8,
    /// Index of the data byte (after the address) the device rejects
    pub nack_at: Option<usize>,
    /// Bytes served on reads, 0xFF once exhausted
    pub response: Vec<u8, BUFFER_SIZE>,
    /// Clock stretch applied after every acknowledge bit (0 = none)
    pub stretch_ns: u64,
}

impl SimDevice {
    /// Device that acknowledges everything and serves no data
    pub fn new(address: u8) -> Self {
        Self {
            address,
            nack_at: None,
            response: Vec::new(),
            stretch_ns: 0,
        }
    }

    /// Serve these bytes on reads
    pub fn with_response(mut self, bytes: &[u8]) -> Self {
        self.response.clear();
        for &byte in bytes.iter().take(BUFFER_SIZE) {
            let _ = self.response.push(byte);
        }
        self
    }

    /// Reject the data byte at `index`
    pub fn with_nack_at(mut self, index: usize) -> Self {
        self.nack_at = Some(index);
        self
    }

    /// Hold SCL low for `ns` after every acknowledge bit
    pub fn with_stretch_ns(mut self, ns: u64) -> Self {
        self.stretch_ns = ns;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Receive,
    Transmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for a START
    Idle,
    /// Shifting in a byte from the master
    Receive { address: bool },
    /// Holding SDA low for the acknowledge bit
    AckSlot { then: Next },
    /// Shifting a byte out to the master
    Transmit,
    /// Master's acknowledge bit after a transmitted byte
    MasterAck,
    /// Not addressed, or done; waiting for START/STOP
    Ignore,
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Sda,
    Scl,
}

/// Two simulated open-drain lines plus one optional peripheral
pub struct SimBus {
    device: Option<SimDevice>,
    master_sda_low: bool,
    master_scl_low: bool,
    device_sda_low: bool,
    device_scl_low: bool,
    stretch_left_ns: u64,
    sda: bool,
    scl: bool,
    phase: Phase,
    bits: u8,
    shift: u8,
    received: usize,
    tx_index: usize,
    tx_byte: u8,
    master_acked: bool,
    events: Vec<WireEvent, EVENT_CAPACITY>,
    elapsed_ns: u64,
}

impl SimBus {
    /// Create an idle bus, optionally with a device attached
    pub fn new(device: Option<SimDevice>) -> Self {
        Self {
            device,
            master_sda_low: false,
            master_scl_low: false,
            device_sda_low: false,
            device_scl_low: false,
            stretch_left_ns: 0,
            sda: true,
            scl: true,
            phase: Phase::Idle,
            bits: 0,
            shift: 0,
            received: 0,
            tx_index: 0,
            tx_byte: 0xFF,
            master_acked: false,
            events: Vec::new(),
            elapsed_ns: 0,
        }
    }

    /// Master-side handles: (SDA line, SCL line, delay)
    pub fn lines(bus: &RefCell<SimBus>) -> (SimLine<'_>, SimLine<'_>, SimDelay<'_>) {
        (
            SimLine {
                bus,
                role: Role::Sda,
            },
            SimLine {
                bus,
                role: Role::Scl,
            },
            SimDelay { bus },
        )
    }

    /// Everything recorded so far
    pub fn events(&self) -> &[WireEvent] {
        &self.events
    }

    /// Forget recorded events
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Bytes the master clocked out, in order
    pub fn written(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(|event| match event {
            WireEvent::Written { byte, .. } => Some(*byte),
            _ => None,
        })
    }

    /// Number of recorded events equal to `event`
    pub fn count(&self, event: WireEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    /// Simulated time spent in delays
    pub fn elapsed_ns(&self) -> u64 {
        self.elapsed_ns
    }

    /// True when the master drives neither line
    pub fn master_released(&self) -> bool {
        !self.master_sda_low && !self.master_scl_low
    }

    /// Current SDA level
    pub fn sda(&self) -> bool {
        self.sda
    }

    /// Current SCL level
    pub fn scl(&self) -> bool {
        self.scl
    }

    fn set_master(&mut self, role: Role, low: bool) {
        match role {
            Role::Sda => self.master_sda_low = low,
            Role::Scl => self.master_scl_low = low,
        }
        self.settle();
    }

    fn level(&self, role: Role) -> bool {
        match role {
            Role::Sda => self.sda,
            Role::Scl => self.scl,
        }
    }

    fn advance(&mut self, ns: u64) {
        self.elapsed_ns = self.elapsed_ns.saturating_add(ns);
        if self.device_scl_low {
            if self.stretch_left_ns <= ns {
                self.stretch_left_ns = 0;
                self.device_scl_low = false;
                self.settle();
            } else {
                self.stretch_left_ns -= ns;
            }
        }
    }

    fn record(&mut self, event: WireEvent) {
        let _ = self.events.push(event);
    }

    /// Recompute line levels and react to the resulting edge
    fn settle(&mut self) {
        let sda = !(self.master_sda_low || self.device_sda_low);
        let scl = !(self.master_scl_low || self.device_scl_low);
        let (old_sda, old_scl) = (self.sda, self.scl);
        self.sda = sda;
        self.scl = scl;

        if scl != old_scl {
            if scl {
                self.on_scl_rise();
            } else {
                self.on_scl_fall();
                // The device only moves SDA while SCL is low
                self.sda = !(self.master_sda_low || self.device_sda_low);
            }
        } else if scl && sda != old_sda {
            if sda {
                self.on_stop();
            } else {
                self.on_start();
            }
        }
    }

    fn on_start(&mut self) {
        self.record(WireEvent::Start);
        self.phase = Phase::Receive { address: true };
        self.bits = 0;
        self.shift = 0;
        self.received = 0;
        self.tx_index = 0;
        self.device_sda_low = false;
    }

    fn on_stop(&mut self) {
        self.record(WireEvent::Stop);
        self.phase = Phase::Idle;
        self.device_sda_low = false;
    }

    fn on_scl_rise(&mut self) {
        match self.phase {
            Phase::Receive { .. } => {
                self.shift = (self.shift << 1) | u8::from(self.sda);
                self.bits += 1;
            }
            Phase::Transmit => self.bits += 1,
            Phase::MasterAck => {
                self.master_acked = !self.sda;
                self.record(WireEvent::Read {
                    byte: self.tx_byte,
                    acked: self.master_acked,
                });
            }
            _ => {}
        }
    }

    fn on_scl_fall(&mut self) {
        match self.phase {
            Phase::Receive { address } if self.bits == 8 => {
                let byte = self.shift;
                let acked = match &self.device {
                    Some(device) if address => byte >> 1 == device.address,
                    Some(device) => device.nack_at != Some(self.received),
                    None => false,
                };
                self.record(WireEvent::Written { byte, acked });
                if !address {
                    self.received += 1;
                }

                if acked {
                    self.device_sda_low = true;
                    let then = if address && byte & 1 == 1 {
                        Next::Transmit
                    } else {
                        Next::Receive
                    };
                    self.phase = Phase::AckSlot { then };
                } else {
                    self.phase = Phase::Ignore;
                }
            }
            Phase::AckSlot { then } => {
                self.device_sda_low = false;
                self.start_stretch();
                match then {
                    Next::Receive => {
                        self.phase = Phase::Receive { address: false };
                        self.bits = 0;
                        self.shift = 0;
                    }
                    Next::Transmit => self.load_next_byte(),
                }
            }
            Phase::Transmit => {
                if self.bits == 8 {
                    self.device_sda_low = false;
                    self.phase = Phase::MasterAck;
                } else {
                    self.drive_tx_bit();
                }
            }
            Phase::MasterAck => {
                if self.master_acked {
                    self.load_next_byte();
                } else {
                    self.device_sda_low = false;
                    self.phase = Phase::Ignore;
                }
            }
            _ => {}
        }
    }

    fn start_stretch(&mut self) {
        let stretch = self.device.as_ref().map_or(0, |device| device.stretch_ns);
        if stretch > 0 {
            self.device_scl_low = true;
            self.stretch_left_ns = stretch;
        }
    }

    fn load_next_byte(&mut self) {
        self.tx_byte = self
            .device
            .as_ref()
            .and_then(|device| device.response.get(self.tx_index).copied())
            .unwrap_or(0xFF);
        self.tx_index += 1;
        self.bits = 0;
        self.phase = Phase::Transmit;
        self.drive_tx_bit();
    }

    fn drive_tx_bit(&mut self) {
        let bit = (self.tx_byte >> (7 - self.bits)) & 1;
        self.device_sda_low = bit == 0;
    }
}

/// Master-side handle to one simulated line
pub struct SimLine<'a> {
    bus: &'a RefCell<SimBus>,
    role: Role,
}

impl OpenDrainLine for SimLine<'_> {
    fn drive_low(&mut self) {
        self.bus.borrow_mut().set_master(self.role, true);
    }

    fn release(&mut self) {
        self.bus.borrow_mut().set_master(self.role, false);
    }

    fn is_high(&mut self) -> bool {
        let mut bus = self.bus.borrow_mut();
        bus.set_master(self.role, false);
        bus.level(self.role)
    }
}

/// Delay that advances simulated time instead of sleeping
pub struct SimDelay<'a> {
    bus: &'a RefCell<SimBus>,
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.borrow_mut().advance(u64::from(ns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_and_stop_edges() {
        let wire = RefCell::new(SimBus::new(None));
        let (mut sda, mut scl, _) = SimBus::lines(&wire);

        sda.drive_low();
        scl.drive_low();
        sda.release();
        sda.drive_low();
        scl.release();
        sda.release();

        assert_eq!(wire.borrow().events(), &[WireEvent::Start, WireEvent::Stop]);
        assert!(wire.borrow().master_released());
    }

    #[test]
    fn test_data_change_with_clock_low_is_not_framing() {
        let wire = RefCell::new(SimBus::new(None));
        let (mut sda, mut scl, _) = SimBus::lines(&wire);

        scl.drive_low();
        sda.drive_low();
        sda.release();
        scl.release();

        assert!(wire.borrow().events().is_empty());
    }

    #[test]
    fn test_stretch_holds_clock_until_time_passes() {
        let wire = RefCell::new(SimBus::new(None));
        let (_, mut scl, mut delay) = SimBus::lines(&wire);

        {
            let mut bus = wire.borrow_mut();
            bus.device_scl_low = true;
            bus.stretch_left_ns = 3_000;
            bus.settle();
        }
        assert!(scl.is_low());

        delay.delay_ns(2_000);
        assert!(scl.is_low());

        delay.delay_ns(1_000);
        assert!(scl.is_high());
        assert_eq!(wire.borrow().elapsed_ns(), 3_000);
    }

    #[test]
    fn test_device_builder() {
        let device = SimDevice::new(0x04)
            .with_response(&[1, 2, 3])
            .with_nack_at(1)
            .with_stretch_ns(500);

        assert_eq!(device.address, 0x04);
        assert_eq!(&device.response[..], &[1, 2, 3]);
        assert_eq!(device.nack_at, Some(1));
        assert_eq!(device.stretch_ns, 500);
    }
}
