//! Simulated two-wire bus
//!
//! A software model of the open-drain wire with a single slave attached,
//! used to exercise the bus master without hardware. The wire keeps a
//! simulated clock advanced by the delay capability and records:
//!
//! - start, repeated start and stop conditions as they appear on the wire
//! - the shortest time any line level was held between two transitions
//! - how many times the master sampled the data line
//!
//! The slave side is a small state machine driven by clock edges. What the
//! slave does with the bytes is up to a [`SimDevice`] implementation.
//!
//! # Example
//!
//! ```ignore
//! use softwire_core::bus::{BusConfig, SoftI2c};
//! use softwire_core::sim::{EchoDevice, SimBus};
//! use softwire_hal::Address;
//!
//! let wire = SimBus::new(EchoDevice::new(0x50));
//! let (scl, sda, delay) = wire.pins();
//! let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));
//!
//! assert!(bus.probe(Address::const_new(0x50)));
//! assert!(!bus.probe(Address::const_new(0x51)));
//! ```

use core::cell::RefCell;

use heapless::Vec;
use softwire_hal::{BusDelay, FlexPin, InputPin, OutputPin, PinDirection};

/// Maximum number of recorded bus conditions
pub const MAX_CONDITIONS: usize = 64;

/// Size of the [`EchoDevice`] register memory
pub const ECHO_MEMORY: usize = 256;

/// Slave behaviour plugged into a [`SimBus`]
pub trait SimDevice {
    /// 7-bit address the device answers to
    fn address(&self) -> u8;

    /// Device was addressed after a (repeated) start
    ///
    /// Return `false` to not-acknowledge the address byte.
    fn begin(&mut self, _read: bool) -> bool {
        true
    }

    /// Byte written by the master; return `false` to not-acknowledge it
    fn write(&mut self, byte: u8) -> bool;

    /// Next byte to shift out to the master
    fn read(&mut self) -> u8;

    /// Stop condition seen on the wire
    fn stop(&mut self) {}
}

/// Framing condition observed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Data fell while clock was high, bus idle
    Start,
    /// Data fell while clock was high, inside a transaction
    RepeatedStart,
    /// Data rose while clock was high
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlaveState {
    Idle,
    Address,
    Receive,
    Transmit,
    Ignore,
}

#[derive(Debug, Clone, Copy)]
enum Line {
    Scl,
    Sda,
}

struct Wire<D> {
    device: D,
    // Line drivers; `true` means released
    scl: bool,
    sda_master: bool,
    sda_slave: bool,
    now: u64,
    scl_changed: Option<u64>,
    sda_changed: Option<u64>,
    min_hold: Option<u64>,
    conditions: Vec<Condition, MAX_CONDITIONS>,
    conditions_overflowed: bool,
    in_transaction: bool,
    sda_reads: u32,
    // Slave shift register
    state: SlaveState,
    shift: u8,
    bits: u8,
    clocked: bool,
    acked: bool,
    read_dir: bool,
    master_acked: bool,
    tx_byte: u8,
}

impl<D: SimDevice> Wire<D> {
    fn sda(&self) -> bool {
        self.sda_master && self.sda_slave
    }

    fn record_edge(&mut self, line: Line) {
        let last = match line {
            Line::Scl => &mut self.scl_changed,
            Line::Sda => &mut self.sda_changed,
        };
        if let Some(t) = *last {
            let held = self.now - t;
            self.min_hold = Some(self.min_hold.map_or(held, |m| m.min(held)));
        }
        *last = Some(self.now);
    }

    fn set_scl(&mut self, level: bool) {
        if level == self.scl {
            return;
        }
        self.scl = level;
        self.record_edge(Line::Scl);
        if level {
            self.clock_rise();
        } else {
            self.clock_fall();
        }
    }

    fn set_sda_master(&mut self, level: bool) {
        let before = self.sda();
        self.sda_master = level;
        self.sda_transition(before);
    }

    fn set_sda_slave(&mut self, level: bool) {
        let before = self.sda();
        self.sda_slave = level;
        self.sda_transition(before);
    }

    fn sda_transition(&mut self, before: bool) {
        let after = self.sda();
        if before == after {
            return;
        }
        self.record_edge(Line::Sda);
        if self.scl {
            if after {
                self.stop_condition();
            } else {
                self.start_condition();
            }
        }
    }

    fn push_condition(&mut self, condition: Condition) {
        if self.conditions.push(condition).is_err() {
            self.conditions_overflowed = true;
        }
    }

    fn start_condition(&mut self) {
        let condition = if self.in_transaction {
            Condition::RepeatedStart
        } else {
            Condition::Start
        };
        self.push_condition(condition);
        self.in_transaction = true;
        self.state = SlaveState::Address;
        self.shift = 0;
        self.bits = 0;
        self.clocked = false;
    }

    fn stop_condition(&mut self) {
        self.push_condition(Condition::Stop);
        self.in_transaction = false;
        self.state = SlaveState::Idle;
        self.bits = 0;
        self.clocked = false;
        self.device.stop();
    }

    fn clock_rise(&mut self) {
        self.clocked = true;
        if self.bits < 8 {
            if matches!(self.state, SlaveState::Address | SlaveState::Receive) {
                self.shift = (self.shift << 1) | self.sda() as u8;
            }
        } else if self.state == SlaveState::Transmit {
            self.master_acked = !self.sda();
        }
    }

    fn load_next(&mut self) {
        self.tx_byte = self.device.read();
        self.set_sda_slave(self.tx_byte & 0x80 != 0);
    }

    fn clock_fall(&mut self) {
        // The falling edge that ends a start condition is not a bit
        if !self.clocked {
            return;
        }
        self.clocked = false;
        self.bits += 1;

        match self.bits {
            1..=7 => {
                if self.state == SlaveState::Transmit {
                    let bit = self.tx_byte & (0x80 >> self.bits) != 0;
                    self.set_sda_slave(bit);
                }
            }
            8 => match self.state {
                SlaveState::Address => {
                    self.read_dir = self.shift & 1 == 1;
                    let matched = self.shift >> 1 == self.device.address();
                    self.acked = matched && self.device.begin(self.read_dir);
                    if self.acked {
                        self.set_sda_slave(false);
                    }
                }
                SlaveState::Receive => {
                    self.acked = self.device.write(self.shift);
                    if self.acked {
                        self.set_sda_slave(false);
                    }
                }
                SlaveState::Transmit => self.set_sda_slave(true),
                SlaveState::Idle | SlaveState::Ignore => {}
            },
            _ => {
                self.bits = 0;
                self.shift = 0;
                match self.state {
                    SlaveState::Address if self.acked && self.read_dir => {
                        self.state = SlaveState::Transmit;
                        self.load_next();
                    }
                    SlaveState::Address | SlaveState::Receive => {
                        self.set_sda_slave(true);
                        self.state = if self.acked {
                            SlaveState::Receive
                        } else {
                            SlaveState::Ignore
                        };
                    }
                    SlaveState::Transmit => {
                        if self.master_acked {
                            self.load_next();
                        } else {
                            self.state = SlaveState::Ignore;
                        }
                    }
                    SlaveState::Idle | SlaveState::Ignore => {}
                }
            }
        }
    }
}

/// Simulated open-drain wire with one slave device
pub struct SimBus<D> {
    wire: RefCell<Wire<D>>,
}

impl<D: SimDevice> SimBus<D> {
    /// Create an idle wire (both lines released) with `device` attached
    pub fn new(device: D) -> Self {
        Self {
            wire: RefCell::new(Wire {
                device,
                scl: true,
                sda_master: true,
                sda_slave: true,
                now: 0,
                scl_changed: None,
                sda_changed: None,
                min_hold: None,
                conditions: Vec::new(),
                conditions_overflowed: false,
                in_transaction: false,
                sda_reads: 0,
                state: SlaveState::Idle,
                shift: 0,
                bits: 0,
                clocked: false,
                acked: false,
                read_dir: false,
                master_acked: false,
                tx_byte: 0,
            }),
        }
    }

    /// Master-side handles: clock pin, data pin, delay
    pub fn pins(&self) -> (SimScl<'_, D>, SimSda<'_, D>, SimDelay<'_, D>) {
        (SimScl { bus: self }, SimSda { bus: self }, SimDelay { bus: self })
    }

    /// Conditions seen since creation or the last [`clear_trace`](Self::clear_trace)
    ///
    /// # Panics
    ///
    /// If more than [`MAX_CONDITIONS`] were seen, since the log would be
    /// truncated.
    pub fn conditions(&self) -> Vec<Condition, MAX_CONDITIONS> {
        let wire = self.wire.borrow();
        assert!(
            !wire.conditions_overflowed,
            "more than {} bus conditions since the last clear_trace",
            MAX_CONDITIONS
        );
        wire.conditions.clone()
    }

    /// Shortest time a line held its level between two transitions
    pub fn min_hold(&self) -> Option<u64> {
        self.wire.borrow().min_hold
    }

    /// Number of times the master sampled the data line
    pub fn sda_reads(&self) -> u32 {
        self.wire.borrow().sda_reads
    }

    /// Simulated time elapsed, in delay units
    pub fn now(&self) -> u64 {
        self.wire.borrow().now
    }

    /// Both lines released and no transaction open
    pub fn is_idle(&self) -> bool {
        let wire = self.wire.borrow();
        wire.scl && wire.sda() && !wire.in_transaction
    }

    /// Forget recorded conditions, hold times and sample counts
    pub fn clear_trace(&self) {
        let mut wire = self.wire.borrow_mut();
        wire.conditions.clear();
        wire.conditions_overflowed = false;
        wire.min_hold = None;
        wire.scl_changed = None;
        wire.sda_changed = None;
        wire.sda_reads = 0;
    }

    /// Inspect or modify the attached device
    pub fn with_device<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.wire.borrow_mut().device)
    }
}

/// Simulated clock line driver
pub struct SimScl<'a, D> {
    bus: &'a SimBus<D>,
}

/// Simulated data line driver
pub struct SimSda<'a, D> {
    bus: &'a SimBus<D>,
}

/// Simulated delay; each unit advances the wire clock by one tick
pub struct SimDelay<'a, D> {
    bus: &'a SimBus<D>,
}

impl<D: SimDevice> OutputPin for SimScl<'_, D> {
    fn set_high(&mut self) {
        self.bus.wire.borrow_mut().set_scl(true);
    }

    fn set_low(&mut self) {
        self.bus.wire.borrow_mut().set_scl(false);
    }
}

impl<D: SimDevice> OutputPin for SimSda<'_, D> {
    fn set_high(&mut self) {
        self.bus.wire.borrow_mut().set_sda_master(true);
    }

    fn set_low(&mut self) {
        self.bus.wire.borrow_mut().set_sda_master(false);
    }
}

impl<D: SimDevice> InputPin for SimSda<'_, D> {
    fn is_high(&self) -> bool {
        let mut wire = self.bus.wire.borrow_mut();
        wire.sda_reads += 1;
        wire.sda()
    }
}

impl<D: SimDevice> FlexPin for SimSda<'_, D> {
    // Open-drain: a released line is already readable
    fn set_direction(&mut self, _direction: PinDirection) {}
}

impl<D: SimDevice> BusDelay for SimDelay<'_, D> {
    fn delay(&mut self, units: u32) {
        self.bus.wire.borrow_mut().now += units as u64;
    }
}

/// Register-memory slave that reads back what was written
///
/// The first one (or two) bytes of a write select the register; further
/// bytes are stored at consecutive addresses. Reads continue from the last
/// selected register.
pub struct EchoDevice {
    address: u8,
    register_width: usize,
    memory: [u8; ECHO_MEMORY],
    pointer: u16,
    selector: Vec<u8, 2>,
    written: usize,
    nack_after: Option<usize>,
    nack_register: bool,
}

impl EchoDevice {
    /// Device with one-byte register addresses
    pub fn new(address: u8) -> Self {
        Self {
            address,
            register_width: 1,
            memory: [0; ECHO_MEMORY],
            pointer: 0,
            selector: Vec::new(),
            written: 0,
            nack_after: None,
            nack_register: false,
        }
    }

    /// Device with two-byte register addresses
    pub fn wide(address: u8) -> Self {
        Self {
            register_width: 2,
            ..Self::new(address)
        }
    }

    /// Not-acknowledge payload bytes after the first `count` of a write
    pub fn nack_after(mut self, count: usize) -> Self {
        self.nack_after = Some(count);
        self
    }

    /// Not-acknowledge register selector bytes
    pub fn nack_register(mut self) -> Self {
        self.nack_register = true;
        self
    }

    /// Stored byte at `register`
    pub fn peek(&self, register: u16) -> u8 {
        self.memory[register as usize % ECHO_MEMORY]
    }
}

impl SimDevice for EchoDevice {
    fn address(&self) -> u8 {
        self.address
    }

    fn begin(&mut self, read: bool) -> bool {
        if !read {
            self.selector.clear();
            self.written = 0;
        }
        true
    }

    fn write(&mut self, byte: u8) -> bool {
        if self.selector.len() < self.register_width {
            // Capacity is the register width, never exceeded here
            let _ = self.selector.push(byte);
            if self.selector.len() == self.register_width {
                self.pointer = self
                    .selector
                    .iter()
                    .fold(0u16, |acc, &b| (acc << 8) | b as u16);
            }
            return !self.nack_register;
        }
        if self.nack_after.is_some_and(|limit| self.written >= limit) {
            return false;
        }
        self.memory[self.pointer as usize % ECHO_MEMORY] = byte;
        self.pointer = self.pointer.wrapping_add(1);
        self.written += 1;
        true
    }

    fn read(&mut self) -> u8 {
        let byte = self.memory[self.pointer as usize % ECHO_MEMORY];
        self.pointer = self.pointer.wrapping_add(1);
        byte
    }
}

/// Empty bus: nothing ever acknowledges
pub struct NoDevice;

impl SimDevice for NoDevice {
    fn address(&self) -> u8 {
        // Outside the 7-bit range, so no address byte can match
        0xFF
    }

    fn write(&mut self, _byte: u8) -> bool {
        false
    }

    fn read(&mut self) -> u8 {
        0xFF
    }
}
