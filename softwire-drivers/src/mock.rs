//! Register bus double for driver tests

use std::vec::Vec;

use softwire_core::{AckPhase, BusError};
use softwire_hal::{Address, RegisterAddress, RegisterBus};

/// Delay that only adds up the time asked for
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// One recorded register write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub address: u8,
    pub register: RegisterAddress,
    pub data: Vec<u8>,
}

/// Records writes and serves reads from a table of 16-bit registers
#[derive(Default)]
pub struct MockBus {
    pub writes: Vec<Write>,
    registers: Vec<(u8, u8, [u8; 2])>,
    absent: Vec<u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_register(&mut self, address: u8, register: u8, value: [u8; 2]) {
        self.registers
            .retain(|&(a, r, _)| !(a == address && r == register));
        self.registers.push((address, register, value));
    }

    /// Stop acknowledging `address`
    pub fn unplug(&mut self, address: u8) {
        self.absent.push(address);
    }

    pub fn writes_to(&self, address: u8) -> impl Iterator<Item = &Write> {
        self.writes.iter().filter(move |w| w.address == address)
    }

    fn present(&self, address: Address) -> Result<(), BusError> {
        if self.absent.contains(&address.get()) {
            Err(BusError::AcknowledgeFailure(AckPhase::Address))
        } else {
            Ok(())
        }
    }
}

impl RegisterBus for MockBus {
    type Error = BusError;

    fn probe(&mut self, address: Address) -> bool {
        self.present(address).is_ok()
    }

    fn write_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        data: &[u8],
    ) -> Result<(), BusError> {
        self.present(address)?;
        self.writes.push(Write {
            address: address.get(),
            register,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn read_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.present(address)?;
        let reg = register.to_bytes()[0];
        let value = self
            .registers
            .iter()
            .find(|&&(a, r, _)| a == address.get() && r == reg)
            .map_or([0, 0], |&(_, _, v)| v);
        for (slot, byte) in buf.iter_mut().zip(value.iter().chain(core::iter::repeat(&0))) {
            *slot = *byte;
        }
        Ok(())
    }
}
