//! Register-addressed transactions
//!
//! Layers the two register transport shapes (one or two register-address
//! bytes) on top of the bus master's byte primitives:
//!
//! ```text
//! write: S | addr+W A | reg[..] A | data A ... | P
//! read:  S | addr+W A | reg[..] A | Sr | addr+R A | data ack ... data nack | P
//! ```
//!
//! The first missing acknowledge aborts the transaction. A stop condition
//! is still generated so the bus is always left idle; retrying is up to the
//! caller.

use softwire_hal::{Address, BusDelay, FlexPin, OutputPin, RegisterAddress, RegisterBus};

use super::SoftI2c;
use crate::error::{AckPhase, BusError};

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: FlexPin,
    D: BusDelay,
{
    /// Run `f` between a start and a stop condition
    ///
    /// The stop is issued on every path out of `f`, including errors.
    pub fn transaction<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, BusError>,
    ) -> Result<R, BusError> {
        self.start();
        let result = f(self);
        self.stop();
        result
    }

    /// Send one byte and require an acknowledge
    pub(crate) fn send(&mut self, byte: u8, phase: AckPhase) -> Result<(), BusError> {
        self.write_byte(byte);
        if self.wait_ack() {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::debug!("softwire: {=u8:#x} not acknowledged ({})", byte, phase);
            Err(BusError::AcknowledgeFailure(phase))
        }
    }

    /// Receive into `buf`, not-acknowledging the final byte if `last`
    pub(crate) fn receive(&mut self, buf: &mut [u8], last: bool) {
        let len = buf.len();
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte();
            if last && i + 1 == len {
                self.write_nack();
            } else {
                self.write_ack();
            }
        }
    }

    /// Address the device for writing and send the register selector
    fn select(&mut self, address: Address, register: RegisterAddress) -> Result<(), BusError> {
        self.send(address.write_byte(), AckPhase::Address)?;
        let bytes = register.to_bytes();
        for &byte in &bytes[..register.len()] {
            self.send(byte, AckPhase::Register)?;
        }
        Ok(())
    }

    /// Check whether a device acknowledges its address
    pub fn probe(&mut self, address: Address) -> bool {
        self.transaction(|bus| bus.send(address.write_byte(), AckPhase::Address))
            .is_ok()
    }

    /// Write `data` to a register
    ///
    /// With empty `data` only the address and register selector are sent.
    pub fn write_register(
        &mut self,
        address: Address,
        register: impl Into<RegisterAddress>,
        data: &[u8],
    ) -> Result<(), BusError> {
        let register = register.into();
        self.transaction(|bus| {
            bus.select(address, register)?;
            for &byte in data {
                bus.send(byte, AckPhase::Data)?;
            }
            Ok(())
        })
    }

    /// Read `buf.len()` bytes from a register
    ///
    /// With an empty `buf` the repeated start and read phase are skipped:
    /// an acknowledged read address would leave the slave driving data
    /// with nothing clocked out to release it.
    pub fn read_register(
        &mut self,
        address: Address,
        register: impl Into<RegisterAddress>,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        let register = register.into();
        self.transaction(|bus| {
            bus.select(address, register)?;
            if buf.is_empty() {
                return Ok(());
            }
            bus.start();
            bus.send(address.read_byte(), AckPhase::Address)?;
            bus.receive(buf, true);
            Ok(())
        })
    }

    /// Write to a register with a one-byte selector
    pub fn write_register8(
        &mut self,
        address: Address,
        register: u8,
        data: &[u8],
    ) -> Result<(), BusError> {
        self.write_register(address, RegisterAddress::Byte(register), data)
    }

    /// Write to a register with a two-byte selector
    pub fn write_register16(
        &mut self,
        address: Address,
        register: u16,
        data: &[u8],
    ) -> Result<(), BusError> {
        self.write_register(address, RegisterAddress::Word(register), data)
    }

    /// Read from a register with a one-byte selector
    pub fn read_register8(
        &mut self,
        address: Address,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.read_register(address, RegisterAddress::Byte(register), buf)
    }

    /// Read from a register with a two-byte selector
    pub fn read_register16(
        &mut self,
        address: Address,
        register: u16,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.read_register(address, RegisterAddress::Word(register), buf)
    }
}

impl<SCL, SDA, D> RegisterBus for SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: FlexPin,
    D: BusDelay,
{
    type Error = BusError;

    fn probe(&mut self, address: Address) -> bool {
        SoftI2c::probe(self, address)
    }

    fn write_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        data: &[u8],
    ) -> Result<(), BusError> {
        SoftI2c::write_register(self, address, register, data)
    }

    fn read_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        buf: &mut [u8],
    ) -> Result<(), BusError> {
        SoftI2c::read_register(self, address, register, buf)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::bus::BusConfig;
    use crate::sim::{Condition, EchoDevice, NoDevice, SimBus};

    const DEVICE: Address = Address::const_new(0x50);

    #[test]
    fn test_probe() {
        let wire = SimBus::new(EchoDevice::new(0x50));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        assert!(bus.probe(DEVICE));
        assert!(!bus.probe(Address::const_new(0x51)));
        assert!(wire.is_idle());
    }

    #[test]
    fn test_register8_round_trip() {
        let wire = SimBus::new(EchoDevice::new(0x50));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        bus.write_register8(DEVICE, 0x10, &[0xDE, 0xAD]).unwrap();
        assert_eq!(wire.with_device(|d| d.peek(0x10)), 0xDE);
        assert_eq!(wire.with_device(|d| d.peek(0x11)), 0xAD);

        let mut buf = [0u8; 2];
        bus.read_register8(DEVICE, 0x10, &mut buf).unwrap();
        assert_eq!(buf, [0xDE, 0xAD]);
    }

    #[test]
    fn test_register16_round_trip() {
        let wire = SimBus::new(EchoDevice::wide(0x50));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(2));

        bus.write_register16(DEVICE, 0x0120, &[1, 2, 3]).unwrap();
        assert_eq!(wire.with_device(|d| d.peek(0x0120)), 1);

        let mut buf = [0u8; 3];
        bus.read_register16(DEVICE, 0x0120, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_framing() {
        let wire = SimBus::new(EchoDevice::new(0x50));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        bus.write_register8(DEVICE, 0x01, &[0x36, 0xEF]).unwrap();
        assert_eq!(
            wire.conditions().as_slice(),
            &[Condition::Start, Condition::Stop]
        );

        wire.clear_trace();
        let mut buf = [0u8; 2];
        bus.read_register8(DEVICE, 0x01, &mut buf).unwrap();
        assert_eq!(
            wire.conditions().as_slice(),
            &[Condition::Start, Condition::RepeatedStart, Condition::Stop]
        );
        assert!(wire.is_idle());
    }

    #[test]
    fn test_levels_held_one_delay_unit() {
        for delay_units in [1u32, 3, 10] {
            let wire = SimBus::new(EchoDevice::new(0x50));
            let (scl, sda, delay) = wire.pins();
            let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(delay_units));

            bus.write_register8(DEVICE, 0x00, &[0x00, 0xFF, 0x5A]).unwrap();
            let mut buf = [0u8; 3];
            bus.read_register8(DEVICE, 0x00, &mut buf).unwrap();
            assert_eq!(buf, [0x00, 0xFF, 0x5A]);

            let min_hold = wire.min_hold().unwrap();
            assert!(
                min_hold >= delay_units as u64,
                "line held {} < {}",
                min_hold,
                delay_units
            );
        }
    }

    #[test]
    fn test_no_device_bounded_retries() {
        let wire = SimBus::new(NoDevice);
        let (scl, sda, delay) = wire.pins();
        let config = BusConfig {
            delay: 1,
            ack_retries: 10,
        };
        let mut bus = SoftI2c::new(scl, sda, delay, config);

        let err = bus.write_register8(DEVICE, 0x00, &[0x01]).unwrap_err();
        assert_eq!(err, BusError::AcknowledgeFailure(AckPhase::Address));
        assert_eq!(wire.sda_reads(), 11);
        assert_eq!(
            wire.conditions().as_slice(),
            &[Condition::Start, Condition::Stop]
        );
        assert!(wire.is_idle());
    }

    #[test]
    fn test_zero_retries_samples_once() {
        let wire = SimBus::new(NoDevice);
        let (scl, sda, delay) = wire.pins();
        let config = BusConfig {
            delay: 1,
            ack_retries: 0,
        };
        let mut bus = SoftI2c::new(scl, sda, delay, config);

        assert!(!bus.probe(DEVICE));
        assert_eq!(wire.sda_reads(), 1);
    }

    #[test]
    fn test_empty_transfers() {
        let wire = SimBus::new(EchoDevice::new(0x50));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        bus.write_register8(DEVICE, 0x05, &[]).unwrap();
        let mut buf = [0u8; 0];
        bus.read_register8(DEVICE, 0x05, &mut buf).unwrap();

        assert_eq!(
            wire.conditions().as_slice(),
            &[
                Condition::Start,
                Condition::Stop,
                Condition::Start,
                Condition::Stop
            ]
        );
        assert_eq!(wire.with_device(|d| d.peek(0x05)), 0);
        assert!(wire.is_idle());
    }

    #[test]
    fn test_data_nack_stops_bus() {
        let wire = SimBus::new(EchoDevice::new(0x50).nack_after(1));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        let err = bus.write_register8(DEVICE, 0x00, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.phase(), AckPhase::Data);
        assert!(wire.is_idle());
        assert_eq!(wire.with_device(|d| d.peek(0x00)), 1);
        assert_eq!(wire.with_device(|d| d.peek(0x01)), 0);

        // Bus is usable again afterwards
        assert!(bus.probe(DEVICE));
    }

    #[test]
    fn test_register_nack_write16() {
        let wire = SimBus::new(EchoDevice::wide(0x50).nack_register());
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        let err = bus.write_register16(DEVICE, 0x0120, &[1, 2]).unwrap_err();
        assert_eq!(err, BusError::AcknowledgeFailure(AckPhase::Register));
        assert_eq!(
            wire.conditions().as_slice(),
            &[Condition::Start, Condition::Stop]
        );
        assert!(wire.is_idle());
        assert_eq!(wire.with_device(|d| d.peek(0x0120)), 0);
    }

    #[test]
    fn test_register_nack_read8() {
        let wire = SimBus::new(EchoDevice::new(0x50).nack_register());
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        let mut buf = [0xAAu8; 2];
        let err = bus.read_register8(DEVICE, 0x10, &mut buf).unwrap_err();
        assert_eq!(err, BusError::AcknowledgeFailure(AckPhase::Register));
        // No repeated start after the failed selector
        assert_eq!(
            wire.conditions().as_slice(),
            &[Condition::Start, Condition::Stop]
        );
        assert_eq!(buf, [0xAA, 0xAA]);
        assert!(wire.is_idle());
        assert!(bus.probe(DEVICE));
    }

    #[test]
    fn test_read_wrong_address() {
        let wire = SimBus::new(EchoDevice::new(0x50));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        let mut buf = [0xAAu8; 2];
        let err = bus
            .read_register8(Address::const_new(0x40), 0x00, &mut buf)
            .unwrap_err();
        assert_eq!(err.phase(), AckPhase::Address);
        assert_eq!(buf, [0xAA, 0xAA]);
        assert!(wire.is_idle());
    }

    #[test]
    fn test_register_bus_trait() {
        fn store<B: RegisterBus>(bus: &mut B) -> Result<u16, B::Error> {
            bus.write_register(DEVICE, RegisterAddress::Byte(0x02), &[0x10, 0x00])?;
            let mut raw = [0u8; 2];
            bus.read_register(DEVICE, RegisterAddress::Byte(0x02), &mut raw)?;
            Ok(u16::from_be_bytes(raw))
        }

        let wire = SimBus::new(EchoDevice::new(0x50));
        let (scl, sda, delay) = wire.pins();
        let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

        assert_eq!(store(&mut bus), Ok(0x1000));
    }

    proptest! {
        #[test]
        fn prop_register8_round_trip(
            register in any::<u8>(),
            data in proptest::collection::vec(any::<u8>(), 1..16),
        ) {
            let wire = SimBus::new(EchoDevice::new(0x50));
            let (scl, sda, delay) = wire.pins();
            let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

            bus.write_register8(DEVICE, register, &data).unwrap();
            let mut buf = [0u8; 16];
            let buf = &mut buf[..data.len()];
            bus.read_register8(DEVICE, register, buf).unwrap();

            prop_assert_eq!(&buf[..], &data[..]);
            prop_assert!(wire.is_idle());
        }

        #[test]
        fn prop_register16_round_trip(
            register in any::<u16>(),
            data in proptest::collection::vec(any::<u8>(), 1..8),
        ) {
            let wire = SimBus::new(EchoDevice::wide(0x50));
            let (scl, sda, delay) = wire.pins();
            let mut bus = SoftI2c::new(scl, sda, delay, BusConfig::with_delay(1));

            bus.write_register16(DEVICE, register, &data).unwrap();
            let mut buf = [0u8; 8];
            let buf = &mut buf[..data.len()];
            bus.read_register16(DEVICE, register, buf).unwrap();

            prop_assert_eq!(&buf[..], &data[..]);
        }
    }
}
