//! `embedded-hal` interoperability
//!
//! Lets ecosystem drivers written against `embedded_hal::i2c::I2c` run on
//! the soft bus, and lets any `embedded_hal::delay::DelayNs` provide the
//! bit timing.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use softwire_hal::{Address, BusDelay, FlexPin, OutputPin};

use super::SoftI2c;
use crate::error::{AckPhase, BusError};

impl<SCL, SDA, D> ErrorType for SoftI2c<SCL, SDA, D> {
    type Error = BusError;
}

impl<SCL, SDA, D> I2c<SevenBitAddress> for SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: FlexPin,
    D: BusDelay,
{
    /// Run a sequence of operations as one transaction
    ///
    /// Adjacent operations of the same direction are merged; a repeated
    /// start is generated only when the direction changes. The last byte
    /// of each run of reads is not-acknowledged.
    ///
    /// Empty reads put nothing on the wire: an acknowledged read address
    /// with no byte clocked out would leave the slave holding data low.
    /// A transaction made only of empty reads addresses the device for
    /// writing, so a missing device is still reported.
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        // Nothing on the bus can answer an out-of-range address
        let address =
            Address::new(address).map_err(|_| BusError::AcknowledgeFailure(AckPhase::Address))?;
        if operations.is_empty() {
            return Ok(());
        }

        SoftI2c::transaction(self, |bus| {
            let mut reading: Option<bool> = None;
            for i in 0..operations.len() {
                let more_reads = operations[i + 1..]
                    .iter()
                    .take_while(|op| matches!(op, Operation::Read(_)))
                    .any(|op| matches!(op, Operation::Read(buf) if !buf.is_empty()));
                match &mut operations[i] {
                    Operation::Write(data) => {
                        if reading != Some(false) {
                            if reading.is_some() {
                                bus.start();
                            }
                            bus.send(address.write_byte(), AckPhase::Address)?;
                        }
                        for &byte in data.iter() {
                            bus.send(byte, AckPhase::Data)?;
                        }
                        reading = Some(false);
                    }
                    Operation::Read(buf) if buf.is_empty() => {}
                    Operation::Read(buf) => {
                        if reading != Some(true) {
                            if reading.is_some() {
                                bus.start();
                            }
                            bus.send(address.read_byte(), AckPhase::Address)?;
                        }
                        bus.receive(buf, !more_reads);
                        reading = Some(true);
                    }
                }
            }
            if reading.is_none() {
                bus.send(address.write_byte(), AckPhase::Address)?;
            }
            Ok(())
        })
    }
}

/// Bit timing from an `embedded-hal` delay provider
///
/// One delay unit lasts `ns_per_unit` nanoseconds.
pub struct NsDelay<T> {
    inner: T,
    ns_per_unit: u32,
}

impl<T: DelayNs> NsDelay<T> {
    /// Wrap a delay provider
    pub fn new(inner: T, ns_per_unit: u32) -> Self {
        Self { inner, ns_per_unit }
    }

    /// Unwrap the delay provider
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: DelayNs> BusDelay for NsDelay<T> {
    fn delay(&mut self, units: u32) {
        if units > 0 {
            self.inner.delay_ns(units.saturating_mul(self.ns_per_unit));
        }
    }
}
