//! Bus error types

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Transaction phase in which an acknowledge was expected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckPhase {
    /// Address + direction byte
    Address,
    /// Register-address byte(s)
    Register,
    /// Payload byte
    Data,
}

/// Errors from bit-banged bus transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The slave did not pull data low within the acknowledge retry window
    AcknowledgeFailure(AckPhase),
}

impl BusError {
    /// Phase that failed
    pub fn phase(&self) -> AckPhase {
        match self {
            BusError::AcknowledgeFailure(phase) => *phase,
        }
    }
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BusError::AcknowledgeFailure(AckPhase::Address) => {
                f.write_str("address not acknowledged")
            }
            BusError::AcknowledgeFailure(AckPhase::Register) => {
                f.write_str("register address not acknowledged")
            }
            BusError::AcknowledgeFailure(AckPhase::Data) => f.write_str("data not acknowledged"),
        }
    }
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        match self.phase() {
            AckPhase::Address => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            AckPhase::Register | AckPhase::Data => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            }
        }
    }
}
