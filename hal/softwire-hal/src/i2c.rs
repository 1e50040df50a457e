//! Two-wire bus abstractions
//!
//! Provides the device address type, the register selector shapes and the
//! register transport trait that device clients are written against.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 7-bit slave address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Address(u8);

/// Error returned when an address does not fit in 7 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidAddress(pub u8);

impl core::fmt::Display for InvalidAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "address {:#04x} does not fit in 7 bits", self.0)
    }
}

impl Address {
    /// Highest valid 7-bit address
    pub const MAX: u8 = 0x7F;

    /// Create an address, rejecting values above 0x7F
    pub const fn new(address: u8) -> Result<Self, InvalidAddress> {
        if address > Self::MAX {
            Err(InvalidAddress(address))
        } else {
            Ok(Self(address))
        }
    }

    /// Create an address in const context
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a const) if `address > 0x7F`.
    pub const fn const_new(address: u8) -> Self {
        if address > Self::MAX {
            panic!("I2C address out of range");
        }
        Self(address)
    }

    /// Raw 7-bit value
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Address byte with the write direction bit (0)
    pub const fn write_byte(self) -> u8 {
        self.0 << 1
    }

    /// Address byte with the read direction bit (1)
    pub const fn read_byte(self) -> u8 {
        (self.0 << 1) | 1
    }
}

impl TryFrom<u8> for Address {
    type Error = InvalidAddress;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> u8 {
        address.0
    }
}

/// Slave-side register selector
///
/// Devices use either one or two register-address bytes. Wide registers
/// are sent high byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAddress {
    /// One register-address byte
    Byte(u8),
    /// Two register-address bytes, high byte first
    Word(u16),
}

impl RegisterAddress {
    /// Wire encoding; only the first [`len`](Self::len) bytes are valid
    pub const fn to_bytes(self) -> [u8; 2] {
        match self {
            RegisterAddress::Byte(reg) => [reg, 0],
            RegisterAddress::Word(reg) => reg.to_be_bytes(),
        }
    }

    /// Number of register-address bytes on the wire
    pub const fn len(self) -> usize {
        match self {
            RegisterAddress::Byte(_) => 1,
            RegisterAddress::Word(_) => 2,
        }
    }
}

impl From<u8> for RegisterAddress {
    fn from(reg: u8) -> Self {
        RegisterAddress::Byte(reg)
    }
}

impl From<u16> for RegisterAddress {
    fn from(reg: u16) -> Self {
        RegisterAddress::Word(reg)
    }
}

/// Register-addressed bus transport
///
/// Every call is one complete bus transaction. Implementations must leave
/// the bus idle when they return, whether the transfer succeeded or not.
pub trait RegisterBus {
    /// Error type for failed transfers
    type Error;

    /// Check whether a device acknowledges its address
    fn probe(&mut self, address: Address) -> bool;

    /// Write `data` starting at `register`
    ///
    /// An empty `data` performs only the addressing phase.
    fn write_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        data: &[u8],
    ) -> Result<(), Self::Error>;

    /// Read `buf.len()` bytes starting at `register`
    fn read_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    fn probe(&mut self, address: Address) -> bool {
        (**self).probe(address)
    }

    fn write_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        data: &[u8],
    ) -> Result<(), Self::Error> {
        (**self).write_register(address, register, data)
    }

    fn read_register(
        &mut self,
        address: Address,
        register: RegisterAddress,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        (**self).read_register(address, register, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_range() {
        assert!(Address::new(0x00).is_ok());
        assert!(Address::new(0x7F).is_ok());
        assert_eq!(Address::new(0x80), Err(InvalidAddress(0x80)));
        assert_eq!(Address::try_from(0xFF), Err(InvalidAddress(0xFF)));
    }

    #[test]
    fn test_direction_bytes() {
        let addr = Address::const_new(0x40);
        assert_eq!(addr.write_byte(), 0x80);
        assert_eq!(addr.read_byte(), 0x81);

        let addr = Address::const_new(0x3C);
        assert_eq!(addr.write_byte(), 0x78);
        assert_eq!(addr.read_byte(), 0x79);
    }

    #[test]
    fn test_register_encoding() {
        let reg = RegisterAddress::from(0x40u8);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.to_bytes()[0], 0x40);

        let reg = RegisterAddress::from(0x1234u16);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.to_bytes(), [0x12, 0x34]);
    }
}
