//! INA219 current/power monitor
//!
//! High-side shunt monitor with 16-bit big-endian registers behind a
//! one-byte register pointer. Only the raw shunt and bus voltages are
//! trusted; current is derived from the shunt voltage with a
//! [`ShuntCalibration`] instead of the chip's own calibration register.

use softwire_core::config::{ShuntCalibration, DEFAULT_SENSOR_ADDRESS};
use softwire_hal::{Address, RegisterAddress, RegisterBus};

/// INA219 registers
pub mod reg {
    pub const CONFIG: u8 = 0x00;
    pub const SHUNT_VOLTAGE: u8 = 0x01;
    pub const BUS_VOLTAGE: u8 = 0x02;
    pub const POWER: u8 = 0x03;
    pub const CURRENT: u8 = 0x04;
    pub const CALIBRATION: u8 = 0x05;
}

/// Configuration word written by [`Ina219::init`]
///
/// 32 V bus range, ±320 mV shunt range (gain /8), 12-bit conversions with
/// 128-sample averaging on the shunt, continuous shunt and bus mode.
pub const DEFAULT_CONFIG: u16 = 0x36EF;

/// Shunt voltage LSB in µV
pub const SHUNT_LSB_UV: i32 = 10;

/// Bus voltage LSB in mV
pub const BUS_LSB_MV: u32 = 4;

/// Decoded bus voltage register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusVoltage(u16);

impl BusVoltage {
    /// Wrap a raw register value
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw register value including the flag bits
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Bus voltage in millivolts
    pub const fn millivolts(self) -> u32 {
        (self.0 >> 3) as u32 * BUS_LSB_MV
    }

    /// A new conversion finished since the power register was last read
    pub const fn conversion_ready(self) -> bool {
        self.0 & 0x0002 != 0
    }

    /// Power or current calculation overflowed
    pub const fn math_overflow(self) -> bool {
        self.0 & 0x0001 != 0
    }
}

/// One complete measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerReading {
    /// Shunt voltage in µV
    pub shunt_uv: i32,
    /// Bus voltage in mV
    pub bus_mv: u32,
    /// Current in mA (negative when flowing backwards)
    pub current_ma: i32,
    /// Power in mW, always positive
    pub power_mw: u32,
}

impl PowerReading {
    /// Derive current and power from the two measured voltages
    pub fn new(shunt_uv: i32, bus_mv: u32, calibration: &ShuntCalibration) -> Self {
        let current_ma = calibration.current_ma(shunt_uv);
        let power = (current_ma as i64 * bus_mv as i64 / 1000).unsigned_abs();
        Self {
            shunt_uv,
            bus_mv,
            current_ma,
            power_mw: power.min(u32::MAX as u64) as u32,
        }
    }
}

/// INA219 client
///
/// Holds no bus; every operation borrows the bus for one transaction so
/// the sensor can share it with other devices.
#[derive(Debug, Clone, Copy)]
pub struct Ina219 {
    address: Address,
}

impl Default for Ina219 {
    fn default() -> Self {
        Self::new(DEFAULT_SENSOR_ADDRESS)
    }
}

impl Ina219 {
    /// Create a client for the sensor at `address`
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Device address
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Write the default configuration word
    pub fn init<B: RegisterBus>(&self, bus: &mut B) -> Result<(), B::Error> {
        self.write_register(bus, reg::CONFIG, DEFAULT_CONFIG)
    }

    /// Read any 16-bit register
    pub fn read_register<B: RegisterBus>(
        &self,
        bus: &mut B,
        register: u8,
    ) -> Result<u16, B::Error> {
        let mut raw = [0u8; 2];
        bus.read_register(self.address, RegisterAddress::Byte(register), &mut raw)?;
        Ok(u16::from_be_bytes(raw))
    }

    fn write_register<B: RegisterBus>(
        &self,
        bus: &mut B,
        register: u8,
        value: u16,
    ) -> Result<(), B::Error> {
        bus.write_register(
            self.address,
            RegisterAddress::Byte(register),
            &value.to_be_bytes(),
        )
    }

    /// Shunt voltage register as a signed count of 10 µV steps
    pub fn shunt_voltage_raw<B: RegisterBus>(&self, bus: &mut B) -> Result<i16, B::Error> {
        Ok(self.read_register(bus, reg::SHUNT_VOLTAGE)? as i16)
    }

    /// Shunt voltage in µV
    pub fn shunt_voltage_uv<B: RegisterBus>(&self, bus: &mut B) -> Result<i32, B::Error> {
        Ok(self.shunt_voltage_raw(bus)? as i32 * SHUNT_LSB_UV)
    }

    /// Bus voltage register
    pub fn bus_voltage<B: RegisterBus>(&self, bus: &mut B) -> Result<BusVoltage, B::Error> {
        Ok(BusVoltage(self.read_register(bus, reg::BUS_VOLTAGE)?))
    }

    /// Program the on-chip calibration register
    ///
    /// Only needed for the chip's own power and current registers.
    pub fn write_calibration<B: RegisterBus>(
        &self,
        bus: &mut B,
        value: u16,
    ) -> Result<(), B::Error> {
        self.write_register(bus, reg::CALIBRATION, value)
    }

    /// On-chip power register
    pub fn read_power_raw<B: RegisterBus>(&self, bus: &mut B) -> Result<u16, B::Error> {
        self.read_register(bus, reg::POWER)
    }

    /// On-chip current register
    pub fn read_current_raw<B: RegisterBus>(&self, bus: &mut B) -> Result<i16, B::Error> {
        Ok(self.read_register(bus, reg::CURRENT)? as i16)
    }

    /// Read shunt and bus voltage and derive current and power
    pub fn measure<B: RegisterBus>(
        &self,
        bus: &mut B,
        calibration: &ShuntCalibration,
    ) -> Result<PowerReading, B::Error> {
        let shunt_uv = self.shunt_voltage_uv(bus)?;
        let bus_mv = self.bus_voltage(bus)?.millivolts();
        Ok(PowerReading::new(shunt_uv, bus_mv, calibration))
    }
}
