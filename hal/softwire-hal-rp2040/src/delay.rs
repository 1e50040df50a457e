//! Busy-wait bit timing

use softwire_hal::BusDelay;

/// Delay that burns a fixed number of core cycles per unit
#[derive(Debug, Clone, Copy)]
pub struct SpinDelay {
    cycles_per_unit: u32,
}

impl SpinDelay {
    /// One unit lasts `cycles_per_unit` core clock cycles
    pub const fn new(cycles_per_unit: u32) -> Self {
        Self { cycles_per_unit }
    }

    /// One unit lasts `unit_ns` nanoseconds at `sys_clk_hz`
    pub const fn from_nanos(sys_clk_hz: u32, unit_ns: u32) -> Self {
        let cycles = sys_clk_hz as u64 * unit_ns as u64 / 1_000_000_000;
        Self::new(if cycles == 0 { 1 } else { cycles as u32 })
    }

    /// Cycles per delay unit
    pub const fn cycles_per_unit(&self) -> u32 {
        self.cycles_per_unit
    }
}

impl BusDelay for SpinDelay {
    fn delay(&mut self, units: u32) {
        let cycles = units.saturating_mul(self.cycles_per_unit);
        if cycles > 0 {
            cortex_m::asm::delay(cycles);
        }
    }
}
