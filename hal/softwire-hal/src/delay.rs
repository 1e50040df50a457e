//! Bit timing abstraction
//!
//! The bus master produces every clock edge with a busy-wait. Hiding that
//! wait behind a trait lets hardware builds spin a calibrated loop while
//! tests advance a simulated clock instead.

/// Busy-wait used between bus edges
pub trait BusDelay {
    /// Wait for `units` delay units
    ///
    /// What one unit costs is up to the implementation (a loop iteration,
    /// a fixed number of CPU cycles, a simulated tick). A value of zero
    /// must return immediately.
    fn delay(&mut self, units: u32);
}

impl<T: BusDelay + ?Sized> BusDelay for &mut T {
    fn delay(&mut self, units: u32) {
        (**self).delay(units)
    }
}
