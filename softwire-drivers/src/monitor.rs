//! Power monitor
//!
//! Reads the power sensor and renders current, bus voltage and power on
//! the display. One [`Monitor::poll`] is one measurement and one screen
//! update; the caller owns the loop and its timing.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;

use heapless::String;
use softwire_core::config::{MonitorConfig, ShuntCalibration};
use softwire_hal::RegisterBus;

use crate::display::{Color, Ssd1306, FONT_12X16, FONT_6X8};
use crate::sensor::{Ina219, PowerReading};

/// Capacity of one formatted readout
pub const READOUT_LEN: usize = 16;

/// Formatted readout text
pub type Readout = String<READOUT_LEN>;

/// Shown instead of the readout when the sensor does not answer
pub const SENSOR_ERROR_TEXT: &str = "SENSOR ERR";

/// Format a milli-unit value as `[-]W.FFF<unit>`
///
/// The fraction is always three digits, so 1050 mA reads "1.050A".
fn format_milli(value: i64, unit: char) -> Readout {
    let mut out = Readout::new();
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    // Any i32 or u32 input fits in READOUT_LEN
    let _ = write!(
        out,
        "{}{}.{:03}{}",
        sign,
        magnitude / 1000,
        magnitude % 1000,
        unit
    );
    out
}

/// Current in mA as amps, e.g. "-1.050A"
pub fn format_amps(current_ma: i32) -> Readout {
    format_milli(current_ma as i64, 'A')
}

/// Voltage in mV as volts, e.g. "5.000V"
pub fn format_volts(bus_mv: u32) -> Readout {
    format_milli(bus_mv as i64, 'V')
}

/// Power in mW as watts, e.g. "0.250W"
pub fn format_watts(power_mw: u32) -> Readout {
    format_milli(power_mw as i64, 'W')
}

/// Sensor plus display
pub struct Monitor {
    sensor: Ina219,
    display: Ssd1306,
    calibration: ShuntCalibration,
}

impl Monitor {
    /// Build the monitor from its configuration
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            sensor: Ina219::new(config.sensor.address),
            display: Ssd1306::new(config.display.address),
            calibration: config.sensor.calibration,
        }
    }

    /// The display's frame buffer and state
    pub fn display(&self) -> &Ssd1306 {
        &self.display
    }

    /// Initialize the display, then the sensor
    ///
    /// Blocks for the display's power-up time first.
    pub fn init<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        delay: &mut impl DelayNs,
    ) -> Result<(), B::Error> {
        self.display.init(bus, delay)?;
        self.sensor.init(bus)
    }

    /// Take one measurement and show it
    ///
    /// A sensor failure is shown on screen and returned. A display failure
    /// is returned only when the measurement itself succeeded.
    pub fn poll<B: RegisterBus>(&mut self, bus: &mut B) -> Result<PowerReading, B::Error> {
        let reading = self.sensor.measure(bus, &self.calibration);

        self.display.fill(Color::Black);
        match &reading {
            Ok(reading) => self.render(reading),
            Err(_) => {
                self.display.goto(0, 12);
                self.display
                    .put_str(SENSOR_ERROR_TEXT, &FONT_6X8, Color::White);
            }
        }
        let flushed = self.display.flush(bus);

        let reading = reading?;
        flushed?;
        Ok(reading)
    }

    /// Current and voltage stacked on the left, power large on the right
    fn render(&mut self, reading: &PowerReading) {
        self.display.goto(0, 4);
        self.display
            .put_str(&format_amps(reading.current_ma), &FONT_6X8, Color::White);

        self.display.goto(0, 20);
        self.display
            .put_str(&format_volts(reading.bus_mv), &FONT_6X8, Color::White);

        self.display.goto(44, 8);
        self.display
            .put_str(&format_watts(reading.power_mw), &FONT_12X16, Color::White);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ssd1306::BUFFER_SIZE;
    use crate::mock::{MockBus, MockDelay};
    use crate::sensor::ina219::reg;
    use softwire_core::{AckPhase, BusError};

    const SENSOR: u8 = 0x40;
    const DISPLAY: u8 = 0x3C;

    #[test]
    fn test_format_amps() {
        assert_eq!(format_amps(-1050).as_str(), "-1.050A");
        assert_eq!(format_amps(1050).as_str(), "1.050A");
        assert_eq!(format_amps(-50).as_str(), "-0.050A");
        assert_eq!(format_amps(0).as_str(), "0.000A");
        assert_eq!(format_amps(i32::MIN).as_str(), "-2147483.648A");
    }

    #[test]
    fn test_format_volts_and_watts() {
        assert_eq!(format_volts(5000).as_str(), "5.000V");
        assert_eq!(format_volts(12).as_str(), "0.012V");
        assert_eq!(format_watts(250).as_str(), "0.250W");
        assert_eq!(format_watts(32_760).as_str(), "32.760W");
        assert_eq!(format_watts(u32::MAX).as_str(), "4294967.295W");
    }

    #[test]
    fn test_init_order() {
        let mut bus = MockBus::new();
        let mut monitor = Monitor::new(&MonitorConfig::default());
        let mut delay = MockDelay::default();
        monitor.init(&mut bus, &mut delay).unwrap();
        assert_eq!(delay.total_ns, 500_000_000);

        let last = bus.writes.last().unwrap();
        assert_eq!(last.address, SENSOR);
        assert_eq!(last.data, [0x36, 0xEF]);
        assert_eq!(bus.writes[0].address, DISPLAY);
    }

    #[test]
    fn test_poll_renders_reading() {
        let mut bus = MockBus::new();
        bus.set_register(SENSOR, reg::SHUNT_VOLTAGE, [0x00, 0xD2]);
        bus.set_register(SENSOR, reg::BUS_VOLTAGE, [0x27, 0x10]);

        let mut monitor = Monitor::new(&MonitorConfig::default());
        let reading = monitor.poll(&mut bus).unwrap();
        assert_eq!(reading.current_ma, 1050);
        assert_eq!(reading.power_mw, 5250);

        // One frame flushed, with text on it
        let frames: std::vec::Vec<_> = bus.writes_to(DISPLAY).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data.len(), BUFFER_SIZE);
        assert_eq!(frames[0].data.as_slice(), monitor.display().buffer());
        assert!(frames[0].data.iter().any(|&b| b != 0));

        // "1.050A" starts at (0, 4): first column of '1' is 0x00, second 0x42
        assert_eq!(monitor.display().pixel(1, 5), Some(true));

        // "5.250W" in the large font at (44, 8): first column of '5' is
        // 0x27, doubled to rows 0-5 and 10-11 of the cell
        let display = monitor.display();
        for x in [44, 45] {
            assert_eq!(display.pixel(x, 8), Some(true));
            assert_eq!(display.pixel(x, 13), Some(true));
            assert_eq!(display.pixel(x, 14), Some(false));
            assert_eq!(display.pixel(x, 18), Some(true));
            assert_eq!(display.pixel(x, 20), Some(false));
        }
    }

    #[test]
    fn test_poll_sensor_error() {
        let mut bus = MockBus::new();
        bus.unplug(SENSOR);

        let mut monitor = Monitor::new(&MonitorConfig::default());
        let err = monitor.poll(&mut bus).unwrap_err();
        assert_eq!(err, BusError::AcknowledgeFailure(AckPhase::Address));

        // Error text is still flushed
        let mut expected = Ssd1306::default();
        expected.goto(0, 12);
        expected.put_str(SENSOR_ERROR_TEXT, &FONT_6X8, Color::White);
        assert_eq!(monitor.display().buffer(), expected.buffer());
        assert_eq!(bus.writes_to(DISPLAY).count(), 1);
    }

    #[test]
    fn test_poll_display_error() {
        let mut bus = MockBus::new();
        bus.unplug(DISPLAY);

        let mut monitor = Monitor::new(&MonitorConfig::default());
        assert!(monitor.poll(&mut bus).is_err());
    }
}
