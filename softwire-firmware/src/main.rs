//! softwire - INA219 power monitor firmware
//!
//! Drives an INA219 power sensor and an SSD1306 OLED over a bit-banged
//! two-wire bus on any pair of RP2040 GPIOs. Pins, timing, device
//! addresses and shunt calibration come from `monitor.toml`.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Delay, Timer};
use {defmt_rtt as _, panic_probe as _};

use softwire_core::bus::SoftI2c;
use softwire_core::config::{parse_config, MonitorConfig};
use softwire_drivers::monitor::Monitor;
use softwire_hal_rp2040::{pin_bank, OpenDrainPin, SpinDelay};

/// Embedded configuration (compiled into firmware)
/// Edit monitor.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../monitor.toml");

/// Core clock with the default embassy-rp clock setup
const SYS_CLK_HZ: u32 = 125_000_000;

/// Duration of one bus delay unit
const DELAY_UNIT_NS: u32 = 1_000;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("softwire monitor starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    info!(
        "Bus: scl=gpio{} sda=gpio{} delay={} ack_retries={}",
        config.bus.scl_pin,
        config.bus.sda_pin,
        config.bus.timing.delay,
        config.bus.timing.ack_retries
    );

    let mut bank = pin_bank!(p);
    let scl = match bank.take(config.bus.scl_pin) {
        Ok(pin) => pin,
        Err(e) => panic!("SCL pin gpio{} unavailable: {}", config.bus.scl_pin, e),
    };
    let sda = match bank.take(config.bus.sda_pin) {
        Ok(pin) => pin,
        Err(e) => panic!("SDA pin gpio{} unavailable: {}", config.bus.sda_pin, e),
    };

    let mut bus = SoftI2c::new(
        OpenDrainPin::new(scl),
        OpenDrainPin::new(sda),
        SpinDelay::from_nanos(SYS_CLK_HZ, DELAY_UNIT_NS),
        config.bus.timing,
    );

    for (name, address) in [
        ("INA219", config.sensor.address),
        ("SSD1306", config.display.address),
    ] {
        if bus.probe(address) {
            info!("{} found at {=u8:#x}", name, address.get());
        } else {
            warn!("{} not responding at {=u8:#x}", name, address.get());
        }
    }

    let mut monitor = Monitor::new(&config);
    // Waits out the display power-up before configuring it
    match monitor.init(&mut bus, &mut Delay) {
        Ok(()) => info!("Monitor initialized"),
        Err(e) => warn!("Monitor init failed: {}", e),
    }

    loop {
        match monitor.poll(&mut bus) {
            Ok(reading) => info!(
                "shunt={}uV bus={}mV current={}mA power={}mW",
                reading.shunt_uv, reading.bus_mv, reading.current_ma, reading.power_mw
            ),
            Err(e) => warn!("Measurement failed: {}", e),
        }

        Timer::after_millis(config.poll_interval_ms as u64).await;
    }
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> MonitorConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Configuration loaded");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using default configuration");
            MonitorConfig::default()
        }
    }
}
