//! UPS battery gauge.
//!
//! The UPS HAT carries an INA219 monitor. With the kernel `ina2xx` driver
//! bound, it shows up as a hwmon device named `ina219` exposing the bus
//! voltage (`in1_input`, millivolts) and current (`curr1_input`,
//! milliamps). Percentage and charging state follow
//! [`BatteryReading::from_bus`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::BatteryGauge;
use super::sysfs::{find_device, read_number};
use crate::error::SensorError;
use crate::state::BatteryReading;

/// hwmon `name` of the INA219 driver.
pub const INA219_HWMON_NAME: &str = "ina219";

/// Mocked pack voltage drop per minute of runtime.
const MOCK_DRAIN_VOLTS_PER_MINUTE: f32 = 0.01;

pub struct HwmonBattery {
    dir: PathBuf,
}

impl HwmonBattery {
    /// Locate the INA219 under `hwmon_root`.
    pub fn open(hwmon_root: &Path) -> Result<Self, SensorError> {
        let dir = find_device(hwmon_root, INA219_HWMON_NAME).ok_or(SensorError::Unavailable("ina219 battery gauge"))?;
        log::info!("battery gauge found at {}", dir.display());
        Ok(Self { dir })
    }
}

impl BatteryGauge for HwmonBattery {
    fn poll_battery(&mut self) -> Result<BatteryReading, SensorError> {
        let bus_mv = read_number(&self.dir.join("in1_input"))?;
        let current_ma = read_number(&self.dir.join("curr1_input"))?;
        Ok(BatteryReading::from_bus((bus_mv / 1000.0) as f32, current_ma as f32))
    }
}

/// Battery that slowly drains from its configured starting voltage, or
/// holds steady while the configured current is charging.
#[derive(Debug)]
pub struct MockBattery {
    voltage: f32,
    current_ma: f32,
    started: Instant,
    closed: bool,
}

impl MockBattery {
    pub fn new(voltage: f32, current_ma: f32) -> Self {
        Self {
            voltage,
            current_ma,
            started: Instant::now(),
            closed: false,
        }
    }

    /// Reading after `minutes` of runtime.
    pub fn reading_after(&self, minutes: f32) -> BatteryReading {
        let voltage = if self.current_ma > 0.0 {
            self.voltage
        } else {
            (self.voltage - minutes * MOCK_DRAIN_VOLTS_PER_MINUTE).max(3.0)
        };
        BatteryReading::from_bus(voltage, self.current_ma)
    }
}

impl BatteryGauge for MockBattery {
    fn poll_battery(&mut self) -> Result<BatteryReading, SensorError> {
        if self.closed {
            return Err(SensorError::Unavailable("battery gauge (closed)"));
        }
        Ok(self.reading_after(self.started.elapsed().as_secs_f32() / 60.0))
    }

    fn close(&mut self) -> Result<(), SensorError> {
        self.closed = true;
        Ok(())
    }
}
