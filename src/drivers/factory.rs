//! Startup selection of every peripheral.
//!
//! Each `[device] mock` flag picks the mock or the real implementation once.
//! A real sensor that cannot be opened is logged and replaced by
//! [`Unavailable`], so a missing chip costs one screen of "N/A" values
//! instead of the whole kiosk.
//!
//! | Config            | `mock = true`            | `mock = false`                 |
//! |-------------------|--------------------------|--------------------------------|
//! | `lcd`             | PNG frames in storage    | simulator window               |
//! | `gpio`            | keyboard (window) / queue| sysfs GPIO lines               |
//! | `ups`             | draining mock battery    | INA219 via hwmon, real power   |
//! | `temperature`     | constants                | SHTC3 via hwmon                |
//! | `air_pressure`    | constant                 | LPS22HB via IIO                |
//! | `accelerometer`   | synthetic motion         | unavailable                    |
//! | `gps`             | fixed position           | NMEA over serial               |
//! | `wifi`            | good link, fixed network | `/proc/net/wireless`, `nmcli`  |

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use embedded_graphics::prelude::Size;

use super::battery::{HwmonBattery, MockBattery};
use super::display::{PngDisplay, SimulatorWindow, WindowDisplay};
use super::gps::{MockGps, NmeaReader};
use super::input::{Button, KeyboardButtons, QueuedInput, SysfsButtons};
use super::power::{MockPower, SystemPower};
use super::sensors::{HwmonThermometer, IioBarometer, MockBarometer, MockMotion, MockThermometer, Unavailable};
use super::storage::FsStorage;
use super::wireless::{MockWireless, ProcWireless};
use super::{
    Barometer, BatteryGauge, DisplayDevice, InputAdapter, MotionSensor, PositionSensor, PowerControl, Sensors,
    Storage, Thermometer, WirelessProbe,
};
use crate::cadence::{Clock, WallClock};
use crate::context::Context;
use crate::error::{Error, SensorError};

/// Every device the lifecycle and scheduler use.
pub struct Devices {
    pub sensors: Sensors,
    pub input: Box<dyn InputAdapter>,
    pub display: Box<dyn DisplayDevice>,
    pub power: Box<dyn PowerControl>,
    pub storage: Box<dyn Storage>,
    pub clock: Box<dyn Clock>,
}

/// The opened device, or `None` after logging why it is missing.
fn opened<T>(target: &str, what: &str, result: Result<T, SensorError>) -> Option<T> {
    match result {
        Ok(device) => Some(device),
        Err(err) => {
            log::warn!(target: target, "{} unavailable, its values will show N/A: {}", what, err);
            None
        }
    }
}

fn build_sensors(ctx: &Context) -> Sensors {
    let config = ctx.config();
    let target = ctx.target();

    let thermometer: Box<dyn Thermometer> = if config.temperature.mock {
        Box::new(MockThermometer {
            temperature: config.temperature.mock_value,
            humidity: config.temperature.mock_humidity,
        })
    } else {
        let result = HwmonThermometer::open(&config.temperature.hwmon_root, config.temperature.correction);
        match opened(target, "thermometer", result) {
            Some(sensor) => Box::new(sensor),
            None => Box::new(Unavailable("thermometer")),
        }
    };

    let barometer: Box<dyn Barometer> = if config.air_pressure.mock {
        Box::new(MockBarometer {
            pressure: config.air_pressure.mock_value,
        })
    } else {
        match opened(target, "barometer", IioBarometer::open(&config.air_pressure.iio_root)) {
            Some(sensor) => Box::new(sensor),
            None => Box::new(Unavailable("barometer")),
        }
    };

    let motion: Box<dyn MotionSensor> = if config.accelerometer.mock {
        Box::new(MockMotion::new())
    } else {
        log::warn!(target: target, "no IMU driver on this host, accelerometer values will show N/A");
        Box::new(Unavailable("accelerometer"))
    };

    let position: Box<dyn PositionSensor> = if config.gps.mock {
        let gps = &config.gps;
        Box::new(MockGps::new(gps.mock_latitude, gps.mock_longitude, gps.mock_altitude))
    } else {
        let result = NmeaReader::open(&config.gps.serial_port, config.gps.log_sentences);
        match opened(target, "gps", result) {
            Some(reader) => Box::new(reader),
            None => Box::new(Unavailable("gps")),
        }
    };

    let battery: Box<dyn BatteryGauge> = if config.ups.mock {
        Box::new(MockBattery::new(config.ups.mock_voltage, config.ups.mock_current_ma))
    } else {
        match opened(target, "battery gauge", HwmonBattery::open(&config.ups.hwmon_root)) {
            Some(gauge) => Box::new(gauge),
            None => Box::new(Unavailable("battery gauge")),
        }
    };

    let wireless: Box<dyn WirelessProbe> = if config.wifi.mock {
        Box::new(MockWireless)
    } else {
        Box::new(ProcWireless::new(&config.wifi.proc_path))
    };

    Sensors {
        thermometer,
        barometer,
        motion,
        position,
        battery,
        wireless,
    }
}

/// Build all devices from the configuration in `ctx`.
///
/// `headless` forces the PNG display and queued input. `quit` is raised
/// when the simulator window is closed.
pub fn build(ctx: &Context, headless: bool, quit: Arc<AtomicBool>) -> Result<Devices, Error> {
    let config = ctx.config();
    let target = ctx.target();
    let size = Size::new(config.lcd.width, config.lcd.height);

    let window = (!headless && !config.lcd.mock).then(|| SimulatorWindow::shared(&config.app.name, config.lcd.scale));

    let display: Box<dyn DisplayDevice> = match &window {
        Some(window) => Box::new(WindowDisplay::new(Rc::clone(window), size)),
        None => Box::new(PngDisplay::new(&config.storage.root.join(&config.lcd.mocked_dir), size)?),
    };

    let input: Box<dyn InputAdapter> = if headless {
        Box::new(QueuedInput::new())
    } else if config.gpio.mock {
        match &window {
            Some(window) => Box::new(KeyboardButtons::new(Rc::clone(window), quit)),
            None => Box::new(QueuedInput::new()),
        }
    } else {
        let gpio = &config.gpio;
        let pins = [
            (Button::Menu, gpio.menu_pin),
            (Button::Select, gpio.select_pin),
            (Button::Enter, gpio.enter_pin),
        ];
        match SysfsButtons::open(&gpio.sysfs_root, pins) {
            Ok(buttons) => Box::new(buttons),
            Err(err) => {
                log::warn!(target: target, "GPIO buttons unavailable, input disabled: {}", err);
                Box::new(QueuedInput::new())
            }
        }
    };

    let power: Box<dyn PowerControl> = if config.ups.mock {
        Box::new(MockPower::default())
    } else {
        Box::new(SystemPower::new(&config.power))
    };

    log::info!(target: target, "{}", config.mock_status());
    Ok(Devices {
        sensors: build_sensors(ctx),
        input,
        display,
        power,
        storage: Box::new(FsStorage::new(&config.storage.exclude_from_cleaning)),
        clock: Box::new(WallClock),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_headless_mock_build() {
        let mut config = AppConfig::default();
        config.storage.root = std::env::temp_dir().join(format!("kleine-factory-{}", std::process::id()));
        let ctx = Context::new(config);

        let mut devices = build(&ctx, true, Arc::new(AtomicBool::new(false))).unwrap();
        assert_eq!(devices.display.screen_size(), Size::new(320, 240));
        assert!(devices.sensors.poll_temperature().is_ok(), "mocked thermometer answers");
        assert!(!devices.input.is_pressed("menu"));
        let _ = std::fs::remove_dir_all(&ctx.config().storage.root);
    }

    #[test]
    fn test_missing_real_sensors_become_unavailable() {
        let mut config = AppConfig::default();
        config.storage.root = std::env::temp_dir().join(format!("kleine-factory-real-{}", std::process::id()));
        config.temperature.mock = false;
        config.temperature.hwmon_root = "/nonexistent/hwmon".into();
        config.gps.mock = false;
        config.gps.serial_port = "/nonexistent/ttyS0".into();
        let ctx = Context::new(config);

        let mut sensors = build_sensors(&ctx);
        assert!(matches!(sensors.poll_temperature(), Err(SensorError::Unavailable(_))));
        assert!(matches!(sensors.poll_position(), Err(SensorError::Unavailable(_))));
        assert!(sensors.poll_air_pressure().is_ok(), "barometer is still mocked");
    }
}
