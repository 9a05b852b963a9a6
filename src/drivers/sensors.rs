//! Environmental and motion sensors, and the sensor bundle.
//!
//! Real sensors are read through their Linux kernel drivers: the SHTC3 via
//! hwmon (`shtc1` driver) and the LPS22HB via IIO (`st_pressure` driver).
//! Mock values come from a per-instance config struct built at startup.
//! The motion mock produces smooth synthetic signals so the accelerometer
//! screen visibly moves.

use std::path::{Path, PathBuf};
use std::time::Instant;

use kleine_common::SignalQuality;

use super::sysfs::{find_device, read_number};
use super::{Barometer, BatteryGauge, MotionSensor, PositionSensor, Thermometer, WirelessProbe};
use crate::error::SensorError;
use crate::state::{BatteryReading, GpsReading, NetworkInfo, Orientation};

/// Every sensor the scheduler polls, already resolved to mock or real.
pub struct Sensors {
    pub thermometer: Box<dyn Thermometer>,
    pub barometer: Box<dyn Barometer>,
    pub motion: Box<dyn MotionSensor>,
    pub position: Box<dyn PositionSensor>,
    pub battery: Box<dyn BatteryGauge>,
    pub wireless: Box<dyn WirelessProbe>,
}

impl Sensors {
    pub fn poll_temperature(&mut self) -> Result<f32, SensorError> {
        self.thermometer.poll_temperature()
    }

    pub fn poll_humidity(&mut self) -> Result<f32, SensorError> {
        self.thermometer.poll_humidity()
    }

    pub fn poll_air_pressure(&mut self) -> Result<f32, SensorError> {
        self.barometer.poll_air_pressure()
    }

    pub fn poll_orientation(&mut self) -> Result<Orientation, SensorError> {
        self.motion.poll_orientation()
    }

    pub fn poll_position(&mut self) -> Result<Option<GpsReading>, SensorError> {
        self.position.poll_position()
    }

    pub fn poll_battery(&mut self) -> Result<BatteryReading, SensorError> {
        self.battery.poll_battery()
    }

    pub fn poll_wireless(&mut self) -> Result<SignalQuality, SensorError> {
        self.wireless.poll_signal()
    }

    pub fn poll_network(&mut self) -> Result<NetworkInfo, SensorError> {
        self.wireless.poll_network()
    }
}

// =============================================================================
// Kernel-driver sensors
// =============================================================================

/// hwmon `name` of the SHTC3 driver.
pub const SHTC3_HWMON_NAME: &str = "shtc1";

/// IIO `name` of the LPS22HB driver.
pub const LPS22HB_IIO_NAME: &str = "lps22hb";

/// SHTC3 through hwmon. Values are reported in milli-units.
pub struct HwmonThermometer {
    dir: PathBuf,
    correction: f32,
}

impl HwmonThermometer {
    /// `correction` is added to every temperature reading.
    pub fn open(hwmon_root: &Path, correction: f32) -> Result<Self, SensorError> {
        let dir = find_device(hwmon_root, SHTC3_HWMON_NAME).ok_or(SensorError::Unavailable("shtc3 thermometer"))?;
        log::info!("thermometer found at {}", dir.display());
        Ok(Self { dir, correction })
    }
}

impl Thermometer for HwmonThermometer {
    fn poll_temperature(&mut self) -> Result<f32, SensorError> {
        let millidegrees = read_number(&self.dir.join("temp1_input"))?;
        Ok(round1((millidegrees / 1000.0) as f32 + self.correction))
    }

    fn poll_humidity(&mut self) -> Result<f32, SensorError> {
        let millipercent = read_number(&self.dir.join("humidity1_input"))?;
        Ok(round1((millipercent / 1000.0) as f32))
    }
}

/// LPS22HB through IIO. `in_pressure_input` is in kilopascal.
pub struct IioBarometer {
    dir: PathBuf,
}

impl IioBarometer {
    pub fn open(iio_root: &Path) -> Result<Self, SensorError> {
        let dir = find_device(iio_root, LPS22HB_IIO_NAME).ok_or(SensorError::Unavailable("lps22hb barometer"))?;
        log::info!("barometer found at {}", dir.display());
        Ok(Self { dir })
    }
}

impl Barometer for IioBarometer {
    fn poll_air_pressure(&mut self) -> Result<f32, SensorError> {
        let kilopascal = read_number(&self.dir.join("in_pressure_input"))?;
        Ok(round1((kilopascal * 10.0) as f32))
    }
}

// =============================================================================
// Mocks
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MockThermometer {
    pub temperature: f32,
    pub humidity: f32,
}

impl Thermometer for MockThermometer {
    fn poll_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.temperature)
    }

    fn poll_humidity(&mut self) -> Result<f32, SensorError> {
        Ok(self.humidity)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MockBarometer {
    pub pressure: f32,
}

impl Barometer for MockBarometer {
    fn poll_air_pressure(&mut self) -> Result<f32, SensorError> {
        Ok(self.pressure)
    }
}

/// Motion mock driven by slow sine waves.
#[derive(Debug)]
pub struct MockMotion {
    started: Instant,
}

impl MockMotion {
    pub fn new() -> Self {
        Self { started: Instant::now() }
    }

    /// Orientation at `t` seconds after start.
    pub fn orientation_at(t: f32) -> Orientation {
        let pitch = round1(fake_signal(t, -30.0, 30.0, 0.5));
        let roll = round1(fake_signal(t, -15.0, 15.0, 0.8));
        let yaw = round1((t * 12.0) % 360.0);
        let g = |deg: f32| round1(deg.to_radians().sin());
        Orientation {
            acceleration: (g(roll), g(pitch), round1(pitch.to_radians().cos())),
            gyroscope: (round1(fake_signal(t, -2.0, 2.0, 1.3)), round1(fake_signal(t, -2.0, 2.0, 1.7)), 0.0),
            magnetometer: (round1(yaw.to_radians().cos() * 40.0), round1(yaw.to_radians().sin() * 40.0), -12.0),
            attitude: (pitch, roll, yaw),
        }
    }
}

impl Default for MockMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSensor for MockMotion {
    fn poll_orientation(&mut self) -> Result<Orientation, SensorError> {
        Ok(Self::orientation_at(self.started.elapsed().as_secs_f32()))
    }
}

/// Sensor that is known to be absent. Every poll fails, which leaves the
/// gathered state untouched.
#[derive(Debug, Clone, Copy)]
pub struct Unavailable(pub &'static str);

impl Thermometer for Unavailable {
    fn poll_temperature(&mut self) -> Result<f32, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }

    fn poll_humidity(&mut self) -> Result<f32, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }
}

impl Barometer for Unavailable {
    fn poll_air_pressure(&mut self) -> Result<f32, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }
}

impl MotionSensor for Unavailable {
    fn poll_orientation(&mut self) -> Result<Orientation, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }
}

impl PositionSensor for Unavailable {
    fn poll_position(&mut self) -> Result<Option<GpsReading>, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }
}

impl BatteryGauge for Unavailable {
    fn poll_battery(&mut self) -> Result<BatteryReading, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }
}

impl WirelessProbe for Unavailable {
    fn poll_signal(&mut self) -> Result<SignalQuality, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }

    fn poll_network(&mut self) -> Result<NetworkInfo, SensorError> {
        Err(SensorError::Unavailable(self.0))
    }
}

/// Sine wave between `min` and `max`.
///
/// # Parameters
/// - `t`: Time in seconds
/// - `freq`: Angular frequency (higher = faster cycles)
pub fn fake_signal(t: f32, min: f32, max: f32, freq: f32) -> f32 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
