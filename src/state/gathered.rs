//! Latest known sensor readings.
//!
//! Every field keeps the last successfully polled value. A failed poll or a
//! missing fix never clears a field; the screen shows stale data rather than
//! a blank. Each `update_*` method reports whether the stored value actually
//! changed, which is what drives redraws.

use kleine_common::SignalQuality;

/// Three-axis value (x, y, z) or (pitch, roll, yaw).
pub type Vector3 = (f32, f32, f32);

/// One reading from the motion sensor.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Orientation {
    pub acceleration: Vector3,
    pub gyroscope: Vector3,
    pub magnetometer: Vector3,
    /// Pitch, roll and yaw in degrees.
    pub attitude: Vector3,
}

/// One position fix.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct GpsReading {
    /// Signed decimal degrees, positive north.
    pub latitude: f64,
    /// Signed decimal degrees, positive east.
    pub longitude: f64,
    /// `'N'` or `'S'`.
    pub latitude_dir: char,
    /// `'E'` or `'W'`.
    pub longitude_dir: char,
    pub altitude: Option<f32>,
    pub altitude_units: String,
    /// UTC time of the fix as `HH:MM:SS`.
    pub timestamp: Option<String>,
    /// NMEA status: `'A'` active, `'V'` void.
    pub status: Option<char>,
    pub signal_quality: SignalQuality,
    pub satellites: Option<u8>,
    pub speed_kmh: Option<f32>,
    /// Course over ground in degrees.
    pub heading: Option<f32>,
}

/// One battery gauge reading.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BatteryReading {
    pub percentage: u8,
    pub charging: bool,
}

impl BatteryReading {
    /// Convert UPS bus voltage and current into a reading.
    ///
    /// The pack is treated as linear between 3.0 V (empty) and 4.2 V (full).
    /// Positive current flows into the pack.
    pub fn from_bus(bus_voltage: f32, current_ma: f32) -> Self {
        let percentage = ((bus_voltage - 3.0) / 1.2 * 100.0).clamp(0.0, 100.0).round();
        Self {
            percentage: percentage as u8,
            charging: current_ma > 0.0,
        }
    }
}

/// Network details for the info screen. Unknown fields stay `None`.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct NetworkInfo {
    pub interface: Option<String>,
    pub ip: Option<String>,
    pub mac: Option<String>,
    pub ssid: Option<String>,
    pub security: Option<String>,
    /// Signal strength of the connected access point in percent.
    pub signal: Option<u8>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct GatheredState {
    /// Degrees Celsius.
    pub temperature: Option<f32>,
    /// Relative humidity in percent.
    pub humidity: Option<f32>,
    /// Hectopascal.
    pub air_pressure: Option<f32>,
    pub orientation: Option<Orientation>,
    pub gps: Option<GpsReading>,
    pub battery_percentage: Option<u8>,
    pub battery_is_charging: bool,
    pub wifi_quality: SignalQuality,
    pub network: NetworkInfo,
}

/// Store `value` in `slot` unless it already holds an equal value.
fn store<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        return false;
    }
    *slot = Some(value);
    true
}

impl GatheredState {
    pub fn update_temperature(&mut self, celsius: f32) -> bool {
        store(&mut self.temperature, celsius)
    }

    pub fn update_humidity(&mut self, percent: f32) -> bool {
        store(&mut self.humidity, percent)
    }

    pub fn update_air_pressure(&mut self, hpa: f32) -> bool {
        store(&mut self.air_pressure, hpa)
    }

    pub fn update_orientation(&mut self, orientation: Orientation) -> bool {
        store(&mut self.orientation, orientation)
    }

    /// `None` (no fix) keeps the previous position.
    pub fn update_gps(&mut self, reading: Option<GpsReading>) -> bool {
        match reading {
            Some(reading) => store(&mut self.gps, reading),
            None => false,
        }
    }

    pub fn update_battery(&mut self, reading: BatteryReading) -> bool {
        let percentage_changed = store(&mut self.battery_percentage, reading.percentage);
        let charging_changed = self.battery_is_charging != reading.charging;
        self.battery_is_charging = reading.charging;
        percentage_changed || charging_changed
    }

    pub fn update_wifi(&mut self, quality: SignalQuality) -> bool {
        let changed = self.wifi_quality != quality;
        self.wifi_quality = quality;
        changed
    }

    pub fn update_network(&mut self, info: NetworkInfo) -> bool {
        let changed = self.network != info;
        self.network = info;
        changed
    }

    /// Signal quality of the last fix, `Unknown` before the first one.
    pub fn gps_quality(&self) -> SignalQuality {
        self.gps.as_ref().map_or(SignalQuality::Unknown, |gps| gps.signal_quality)
    }
}
