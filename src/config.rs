//! Application configuration.
//!
//! Configuration is a directory of TOML files. `main.toml` is read first and
//! every other `*.toml` file is layered on top in alphabetical order, so a
//! deployment can keep device overrides (`lcd.toml`, `gps.toml`, ...) apart
//! from the base settings. Tables merge key by key; scalars and arrays from a
//! later file replace earlier ones.
//!
//! Every section carries `#[serde(default)]`, so an empty or missing
//! directory yields a fully mocked setup that runs on any desktop.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File read before all others in a config directory.
pub const MAIN_CONFIG_FILE: &str = "main.toml";

/// Bounds for the every-N-seconds cadence interval.
pub const MIN_SECONDS_INTERVAL: u32 = 1;
pub const MAX_SECONDS_INTERVAL: u32 = 60;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub ui: UiConfig,
    pub input: InputConfig,
    pub cadence: CadenceConfig,
    pub statusbar: StatusBarConfig,
    pub lcd: LcdConfig,
    pub gpio: GpioConfig,
    pub ups: UpsConfig,
    pub temperature: TemperatureConfig,
    pub air_pressure: AirPressureConfig,
    pub accelerometer: AccelerometerConfig,
    pub gps: GpsConfig,
    pub wifi: WifiConfig,
    pub storage: StorageConfig,
    pub modules: ModulesConfig,
    pub power: PowerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self { name: "Kleine".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Sleep between loop iterations.
    pub tick_ms: u64,
    /// How long a modal message with the wait flag stays up.
    pub modal_dwell_ms: u64,
    pub splash_ms: u64,
    /// Modal shown while an action runs.
    pub please_wait: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            modal_dwell_ms: 2000,
            splash_ms: 2000,
            please_wait: "Please wait...".to_string(),
        }
    }
}

impl UiConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn modal_dwell(&self) -> Duration {
        Duration::from_millis(self.modal_dwell_ms)
    }

    pub fn splash(&self) -> Duration {
        Duration::from_millis(self.splash_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Sleep after a recognized press so one physical press reads once.
    pub debounce_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

impl InputConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Interval of the every-N-seconds cadence.
    pub seconds_interval: u32,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self { seconds_interval: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBarConfig {
    pub active: bool,
    pub show_time: bool,
    pub show_battery: bool,
    pub show_temperature: bool,
    pub show_gps: bool,
    pub show_wifi: bool,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            active: true,
            show_time: true,
            show_battery: true,
            show_temperature: true,
            show_gps: true,
            show_wifi: true,
        }
    }
}

impl StatusBarConfig {
    /// Status bar switched off entirely. Used for blank frames.
    pub const fn disabled() -> Self {
        Self {
            active: false,
            show_time: false,
            show_battery: false,
            show_temperature: false,
            show_gps: false,
            show_wifi: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcdConfig {
    /// Mocked LCD writes PNG frames; otherwise frames go to a simulator window.
    pub mock: bool,
    pub width: u32,
    pub height: u32,
    /// Pixel scale of the simulator window.
    pub scale: u32,
    /// Directory, relative to `storage.root`, receiving mocked frames.
    pub mocked_dir: PathBuf,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            mock: true,
            width: kleine_common::config::SCREEN_WIDTH,
            height: kleine_common::config::SCREEN_HEIGHT,
            scale: 2,
            mocked_dir: PathBuf::from("mocked/lcd"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub mock: bool,
    /// Sysfs GPIO line numbers (BCM numbering) of the three buttons.
    pub menu_pin: u32,
    pub select_pin: u32,
    pub enter_pin: u32,
    /// Root of the sysfs GPIO tree.
    pub sysfs_root: PathBuf,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            mock: true,
            menu_pin: 16,
            select_pin: 5,
            enter_pin: 6,
            sysfs_root: PathBuf::from("/sys/class/gpio"),
        }
    }
}

const HWMON_ROOT: &str = "/sys/class/hwmon";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpsConfig {
    pub mock: bool,
    /// Starting bus voltage of the mocked gauge.
    pub mock_voltage: f32,
    /// Current of the mocked gauge. Positive means charging.
    pub mock_current_ma: f32,
    /// Where the INA219 hwmon device is looked up.
    pub hwmon_root: PathBuf,
}

impl Default for UpsConfig {
    fn default() -> Self {
        Self {
            mock: true,
            mock_voltage: 4.1,
            mock_current_ma: -250.0,
            hwmon_root: PathBuf::from(HWMON_ROOT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    pub mock: bool,
    pub mock_value: f32,
    pub mock_humidity: f32,
    /// Offset added to real readings to compensate board heat.
    pub correction: f32,
    pub hwmon_root: PathBuf,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            mock: true,
            mock_value: 22.5,
            mock_humidity: 60.0,
            correction: -5.0,
            hwmon_root: PathBuf::from(HWMON_ROOT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirPressureConfig {
    pub mock: bool,
    pub mock_value: f32,
    pub iio_root: PathBuf,
}

impl Default for AirPressureConfig {
    fn default() -> Self {
        Self {
            mock: true,
            mock_value: 1013.25,
            iio_root: PathBuf::from("/sys/bus/iio/devices"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerometerConfig {
    pub mock: bool,
}

impl Default for AccelerometerConfig {
    fn default() -> Self {
        Self { mock: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsConfig {
    pub mock: bool,
    /// Serial device the receiver streams NMEA sentences on. The line speed
    /// must be configured outside the program (`stty -F <port> 9600`).
    pub serial_port: PathBuf,
    /// Log every received sentence at trace level.
    pub log_sentences: bool,
    pub mock_latitude: f64,
    pub mock_longitude: f64,
    pub mock_altitude: f32,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            mock: true,
            serial_port: PathBuf::from("/dev/ttyS0"),
            log_sentences: false,
            mock_latitude: 37.7749,
            mock_longitude: -122.4194,
            mock_altitude: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub mock: bool,
    /// Kernel wireless statistics file.
    pub proc_path: PathBuf,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            mock: true,
            proc_path: PathBuf::from("/proc/net/wireless"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    /// File names never removed by artifact cleanup.
    pub exclude_from_cleaning: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
            exclude_from_cleaning: vec![".keep".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Navigation order.
    pub order: Vec<String>,
    /// Options tree: module name to its ordered option names.
    pub options: BTreeMap<String, Vec<String>>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        let order = ["temperature", "accelerometer", "gps", "cockpit", "info", "settings", "power"]
            .into_iter()
            .map(String::from)
            .collect();
        let mut options = BTreeMap::new();
        options.insert(
            "power".to_string(),
            ["sleep", "shutdown", "reboot", "update_restart"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        Self { order, options }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub shutdown_command: Vec<String>,
    pub reboot_command: Vec<String>,
    /// Run from the working directory to fetch a new version.
    pub update_command: Vec<String>,
}

impl Default for PowerConfig {
    fn default() -> Self {
        let words = |cmd: &[&str]| cmd.iter().map(|s| (*s).to_string()).collect();
        Self {
            shutdown_command: words(&["sudo", "shutdown", "-h", "now"]),
            reboot_command: words(&["sudo", "reboot"]),
            update_command: words(&["git", "pull", "--ff-only"]),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            ui: UiConfig::default(),
            input: InputConfig::default(),
            cadence: CadenceConfig::default(),
            statusbar: StatusBarConfig::default(),
            lcd: LcdConfig::default(),
            gpio: GpioConfig::default(),
            ups: UpsConfig::default(),
            temperature: TemperatureConfig::default(),
            air_pressure: AirPressureConfig::default(),
            accelerometer: AccelerometerConfig::default(),
            gps: GpsConfig::default(),
            wifi: WifiConfig::default(),
            storage: StorageConfig::default(),
            modules: ModulesConfig::default(),
            power: PowerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load and merge every TOML file in `dir`.
    ///
    /// A missing directory is not an error and yields the defaults.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        if !dir.is_dir() {
            log::info!("config directory {} not found, using defaults", dir.display());
            return Self::default().validated();
        }

        let mut merged = toml::Table::new();
        for path in config_files(dir)? {
            log::debug!("loading config file {}", path.display());
            let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let table: toml::Table = toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
            merge_tables(&mut merged, table);
        }

        let config: Self = toml::Value::Table(merged)
            .try_into()
            .map_err(|source| ConfigError::Parse {
                path: dir.to_path_buf(),
                source,
            })?;
        config.validated()
    }

    /// Check cross-field constraints and clamp tunables into range.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.modules.order.is_empty() {
            return Err(ConfigError::Invalid("modules.order must list at least one module".into()));
        }
        if self.lcd.width == 0 || self.lcd.height == 0 {
            return Err(ConfigError::Invalid("lcd.width and lcd.height must be non-zero".into()));
        }
        let interval = self.cadence.seconds_interval;
        let clamped = interval.clamp(MIN_SECONDS_INTERVAL, MAX_SECONDS_INTERVAL);
        if clamped != interval {
            log::warn!("cadence.seconds_interval {} out of range, using {}", interval, clamped);
            self.cadence.seconds_interval = clamped;
        }
        Ok(self)
    }

    /// One-line summary of which peripherals are mocked, for the splash.
    pub fn mock_status(&self) -> String {
        let label = |mock: bool| if mock { "mocked" } else { "real" };
        [
            ("LCD", self.lcd.mock),
            ("GPIO", self.gpio.mock),
            ("UPS", self.ups.mock),
            ("GPS", self.gps.mock),
            ("Temp", self.temperature.mock),
            ("Press", self.air_pressure.mock),
            ("IMU", self.accelerometer.mock),
        ]
        .iter()
        .map(|(name, mock)| format!("{}: {}", name, label(*mock)))
        .collect::<Vec<_>>()
        .join(" | ")
    }

    /// Directories holding mocked device output, cleaned at startup.
    pub fn mocked_artifact_dirs(&self) -> Vec<PathBuf> {
        vec![self.storage.root.join(&self.lcd.mocked_dir)]
    }
}

/// `main.toml` first, then the remaining `*.toml` files alphabetically.
fn config_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort_by_key(|path| {
        let is_main = path.file_name().is_some_and(|name| name == MAIN_CONFIG_FILE);
        (!is_main, path.clone())
    });
    Ok(files)
}

/// Merge `overlay` into `base`. Nested tables merge, other values replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn temp_config_dir(files: &[(&str, &str)]) -> PathBuf {
        let n = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("kleine-config-{}-{}", std::process::id(), n));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_defaults_are_fully_mocked() {
        let config = AppConfig::default();
        assert!(config.lcd.mock && config.gpio.mock && config.ups.mock && config.gps.mock);
        assert_eq!(config.modules.order.first().map(String::as_str), Some("temperature"));
        assert_eq!(config.modules.options["power"].len(), 4);
    }

    #[test]
    fn test_missing_dir_gives_defaults() {
        let dir = std::env::temp_dir().join("kleine-config-does-not-exist");
        let config = AppConfig::load_dir(&dir).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = temp_config_dir(&[("main.toml", "[statusbar]\nshow_time = false\n")]);
        let config = AppConfig::load_dir(&dir).unwrap();
        assert!(!config.statusbar.show_time);
        assert!(config.statusbar.show_battery, "unset keys keep their default");
        assert_eq!(config.ui.tick_ms, UiConfig::default().tick_ms);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_later_files_override_main() {
        let dir = temp_config_dir(&[
            ("main.toml", "[lcd]\nmock = true\nwidth = 240\n[gps]\nmock = true\n"),
            ("a_device.toml", "[lcd]\nmock = false\n"),
        ]);
        let config = AppConfig::load_dir(&dir).unwrap();
        assert!(!config.lcd.mock, "a_device.toml is applied after main.toml");
        assert_eq!(config.lcd.width, 240, "sibling keys survive the merge");
        assert!(config.gps.mock);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = temp_config_dir(&[("main.toml", "[lcd\nmock = ")]);
        let err = AppConfig::load_dir(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_empty_module_order_rejected() {
        let mut config = AppConfig::default();
        config.modules.order.clear();
        assert!(matches!(config.validated(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_seconds_interval_is_clamped() {
        let mut config = AppConfig::default();
        config.cadence.seconds_interval = 0;
        assert_eq!(config.validated().unwrap().cadence.seconds_interval, MIN_SECONDS_INTERVAL);

        let mut config = AppConfig::default();
        config.cadence.seconds_interval = 600;
        assert_eq!(config.validated().unwrap().cadence.seconds_interval, MAX_SECONDS_INTERVAL);
    }

    #[test]
    fn test_mock_status_lists_devices() {
        let mut config = AppConfig::default();
        config.gps.mock = false;
        let status = config.mock_status();
        assert!(status.starts_with("LCD: mocked | GPIO: mocked"));
        assert!(status.contains("GPS: real"));
    }
}
