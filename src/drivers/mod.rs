//! Capability interfaces for every peripheral, with their implementations.
//!
//! Each peripheral is one trait with a mock and, where the host can provide
//! it, a real implementation. [`factory::build`] picks one per peripheral at
//! startup from the per-device `mock` flags; nothing re-checks the flags
//! afterwards.
//!
//! - [`sensors`]: thermometer, barometer and motion sensor mocks, plus the
//!   [`Sensors`] bundle the scheduler polls through
//! - [`battery`]: UPS battery gauge
//! - [`gps`]: NMEA reader thread and the merged position record
//! - [`wireless`]: WiFi link quality and network details for the info screen
//! - [`input`]: buttons
//! - [`display`]: PNG frame dump and simulator window
//! - [`power`]: shutdown, reboot and self-update
//! - [`storage`]: cleanup of mocked output

pub mod battery;
pub mod display;
pub mod factory;
pub mod gps;
pub mod input;
pub mod power;
pub mod sensors;
pub mod storage;
pub mod sysfs;
pub mod wireless;

use std::io;
use std::path::PathBuf;

use embedded_graphics::prelude::Size;
use kleine_common::SignalQuality;

use crate::canvas::Canvas;
use crate::error::{DisplayError, SensorError, StorageError};
use crate::state::{BatteryReading, GpsReading, NetworkInfo, Orientation};

pub use factory::{Devices, build};
pub use input::Button;
pub use sensors::Sensors;

// =============================================================================
// Sensors
// =============================================================================

/// Temperature and humidity (SHTC3 class sensors).
pub trait Thermometer {
    /// Degrees Celsius.
    fn poll_temperature(&mut self) -> Result<f32, SensorError>;
    /// Relative humidity in percent.
    fn poll_humidity(&mut self) -> Result<f32, SensorError>;
}

/// Air pressure (LPS22HB class sensors).
pub trait Barometer {
    /// Hectopascal.
    fn poll_air_pressure(&mut self) -> Result<f32, SensorError>;
}

/// Accelerometer, gyroscope and magnetometer with derived attitude.
pub trait MotionSensor {
    fn poll_orientation(&mut self) -> Result<Orientation, SensorError>;
}

pub trait PositionSensor {
    /// Latest fix, `None` while the receiver has none.
    fn poll_position(&mut self) -> Result<Option<GpsReading>, SensorError>;

    fn close(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}

pub trait BatteryGauge {
    fn poll_battery(&mut self) -> Result<BatteryReading, SensorError>;

    fn close(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
}

pub trait WirelessProbe {
    fn poll_signal(&mut self) -> Result<SignalQuality, SensorError>;

    /// Address, hardware and access point details of the active link.
    fn poll_network(&mut self) -> Result<NetworkInfo, SensorError> {
        Err(SensorError::Unavailable("network"))
    }
}

// =============================================================================
// Input, display, power, storage
// =============================================================================

pub trait InputAdapter {
    /// Read and clear the press state of the button called `name`. A press is
    /// reported at most once.
    fn is_pressed(&mut self, name: &str) -> bool;

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub trait DisplayDevice {
    /// Push a finished canvas to the device.
    fn flush(&mut self, canvas: &Canvas) -> Result<(), DisplayError>;

    fn screen_size(&self) -> Size;

    fn close(&mut self) -> Result<(), DisplayError>;
}

pub trait PowerControl {
    fn shutdown(&mut self) -> io::Result<()>;

    fn reboot(&mut self) -> io::Result<()>;

    /// Fetch a new version of the program. `true` means the update
    /// succeeded and [`PowerControl::restart`] should follow once the
    /// hardware is released; `false` is surfaced to the user.
    fn self_update_and_restart(&mut self) -> bool;

    /// Replace the running process with a fresh copy of itself.
    fn restart(&mut self) -> io::Result<()>;
}

pub trait Storage {
    /// Remove output left behind by mocked devices in earlier runs.
    /// Running it with nothing to clean is not an error.
    fn remove_previous_artifacts(&mut self, paths: &[PathBuf]) -> Result<(), StorageError>;
}
