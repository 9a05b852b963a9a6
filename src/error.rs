//! Error types for the controller.
//!
//! Each concern gets its own enum so callers can tell recoverable failures
//! (a sensor that did not answer) from the ones that end the loop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A sensor poll failed. The scheduler keeps the previous reading.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("sensor I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse sensor data: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("could not encode frame {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("display is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not clean {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that escape a scheduler step and end the loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
