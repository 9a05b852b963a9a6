//! Helpers for Linux sysfs attribute files.
//!
//! Kernel drivers expose sensors as directories of small text files
//! (`/sys/class/hwmon/hwmonN/temp1_input`, `/sys/bus/iio/devices/...`).
//! These helpers locate a device directory by its `name` attribute and
//! read or write single values.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SensorError;

/// First directory under `root` whose `name` attribute equals `name`.
pub fn find_device(root: &Path, name: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;
    let mut dirs: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    dirs.sort();
    dirs.into_iter().find(|dir| {
        fs::read_to_string(dir.join("name"))
            .map(|content| content.trim() == name)
            .unwrap_or(false)
    })
}

/// Parse the numeric content of an attribute file.
pub fn read_number(path: &Path) -> Result<f64, SensorError> {
    let content = fs::read_to_string(path)?;
    content
        .trim()
        .parse::<f64>()
        .map_err(|err| SensorError::Parse(format!("{}: {}", path.display(), err)))
}

pub fn read_trimmed(path: &Path) -> io::Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

pub fn write_value(path: &Path, value: &str) -> io::Result<()> {
    fs::write(path, value)
}
