//! Cleanup of output left by mocked devices.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::Storage;
use crate::error::StorageError;

/// Removes `*.png` files from the given directories, keeping any file
/// whose name is listed in `exclude`.
#[derive(Debug, Clone)]
pub struct FsStorage {
    exclude: Vec<String>,
}

impl FsStorage {
    pub fn new(exclude: &[String]) -> Self {
        Self {
            exclude: exclude.to_vec(),
        }
    }

    fn clean_dir(&self, dir: &Path) -> Result<usize, StorageError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(StorageError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|ext| ext == "png") {
                continue;
            }
            let excluded = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| self.exclude.iter().any(|e| e == name));
            if excluded {
                continue;
            }
            fs::remove_file(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            removed += 1;
        }
        Ok(removed)
    }
}

impl Storage for FsStorage {
    fn remove_previous_artifacts(&mut self, paths: &[PathBuf]) -> Result<(), StorageError> {
        for dir in paths {
            let removed = self.clean_dir(dir)?;
            if removed > 0 {
                log::info!("removed {} old frame(s) from {}", removed, dir.display());
            }
        }
        Ok(())
    }
}
