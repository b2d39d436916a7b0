//! JsonFileStore — flat-file persistence for the target list.

use std::fs;
use std::path::{Path, PathBuf};

use siteprobe_core::Target;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::TargetStore;

/// Build an `Io` error for the given path.
macro_rules! io_err {
    ($path:expr) => {
        |source| StoreError::Io {
            path: $path.to_path_buf(),
            source,
        }
    };
}

/// Target store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TargetStore for JsonFileStore {
    fn load(&self) -> StoreResult<Vec<Target>> {
        let content = fs::read(&self.path).map_err(io_err!(self.path))?;
        let targets: Vec<Target> =
            serde_json::from_slice(&content).map_err(|e| StoreError::Decode {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        debug!(path = ?self.path, count = targets.len(), "targets loaded");
        Ok(targets)
    }

    fn save(&self, targets: &[Target]) -> StoreResult<()> {
        let mut content =
            serde_json::to_vec_pretty(targets).map_err(|e| StoreError::Encode(e.to_string()))?;
        content.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err!(parent))?;
        }

        // Write-then-rename keeps the previous snapshot intact on failure.
        let temp_path = self.temp_path();
        fs::write(&temp_path, &content).map_err(io_err!(temp_path))?;
        fs::rename(&temp_path, &self.path).map_err(io_err!(self.path))?;

        debug!(path = ?self.path, count = targets.len(), "targets saved");
        Ok(())
    }
}
