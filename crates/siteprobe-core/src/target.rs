//! Probe target type shared across siteprobe crates.

use serde::{Deserialize, Serialize};

/// A named HTTP endpoint to be probed.
///
/// `name` identifies the target across the registry and is immutable once
/// the target exists. `address` is handed to the HTTP client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub address: String,
}

impl Target {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}
