//! siteprobe-state — durable storage for the probe target list.
//!
//! The store is a collaborator of the exporter: it loads the target list
//! once at startup and rewrites it wholesale after every mutation.
//!
//! # Layout
//!
//! The on-disk format is an ordered JSON array of `{name, address}`
//! objects. Writes go to a sibling temp file which is then renamed over
//! the existing file, so a crash mid-write never leaves a truncated file.
//!
//! `MemoryStore` keeps the list in memory for tests and can be told to
//! fail saves.

pub mod error;
pub mod json_file;
pub mod memory;

use siteprobe_core::Target;

pub use error::{StoreError, StoreResult};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Persistence collaborator for the target list.
pub trait TargetStore: Send + Sync {
    /// Read the full persisted target list.
    fn load(&self) -> StoreResult<Vec<Target>>;

    /// Replace the persisted target list.
    fn save(&self, targets: &[Target]) -> StoreResult<()>;
}
