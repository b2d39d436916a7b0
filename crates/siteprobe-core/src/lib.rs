pub mod config;
pub mod registry;
pub mod target;

pub use config::{parse_duration, ExporterConfig};
pub use registry::{Registry, RegistryError};
pub use target::Target;
