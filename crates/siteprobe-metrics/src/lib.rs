//! siteprobe-metrics — turns the target registry into scrape output.
//!
//! Each registered target gets one metric descriptor. On every scrape the
//! active collector probes its targets one after another and emits a
//! latency sample labeled with the site name, status code and content type.
//!
//! # Architecture
//!
//! ```text
//! Exporter (one RwLock)
//!   ├── Registry          ← add / update / remove
//!   ├── Arc<Collector>    ← rebuilt wholesale after each mutation
//!   └── TargetStore       ← saved before the new state is committed
//!
//! scrape() → Collector::collect() → Vec<MetricSample>
//!   └── render_prometheus() → text/plain for /metrics
//! ```
//!
//! A mutation copies the registry, applies the change, persists the copy
//! and only then swaps in the copy and its freshly built collector. A
//! failed save leaves both untouched.

pub mod collector;
pub mod exporter;
pub mod prometheus;

pub use collector::{Collector, MetricDescriptor, MetricSample, SampleLabels};
pub use exporter::{Exporter, ExporterError};
pub use prometheus::render_prometheus;
