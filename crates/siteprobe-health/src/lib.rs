//! siteprobe-health — HTTP probing for siteprobe targets.
//!
//! A probe is a single GET against a target address. It measures the
//! wall-clock time until response headers arrive and reports the status
//! code and `Content-Type` header. Every probe is bounded by a timeout;
//! connection errors, timeouts and unparseable addresses are reported as
//! a failed outcome instead of an error, so one bad target never aborts
//! a scrape.
//!
//! # Architecture
//!
//! ```text
//! Prober (shared hyper client, http + https)
//!   └── probe(address) → ProbeReport { elapsed, outcome }
//!         ├── ProbeOutcome::Response { status, content_type }
//!         └── ProbeOutcome::Failed { reason }
//! ```

pub mod probe;

pub use probe::{ProbeError, ProbeOutcome, ProbeReport, Prober};
