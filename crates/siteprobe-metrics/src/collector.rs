//! Collector — one descriptor per target, probed on every scrape.
//!
//! A collector is immutable once built. The exporter replaces it wholesale
//! whenever the registry changes, so the descriptor set always mirrors the
//! registry snapshot it was built from.

use std::time::Instant;

use siteprobe_core::Target;
use siteprobe_health::{ProbeOutcome, ProbeReport, Prober};
use tracing::{debug, warn};

/// Suffix appended to the sanitized site name to form the metric name.
pub const METRIC_SUFFIX: &str = "_http_response_duration";

pub const METRIC_HELP: &str = "The response time of the HTTP request";

/// Label names carried by every sample, in exposition order.
pub const VARIABLE_LABELS: [&str; 3] = ["site", "status_code", "content_type"];

/// `status_code` label value for a probe that got no response.
pub const UNREACHABLE_STATUS: &str = "0";

/// Describes the series exported for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Fully-qualified metric name.
    pub fq_name: String,
    pub help: String,
    /// Target name; becomes the `site` label.
    pub site: String,
    /// Address probed on each scrape.
    pub address: String,
}

impl MetricDescriptor {
    pub fn for_target(target: &Target) -> Self {
        Self {
            fq_name: metric_name(&target.name),
            help: METRIC_HELP.to_string(),
            site: target.name.clone(),
            address: target.address.clone(),
        }
    }

    pub fn variable_labels(&self) -> &'static [&'static str] {
        &VARIABLE_LABELS
    }
}

/// Label values of a single sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLabels {
    pub site: String,
    pub status_code: String,
    pub content_type: String,
}

impl SampleLabels {
    /// Label pairs in `VARIABLE_LABELS` order.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (VARIABLE_LABELS[0], self.site.as_str()),
            (VARIABLE_LABELS[1], self.status_code.as_str()),
            (VARIABLE_LABELS[2], self.content_type.as_str()),
        ]
    }
}

/// One observed value for a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub descriptor: MetricDescriptor,
    /// Elapsed seconds until response headers (or until the probe failed).
    pub value: f64,
    pub labels: SampleLabels,
}

impl MetricSample {
    /// Build the sample for a finished probe.
    pub fn from_report(descriptor: &MetricDescriptor, report: &ProbeReport) -> Self {
        let (status_code, content_type) = match &report.outcome {
            ProbeOutcome::Response {
                status,
                content_type,
            } => (status.to_string(), content_type.clone()),
            ProbeOutcome::Failed { .. } => (UNREACHABLE_STATUS.to_string(), String::new()),
        };

        Self {
            descriptor: descriptor.clone(),
            value: report.elapsed.as_secs_f64(),
            labels: SampleLabels {
                site: descriptor.site.clone(),
                status_code,
                content_type,
            },
        }
    }
}

/// Probes a fixed snapshot of targets.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    descriptors: Vec<MetricDescriptor>,
}

impl Collector {
    /// Build a collector from a registry snapshot.
    pub fn new(targets: &[Target]) -> Self {
        Self {
            descriptors: targets.iter().map(MetricDescriptor::for_target).collect(),
        }
    }

    /// One descriptor per target, in registry order.
    pub fn describe(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Probe every target in order and return one sample each.
    ///
    /// Probes run sequentially. A failed probe yields an unreachable sample
    /// and the pass continues with the next target.
    pub async fn collect(&self, prober: &Prober) -> Vec<MetricSample> {
        let started = Instant::now();
        let mut samples = Vec::with_capacity(self.descriptors.len());

        for descriptor in &self.descriptors {
            let report = prober.probe(&descriptor.address).await;
            if let ProbeOutcome::Failed { reason } = &report.outcome {
                warn!(
                    site = %descriptor.site,
                    address = %descriptor.address,
                    error = %reason,
                    "probe failed"
                );
            }
            samples.push(MetricSample::from_report(descriptor, &report));
        }

        debug!(
            targets = samples.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection pass finished"
        );
        samples
    }
}

/// Turn a target name into a valid Prometheus metric name.
///
/// Characters outside `[a-zA-Z0-9_:]` become `_`; a leading digit gets a
/// `_` prefix.
pub fn metric_name(site: &str) -> String {
    let mut name = String::with_capacity(site.len() + METRIC_SUFFIX.len() + 1);
    if site.starts_with(|c: char| c.is_ascii_digit()) {
        name.push('_');
    }
    name.extend(site.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
            c
        } else {
            '_'
        }
    }));
    name.push_str(METRIC_SUFFIX);
    name
}
