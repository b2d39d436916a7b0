//! Prometheus text exposition format.
//!
//! Renders scrape samples into the text exposition format (0.0.4) for
//! scraping by a Prometheus server or compatible agent.

use std::fmt::Write;

use crate::collector::MetricSample;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples into Prometheus text format.
///
/// Samples sharing a metric name are grouped under a single `# HELP` /
/// `# TYPE` header. Latency is a point-in-time value, so every family is
/// exported as a gauge.
pub fn render_prometheus(samples: &[MetricSample]) -> String {
    let mut out = String::new();
    let mut families: Vec<(&str, Vec<&MetricSample>)> = Vec::new();

    for sample in samples {
        let name = sample.descriptor.fq_name.as_str();
        match families.iter_mut().find(|(n, _)| *n == name) {
            Some((_, members)) => members.push(sample),
            None => families.push((name, vec![sample])),
        }
    }

    for (name, members) in families {
        let help = &members[0].descriptor.help;
        let _ = writeln!(out, "# HELP {name} {}", escape_help(help));
        let _ = writeln!(out, "# TYPE {name} gauge");
        for sample in members {
            let labels = sample
                .labels
                .pairs()
                .iter()
                .map(|(k, v)| format!("{k}=\"{}\"", escape_label_value(v)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "{name}{{{labels}}} {}", sample.value);
        }
    }

    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MetricDescriptor, SampleLabels};
    use siteprobe_core::Target;

    fn test_sample(site: &str, status_code: &str, content_type: &str, value: f64) -> MetricSample {
        MetricSample {
            descriptor: MetricDescriptor::for_target(&Target::new(site, "http://x")),
            value,
            labels: SampleLabels {
                site: site.to_string(),
                status_code: status_code.to_string(),
                content_type: content_type.to_string(),
            },
        }
    }

    #[test]
    fn render_empty() {
        assert!(render_prometheus(&[]).is_empty());
    }

    #[test]
    fn render_single_target() {
        let output = render_prometheus(&[test_sample("a", "503", "text/plain", 0.125)]);

        assert!(output.contains(
            "# HELP a_http_response_duration The response time of the HTTP request\n"
        ));
        assert!(output.contains("# TYPE a_http_response_duration gauge\n"));
        assert!(output.contains(
            "a_http_response_duration{site=\"a\",status_code=\"503\",content_type=\"text/plain\"} 0.125\n"
        ));
    }

    #[test]
    fn render_multiple_targets_in_order() {
        let output = render_prometheus(&[
            test_sample("a", "200", "text/html", 0.5),
            test_sample("b", "0", "", 2.0),
        ]);

        let a = output.find("# TYPE a_http_response_duration").unwrap();
        let b = output.find("# TYPE b_http_response_duration").unwrap();
        assert!(a < b);
        assert!(output.contains(
            "b_http_response_duration{site=\"b\",status_code=\"0\",content_type=\"\"} 2\n"
        ));
    }

    #[test]
    fn colliding_names_share_one_header() {
        let output = render_prometheus(&[
            test_sample("my-site", "200", "", 0.1),
            test_sample("my.site", "200", "", 0.2),
        ]);

        assert_eq!(output.matches("# TYPE my_site_http_response_duration").count(), 1);
        assert!(output.contains("site=\"my-site\""));
        assert!(output.contains("site=\"my.site\""));
    }

    #[test]
    fn label_values_are_escaped() {
        let output = render_prometheus(&[test_sample(
            "a",
            "200",
            "text/plain; note=\"x\\y\"\n",
            1.0,
        )]);
        assert!(output.contains(r#"content_type="text/plain; note=\"x\\y\"\n""#));
    }

    #[test]
    fn render_format_is_prometheus_compatible() {
        let output = render_prometheus(&[
            test_sample("a", "200", "text/html", 0.5),
            test_sample("b", "404", "application/json", 0.01),
        ]);

        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            assert!(
                line.contains('{') && line.contains('}'),
                "line should have labels: {line}"
            );
            let value = line.rsplit(' ').next().unwrap();
            assert!(value.parse::<f64>().is_ok(), "bad value in: {line}");
        }
    }
}
