//! Prometheus text exposition format.
//!
//! Renders live metrics into the Prometheus text exposition format for
//! scraping by a Prometheus server or compatible agent.

use std::collections::HashMap;

use tracing::warn;

use crate::metric::{Metric, format_value};

/// Media type of [`render_prometheus`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Render metrics into Prometheus text format.
///
/// One block per metric name, in the order names first appear in `metrics`.
/// Metrics sharing a name are merged under the first one's HELP and TYPE
/// lines; when two of them hold the same label set, the earlier metric's
/// sample is kept. `prefix` is prepended to every name.
pub fn render_prometheus(metrics: &[&Metric], prefix: &str) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Metric>> = HashMap::new();
    for &metric in metrics {
        groups
            .entry(metric.name())
            .or_insert_with(|| {
                order.push(metric.name());
                Vec::new()
            })
            .push(metric);
    }

    let mut out = String::new();
    for name in order {
        let group = &groups[name];
        let first = group[0];
        out.push_str(&format!(
            "# HELP {prefix}{name} {}\n",
            escape_help(first.help())
        ));
        out.push_str(&format!(
            "# TYPE {prefix}{name} {}\n",
            first.kind().as_str()
        ));

        let mut samples: Vec<(String, f64)> =
            group.iter().flat_map(|m| m.samples()).collect();
        // Stable sort, so duplicates stay in owner order.
        samples.sort_by(|(a, _), (b, _)| a.cmp(b));
        let before = samples.len();
        samples.dedup_by(|later, earlier| later.0 == earlier.0);
        if samples.len() < before {
            warn!(
                metric = %name,
                dropped = before - samples.len(),
                "duplicate series from another owner dropped"
            );
        }
        for (labels, value) in samples {
            out.push_str(&format!("{prefix}{name}{labels} {}\n", format_value(value)));
        }
    }
    out
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
