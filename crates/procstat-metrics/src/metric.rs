//! Gauges and counters keyed by label set.

use std::collections::HashMap;

use crate::error::{MetricError, MetricResult};
use crate::labels::LabelSet;

/// Declared kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Last observed value per label set.
    Gauge,
    /// Running sum of observed increments per label set.
    Counter,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// A named metric holding one value per label set.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    help: String,
    kind: MetricKind,
    values: HashMap<LabelSet, f64>,
}

impl Metric {
    pub fn new(name: impl Into<String>, help: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind,
            values: HashMap::new(),
        }
    }

    pub fn gauge(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, help, MetricKind::Gauge)
    }

    pub fn counter(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(name, help, MetricKind::Counter)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Record an observation.
    ///
    /// Gauges overwrite the bucket, counters add to it. Non-finite values
    /// (and negative counter increments) are rejected and leave the metric
    /// untouched.
    pub fn observe(&mut self, value: f64, labels: LabelSet) -> MetricResult<()> {
        if !value.is_finite() {
            return Err(MetricError::invalid(&self.name, format!("{value} is not finite")));
        }
        match self.kind {
            MetricKind::Gauge => {
                self.values.insert(labels, value);
            }
            MetricKind::Counter => {
                if value < 0.0 {
                    return Err(MetricError::invalid(
                        &self.name,
                        format!("counter increment {value} is negative"),
                    ));
                }
                *self.values.entry(labels).or_insert(0.0) += value;
            }
        }
        Ok(())
    }

    /// Record a running total kept by the producer, such as a GC count.
    ///
    /// The bucket takes `total` as its value for either kind. Negative and
    /// non-finite totals are rejected. A lower total than before is a
    /// producer restart and is accepted.
    pub fn record_total(&mut self, total: f64, labels: LabelSet) -> MetricResult<()> {
        if !total.is_finite() || total < 0.0 {
            return Err(MetricError::invalid(
                &self.name,
                format!("total {total} is not a finite non-negative number"),
            ));
        }
        self.values.insert(labels, total);
        Ok(())
    }

    /// Add one to a counter bucket.
    pub fn increment(&mut self, labels: LabelSet) -> MetricResult<()> {
        self.observe(1.0, labels)
    }

    pub fn value(&self, labels: &LabelSet) -> Option<f64> {
        self.values.get(labels).copied()
    }

    /// Number of label-set buckets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample lines as `(label text, value)`, sorted by label text.
    pub fn samples(&self) -> Vec<(String, f64)> {
        let mut samples: Vec<(String, f64)> = self
            .values
            .iter()
            .map(|(labels, value)| (labels.render(), *value))
            .collect();
        samples.sort_by(|(a, _), (b, _)| a.cmp(b));
        samples
    }

    /// Exposition text for this metric alone, without a name prefix.
    pub fn render(&self) -> String {
        crate::prometheus::render_prometheus(&[self], "")
    }
}

/// Format a sample value: integral values without a decimal point, others
/// with the shortest text that parses back to the same `f64`.
pub fn format_value(value: f64) -> String {
    // `Display` for f64 never uses exponent notation and drops a zero fraction.
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
