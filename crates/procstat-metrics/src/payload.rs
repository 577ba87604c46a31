//! Payload envelopes and the per-payload observation scope.
//!
//! A payload is one JSON object from a producer:
//!
//! ```text
//! { "type": "puma", "custom_labels": { "service": "web" }, ...subsystem fields }
//! ```
//!
//! `type` and `custom_labels` form the envelope; everything else is the body
//! handed to the type's collector.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{MetricError, MetricResult};
use crate::labels::LabelSet;
use crate::metric::Metric;

/// A parsed payload: envelope plus subsystem body.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    type_name: String,
    custom_labels: LabelSet,
    body: Map<String, Value>,
}

impl Payload {
    /// Parse a JSON payload.
    pub fn parse(raw: &str) -> MetricResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| MetricError::MalformedPayload(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> MetricResult<Self> {
        let Value::Object(mut body) = value else {
            return Err(MetricError::MalformedPayload(
                "payload is not a JSON object".to_string(),
            ));
        };

        let type_name = match body.remove("type") {
            Some(Value::String(t)) if !t.is_empty() => t,
            Some(Value::String(_)) => {
                return Err(MetricError::MalformedPayload("empty `type`".to_string()));
            }
            Some(other) => {
                return Err(MetricError::MalformedPayload(format!(
                    "`type` must be a string, got {other}"
                )));
            }
            None => {
                return Err(MetricError::MalformedPayload("missing `type`".to_string()));
            }
        };

        let custom_labels = match body.remove("custom_labels") {
            None | Some(Value::Null) => LabelSet::new(),
            Some(Value::Object(labels)) => LabelSet::from_json_object(&labels),
            Some(other) => {
                return Err(MetricError::MalformedPayload(format!(
                    "`custom_labels` must be an object, got {other}"
                )));
            }
        };

        Ok(Self {
            type_name,
            custom_labels,
            body,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn custom_labels(&self) -> &LabelSet {
        &self.custom_labels
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

/// Read an optional numeric field.
///
/// Absent and `null` fields are `Ok(None)`; anything other than a JSON number
/// is an [`MetricError::InvalidValue`] attributed to `metric`.
pub fn number_field(
    object: &Map<String, Value>,
    field: &str,
    metric: &str,
) -> MetricResult<Option<f64>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| MetricError::invalid(metric, format!("`{field}` is out of range"))),
        Some(other) => Err(MetricError::invalid(
            metric,
            format!("`{field}` is not a number: {other}"),
        )),
    }
}

/// Outcome of collecting one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectReport {
    /// Observations applied.
    pub observed: usize,
    /// Observations skipped, with the reason.
    pub rejected: Vec<MetricError>,
}

impl CollectReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Scope for the observations made while collecting one payload.
///
/// Injects the payload's custom labels into every observation and records
/// rejected values instead of aborting the payload.
#[derive(Debug)]
pub struct ObserveScope<'a> {
    extra: &'a LabelSet,
    report: CollectReport,
}

impl<'a> ObserveScope<'a> {
    pub fn new(extra: &'a LabelSet) -> Self {
        Self {
            extra,
            report: CollectReport::default(),
        }
    }

    /// Observe `value` on `metric` under `labels` merged with the custom labels.
    pub fn observe(&mut self, metric: &mut Metric, value: f64, labels: &LabelSet) {
        match metric.observe(value, labels.merge_under(self.extra)) {
            Ok(()) => self.report.observed += 1,
            Err(e) => self.reject(e),
        }
    }

    /// Record a producer-kept total on `metric`, with the custom labels merged in.
    pub fn record_total(&mut self, metric: &mut Metric, total: f64, labels: &LabelSet) {
        match metric.record_total(total, labels.merge_under(self.extra)) {
            Ok(()) => self.report.observed += 1,
            Err(e) => self.reject(e),
        }
    }

    /// Record an error that skipped one observation.
    pub fn reject(&mut self, error: MetricError) {
        warn!(error = %error, "observation skipped");
        self.report.rejected.push(error);
    }

    pub fn finish(self) -> CollectReport {
        self.report
    }
}
