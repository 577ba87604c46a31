//! Background job outcome counters.
//!
//! One payload per finished job:
//!
//! ```text
//! { "type": "sidekiq", "name": "HardWorker", "success": false, "duration": 0.25 }
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::collector::TypeCollector;
use crate::error::MetricError;
use crate::labels::{LabelSet, label_text};
use crate::metric::Metric;
use crate::payload::{ObserveScope, number_field};
use crate::registry::MetricRegistry;

/// Counters for finished background jobs, labeled by `job_name`.
#[derive(Debug)]
pub struct JobCollector {
    type_name: String,
    jobs_total: String,
    failed_jobs_total: String,
    duration_total: String,
    metrics: MetricRegistry,
}

impl JobCollector {
    /// Collector for `type_name` with metric names under `namespace`.
    pub fn new(type_name: &str, namespace: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            jobs_total: format!("{namespace}_jobs_total"),
            failed_jobs_total: format!("{namespace}_failed_jobs_total"),
            duration_total: format!("{namespace}_job_duration_seconds_total"),
            metrics: MetricRegistry::new(),
        }
    }

    pub fn sidekiq() -> Self {
        Self::new("sidekiq", "sidekiq")
    }

    pub fn delayed_job() -> Self {
        Self::new("delayed_job", "delayed")
    }

    fn count(
        &mut self,
        name: &str,
        help: &str,
        value: f64,
        labels: &LabelSet,
        scope: &mut ObserveScope<'_>,
    ) {
        match self.metrics.counter(name, help) {
            Ok(counter) => scope.observe(counter, value, labels),
            Err(e) => scope.reject(e),
        }
    }
}

impl TypeCollector for JobCollector {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn collect(&mut self, body: &Map<String, Value>, scope: &mut ObserveScope<'_>) {
        let Some(job_name) = body.get("name").and_then(label_text) else {
            debug!(type_name = %self.type_name, "job payload without a name");
            return;
        };
        let labels = LabelSet::new().with("job_name", job_name);

        let success = match body.get("success") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(ok)) => *ok,
            Some(other) => {
                scope.reject(MetricError::InvalidValue {
                    metric: self.failed_jobs_total.clone(),
                    reason: format!("`success` is not a bool: {other}"),
                });
                true
            }
        };

        let jobs_total = self.jobs_total.clone();
        self.count(&jobs_total, "Total jobs performed", 1.0, &labels, scope);

        if !success {
            let failed = self.failed_jobs_total.clone();
            self.count(&failed, "Total failed jobs", 1.0, &labels, scope);
        }

        let duration_total = self.duration_total.clone();
        match number_field(body, "duration", &duration_total) {
            Ok(Some(seconds)) if seconds < 0.0 => scope.reject(MetricError::invalid(
                &duration_total,
                format!("`duration` {seconds} is negative"),
            )),
            Ok(Some(seconds)) => self.count(
                &duration_total,
                "Total time spent in jobs, in seconds",
                seconds,
                &labels,
                scope,
            ),
            Ok(None) => {}
            Err(e) => scope.reject(e),
        }
    }

    fn metrics(&self) -> Vec<&Metric> {
        self.metrics.iter().collect()
    }
}
