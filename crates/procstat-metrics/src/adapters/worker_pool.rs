//! Worker-pool stats: a multi-worker server reporting either one worker's
//! stats, or cluster totals plus a status record per worker.
//!
//! Single:
//!
//! ```text
//! { "running": 3, "backlog": 4, "pool_capacity": 0, "max_threads": 3, "pid": 42, "index": 0 }
//! ```
//!
//! Cluster (detected by a non-null `workers`):
//!
//! ```text
//! { "workers": 2, "booted_workers": 2, "old_workers": 0,
//!   "worker_status": [ { "pid": 10, "index": 0, "last_status": { "running": 4, ... } }, ... ] }
//! ```
//!
//! Both shapes go through the same per-worker routine, so a single payload and
//! a one-worker slice of a cluster payload update metrics identically.

use serde_json::{Map, Value};
use tracing::warn;

use crate::collector::TypeCollector;
use crate::labels::{LabelSet, label_text};
use crate::metric::Metric;
use crate::payload::{ObserveScope, number_field};
use crate::registry::MetricRegistry;

/// (payload field, metric name suffix, help)
const CLUSTER_GAUGES: [(&str, &str, &str); 3] = [
    ("workers", "workers_count", "Configured workers count"),
    ("booted_workers", "booted_count", "Booted workers count"),
    ("old_workers", "old_count", "Old workers count"),
];

const WORKER_GAUGES: [(&str, &str, &str); 4] = [
    ("backlog", "backlog_count", "Backlog size"),
    ("running", "running_count", "Active threads count"),
    ("max_threads", "max_threads_count", "Configured max threads count"),
    ("pool_capacity", "pool_capacity", "Negative backpressure."),
];

/// `index` label when a worker record has none.
pub const DEFAULT_INDEX: &str = "0";
/// `pid` label when a worker record has none.
pub const DEFAULT_PID: &str = "-1";

/// Gauges for a clustered (or single-process) worker pool.
#[derive(Debug)]
pub struct WorkerPoolCollector {
    type_name: String,
    /// Stem for per-worker gauge names.
    worker_stem: String,
    /// Stem for cluster-level gauge names.
    cluster_stem: String,
    metrics: MetricRegistry,
}

impl WorkerPoolCollector {
    /// Collector for `type_name`, naming every gauge `<type_name>_<suffix>`.
    pub fn new(type_name: &str) -> Self {
        Self::with_stems(type_name, type_name, type_name)
    }

    /// Collector with distinct stems for worker and cluster gauges.
    pub fn with_stems(type_name: &str, worker_stem: &str, cluster_stem: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            worker_stem: worker_stem.to_string(),
            cluster_stem: cluster_stem.to_string(),
            metrics: MetricRegistry::new(),
        }
    }

    /// Puma naming: `puma_worker_*` and `puma_cluster_*`.
    pub fn puma() -> Self {
        Self::with_stems("puma", "puma_worker", "puma_cluster")
    }

    fn collect_cluster(&mut self, stats: &Map<String, Value>, scope: &mut ObserveScope<'_>) {
        let no_labels = LabelSet::new();
        for (field, suffix, help) in CLUSTER_GAUGES {
            let name = format!("{}_{suffix}", self.cluster_stem);
            observe_gauge(&mut self.metrics, &name, help, stats, field, &no_labels, scope);
        }

        match stats.get("worker_status") {
            None | Some(Value::Null) => {}
            Some(Value::Array(workers)) => {
                for worker in workers {
                    let Some(record) = worker.as_object() else {
                        warn!(type_name = %self.type_name, "worker_status entry is not an object");
                        continue;
                    };
                    let labels = worker_labels(record);
                    let empty = Map::new();
                    let last_status = record
                        .get("last_status")
                        .and_then(Value::as_object)
                        .unwrap_or(&empty);
                    self.collect_worker(last_status, &labels, scope);
                }
            }
            Some(_) => {
                warn!(type_name = %self.type_name, "worker_status is not an array");
            }
        }
    }

    fn collect_worker(
        &mut self,
        stats: &Map<String, Value>,
        labels: &LabelSet,
        scope: &mut ObserveScope<'_>,
    ) {
        for (field, suffix, help) in WORKER_GAUGES {
            let name = format!("{}_{suffix}", self.worker_stem);
            observe_gauge(&mut self.metrics, &name, help, stats, field, labels, scope);
        }
    }
}

impl TypeCollector for WorkerPoolCollector {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn collect(&mut self, body: &Map<String, Value>, scope: &mut ObserveScope<'_>) {
        // Anything without a usable `workers` is treated as a single worker.
        if body.get("workers").is_some_and(|w| !w.is_null()) {
            self.collect_cluster(body, scope);
        } else {
            let labels = worker_labels(body);
            self.collect_worker(body, &labels, scope);
        }
    }

    fn metrics(&self) -> Vec<&Metric> {
        self.metrics.iter().collect()
    }
}

/// `index` and `pid` labels for one worker record.
fn worker_labels(record: &Map<String, Value>) -> LabelSet {
    let index = record
        .get("index")
        .and_then(label_text)
        .unwrap_or_else(|| DEFAULT_INDEX.to_string());
    let pid = record
        .get("pid")
        .and_then(label_text)
        .unwrap_or_else(|| DEFAULT_PID.to_string());
    LabelSet::new().with("index", index).with("pid", pid)
}

/// Observe `field` as gauge `name` if present. The gauge is only created once
/// a value for it arrives.
fn observe_gauge(
    metrics: &mut MetricRegistry,
    name: &str,
    help: &str,
    stats: &Map<String, Value>,
    field: &str,
    labels: &LabelSet,
    scope: &mut ObserveScope<'_>,
) {
    let value = match number_field(stats, field, name) {
        Ok(Some(value)) => value,
        Ok(None) => return,
        Err(e) => return scope.reject(e),
    };
    match metrics.gauge(name, help) {
        Ok(gauge) => scope.observe(gauge, value, labels),
        Err(e) => scope.reject(e),
    }
}
