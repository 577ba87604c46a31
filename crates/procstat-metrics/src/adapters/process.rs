//! Per-process runtime stats: heap, RSS and GC counts from each web or job
//! process.
//!
//! ```text
//! { "type": "process", "process_type": "web", "pid": 4242,
//!   "rss": 81920000, "heap_live_slots": 310000, "v8_heap_count": 1,
//!   "major_gc_ops_total": 12, "minor_gc_ops_total": 40, "allocated_objects_total": 900000 }
//! ```
//!
//! Every sample is labeled `pid` and, when the producer names one, `type`
//! (its `process_type`). The `_total` fields are running totals kept by the
//! producer, so they replace the stored value instead of adding to it.

use serde_json::{Map, Value};

use crate::collector::TypeCollector;
use crate::error::MetricError;
use crate::labels::{LabelSet, label_text};
use crate::metric::Metric;
use crate::payload::{ObserveScope, number_field};
use crate::registry::MetricRegistry;

/// (payload field = metric name, help)
const GAUGES: [(&str, &str); 9] = [
    ("heap_free_slots", "Free heap slots"),
    ("heap_live_slots", "Used heap slots"),
    ("v8_heap_size", "Total JavaScript V8 heap size (bytes)"),
    ("v8_used_heap_size", "Total used JavaScript V8 heap size (bytes)"),
    ("v8_physical_size", "Physical size consumed by V8 heaps"),
    ("v8_heap_count", "Number of V8 contexts running"),
    ("rss", "Total RSS used by process"),
    ("malloc_increase_bytes", "Bytes allocated outside of the heap"),
    ("oldmalloc_increase_bytes", "Bytes allocated outside of the heap for old objects"),
];

const COUNTERS: [(&str, &str); 3] = [
    ("major_gc_ops_total", "Major GC operations by process"),
    ("minor_gc_ops_total", "Minor GC operations by process"),
    ("allocated_objects_total", "Total number of allocated objects by process"),
];

/// `pid` label when the payload has none.
pub const DEFAULT_PID: &str = "-1";

/// Runtime gauges and GC counters per producer process.
#[derive(Debug)]
pub struct ProcessCollector {
    type_name: String,
    metrics: MetricRegistry,
}

impl ProcessCollector {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            metrics: MetricRegistry::new(),
        }
    }
}

impl TypeCollector for ProcessCollector {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn collect(&mut self, body: &Map<String, Value>, scope: &mut ObserveScope<'_>) {
        let labels = process_labels(body);

        for (field, help) in GAUGES {
            match number_field(body, field, field) {
                Ok(Some(value)) => match self.metrics.gauge(field, help) {
                    Ok(gauge) => scope.observe(gauge, value, &labels),
                    Err(e) => scope.reject(e),
                },
                Ok(None) => {}
                Err(e) => scope.reject(e),
            }
        }

        for (field, help) in COUNTERS {
            match number_field(body, field, field) {
                Ok(Some(total)) if total < 0.0 => scope.reject(MetricError::invalid(
                    field,
                    format!("`{field}` {total} is negative"),
                )),
                Ok(Some(total)) => match self.metrics.counter(field, help) {
                    Ok(counter) => scope.record_total(counter, total, &labels),
                    Err(e) => scope.reject(e),
                },
                Ok(None) => {}
                Err(e) => scope.reject(e),
            }
        }
    }

    fn metrics(&self) -> Vec<&Metric> {
        self.metrics.iter().collect()
    }
}

fn process_labels(body: &Map<String, Value>) -> LabelSet {
    let pid = body
        .get("pid")
        .and_then(label_text)
        .unwrap_or_else(|| DEFAULT_PID.to_string());
    let mut labels = LabelSet::new().with("pid", pid);
    if let Some(process_type) = body.get("process_type").and_then(label_text) {
        labels.insert("type", process_type);
    }
    labels
}
