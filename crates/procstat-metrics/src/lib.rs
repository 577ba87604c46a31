//! procstat-metrics — aggregation core for process metrics.
//!
//! Producer processes send JSON payloads tagged with a `type`; the collector
//! routes each to the type's adapter, which turns it into gauge and counter
//! observations keyed by label set. The live state renders as Prometheus
//! text on demand.
//!
//! # Architecture
//!
//! ```text
//! Collector
//!   ├── process(raw) ← one JSON payload from a producer
//!   │     └── TypeCollector::collect(body, scope) → Metric::observe(value, labels)
//!   ├── register_metric() / observe_registered()
//!   └── render() → text/plain for a /metrics endpoint
//!
//! SharedCollector
//!   └── Arc<Mutex<Collector>> for concurrent producers and scrapes
//! ```

pub mod adapters;
pub mod collector;
pub mod error;
pub mod labels;
pub mod metric;
pub mod payload;
pub mod prometheus;
pub mod registry;
pub mod shared;

pub use adapters::{JobCollector, ProcessCollector, WorkerPoolCollector};
pub use collector::{Collector, CollectorFactory, EmptyCollector, ProcessStats, TypeCollector};
pub use error::{MetricError, MetricResult};
pub use labels::LabelSet;
pub use metric::{Metric, MetricKind};
pub use payload::{CollectReport, ObserveScope, Payload};
pub use prometheus::{CONTENT_TYPE, render_prometheus};
pub use registry::MetricRegistry;
pub use shared::SharedCollector;
