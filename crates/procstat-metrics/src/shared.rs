//! Shared collector handle for concurrent producers and scrapes.
//!
//! One coarse lock guards the whole collector, so payload ingestion and
//! rendering never interleave.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::collector::{Collector, CollectorFactory, ProcessStats};
use crate::error::MetricResult;
use crate::labels::LabelSet;
use crate::metric::Metric;
use crate::payload::CollectReport;

/// Cloneable handle to a [`Collector`] behind a single async mutex.
#[derive(Clone)]
pub struct SharedCollector {
    inner: Arc<Mutex<Collector>>,
}

impl SharedCollector {
    pub fn new(collector: Collector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(collector)),
        }
    }

    pub async fn process(&self, raw: &str) -> MetricResult<CollectReport> {
        self.inner.lock().await.process(raw)
    }

    pub async fn render(&self) -> String {
        self.inner.lock().await.render()
    }

    pub async fn register_type(&self, type_name: &str, factory: CollectorFactory) {
        self.inner.lock().await.register_type(type_name, factory);
    }

    pub async fn register_metric(&self, metric: Metric) -> MetricResult<()> {
        self.inner.lock().await.register_metric(metric)
    }

    pub async fn observe_registered(
        &self,
        name: &str,
        value: f64,
        labels: LabelSet,
    ) -> MetricResult<()> {
        self.inner.lock().await.observe_registered(name, value, labels)
    }

    pub async fn stats(&self) -> ProcessStats {
        self.inner.lock().await.stats()
    }
}
