//! Type dispatch — routes payloads to per-type collectors.
//!
//! Each payload `type` is served by one [`TypeCollector`], built on first use
//! from the factory registered for that type (or an [`EmptyCollector`] when
//! none is). The [`Collector`] owns every collector and every externally
//! registered metric, and renders them all.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use procstat_core::{AdapterKind, ProcstatConfig, default_prefix, validate_prefix};

use crate::adapters::{JobCollector, ProcessCollector, WorkerPoolCollector};
use crate::error::{MetricError, MetricResult};
use crate::labels::LabelSet;
use crate::metric::Metric;
use crate::payload::{CollectReport, ObserveScope, Payload};
use crate::prometheus::render_prometheus;
use crate::registry::MetricRegistry;

/// Translates one producer subsystem's payloads into metric observations.
pub trait TypeCollector: Send {
    /// Payload `type` this collector serves.
    fn type_name(&self) -> &str;

    /// Apply one payload body. Absent fields skip their metric; bad values
    /// are rejected through `scope` without aborting the rest of the body.
    fn collect(&mut self, body: &Map<String, Value>, scope: &mut ObserveScope<'_>);

    /// Owned metrics, in registration order.
    fn metrics(&self) -> Vec<&Metric>;
}

/// Builds the collector for a payload type.
pub type CollectorFactory = fn(&str) -> Box<dyn TypeCollector>;

/// Collector for types with no registered factory. Owns nothing.
#[derive(Debug)]
pub struct EmptyCollector {
    type_name: String,
}

impl EmptyCollector {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
        }
    }
}

impl TypeCollector for EmptyCollector {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn collect(&mut self, body: &Map<String, Value>, _scope: &mut ObserveScope<'_>) {
        debug!(type_name = %self.type_name, fields = body.len(), "no adapter for payload type");
    }

    fn metrics(&self) -> Vec<&Metric> {
        Vec::new()
    }
}

/// Counters describing the collector's own work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    /// Payloads dispatched to a type collector.
    pub payloads: u64,
    /// Payloads dropped before dispatch.
    pub malformed: u64,
    /// Individual observations skipped for bad values.
    pub rejected_values: u64,
}

/// Dispatches payloads by type and aggregates every metric for exposition.
pub struct Collector {
    /// Prepended to every rendered metric name. Fixed at construction.
    prefix: String,
    factories: HashMap<String, CollectorFactory>,
    collectors: Vec<Box<dyn TypeCollector>>,
    /// type name → index into `collectors`.
    by_type: HashMap<String, usize>,
    /// Metrics handed in through `register_metric`.
    registered: MetricRegistry,
    stats: ProcessStats,
}

impl Collector {
    /// Collector with the built-in adapters and the process-wide prefix.
    pub fn new() -> Self {
        // The process-wide prefix was validated when it was set.
        Self::build(default_prefix())
    }

    /// Collector with the built-in adapters and an explicit prefix.
    pub fn with_prefix(prefix: &str) -> MetricResult<Self> {
        validate_prefix(prefix)?;
        Ok(Self::build(prefix))
    }

    /// Collector configured from a `procstat.toml`.
    pub fn from_config(config: &ProcstatConfig) -> MetricResult<Self> {
        let mut collector = Self::with_prefix(&config.collector.prefix)?;
        collector.bind_types(&config.types);
        Ok(collector)
    }

    fn build(prefix: &str) -> Self {
        let mut collector = Self {
            prefix: prefix.to_string(),
            factories: HashMap::new(),
            collectors: Vec::new(),
            by_type: HashMap::new(),
            registered: MetricRegistry::new(),
            stats: ProcessStats::default(),
        };
        collector.register_type("puma", |_| Box::new(WorkerPoolCollector::puma()));
        collector.register_type("sidekiq", |_| Box::new(JobCollector::sidekiq()));
        collector.register_type("delayed_job", |_| Box::new(JobCollector::delayed_job()));
        collector.register_type("process", |t| Box::new(ProcessCollector::new(t)));
        collector
    }

    /// Register a built-in adapter for each configured type name.
    pub fn bind_types(&mut self, types: &BTreeMap<String, AdapterKind>) {
        for (type_name, kind) in types {
            let factory: CollectorFactory = match kind {
                AdapterKind::WorkerPool => |t| Box::new(WorkerPoolCollector::new(t)),
                AdapterKind::Jobs => |t| Box::new(JobCollector::new(t, t)),
            };
            debug!(%type_name, adapter = kind.label(), "type bound");
            self.register_type(type_name, factory);
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Bind `type_name` to a factory. Applies to collectors not yet built.
    pub fn register_type(&mut self, type_name: &str, factory: CollectorFactory) {
        if self.by_type.contains_key(type_name) {
            warn!(%type_name, "collector already built, new factory ignored");
        }
        self.factories.insert(type_name.to_string(), factory);
    }

    /// Install a ready-made collector for its type, unless one exists.
    pub fn register_collector(&mut self, collector: Box<dyn TypeCollector>) -> bool {
        let type_name = collector.type_name().to_string();
        if self.by_type.contains_key(&type_name) {
            return false;
        }
        self.by_type.insert(type_name, self.collectors.len());
        self.collectors.push(collector);
        true
    }

    /// Register a metric owned directly by the collector.
    ///
    /// Registering a name again with the same kind keeps the existing state.
    pub fn register_metric(&mut self, metric: Metric) -> MetricResult<()> {
        let name = metric.name().to_string();
        if self.registered.register(metric)? {
            debug!(%name, "metric registered");
        }
        Ok(())
    }

    /// Observe a value on a metric passed to [`Collector::register_metric`].
    pub fn observe_registered(
        &mut self,
        name: &str,
        value: f64,
        labels: LabelSet,
    ) -> MetricResult<()> {
        let metric = self.registered.get_mut(name).ok_or_else(|| {
            MetricError::invalid(name, "metric is not registered")
        })?;
        metric.observe(value, labels)
    }

    /// Parse and apply one raw JSON payload.
    ///
    /// Malformed payloads are counted and returned as errors; they leave all
    /// state untouched.
    pub fn process(&mut self, raw: &str) -> MetricResult<CollectReport> {
        match Payload::parse(raw) {
            Ok(payload) => Ok(self.process_payload(&payload)),
            Err(e) => {
                self.stats.malformed += 1;
                warn!(error = %e, "payload dropped");
                Err(e)
            }
        }
    }

    /// Apply one already parsed payload.
    pub fn process_payload(&mut self, payload: &Payload) -> CollectReport {
        let idx = self.collector_for(payload.type_name());
        let mut scope = ObserveScope::new(payload.custom_labels());
        self.collectors[idx].collect(payload.body(), &mut scope);
        let report = scope.finish();

        self.stats.payloads += 1;
        self.stats.rejected_values += report.rejected.len() as u64;
        debug!(
            type_name = %payload.type_name(),
            observed = report.observed,
            rejected = report.rejected.len(),
            "payload collected"
        );
        report
    }

    /// Every live metric: registered ones first, then each type collector's
    /// in the order the types were first seen.
    pub fn metrics(&self) -> Vec<&Metric> {
        self.registered
            .iter()
            .chain(self.collectors.iter().flat_map(|c| c.metrics()))
            .collect()
    }

    /// Exposition text for every live metric.
    pub fn render(&self) -> String {
        render_prometheus(&self.metrics(), &self.prefix)
    }

    /// Payload types seen so far, in first-seen order.
    pub fn type_names(&self) -> Vec<&str> {
        self.collectors.iter().map(|c| c.type_name()).collect()
    }

    pub fn stats(&self) -> ProcessStats {
        self.stats
    }

    fn collector_for(&mut self, type_name: &str) -> usize {
        if let Some(&idx) = self.by_type.get(type_name) {
            return idx;
        }
        let collector: Box<dyn TypeCollector> = match self.factories.get(type_name) {
            Some(factory) => factory(type_name),
            None => Box::new(EmptyCollector::new(type_name)),
        };
        debug!(%type_name, "type collector created");
        let idx = self.collectors.len();
        self.by_type.insert(type_name.to_string(), idx);
        self.collectors.push(collector);
        idx
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
