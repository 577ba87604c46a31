//! Name-keyed metric ownership in first-registration order.

use std::collections::HashMap;

use crate::error::{MetricError, MetricResult};
use crate::metric::{Metric, MetricKind};

/// Owns a set of metrics keyed by name.
///
/// Metrics are created on first use and iterate in the order they were
/// first registered.
#[derive(Debug, Default)]
pub struct MetricRegistry {
    metrics: Vec<Metric>,
    index: HashMap<String, usize>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `name`, creating it with `help` and `kind` if absent.
    pub fn get_or_create(
        &mut self,
        name: &str,
        help: &str,
        kind: MetricKind,
    ) -> MetricResult<&mut Metric> {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => self.push(Metric::new(name, help, kind)),
        };
        let metric = &mut self.metrics[idx];
        if metric.kind() != kind {
            return Err(MetricError::KindConflict {
                name: name.to_string(),
                existing: metric.kind().as_str(),
            });
        }
        Ok(metric)
    }

    pub fn gauge(&mut self, name: &str, help: &str) -> MetricResult<&mut Metric> {
        self.get_or_create(name, help, MetricKind::Gauge)
    }

    pub fn counter(&mut self, name: &str, help: &str) -> MetricResult<&mut Metric> {
        self.get_or_create(name, help, MetricKind::Counter)
    }

    /// Take ownership of an already built metric.
    ///
    /// Re-registering a name of the same kind keeps the existing state and
    /// returns `Ok(false)`.
    pub fn register(&mut self, metric: Metric) -> MetricResult<bool> {
        if let Some(&idx) = self.index.get(metric.name()) {
            let existing = &self.metrics[idx];
            if existing.kind() != metric.kind() {
                return Err(MetricError::KindConflict {
                    name: metric.name().to_string(),
                    existing: existing.kind().as_str(),
                });
            }
            return Ok(false);
        }
        self.push(metric);
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.index.get(name).map(|&idx| &self.metrics[idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Metric> {
        self.index.get(name).map(|&idx| &mut self.metrics[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn push(&mut self, metric: Metric) -> usize {
        let idx = self.metrics.len();
        self.index.insert(metric.name().to_string(), idx);
        self.metrics.push(metric);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelSet;

    #[test]
    fn creates_lazily_and_reuses() {
        let mut registry = MetricRegistry::new();
        registry
            .gauge("running", "Active threads")
            .unwrap()
            .observe(3.0, LabelSet::new())
            .unwrap();
        registry
            .gauge("running", "Active threads")
            .unwrap()
            .observe(4.0, LabelSet::new())
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("running").unwrap().value(&LabelSet::new()), Some(4.0));
    }

    #[test]
    fn iterates_in_registration_order() {
        let mut registry = MetricRegistry::new();
        registry.gauge("zeta", "z").unwrap();
        registry.counter("alpha_total", "a").unwrap();
        registry.gauge("mid", "m").unwrap();
        registry.gauge("zeta", "z").unwrap();

        let names: Vec<&str> = registry.iter().map(Metric::name).collect();
        assert_eq!(names, vec!["zeta", "alpha_total", "mid"]);
    }

    #[test]
    fn kind_conflict_is_rejected() {
        let mut registry = MetricRegistry::new();
        registry.gauge("jobs", "help").unwrap();
        let err = registry.counter("jobs", "help").unwrap_err();
        assert_eq!(
            err,
            MetricError::KindConflict {
                name: "jobs".to_string(),
                existing: "gauge"
            }
        );
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = MetricRegistry::new();
        assert!(registry.register(Metric::gauge("amazing", "amount of amazing")).unwrap());
        registry
            .get_mut("amazing")
            .unwrap()
            .observe(77.0, LabelSet::new())
            .unwrap();

        assert!(!registry.register(Metric::gauge("amazing", "amount of amazing")).unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("amazing").unwrap().value(&LabelSet::new()), Some(77.0));

        assert!(registry.register(Metric::counter("amazing", "x")).is_err());
    }
}
