//! Canonical label sets.
//!
//! A [`LabelSet`] keeps its pairs sorted by label name, so two sets with the
//! same pairs compare, hash and render identically whatever order they were
//! built in.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// Sorted label name → label value pairs identifying one sample bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelSet {
    pairs: BTreeMap<String, String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a label.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(name.into(), value.into());
    }

    /// Builder form of [`LabelSet::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Pairs in canonical (name-sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Combine with payload-level `extra` labels. Labels already in `self`
    /// win on a name collision.
    pub fn merge_under(&self, extra: &LabelSet) -> LabelSet {
        if extra.is_empty() {
            return self.clone();
        }
        let mut pairs = extra.pairs.clone();
        pairs.extend(self.pairs.iter().map(|(k, v)| (k.clone(), v.clone())));
        LabelSet { pairs }
    }

    /// Build from a JSON object, coercing each value to label text.
    /// `null` values are skipped.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut labels = LabelSet::new();
        for (name, value) in object {
            if let Some(text) = label_text(value) {
                labels.insert(name.clone(), text);
            }
        }
        labels
    }

    /// Exposition fragment: `{a="1",b="2"}`, or `""` for an empty set.
    pub fn render(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let inner: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{k}=\"{}\"", escape_label_value(v)))
            .collect();
        format!("{{{}}}", inner.join(","))
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = LabelSet::new();
        for (k, v) in iter {
            labels.insert(k, v);
        }
        labels
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for LabelSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Label text for a JSON value. Strings are taken verbatim, everything else
/// uses its JSON text; `null` has none.
pub fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Escape a label value for the exposition format.
pub fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}
