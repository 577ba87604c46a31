//! procstat.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::prefix::validate_prefix;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcstatConfig {
    #[serde(default)]
    pub collector: CollectorSection,
    /// Extra payload type names, each bound to a built-in adapter.
    #[serde(default)]
    pub types: BTreeMap<String, AdapterKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectorSection {
    /// Prepended to every rendered metric name.
    #[serde(default)]
    pub prefix: String,
}

/// Built-in adapter a payload type can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Clustered or single worker-pool stats (backlog, running threads, ...).
    WorkerPool,
    /// Background job outcome counters.
    Jobs,
}

impl AdapterKind {
    pub fn label(&self) -> &'static str {
        match self {
            AdapterKind::WorkerPool => "worker_pool",
            AdapterKind::Jobs => "jobs",
        }
    }
}

impl ProcstatConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: ProcstatConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject prefixes and type names that could not form metric names.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_prefix(&self.collector.prefix)?;
        for type_name in self.types.keys() {
            // Type names become metric name stems, so they follow the same rules.
            if type_name.is_empty() || validate_prefix(type_name).is_err() {
                return Err(ConfigError::InvalidTypeName(type_name.clone()));
            }
        }
        Ok(())
    }

    /// Scaffold a config showing every section.
    pub fn scaffold() -> Self {
        let mut types = BTreeMap::new();
        types.insert("unicorn".to_string(), AdapterKind::WorkerPool);
        types.insert("resque".to_string(), AdapterKind::Jobs);
        ProcstatConfig {
            collector: CollectorSection {
                prefix: String::new(),
            },
            types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty() {
        let config = ProcstatConfig::parse("").unwrap();
        assert_eq!(config, ProcstatConfig::default());
        assert_eq!(config.collector.prefix, "");
    }

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
[collector]
prefix = "app_"

[types]
unicorn = "worker_pool"
resque = "jobs"
"#;
        let config = ProcstatConfig::parse(toml_str).unwrap();
        assert_eq!(config.collector.prefix, "app_");
        assert_eq!(config.types["unicorn"], AdapterKind::WorkerPool);
        assert_eq!(config.types["resque"], AdapterKind::Jobs);
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let err = ProcstatConfig::parse("[collector]\nprefix = \"my-app\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid metric prefix"));
    }

    #[test]
    fn test_rejects_bad_type_name() {
        let err = ProcstatConfig::parse("[types]\n\"web server\" = \"jobs\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid type name"));
    }

    #[test]
    fn test_rejects_unknown_adapter() {
        assert!(ProcstatConfig::parse("[types]\nfoo = \"histogram\"\n").is_err());
    }

    #[test]
    fn test_scaffold_round_trips() {
        let config = ProcstatConfig::scaffold();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("worker_pool"));
        assert_eq!(ProcstatConfig::parse(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[collector]\nprefix = \"svc_\"").unwrap();
        let config = ProcstatConfig::from_file(file.path()).unwrap();
        assert_eq!(config.collector.prefix, "svc_");
    }

    #[test]
    fn test_from_missing_file() {
        assert!(ProcstatConfig::from_file(Path::new("/nonexistent/procstat.toml")).is_err());
    }
}
