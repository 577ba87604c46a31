//! `procstat config` — validate and scaffold procstat.toml.

use std::path::Path;

use anyhow::{Context, Result};
use procstat_core::ProcstatConfig;

pub fn check(path: &Path) -> Result<()> {
    let config = ProcstatConfig::from_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    println!("{}", summarize(&config));
    Ok(())
}

pub fn init(output: Option<&Path>) -> Result<()> {
    let toml = ProcstatConfig::scaffold().to_toml_string()?;
    match output {
        Some(path) => {
            std::fs::write(path, toml)?;
            println!("✓ Generated {}", path.display());
        }
        None => print!("{toml}"),
    }
    Ok(())
}

fn summarize(config: &ProcstatConfig) -> String {
    let mut out = format!("✓ prefix: {:?}", config.collector.prefix);
    for (type_name, kind) in &config.types {
        out.push_str(&format!("\n  {type_name} → {}", kind.label()));
    }
    out
}
