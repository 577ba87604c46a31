//! `procstat render` — replay payloads into a collector and print the result.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use procstat_core::{ProcstatConfig, set_default_prefix};
use procstat_metrics::{Collector, ProcessStats};
use tracing::{debug, info};

pub fn render(config: Option<&Path>, prefix: Option<&str>, files: &[PathBuf]) -> Result<()> {
    let config = match config {
        Some(path) => ProcstatConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ProcstatConfig::default(),
    };
    let prefix = prefix.unwrap_or(&config.collector.prefix);
    set_default_prefix(prefix)?;

    let mut collector = Collector::new();
    collector.bind_types(&config.types);

    if files.is_empty() {
        replay(&mut collector, io::stdin().lock(), "<stdin>")?;
    } else {
        for path in files {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            replay(&mut collector, BufReader::new(file), &path.display().to_string())?;
        }
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(collector.render().as_bytes())?;
    stdout.flush()?;

    let ProcessStats {
        payloads,
        malformed,
        rejected_values,
    } = collector.stats();
    info!(payloads, malformed, rejected_values, "replay finished");
    Ok(())
}

/// Feed every non-blank line of `reader` to the collector.
///
/// Bad payloads are skipped; only read errors abort the replay.
pub fn replay<R: BufRead>(collector: &mut Collector, reader: R, source: &str) -> Result<()> {
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading {source}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = collector.process(line) {
            debug!(%source, line = lineno + 1, error = %e, "payload skipped");
        }
    }
    Ok(())
}
