use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "procstat",
    about = "procstat — aggregate producer stats into Prometheus text",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay newline-delimited JSON payloads and print the exposition.
    ///
    /// Payloads are read from the given files in order, or from stdin when
    /// no file is given. Malformed lines are logged and skipped.
    Render {
        /// Path to procstat.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Metric name prefix (overrides [collector].prefix)
        #[arg(short, long)]
        prefix: Option<String>,
        /// Payload files
        files: Vec<PathBuf>,
    },
    /// Inspect or generate configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Parse and validate a procstat.toml
    Check {
        path: PathBuf,
    },
    /// Generate a procstat.toml scaffold
    Init {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the exposition text.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("procstat=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { config, prefix, files } => {
            commands::render::render(config.as_deref(), prefix.as_deref(), &files)
        }
        Commands::Config { action } => match action {
            ConfigAction::Check { path } => commands::config::check(&path),
            ConfigAction::Init { output } => commands::config::init(output.as_deref()),
        },
    }
}
