use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vendor-watchr",
    about = "Classify supplier news risk and score supplier readiness",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file [default: ./.vendor-watchr/config.toml, fallback ~/.config/vendor-watchr/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// PDF output path; use without value to default to vendor-report.pdf
    #[arg(long, global = true, value_name = "FILE", num_args = 0..=1, default_missing_value = "vendor-report.pdf")]
    pub pdf: Option<PathBuf>,

    /// Show all rows (unclassified items, per-dimension subscores)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify news items from a JSON file
    Classify {
        /// News file (JSON array of items)
        news_file: PathBuf,
    },
    /// Score supplier readiness from a metrics CSV
    Score {
        /// Metrics file (wide CSV)
        metrics_file: PathBuf,
    },
    /// Fetch recent headlines for the configured entities
    Fetch {
        /// Output file for fetched items (JSON)
        #[arg(long, default_value = "news.json")]
        out: PathBuf,

        /// Cap on items kept per entity
        #[arg(long, default_value_t = 20, value_name = "N")]
        max_per_entity: usize,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Pdf,
}
