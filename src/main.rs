//! `vendor-watchr` — classify supplier news risk and score supplier readiness.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]): entity aliases, risk keywords,
//!    readiness dimensions.
//! 3. `classify` — load news items ([`ingest::news`]), match entities and
//!    score risk categories ([`classify`]).
//! 4. `score` — load metric rows ([`ingest::metrics`]), derive KPIs and the
//!    composite readiness index ([`scoring`]).
//! 5. `fetch` — pull recent headlines per entity ([`feed`]).
//! 6. Render the requested report ([`report`]).

mod classify;
mod cli;
mod config;
mod feed;
mod ingest;
mod matcher;
mod models;
mod report;
mod scoring;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use classify::ClassificationEngine;
use cli::{Cli, Command, ReportFormat};
use config::load_config;
use models::{ClassificationResult, NewsRecord};
use scoring::composite::CompositeScorer;

#[derive(Serialize)]
struct ClassifiedItem<'a> {
    #[serde(flatten)]
    record: &'a NewsRecord,
    #[serde(flatten)]
    result: &'a ClassificationResult,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_dir = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let config = load_config(&base_dir, cli.config.as_deref())?;

    // --pdf implies PDF format
    let report_format = match &cli.pdf {
        Some(_) => ReportFormat::Pdf,
        None => cli.report.clone(),
    };
    let pdf_path = cli
        .pdf
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("vendor-report.pdf"));

    match &cli.command {
        Command::Classify { news_file } => {
            let records = ingest::news::load_news(news_file)?;
            if !cli.quiet {
                eprintln!("  {} {} news items", "→".cyan(), records.len());
            }

            let engine = ClassificationEngine::new(&config)?;
            let results: Vec<ClassificationResult> =
                records.iter().map(|r| engine.classify(r)).collect();

            match report_format {
                ReportFormat::Terminal => {
                    report::terminal::render_classification(
                        &records,
                        &results,
                        cli.verbose,
                        cli.quiet,
                    )?;
                }
                ReportFormat::Json => {
                    let items: Vec<ClassifiedItem> = records
                        .iter()
                        .zip(&results)
                        .map(|(record, result)| ClassifiedItem { record, result })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&items)?);
                }
                ReportFormat::Pdf => {
                    report::pdf::render_classification(&records, &results, &pdf_path)?;
                }
            }
        }

        Command::Score { metrics_file } => {
            let rows = ingest::metrics::load_metrics(metrics_file)?;
            if !cli.quiet {
                eprintln!("  {} {} metric rows", "→".cyan(), rows.len());
            }

            let table = scoring::kpi::build(&rows);
            if !cli.quiet {
                if table.is_empty() {
                    eprintln!("  {} no usable metric rows", "!".yellow());
                } else {
                    eprintln!("  {} {} entities with KPIs", "→".cyan(), table.len());
                }
            }
            let scorer = CompositeScorer::new(&config.readiness);
            let scores = scorer.score_table(&table);

            match report_format {
                ReportFormat::Terminal => {
                    report::terminal::render_readiness(&scores, cli.verbose, cli.quiet)?;
                }
                ReportFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&scores)?);
                }
                ReportFormat::Pdf => {
                    report::pdf::render_readiness(&scores, &pdf_path)?;
                }
            }
        }

        Command::Fetch { out, max_per_entity } => {
            let records = feed::fetch_all(&config.entities, *max_per_entity, cli.quiet).await?;
            write_news(out, &records)?;
            if !cli.quiet {
                eprintln!(
                    "  {} {} items written to {}",
                    "→".cyan(),
                    records.len(),
                    out.display()
                );
            }
        }
    }

    Ok(())
}

fn write_news(path: &Path, records: &[NewsRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}
