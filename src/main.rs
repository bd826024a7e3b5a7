use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use macroinsight::chart::{Charts, RadarChart};
use macroinsight::logging::configure_logging;
use macroinsight::pipeline::Generation;
use macroinsight::report::{self, report_file_name};
use macroinsight::scoring::{dimension_scores, DimensionScore};
use macroinsight::{
    AnalysisResult, HttpLlmClient, LlmConfig, Orchestrator, PipelineError, PipelineOptions,
    SummaryAdvice, ValidationMode, TARGET_PIPELINE,
};

#[derive(Parser)]
#[clap(
    name = "macroinsight",
    about = "Analyze the financial-market impact of a news item"
)]
struct Cli {
    /// Read the news text from this file instead of stdin
    #[clap(short, long)]
    file: Option<PathBuf>,

    /// Write the Markdown report to this path
    #[clap(short, long, conflicts_with = "save")]
    output: Option<PathBuf>,

    /// Write the Markdown report under a timestamped file name
    #[clap(short, long)]
    save: bool,

    /// Treat missing lists as schema errors
    #[clap(long)]
    strict: bool,

    /// Skip the follow-up investment advice call
    #[clap(long)]
    no_summary: bool,

    /// Print the analysis, scores and chart series as JSON instead of the report
    #[clap(long)]
    json: bool,
}

/// Everything a front end needs to draw one analysis.
#[derive(Serialize)]
struct JsonOutput<'a> {
    analysis: &'a AnalysisResult,
    scores: Vec<DimensionScore>,
    charts: Charts,
    summary: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let args = Cli::parse();
    let news = read_news(args.file.as_deref())?;

    let config = LlmConfig::from_env()?;
    let mut options = PipelineOptions::from_env();
    if args.strict {
        options.validation = ValidationMode::Strict;
    }
    if args.no_summary {
        options.summarize = false;
    }
    info!(target: TARGET_PIPELINE, "Using {:?} with {:?}", config, options);

    let generation = Generation::from(&config);
    let client = HttpLlmClient::new(config)?;
    let orchestrator = Orchestrator::new(client, options).with_generation(generation);

    // Ctrl-C abandons the run.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let outcome = match orchestrator.analyze_with_cancel(&news, Some(cancel_rx)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            print_failure(&err);
            std::process::exit(1);
        }
    };

    for warning in &outcome.warnings {
        eprintln!("{} {}", "warning:".bright_yellow(), warning);
    }

    let generated_at = Local::now();
    let report_text = report::render(
        &outcome.news,
        &outcome.analysis,
        &outcome.summary,
        generated_at,
    );

    if args.json {
        let output = JsonOutput {
            analysis: &outcome.analysis,
            scores: dimension_scores(&outcome.analysis),
            charts: Charts::from_analysis(&outcome.analysis),
            summary: outcome.summary.text(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_scores(&outcome.analysis);
        if let SummaryAdvice::Absent { reason } = &outcome.summary {
            eprintln!("{} {}", "Summary unavailable:".bright_yellow(), reason.dimmed());
        }
        println!("\n{}", report_text);
    }

    let destination = match (args.output, args.save) {
        (Some(path), _) => Some(path),
        (None, true) => Some(PathBuf::from(report_file_name(&generated_at))),
        (None, false) => None,
    };
    if let Some(path) = destination {
        fs::write(&path, &report_text)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        eprintln!("{} {}", "Report saved to".bright_green(), path.display());
    }

    Ok(())
}

fn read_news(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read news from {}", path.display())),
        None => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() {
                eprintln!("{}", "Paste the news text, then press Ctrl-D:".bright_blue());
            }
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .context("Failed to read news from stdin")?;
            Ok(text)
        }
    }
}

fn print_scores(analysis: &AnalysisResult) {
    println!("{}", "市場影響程度".bright_blue().bold());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Dimension"),
        Cell::new("Impact"),
        Cell::new("Score"),
        Cell::new("Level"),
    ]));
    for entry in dimension_scores(analysis) {
        let score_cell = Cell::new(&format!("{:.2}", entry.score));
        let score_cell = if entry.score >= 0.75 {
            score_cell.style_spec("Fr")
        } else if entry.score <= 0.25 {
            score_cell.style_spec("Fg")
        } else {
            score_cell
        };
        table.add_row(Row::new(vec![
            Cell::new(entry.dimension.label()),
            Cell::new(entry.phrase.as_deref().unwrap_or("-")),
            score_cell,
            Cell::new(RadarChart::nearest_label(entry.score)),
        ]));
    }
    table.printstd();
}

fn print_failure(err: &PipelineError) {
    let stage = err
        .stage()
        .map(|stage| stage.to_string())
        .unwrap_or_else(|| "idle".to_string());
    eprintln!(
        "{} [{}] {}",
        "Analysis failed".bright_red().bold(),
        stage.bright_yellow(),
        err
    );

    if let Some(raw) = err.raw_payload() {
        eprintln!("\n{}", "Raw upstream payload".bright_blue());
        eprintln!("{}", "─".repeat(80).dimmed());
        eprintln!("{}", raw);
        eprintln!("{}", "─".repeat(80).dimmed());
    }
}
