use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use newsroom_core::{
    build_report, load_dataset_from_path, ChartOutcome, DashboardConfig, FilterParams,
    FilterSummary, Lexicon, ReportBody, SentimentAnalyzer,
};
use polars::prelude::{AnyValue, DataFrame};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Newsroom video reporting CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and print the full dashboard report
    Report(ReportArgs),
    /// Validate the dataset schema and dates without running any pipeline
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Exported video metadata CSV; falls back to the config file's path
    #[arg(long)]
    data: Option<PathBuf>,

    /// TOML session config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower date bound (YYYY-MM-DD); defaults to the dataset minimum
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Upper date bound (YYYY-MM-DD); defaults to the dataset maximum
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Case-insensitive keyword matched against title and theme
    #[arg(long)]
    keyword: Option<String>,

    /// Lexicon file overriding the built-in one
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Emit the resolved filter summary as JSON instead of a header line
    #[arg(long)]
    summary_json: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(long)]
    data: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report(args) => run_report(args),
        Command::Check(args) => run_check(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_toml_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(DashboardConfig::default()),
    }
}

fn resolve_dataset_path(flag: Option<PathBuf>, config: &DashboardConfig) -> Result<PathBuf> {
    match flag.or_else(|| config.dataset.clone()) {
        Some(path) => Ok(path),
        None => bail!("no dataset given; pass --data or set `dataset` in the config file"),
    }
}

fn run_report(args: ReportArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let data_path = resolve_dataset_path(args.data, &config)?;

    let dataset = load_dataset_from_path(&data_path, &config.loader)
        .with_context(|| format!("failed to load dataset {}", data_path.display()))?;
    info!(rows = dataset.row_count(), "dataset loaded");

    let lexicon = match args.lexicon.or_else(|| config.lexicon.clone()) {
        Some(path) => Lexicon::from_path(&path)
            .with_context(|| format!("failed to load lexicon {}", path.display()))?,
        None => Lexicon::builtin(),
    };
    let analyzer = SentimentAnalyzer::new(lexicon);

    let params = FilterParams {
        start: args.start,
        end: args.end,
        keyword: args.keyword,
    };
    let report = build_report(&dataset, &params, &analyzer)?;

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    } else {
        print_summary(&report.summary);
    }
    match report.body {
        Some(body) => print_body(&body),
        None => println!("No data for the active filters."),
    }
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let data_path = resolve_dataset_path(args.data, &config)?;

    let dataset = load_dataset_from_path(&data_path, &config.loader)
        .with_context(|| format!("failed to load dataset {}", data_path.display()))?;

    println!("rows: {}", dataset.row_count());
    println!("date span: {} .. {}", dataset.min_date(), dataset.max_date());
    println!(
        "format column: {}",
        if dataset.has_format_column() {
            "present"
        } else {
            "absent"
        }
    );
    Ok(())
}

fn print_summary(summary: &FilterSummary) {
    if summary.is_default {
        println!("Full dataset, {} records", summary.row_count);
    } else {
        let mut line = format!(
            "Showing {} to {}, {} records",
            summary.start, summary.end, summary.row_count
        );
        if let Some(keyword) = summary.keyword.as_deref() {
            line.push_str(&format!(", keyword \"{keyword}\""));
        }
        println!("{line}");
    }
}

fn print_body(body: &ReportBody) {
    print_frame("Top words (titles + attributions)", &body.word_frequencies);
    print_chart("Topic trend by week", &body.topic_trend);
    print_chart("Source mentions", &body.source_mentions);
    print_chart("Format distribution", &body.format_distribution);
    print_chart("Daily production by format", &body.daily_format);
    print_chart("Source-theme relation", &body.source_theme);
    print_frame("Sentiment distribution", &body.sentiment_distribution);
    print_frame("Records", &body.table);
}

fn print_chart(title: &str, outcome: &ChartOutcome) {
    match outcome {
        ChartOutcome::Table(df) => print_frame(title, df),
        ChartOutcome::ColumnMissing(column) => {
            println!("\n== {title} ==");
            println!("column '{column}' not found in the dataset; chart skipped");
        }
    }
}

fn print_frame(title: &str, df: &DataFrame) {
    println!("\n== {title} ==");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        df.get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>(),
    );

    for idx in 0..df.height() {
        if let Some(row) = df.get(idx) {
            table.add_row(row.iter().map(cell).collect::<Vec<_>>());
        }
    }
    println!("{table}");
}

fn cell(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}
