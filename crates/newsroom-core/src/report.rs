use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{self, AggregateError};
use crate::error::Result;
use crate::filter::{self, FilterParams, FilteredView};
use crate::loader::{date_values, Dataset};
use crate::schema;
use crate::sentiment::{sentiment_distribution, SentimentAnalyzer};

/// Human-facing date format of the `TANGGAL_TAMPIL` column, e.g. `05 Jan 2024`.
pub const DISPLAY_DATE_FORMAT: &str = "%d %b %Y";

/// What the active filters resolved to; drives the report subheader.
#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub keyword: Option<String>,
    pub row_count: usize,
    /// True when the session shows the whole dataset unfiltered.
    pub is_default: bool,
}

/// Data behind one chart. A missing source column downgrades that chart to
/// a notice without touching the others.
#[derive(Debug)]
pub enum ChartOutcome {
    Table(DataFrame),
    ColumnMissing(String),
}

impl ChartOutcome {
    pub fn table(&self) -> Option<&DataFrame> {
        match self {
            ChartOutcome::Table(df) => Some(df),
            ChartOutcome::ColumnMissing(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct ReportBody {
    pub word_frequencies: DataFrame,
    pub topic_trend: ChartOutcome,
    pub source_mentions: ChartOutcome,
    pub format_distribution: ChartOutcome,
    pub daily_format: ChartOutcome,
    pub source_theme: ChartOutcome,
    pub sentiment_distribution: DataFrame,
    /// Display table: formatted date, title, theme, attribution, sentiment,
    /// ordered date-descending like the view.
    pub table: DataFrame,
}

#[derive(Debug)]
pub struct DashboardReport {
    pub summary: FilterSummary,
    /// `None` when the filtered view is empty; render the no-data notice.
    pub body: Option<ReportBody>,
}

fn chart(result: std::result::Result<DataFrame, AggregateError>) -> Result<ChartOutcome> {
    match result {
        Ok(df) => Ok(ChartOutcome::Table(df)),
        Err(AggregateError::ColumnNotFound { column }) => {
            warn!(%column, "chart skipped, column not found in dataset");
            Ok(ChartOutcome::ColumnMissing(column))
        }
        Err(AggregateError::Polars(err)) => Err(err.into()),
    }
}

fn display_table(view: &FilteredView, labels: &Series) -> Result<DataFrame> {
    let df = view.df();
    let display: Vec<Option<String>> = date_values(df)?
        .into_iter()
        .map(|date| date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string()))
        .collect();
    let display_series = Series::new(
        schema::DISPLAY_DATE.into(),
        display
            .iter()
            .map(|opt| opt.as_deref())
            .collect::<Vec<Option<&str>>>(),
    );

    let columns: Vec<Column> = vec![
        display_series.into(),
        df.column(schema::TITLE)?.clone(),
        df.column(schema::THEME)?.clone(),
        df.column(schema::ATTRIBUTION)?.clone(),
        labels.clone().into(),
    ];
    Ok(DataFrame::new(columns)?)
}

/// Runs the whole session pipeline: filter, every chart aggregation, and
/// per-title sentiment. One blocking pass, rebuilt from scratch on every
/// parameter change.
pub fn build_report(
    dataset: &Dataset,
    params: &FilterParams,
    analyzer: &SentimentAnalyzer,
) -> Result<DashboardReport> {
    let view = filter::apply(dataset, params)?;
    let summary = FilterSummary {
        start: view.start(),
        end: view.end(),
        keyword: view.keyword().map(str::to_string),
        row_count: view.row_count(),
        is_default: view.is_unfiltered(),
    };

    if view.is_empty() {
        info!("no rows match the active filters");
        return Ok(DashboardReport {
            summary,
            body: None,
        });
    }

    let labels = analyzer.classify_titles(view.df())?;
    let body = ReportBody {
        word_frequencies: aggregate::word_frequencies(&view)?,
        topic_trend: chart(aggregate::topic_trend(&view))?,
        source_mentions: chart(aggregate::source_mentions(&view))?,
        format_distribution: chart(aggregate::format_distribution(&view))?,
        daily_format: chart(aggregate::daily_format(&view))?,
        source_theme: chart(aggregate::source_theme(&view))?,
        sentiment_distribution: sentiment_distribution(&labels)?,
        table: display_table(&view, &labels)?,
    };

    info!(rows = summary.row_count, "report assembled");
    Ok(DashboardReport {
        summary,
        body: Some(body),
    })
}
