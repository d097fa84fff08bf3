use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::config::LoaderConfig;
use crate::schema;

/// Date format used in the source sheet, e.g. `05-Jan-2024`.
pub const SOURCE_DATE_FORMAT: &str = "%d-%b-%Y";

const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("required column {column} not found after header normalization")]
    MissingColumn { column: &'static str },

    #[error("row {row}: date '{value}' does not match %d-%b-%Y")]
    InvalidDate { row: usize, value: String },

    #[error("dataset contains no data rows")]
    Empty,
}

/// The full record set for a session: loaded once, never mutated. Every
/// filtered view and aggregate bucket is rebuilt from this frame.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    min_date: NaiveDate,
    max_date: NaiveDate,
}

impl Dataset {
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    /// Earliest publication date in the full set (default filter lower bound).
    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    /// Latest publication date in the full set (default filter upper bound).
    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn has_format_column(&self) -> bool {
        self.df.column(schema::FORMAT).is_ok()
    }
}

/// Loads a dataset from CSV text.
///
/// Headers are normalized (prefix stripped, case-insensitive canonical
/// match) and dates are parsed eagerly; a single malformed date aborts the
/// load with its row number, matching the source sheet's contract that
/// every `TANGGAL` cell is well-formed.
pub fn load_dataset(content: &str, config: &LoaderConfig) -> Result<Dataset, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let mut column_index: HashMap<&'static str, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let trimmed = header.trim();
        let stripped = if config.column_prefix.is_empty() {
            trimmed
        } else {
            trimmed.strip_prefix(&config.column_prefix).unwrap_or(trimmed)
        };
        if let Some(canonical) = schema::canonical_column(stripped) {
            column_index.entry(canonical).or_insert(idx);
        }
    }

    for column in schema::REQUIRED_COLUMNS {
        if !column_index.contains_key(column) {
            return Err(LoadError::MissingColumn { column });
        }
    }
    let has_format = column_index.contains_key(schema::FORMAT);

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut titles: Vec<String> = Vec::new();
    let mut themes: Vec<String> = Vec::new();
    let mut attributions: Vec<String> = Vec::new();
    let mut formats: Vec<String> = Vec::new();

    let field = |record: &csv::StringRecord, column: &str| -> String {
        column_index
            .get(column)
            .and_then(|&idx| record.get(idx))
            .unwrap_or("")
            .to_string()
    };

    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header occupies line 1; data rows are numbered from 2.
        let row = row_idx + 2;

        let raw_date = field(&record, schema::DATE);
        let date = NaiveDate::parse_from_str(raw_date.trim(), SOURCE_DATE_FORMAT).map_err(
            |_| LoadError::InvalidDate {
                row,
                value: raw_date.trim().to_string(),
            },
        )?;

        dates.push(date);
        titles.push(field(&record, schema::TITLE));
        themes.push(field(&record, schema::THEME));
        attributions.push(field(&record, schema::ATTRIBUTION));
        if has_format {
            formats.push(field(&record, schema::FORMAT));
        }
    }

    if dates.is_empty() {
        return Err(LoadError::Empty);
    }

    let min_date = *dates.iter().min().unwrap();
    let max_date = *dates.iter().max().unwrap();

    let days: Vec<i32> = dates.iter().copied().map(days_since_epoch).collect();
    let date_series = Series::new(schema::DATE.into(), days).cast(&DataType::Date)?;

    let mut columns: Vec<Column> = vec![
        date_series.into(),
        Series::new(schema::TITLE.into(), titles).into(),
        Series::new(schema::THEME.into(), themes).into(),
        Series::new(schema::ATTRIBUTION.into(), attributions).into(),
    ];
    if has_format {
        columns.push(Series::new(schema::FORMAT.into(), formats).into());
    }

    let df = DataFrame::new(columns)?;
    debug!(
        rows = df.height(),
        has_format,
        %min_date,
        %max_date,
        "dataset loaded"
    );

    Ok(Dataset {
        df,
        min_date,
        max_date,
    })
}

pub fn load_dataset_from_path(path: &Path, config: &LoaderConfig) -> Result<Dataset, LoadError> {
    let content = std::fs::read_to_string(path)?;
    load_dataset(&content, config)
}

/// Physical representation of a [`NaiveDate`] in a polars Date column.
pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_CE_DAYS
}

/// Converts a Date column back into [`NaiveDate`]s for row-wise passes.
pub(crate) fn date_values(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>, PolarsError> {
    Ok(df.column(schema::DATE)?.date()?.as_date_iter().collect())
}
