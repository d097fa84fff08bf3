use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use thiserror::Error;

use crate::filter::FilteredView;
use crate::loader::date_values;
use crate::schema;

/// Chart cardinality bounds. Fixed per pipeline, not configurable.
pub const TOP_THEMES: usize = 10;
pub const TOP_SOURCES: usize = 10;
pub const TOP_RELATION_SOURCES: usize = 5;
pub const TOP_RELATION_THEMES: usize = 10;
pub const TOP_TOKENS: usize = 50;

/// Tokens suppressed by the word-frequency pipeline: Indonesian function
/// words plus filler values seen in the sheet.
const STOPWORDS: [&str; 22] = [
    "pastikan", "bisa", "tak", "jadi", "unknown", "di", "ke", "ini", "bagi", "resmi", "siap",
    "dapat", "akan", "dan", "atau", "yang", "untuk", "dalam", "dengan", "pada", "none", "dari",
];

#[derive(Debug, Error)]
pub enum AggregateError {
    /// The source sheet lacks a column this pipeline groups on. Non-fatal:
    /// the report layer downgrades it to a notice for that chart only.
    #[error("column {column} not found in dataset")]
    ColumnNotFound { column: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

fn require_columns(df: &DataFrame, dims: &[&str]) -> Result<(), AggregateError> {
    for dim in dims {
        if df.column(dim).is_err() {
            return Err(AggregateError::ColumnNotFound {
                column: (*dim).to_string(),
            });
        }
    }
    Ok(())
}

/// Counts rows per group along `dims`, with an optional exclusion predicate
/// applied first. Group order follows first appearance in the view.
pub fn grouped_counts(
    df: &DataFrame,
    dims: &[&str],
    exclusion: Option<Expr>,
) -> Result<DataFrame, AggregateError> {
    require_columns(df, dims)?;

    let mut frame = df.clone().lazy();
    if let Some(predicate) = exclusion {
        frame = frame.filter(predicate);
    }

    let keys: Vec<Expr> = dims.iter().map(|dim| col(*dim)).collect();
    let counts = frame
        .group_by_stable(keys)
        .agg([len().alias(schema::COUNT)])
        .collect()?;
    Ok(counts)
}

/// Keeps only the `n` categories of `dim` with the largest total counts,
/// preserving the finer-grained rows of the retained categories. Ties break
/// by first appearance (stable sort), and re-running the reduction on its
/// own output is a no-op.
pub fn retain_top_categories(
    counts: &DataFrame,
    dim: &str,
    n: usize,
) -> Result<DataFrame, AggregateError> {
    require_columns(counts, &[dim])?;

    let totals = counts
        .clone()
        .lazy()
        .group_by_stable([col(dim)])
        .agg([col(schema::COUNT).sum().alias("total")])
        .sort(
            ["total"],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(n as IdxSize)
        .collect()?;

    let retained: HashSet<String> = totals
        .column(dim)?
        .str()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect();

    let categories = counts.column(dim)?.str()?;
    let mask: BooleanChunked = categories
        .into_iter()
        .map(|value| value.is_some_and(|category| retained.contains(category)))
        .collect();

    Ok(counts.filter(&mask)?)
}

/// ISO week label (Monday start) for grouping, e.g. `2024-W02`.
pub fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Appends the derived `MINGGU` column; weeks with no rows never appear.
fn with_week_column(df: &DataFrame) -> Result<DataFrame, AggregateError> {
    let labels: Vec<Option<String>> = date_values(df)?
        .into_iter()
        .map(|date| date.map(week_label))
        .collect();
    let week_series = Series::new(
        schema::WEEK.into(),
        labels
            .iter()
            .map(|opt| opt.as_deref())
            .collect::<Vec<Option<&str>>>(),
    );

    let mut output = df.clone();
    output.hstack_mut(&mut [week_series.into()])?;
    Ok(output)
}

/// Heatmap feed: videos per (week, theme), limited to the ten busiest themes.
pub fn topic_trend(view: &FilteredView) -> Result<DataFrame, AggregateError> {
    let df = with_week_column(view.df())?;
    let counts = grouped_counts(&df, &[schema::WEEK, schema::THEME], None)?;
    retain_top_categories(&counts, schema::THEME, TOP_THEMES)
}

/// Scatter feed: mentions per (date, source), ten most-quoted sources,
/// with the `none` sentinel excluded before counting.
pub fn source_mentions(view: &FilteredView) -> Result<DataFrame, AggregateError> {
    let counts = grouped_counts(
        view.df(),
        &[schema::DATE, schema::ATTRIBUTION],
        Some(col(schema::ATTRIBUTION).neq(lit(schema::ATTRIBUTION_NONE))),
    )?;
    retain_top_categories(&counts, schema::ATTRIBUTION, TOP_SOURCES)
}

/// Pie feed: the full format category distribution, no top-N cut.
pub fn format_distribution(view: &FilteredView) -> Result<DataFrame, AggregateError> {
    grouped_counts(view.df(), &[schema::FORMAT], None)
}

/// Line feed: videos per (date, format).
pub fn daily_format(view: &FilteredView) -> Result<DataFrame, AggregateError> {
    grouped_counts(view.df(), &[schema::DATE, schema::FORMAT], None)
}

/// Sankey feed: (source, theme) pairs restricted to the intersection of the
/// top five sources and top ten themes.
pub fn source_theme(view: &FilteredView) -> Result<DataFrame, AggregateError> {
    let counts = grouped_counts(view.df(), &[schema::ATTRIBUTION, schema::THEME], None)?;
    let by_source = retain_top_categories(&counts, schema::ATTRIBUTION, TOP_RELATION_SOURCES)?;
    retain_top_categories(&by_source, schema::THEME, TOP_RELATION_THEMES)
}

/// Word-cloud feed: token counts over titles and attributions, stopwords
/// removed, capped at the fifty most frequent tokens.
pub fn word_frequencies(view: &FilteredView) -> Result<DataFrame, AggregateError> {
    let df = view.df();
    require_columns(df, &[schema::TITLE, schema::ATTRIBUTION])?;

    let stopwords: HashSet<&str> = STOPWORDS.iter().copied().collect();
    let mut order: Vec<String> = Vec::new();
    let mut tallies: HashMap<String, u32> = HashMap::new();

    let mut tally_column = |name: &str| -> Result<(), AggregateError> {
        for value in df.column(name)?.str()?.into_no_null_iter() {
            for token in value
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|token| token.chars().count() > 1)
                .filter(|token| !stopwords.contains(token))
            {
                match tallies.get_mut(token) {
                    Some(count) => *count += 1,
                    None => {
                        order.push(token.to_string());
                        tallies.insert(token.to_string(), 1);
                    }
                }
            }
        }
        Ok(())
    };

    tally_column(schema::TITLE)?;
    tally_column(schema::ATTRIBUTION)?;

    let mut ranked: Vec<(String, u32)> = order
        .into_iter()
        .map(|token| {
            let count = tallies[&token];
            (token, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_TOKENS);

    let tokens: Vec<&str> = ranked.iter().map(|(token, _)| token.as_str()).collect();
    let counts: Vec<u32> = ranked.iter().map(|(_, count)| *count).collect();

    Ok(DataFrame::new(vec![
        Series::new(schema::TOKEN.into(), tokens).into(),
        Series::new(schema::COUNT.into(), counts).into(),
    ])?)
}
