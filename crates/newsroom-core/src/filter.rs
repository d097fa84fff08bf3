use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

use crate::loader::{days_since_epoch, Dataset};
use crate::schema;

/// Session filter inputs. Unset bounds default to the dataset's own span;
/// a blank keyword matches everything.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub keyword: Option<String>,
}

impl FilterParams {
    fn effective_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
    }
}

/// Derived, read-only subset of the dataset: rows inside the date range
/// whose title or theme contains the keyword, sorted date-descending.
/// Always rebuilt from the full record set, never patched in place.
#[derive(Debug, Clone)]
pub struct FilteredView {
    df: DataFrame,
    start: NaiveDate,
    end: NaiveDate,
    keyword: Option<String>,
    default_range: bool,
}

impl FilteredView {
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Resolved lower bound (after defaulting).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Resolved upper bound (after defaulting).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// True when the view covers the whole dataset with no keyword.
    pub fn is_unfiltered(&self) -> bool {
        self.default_range && self.keyword.is_none()
    }
}

fn date_lit(date: NaiveDate) -> Expr {
    lit(days_since_epoch(date)).cast(DataType::Date)
}

/// Builds the filtered view for one set of parameters.
pub fn apply(dataset: &Dataset, params: &FilterParams) -> Result<FilteredView, PolarsError> {
    let start = params.start.unwrap_or_else(|| dataset.min_date());
    let end = params.end.unwrap_or_else(|| dataset.max_date());
    let keyword = params.effective_keyword().map(str::to_string);

    let mut frame = dataset.df().clone().lazy().filter(
        col(schema::DATE)
            .gt_eq(date_lit(start))
            .and(col(schema::DATE).lt_eq(date_lit(end))),
    );

    if let Some(kw) = keyword.as_deref() {
        let needle = kw.to_lowercase();
        frame = frame.filter(
            col(schema::TITLE)
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(needle.clone()))
                .or(col(schema::THEME)
                    .str()
                    .to_lowercase()
                    .str()
                    .contains_literal(lit(needle))),
        );
    }

    let df = frame
        .sort(
            [schema::DATE],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    debug!(
        rows = df.height(),
        %start,
        %end,
        keyword = keyword.as_deref().unwrap_or(""),
        "filtered view rebuilt"
    );

    Ok(FilteredView {
        df,
        start,
        end,
        keyword,
        default_range: start == dataset.min_date() && end == dataset.max_date(),
    })
}
