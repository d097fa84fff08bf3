use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema;

/// Compound score at or above which a title is labeled positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below which a title is labeled negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Normalization constant of the lexicon scorer: `s / sqrt(s^2 + ALPHA)`.
const NORMALIZATION_ALPHA: f64 = 15.0;

const DEFAULT_LEXICON: &str = include_str!("default_lexicon.tsv");

static BUILTIN: Lazy<Lexicon> =
    Lazy::new(|| Lexicon::parse(DEFAULT_LEXICON).expect("built-in lexicon is well-formed"));

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lexicon line {line} is malformed: '{content}'")]
    InvalidLine { line: usize, content: String },

    #[error("lexicon contains no entries")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Label used in report tables, matching the sheet's Indonesian contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positif",
            Sentiment::Neutral => "Netral",
            Sentiment::Negative => "Negatif",
        }
    }

    /// Three-way threshold rule over a compound score in [-1, 1].
    pub fn from_compound(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token → valence map. Valences follow the VADER convention of roughly
/// [-4, 4]; the compound score normalizes their sum into [-1, 1].
#[derive(Debug, Clone)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
}

impl Lexicon {
    /// Parses `token<TAB>valence` lines. Blank lines and `#` comments are
    /// skipped; anything else malformed is fatal.
    pub fn parse(content: &str) -> Result<Self, LexiconError> {
        let mut valences = HashMap::new();

        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let invalid = || LexiconError::InvalidLine {
                line: idx + 1,
                content: raw_line.to_string(),
            };

            let mut parts = line.splitn(2, '\t');
            let token = parts.next().ok_or_else(invalid)?.trim();
            let valence: f64 = parts
                .next()
                .ok_or_else(invalid)?
                .trim()
                .parse()
                .map_err(|_| invalid())?;
            if token.is_empty() {
                return Err(invalid());
            }

            valences.insert(token.to_lowercase(), valence);
        }

        if valences.is_empty() {
            return Err(LexiconError::Empty);
        }

        Ok(Self { valences })
    }

    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The lexicon bundled with the crate (Indonesian newsroom vocabulary
    /// plus common English valence words).
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    fn valence(&self, token: &str) -> Option<f64> {
        self.valences.get(token).copied()
    }
}

/// Pure, stateless-per-call classifier over a loaded lexicon. Construction
/// fails if the lexicon cannot be obtained; classification itself is total.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn with_builtin_lexicon() -> Self {
        Self::new(Lexicon::builtin())
    }

    /// Compound polarity score in [-1, 1]. Empty or fully-unknown text
    /// scores exactly 0.0.
    pub fn compound_score(&self, text: &str) -> f64 {
        let sum: f64 = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .filter_map(|token| self.lexicon.valence(token))
            .sum();

        if sum == 0.0 {
            return 0.0;
        }
        let normalized = sum / (sum * sum + NORMALIZATION_ALPHA).sqrt();
        normalized.clamp(-1.0, 1.0)
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        Sentiment::from_compound(self.compound_score(text))
    }

    /// Labels every title in the frame; null titles classify as empty text.
    pub fn classify_titles(&self, df: &DataFrame) -> Result<Series, PolarsError> {
        let titles = df.column(schema::TITLE)?.str()?;
        let labels: Vec<&'static str> = titles
            .into_iter()
            .map(|title| self.classify(title.unwrap_or("")).as_str())
            .collect();
        Ok(Series::new(schema::SENTIMENT.into(), labels))
    }
}

/// Counts labels per sentiment class, in fixed Positive/Neutral/Negative
/// order, omitting classes with no rows.
pub fn sentiment_distribution(labels: &Series) -> Result<DataFrame, PolarsError> {
    let values = labels.str()?;
    let mut tallies: HashMap<&str, u32> = HashMap::new();
    for label in values.into_no_null_iter() {
        *tallies.entry(label).or_insert(0) += 1;
    }

    let mut classes: Vec<&str> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    for sentiment in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
        if let Some(&count) = tallies.get(sentiment.as_str()) {
            classes.push(sentiment.as_str());
            counts.push(count);
        }
    }

    DataFrame::new(vec![
        Series::new(schema::SENTIMENT.into(), classes).into(),
        Series::new(schema::COUNT.into(), counts).into(),
    ])
}
