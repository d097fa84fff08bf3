pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod report;
pub mod schema;
pub mod sentiment;

pub use config::{DashboardConfig, LoaderConfig};
pub use error::{DashboardError, Result};
pub use filter::{FilterParams, FilteredView};
pub use loader::{load_dataset, load_dataset_from_path, Dataset, LoadError};
pub use report::{build_report, ChartOutcome, DashboardReport, FilterSummary, ReportBody};
pub use sentiment::{Lexicon, LexiconError, Sentiment, SentimentAnalyzer};
