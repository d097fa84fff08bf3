use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DashboardError, Result};

pub const DEFAULT_COLUMN_PREFIX: &str = "data_";

/// Loader settings passed in explicitly at construction; there is no
/// process-global client or credential state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix stripped from every header before canonical matching.
    pub column_prefix: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            column_prefix: DEFAULT_COLUMN_PREFIX.to_string(),
        }
    }
}

/// Session configuration, optionally read from a TOML file. CLI flags
/// override anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path to the exported video metadata CSV.
    pub dataset: Option<PathBuf>,
    /// Path to a lexicon file; the built-in lexicon is used when unset.
    pub lexicon: Option<PathBuf>,
    pub loader: LoaderConfig,
}

impl DashboardConfig {
    pub fn from_toml_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            DashboardError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_strip_data_prefix() {
        let config = DashboardConfig::default();
        assert_eq!(config.loader.column_prefix, "data_");
        assert!(config.dataset.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let config: DashboardConfig = toml::from_str(
            r#"
            dataset = "videos.csv"

            [loader]
            column_prefix = ""
            "#,
        )
        .expect("valid config");
        assert_eq!(config.dataset.as_deref(), Some(Path::new("videos.csv")));
        assert_eq!(config.loader.column_prefix, "");
        assert!(config.lexicon.is_none());
    }
}
