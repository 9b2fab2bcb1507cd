//! Tokenizer configuration, loadable from TOML.
//!
//! ```toml
//! layout = "extended"
//! threads = 8
//! output_dir = "tokens"
//! format = "csv"
//! validate = true
//!
//! [validator]
//! strictness = "lenient"
//! max_time_gap = 45.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::FeatureLayout;
use crate::export::ExportFormat;
use crate::validate::ValidatorConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for a tokenization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Row layout.
    pub layout: FeatureLayout,
    /// Worker threads for batch runs; 1 or less runs sequentially.
    pub threads: usize,
    /// Directory receiving one output file per match.
    pub output_dir: PathBuf,
    /// Output file format.
    pub format: ExportFormat,
    /// Validate every tokenized match and log the summary.
    pub validate: bool,
    pub validator: ValidatorConfig,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            layout: FeatureLayout::Compact,
            threads: 4,
            output_dir: PathBuf::from("tokens"),
            format: ExportFormat::Csv,
            validate: false,
            validator: ValidatorConfig::default(),
        }
    }
}

impl TokenizerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Strictness;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(TokenizerConfig::from_toml("").unwrap(), TokenizerConfig::default());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let cfg = TokenizerConfig::from_toml(
            r#"
            layout = "extended"
            threads = 1
            format = "jsonl"

            [validator]
            strictness = "lenient"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.layout, FeatureLayout::Extended);
        assert_eq!(cfg.threads, 1);
        assert_eq!(cfg.format, ExportFormat::Jsonl);
        assert_eq!(cfg.validator.strictness, Strictness::Lenient);
        assert_eq!(cfg.validator.max_location_jump, 70.0);
        assert_eq!(cfg.output_dir, PathBuf::from("tokens"));
    }

    #[test]
    fn bad_layout_is_a_parse_error() {
        let err = TokenizerConfig::from_toml(r#"layout = "wide""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_round_trip() {
        let cfg = TokenizerConfig {
            validate: true,
            ..Default::default()
        };
        let text = cfg.to_toml().unwrap();
        assert_eq!(TokenizerConfig::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("touchline.toml");
        std::fs::write(&path, "threads = 2\n").unwrap();
        assert_eq!(TokenizerConfig::load(&path).unwrap().threads, 2);

        let missing = TokenizerConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
