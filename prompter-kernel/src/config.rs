//! Prompter configuration record and its sources.

use std::path::{Path, PathBuf};

use prompter_primitives::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

use crate::{PromptError, PromptResult};

/// Environment variable naming the completion cache directory.
pub const CACHE_DIR_ENV: &str = "PROMPTER_CACHE_DIR";
/// Environment variable holding the summarization start size.
pub const SUMMARY_START_ENV: &str = "PROMPTER_SUMMARY_START";
/// Environment variable holding the summarization include size.
pub const SUMMARY_INCLUDE_ENV: &str = "PROMPTER_SUMMARY_INCLUDE";
/// Environment variable holding the session tag.
pub const TAG_ENV: &str = "PROMPTER_TAG";

/// Sizes, in characters, that drive automatic summarization.
///
/// Once the conversation reaches `start_size`, the oldest messages totalling at
/// least `include_size` are replaced by a summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct SummaryThresholds {
    start_size: usize,
    include_size: usize,
}

impl SummaryThresholds {
    /// Validates and creates thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidThresholds`] unless
    /// `0 < include_size <= start_size`.
    pub fn new(start_size: usize, include_size: usize) -> ValidationResult<Self> {
        if include_size == 0 || include_size > start_size {
            return Err(ValidationError::InvalidThresholds {
                start_size,
                include_size,
            });
        }
        Ok(Self {
            start_size,
            include_size,
        })
    }

    /// Conversation length that triggers summarization.
    #[must_use]
    pub const fn start_size(self) -> usize {
        self.start_size
    }

    /// Length of the oldest messages folded into the summary.
    #[must_use]
    pub const fn include_size(self) -> usize {
        self.include_size
    }
}

#[derive(Deserialize)]
struct RawThresholds {
    start_size: usize,
    include_size: usize,
}

impl TryFrom<RawThresholds> for SummaryThresholds {
    type Error = ValidationError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Self::new(raw.start_size, raw.include_size)
    }
}

/// Declarative settings applied by [`PrompterBuilder::config`](crate::PrompterBuilder::config).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrompterConfig {
    /// Directory of the file-backed completion cache.
    pub cache_dir: Option<PathBuf>,
    /// Automatic summarization thresholds.
    pub summary: Option<SummaryThresholds>,
    /// Tag attached to logged messages.
    pub tag: Option<String>,
}

impl PrompterConfig {
    /// Reads `PROMPTER_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// See [`from_lookup`](Self::from_lookup).
    pub fn from_env() -> PromptResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    ///
    /// Summarization is enabled only when both size variables are set.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Config`] when a size is not an unsigned integer
    /// or only one of the two is set, and [`PromptError::Validation`] when the
    /// sizes are inconsistent.
    pub fn from_lookup<F>(lookup: F) -> PromptResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let size = |name: &str| -> PromptResult<Option<usize>> {
            non_empty(name)
                .map(|value| {
                    value.trim().parse::<usize>().map_err(|err| {
                        PromptError::config(format!("{name} must be an unsigned integer: {err}"))
                    })
                })
                .transpose()
        };

        let summary = match (size(SUMMARY_START_ENV)?, size(SUMMARY_INCLUDE_ENV)?) {
            (Some(start), Some(include)) => Some(SummaryThresholds::new(start, include)?),
            (None, None) => None,
            _ => {
                return Err(PromptError::config(format!(
                    "{SUMMARY_START_ENV} and {SUMMARY_INCLUDE_ENV} must be set together"
                )));
            }
        };

        Ok(Self {
            cache_dir: non_empty(CACHE_DIR_ENV).map(PathBuf::from),
            summary,
            tag: non_empty(TAG_ENV),
        })
    }

    /// Loads a JSON document such as
    /// `{"cache_dir": "completions", "summary": {"start_size": 8000, "include_size": 4000}}`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Io`] when the file cannot be read and
    /// [`PromptError::Config`] when it is not a valid configuration.
    pub async fn from_json_file(path: impl AsRef<Path>) -> PromptResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await?;
        serde_json::from_slice(&raw).map_err(|err| {
            PromptError::config(format!("failed to parse {}: {err}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn thresholds_require_include_within_start() {
        assert!(SummaryThresholds::new(100, 50).is_ok());
        assert!(SummaryThresholds::new(100, 100).is_ok());
        assert!(matches!(
            SummaryThresholds::new(100, 0),
            Err(ValidationError::InvalidThresholds { .. })
        ));
        assert!(SummaryThresholds::new(10, 11).is_err());
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = PrompterConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PrompterConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = PrompterConfig::from_lookup(lookup(&[
            (CACHE_DIR_ENV, "completions"),
            (SUMMARY_START_ENV, "800"),
            (SUMMARY_INCLUDE_ENV, " 400 "),
            (TAG_ENV, "demo"),
        ]))
        .unwrap();

        assert_eq!(config.cache_dir, Some(PathBuf::from("completions")));
        assert_eq!(config.summary, Some(SummaryThresholds::new(800, 400).unwrap()));
        assert_eq!(config.tag.as_deref(), Some("demo"));
    }

    #[test]
    fn rejects_half_configured_summary() {
        let err = PrompterConfig::from_lookup(lookup(&[(SUMMARY_START_ENV, "800")])).unwrap_err();
        assert!(matches!(err, PromptError::Config { .. }));

        let err = PrompterConfig::from_lookup(lookup(&[
            (SUMMARY_START_ENV, "many"),
            (SUMMARY_INCLUDE_ENV, "1"),
        ]))
        .unwrap_err();
        assert!(matches!(err, PromptError::Config { .. }));
    }

    #[tokio::test]
    async fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompter.json");
        std::fs::write(
            &path,
            r#"{"summary": {"start_size": 20, "include_size": 10}, "tag": "t"}"#,
        )
        .unwrap();

        let config = PrompterConfig::from_json_file(&path).await.unwrap();
        assert_eq!(config.summary.unwrap().start_size(), 20);
        assert_eq!(config.cache_dir, None);
    }

    #[tokio::test]
    async fn json_thresholds_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"summary": {"start_size": 5, "include_size": 10}}"#).unwrap();

        let err = PrompterConfig::from_json_file(&path).await.unwrap_err();
        assert!(matches!(err, PromptError::Config { .. }));
    }
}
