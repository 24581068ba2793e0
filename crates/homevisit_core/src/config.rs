//! Caseload configuration: where the three tables and the logs live.
//!
//! # Responsibility
//! - Provide defaults matching the spreadsheet file names users already have.
//! - Layer a JSON config file and environment overrides on top of defaults.
//!
//! # Invariants
//! - Relative table paths resolve against `data_dir`; absolute paths are kept.
//! - Unknown JSON keys are rejected.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "HOMEVISIT_DATA_DIR";

const DEFAULT_CHILDREN_FILE: &str = "children.csv";
const DEFAULT_VISIT_LOG_FILE: &str = "nurse_log.csv";
const DEFAULT_NOTES_FILE: &str = "notes.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaseloadConfig {
    pub data_dir: PathBuf,
    pub children_file: PathBuf,
    pub visit_log_file: PathBuf,
    pub notes_file: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CaseloadConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            children_file: PathBuf::from(DEFAULT_CHILDREN_FILE),
            visit_log_file: PathBuf::from(DEFAULT_VISIT_LOG_FILE),
            notes_file: PathBuf::from(DEFAULT_NOTES_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl CaseloadConfig {
    /// Reads a JSON config file; missing keys take default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `HOMEVISIT_DATA_DIR` when set to a non-blank value.
    pub fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(DATA_DIR_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.data_dir = PathBuf::from(trimmed);
            }
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn children_path(&self) -> PathBuf {
        self.data_dir.join(&self.children_file)
    }

    pub fn visit_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.visit_log_file)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(&self.notes_file)
    }
}
