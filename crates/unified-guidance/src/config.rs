use std::path::{Path, PathBuf};

use unified_core::framework::{CisLevel, SelectedFrameworks};

use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Filesystem path to the JSON document holding the category mappings.
    pub mappings_path: String,
    /// CIS implementation group used when a tool call omits `frameworks`. `None` disables CIS.
    pub default_cis: Option<CisLevel>,
}

impl Config {
    /// Required:
    /// - `UNIFIED_MAPPINGS_PATH`: path to the category mappings JSON file
    ///
    /// Optional:
    /// - `UNIFIED_CIS_IG`: "ig1", "ig2" or "ig3" (default "ig3"); empty disables CIS
    pub fn from_env() -> Result<Self, AppError> {
        let mappings_path = std::env::var("UNIFIED_MAPPINGS_PATH").map_err(|_| {
            AppError::Config("UNIFIED_MAPPINGS_PATH environment variable is required".to_string())
        })?;

        let file = Path::new(&mappings_path);
        if !file.is_file() {
            return Err(AppError::Config(format!(
                "mappings file not found: {}",
                file.display()
            )));
        }

        let default_cis = match std::env::var("UNIFIED_CIS_IG") {
            Err(_) => Some(CisLevel::Ig3),
            Ok(raw) => parse_cis_level(&raw)?,
        };

        Ok(Self {
            mappings_path,
            default_cis,
        })
    }

    pub fn mappings_file_path(&self) -> PathBuf {
        Path::new(&self.mappings_path).to_path_buf()
    }

    /// Framework toggles applied to tool calls that do not pass their own.
    pub fn default_frameworks(&self) -> SelectedFrameworks {
        SelectedFrameworks::all(self.default_cis)
    }
}

fn parse_cis_level(raw: &str) -> Result<Option<CisLevel>, AppError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    CisLevel::parse(raw).map(Some).ok_or_else(|| {
        AppError::Config(format!(
            "UNIFIED_CIS_IG must be one of ig1, ig2, ig3 or empty, got '{raw}'"
        ))
    })
}
