use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::importer::ImportOptions;
use crate::normalizer::{currency_code, DEFAULT_CURRENCY};

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const ENV_STORE: &str = "PORTFOLIO_STORE";
pub const ENV_DEFAULT_CURRENCY: &str = "PORTFOLIO_DEFAULT_CURRENCY";
pub const ENV_PARALLEL_THRESHOLD: &str = "PORTFOLIO_PARALLEL_THRESHOLD";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

const FILE_DEFAULT_CURRENCY: &str = "default_currency";

/// Runtime settings
///
/// Resolved in layers: defaults, optional JSON settings file, `.env`,
/// environment variables. Command-line flags are applied by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store_path: PathBuf,
    pub default_currency: String,
    pub parallel_threshold: usize,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("portfolio-store.json"),
            default_currency: DEFAULT_CURRENCY.to_string(),
            parallel_threshold: ImportOptions::default().parallel_threshold,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        dotenvy::dotenv().ok();
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Self =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.default_currency =
            checked_currency(FILE_DEFAULT_CURRENCY, &settings.default_currency)?;
        Ok(settings)
    }

    /// Apply overrides from a variable lookup such as `std::env::var`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = lookup(ENV_STORE) {
            self.store_path = PathBuf::from(path);
        }
        if let Some(currency) = lookup(ENV_DEFAULT_CURRENCY) {
            self.default_currency = checked_currency(ENV_DEFAULT_CURRENCY, &currency)?;
        }
        if let Some(threshold) = lookup(ENV_PARALLEL_THRESHOLD) {
            self.parallel_threshold = threshold.trim().parse().map_err(|_| {
                ConfigError::InvalidThreshold {
                    name: ENV_PARALLEL_THRESHOLD,
                    value: threshold.clone(),
                }
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level.trim().to_ascii_lowercase();
        }
        Ok(())
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            default_currency: self.default_currency.clone(),
            parallel_threshold: self.parallel_threshold,
        }
    }
}

fn checked_currency(name: &'static str, value: &str) -> Result<String> {
    currency_code(value).ok_or_else(|| ConfigError::InvalidCurrency {
        name,
        value: value.to_string(),
    })
}
