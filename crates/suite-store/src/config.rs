//! # Suite Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SUITE_DATA_DIR, SUITE_OUTPUT_DIR,                                  │
//! │     SUITE_FETCH_TIMEOUT_SECS, SUITE_REMOTE_IMAGES                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/streamline-suite/suite.toml (Linux)                      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! data_dir = "/var/lib/streamline"
//!
//! [render]
//! output_dir = "./exports"
//! fetch_timeout_secs = 5
//! remote_images = true
//!
//! [documents]
//! default_vat_rate = 7.5
//! default_wht_rate = 5.0
//! default_markup_percent = 10.0
//! invoice_due_days = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

const CONFIG_FILE: &str = "suite.toml";

// =============================================================================
// Sections
// =============================================================================

/// Where persisted data lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding one JSON file per persisted key.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "streamline", "suite")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".streamline"))
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: default_data_dir(),
        }
    }
}

/// Export and asset behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Where exported PDFs are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Budget for each remote image fetch (seconds).
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Fetch `http(s)://` logos. Data URLs are always decoded.
    #[serde(default = "default_true")]
    pub remote_images: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_fetch_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            output_dir: default_output_dir(),
            fetch_timeout_secs: default_fetch_timeout(),
            remote_images: true,
        }
    }
}

/// Values pre-filled on new documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSettings {
    #[serde(default = "default_vat")]
    pub default_vat_rate: f64,

    #[serde(default = "default_wht")]
    pub default_wht_rate: f64,

    /// Used for quotation lines entered without a markup.
    #[serde(default = "default_markup")]
    pub default_markup_percent: f64,

    #[serde(default = "default_due_days")]
    pub invoice_due_days: u32,
}

fn default_vat() -> f64 {
    suite_core::DEFAULT_QUOTATION_VAT_RATE
}

fn default_wht() -> f64 {
    suite_core::DEFAULT_WHT_RATE
}

fn default_markup() -> f64 {
    suite_core::DEFAULT_MARKUP_PERCENT
}

fn default_due_days() -> u32 {
    suite_core::DEFAULT_DUE_DAYS
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            default_vat_rate: default_vat(),
            default_wht_rate: default_wht(),
            default_markup_percent: default_markup(),
            invoice_due_days: default_due_days(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub documents: DocumentSettings,
}

impl SuiteConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (suite.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.render.fetch_timeout_secs == 0 {
            return Err(StoreError::Config(
                "fetch_timeout_secs must be greater than 0".into(),
            ));
        }

        for (name, rate) in [
            ("default_vat_rate", self.documents.default_vat_rate),
            ("default_wht_rate", self.documents.default_wht_rate),
        ] {
            if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
                return Err(StoreError::Config(format!(
                    "{} must be between 0 and 100, got {}",
                    name, rate
                )));
            }
        }

        let markup = self.documents.default_markup_percent;
        if !markup.is_finite() || markup < 0.0 {
            return Err(StoreError::Config(format!(
                "default_markup_percent must be 0 or more, got {}",
                markup
            )));
        }

        Ok(())
    }

    /// Applies `SUITE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var("SUITE_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Some(dir) = var("SUITE_OUTPUT_DIR") {
            debug!(output_dir = %dir, "Overriding output dir from environment");
            self.render.output_dir = PathBuf::from(dir);
        }

        if let Some(secs) = var("SUITE_FETCH_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.render.fetch_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid SUITE_FETCH_TIMEOUT_SECS"),
            }
        }

        if let Some(flag) = var("SUITE_REMOTE_IMAGES") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.render.remote_images = true,
                "0" | "false" | "no" | "off" => self.render.remote_images = false,
                _ => warn!(value = %flag, "Ignoring invalid SUITE_REMOTE_IMAGES"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "streamline", "suite")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.render.fetch_timeout_secs)
    }
}
