//! # Application Configuration
//!
//! Optional YAML file read at startup. Every key has a default, so an empty
//! file (or no file) gives a working configuration:
//!
//! ```yaml
//! server:
//!   addr: "127.0.0.1:8080"
//!   static_dir: "static_site"
//! store:
//!   seed_samples: true
//! cors:
//!   enabled: true
//!   allowed_origins: ["*"]
//! metrics:
//!   enabled: true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub cors: CorsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Directory served for the browser UI; none disables static files.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Pre-populate the store with the six sample items.
    pub seed_samples: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed_samples: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid YAML for this shape.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse YAML text; an empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails when the text is not valid YAML for this shape.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load `path` when given, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
