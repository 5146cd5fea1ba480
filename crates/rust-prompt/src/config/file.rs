//! File-based configuration loading.

use std::path::Path;

use super::ConfigOverrides;
use crate::error::{PromptError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl ConfigOverrides {
    /// Load overrides from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            PromptError::config(format!(
                "unsupported config file extension: {}",
                path.display()
            ))
        })?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            PromptError::io_context(format!("reading config file {}", path.display()), e)
        })?;
        tracing::debug!(path = %path.display(), ?format, "loading config file");
        Self::parse(&content, format)
    }

    /// Parse overrides from text in the given format.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| PromptError::config(e.to_string()))
            }
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| PromptError::config(e.to_string()))
            }
        }
    }
}
