//! Configuration loaded from `~/.config/entmark/config.toml`.
//!
//! ```toml
//! [tagger]
//! backend = "http"            # or "command"
//! model = "en_core_web_lg"
//! endpoint = "http://127.0.0.1:8080"
//! command = "python3"
//! args = ["tagger.py"]
//! timeout_secs = 30
//!
//! [patterns]
//! enabled = true
//! extra = { ZIP = '\b\d{5}\b' }
//!
//! [render]
//! marker_style = "class"      # or "inline"
//! escape = "verbatim"         # or "escape"
//!
//! [batch]
//! preview_chars = 100
//! ```
//!
//! Every key is optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::highlight::{EscapePolicy, Highlighter, MarkerStyle};
use crate::patterns::PatternSet;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "en_core_web_lg";

/// Which transport reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggerBackend {
    #[default]
    Http,
    Command,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    pub backend: TaggerBackend,
    /// Model identifier reported by the health probe.
    pub model: String,
    /// Base URL of the model server (`http` backend).
    pub endpoint: String,
    /// Model program (`command` backend).
    pub command: String,
    pub args: Vec<String>,
    /// Per-call limit for the tagger.
    pub timeout_secs: u64,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            backend: TaggerBackend::Http,
            model: DEFAULT_MODEL.to_string(),
            endpoint: "http://127.0.0.1:8080".to_string(),
            command: "python3".to_string(),
            args: Vec::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    pub enabled: bool,
    /// Additional `NAME = "regex"` patterns, appended after the built-ins.
    pub extra: BTreeMap<String, String>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub marker_style: MarkerStyle,
    pub escape: EscapePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Characters of each input echoed back in batch results.
    pub preview_chars: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { preview_chars: 100 }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tagger: TaggerConfig,
    pub patterns: PatternsConfig,
    pub render: RenderConfig,
    pub batch: BatchConfig,
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; an explicitly given
    /// path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Compile the configured patterns, or `None` when extraction is off.
    pub fn pattern_set(&self) -> crate::Result<Option<PatternSet>> {
        if !self.patterns.enabled {
            return Ok(None);
        }

        let mut set = PatternSet::builtin();
        for (name, expr) in &self.patterns.extra {
            set.insert(name.clone(), expr)?;
        }
        Ok(Some(set))
    }

    pub fn highlighter(&self) -> Highlighter {
        Highlighter::new(self.render.marker_style, self.render.escape)
    }
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("entmark")
        .join("config.toml")
}
