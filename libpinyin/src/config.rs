//! Pinyin backend configuration that extends the engine `Config` from core.
//!
//! This configuration includes:
//! - All engine options from `libcompose_core::Config` (flattened via serde)
//! - The word table to load instead of the embedded demo table
//!
//! # Example
//!
//! ```rust
//! use libcompose_pinyin::PinyinConfig;
//!
//! let config = PinyinConfig::from_toml_str("handedness = \"Left\"\n").unwrap();
//! assert!(config.word_table.is_none());
//! let base_config = config.into_base();
//! // Hand base_config to ImeEngine::new()
//! ```

use anyhow::Context;
use libcompose_core::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PinyinConfig {
    /// Engine options
    #[serde(flatten)]
    pub base: Config,

    /// Word table file; relative paths resolve against the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_table: Option<PathBuf>,
}

impl PinyinConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a config file, resolving `word_table` against its directory.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;

        if let (Some(table), Some(dir)) = (config.word_table.as_mut(), path.parent()) {
            if table.is_relative() {
                *table = dir.join(&*table);
            }
        }
        Ok(config)
    }

    /// Convert this pinyin config into the engine config for `ImeEngine::new()`
    pub fn into_base(self) -> Config {
        self.base
    }

    /// Get a reference to the engine config
    pub fn base(&self) -> &Config {
        &self.base
    }

    /// Get a mutable reference to the engine config
    pub fn base_mut(&mut self) -> &mut Config {
        &mut self.base
    }
}
