//! Lowering configuration, read from the `[target]` section of a TOML file.
//!
//! ```toml
//! [target]
//! triple = "x86_64-pc-windows-msvc"
//! pointer-width = 64
//! ```

use crate::platform::{PlatformDescriptor, PlatformError};
use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct LoweringConfig {
    #[serde(default)]
    pub target: TargetConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TargetConfig {
    /// Target triple; the host when absent.
    #[serde(default)]
    pub triple: Option<String>,

    /// Overrides the pointer width derived from the triple.
    #[serde(default)]
    pub pointer_width: Option<u8>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read configuration {path}")]
    #[diagnostic(code(tessera::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    #[diagnostic(
        code(tessera::config::parse),
        help("the configuration is a TOML file with an optional [target] table")
    )]
    Parse(#[from] toml::de::Error),

    #[error("pointer width {0} is not supported")]
    #[diagnostic(code(tessera::config::pointer_width), help("use 16, 32 or 64"))]
    PointerWidth(u8),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Platform(#[from] PlatformError),
}

impl LoweringConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Replaces the configured triple, e.g. from a command-line flag.
    pub fn with_triple(mut self, triple: Option<String>) -> Self {
        if triple.is_some() {
            self.target.triple = triple;
        }
        self
    }

    pub fn platform(&self) -> Result<PlatformDescriptor, ConfigError> {
        let mut platform = match &self.target.triple {
            Some(triple) => triple.parse::<PlatformDescriptor>()?,
            None => PlatformDescriptor::host()?,
        };
        if let Some(width) = self.target.pointer_width {
            if !matches!(width, 16 | 32 | 64) {
                return Err(ConfigError::PointerWidth(width));
            }
            platform.pointer_width = width;
        }
        Ok(platform)
    }
}
