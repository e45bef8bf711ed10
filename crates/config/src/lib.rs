//! Inspector configuration structures to map the inspect.toml configuration.

#![deny(missing_docs)]

mod loader;

use std::{fmt, path::Path, str::FromStr};

use serde::Deserialize;

/// Main configuration structure for the inspector.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// What kind of payload the input holds.
    #[serde(default)]
    pub input: InputConfig,
    /// Handling of streamed chunk payloads.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Handling of text-to-image payloads.
    #[serde(default)]
    pub image: ImageConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Returns warnings about settings that have no effect.
    pub fn warnings(&self) -> Vec<String> {
        loader::validate_settings(self)
    }
}

/// Input settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Record type every payload is validated as.
    pub kind: PayloadKind,
}

/// The record type a payload is validated as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    /// One complete, non-streamed completion.
    #[default]
    Completion,
    /// One streamed chunk per input line.
    Chunk,
    /// One text-to-image response.
    Image,
}

impl AsRef<str> for PayloadKind {
    fn as_ref(&self) -> &str {
        match self {
            PayloadKind::Completion => "completion",
            PayloadKind::Chunk => "chunk",
            PayloadKind::Image => "image",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl FromStr for PayloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completion" => Ok(Self::Completion),
            "chunk" => Ok(Self::Chunk),
            "image" => Ok(Self::Image),
            other => Err(format!(
                "unknown payload kind '{other}', expected one of: completion, chunk, image"
            )),
        }
    }
}

/// Streamed chunk settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Fold the validated chunks into a single completion.
    pub assemble: bool,
    /// Abort when a chunk belongs to a different response than the first one.
    /// When false, such chunks are skipped with a warning.
    pub require_same_response: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            assemble: true,
            require_same_response: true,
        }
    }
}

/// Text-to-image settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// Decode the base64 image payloads and report their sizes.
    pub decode: bool,
}
