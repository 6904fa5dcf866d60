//! Configuration loading
//!
//! `defaults/post.default.toml` is embedded into the crate and always loaded
//! first. A user TOML file and command-line settings are layered on top by
//! [`Loader`], and the result is validated before the updaters see it.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../../defaults/post.default.toml");

/// Top-level configuration consumed by the updaters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostConfig {
    pub footnotes: FootnoteConfig,
    pub toc: TocConfig,
}

/// Markers delimiting the footnote block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FootnoteConfig {
    pub open_marker: String,
    pub close_marker: String,
}

impl Default for FootnoteConfig {
    fn default() -> Self {
        Self {
            open_marker: r#"<div class="footnote">"#.to_string(),
            close_marker: "</div>".to_string(),
        }
    }
}

/// Table of contents marker and the headlines that feed it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TocConfig {
    pub marker: String,
    pub headline_levels: Vec<u8>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            marker: "p(toc).".to_string(),
            headline_levels: vec![3],
        }
    }
}

impl PostConfig {
    /// Reject settings that would make the updaters misread a post.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let markers = [
            ("footnotes.open_marker", &self.footnotes.open_marker),
            ("footnotes.close_marker", &self.footnotes.close_marker),
            ("toc.marker", &self.toc.marker),
        ];
        for (key, marker) in markers {
            if marker.trim().is_empty() {
                return Err(ConfigError::Message(format!("{key} must not be empty")));
            }
        }
        if self.footnotes.open_marker == self.footnotes.close_marker {
            return Err(ConfigError::Message(
                "footnotes.open_marker and footnotes.close_marker must differ".to_string(),
            ));
        }
        if let Some(level) = self
            .toc
            .headline_levels
            .iter()
            .find(|level| !(1u8..=6).contains(*level))
        {
            return Err(ConfigError::Message(format!(
                "toc.headline_levels: h{level} is not a headline level"
            )));
        }
        Ok(())
    }
}

/// Builds a [`PostConfig`] from the embedded defaults, user TOML files and
/// command-line settings. Files layer in the order added; settings win over
/// every file.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML file over what is loaded so far; the file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml));
        self
    }

    /// List only these headline levels in the table of contents.
    pub fn headline_levels(self, levels: &[u8]) -> Result<Self, ConfigError> {
        let levels: Vec<i64> = levels.iter().map(|&level| i64::from(level)).collect();
        self.set("toc.headline_levels", levels)
    }

    /// Use `marker` to find the table of contents paragraph.
    pub fn toc_marker(self, marker: &str) -> Result<Self, ConfigError> {
        self.set("toc.marker", marker)
    }

    fn set(mut self, key: &str, value: impl Into<ValueKind>) -> Result<Self, ConfigError> {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Deserialize and validate the layered configuration.
    pub fn build(self) -> Result<PostConfig, ConfigError> {
        let config: PostConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<PostConfig, ConfigError> {
    Loader::new().build()
}
