//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (handled by clap `env`, arrives as a CLI value)
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::decoder::DecoderKind;
use crate::pipeline::DEFAULT_BLOCK_FRAMES;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Contents of a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub symphonia_out: Option<PathBuf>,
    pub lewton_out: Option<PathBuf>,
    pub block_frames: Option<usize>,
    pub decoders: Option<Vec<DecoderKind>>,
}

impl FileConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symphonia_out: Option<PathBuf>,
    pub lewton_out: Option<PathBuf>,
    pub block_frames: Option<usize>,
    /// Empty means "not given"
    pub decoders: Vec<DecoderKind>,
}

/// Fully resolved settings for one program run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input: PathBuf,
    pub symphonia_out: PathBuf,
    pub lewton_out: PathBuf,
    pub block_frames: usize,
    pub decoders: Vec<DecoderKind>,
}

impl Config {
    /// Merge overrides over the optional file config over defaults, then validate.
    pub fn resolve(input: PathBuf, overrides: Overrides, file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let decoders = if !overrides.decoders.is_empty() {
            overrides.decoders
        } else {
            file.decoders.unwrap_or_else(|| DecoderKind::ALL.to_vec())
        };

        let config = Self {
            input,
            symphonia_out: overrides
                .symphonia_out
                .or(file.symphonia_out)
                .unwrap_or_else(|| PathBuf::from(DecoderKind::Symphonia.default_output())),
            lewton_out: overrides
                .lewton_out
                .or(file.lewton_out)
                .unwrap_or_else(|| PathBuf::from(DecoderKind::Lewton.default_output())),
            block_frames: overrides
                .block_frames
                .or(file.block_frames)
                .unwrap_or(DEFAULT_BLOCK_FRAMES),
            decoders,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn output_for(&self, kind: DecoderKind) -> &Path {
        match kind {
            DecoderKind::Symphonia => &self.symphonia_out,
            DecoderKind::Lewton => &self.lewton_out,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.block_frames == 0 {
            return Err(Error::Config("block_frames must be greater than 0".to_string()));
        }
        if self.decoders.is_empty() {
            return Err(Error::Config("at least one decoder must be selected".to_string()));
        }
        for (i, kind) in self.decoders.iter().enumerate() {
            if self.decoders[..i].contains(kind) {
                return Err(Error::Config(format!("decoder {} selected twice", kind)));
            }
        }
        if self.decoders.len() > 1 && self.symphonia_out == self.lewton_out {
            return Err(Error::Config(format!(
                "both decoders would write to {}",
                self.symphonia_out.display()
            )));
        }
        Ok(())
    }
}

/// Per-user config file location, if one exists
fn default_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("oggcmp").join("config.toml");
    path.exists().then_some(path)
}

/// Load the explicit config file, or the per-user one when present.
///
/// An explicit path that cannot be read is an error; a missing per-user file is not.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_file() {
            Some(path) => path,
            None => return Ok(None),
        },
    };

    debug!("Loading configuration from {}", path.display());
    FileConfig::load(&path).map(Some)
}
