//! Painting engine configuration.
//!
//! All tunable constants live here so a deployment can adjust them from a
//! JSON file instead of a rebuild.

use crate::brush::BrushSettings;
use crate::color::Rgba;
use crate::magnifier::MagnifierConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Canvas and brush configuration for a painting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Base color both buffers reset to.
    pub base_color: Rgba,
    /// Brush parameters.
    pub brush: BrushSettings,
    /// Hover circle radius in texels, independent of the brush radius.
    pub hover_radius: i32,
    /// Hover circle color.
    pub hover_color: Rgba,
    /// Undo checkpoints kept before the oldest is dropped.
    pub undo_depth: usize,
    /// Magnifier tuning.
    pub magnifier: MagnifierConfig,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
            base_color: Rgba::WHITE,
            brush: BrushSettings::default(),
            hover_radius: 12,
            hover_color: Rgba::HOVER_GRAY,
            undo_depth: 5,
            magnifier: MagnifierConfig::default(),
        }
    }
}

impl PaintConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
