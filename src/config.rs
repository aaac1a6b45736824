//! Configuration persistence for table-annotator settings

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ShapeColor {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Convert to RGBA bytes (0-255), fully opaque
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ]
    }

    /// `#rrggbb` form for textual output
    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.to_rgba_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Base URL of the segmentation/OCR backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Timeout for a single backend request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Degrees turned by the `r` shortcut
    #[serde(default = "default_rotation_step")]
    pub rotation_step: f32,
    /// Degrees turned by Ctrl+`r`, for deskewing
    #[serde(default = "default_fine_rotation_step")]
    pub fine_rotation_step: f32,
    #[serde(default = "default_outline_color")]
    pub outline_color: ShapeColor,
    #[serde(default = "default_selected_outline_color")]
    pub selected_outline_color: ShapeColor,
    #[serde(default = "default_knob_color")]
    pub knob_color: ShapeColor,
    #[serde(default = "default_selected_knob_color")]
    pub selected_knob_color: ShapeColor,
    /// Status indicator of cells with a human transcription
    #[serde(default = "default_corrected_color")]
    pub corrected_color: ShapeColor,
    /// Status indicator of cells still waiting for review
    #[serde(default = "default_pending_color")]
    pub pending_color: ShapeColor,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_rotation_step() -> f32 {
    90.0
}

fn default_fine_rotation_step() -> f32 {
    0.5
}

fn default_outline_color() -> ShapeColor {
    ShapeColor::rgb(0.1, 0.4, 0.9)
}

fn default_selected_outline_color() -> ShapeColor {
    ShapeColor::rgb(0.9, 0.1, 0.1)
}

fn default_knob_color() -> ShapeColor {
    ShapeColor::rgb(0.2, 0.2, 0.2)
}

fn default_selected_knob_color() -> ShapeColor {
    ShapeColor::rgb(0.9, 0.5, 0.0)
}

fn default_corrected_color() -> ShapeColor {
    ShapeColor::rgb(0.1, 0.7, 0.2) // Green
}

fn default_pending_color() -> ShapeColor {
    ShapeColor::rgb(1.0, 0.85, 0.0) // Yellow
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            rotation_step: default_rotation_step(),
            fine_rotation_step: default_fine_rotation_step(),
            outline_color: default_outline_color(),
            selected_outline_color: default_selected_outline_color(),
            knob_color: default_knob_color(),
            selected_knob_color: default_selected_knob_color(),
            corrected_color: default_corrected_color(),
            pending_color: default_pending_color(),
        }
    }
}

impl AnnotatorConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "table-annotator";

    /// Default location of the config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("No config directory on this platform, not saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {err:#}");
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
    }
}
