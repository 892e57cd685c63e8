//! App configuration: window, input smoothing and hardware toggles wrapped
//! around a [`FieldConfig`].
//!
//! A TOML file only has to name what it changes. The file's `variant` picks
//! the base constants, then every key present in the file is laid over them:
//!
//! ```toml
//! variant = "clap"
//! smoothing = 0.2
//!
//! [field]
//! repulsion_strength = 9.0
//!
//! [field.palette]
//! open = "#FF8800"
//! ```

use std::fs;
use std::path::Path;

use dot_field::{FieldConfig, Variant};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title:       String,
    pub variant:     Variant,
    pub width:       usize,
    pub height:      usize,
    /// Per-frame hand smoothing factor, `current = lerp(current, target, smoothing)`.
    pub smoothing:   f32,
    /// Render mirrored (selfie view).
    pub mirror:      bool,
    /// Wait for a click before the field starts moving.
    pub start_gate:  bool,
    /// Draw hand bones over the field.
    pub skeleton:    bool,
    /// Read the level from the first MIDI input port.
    pub midi_level:  bool,
    /// Per-frame multiplier on the MIDI level between messages.
    pub level_decay: f32,
    /// Use a LeapMotion controller (needs the `leap` feature).
    pub leap:        bool,
    pub field:       FieldConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig::for_variant(Variant::default())
    }
}

impl AppConfig {
    pub fn for_variant(variant: Variant) -> Self {
        let (width, height) = variant.canvas_size();
        AppConfig {
            title:       format!("hand_dots: {}", variant.name()),
            variant,
            width,
            height,
            smoothing:   0.3,
            mirror:      variant.mirrored(),
            start_gate:  variant == Variant::Audio,
            skeleton:    variant.mirrored(),
            midi_level:  variant == Variant::Audio,
            level_decay: 0.92,
            leap:        false,
            field:       FieldConfig::for_variant(variant),
        }
    }

    /// Parse a TOML document over the defaults of the variant it names.
    pub fn from_toml_str(text: &str) -> Result<AppConfig, AppError> {
        let user: toml::Table = toml::from_str(text)?;
        let variant = match user.get("variant").and_then(toml::Value::as_str) {
            Some(name) => Variant::from_name(name)?,
            None => Variant::default(),
        };

        let mut merged = toml::Value::try_from(AppConfig::for_variant(variant))?;
        overlay(&mut merged, toml::Value::Table(user));
        let cfg: AppConfig = merged.try_into()?;
        cfg.field.validate()?;
        Ok(cfg)
    }

    /// Load from `path`; a missing file means defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig, AppError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("config {} not found, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        let text = fs::read_to_string(path)
            .map_err(|source| AppError::ConfigIo { path: path.to_path_buf(), source })?;
        let cfg = AppConfig::from_toml_str(&text)?;
        info!("loaded {} (variant {})", path.display(), cfg.variant.name());
        Ok(cfg)
    }
}

/// Recursively replace values in `base` with those present in `over`.
fn overlay(base: &mut toml::Value, over: toml::Value) {
    match (base, over) {
        (toml::Value::Table(b), toml::Value::Table(o)) => {
            for (key, value) in o {
                match b.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        b.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
