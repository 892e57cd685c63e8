//! Field configuration and the named sketch variants.
//!
//! Every constant the update step reads lives in [`FieldConfig`]. The
//! variants are just different `FieldConfig` values; there is no per-variant
//! code path beyond the switches declared here.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::ConfigError;
use crate::gesture::{GestureScheme, Palette};

// ════════════════════════════════════════════════════════════════════════════
// Switches
// ════════════════════════════════════════════════════════════════════════════

/// How origins are laid out on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// `floor(W/s) × floor(H/s)` points with symmetric margins.
    Lattice,
    /// Fixed `cols × rows`, indices spread over `[2s, W-2s] × [2s, H-2s]`.
    Legacy { cols: usize, rows: usize },
    /// `count` points uniform over the canvas.
    Scatter { count: usize },
}

/// What drives a particle's diameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sizing {
    /// Displacement from origin: at rest = max, pushed away = smaller.
    #[default]
    Displacement,
    /// Distance to the nearest influence point, dot itself does not move.
    Proximity,
    /// Displacement, with the maximum scaled by the nearest hand's finger count.
    FingerCount,
}

/// How particle color evolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Always the palette default.
    Fixed,
    /// Ease toward the nearest hand's gesture color.
    #[default]
    Gesture,
    /// Discrete radial wipes between palette colors.
    Wipe,
}

// ════════════════════════════════════════════════════════════════════════════
// Sub-configs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShockwaveConfig {
    pub enabled:  bool,
    /// Strength assigned on trigger.
    pub strength: f32,
    /// Falloff radius in pixels.
    pub radius:   f32,
    /// Per-frame multiplier.
    pub decay:    f32,
    /// Below this the event is cleared.
    pub epsilon:  f32,
}

impl Default for ShockwaveConfig {
    fn default() -> Self {
        ShockwaveConfig {
            enabled:  false,
            strength: 30.0,
            radius:   800.0,
            decay:    0.9,
            epsilon:  0.1,
        }
    }
}

/// Two-hand clap detection thresholds (pixels).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClapConfig {
    pub clap_distance:   f32,
    pub unclap_distance: f32,
}

impl Default for ClapConfig {
    fn default() -> Self {
        ClapConfig { clap_distance: 80.0, unclap_distance: 160.0 }
    }
}

/// Runtime spawn/destroy of individual particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorConfig {
    pub enabled:           bool,
    /// Frames between spawns while a hand points.
    pub spawn_interval:    u64,
    /// Hard cap on particle count.
    pub max_particles:     usize,
    /// Particles closer than this to a fist are destroyed.
    pub black_hole_radius: f32,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        CreatorConfig {
            enabled:           false,
            spawn_interval:    3,
            max_particles:     4000,
            black_hole_radius: 40.0,
        }
    }
}

/// Level-reactive influence radius.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub enabled:        bool,
    pub min_radius:     f32,
    pub max_radius:     f32,
    /// Frames between forced pulses; 0 disables pulsing.
    pub pulse_interval: u64,
    /// Length of a pulse in frames.
    pub pulse_frames:   u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            enabled:        false,
            min_radius:     60.0,
            max_radius:     320.0,
            pulse_interval: 0,
            pulse_frames:   12,
        }
    }
}

/// Staggered color wipe timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WipeConfig {
    /// Frames of delay per pixel of distance from canvas center.
    pub stagger: f32,
    /// Progress added per frame once a particle's wipe starts.
    pub step:    f32,
}

impl Default for WipeConfig {
    fn default() -> Self {
        WipeConfig { stagger: 0.08, step: 0.05 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FieldConfig
// ════════════════════════════════════════════════════════════════════════════

/// Every constant the field reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub layout:             Layout,
    pub spacing:            f32,
    pub seed:               u64,

    // ── dynamics ─────────────────────────────────────────────────────────
    pub spring_stiffness:   f32,
    pub damping:            f32,
    pub influence_radius:   f32,
    pub repulsion_strength: f32,
    /// Magnitude of the per-frame noise push.
    pub drift:              f32,
    /// Spatial frequency of the drift noise (per pixel).
    pub noise_scale:        f32,
    /// Temporal frequency of the drift noise (per frame).
    pub noise_speed:        f32,

    // ── look ─────────────────────────────────────────────────────────────
    pub min_diameter:       f32,
    pub max_diameter:       f32,
    /// Amplitude (pixels) of the sinusoidal breathing; 0 disables it.
    pub breathing:          f32,
    pub sizing:             Sizing,
    pub color_mode:         ColorMode,
    /// Per-frame exponential interpolation factor toward the target color.
    pub color_lerp:         f32,
    /// Fade particles in only near an influence point.
    pub reveal:             bool,
    pub gesture_scheme:     GestureScheme,
    pub palette:            Palette,
    pub background:         Rgba,

    // ── extras ───────────────────────────────────────────────────────────
    pub shockwave:          ShockwaveConfig,
    pub clap:               ClapConfig,
    pub creator:            CreatorConfig,
    pub level:              LevelConfig,
    pub wipe:               WipeConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            layout:             Layout::Lattice,
            spacing:            30.0,
            seed:               0,
            spring_stiffness:   0.05,
            damping:            0.85,
            influence_radius:   150.0,
            repulsion_strength: 6.0,
            drift:              0.0,
            noise_scale:        0.005,
            noise_speed:        0.005,
            min_diameter:       2.0,
            max_diameter:       20.0,
            breathing:          0.0,
            sizing:             Sizing::Displacement,
            color_mode:         ColorMode::Gesture,
            color_lerp:         0.1,
            reveal:             false,
            gesture_scheme:     GestureScheme::Shapes,
            palette:            Palette::default(),
            background:         Rgba::gray(240.0),
            shockwave:          ShockwaveConfig::default(),
            clap:               ClapConfig::default(),
            creator:            CreatorConfig::default(),
            level:              LevelConfig::default(),
            wipe:               WipeConfig::default(),
        }
    }
}

impl FieldConfig {
    /// Check that the numbers describe a field that settles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("spacing", self.spacing)?;
        positive("influence_radius", self.influence_radius)?;
        positive("max_diameter", self.max_diameter)?;
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::Damping(self.damping));
        }
        // v' = d (v - k x), x' = x + v' is stable only for 0 < k < 2 (1 + d) / d
        let max_k = 2.0 * (1.0 + self.damping) / self.damping;
        if !(self.spring_stiffness > 0.0 && self.spring_stiffness < max_k) {
            return Err(ConfigError::Stiffness { value: self.spring_stiffness, max: max_k });
        }
        if self.min_diameter > self.max_diameter || self.min_diameter < 0.0 {
            return Err(ConfigError::DiameterBand { min: self.min_diameter, max: self.max_diameter });
        }
        fraction("color_lerp", self.color_lerp)?;
        fraction("wipe.step", self.wipe.step)?;
        if self.shockwave.enabled {
            positive("shockwave.radius", self.shockwave.radius)?;
            if !(self.shockwave.decay > 0.0 && self.shockwave.decay < 1.0) {
                return Err(ConfigError::Decay(self.shockwave.decay));
            }
        }
        if self.level.enabled {
            positive("level.min_radius", self.level.min_radius)?;
            positive("level.max_radius", self.level.max_radius)?;
            if self.level.min_radius > self.level.max_radius {
                return Err(ConfigError::NonPositive {
                    name:  "level.max_radius - level.min_radius",
                    value: self.level.max_radius - self.level.min_radius,
                });
            }
        }
        if let Layout::Legacy { cols, rows } = self.layout {
            positive("layout.cols", cols as f32)?;
            positive("layout.rows", rows as f32)?;
        }
        Ok(())
    }

    /// Constants for one of the named sketches.
    pub fn for_variant(variant: Variant) -> FieldConfig {
        // The interactive sketches all drift a little.
        let base = FieldConfig { drift: 0.05, ..FieldConfig::default() };
        match variant {
            Variant::Classic => FieldConfig {
                layout:     Layout::Legacy { cols: 20, rows: 20 },
                spacing:    30.0,
                sizing:     Sizing::Proximity,
                color_mode: ColorMode::Fixed,
                drift:      0.0,
                ..base
            },
            Variant::Spring => FieldConfig {
                breathing: 1.5,
                ..base
            },
            Variant::Gesture => FieldConfig {
                background: Rgba::gray(12.0),
                ..base
            },
            Variant::Audio => FieldConfig {
                background: Rgba::gray(12.0),
                level: LevelConfig {
                    enabled:        true,
                    pulse_interval: 240,
                    ..LevelConfig::default()
                },
                ..base
            },
            Variant::Clap => FieldConfig {
                background: Rgba::gray(12.0),
                shockwave:  ShockwaveConfig { enabled: true, ..ShockwaveConfig::default() },
                ..base
            },
            Variant::Creator => FieldConfig {
                layout:     Layout::Scatter { count: 2000 },
                background: Rgba::gray(8.0),
                creator:    CreatorConfig { enabled: true, ..CreatorConfig::default() },
                ..base
            },
            Variant::Reveal => FieldConfig {
                reveal:     true,
                background: Rgba::BLACK,
                ..base
            },
            Variant::Wipe => FieldConfig {
                color_mode: ColorMode::Wipe,
                background: Rgba::gray(20.0),
                ..base
            },
            Variant::Fingers => FieldConfig {
                sizing:         Sizing::FingerCount,
                gesture_scheme: GestureScheme::FingerCount,
                background:     Rgba::gray(12.0),
                ..base
            },
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 { Ok(()) } else { Err(ConfigError::NonPositive { name, value }) }
}

fn fraction(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 { Ok(()) } else { Err(ConfigError::Fraction { name, value }) }
}

// ════════════════════════════════════════════════════════════════════════════
// Variant
// ════════════════════════════════════════════════════════════════════════════

/// The named sketches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Fixed 20×20 grid sized by pointer proximity.
    Classic,
    /// Spring-damper lattice with breathing.
    Spring,
    /// Hand poses scale forces and tint dots.
    #[default]
    Gesture,
    /// Level-reactive radius with periodic pulses.
    Audio,
    /// Two-hand clap fires a shockwave.
    Clap,
    /// Pointing spawns, fist destroys.
    Creator,
    /// Dots only visible near a hand.
    Reveal,
    /// Staggered radial color wipes.
    Wipe,
    /// Finger count scales dot size.
    Fingers,
}

impl Variant {
    pub fn all() -> [Variant; 9] {
        [
            Variant::Classic, Variant::Spring, Variant::Gesture,
            Variant::Audio,   Variant::Clap,   Variant::Creator,
            Variant::Reveal,  Variant::Wipe,   Variant::Fingers,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Spring  => "spring",
            Variant::Gesture => "gesture",
            Variant::Audio   => "audio",
            Variant::Clap    => "clap",
            Variant::Creator => "creator",
            Variant::Reveal  => "reveal",
            Variant::Wipe    => "wipe",
            Variant::Fingers => "fingers",
        }
    }

    pub fn from_name(name: &str) -> Result<Variant, ConfigError> {
        Variant::all()
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownVariant(name.to_string()))
    }

    /// Canvas size the sketch opens with.
    pub fn canvas_size(&self) -> (usize, usize) {
        match self {
            // 20 columns × 30px plus a 50px margin each side.
            Variant::Classic => (20 * 30 + 100, 20 * 30 + 100),
            _ => (960, 640),
        }
    }

    /// Sketches driven by a camera-like hand source draw mirrored.
    pub fn mirrored(&self) -> bool {
        !matches!(self, Variant::Classic | Variant::Spring)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_validates() {
        for v in Variant::all() {
            FieldConfig::for_variant(v)
                .validate()
                .unwrap_or_else(|e| panic!("{} invalid: {}", v.name(), e));
        }
    }

    #[test]
    fn undamped_field_rejected() {
        let cfg = FieldConfig { damping: 1.0, ..FieldConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::Damping(1.0)));
    }

    #[test]
    fn stiffness_outside_stable_band_rejected() {
        for k in [0.0, -0.1, 5.0] {
            let cfg = FieldConfig { spring_stiffness: k, ..FieldConfig::default() };
            assert!(matches!(cfg.validate(), Err(ConfigError::Stiffness { .. })), "k = {}", k);
        }
        // d = 0.85 puts the bound near 4.35
        let stiff = FieldConfig { spring_stiffness: 4.3, ..FieldConfig::default() };
        assert_eq!(stiff.validate(), Ok(()));
    }

    #[test]
    fn shockwave_that_never_fades_rejected() {
        let cfg = FieldConfig {
            shockwave: ShockwaveConfig { enabled: true, decay: 1.0, ..ShockwaveConfig::default() },
            ..FieldConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::Decay(1.0)));
    }

    #[test]
    fn non_positive_level_radius_rejected() {
        for r in [0.0, -50.0] {
            let cfg = FieldConfig {
                level: LevelConfig { enabled: true, min_radius: r, ..LevelConfig::default() },
                ..FieldConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::NonPositive { name: "level.min_radius", .. })
            ));
        }
    }

    #[test]
    fn inverted_diameter_band_rejected() {
        let cfg = FieldConfig { min_diameter: 30.0, ..FieldConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::DiameterBand { .. })));
    }

    #[test]
    fn zero_spacing_rejected() {
        let cfg = FieldConfig { spacing: 0.0, ..FieldConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::NonPositive { name: "spacing", .. })));
    }

    #[test]
    fn variant_names_round_trip() {
        for v in Variant::all() {
            assert_eq!(Variant::from_name(v.name()), Ok(v));
        }
        assert!(Variant::from_name("nope").is_err());
    }

    #[test]
    fn classic_matches_sketch_constants() {
        let cfg = FieldConfig::for_variant(Variant::Classic);
        assert_eq!(cfg.layout, Layout::Legacy { cols: 20, rows: 20 });
        assert_eq!(cfg.min_diameter, 2.0);
        assert_eq!(cfg.max_diameter, 20.0);
        assert_eq!(cfg.influence_radius, 150.0);
        assert_eq!(cfg.palette.default.to_string(), "#207FFF");
        assert_eq!(Variant::Classic.canvas_size(), (700, 700));
    }
}
