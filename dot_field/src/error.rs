//! Error types for dot_field.
//!
//! The simulation itself never fails; the only fallible surface is turning
//! user-supplied configuration into a [`FieldConfig`](crate::FieldConfig).

use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A color string that is not `#RRGGBB` or `#RRGGBBAA`.
    #[error("invalid color {0:?}: expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    /// Damping outside the open interval (0, 1) never settles or never moves.
    #[error("damping must lie in (0, 1), got {0}")]
    Damping(f32),

    /// Spring stiffness outside the band where the damped spring settles.
    #[error("spring_stiffness must lie in (0, {max}) at this damping, got {value}")]
    Stiffness {
        /// Offending value.
        value: f32,
        /// Upper stability bound, `2 (1 + damping) / damping`.
        max: f32,
    },

    /// A shockwave that never decays never clears.
    #[error("shockwave.decay must lie in (0, 1), got {0}")]
    Decay(f32),

    /// Diameter band is inverted.
    #[error("min_diameter {min} exceeds max_diameter {max}")]
    DiameterBand {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// A length or count that must be strictly positive.
    #[error("{name} must be positive, got {value}")]
    NonPositive {
        /// Field name as written in the config file.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Interpolation factor outside (0, 1].
    #[error("{name} must lie in (0, 1], got {value}")]
    Fraction {
        /// Field name as written in the config file.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Variant name not recognised by [`Variant::from_name`](crate::Variant::from_name).
    #[error("unknown variant {0:?}")]
    UnknownVariant(String),
}
