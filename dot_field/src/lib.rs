//! # dot_field
//!
//! A field of dots held on springs. Every dot has a fixed origin; moving
//! influence points (a pointer, or tracked hands) push dots away, springs pull
//! them back, and each dot's size and color follow from where it is.
//!
//! ## Frame model
//!
//! ```text
//!  InputSnapshot ──▶ DotField::step ──▶ Particle::update (per dot)
//!                                   └─▶ Shockwave::tick
//!  DotField::render(canvas, transform) ──▶ Particle::draw (per dot)
//! ```
//!
//! No dot reads another dot's state. Window, hand tracking and level metering
//! live outside this crate; they only ever produce an [`InputSnapshot`].
//!
//! ## Sketches
//!
//! | Variant | What changes |
//! |---|---|
//! | `classic` | Fixed 20×20 grid, dots shrink near the pointer without moving |
//! | `spring` | Spring-damper lattice with drift and breathing |
//! | `gesture` | Open hand / fist / pointing scale forces and tint dots |
//! | `audio` | Influence radius follows a level in `[0, 1]`, periodic pulses |
//! | `clap` | Two hands meeting fire a decaying shockwave |
//! | `creator` | Pointing spawns dots, a fist swallows them |
//! | `reveal` | Dots are only visible near a hand |
//! | `wipe` | Staggered radial color wipes from the canvas center |
//! | `fingers` | Finger count scales dot size |
//!
//! ## Quick start
//!
//! ```rust
//! use dot_field::{DotField, DrawList, FieldConfig, InputSnapshot, Transform, Variant};
//! use glam::Vec2;
//!
//! let (w, h) = Variant::Spring.canvas_size();
//! let mut field = DotField::new(FieldConfig::for_variant(Variant::Spring), w as f32, h as f32)
//!     .unwrap();
//! field.step(&InputSnapshot::pointer(Vec2::new(200.0, 200.0)));
//!
//! let mut list = DrawList::new();
//! field.render(&mut list, &Transform::IDENTITY);
//! assert_eq!(list.cmds.len(), field.particles().len());
//! ```

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod gesture;
pub mod grid;
pub mod input;
pub mod level;
pub mod noise;
pub mod particle;
pub mod schedule;
pub mod shockwave;

pub use canvas::{Canvas, DrawCmd, DrawList, Transform};
pub use color::Rgba;
pub use config::{ColorMode, FieldConfig, Layout, Sizing, Variant};
pub use error::ConfigError;
pub use field::DotField;
pub use gesture::{Gesture, GestureScheme, Landmarks, Palette};
pub use input::{ClapDetector, HandTracker, InfluencePoint, InputSnapshot, RawHand, TrackedHand};
pub use particle::{Particle, ParticleId};
pub use shockwave::Shockwave;
