//! # hand_dots
//!
//! Interactive dot-field sketches in a window. The mouse, a simulated hand
//! or a LeapMotion-tracked hand push the dots of a [`dot_field::DotField`]
//! around; a MIDI input can drive the audio-reactive radius.
//!
//! ## Hand → field mapping
//!
//! | Pose | Effect |
//! |---|---|
//! | Open hand | Radius ×2.5, strength ×3.5, warm tint |
//! | Fist | Radius and strength ×0.5; swallows dots in `creator` |
//! | Pointing | Radius ×0.75, strength ×1.5; spawns dots in `creator` |
//! | 0–5 fingers | Scales dot size in `fingers` |
//! | Two hands meet | Shockwave in `clap` |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard and mouse drive a synthetic hand.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `Tab` | Show / hide the simulated hand (mouse = index fingertip) |
//! | `H` | Mirrored second hand (meet in the middle to clap) |
//! | `O` / `F` / `P` | Open / fist / pointing |
//! | `0`–`5` | Finger count |
//! | `Space` / hold | Pump the level |
//! | `W` | Color wipe |
//! | `K` | Shockwave at the pointer |
//! | `L` | Toggle skeleton overlay |
//! | `R` | Rebuild the field |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod config;
pub mod error;
pub mod level;
pub mod source;
pub mod visualizer;
