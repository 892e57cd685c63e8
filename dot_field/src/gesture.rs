//! Gesture labels, the landmark classifier, and the label → effect table.
//!
//! Hand sources (simulation or hardware) hand us 21 landmarks per hand in the
//! usual wrist / thumb / index / middle / ring / pinky ordering:
//!
//! ```text
//!  0 wrist
//!  1  2  3  4   thumb   (CMC, MCP, IP,  tip)
//!  5  6  7  8   index   (MCP, PIP, DIP, tip)
//!  9 10 11 12   middle
//! 13 14 15 16   ring
//! 17 18 19 20   pinky
//! ```
//!
//! A finger counts as extended when its tip is *above* its base joint in
//! screen space, i.e. the tip's `y` is smaller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Number of landmarks per tracked hand.
pub const LANDMARK_COUNT: usize = 21;

/// (base joint, tip) landmark indices per finger, thumb first.
pub const FINGERS: [(usize, usize); 5] = [(2, 4), (5, 8), (9, 12), (13, 16), (17, 20)];

/// Bones drawn by the skeleton overlay.
pub const BONES: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Closed set of hand poses the field reacts to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// No recognised pose (also the pointer's gesture).
    #[default]
    Default,
    /// All four fingers extended.
    Open,
    /// No fingers extended.
    Fist,
    /// Only the index finger extended.
    Pointing,
    /// Raw count of extended fingers, `0..=5`.
    Fingers(u8),
}

impl Gesture {
    /// Map an external string label onto the closed set.
    ///
    /// Accepts the shape names and the finger-count strings `"0"`–`"5"`;
    /// anything else is [`Gesture::Default`].
    pub fn from_label(label: &str) -> Gesture {
        match label.trim().to_ascii_lowercase().as_str() {
            "open" | "open_hand" | "open hand" => Gesture::Open,
            "fist" | "closed" => Gesture::Fist,
            "pointing" | "point" => Gesture::Pointing,
            s => match s.parse::<u8>() {
                Ok(n) if n <= 5 => Gesture::Fingers(n),
                _ => Gesture::Default,
            },
        }
    }

    pub fn label(&self) -> String {
        match self {
            Gesture::Default    => "default".to_string(),
            Gesture::Open       => "open".to_string(),
            Gesture::Fist       => "fist".to_string(),
            Gesture::Pointing   => "pointing".to_string(),
            Gesture::Fingers(n) => n.to_string(),
        }
    }

    /// Force multipliers for this pose.
    pub fn scales(&self) -> ForceScale {
        match self {
            Gesture::Default | Gesture::Fingers(_) => ForceScale { radius: 1.0,  strength: 1.0 },
            Gesture::Open                          => ForceScale { radius: 2.5,  strength: 3.5 },
            Gesture::Fist                          => ForceScale { radius: 0.5,  strength: 0.5 },
            Gesture::Pointing                      => ForceScale { radius: 0.75, strength: 1.5 },
        }
    }

    /// Target color for particles nearest to a hand in this pose.
    pub fn color(&self, palette: &Palette) -> Rgba {
        match self {
            Gesture::Default    => palette.default,
            Gesture::Open       => palette.open,
            Gesture::Fist       => palette.fist,
            Gesture::Pointing   => palette.pointing,
            Gesture::Fingers(n) => {
                let step = palette.finger_steps.len().max(1);
                palette.finger_steps
                    .get(*n as usize % step)
                    .copied()
                    .unwrap_or(palette.default)
            }
        }
    }

    /// Multiplier on the maximum diameter under finger-count sizing.
    pub fn diameter_scale(&self) -> f32 {
        match self {
            Gesture::Fingers(n) => 0.4 + 0.3 * (*n).min(5) as f32,
            _ => 1.0,
        }
    }
}

/// Multiplicative adjustment of influence radius and repulsion strength.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceScale {
    pub radius:   f32,
    pub strength: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

/// Gesture → color assignments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub default:      Rgba,
    pub open:         Rgba,
    pub fist:         Rgba,
    pub pointing:     Rgba,
    /// Colors for finger counts 0..=5 (wrapped if shorter).
    pub finger_steps: Vec<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            default:  Rgba::rgb(32.0, 127.0, 255.0),
            open:     Rgba::rgb(255.0, 196.0, 0.0),
            fist:     Rgba::rgb(230.0, 40.0, 90.0),
            pointing: Rgba::rgb(60.0, 220.0, 140.0),
            finger_steps: (0..6)
                .map(|n| Rgba::from_hsv(200.0 + n as f32 * 32.0, 0.8, 1.0))
                .collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

/// Which labels the classifier produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureScheme {
    /// default / open / fist / pointing
    #[default]
    Shapes,
    /// finger counts 0..=5
    FingerCount,
}

/// 21 hand landmarks, normalised to `[0, 1]` per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmarks(pub [Vec2; LANDMARK_COUNT]);

impl Landmarks {
    pub fn index_tip(&self) -> Vec2 { self.0[8] }

    /// Extended flags, thumb first.
    pub fn extended(&self) -> [bool; 5] {
        FINGERS.map(|(base, tip)| self.0[tip].y < self.0[base].y)
    }

    pub fn classify(&self, scheme: GestureScheme) -> Gesture {
        classify(&self.extended(), scheme)
    }

    /// Landmarks in canvas pixels, optionally mirrored horizontally.
    pub fn to_pixels(&self, width: f32, height: f32, mirror: bool) -> [Vec2; LANDMARK_COUNT] {
        self.0.map(|p| {
            let x = if mirror { 1.0 - p.x } else { p.x };
            Vec2::new(x * width, p.y * height)
        })
    }

    /// Build a plausible upright hand centred on `palm` (normalised units)
    /// with the given fingers extended. Used by the keyboard simulator and
    /// by tests.
    pub fn synthetic(palm: Vec2, extended: [bool; 5]) -> Landmarks {
        const SPAN: f32 = 0.03;
        let mut pts = [palm; LANDMARK_COUNT];
        pts[0] = palm + Vec2::new(0.0, 2.0 * SPAN);
        for (f, &(base, tip)) in FINGERS.iter().enumerate() {
            let x = palm.x + (f as f32 - 2.0) * SPAN;
            let base_y = palm.y - SPAN;
            // thumb's chain starts one index lower
            let first = if f == 0 { 1 } else { base };
            for (k, i) in (first..=tip).enumerate() {
                let reach = (k as f32 + 1.0) * 0.6 * SPAN;
                let y = if extended[f] { base_y - reach } else { base_y + reach * 0.5 };
                pts[i] = Vec2::new(x, if i == base { base_y } else { y });
            }
        }
        Landmarks(pts)
    }
}

/// Label a pose from its extended-finger flags.
pub fn classify(extended: &[bool; 5], scheme: GestureScheme) -> Gesture {
    match scheme {
        GestureScheme::FingerCount => {
            Gesture::Fingers(extended.iter().filter(|&&e| e).count() as u8)
        }
        GestureScheme::Shapes => {
            let [_, index, middle, ring, pinky] = *extended;
            match (index, middle, ring, pinky) {
                (true,  true,  true,  true ) => Gesture::Open,
                (false, false, false, false) => Gesture::Fist,
                (true,  false, false, false) => Gesture::Pointing,
                _ => Gesture::Default,
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
