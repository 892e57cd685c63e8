//! Input shaping: from raw pointer / hand detections to the per-frame
//! [`InputSnapshot`] the field consumes.
//!
//! Hand detections arrive at their own (usually slower) rate. The
//! [`HandTracker`] keeps one smoothed point per hand id and eases it toward
//! the latest detection every frame, so the field never sees the raw jitter.

use glam::Vec2;

use crate::config::ClapConfig;
use crate::gesture::{Gesture, GestureScheme, Landmarks, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// Snapshot
// ════════════════════════════════════════════════════════════════════════════

/// One moving point that pushes particles away.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InfluencePoint {
    /// Stable per hand; the pointer uses [`POINTER_ID`].
    pub id:       u32,
    /// Canvas pixels, already smoothed.
    pub position: Vec2,
    pub gesture:  Gesture,
}

/// Id reserved for the mouse pointer.
pub const POINTER_ID: u32 = u32::MAX;

impl InfluencePoint {
    pub fn pointer(position: Vec2) -> Self {
        InfluencePoint { id: POINTER_ID, position, gesture: Gesture::Default }
    }
}

/// Everything the field reads from the outside world in one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub points:      Vec<InfluencePoint>,
    /// Scalar level in `[0, 1]`, `None` when no meter is attached.
    pub audio_level: Option<f32>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        InputSnapshot::default()
    }

    pub fn pointer(position: Vec2) -> Self {
        InputSnapshot { points: vec![InfluencePoint::pointer(position)], audio_level: None }
    }

    pub fn with_level(mut self, level: Option<f32>) -> Self {
        self.audio_level = level.map(|l| l.clamp(0.0, 1.0));
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker
// ════════════════════════════════════════════════════════════════════════════

/// One detection from a hand source.
#[derive(Clone, Debug, PartialEq)]
pub struct RawHand {
    pub id:        u32,
    pub landmarks: Landmarks,
}

/// A hand after smoothing and classification.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedHand {
    pub id:        u32,
    /// Smoothed index fingertip, canvas pixels.
    pub position:  Vec2,
    target:        Vec2,
    pub gesture:   Gesture,
    /// Latest landmarks in canvas pixels (unsmoothed), for the skeleton overlay.
    pub skeleton:  [Vec2; LANDMARK_COUNT],
}

impl TrackedHand {
    pub fn influence(&self) -> InfluencePoint {
        InfluencePoint { id: self.id, position: self.position, gesture: self.gesture }
    }
}

/// Per-hand exponential smoothing.
#[derive(Clone, Debug)]
pub struct HandTracker {
    /// `current = lerp(current, target, smoothing)`; smaller is smoother.
    pub smoothing: f32,
    pub scheme:    GestureScheme,
    /// Flip x when projecting landmarks (selfie view).
    pub mirror:    bool,
    hands:         Vec<TrackedHand>,
}

impl HandTracker {
    pub fn new(smoothing: f32, scheme: GestureScheme, mirror: bool) -> Self {
        HandTracker { smoothing: smoothing.clamp(0.0, 1.0), scheme, mirror, hands: Vec::new() }
    }

    /// Apply a fresh detection frame. New ids start at their target, missing
    /// ids are dropped.
    pub fn observe(&mut self, detections: &[RawHand], width: f32, height: f32) {
        let mut next = Vec::with_capacity(detections.len());
        for raw in detections {
            let skeleton = raw.landmarks.to_pixels(width, height, self.mirror);
            let target   = skeleton[8];
            let gesture  = raw.landmarks.classify(self.scheme);
            let position = self.hands
                .iter()
                .find(|h| h.id == raw.id)
                .map(|h| h.position)
                .unwrap_or(target);
            next.push(TrackedHand { id: raw.id, position, target, gesture, skeleton });
        }
        self.hands = next;
    }

    /// Ease every hand one frame toward its latest target.
    pub fn tick(&mut self) {
        for h in &mut self.hands {
            h.position = h.position.lerp(h.target, self.smoothing);
        }
    }

    pub fn hands(&self) -> &[TrackedHand] {
        &self.hands
    }

    pub fn influences(&self) -> Vec<InfluencePoint> {
        self.hands.iter().map(TrackedHand::influence).collect()
    }

    pub fn clear(&mut self) {
        self.hands.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClapDetector
// ════════════════════════════════════════════════════════════════════════════

/// Rising-edge detector for two hands meeting.
///
/// Fires once when the two closest points come within `clap_distance`, then
/// stays latched until they separate past `unclap_distance`.
#[derive(Clone, Debug)]
pub struct ClapDetector {
    clap_distance:   f32,
    unclap_distance: f32,
    clapped:         bool,
}

impl ClapDetector {
    pub fn new(cfg: &ClapConfig) -> Self {
        ClapDetector {
            clap_distance:   cfg.clap_distance,
            unclap_distance: cfg.unclap_distance.max(cfg.clap_distance),
            clapped:         false,
        }
    }

    pub fn is_clapped(&self) -> bool { self.clapped }

    /// Returns the clap center on the frame the clap happens.
    pub fn update(&mut self, points: &[InfluencePoint]) -> Option<Vec2> {
        let hands: Vec<&InfluencePoint> = points.iter().filter(|p| p.id != POINTER_ID).collect();
        if hands.len() < 2 {
            self.clapped = false;
            return None;
        }
        let (a, b) = (hands[0].position, hands[1].position);
        let dist = a.distance(b);
        if !self.clapped && dist < self.clap_distance {
            self.clapped = true;
            Some((a + b) / 2.0)
        } else {
            if self.clapped && dist > self.unclap_distance {
                self.clapped = false;
            }
            None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
