//! Hand sources: LeapMotion hardware and keyboard/mouse simulation.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether the landmarks came from real hardware
//! or the simulator; both produce 21 normalised landmarks per hand.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use dot_field::{Landmarks, RawHand};
use glam::Vec2;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// Every hand currently visible. An empty list means all hands left.
    Hands(Vec<RawHand>),

    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<H: HandSource>(source: H) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Joint positions (mm, y up) are projected onto the normalised screen
/// square `[0, 1]²` (y down) over the interaction box below.
#[cfg(feature = "leap")]
#[derive(Clone, Copy, Debug)]
pub struct LeapHandSource {
    /// Half-width of the tracked box along x, mm.
    pub half_width: f32,
    /// Lowest and highest tracked palm heights, mm.
    pub floor:      f32,
    pub ceiling:    f32,
}

#[cfg(feature = "leap")]
impl Default for LeapHandSource {
    fn default() -> Self {
        LeapHandSource { half_width: 200.0, floor: 100.0, ceiling: 500.0 }
    }
}

#[cfg(feature = "leap")]
impl LeapHandSource {
    fn project(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            (x + self.half_width) / (2.0 * self.half_width),
            1.0 - (y - self.floor) / (self.ceiling - self.floor),
        )
    }
}

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                log::error!("LeapC connection failed: {:?}", e);
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("LeapMotion device failed to open: {:?}", e);
            return;
        }
        log::info!("LeapMotion connected");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let mut hands = Vec::new();
                for hand in frame.hands() {
                    let id = if hand.hand_type() == HandType::Left { 0 } else { 1 };
                    let digits: Vec<_> = hand.digits().collect();
                    if digits.len() < 5 {
                        continue;
                    }
                    let mut pts = [Vec2::ZERO; dot_field::gesture::LANDMARK_COUNT];
                    let wrist = digits[2].metacarpal().prev_joint();
                    pts[0] = self.project(wrist.x, wrist.y);
                    for (f, digit) in digits.iter().enumerate() {
                        let joints = [
                            digit.metacarpal().next_joint(),
                            digit.proximal().next_joint(),
                            digit.intermediate().next_joint(),
                            digit.distal().next_joint(),
                        ];
                        for (k, j) in joints.iter().enumerate() {
                            pts[1 + 4 * f + k] = self.project(j.x, j.y);
                        }
                    }
                    hands.push(RawHand { id, landmarks: Landmarks(pts) });
                }
                if tx.send(SourceEvent::Hands(hands)).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse moved; normalised field coordinates.
    Mouse(Vec2),
    KeyDown(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    ToggleHand,     // Tab
    ToggleSecond,   // H
    Open,           // O
    Fist,           // F
    Pointing,       // P
    Count(u8),      // 0–5
    Quit,           // Q / Escape
}

/// The simulator's hand state. The first hand's index fingertip follows
/// the mouse; the optional second hand mirrors it about the vertical
/// center line, so moving the mouse to the middle brings the hands together.
#[derive(Clone, Debug, PartialEq)]
pub struct SimHands {
    pub active:   bool,
    pub second:   bool,
    pub tip:      Vec2,
    pub extended: [bool; 5],
}

impl Default for SimHands {
    fn default() -> Self {
        SimHands { active: false, second: false, tip: Vec2::splat(0.5), extended: [true; 5] }
    }
}

impl SimHands {
    /// Apply one input; returns the event to publish, if any.
    pub fn apply(&mut self, input: SimInput) -> Option<SourceEvent> {
        match input {
            SimInput::Mouse(p) => {
                self.tip = p;
                if !self.active {
                    return None;
                }
            }
            SimInput::KeyDown(key) => match key {
                SimKey::Quit         => return Some(SourceEvent::Quit),
                SimKey::ToggleHand   => self.active = !self.active,
                SimKey::ToggleSecond => self.second = !self.second,
                SimKey::Open         => self.extended = [true; 5],
                SimKey::Fist         => self.extended = [false; 5],
                SimKey::Pointing     => self.extended = [false, true, false, false, false],
                SimKey::Count(n)     => {
                    // index, middle, ring, pinky, then thumb
                    const ORDER: [usize; 5] = [1, 2, 3, 4, 0];
                    self.extended = [false; 5];
                    for &f in ORDER.iter().take(n.min(5) as usize) {
                        self.extended[f] = true;
                    }
                }
            },
        }
        Some(SourceEvent::Hands(self.hands()))
    }

    /// The hands as a detector would report them.
    pub fn hands(&self) -> Vec<RawHand> {
        if !self.active {
            return Vec::new();
        }
        let mut out = vec![self.hand_at(0, self.tip)];
        if self.second {
            out.push(self.hand_at(1, Vec2::new(1.0 - self.tip.x, self.tip.y)));
        }
        out
    }

    /// Synthetic hand whose index fingertip sits on `tip`.
    fn hand_at(&self, id: u32, tip: Vec2) -> RawHand {
        let offset = Landmarks::synthetic(Vec2::ZERO, self.extended).index_tip();
        RawHand { id, landmarks: Landmarks::synthetic(tip - offset, self.extended) }
    }
}

/// Hand source driven by [`SimInput`] events (from the visualizer's window).
pub struct SimHandSource {
    pub rx: Receiver<SimInput>,
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let mut hands = SimHands::default();
        for input in self.rx {
            match hands.apply(input) {
                Some(SourceEvent::Quit) => {
                    let _ = tx.send(SourceEvent::Quit);
                    return;
                }
                Some(event) => {
                    if tx.send(event).is_err() { return; }
                }
                None => {}
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use dot_field::{Gesture, GestureScheme};

    fn hands_of(ev: Option<SourceEvent>) -> Vec<RawHand> {
        match ev {
            Some(SourceEvent::Hands(h)) => h,
            other => panic!("expected hands, got {:?}", other),
        }
    }

    #[test]
    fn inactive_sim_reports_no_hands() {
        let mut sim = SimHands::default();
        assert_eq!(sim.apply(SimInput::Mouse(Vec2::new(0.2, 0.3))), None);
        assert!(sim.hands().is_empty());
    }

    #[test]
    fn index_tip_follows_mouse() {
        let mut sim = SimHands::default();
        sim.apply(SimInput::KeyDown(SimKey::ToggleHand));
        let hands = hands_of(sim.apply(SimInput::Mouse(Vec2::new(0.25, 0.6))));
        assert_eq!(hands.len(), 1);
        assert!(hands[0].landmarks.index_tip().distance(Vec2::new(0.25, 0.6)) < 1e-5);
    }

    #[test]
    fn pose_keys_classify() {
        let mut sim = SimHands::default();
        sim.apply(SimInput::KeyDown(SimKey::ToggleHand));
        let cases = [
            (SimKey::Open, Gesture::Open),
            (SimKey::Fist, Gesture::Fist),
            (SimKey::Pointing, Gesture::Pointing),
        ];
        for (key, want) in cases {
            let hands = hands_of(sim.apply(SimInput::KeyDown(key)));
            assert_eq!(hands[0].landmarks.classify(GestureScheme::Shapes), want);
        }
        let hands = hands_of(sim.apply(SimInput::KeyDown(SimKey::Count(3))));
        assert_eq!(hands[0].landmarks.classify(GestureScheme::FingerCount), Gesture::Fingers(3));
    }

    #[test]
    fn second_hand_mirrors_and_meets_in_the_middle() {
        let mut sim = SimHands::default();
        sim.apply(SimInput::KeyDown(SimKey::ToggleHand));
        sim.apply(SimInput::KeyDown(SimKey::ToggleSecond));
        let hands = hands_of(sim.apply(SimInput::Mouse(Vec2::new(0.2, 0.5))));
        assert_eq!(hands.len(), 2);
        assert!((hands[1].landmarks.index_tip().x - 0.8).abs() < 1e-5);

        let hands = hands_of(sim.apply(SimInput::Mouse(Vec2::new(0.5, 0.5))));
        let d = hands[0].landmarks.index_tip().distance(hands[1].landmarks.index_tip());
        assert!(d < 1e-5);
    }

    #[test]
    fn sim_source_forwards_and_quits() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_hand_source(SimHandSource { rx: sim_rx });
        sim_tx.send(SimInput::KeyDown(SimKey::ToggleHand)).unwrap();
        sim_tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();
        assert!(matches!(rx.recv().unwrap(), SourceEvent::Hands(h) if h.len() == 1));
        assert_eq!(rx.recv().unwrap(), SourceEvent::Quit);
    }
}
