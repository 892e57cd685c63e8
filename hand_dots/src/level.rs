//! Scalar level input in `[0, 1]`.
//!
//! The audio sketches want a loudness. Here it comes from MIDI: note-on
//! velocities kick the level up, CC7 (channel volume) sets it directly, and
//! it decays every frame in between. Without a MIDI input port the app runs
//! on a [`NullLevel`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{info, warn};

// ════════════════════════════════════════════════════════════════════════════
// LevelSource — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub trait LevelSource {
    /// Current level, sampled once per frame. `None` when nothing is attached.
    fn level(&mut self) -> Option<f32>;
}

// ── null backend (used when no MIDI port is available) ────────────────────

pub struct NullLevel;

impl LevelSource for NullLevel {
    fn level(&mut self) -> Option<f32> { None }
}

// ── midir backend ─────────────────────────────────────────────────────────

/// A level fed by the MIDI input callback thread.
///
/// Non-negative floats order like their bit patterns, so the level is kept
/// as `f32` bits in an `AtomicU32` and raised with `fetch_max`.
pub struct MidiLevel {
    shared: Arc<AtomicU32>,
    decay:  f32,
    _conn:  midir::MidiInputConnection<()>,
}

impl LevelSource for MidiLevel {
    fn level(&mut self) -> Option<f32> {
        Some(sample_and_decay(&self.shared, self.decay))
    }
}

/// Read the level and leave it decayed, in one step so a kick landing in
/// between is never overwritten.
fn sample_and_decay(shared: &AtomicU32, decay: f32) -> f32 {
    let prev = shared
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
            Some((f32::from_bits(bits) * decay).to_bits())
        })
        .unwrap_or_else(|bits| bits);
    f32::from_bits(prev)
}

/// What a MIDI message does to the level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LevelChange {
    /// Raise to at least this value.
    Kick(f32),
    /// Replace with this value.
    Set(f32),
}

/// Decode the messages that move the level; everything else is `None`.
pub fn level_change(msg: &[u8]) -> Option<LevelChange> {
    match *msg {
        // note-on with non-zero velocity
        [status, _, vel, ..] if status & 0xF0 == 0x90 && vel > 0 => {
            Some(LevelChange::Kick(f32::from(vel.min(127)) / 127.0))
        }
        // CC7 channel volume
        [status, 7, value, ..] if status & 0xF0 == 0xB0 => {
            Some(LevelChange::Set(f32::from(value.min(127)) / 127.0))
        }
        _ => None,
    }
}

fn apply(shared: &AtomicU32, change: LevelChange) {
    match change {
        LevelChange::Kick(v) => { shared.fetch_max(v.to_bits(), Ordering::Relaxed); }
        LevelChange::Set(v)  => shared.store(v.to_bits(), Ordering::Relaxed),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_level — enumerate ports and pick first available
// ════════════════════════════════════════════════════════════════════════════

/// Try to listen on the first available MIDI input port.
/// Falls back to `NullLevel` with a warning if none found.
pub fn open_midi_level(decay: f32) -> Box<dyn LevelSource> {
    let midi_in = match midir::MidiInput::new("hand_dots_level") {
        Ok(m)  => m,
        Err(e) => {
            warn!("MIDI init error: {}; running without a level", e);
            return Box::new(NullLevel);
        }
    };

    let ports = midi_in.ports();
    let Some(port) = ports.first() else {
        warn!("no MIDI input ports found; running without a level");
        return Box::new(NullLevel);
    };
    let name = midi_in.port_name(port).unwrap_or_else(|_| "Unknown".to_string());

    let shared = Arc::new(AtomicU32::new(0.0_f32.to_bits()));
    let feed = Arc::clone(&shared);
    let conn = midi_in.connect(
        port,
        "hand-dots-level",
        move |_stamp, msg, _| {
            if let Some(change) = level_change(msg) {
                apply(&feed, change);
            }
        },
        (),
    );

    match conn {
        Ok(conn) => {
            info!("listening for level on MIDI port: {}", name);
            Box::new(MidiLevel { shared, decay: decay.clamp(0.0, 1.0), _conn: conn })
        }
        Err(e) => {
            warn!("failed to connect to {}: {}; running without a level", name, e);
            Box::new(NullLevel)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_kicks() {
        assert_eq!(level_change(&[0x90, 60, 127]), Some(LevelChange::Kick(1.0)));
        assert_eq!(level_change(&[0x93, 60, 0]), None, "velocity 0 is a note-off");
        assert_eq!(level_change(&[0x80, 60, 100]), None);
    }

    #[test]
    fn cc7_sets() {
        assert_eq!(level_change(&[0xB0, 7, 0]), Some(LevelChange::Set(0.0)));
        assert_eq!(level_change(&[0xB2, 1, 64]), None);
        assert_eq!(level_change(&[0xB0]), None);
    }

    #[test]
    fn kick_only_raises() {
        let shared = AtomicU32::new(0.5_f32.to_bits());
        apply(&shared, LevelChange::Kick(0.25));
        assert_eq!(f32::from_bits(shared.load(Ordering::Relaxed)), 0.5);
        apply(&shared, LevelChange::Kick(0.75));
        assert_eq!(f32::from_bits(shared.load(Ordering::Relaxed)), 0.75);
        apply(&shared, LevelChange::Set(0.1));
        assert_eq!(f32::from_bits(shared.load(Ordering::Relaxed)), 0.1);
    }

    #[test]
    fn sampling_decays_after_reading() {
        let shared = AtomicU32::new(0.8_f32.to_bits());
        assert_eq!(sample_and_decay(&shared, 0.5), 0.8);
        assert_eq!(sample_and_decay(&shared, 0.5), 0.4);
    }

    #[test]
    fn kick_during_sampling_survives() {
        let shared = Arc::new(AtomicU32::new(0.0_f32.to_bits()));
        let kicker = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || apply(&shared, LevelChange::Kick(1.0)))
        };
        // decay 1.0 keeps whatever was read, so only a lost update could drop the kick
        for _ in 0..10_000 {
            sample_and_decay(&shared, 1.0);
        }
        kicker.join().unwrap();
        sample_and_decay(&shared, 1.0);
        assert_eq!(f32::from_bits(shared.load(Ordering::Relaxed)), 1.0);
    }

    #[test]
    fn null_level_is_absent() {
        assert_eq!(NullLevel.level(), None);
    }
}
