//! Frame-keyed event queue for delayed per-particle effects.
//!
//! Effects target a [`ParticleId`] rather than an index, so particles that
//! were destroyed in the meantime simply do not match. A resize calls
//! [`EventQueue::clear`]; nothing scheduled against the old set survives it.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::color::Rgba;
use crate::particle::ParticleId;

/// What happens to the target particle when the event fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Start a radial color wipe toward the given color.
    BeginTransition(Rgba),
}

/// One pending effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scheduled {
    pub due:    u64,
    pub target: ParticleId,
    pub effect: Effect,
    seq:        u64,
}

// Ordered by due frame, then insertion order.
impl Eq for Scheduled {}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of pending effects.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    seq:  u64,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue::default()
    }

    pub fn schedule(&mut self, due: u64, target: ParticleId, effect: Effect) {
        self.seq += 1;
        self.heap.push(Reverse(Scheduled { due, target, effect, seq: self.seq }));
    }

    /// Remove and return every event due at or before `frame`, in order.
    pub fn drain_due(&mut self, frame: u64) -> Vec<Scheduled> {
        let mut out = Vec::new();
        while let Some(Reverse(top)) = self.heap.peek() {
            if top.due > frame {
                break;
            }
            if let Some(Reverse(ev)) = self.heap.pop() {
                out.push(ev);
            }
        }
        out
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Effect = Effect::BeginTransition(Rgba::rgb(255.0, 0.0, 0.0));

    #[test]
    fn drains_only_due_events_in_order() {
        let mut q = EventQueue::new();
        q.schedule(5, ParticleId(2), RED);
        q.schedule(1, ParticleId(1), RED);
        q.schedule(5, ParticleId(3), RED);
        q.schedule(9, ParticleId(4), RED);

        let due: Vec<_> = q.drain_due(5).into_iter().map(|e| e.target).collect();
        assert_eq!(due, vec![ParticleId(1), ParticleId(2), ParticleId(3)]);
        assert_eq!(q.len(), 1);
        assert!(q.drain_due(8).is_empty());
        assert_eq!(q.drain_due(100).len(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn clear_cancels_pending() {
        let mut q = EventQueue::new();
        for i in 0..10 { q.schedule(i, ParticleId(i), RED); }
        q.clear();
        assert!(q.drain_due(u64::MAX).is_empty());
    }
}
