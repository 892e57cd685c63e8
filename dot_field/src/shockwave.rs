//! Transient radial push fired by a clap.

use glam::Vec2;

use crate::config::ShockwaveConfig;

/// A single decaying shockwave. Inactive when `strength` is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Shockwave {
    pub center:   Vec2,
    pub strength: f32,
    radius:       f32,
    decay:        f32,
    epsilon:      f32,
    initial:      f32,
}

impl Shockwave {
    pub fn new(cfg: &ShockwaveConfig) -> Self {
        Shockwave {
            center:   Vec2::ZERO,
            strength: 0.0,
            radius:   cfg.radius,
            decay:    cfg.decay,
            epsilon:  cfg.epsilon,
            initial:  cfg.strength,
        }
    }

    /// Start (or restart) at `center` with the configured strength.
    pub fn trigger(&mut self, center: Vec2) {
        self.center   = center;
        self.strength = self.initial;
    }

    pub fn is_active(&self) -> bool {
        self.strength > 0.0
    }

    /// Decay one frame; clears once strength falls below epsilon.
    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }
        self.strength *= self.decay;
        if self.strength < self.epsilon {
            self.center   = Vec2::ZERO;
            self.strength = 0.0;
        }
    }

    /// Outward force on a particle at `pos`, linear falloff to zero at the
    /// radius.
    pub fn force_at(&self, pos: Vec2) -> Vec2 {
        if !self.is_active() {
            return Vec2::ZERO;
        }
        let d = pos - self.center;
        let dist = d.length();
        if dist >= self.radius {
            return Vec2::ZERO;
        }
        let dir = d.try_normalize().unwrap_or(Vec2::NEG_Y);
        dir * self.strength * (1.0 - dist / self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave() -> Shockwave {
        Shockwave::new(&ShockwaveConfig { enabled: true, strength: 10.0, radius: 800.0, decay: 0.9, epsilon: 0.1 })
    }

    #[test]
    fn decays_geometrically() {
        let mut w = wave();
        w.trigger(Vec2::new(100.0, 100.0));
        w.tick();
        assert!((w.strength - 9.0).abs() < 1e-5);
        w.tick();
        assert!((w.strength - 8.1).abs() < 1e-5);
    }

    #[test]
    fn clears_below_epsilon_and_stops_pushing() {
        let mut w = wave();
        w.trigger(Vec2::new(100.0, 100.0));
        let mut frames = 0;
        while w.is_active() {
            w.tick();
            frames += 1;
            assert!(frames < 1000);
        }
        // 10 * 0.9^n < 0.1  ⇒  n = 44
        assert_eq!(frames, 44);
        assert_eq!(w.center, Vec2::ZERO);
        assert_eq!(w.strength, 0.0);
        assert_eq!(w.force_at(Vec2::new(120.0, 100.0)), Vec2::ZERO);
    }

    #[test]
    fn pushes_outward_with_linear_falloff() {
        let mut w = wave();
        w.trigger(Vec2::ZERO);
        let near = w.force_at(Vec2::new(400.0, 0.0));
        assert!((near.x - 5.0).abs() < 1e-4);
        assert_eq!(near.y, 0.0);
        assert_eq!(w.force_at(Vec2::new(900.0, 0.0)), Vec2::ZERO);
    }
}
