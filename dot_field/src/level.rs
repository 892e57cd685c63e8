//! Level-reactive influence radius.
//!
//! A scalar level in `[0, 1]` maps linearly onto `[min_radius, max_radius]`.
//! Every `pulse_interval` frames the radius is forced to its maximum for
//! `pulse_frames` frames regardless of the level. Without a level the last
//! value is held.

use crate::config::LevelConfig;

#[derive(Clone, Debug)]
pub struct RadiusModulator {
    cfg:  LevelConfig,
    last: f32,
}

impl RadiusModulator {
    /// `base` is used until the first level arrives.
    pub fn new(cfg: &LevelConfig, base: f32) -> Self {
        RadiusModulator { cfg: cfg.clone(), last: base }
    }

    /// True while a forced pulse is running on `frame`.
    pub fn pulsing(&self, frame: u64) -> bool {
        let every = self.cfg.pulse_interval;
        every > 0 && frame >= every && frame % every < self.cfg.pulse_frames
    }

    /// Effective influence radius for this frame.
    pub fn radius(&mut self, level: Option<f32>, frame: u64) -> f32 {
        if !self.cfg.enabled {
            return self.last;
        }
        if self.pulsing(frame) {
            return self.cfg.max_radius;
        }
        if let Some(l) = level {
            let l = if l.is_finite() { l.clamp(0.0, 1.0) } else { 0.0 };
            self.last = self.cfg.min_radius + (self.cfg.max_radius - self.cfg.min_radius) * l;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(pulse_interval: u64) -> LevelConfig {
        LevelConfig { enabled: true, min_radius: 50.0, max_radius: 250.0, pulse_interval, pulse_frames: 10 }
    }

    #[test]
    fn maps_level_linearly() {
        let mut m = RadiusModulator::new(&cfg(0), 150.0);
        assert_eq!(m.radius(Some(0.0), 1), 50.0);
        assert_eq!(m.radius(Some(0.5), 2), 150.0);
        assert_eq!(m.radius(Some(1.0), 3), 250.0);
        assert_eq!(m.radius(Some(7.0), 4), 250.0);
    }

    #[test]
    fn holds_last_value_without_level() {
        let mut m = RadiusModulator::new(&cfg(0), 150.0);
        assert_eq!(m.radius(None, 0), 150.0);
        m.radius(Some(0.25), 1);
        assert_eq!(m.radius(None, 2), 100.0);
    }

    #[test]
    fn pulse_forces_max() {
        let mut m = RadiusModulator::new(&cfg(100), 150.0);
        assert!(!m.pulsing(5));
        assert_eq!(m.radius(Some(0.0), 100), 250.0);
        assert_eq!(m.radius(Some(0.0), 109), 250.0);
        assert_eq!(m.radius(Some(0.0), 110), 50.0);
        assert!(m.pulsing(205));
    }

    #[test]
    fn disabled_modulator_is_constant() {
        let mut m = RadiusModulator::new(&LevelConfig::default(), 150.0);
        assert_eq!(m.radius(Some(1.0), 0), 150.0);
    }
}
