//! A single dot: state, the per-frame spring-damper update, and drawing.
//!
//! One update is one explicit Euler step with unit time step:
//!
//! 1. ambient drift along a noise-derived angle
//! 2. linear-falloff repulsion from every influence point in range
//! 3. outward push from an active shockwave
//! 4. spring back toward the origin
//! 5. damping
//! 6. position += velocity
//! 7. diameter from displacement (or proximity), clamped to the band
//! 8. color eased toward the nearest hand's gesture color
//!
//! Particles never look at each other.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::canvas::{Canvas, Transform};
use crate::color::Rgba;
use crate::config::{ColorMode, FieldConfig, Sizing};
use crate::gesture::Gesture;
use crate::input::InfluencePoint;
use crate::noise::NoiseField;
use crate::shockwave::Shockwave;

/// Stable identity, unique within one field for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub u64);

// ════════════════════════════════════════════════════════════════════════════
// Influence — an input point with its gesture scaling applied
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Influence {
    pub position: Vec2,
    pub radius:   f32,
    pub strength: f32,
    pub gesture:  Gesture,
}

impl Influence {
    pub fn new(point: &InfluencePoint, base_radius: f32, base_strength: f32) -> Self {
        let s = point.gesture.scales();
        Influence {
            position: point.position,
            radius:   base_radius * s.radius,
            strength: base_strength * s.strength,
            gesture:  point.gesture,
        }
    }
}

/// Repulsive force of one influence on a particle at `pos`.
///
/// `strength` at distance 0, falling linearly to zero at `radius`. At exactly
/// zero distance the push points up.
pub fn repulsion_force(pos: Vec2, inf: &Influence) -> Vec2 {
    let d = pos - inf.position;
    let dist = d.length();
    if dist >= inf.radius {
        return Vec2::ZERO;
    }
    let dir = d.try_normalize().unwrap_or(Vec2::NEG_Y);
    dir * inf.strength * (1.0 - dist / inf.radius)
}

/// Closest influence to `pos` and its distance.
pub fn nearest(pos: Vec2, influences: &[Influence]) -> Option<(&Influence, f32)> {
    influences
        .iter()
        .map(|inf| (inf, inf.position.distance(pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

// ════════════════════════════════════════════════════════════════════════════
// FrameInputs — everything one update step reads besides the particle
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameInputs<'a> {
    pub config:     &'a FieldConfig,
    pub influences: &'a [Influence],
    pub shockwave:  &'a Shockwave,
    pub noise:      &'a NoiseField,
    pub frame:      u64,
    /// Influence radius before gesture scaling (possibly level-modulated).
    pub radius:     f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Transition — radial color wipe
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub from:     Rgba,
    pub to:       Rgba,
    /// `0.0..=1.0`; the new color covers `diameter * progress`.
    pub progress: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id:         ParticleId,
    origin:         Vec2,
    pub position:   Vec2,
    pub velocity:   Vec2,
    pub diameter:   f32,
    pub color:      Rgba,
    /// `0.0..=255.0`; zero means the particle is not drawn.
    pub alpha:      f32,
    pub transition: Option<Transition>,
}

impl Particle {
    /// At rest on `origin`, full size, opaque.
    pub fn new(id: ParticleId, origin: Vec2, cfg: &FieldConfig) -> Self {
        Particle {
            id,
            origin,
            position:   origin,
            velocity:   Vec2::ZERO,
            diameter:   cfg.max_diameter,
            color:      cfg.palette.default,
            alpha:      if cfg.reveal { 0.0 } else { 255.0 },
            transition: None,
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn displacement(&self) -> f32 {
        self.position.distance(self.origin)
    }

    /// Advance one frame.
    pub fn update(&mut self, f: &FrameInputs) {
        let cfg = f.config;

        if cfg.sizing == Sizing::Proximity {
            self.position = self.origin;
            self.velocity = Vec2::ZERO;
        } else {
            // ── forces ───────────────────────────────────────────────────
            if cfg.drift > 0.0 {
                let n = f.noise.sample(
                    self.position.x * cfg.noise_scale,
                    self.position.y * cfg.noise_scale,
                    f.frame as f32 * cfg.noise_speed,
                );
                self.velocity += Vec2::from_angle(n * TAU * 2.0) * cfg.drift;
            }
            for inf in f.influences {
                self.velocity += repulsion_force(self.position, inf);
            }
            self.velocity += f.shockwave.force_at(self.position);
            self.velocity += (self.origin - self.position) * cfg.spring_stiffness;

            // ── integrate ────────────────────────────────────────────────
            self.velocity *= cfg.damping;
            self.position += self.velocity;
        }

        self.diameter = self.derive_diameter(f);
        self.alpha    = self.derive_alpha(f);
        self.advance_color(f);
    }

    fn derive_diameter(&self, f: &FrameInputs) -> f32 {
        let cfg = f.config;
        let (min, mut max) = (cfg.min_diameter, cfg.max_diameter);

        let d = match cfg.sizing {
            Sizing::Proximity => {
                // Smallest size demanded by any point in range.
                let t = f.influences
                    .iter()
                    .map(|inf| (inf.position.distance(self.origin) / inf.radius).min(1.0))
                    .fold(1.0_f32, f32::min);
                min + (max - min) * t
            }
            Sizing::Displacement | Sizing::FingerCount => {
                if cfg.sizing == Sizing::FingerCount {
                    if let Some((inf, _)) = nearest(self.position, f.influences) {
                        max *= inf.gesture.diameter_scale();
                    }
                }
                let reach = (f.radius / 2.0).max(f32::EPSILON);
                let t = (self.displacement() / reach).min(1.0);
                max + (min - max) * t
            }
        };

        let breath = if cfg.breathing > 0.0 {
            let phase = f.frame as f32 * 0.05 + (self.origin.x + self.origin.y) * 0.01;
            phase.sin() * cfg.breathing
        } else {
            0.0
        };

        (d + breath).clamp(min, max.max(min))
    }

    fn derive_alpha(&self, f: &FrameInputs) -> f32 {
        if !f.config.reveal {
            return 255.0;
        }
        let r = f.radius;
        match nearest(self.position, f.influences) {
            // [r, r/2] → [0, 255]
            Some((_, dist)) => ((r - dist) / (r / 2.0) * 255.0).clamp(0.0, 255.0),
            None => 0.0,
        }
    }

    fn advance_color(&mut self, f: &FrameInputs) {
        let cfg = f.config;
        match cfg.color_mode {
            ColorMode::Fixed => self.color = cfg.palette.default,
            ColorMode::Gesture => {
                let target = nearest(self.position, f.influences)
                    .filter(|(inf, dist)| *dist < inf.radius)
                    .map(|(inf, _)| inf.gesture.color(&cfg.palette))
                    .unwrap_or(cfg.palette.default);
                self.color = self.color.lerp(target, cfg.color_lerp);
            }
            ColorMode::Wipe => {
                if let Some(tr) = &mut self.transition {
                    tr.progress = (tr.progress + cfg.wipe.step).min(1.0);
                    if tr.progress >= 1.0 {
                        self.color = tr.to;
                        self.transition = None;
                    }
                }
            }
        }
    }

    /// Begin a wipe toward `to`, starting from whatever is currently shown
    /// underneath.
    pub fn begin_transition(&mut self, to: Rgba) {
        let from = match self.transition {
            Some(tr) => tr.to,
            None => self.color,
        };
        self.color = from;
        self.transition = Some(Transition { from, to, progress: 0.0 });
    }

    /// Emit this particle's circles. Fully transparent particles emit nothing.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, transform: &Transform) {
        if self.alpha <= 0.0 {
            return;
        }
        let center   = transform.point(self.position);
        let diameter = transform.length(self.diameter);
        let fade     = |c: Rgba| c.with_alpha(c.a * self.alpha / 255.0);

        match self.transition {
            Some(tr) if tr.progress < 1.0 => {
                canvas.fill_circle(center, diameter, fade(tr.from));
                if tr.progress > 0.0 {
                    canvas.fill_circle(center, diameter * tr.progress, fade(tr.to));
                }
            }
            _ => canvas.fill_circle(center, diameter, fade(self.color)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawList;
    use crate::config::{FieldConfig, ShockwaveConfig};

    struct Rig {
        cfg:   FieldConfig,
        wave:  Shockwave,
        noise: NoiseField,
    }

    impl Rig {
        fn new(cfg: FieldConfig) -> Self {
            let wave = Shockwave::new(&cfg.shockwave);
            Rig { cfg, wave, noise: NoiseField::new(1) }
        }

        fn step(&self, p: &mut Particle, infs: &[Influence], frame: u64) {
            p.update(&FrameInputs {
                config:     &self.cfg,
                influences: infs,
                shockwave:  &self.wave,
                noise:      &self.noise,
                frame,
                radius:     self.cfg.influence_radius,
            });
        }
    }

    fn quiet() -> FieldConfig {
        FieldConfig { drift: 0.0, ..FieldConfig::default() }
    }

    fn point_at(pos: Vec2, gesture: Gesture, cfg: &FieldConfig) -> Influence {
        let p = InfluencePoint { id: 1, position: pos, gesture };
        Influence::new(&p, cfg.influence_radius, cfg.repulsion_strength)
    }

    #[test]
    fn repulsion_at_zero_distance_is_full_strength() {
        let cfg = quiet();
        let o = Vec2::new(100.0, 100.0);
        let f = repulsion_force(o, &point_at(o, Gesture::Default, &cfg));
        assert!((f.length() - cfg.repulsion_strength).abs() < 1e-5);

        let open = repulsion_force(o, &point_at(o, Gesture::Open, &cfg));
        assert!((open.length() - cfg.repulsion_strength * 3.5).abs() < 1e-4);
    }

    #[test]
    fn repulsion_zero_outside_radius() {
        let cfg = quiet();
        let inf = point_at(Vec2::ZERO, Gesture::Default, &cfg);
        assert_eq!(repulsion_force(Vec2::new(cfg.influence_radius, 0.0), &inf), Vec2::ZERO);
        assert_eq!(repulsion_force(Vec2::new(500.0, 500.0), &inf), Vec2::ZERO);
    }

    #[test]
    fn repulsion_points_away_with_linear_falloff() {
        let cfg = quiet();
        let inf = point_at(Vec2::ZERO, Gesture::Default, &cfg);
        let f = repulsion_force(Vec2::new(75.0, 0.0), &inf);
        assert!((f.x - cfg.repulsion_strength * 0.5).abs() < 1e-5);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn relaxes_to_origin_and_full_size() {
        let rig = Rig::new(quiet());
        let mut p = Particle::new(ParticleId(0), Vec2::new(200.0, 200.0), &rig.cfg);
        p.position = Vec2::new(260.0, 170.0);
        p.velocity = Vec2::new(-4.0, 9.0);
        for frame in 0..600 {
            rig.step(&mut p, &[], frame);
        }
        assert!(p.displacement() < 1e-3, "still {} away", p.displacement());
        assert!((p.diameter - rig.cfg.max_diameter).abs() < 1e-3);
    }

    #[test]
    fn diameter_stays_in_band_under_heavy_forcing() {
        let cfg = FieldConfig { breathing: 4.0, drift: 0.3, ..FieldConfig::default() };
        let rig = Rig::new(cfg);
        let mut p = Particle::new(ParticleId(0), Vec2::new(50.0, 50.0), &rig.cfg);
        for frame in 0..300 {
            let pos = Vec2::new(50.0 + (frame as f32 * 0.3).sin() * 40.0, 50.0);
            let infs = [point_at(pos, Gesture::Open, &rig.cfg), point_at(pos, Gesture::Fist, &rig.cfg)];
            rig.step(&mut p, &infs, frame);
            assert!(p.diameter >= rig.cfg.min_diameter && p.diameter <= rig.cfg.max_diameter);
        }
    }

    #[test]
    fn two_points_compound() {
        let cfg = quiet();
        let o = Vec2::new(100.0, 100.0);
        let one = point_at(o + Vec2::new(-30.0, 0.0), Gesture::Default, &cfg);
        let rig = Rig::new(cfg);

        let mut a = Particle::new(ParticleId(0), o, &rig.cfg);
        rig.step(&mut a, &[one], 0);
        let mut b = Particle::new(ParticleId(1), o, &rig.cfg);
        rig.step(&mut b, &[one, one], 0);
        assert!((b.velocity.x - 2.0 * a.velocity.x).abs() < 1e-5);
    }

    #[test]
    fn shockwave_pushes_particles() {
        let cfg = FieldConfig {
            drift: 0.0,
            shockwave: ShockwaveConfig { enabled: true, ..ShockwaveConfig::default() },
            ..FieldConfig::default()
        };
        let mut rig = Rig::new(cfg);
        rig.wave.trigger(Vec2::new(0.0, 0.0));
        let mut p = Particle::new(ParticleId(0), Vec2::new(100.0, 0.0), &rig.cfg);
        rig.step(&mut p, &[], 0);
        assert!(p.velocity.x > 0.0);
    }

    #[test]
    fn color_residual_decays_geometrically() {
        let cfg = quiet();
        let rig = Rig::new(cfg);
        let o = Vec2::new(100.0, 100.0);
        let inf = point_at(o, Gesture::Open, &rig.cfg);
        let target = Gesture::Open.color(&rig.cfg.palette);

        let mut p = Particle::new(ParticleId(0), o, &rig.cfg);
        let d0 = p.color.distance(target);
        // Keep the particle pinned so the hand stays nearest and in range.
        for frame in 0..10 {
            p.position = o;
            p.velocity = Vec2::ZERO;
            rig.step(&mut p, &[inf], frame);
        }
        let expected = d0 * (1.0 - rig.cfg.color_lerp).powi(10);
        assert!((p.color.distance(target) - expected).abs() < 1e-2);
        assert_ne!(p.color, target);
    }

    #[test]
    fn unrecognised_label_uses_default_color() {
        let rig = Rig::new(quiet());
        let o = Vec2::new(10.0, 10.0);
        let label = Gesture::from_label("shaka");
        let inf = point_at(o, label, &rig.cfg);
        let mut p = Particle::new(ParticleId(0), o, &rig.cfg);
        p.color = Rgba::BLACK;
        for frame in 0..200 {
            p.position = o;
            rig.step(&mut p, &[inf], frame);
        }
        assert!(p.color.distance(rig.cfg.palette.default) < 1e-3);
    }

    #[test]
    fn proximity_sizing_shrinks_near_pointer_without_moving() {
        let cfg = FieldConfig::for_variant(crate::config::Variant::Classic);
        let rig = Rig::new(cfg);
        let o = Vec2::new(300.0, 300.0);
        let mut p = Particle::new(ParticleId(0), o, &rig.cfg);

        rig.step(&mut p, &[point_at(o, Gesture::Default, &rig.cfg)], 0);
        assert_eq!(p.position, o);
        assert_eq!(p.diameter, rig.cfg.min_diameter);

        // halfway out: map(75, 0, 150, 2, 20) = 11
        rig.step(&mut p, &[point_at(o + Vec2::new(75.0, 0.0), Gesture::Default, &rig.cfg)], 1);
        assert!((p.diameter - 11.0).abs() < 1e-4);

        rig.step(&mut p, &[], 2);
        assert_eq!(p.diameter, rig.cfg.max_diameter);
    }

    #[test]
    fn finger_count_scales_maximum() {
        let cfg = FieldConfig::for_variant(crate::config::Variant::Fingers);
        let rig = Rig::new(FieldConfig { drift: 0.0, ..cfg });
        let o = Vec2::new(100.0, 100.0);
        let far = o + Vec2::new(500.0, 0.0);

        let mut p = Particle::new(ParticleId(0), o, &rig.cfg);
        rig.step(&mut p, &[point_at(far, Gesture::Fingers(5), &rig.cfg)], 0);
        assert!((p.diameter - rig.cfg.max_diameter * 1.9).abs() < 1e-3);

        rig.step(&mut p, &[point_at(far, Gesture::Fingers(0), &rig.cfg)], 1);
        assert!((p.diameter - rig.cfg.max_diameter * 0.4).abs() < 1e-3);
    }

    #[test]
    fn reveal_alpha_maps_distance_band() {
        let cfg = FieldConfig { reveal: true, drift: 0.0, ..FieldConfig::default() };
        let rig = Rig::new(cfg);
        let o = Vec2::new(0.0, 0.0);
        let mut p = Particle::new(ParticleId(0), o, &rig.cfg);

        // no input → hidden, nothing submitted
        rig.step(&mut p, &[], 0);
        assert_eq!(p.alpha, 0.0);
        let mut list = DrawList::new();
        p.draw(&mut list, &Transform::IDENTITY);
        assert!(list.cmds.is_empty());

        // 3/4 of the radius away → halfway through the [r, r/2] band
        let mut far = point_at(Vec2::new(112.5, 0.0), Gesture::Default, &rig.cfg);
        far.strength = 0.0;
        p.position = o;
        p.velocity = Vec2::ZERO;
        rig.step(&mut p, &[far], 1);
        assert!((p.alpha - 127.5).abs() < 0.5);
        p.draw(&mut list, &Transform::IDENTITY);
        assert_eq!(list.cmds.len(), 1);
    }

    #[test]
    fn wipe_draws_two_circles_then_settles() {
        let cfg = FieldConfig { color_mode: ColorMode::Wipe, drift: 0.0, ..FieldConfig::default() };
        let rig = Rig::new(cfg);
        let mut p = Particle::new(ParticleId(0), Vec2::new(5.0, 5.0), &rig.cfg);
        let red = Rgba::rgb(255.0, 0.0, 0.0);
        p.begin_transition(red);

        rig.step(&mut p, &[], 0);
        let mut list = DrawList::new();
        p.draw(&mut list, &Transform::IDENTITY);
        let circles: Vec<_> = list.circles().collect();
        assert_eq!(circles.len(), 2);
        assert_eq!(circles[0].1, p.diameter);
        assert!((circles[1].1 - p.diameter * rig.cfg.wipe.step).abs() < 1e-4);
        assert_eq!(circles[1].2, red);

        for frame in 1..40 {
            rig.step(&mut p, &[], frame);
        }
        assert!(p.transition.is_none());
        assert_eq!(p.color, red);
        list.clear();
        p.draw(&mut list, &Transform::IDENTITY);
        assert_eq!(list.cmds.len(), 1);
    }

    #[test]
    fn draw_goes_through_transform() {
        let cfg = quiet();
        let p = Particle::new(ParticleId(0), Vec2::new(100.0, 40.0), &cfg);
        let mut list = DrawList::new();
        p.draw(&mut list, &Transform::mirror_x(400.0));
        let (c, d, _) = list.circles().next().unwrap();
        assert_eq!(c, Vec2::new(300.0, 40.0));
        assert_eq!(d, cfg.max_diameter);
    }
}
