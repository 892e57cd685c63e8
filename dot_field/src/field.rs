//! The simulation state owned by the frame loop.
//!
//! `DotField` holds everything that persists between frames: the particle
//! set, the shockwave, the clap latch, the radius modulator and the pending
//! event queue. Construction builds the particle set for a canvas size;
//! [`DotField::resize`] rebuilds it from scratch and cancels every pending
//! event, since those refer to particles that no longer exist.

use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::canvas::{Canvas, Transform};
use crate::color::Rgba;
use crate::config::{ColorMode, FieldConfig};
use crate::error::ConfigError;
use crate::gesture::Gesture;
use crate::grid::build_origins;
use crate::input::{ClapDetector, InputSnapshot};
use crate::level::RadiusModulator;
use crate::noise::NoiseField;
use crate::particle::{FrameInputs, Influence, Particle, ParticleId};
use crate::schedule::{Effect, EventQueue};
use crate::shockwave::Shockwave;

pub struct DotField {
    config:     FieldConfig,
    width:      f32,
    height:     f32,
    /// Sorted by id; ids only ever grow.
    particles:  Vec<Particle>,
    next_id:    u64,
    frame:      u64,
    radius:     f32,
    influences: Vec<Influence>,
    shockwave:  Shockwave,
    clap:       ClapDetector,
    modulator:  RadiusModulator,
    queue:      EventQueue,
    noise:      NoiseField,
    rng:        StdRng,
    wipe_index: usize,
}

impl DotField {
    /// Validate `config` and lay out particles for a `width × height` canvas.
    pub fn new(config: FieldConfig, width: f32, height: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut field = DotField {
            width,
            height,
            particles:  Vec::new(),
            next_id:    0,
            frame:      0,
            radius:     config.influence_radius,
            influences: Vec::new(),
            shockwave:  Shockwave::new(&config.shockwave),
            clap:       ClapDetector::new(&config.clap),
            modulator:  RadiusModulator::new(&config.level, config.influence_radius),
            queue:      EventQueue::new(),
            noise:      NoiseField::new(config.seed),
            rng:        StdRng::seed_from_u64(config.seed),
            wipe_index: 0,
            config,
        };
        field.rebuild();
        info!(
            "dot field {}x{}: {} particles, layout {:?}",
            width, height, field.particles.len(), field.config.layout
        );
        Ok(field)
    }

    fn rebuild(&mut self) {
        let origins = build_origins(
            self.config.layout,
            self.width,
            self.height,
            self.config.spacing,
            &mut self.rng,
        );
        self.particles.clear();
        for origin in origins {
            let id = self.fresh_id();
            self.particles.push(Particle::new(id, origin, &self.config));
        }
    }

    fn fresh_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// New canvas size: fresh particle set at rest, pending events dropped.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width  = width;
        self.height = height;
        let dropped = self.queue.len();
        self.queue.clear();
        self.rebuild();
        info!(
            "resized to {}x{}: {} particles ({} pending events dropped)",
            width, height, self.particles.len(), dropped
        );
    }

    /// Rebuild at the current size.
    pub fn reset(&mut self) {
        self.resize(self.width, self.height);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Frame
    // ════════════════════════════════════════════════════════════════════════

    /// Advance one frame against `input`.
    pub fn step(&mut self, input: &InputSnapshot) {
        self.fire_due_events();

        self.radius = self.modulator.radius(input.audio_level, self.frame);
        self.influences = input.points
            .iter()
            .map(|p| Influence::new(p, self.radius, self.config.repulsion_strength))
            .collect();

        if self.config.shockwave.enabled {
            if let Some(center) = self.clap.update(&input.points) {
                info!("clap at ({:.0}, {:.0}): shockwave", center.x, center.y);
                self.shockwave.trigger(center);
            }
        }

        if self.config.creator.enabled {
            self.run_creator();
        }

        let frame = FrameInputs {
            config:     &self.config,
            influences: &self.influences,
            shockwave:  &self.shockwave,
            noise:      &self.noise,
            frame:      self.frame,
            radius:     self.radius,
        };
        for p in &mut self.particles {
            p.update(&frame);
        }

        self.shockwave.tick();
        self.frame += 1;
    }

    fn fire_due_events(&mut self) {
        for ev in self.queue.drain_due(self.frame) {
            // Destroyed targets are simply skipped.
            if let Ok(i) = self.particles.binary_search_by_key(&ev.target, |p| p.id) {
                match ev.effect {
                    Effect::BeginTransition(to) => self.particles[i].begin_transition(to),
                }
            }
        }
    }

    fn run_creator(&mut self) {
        let cfg = self.config.creator.clone();
        let points: Vec<(Vec2, Gesture)> =
            self.influences.iter().map(|i| (i.position, i.gesture)).collect();
        for (pos, gesture) in points {
            match gesture {
                Gesture::Pointing if self.frame % cfg.spawn_interval.max(1) == 0 => {
                    self.spawn(pos);
                }
                Gesture::Fist => {
                    let n = self.destroy_near(pos, cfg.black_hole_radius);
                    if n > 0 {
                        debug!("black hole at ({:.0}, {:.0}) swallowed {}", pos.x, pos.y, n);
                    }
                }
                _ => {}
            }
        }
    }

    /// Draw every particle in id order.
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C, transform: &Transform) {
        for p in &self.particles {
            p.draw(canvas, transform);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Commands
    // ════════════════════════════════════════════════════════════════════════

    /// Fire a shockwave at `center` regardless of clap detection.
    pub fn trigger_shockwave(&mut self, center: Vec2) {
        self.shockwave.trigger(center);
    }

    /// Add one particle with its origin at `at`. `None` at the cap.
    pub fn spawn(&mut self, at: Vec2) -> Option<ParticleId> {
        if self.particles.len() >= self.config.creator.max_particles {
            return None;
        }
        let id = self.fresh_id();
        self.particles.push(Particle::new(id, at, &self.config));
        Some(id)
    }

    /// Remove every particle currently within `radius` of `at`.
    pub fn destroy_near(&mut self, at: Vec2, radius: f32) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.position.distance(at) >= radius);
        before - self.particles.len()
    }

    /// Schedule a radial wipe to `color`, starting at the canvas center and
    /// reaching each particle after `distance * stagger` frames.
    ///
    /// Only fields in [`ColorMode::Wipe`] animate transitions; elsewhere the
    /// color follows the dynamics, so this returns `false` and schedules
    /// nothing.
    pub fn begin_wipe(&mut self, color: Rgba) -> bool {
        if self.config.color_mode != ColorMode::Wipe {
            debug!("wipe ignored in {:?} color mode", self.config.color_mode);
            return false;
        }
        let center  = Vec2::new(self.width, self.height) / 2.0;
        let stagger = self.config.wipe.stagger.max(0.0);
        for p in &self.particles {
            let delay = (p.origin().distance(center) * stagger).round() as u64;
            self.queue.schedule(self.frame + delay, p.id, Effect::BeginTransition(color));
        }
        debug!("wipe to {} scheduled for {} particles", color, self.particles.len());
        true
    }

    /// Wipe to the next color of the palette cycle and return it, or `None`
    /// when the field does not wipe.
    pub fn cycle_wipe(&mut self) -> Option<Rgba> {
        if self.config.color_mode != ColorMode::Wipe {
            return None;
        }
        let steps = &self.config.palette.finger_steps;
        let color = match steps.get(self.wipe_index % steps.len().max(1)) {
            Some(&c) => {
                self.wipe_index = (self.wipe_index + 1) % steps.len();
                c
            }
            None => self.config.palette.default,
        };
        self.begin_wipe(color);
        Some(color)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &FieldConfig        { &self.config }
    pub fn particles(&self) -> &[Particle]      { &self.particles }
    pub fn frame(&self) -> u64                  { self.frame }
    pub fn size(&self) -> (f32, f32)            { (self.width, self.height) }
    pub fn shockwave(&self) -> &Shockwave       { &self.shockwave }
    pub fn pending_events(&self) -> usize       { self.queue.len() }
    /// Effective influence radius used on the last frame.
    pub fn radius(&self) -> f32                 { self.radius }
    /// Last frame's influence points after gesture scaling.
    pub fn influences(&self) -> &[Influence]    { &self.influences }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.particles[i])
    }

    /// Mean distance from origin; zero for an empty or settled field.
    pub fn mean_displacement(&self) -> f32 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(Particle::displacement).sum::<f32>() / self.particles.len() as f32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawList;
    use crate::config::{CreatorConfig, Layout, LevelConfig, ShockwaveConfig, Variant};
    use crate::input::InfluencePoint;

    fn empty_field(cfg: FieldConfig) -> DotField {
        DotField::new(FieldConfig { layout: Layout::Scatter { count: 0 }, ..cfg }, 800.0, 600.0)
            .unwrap()
    }

    fn hand(id: u32, pos: Vec2, gesture: Gesture) -> InfluencePoint {
        InfluencePoint { id, position: pos, gesture }
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = FieldConfig { damping: 1.5, ..FieldConfig::default() };
        assert!(DotField::new(cfg, 100.0, 100.0).is_err());
    }

    #[test]
    fn lattice_size_follows_canvas() {
        let cfg = FieldConfig { spacing: 60.0, ..FieldConfig::default() };
        let field = DotField::new(cfg, 800.0, 600.0).unwrap();
        assert_eq!(field.particles().len(), 13 * 10);
    }

    #[test]
    fn far_pointer_leaves_corner_particle_at_rest() {
        let mut field = empty_field(FieldConfig::default());
        let id = field.spawn(Vec2::ZERO).unwrap();
        let input = InputSnapshot::pointer(Vec2::new(400.0, 300.0));
        for _ in 0..120 {
            field.step(&input);
        }
        let p = field.particle(id).unwrap();
        assert_eq!(p.position, Vec2::ZERO);
        assert_eq!(p.diameter, field.config().max_diameter);
    }

    #[test]
    fn idle_field_settles() {
        let mut field = DotField::new(FieldConfig::default(), 300.0, 300.0).unwrap();
        let push = InputSnapshot::pointer(Vec2::new(150.0, 150.0));
        for _ in 0..10 {
            field.step(&push);
        }
        assert!(field.mean_displacement() > 1.0);
        for _ in 0..600 {
            field.step(&InputSnapshot::empty());
        }
        assert!(field.mean_displacement() < 1e-3);
        let max = field.config().max_diameter;
        assert!(field.particles().iter().all(|p| (p.diameter - max).abs() < 1e-2));
    }

    #[test]
    fn resize_rebuilds_and_cancels_events() {
        let cfg = FieldConfig { color_mode: ColorMode::Wipe, ..FieldConfig::default() };
        let mut field = DotField::new(cfg, 300.0, 300.0).unwrap();
        field.begin_wipe(Rgba::WHITE);
        assert_eq!(field.pending_events(), field.particles().len());

        field.resize(600.0, 300.0);
        assert_eq!(field.pending_events(), 0);
        assert_eq!(field.particles().len(), 20 * 10);
        assert!(field.particles().iter().all(|p| p.velocity == Vec2::ZERO));
        for _ in 0..200 {
            field.step(&InputSnapshot::empty());
        }
        assert!(field.particles().iter().all(|p| p.transition.is_none()));
    }

    #[test]
    fn wipe_starts_at_center_and_spreads() {
        let cfg = FieldConfig {
            color_mode: ColorMode::Wipe,
            layout:     Layout::Scatter { count: 0 },
            ..FieldConfig::default()
        };
        let mut field = DotField::new(cfg, 400.0, 400.0).unwrap();
        let center = field.spawn(Vec2::new(200.0, 200.0)).unwrap();
        let edge   = field.spawn(Vec2::new(0.0, 200.0)).unwrap();
        let red = Rgba::rgb(255.0, 0.0, 0.0);
        field.begin_wipe(red);

        field.step(&InputSnapshot::empty());
        assert!(field.particle(center).unwrap().transition.is_some());
        assert!(field.particle(edge).unwrap().transition.is_none());

        // 200px * 0.08 = 16 frames
        for _ in 0..16 {
            field.step(&InputSnapshot::empty());
        }
        assert!(field.particle(edge).unwrap().transition.is_some());
        for _ in 0..40 {
            field.step(&InputSnapshot::empty());
        }
        assert_eq!(field.particle(edge).unwrap().color, red);
        assert_eq!(field.pending_events(), 0);
    }

    #[test]
    fn events_for_destroyed_particles_are_skipped() {
        let cfg = FieldConfig { color_mode: ColorMode::Wipe, ..FieldConfig::default() };
        let mut field = empty_field(cfg);
        let a = field.spawn(Vec2::new(10.0, 10.0)).unwrap();
        let b = field.spawn(Vec2::new(700.0, 500.0)).unwrap();
        field.begin_wipe(Rgba::WHITE);
        assert_eq!(field.destroy_near(Vec2::new(10.0, 10.0), 5.0), 1);
        for _ in 0..100 {
            field.step(&InputSnapshot::empty());
        }
        assert!(field.particle(a).is_none());
        assert_eq!(field.particle(b).unwrap().color, Rgba::WHITE);
    }

    #[test]
    fn cycle_wipe_walks_palette() {
        let mut field = DotField::new(FieldConfig::for_variant(Variant::Wipe), 200.0, 200.0).unwrap();
        let steps = field.config().palette.finger_steps.clone();
        assert_eq!(field.cycle_wipe(), Some(steps[0]));
        assert_eq!(field.cycle_wipe(), Some(steps[1 % steps.len()]));
        for _ in 2..steps.len() {
            field.cycle_wipe();
        }
        assert_eq!(field.cycle_wipe(), Some(steps[0]));
    }

    #[test]
    fn wipe_outside_wipe_mode_keeps_color_live() {
        let mut field = empty_field(FieldConfig::for_variant(Variant::Gesture));
        let id = field.spawn(Vec2::new(400.0, 300.0)).unwrap();
        assert_eq!(field.cycle_wipe(), None);
        assert!(!field.begin_wipe(Rgba::WHITE));
        assert_eq!(field.pending_events(), 0);

        let input = InputSnapshot { points: vec![hand(0, Vec2::new(400.0, 310.0), Gesture::Open)], audio_level: None };
        for _ in 0..300 {
            field.step(&input);
        }
        let open = Gesture::Open.color(&field.config().palette);
        let p = field.particle(id).unwrap();
        assert!(p.transition.is_none());
        assert!(p.color.distance(open) < 1.0);

        let mut list = DrawList::new();
        field.render(&mut list, &Transform::IDENTITY);
        let drawn: Vec<_> = list.circles().collect();
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].2.distance(open) < 1.0);
    }

    #[test]
    fn clap_triggers_shockwave_once() {
        let cfg = FieldConfig {
            shockwave: ShockwaveConfig { enabled: true, ..ShockwaveConfig::default() },
            ..FieldConfig::default()
        };
        let mut field = empty_field(cfg);
        let apart = InputSnapshot {
            points: vec![hand(1, Vec2::new(100.0, 300.0), Gesture::Open), hand(2, Vec2::new(700.0, 300.0), Gesture::Open)],
            audio_level: None,
        };
        let together = InputSnapshot {
            points: vec![hand(1, Vec2::new(390.0, 300.0), Gesture::Open), hand(2, Vec2::new(410.0, 300.0), Gesture::Open)],
            audio_level: None,
        };
        field.step(&apart);
        assert!(!field.shockwave().is_active());
        field.step(&together);
        assert!(field.shockwave().is_active());
        assert_eq!(field.shockwave().center, Vec2::new(400.0, 300.0));
        // 30 * 0.9 after the trigger frame
        assert!((field.shockwave().strength - 27.0).abs() < 1e-4);
        field.step(&together);
        assert!((field.shockwave().strength - 24.3).abs() < 1e-3);
    }

    #[test]
    fn creator_spawns_and_black_hole_swallows() {
        let cfg = FieldConfig {
            creator: CreatorConfig { enabled: true, spawn_interval: 2, max_particles: 3, black_hole_radius: 40.0 },
            ..FieldConfig::default()
        };
        let mut field = empty_field(cfg);
        let point = InputSnapshot { points: vec![hand(1, Vec2::new(400.0, 300.0), Gesture::Pointing)], audio_level: None };
        for _ in 0..10 {
            field.step(&point);
        }
        assert_eq!(field.particles().len(), 3);

        // let them spring back onto the spawn point
        for _ in 0..300 {
            field.step(&InputSnapshot::empty());
        }
        let fist = InputSnapshot { points: vec![hand(1, Vec2::new(400.0, 300.0), Gesture::Fist)], audio_level: None };
        field.step(&fist);
        assert!(field.particles().is_empty());
    }

    #[test]
    fn level_drives_radius() {
        let cfg = FieldConfig {
            level: LevelConfig { enabled: true, min_radius: 100.0, max_radius: 300.0, ..LevelConfig::default() },
            ..FieldConfig::default()
        };
        let mut field = empty_field(cfg);
        field.step(&InputSnapshot::empty().with_level(Some(0.5)));
        assert_eq!(field.radius(), 200.0);
        let open = InputSnapshot { points: vec![hand(1, Vec2::ZERO, Gesture::Open)], audio_level: Some(0.0) };
        field.step(&open);
        assert_eq!(field.influences()[0].radius, 250.0);
    }

    #[test]
    fn render_submits_one_circle_per_particle() {
        let field = DotField::new(FieldConfig::default(), 300.0, 300.0).unwrap();
        let mut list = DrawList::new();
        field.render(&mut list, &Transform::IDENTITY);
        assert_eq!(list.cmds.len(), field.particles().len());
    }

    #[test]
    fn reveal_hides_everything_without_input() {
        let mut field = DotField::new(FieldConfig::for_variant(Variant::Reveal), 300.0, 300.0).unwrap();
        field.step(&InputSnapshot::empty());
        let mut list = DrawList::new();
        field.render(&mut list, &Transform::IDENTITY);
        assert!(list.cmds.is_empty());
    }
}
