//! Top-level application state machine.
//!
//! `AppState` owns the [`DotField`], the hand tracker, the pointer and the
//! start gate. It consumes [`SourceEvent`]s and window [`Command`]s, steps the
//! field once per frame and draws it into a [`Framebuffer`].

use std::sync::mpsc::{self, Receiver, TryRecvError};

use glam::Vec2;
use log::{debug, info, warn};

use dot_field::gesture::BONES;
use dot_field::{Canvas, DotField, HandTracker, InfluencePoint, InputSnapshot, Rgba, Transform};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::level::{open_midi_level, LevelSource, NullLevel};
use crate::source::{spawn_hand_source, SimHandSource, SourceEvent};
use crate::visualizer::{Command, Framebuffer, Visualizer};

const STATUS_H:    usize = 16;
const STATUS_BG:   u32   = 0xC0101018;
const STATUS_TEXT: u32   = 0xFFDDDDDD;
const BONE_COLOR:  Rgba  = Rgba::rgba(255.0, 255.0, 255.0, 160.0);
const JOINT_COLOR: Rgba  = Rgba::rgba(255.0, 255.0, 255.0, 220.0);

// ════════════════════════════════════════════════════════════════════════════
// Phase — the start gate
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase { Waiting, Running }

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── simulation ───────────────────────────────────────────────────────
    field:         DotField,
    tracker:       HandTracker,

    // ── pointer / level ──────────────────────────────────────────────────
    /// Field coordinates; canvas center until the mouse moves.
    pointer:       Vec2,
    /// Manual level from the space bar, decays each frame.
    pump:          f32,

    // ── presentation ─────────────────────────────────────────────────────
    phase:         Phase,
    mirror:        bool,
    show_skeleton: bool,
    background:    Rgba,
    variant_name:  &'static str,

    pub status:    String,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Result<Self, AppError> {
        let (w, h) = (cfg.width as f32, cfg.height as f32);
        let field = DotField::new(cfg.field.clone(), w, h)?;
        // Landmarks are projected unmirrored; mirroring happens at render.
        let tracker = HandTracker::new(cfg.smoothing, cfg.field.gesture_scheme, false);
        let phase = if cfg.start_gate { Phase::Waiting } else { Phase::Running };
        info!(
            "variant {}: {}x{}, {} dots, mirror {}, start gate {}",
            cfg.variant.name(), cfg.width, cfg.height, field.particles().len(), cfg.mirror, cfg.start_gate
        );

        Ok(AppState {
            field,
            tracker,
            pointer:       Vec2::new(w, h) / 2.0,
            pump:          0.0,
            phase,
            mirror:        cfg.mirror,
            show_skeleton: cfg.skeleton,
            background:    cfg.field.background,
            variant_name:  cfg.variant.name(),
            status:        format!("{}: Tab=hand  H=2nd hand  O/F/P/0-5=pose  W=wipe  K=shock  R=reset  Q=quit", cfg.variant.name()),
        })
    }

    // ── input ─────────────────────────────────────────────────────────────

    pub fn handle_source(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Hands(hands) => {
                let (w, h) = self.field.size();
                self.tracker.observe(&hands, w, h);
            }
            SourceEvent::Quit => { /* handled in run loop */ }
        }
    }

    /// Returns false on quit.
    pub fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Pointer(p) => self.pointer = p,
            Command::Click => {
                if self.phase == Phase::Waiting {
                    info!("started");
                    self.phase = Phase::Running;
                }
            }
            Command::Pump => self.pump = 1.0,
            Command::Wipe => {
                self.status = match self.field.cycle_wipe() {
                    Some(color) => format!("wipe to {}", color),
                    None        => format!("{} does not wipe", self.variant_name),
                };
            }
            Command::Shockwave => {
                self.field.trigger_shockwave(self.pointer);
                self.status = format!("shockwave at {:.0},{:.0}", self.pointer.x, self.pointer.y);
            }
            Command::Reset => {
                self.field.reset();
                self.status = "reset".to_string();
            }
            Command::ToggleSkeleton => self.show_skeleton = !self.show_skeleton,
            Command::Quit => return false,
        }
        true
    }

    /// New canvas size: the field is rebuilt and hands are forgotten.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.field.resize(width as f32, height as f32);
        self.tracker.clear();
        self.pointer = Vec2::new(width as f32, height as f32) / 2.0;
    }

    /// What the field sees this frame. Tracked hands take over from the
    /// pointer whenever at least one is visible.
    pub fn snapshot(&self, meter: Option<f32>) -> InputSnapshot {
        let mut points = self.tracker.influences();
        if points.is_empty() {
            points.push(InfluencePoint::pointer(self.pointer));
        }
        let level = match (meter, self.pump > 0.0) {
            (Some(m), _)     => Some(m.max(self.pump)),
            (None, true)     => Some(self.pump),
            (None, false)    => None,
        };
        InputSnapshot { points, audio_level: None }.with_level(level)
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, meter: Option<f32>) {
        if self.phase == Phase::Waiting {
            return;
        }
        self.tracker.tick();
        let input = self.snapshot(meter);
        self.field.step(&input);

        self.pump *= 0.9;
        if self.pump < 0.01 {
            self.pump = 0.0;
        }
        if self.field.frame() % 300 == 0 {
            debug!(
                "frame {}: {} dots, radius {:.0}, mean displacement {:.2}",
                self.field.frame(), self.field.particles().len(), self.field.radius(), self.field.mean_displacement()
            );
        }
    }

    // ── rendering ─────────────────────────────────────────────────────────

    /// Field space → window.
    pub fn view(&self) -> Transform {
        if self.mirror {
            Transform::mirror_x(self.field.size().0)
        } else {
            Transform::IDENTITY
        }
    }

    pub fn render(&self, fb: &mut Framebuffer) {
        let view = self.view();
        fb.clear(self.background);
        self.field.render(fb, &view);

        if self.show_skeleton {
            for hand in self.tracker.hands() {
                for &(a, b) in BONES.iter() {
                    fb.line(view.point(hand.skeleton[a]), view.point(hand.skeleton[b]), BONE_COLOR);
                }
                fb.fill_circle(view.point(hand.position), 6.0, JOINT_COLOR);
            }
        }

        let (w, h) = fb.size();
        if self.phase == Phase::Waiting {
            let msg = "CLICK TO START";
            let scale = 4;
            let x = (w / 2).saturating_sub(msg.len() * 4 * scale / 2);
            fb.draw_label(msg, x, h / 2, scale, 0xFFFFFFFF);
        }

        let y = h.saturating_sub(STATUS_H);
        fb.fill_rect(0, y, w, STATUS_H, STATUS_BG);
        fb.draw_label(&self.status_line(), 6, y + 5, 1, STATUS_TEXT);
    }

    fn status_line(&self) -> String {
        let hands: Vec<String> = self.tracker.hands().iter().map(|h| h.gesture.label()).collect();
        format!(
            "{}  frame {}  dots {}  hands {}  -  {}",
            self.variant_name,
            self.field.frame(),
            self.field.particles().len(),
            if hands.is_empty() { "none".to_string() } else { hands.join(",") },
            self.status,
        )
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn field(&self)   -> &DotField { &self.field }
    pub fn phase(&self)   -> Phase     { self.phase }
    pub fn pointer(&self) -> Vec2      { self.pointer }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
fn hardware_source(enabled: bool) -> Option<Receiver<SourceEvent>> {
    enabled.then(|| spawn_hand_source(crate::source::LeapHandSource::default()))
}

#[cfg(not(feature = "leap"))]
fn hardware_source(enabled: bool) -> Option<Receiver<SourceEvent>> {
    if enabled {
        warn!("built without the `leap` feature; using keyboard simulation");
    }
    None
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`. It creates the window, the
/// hand source (simulation by default, hardware with `--features leap`), the
/// level meter, and drives the event/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    // ── Sim channel (the window feeds it, the sim source reads it) ────────
    let (sim_tx, sim_rx) = mpsc::channel();
    let hands_rx = match hardware_source(cfg.leap) {
        Some(rx) => rx,
        None => spawn_hand_source(SimHandSource { rx: sim_rx }),
    };

    let mut level: Box<dyn LevelSource> = if cfg.midi_level {
        open_midi_level(cfg.level_decay)
    } else {
        Box::new(NullLevel)
    };

    let mut vis = Visualizer::new(&cfg.title, cfg.width, cfg.height, sim_tx)?;
    let mut app = AppState::new(&cfg)?;

    while vis.is_open() {
        // 1. Window size
        if let Some((w, h)) = vis.take_resize() {
            app.resize(w, h);
        }

        // 2. Window input
        for cmd in vis.poll_input(&app.view()) {
            if !app.handle_command(cmd) {
                return Ok(());
            }
        }

        // 3. Drain hand events
        loop {
            match hands_rx.try_recv() {
                Ok(SourceEvent::Quit)           => return Ok(()),
                Ok(evt)                         => app.handle_source(evt),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("hand source stopped");
                    return Ok(());
                }
            }
        }

        // 4. Per-frame logic
        app.tick(level.level());

        // 5. Render
        app.render(vis.frame());
        vis.present()?;
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
