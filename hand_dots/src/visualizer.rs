//! Software-rendered visualizer using `minifb`.
//!
//! [`Framebuffer`] is the drawing surface: an ARGB pixel buffer implementing
//! [`Canvas`] with alpha-blended circles and lines, plus the small bitmap
//! font for the status bar. [`Visualizer`] owns the window, presents the
//! buffer, follows window resizes and turns keys and mouse into
//! [`Command`]s and [`SimInput`]s.

use glam::Vec2;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use std::sync::mpsc::Sender;

use dot_field::{Canvas, Rgba, Transform};

use crate::error::AppError;
use crate::source::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Command — what the window asks of the app
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Pointer moved, field coordinates.
    Pointer(Vec2),
    /// Mouse pressed (passes the start gate).
    Click,
    /// Push the manual level to full.
    Pump,
    /// Radial color wipe to the next palette color.
    Wipe,
    /// Shockwave at the pointer.
    Shockwave,
    /// Rebuild the field.
    Reset,
    ToggleSkeleton,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Framebuffer
// ════════════════════════════════════════════════════════════════════════════

pub struct Framebuffer {
    width:   usize,
    height:  usize,
    pub buf: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer { width, height, buf: vec![0xFF000000; width * height] }
    }

    pub fn size(&self) -> (usize, usize) { (self.width, self.height) }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width  = width;
        self.height = height;
        self.buf    = vec![0xFF000000; width * height];
    }

    pub fn clear(&mut self, color: Rgba) {
        self.buf.fill(color.to_argb() | 0xFF000000);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// Blend `color` over the pixel at `(x, y)` using its alpha.
    fn blend_pixel(&mut self, x: isize, y: isize, color: Rgba) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let i = y as usize * self.width + x as usize;
        let t = color.a / 255.0;
        self.buf[i] = if t >= 1.0 {
            color.to_argb() | 0xFF000000
        } else {
            blend(self.buf[i], color.to_argb(), t)
        };
    }

    /// Minimal bitmap font — 3×5 characters, scaled by `scale`.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(cx + col * scale + dx, y + row * scale + dy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.width { break; }
        }
    }
}

impl Canvas for Framebuffer {
    /// Pixels whose centers fall inside the circle.
    fn fill_circle(&mut self, center: Vec2, diameter: f32, color: Rgba) {
        let r = diameter / 2.0;
        if r <= 0.0 || color.a <= 0.0 {
            return;
        }
        let r2 = r * r;
        let x0 = (center.x - r).floor() as isize;
        let x1 = (center.x + r).ceil() as isize;
        let y0 = (center.y - r).floor() as isize;
        let y1 = (center.y + r).ceil() as isize;
        for y in y0.max(0)..=y1.min(self.height as isize - 1) {
            let dy = y as f32 + 0.5 - center.y;
            for x in x0.max(0)..=x1.min(self.width as isize - 1) {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Bresenham.
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        let (mut x, mut y) = (from.x.round() as isize, from.y.round() as isize);
        let (x1, y1) = (to.x.round() as isize, to.y.round() as isize);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.blend_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    fb:         Framebuffer,
    sim_tx:     Sender<SimInput>,
    last_mouse: Option<Vec2>,
    was_down:   bool,
}

impl Visualizer {
    pub fn new(title: &str, width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            title,
            width, height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            fb: Framebuffer::new(width, height),
            sim_tx,
            last_mouse: None,
            was_down:   false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    pub fn frame(&mut self) -> &mut Framebuffer { &mut self.fb }

    /// New size if the window was resized since the last call.
    pub fn take_resize(&mut self) -> Option<(usize, usize)> {
        let (w, h) = self.window.get_size();
        if w == 0 || h == 0 || (w, h) == self.fb.size() {
            return None;
        }
        self.fb.resize(w, h);
        Some((w, h))
    }

    /// Poll keyboard and mouse. Hand keys go to the simulator; the rest come
    /// back as commands. `view` maps field space to the window.
    pub fn poll_input(&mut self, view: &Transform) -> Vec<Command> {
        let mut out = Vec::new();
        if !self.window.is_open() {
            out.push(Command::Quit);
            return out;
        }

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Quit));
            out.push(Command::Quit);
            return out;
        }

        let sim_keys = [
            (Key::Tab, SimKey::ToggleHand),
            (Key::H,   SimKey::ToggleSecond),
            (Key::O,   SimKey::Open),
            (Key::F,   SimKey::Fist),
            (Key::P,   SimKey::Pointing),
            (Key::Key0, SimKey::Count(0)),
            (Key::Key1, SimKey::Count(1)),
            (Key::Key2, SimKey::Count(2)),
            (Key::Key3, SimKey::Count(3)),
            (Key::Key4, SimKey::Count(4)),
            (Key::Key5, SimKey::Count(5)),
        ];
        for (key, sim) in sim_keys {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimInput::KeyDown(sim));
            }
        }

        let commands = [
            (Key::W, Command::Wipe),
            (Key::K, Command::Shockwave),
            (Key::R, Command::Reset),
            (Key::L, Command::ToggleSkeleton),
        ];
        for (key, cmd) in commands {
            if one_shot(key) {
                out.push(cmd);
            }
        }
        // Space repeats while held
        if self.window.is_key_pressed(Key::Space, KeyRepeat::Yes) {
            out.push(Command::Pump);
        }

        // ── mouse ─────────────────────────────────────────────────────────
        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
            let m = Vec2::new(mx, my);
            if self.last_mouse != Some(m) {
                self.last_mouse = Some(m);
                let p = view.inverse().point(m);
                let (w, h) = self.fb.size();
                out.push(Command::Pointer(p));
                let _ = self.sim_tx.send(SimInput::Mouse(p / Vec2::new(w as f32, h as f32)));
            }
        }
        let down = self.window.get_mouse_down(MouseButton::Left);
        if down && !self.was_down {
            out.push(Command::Click);
        }
        self.was_down = down;

        out
    }

    /// Push the framebuffer to the window.
    pub fn present(&mut self) -> Result<(), AppError> {
        let (w, h) = self.fb.size();
        self.window.update_with_buffer(&self.fb.buf, w, h)?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::rgb(255.0, 0.0, 0.0);

    #[test]
    fn circle_covers_center_not_corners() {
        let mut fb = Framebuffer::new(40, 40);
        fb.clear(Rgba::BLACK);
        fb.fill_circle(Vec2::new(20.0, 20.0), 10.0, RED);
        assert_eq!(fb.pixel(20, 20), Some(0xFFFF0000));
        assert_eq!(fb.pixel(24, 20), Some(0xFFFF0000));
        assert_eq!(fb.pixel(26, 20), Some(0xFF000000));
        assert_eq!(fb.pixel(24, 24), Some(0xFF000000));
    }

    #[test]
    fn half_alpha_blends() {
        let mut fb = Framebuffer::new(10, 10);
        fb.clear(Rgba::BLACK);
        fb.fill_circle(Vec2::new(5.0, 5.0), 4.0, RED.with_alpha(127.5));
        assert_eq!(fb.pixel(5, 5), Some(0xFF800000));
    }

    #[test]
    fn clipped_shapes_do_not_panic() {
        let mut fb = Framebuffer::new(16, 16);
        fb.fill_circle(Vec2::new(-5.0, 30.0), 40.0, RED);
        fb.line(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0), RED);
        fb.draw_label("OUT OF BOUNDS 123", 10, 14, 2, 0xFFFFFFFF);
        assert_eq!(fb.pixel(0, 0), Some(0xFFFF0000));
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut fb = Framebuffer::new(20, 20);
        fb.clear(Rgba::BLACK);
        fb.line(Vec2::new(2.0, 3.0), Vec2::new(15.0, 11.0), Rgba::WHITE);
        assert_eq!(fb.pixel(2, 3), Some(0xFFFFFFFF));
        assert_eq!(fb.pixel(15, 11), Some(0xFFFFFFFF));
    }

    #[test]
    fn resize_reallocates() {
        let mut fb = Framebuffer::new(4, 4);
        fb.resize(8, 3);
        assert_eq!(fb.size(), (8, 3));
        assert_eq!(fb.buf.len(), 24);
        assert_eq!(fb.pixel(8, 0), None);
    }
}
