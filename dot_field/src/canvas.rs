//! Render seam: what a particle needs from a drawing surface, and the
//! explicit coordinate transform threaded through every draw call.

use glam::{Affine2, Vec2};

use crate::color::Rgba;

/// Anything that can take filled circles and lines.
pub trait Canvas {
    fn fill_circle(&mut self, center: Vec2, diameter: f32, color: Rgba);

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba);
}

// ════════════════════════════════════════════════════════════════════════════
// Transform
// ════════════════════════════════════════════════════════════════════════════

/// Field space → surface space. Passed to every draw call instead of living
/// as renderer state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform(pub Affine2);

impl Transform {
    pub const IDENTITY: Transform = Transform(Affine2::IDENTITY);

    /// Horizontal flip about the center of a `width`-wide canvas.
    pub fn mirror_x(width: f32) -> Self {
        Transform(Affine2::from_cols(Vec2::new(-1.0, 0.0), Vec2::Y, Vec2::new(width, 0.0)))
    }

    /// Surface space → field space.
    pub fn inverse(&self) -> Transform {
        Transform(self.0.inverse())
    }

    pub fn point(&self, p: Vec2) -> Vec2 {
        self.0.transform_point2(p)
    }

    /// Lengths scale by the x-axis magnitude (transforms here are uniform).
    pub fn length(&self, l: f32) -> f32 {
        l * self.0.matrix2.x_axis.length()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DrawList — a canvas that just records
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCmd {
    Circle { center: Vec2, diameter: f32, color: Rgba },
    Line   { from: Vec2, to: Vec2, color: Rgba },
}

/// Records draw calls in submission order.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        DrawList::default()
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Rgba)> + '_ {
        self.cmds.iter().filter_map(|c| match *c {
            DrawCmd::Circle { center, diameter, color } => Some((center, diameter, color)),
            DrawCmd::Line { .. } => None,
        })
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }
}

impl Canvas for DrawList {
    fn fill_circle(&mut self, center: Vec2, diameter: f32, color: Rgba) {
        self.cmds.push(DrawCmd::Circle { center, diameter, color });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        self.cmds.push(DrawCmd::Line { from, to, color });
    }
}
