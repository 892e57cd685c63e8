//! Origin layout: lattice, legacy fixed grid, or random scatter.

use glam::Vec2;
use rand::Rng;

use crate::config::Layout;

/// Lattice dimensions and margins for a `width × height` canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeSpec {
    pub cols:   usize,
    pub rows:   usize,
    pub offset: Vec2,
}

impl LatticeSpec {
    /// `floor(W/s) × floor(H/s)` with the leftover split evenly on both sides.
    pub fn new(width: f32, height: f32, spacing: f32) -> Self {
        let cols = (width / spacing).floor().max(0.0) as usize;
        let rows = (height / spacing).floor().max(0.0) as usize;
        let offset = Vec2::new(
            (width  - cols as f32 * spacing) / 2.0 + spacing / 2.0,
            (height - rows as f32 * spacing) / 2.0 + spacing / 2.0,
        );
        LatticeSpec { cols, rows, offset }
    }
}

/// Build the origin list for one canvas size.
///
/// Lattice and legacy layouts are fully deterministic; scatter draws from
/// `rng`.
pub fn build_origins<R: Rng + ?Sized>(
    layout:  Layout,
    width:   f32,
    height:  f32,
    spacing: f32,
    rng:     &mut R,
) -> Vec<Vec2> {
    match layout {
        Layout::Lattice => {
            let spec = LatticeSpec::new(width, height, spacing);
            let mut out = Vec::with_capacity(spec.cols * spec.rows);
            for i in 0..spec.cols {
                for j in 0..spec.rows {
                    out.push(spec.offset + Vec2::new(i as f32, j as f32) * spacing);
                }
            }
            out
        }
        Layout::Legacy { cols, rows } => {
            let mut out = Vec::with_capacity(cols * rows);
            for i in 0..cols {
                for j in 0..rows {
                    out.push(Vec2::new(
                        spread(i, cols, 2.0 * spacing, width  - 2.0 * spacing),
                        spread(j, rows, 2.0 * spacing, height - 2.0 * spacing),
                    ));
                }
            }
            out
        }
        Layout::Scatter { count } => {
            if width <= 0.0 || height <= 0.0 {
                return Vec::new();
            }
            (0..count)
                .map(|_| Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)))
                .collect()
        }
    }
}

/// Map index `i` of `n` linearly onto `[lo, hi]`; a single index sits midway.
fn spread(i: usize, n: usize, lo: f32, hi: f32) -> f32 {
    if n <= 1 {
        return (lo + hi) / 2.0;
    }
    lo + (hi - lo) * i as f32 / (n - 1) as f32
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
