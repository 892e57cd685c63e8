//! Seeded 3D gradient noise for the ambient drift.
//!
//! The field samples `(x, y, t)` once per particle per frame, so the only
//! requirements are smoothness in all three axes and determinism for a given
//! seed. Output is in `[0, 1]`, summed over a few octaves.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Gradient noise with its own shuffled permutation table.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perm:    [u8; 512],
    octaves: u32,
    falloff: f32,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        NoiseField { perm, octaves: 4, falloff: 0.5 }
    }

    /// Fractal sum of [`Self::perlin3`], normalised back into `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let mut sum  = 0.0;
        let mut amp  = 1.0;
        let mut norm = 0.0;
        let mut freq = 1.0;
        for _ in 0..self.octaves {
            sum  += self.perlin3(x * freq, y * freq, z * freq) * amp;
            norm += amp;
            amp  *= self.falloff;
            freq *= 2.0;
        }
        if norm > 0.0 { (sum / norm).clamp(0.0, 1.0) } else { 0.5 }
    }

    /// Single-octave Perlin noise in `[0, 1]`.
    pub fn perlin3(&self, x: f32, y: f32, z: f32) -> f32 {
        let (xi, xf) = split(x);
        let (yi, yf) = split(y);
        let (zi, zf) = split(z);

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let h = |dx: usize, dy: usize, dz: usize| -> u8 {
            let a = self.perm[xi + dx] as usize;
            let b = self.perm[a + yi + dy] as usize;
            self.perm[b + zi + dz]
        };

        let x00 = lerp(grad(h(0, 0, 0), xf, yf, zf),             grad(h(1, 0, 0), xf - 1.0, yf, zf),             u);
        let x10 = lerp(grad(h(0, 1, 0), xf, yf - 1.0, zf),       grad(h(1, 1, 0), xf - 1.0, yf - 1.0, zf),       u);
        let x01 = lerp(grad(h(0, 0, 1), xf, yf, zf - 1.0),       grad(h(1, 0, 1), xf - 1.0, yf, zf - 1.0),       u);
        let x11 = lerp(grad(h(0, 1, 1), xf, yf - 1.0, zf - 1.0), grad(h(1, 1, 1), xf - 1.0, yf - 1.0, zf - 1.0), u);

        let y0 = lerp(x00, x10, v);
        let y1 = lerp(x01, x11, v);

        (lerp(y0, y1, w) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        NoiseField::new(0)
    }
}

/// Lattice cell (wrapped to 0..256) and fractional offset.
#[inline]
fn split(v: f32) -> (usize, f32) {
    let f = v.floor();
    ((f as i64).rem_euclid(256) as usize, v - f)
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = match h {
        0..=3     => y,
        12 | 14   => x,
        _         => z,
    };
    (if h & 1 != 0 { -u } else { u }) + (if h & 2 != 0 { -v } else { v })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_in_unit_range() {
        let n = NoiseField::new(7);
        for i in 0..200 {
            let t = i as f32 * 0.173;
            let v = n.sample(t * 3.1, -t * 1.7, t);
            assert!((0.0..=1.0).contains(&v), "sample {} out of range", v);
        }
    }

    #[test]
    fn same_seed_same_values() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        assert_eq!(a.sample(1.25, 2.5, 3.75), b.sample(1.25, 2.5, 3.75));
    }

    #[test]
    fn lattice_points_sit_at_midpoint() {
        // Gradient noise is zero on integer lattice points.
        let n = NoiseField::new(3);
        assert!((n.perlin3(4.0, 9.0, 2.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn small_steps_give_small_changes() {
        let n = NoiseField::new(11);
        let a = n.sample(10.0, 20.0, 0.5);
        let b = n.sample(10.0, 20.0, 0.505);
        assert!((a - b).abs() < 0.05);
    }

    #[test]
    fn negative_coordinates_are_fine() {
        let n = NoiseField::new(1);
        let v = n.sample(-123.4, -0.01, -5.0);
        assert!((0.0..=1.0).contains(&v));
    }
}
