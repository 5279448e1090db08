//! Seeded permutation-table gradient noise.
//!
//! Each field owns its own 512-entry table and is immutable after
//! construction, so one instance can be sampled from any number of threads.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg64Mcg;

#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl NoiseField {
    /// Pcg64Mcg has a fixed output stream, so a saved seed rebuilds the
    /// same table on every platform.
    pub fn new(seed: u32) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut rng = Pcg64Mcg::seed_from_u64(seed as u64);
        table.shuffle(&mut rng);

        let perm = std::array::from_fn(|i| table[i & 255]);
        NoiseField { perm }
    }

    #[inline]
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(t: f64, a: f64, b: f64) -> f64 {
        a + t * (b - a)
    }

    #[inline]
    fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
        let h = hash & 15;
        let u = if h < 8 { x } else { y };
        let v = if h < 4 {
            y
        } else if h == 12 || h == 14 {
            x
        } else {
            z
        };
        (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    /// Gradient noise in `[-1, 1]`. Exactly zero on integer lattice points.
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
        let xi = (fx as i64 & 255) as usize;
        let yi = (fy as i64 & 255) as usize;
        let zi = (fz as i64 & 255) as usize;
        let (x, y, z) = (x - fx, y - fy, z - fz);
        let (u, v, w) = (Self::fade(x), Self::fade(y), Self::fade(z));

        let a = self.p(xi) + yi;
        let aa = self.p(a) + zi;
        let ab = self.p(a + 1) + zi;
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b) + zi;
        let bb = self.p(b + 1) + zi;

        let g = |i: usize, dx: f64, dy: f64, dz: f64| Self::grad(self.perm[i], dx, dy, dz);

        let n = Self::lerp(
            w,
            Self::lerp(
                v,
                Self::lerp(u, g(aa, x, y, z), g(ba, x - 1.0, y, z)),
                Self::lerp(u, g(ab, x, y - 1.0, z), g(bb, x - 1.0, y - 1.0, z)),
            ),
            Self::lerp(
                v,
                Self::lerp(u, g(aa + 1, x, y, z - 1.0), g(ba + 1, x - 1.0, y, z - 1.0)),
                Self::lerp(
                    u,
                    g(ab + 1, x, y - 1.0, z - 1.0),
                    g(bb + 1, x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        );
        n.clamp(-1.0, 1.0)
    }

    /// Horizontal slice at `y = 0`.
    #[inline]
    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        self.sample(x, 0.0, z)
    }

    /// Sharp crests, `(1 - |n|)^2`, in `[0, 1]`.
    pub fn ridge(&self, x: f64, y: f64, z: f64) -> f64 {
        let n = 1.0 - self.sample(x, y, z).abs();
        n * n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let a = NoiseField::new(7);
        let b = NoiseField::new(7);
        for i in 0..200 {
            let (x, y, z) = (i as f64 * 0.37, i as f64 * -0.11, i as f64 * 1.93);
            assert_eq!(a.sample(x, y, z).to_bits(), b.sample(x, y, z).to_bits());
        }
    }

    #[test]
    fn permutation_is_pinned_for_a_seed() {
        let noise = NoiseField::new(1);
        assert_eq!(noise.perm[..8], [54, 15, 127, 234, 185, 136, 93, 57]);
        assert_eq!(noise.perm[256..264], noise.perm[..8]);
        assert_eq!(NoiseField::new(7).perm[..8], [86, 51, 35, 168, 81, 185, 200, 162]);

        let mut seen = [false; 256];
        for &p in &noise.perm[..256] {
            seen[p as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn different_seeds_differ_somewhere() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let differs = (0..100).any(|i| {
            let x = i as f64 * 0.731 + 0.5;
            a.sample(x, 0.25, x * 0.5) != b.sample(x, 0.25, x * 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn sample_and_ridge_stay_in_range() {
        let noise = NoiseField::new(3);
        for i in -300..300 {
            let x = i as f64 * 0.173;
            let z = i as f64 * -0.291 + 4.0;
            let n = noise.sample(x, x * 0.5, z);
            assert!((-1.0..=1.0).contains(&n), "sample {n} out of range");
            let r = noise.ridge(x, 0.0, z);
            assert!((0.0..=1.0).contains(&r), "ridge {r} out of range");
        }
    }

    #[test]
    fn lattice_points_are_zero() {
        let noise = NoiseField::new(1);
        for (x, y, z) in [(0.0, 0.0, 0.0), (-5.0, 0.0, 3.0), (300.0, -2.0, -20.0)] {
            assert_eq!(noise.sample(x, y, z), 0.0);
            assert_eq!(noise.ridge(x, y, z), 1.0);
        }
    }

    #[test]
    fn noise_is_continuous() {
        let noise = NoiseField::new(11);
        for i in 0..100 {
            let x = i as f64 * 0.41;
            let d = (noise.sample_2d(x, 1.3) - noise.sample_2d(x + 1e-4, 1.3)).abs();
            assert!(d < 1e-2);
        }
    }
}
