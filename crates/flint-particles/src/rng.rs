//! Seeded particle RNG
//!
//! Every random draw of the simulation goes through one `ParticleRng` owned by
//! the `SimulationContext`, so a scene replayed with the same seed produces the
//! same particles.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

pub struct ParticleRng {
    inner: SmallRng,
}

impl ParticleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Returns a float in [min, max). Equal bounds return `min`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Component-wise `range`
    pub fn range_vec3(&mut self, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            self.range(min.x, max.x),
            self.range(min.y, max.y),
            self.range(min.z, max.z),
        )
    }

    /// Returns an index in [0, n). `n` must be non-zero.
    pub fn index(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }

    /// Returns a random unit direction vector (uniformly on sphere surface)
    pub fn random_direction(&mut self) -> Vec3 {
        // Marsaglia method for uniform sphere sampling
        loop {
            let x = self.range(-1.0, 1.0);
            let y = self.range(-1.0, 1.0);
            let s = x * x + y * y;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
            }
        }
    }

    /// Returns a direction whose angle to `base_dir` lies in
    /// [`angle_min`, `angle_max`] radians, uniformly over that spherical band.
    pub fn ring_direction(&mut self, base_dir: Vec3, angle_min: f32, angle_max: f32) -> Vec3 {
        let cos_min = angle_min.cos();
        let cos_max = angle_max.cos();
        let cos_theta = self.range(cos_max, cos_min);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = self.range(0.0, TAU);

        // Local direction in cone around +Z
        let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        rotate_to_basis(base_dir, local)
    }

    /// Normalizes `v`, or returns a random unit vector when `v` has no length.
    pub fn normalize_or_random(&mut self, v: Vec3) -> Vec3 {
        match v.try_normalize() {
            Some(n) => n,
            None => self.random_direction(),
        }
    }
}

/// Rotates `local` (assumed around +Z) to align with `forward`
fn rotate_to_basis(forward: Vec3, local: Vec3) -> Vec3 {
    let fwd = forward.normalize_or(Vec3::Y);
    let up = if fwd.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let right = up.cross(fwd).normalize();
    let actual_up = fwd.cross(right);

    right * local.x + actual_up * local.y + fwd * local.z
}
