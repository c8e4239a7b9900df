//! Sphere zone

use crate::io::{AttributeValue, Descriptor};
use crate::rng::ParticleRng;
use glam::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        let mut sphere = Self { radius: 0.0 };
        sphere.set_radius(radius);
        sphere
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        if radius < 0.0 {
            log::warn!("Sphere radius {radius} is negative, using its absolute value");
        }
        self.radius = radius.abs();
    }

    pub(super) fn generate_position(
        &self,
        center: Vec3,
        full: bool,
        radius: f32,
        rng: &mut ParticleRng,
    ) -> Vec3 {
        let reach = (self.radius - radius).max(0.0);
        if !full {
            return center + rng.random_direction() * reach;
        }
        // Rejection sampling in the unit ball keeps the distribution uniform
        loop {
            let p = rng.range_vec3(Vec3::NEG_ONE, Vec3::ONE);
            if p.length_squared() <= 1.0 {
                return center + p * reach;
            }
        }
    }

    pub(super) fn contains(&self, center: Vec3, v: Vec3, radius: f32) -> bool {
        (v - center).length() + radius <= self.radius
    }

    pub(super) fn intersects(&self, center: Vec3, v0: Vec3, v1: Vec3, radius: f32) -> Option<Vec3> {
        let dist0 = (v0 - center).length();
        let dist1 = (v1 - center).length();

        // The leading side of the particle is what touches the shell
        let shell = if dist1 > dist0 {
            self.radius - radius
        } else {
            self.radius + radius
        };

        let inside0 = dist0 <= shell;
        let inside1 = dist1 <= shell;
        if inside0 == inside1 {
            return None;
        }

        let radial = (v0 - center)
            .try_normalize()
            .or_else(|| (v1 - center).try_normalize())
            .unwrap_or(Vec3::Y);
        Some(if inside0 { -radial } else { radial })
    }

    pub(super) fn compute_normal(&self, center: Vec3, v: Vec3, rng: &mut ParticleRng) -> Vec3 {
        let d = v - center;
        rng.normalize_or_random(d)
    }

    pub(super) fn import(&mut self, descriptor: &Descriptor) {
        if let Some(r) = descriptor.attribute_with_value("radius").and_then(AttributeValue::as_f32) {
            self.set_radius(r);
        }
    }

    pub(super) fn export(&self, descriptor: &mut Descriptor) {
        descriptor
            .attribute_mut("radius")
            .set_value(AttributeValue::Float(self.radius));
    }
}
