//! Plane zone: a point and a normal. The inside is the half-space behind the
//! normal.

use crate::io::{AttributeValue, Descriptor};
use glam::{Affine3A, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Plane {
    normal: Vec3,
    t_normal: Vec3,
}

impl Plane {
    pub fn new(normal: Vec3) -> Self {
        let mut plane = Self {
            normal: Vec3::Y,
            t_normal: Vec3::Y,
        };
        plane.set_normal(normal);
        plane
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// World-space normal
    pub fn transformed_normal(&self) -> Vec3 {
        self.t_normal
    }

    pub fn set_normal(&mut self, normal: Vec3) {
        self.normal = match normal.try_normalize() {
            Some(n) => n,
            None => {
                log::warn!("Plane normal {normal} cannot be normalized, using +Y");
                Vec3::Y
            }
        };
        self.t_normal = self.normal;
    }

    pub(super) fn apply_transform(&mut self, parent: &Affine3A) {
        self.t_normal = parent.transform_vector3(self.normal).normalize_or(self.normal);
    }

    pub(super) fn generate_position(&self, center: Vec3) -> Vec3 {
        center
    }

    pub(super) fn contains(&self, center: Vec3, v: Vec3, radius: f32) -> bool {
        self.t_normal.dot(v - center) + radius <= 0.0
    }

    pub(super) fn intersects(&self, center: Vec3, v0: Vec3, v1: Vec3, radius: f32) -> Option<Vec3> {
        let mut dist0 = self.t_normal.dot(v0 - center);
        let mut dist1 = self.t_normal.dot(v1 - center);

        if dist1 > dist0 {
            dist0 += radius;
            dist1 += radius;
        } else {
            dist0 -= radius;
            dist1 -= radius;
        }

        if (dist0 > 0.0) == (dist1 > 0.0) {
            return None;
        }
        Some(if dist0 > 0.0 { self.t_normal } else { -self.t_normal })
    }

    pub(super) fn compute_normal(&self) -> Vec3 {
        self.t_normal
    }

    pub(super) fn import(&mut self, descriptor: &Descriptor) {
        if let Some(n) = descriptor.attribute_with_value("normal").and_then(AttributeValue::as_vec3) {
            self.set_normal(n);
        }
    }

    pub(super) fn export(&self, descriptor: &mut Descriptor) {
        descriptor
            .attribute_mut("normal")
            .set_value(AttributeValue::Vec3(self.normal));
    }
}
