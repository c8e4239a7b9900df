//! Oriented box zone
//!
//! `dimension` holds half-extents along the box's own axes. The axes are
//! built from a `front` (local z) and an `up` (local y) vector with cross
//! products, so they stay orthonormal whatever the inputs.

use crate::io::{AttributeValue, Descriptor};
use crate::rng::ParticleRng;
use glam::{Affine3A, Vec3};
use std::sync::Once;

static INTERSECTION_CAVEAT: Once = Once::new();

#[derive(Debug, Clone, Copy)]
pub struct BoxZone {
    dimension: Vec3,
    axis: [Vec3; 3],
    t_axis: [Vec3; 3],
}

impl BoxZone {
    pub fn new(dimension: Vec3, front: Vec3, up: Vec3) -> Self {
        let mut b = Self {
            dimension: Vec3::ZERO,
            axis: [Vec3::X, Vec3::Y, Vec3::Z],
            t_axis: [Vec3::X, Vec3::Y, Vec3::Z],
        };
        b.set_dimension(dimension);
        b.set_axis(front, up);
        b
    }

    pub fn dimension(&self) -> Vec3 {
        self.dimension
    }

    pub fn set_dimension(&mut self, dimension: Vec3) {
        if dimension.cmplt(Vec3::ZERO).any() {
            log::warn!("Box dimension {dimension} has negative components, using absolute values");
        }
        self.dimension = dimension.abs();
    }

    pub fn x_axis(&self) -> Vec3 {
        self.axis[0]
    }

    pub fn y_axis(&self) -> Vec3 {
        self.axis[1]
    }

    pub fn z_axis(&self) -> Vec3 {
        self.axis[2]
    }

    /// World-space axes (x, y, z)
    pub fn transformed_axes(&self) -> [Vec3; 3] {
        self.t_axis
    }

    /// Rebuild the local frame from `front` and `up`. Null or parallel inputs
    /// fall back to front = +Z, up = +Y.
    pub fn set_axis(&mut self, front: Vec3, up: Vec3) {
        let degenerate = front.length_squared() == 0.0
            || up.length_squared() == 0.0
            || front.normalize().cross(up.normalize()).length_squared() < 1e-12;

        let (z, y) = if degenerate {
            log::warn!("Box axes front={front} up={up} are null or parallel, using canonical axes");
            (Vec3::Z, Vec3::Y)
        } else {
            (front.normalize(), up.normalize())
        };

        let x = z.cross(y).normalize();
        let y = x.cross(z);
        self.axis = [x, y, z];
        self.t_axis = self.axis;
    }

    pub(super) fn apply_transform(&mut self, parent: &Affine3A) {
        for (t, a) in self.t_axis.iter_mut().zip(self.axis) {
            *t = parent.transform_vector3(a).normalize_or(a);
        }
    }

    pub(super) fn generate_position(
        &self,
        center: Vec3,
        full: bool,
        radius: f32,
        rng: &mut ParticleRng,
    ) -> Vec3 {
        let reach = (self.dimension - Vec3::splat(radius)).max(Vec3::ZERO);
        let mut offset = rng.range_vec3(-reach, reach);
        if !full {
            // Push one coordinate onto one of the six faces
            let n = rng.index(6);
            let axis = n >> 1;
            let dir = if n & 1 == 1 { 1.0 } else { -1.0 };
            offset[axis] = dir * reach[axis];
        }

        let mut v = center;
        for i in 0..3 {
            v += offset[i] * self.t_axis[i];
        }
        v
    }

    pub(super) fn contains(&self, center: Vec3, v: Vec3, radius: f32) -> bool {
        let d = v - center;
        (0..3).all(|i| self.t_axis[i].dot(d).abs() - radius <= self.dimension[i])
    }

    /// Slab clipping along the three axes, keeping the smallest crossing
    /// ratio. Crossings are not checked against the face bounds, so a segment
    /// passing beside the box can still report a hit.
    pub(super) fn intersects(&self, center: Vec3, v0: Vec3, v1: Vec3, radius: f32) -> Option<Vec3> {
        INTERSECTION_CAVEAT.call_once(|| {
            log::info!("Box zone intersection does not check face bounds and may report false hits");
        });

        let d0 = v0 - center;
        let d1 = v1 - center;

        let mut min_ratio = f32::MAX;
        let mut normal = None;

        for i in 0..3 {
            let mut dist0 = self.t_axis[i].dot(d0);
            let mut dist1 = self.t_axis[i].dot(d1);

            if dist1 - dist0 > 0.0 {
                dist0 += radius;
                dist1 += radius;
            } else {
                dist0 -= radius;
                dist1 -= radius;
            }

            intersect_slab(dist0, dist1, self.dimension[i], -self.t_axis[i], &mut min_ratio, &mut normal);
            intersect_slab(dist0, dist1, -self.dimension[i], self.t_axis[i], &mut min_ratio, &mut normal);
        }

        normal
    }

    /// Outward normal of the face whose axis has the largest relative offset
    pub(super) fn compute_normal(&self, center: Vec3, v: Vec3) -> Vec3 {
        let d = v - center;
        let mut ratio = [0.0f32; 3];
        for (i, r) in ratio.iter_mut().enumerate() {
            let dist = self.t_axis[i].dot(d);
            *r = if self.dimension[i] > 0.0 {
                dist / self.dimension[i]
            } else {
                f32::MAX.copysign(dist)
            };
        }

        let mut axis_index = 0;
        if ratio[1].abs() > ratio[0].abs() {
            axis_index = 1;
        }
        if ratio[2].abs() > ratio[axis_index].abs() {
            axis_index = 2;
        }

        self.t_axis[axis_index] * ratio[axis_index].signum()
    }

    pub(super) fn import(&mut self, descriptor: &Descriptor) {
        if let Some(dim) = descriptor.attribute_with_value("dimension").and_then(AttributeValue::as_vec3) {
            self.set_dimension(dim);
        }
        let front = descriptor.vec3_or("front", self.z_axis());
        let up = descriptor.vec3_or("up", self.y_axis());
        self.set_axis(front, up);
    }

    pub(super) fn export(&self, descriptor: &mut Descriptor) {
        descriptor
            .attribute_mut("dimension")
            .set_value(AttributeValue::Vec3(self.dimension));
        descriptor
            .attribute_mut("front")
            .set_value(AttributeValue::Vec3(self.z_axis()));
        descriptor
            .attribute_mut("up")
            .set_value(AttributeValue::Vec3(self.y_axis()));
    }
}

/// Records a crossing of the plane `dist == slab` when it happens strictly
/// earlier along the segment than the best one so far.
fn intersect_slab(
    dist0: f32,
    dist1: f32,
    slab: f32,
    axis: Vec3,
    min_ratio: &mut f32,
    normal: &mut Option<Vec3>,
) {
    let d0 = slab - dist0;
    let d1 = slab - dist1;
    if (d0 > 0.0) != (d1 > 0.0) {
        let ratio = d0 / (d0 - d1);
        if ratio < *min_ratio {
            *min_ratio = ratio;
            *normal = Some(axis);
        }
    }
}
