//! Geometric zones used both to spawn particles and to test them
//!
//! A `Zone` couples a local position with a `ZoneShape`. World-space data is
//! derived from the local data and the last parent transform applied through
//! `update_transform`, so applying the same transform twice is a no-op.

mod box_zone;
mod plane;
mod point;
mod sphere;

pub use box_zone::BoxZone;
pub use plane::Plane;
pub use point::Point;
pub use sphere::Sphere;

use crate::io::{AttributeValue, Descriptor};
use crate::rng::ParticleRng;
use flint_core::{FlintError, Result};
use glam::{Affine3A, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared ownership of a zone between emitters and modifiers
pub type ZoneHandle = Rc<RefCell<Zone>>;

/// The closed set of zone shapes
#[derive(Debug, Clone)]
pub enum ZoneShape {
    Point(Point),
    Sphere(Sphere),
    Plane(Plane),
    Box(BoxZone),
}

impl ZoneShape {
    pub fn type_name(&self) -> &'static str {
        match self {
            ZoneShape::Point(_) => "Point",
            ZoneShape::Sphere(_) => "Sphere",
            ZoneShape::Plane(_) => "Plane",
            ZoneShape::Box(_) => "Box",
        }
    }

    fn apply_transform(&mut self, parent: &Affine3A) {
        match self {
            ZoneShape::Point(_) | ZoneShape::Sphere(_) => {}
            ZoneShape::Plane(plane) => plane.apply_transform(parent),
            ZoneShape::Box(b) => b.apply_transform(parent),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Zone {
    position: Vec3,
    t_position: Vec3,
    parent: Affine3A,
    shared: bool,
    shape: ZoneShape,
}

impl Zone {
    pub fn new(position: Vec3, shape: ZoneShape) -> Self {
        let mut zone = Self {
            position,
            t_position: position,
            parent: Affine3A::IDENTITY,
            shared: false,
            shape,
        };
        zone.recompute();
        zone
    }

    pub fn point(position: Vec3) -> Self {
        Self::new(position, ZoneShape::Point(Point))
    }

    pub fn sphere(position: Vec3, radius: f32) -> Self {
        Self::new(position, ZoneShape::Sphere(Sphere::new(radius)))
    }

    pub fn plane(position: Vec3, normal: Vec3) -> Self {
        Self::new(position, ZoneShape::Plane(Plane::new(normal)))
    }

    /// A box centered on `position` with half-extents `dimension`
    pub fn cuboid(position: Vec3, dimension: Vec3, front: Vec3, up: Vec3) -> Self {
        Self::new(position, ZoneShape::Box(BoxZone::new(dimension, front, up)))
    }

    pub fn into_handle(self) -> ZoneHandle {
        Rc::new(RefCell::new(self))
    }

    /// Marks the zone as shared. Owners of a shared zone no longer propagate
    /// their transform into it; whoever shares it updates it explicitly.
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn set_shared(&mut self, shared: bool) {
        self.shared = shared;
    }

    pub fn shape(&self) -> &ZoneShape {
        &self.shape
    }

    /// Edit the shape's local data; world data is rebuilt afterwards.
    pub fn modify_shape(&mut self, f: impl FnOnce(&mut ZoneShape)) {
        f(&mut self.shape);
        self.recompute();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recompute();
    }

    /// World-space position
    pub fn transformed_position(&self) -> Vec3 {
        self.t_position
    }

    /// Re-derive world data from local data under `parent`. Idempotent.
    pub fn update_transform(&mut self, parent: &Affine3A) {
        self.parent = *parent;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.t_position = self.parent.transform_point3(self.position);
        self.shape.apply_transform(&self.parent);
    }

    /// A random world-space position inside the zone (`full`) or on its
    /// boundary, kept `radius` away from the boundary.
    pub fn generate_position(&self, full: bool, radius: f32, rng: &mut ParticleRng) -> Vec3 {
        let c = self.t_position;
        match &self.shape {
            ZoneShape::Point(p) => p.generate_position(c),
            ZoneShape::Sphere(s) => s.generate_position(c, full, radius, rng),
            ZoneShape::Plane(p) => p.generate_position(c),
            ZoneShape::Box(b) => b.generate_position(c, full, radius, rng),
        }
    }

    /// Whether a sphere of `radius` centered on `point` lies fully inside
    pub fn contains(&self, point: Vec3, radius: f32) -> bool {
        let c = self.t_position;
        match &self.shape {
            ZoneShape::Point(p) => p.contains(c, point, radius),
            ZoneShape::Sphere(s) => s.contains(c, point, radius),
            ZoneShape::Plane(p) => p.contains(c, point, radius),
            ZoneShape::Box(b) => b.contains(c, point, radius),
        }
    }

    /// Whether the sphere swept from `p0` to `p1` crosses the boundary.
    /// Returns the surface normal at the crossing, oriented toward `p0`.
    pub fn intersects(&self, p0: Vec3, p1: Vec3, radius: f32) -> Option<Vec3> {
        let c = self.t_position;
        match &self.shape {
            ZoneShape::Point(p) => p.intersects(c, p0, p1, radius),
            ZoneShape::Sphere(s) => s.intersects(c, p0, p1, radius),
            ZoneShape::Plane(p) => p.intersects(c, p0, p1, radius),
            ZoneShape::Box(b) => b.intersects(c, p0, p1, radius),
        }
    }

    /// Outward unit normal of the boundary feature nearest to `point`.
    /// Never fails: degenerate cases give a random unit vector.
    pub fn compute_normal(&self, point: Vec3, rng: &mut ParticleRng) -> Vec3 {
        let c = self.t_position;
        match &self.shape {
            ZoneShape::Point(p) => p.compute_normal(c, point, rng),
            ZoneShape::Sphere(s) => s.compute_normal(c, point, rng),
            ZoneShape::Plane(p) => p.compute_normal(),
            ZoneShape::Box(b) => b.compute_normal(c, point),
        }
    }

    /// Build a zone from a descriptor whose type name is the shape name
    pub fn from_descriptor(descriptor: &Descriptor) -> Result<Self> {
        let shape = match descriptor.type_name().to_ascii_lowercase().as_str() {
            "point" => ZoneShape::Point(Point),
            "sphere" => ZoneShape::Sphere(Sphere::new(1.0)),
            "plane" => ZoneShape::Plane(Plane::new(Vec3::Y)),
            "box" => ZoneShape::Box(BoxZone::new(Vec3::ONE, Vec3::Z, Vec3::Y)),
            other => {
                return Err(FlintError::invalid_enum(
                    other,
                    &["point", "sphere", "plane", "box"],
                ))
            }
        };
        let mut zone = Self::new(Vec3::ZERO, shape);
        zone.import(descriptor);
        Ok(zone)
    }

    /// Read every attribute present in `descriptor`; absent ones keep their value.
    pub fn import(&mut self, descriptor: &Descriptor) {
        if let Some(v) = descriptor.attribute_with_value("position").and_then(AttributeValue::as_vec3) {
            self.position = v;
        }
        if let Some(b) = descriptor.attribute_with_value("shared").and_then(AttributeValue::as_bool) {
            self.shared = b;
        }
        match &mut self.shape {
            ZoneShape::Point(_) => {}
            ZoneShape::Sphere(s) => s.import(descriptor),
            ZoneShape::Plane(p) => p.import(descriptor),
            ZoneShape::Box(b) => b.import(descriptor),
        }
        self.recompute();
    }

    pub fn export(&self, descriptor: &mut Descriptor) {
        descriptor
            .attribute_mut("position")
            .set_value(AttributeValue::Vec3(self.position));
        descriptor
            .attribute_mut("shared")
            .set_value(AttributeValue::Bool(self.shared));
        match &self.shape {
            ZoneShape::Point(_) => {}
            ZoneShape::Sphere(s) => s.export(descriptor),
            ZoneShape::Plane(p) => p.export(descriptor),
            ZoneShape::Box(b) => b.export(descriptor),
        }
    }

    /// Export into a fresh descriptor named after the shape
    pub fn to_descriptor(&self) -> Descriptor {
        let mut descriptor = Descriptor::new(self.shape.type_name());
        self.export(&mut descriptor);
        descriptor
    }
}
