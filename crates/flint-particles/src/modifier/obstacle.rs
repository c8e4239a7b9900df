//! Obstacle: bounces particles off a zone surface with friction

use super::{Modifier, ModifyContext, ZoneTest, ZoneTrigger, PRIORITY_COLLISION};
use crate::particle::Particle;
use crate::zone::ZoneHandle;
use glam::Affine3A;

pub struct Obstacle {
    name: String,
    test: ZoneTest,
    bouncing_ratio: f32,
    friction: f32,
}

impl Obstacle {
    pub const ALLOWED_TRIGGERS: ZoneTrigger = ZoneTrigger::INTERSECT
        .union(ZoneTrigger::ENTER)
        .union(ZoneTrigger::LEAVE);

    /// A perfectly elastic, frictionless obstacle triggered on intersection
    pub fn new(zone: ZoneHandle) -> Self {
        Self {
            name: "obstacle".to_string(),
            test: ZoneTest::new(zone, ZoneTrigger::INTERSECT, Self::ALLOWED_TRIGGERS),
            bouncing_ratio: 1.0,
            friction: 1.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_triggers(mut self, triggers: ZoneTrigger) -> Self {
        self.test.set_triggers(triggers);
        self
    }

    /// `bouncing_ratio` scales the normal component, `friction` the
    /// tangential one (1 keeps it intact).
    pub fn with_response(mut self, bouncing_ratio: f32, friction: f32) -> Self {
        self.bouncing_ratio = bouncing_ratio;
        self.friction = friction;
        self
    }

    pub fn zone_test(&self) -> &ZoneTest {
        &self.test
    }

    pub fn zone_test_mut(&mut self) -> &mut ZoneTest {
        &mut self.test
    }

    pub fn bouncing_ratio(&self) -> f32 {
        self.bouncing_ratio
    }

    pub fn set_bouncing_ratio(&mut self, ratio: f32) {
        self.bouncing_ratio = ratio;
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }
}

impl Modifier for Obstacle {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u32 {
        PRIORITY_COLLISION
    }

    fn modify(&mut self, particles: &mut [Particle], ctx: &mut ModifyContext<'_>) {
        for p in particles.iter_mut().filter(|p| p.alive) {
            if !self.test.is_triggered(p, ctx.radius) {
                continue;
            }

            p.position = p.old_position;
            let normal = {
                let zone = self.test.zone().borrow();
                let outward = zone.compute_normal(p.position, ctx.rng);
                if zone.contains(p.position, 0.0) {
                    -outward
                } else {
                    outward
                }
            };

            // Normal faces the particle's side: a negative dot heads into the surface
            let dot = p.velocity.dot(normal);
            let mut vn = normal * dot;
            let mut vt = p.velocity - vn;
            vt *= self.friction;
            vn *= self.bouncing_ratio;
            if dot < 0.0 {
                vn = -vn;
            }
            p.velocity = vn + vt;
        }
    }

    fn propagate_update_transform(&mut self, parent: &Affine3A) {
        self.test.propagate_update_transform(parent);
    }
}
