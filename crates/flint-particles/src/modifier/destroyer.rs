//! Destroyer: kills particles that satisfy its zone test

use super::{Modifier, ModifyContext, ZoneTest, ZoneTrigger, PRIORITY_POSITION};
use crate::particle::Particle;
use crate::zone::ZoneHandle;
use glam::Affine3A;

pub struct Destroyer {
    name: String,
    test: ZoneTest,
}

impl Destroyer {
    /// Kills every particle inside `zone`
    pub fn new(zone: ZoneHandle) -> Self {
        Self {
            name: "destroyer".to_string(),
            test: ZoneTest::new(zone, ZoneTrigger::INSIDE, ZoneTrigger::all()),
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

    pub fn zone_test(&self) -> &ZoneTest {
        &self.test
    }

    pub fn zone_test_mut(&mut self) -> &mut ZoneTest {
        &mut self.test
    }
}

impl Modifier for Destroyer {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u32 {
        PRIORITY_POSITION
    }

    fn modify(&mut self, particles: &mut [Particle], ctx: &mut ModifyContext<'_>) {
        for p in particles.iter_mut().filter(|p| p.alive) {
            if self.test.is_triggered(p, ctx.radius) {
                p.kill();
            }
        }
    }

    fn propagate_update_transform(&mut self, parent: &Affine3A) {
        self.test.propagate_update_transform(parent);
    }
}
