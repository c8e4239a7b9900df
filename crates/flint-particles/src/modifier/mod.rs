//! Modifiers: per-step transformations applied to a group's live particles
//!
//! A group runs its modifiers in ascending `priority` order after emission.
//! Zone-based modifiers decide which particles to touch through a `ZoneTest`,
//! a set of `ZoneTrigger` bits evaluated against the particle's old and new
//! positions.

mod destroyer;
mod obstacle;

pub use destroyer::Destroyer;
pub use obstacle::Obstacle;

use crate::particle::Particle;
use crate::rng::ParticleRng;
use crate::zone::ZoneHandle;
use bitflags::bitflags;
use glam::Affine3A;

/// Modifiers that move particles directly
pub const PRIORITY_POSITION: u32 = 10;
/// Modifiers that change velocities
pub const PRIORITY_FORCE: u32 = 20;
/// Collision responses, which must see the final position of the step
pub const PRIORITY_COLLISION: u32 = 30;

bitflags! {
    /// Relationship between a particle and a zone that fires a modifier
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ZoneTrigger: u32 {
        /// The particle is inside the zone
        const INSIDE = 1 << 0;
        /// The particle is outside the zone
        const OUTSIDE = 1 << 1;
        /// The particle crossed the zone boundary during the step
        const INTERSECT = 1 << 2;
        /// The particle was outside and is now inside
        const ENTER = 1 << 3;
        /// The particle was inside and is now outside
        const LEAVE = 1 << 4;
        /// Fires for every particle
        const ALWAYS = 1 << 5;
    }
}

impl ZoneTrigger {
    /// Parse a list of trigger names, case-insensitive
    pub fn parse<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        names.into_iter().try_fold(ZoneTrigger::empty(), |acc, name| {
            ZoneTrigger::from_name(&name.to_ascii_uppercase()).map(|t| acc | t)
        })
    }
}

/// What a modifier gets to see besides the particles
pub struct ModifyContext<'a> {
    /// Duration of the current step in seconds
    pub dt: f32,
    /// Physical radius of the group's particles, used in zone tests
    pub radius: f32,
    pub rng: &'a mut ParticleRng,
}

pub trait Modifier {
    /// Name used to find and remove the modifier from its group
    fn name(&self) -> &str;

    /// Lower priorities run first
    fn priority(&self) -> u32;

    /// Transform the live particles of one step. Dead particles may be present
    /// and must be skipped; killing is done through `Particle::kill`.
    fn modify(&mut self, particles: &mut [Particle], ctx: &mut ModifyContext<'_>);

    /// Push the owning system's transform into any non-shared zone
    fn propagate_update_transform(&mut self, _parent: &Affine3A) {}
}

/// A zone plus the set of relationships that fire a modifier
pub struct ZoneTest {
    zone: ZoneHandle,
    triggers: ZoneTrigger,
    allowed: ZoneTrigger,
}

impl ZoneTest {
    pub fn new(zone: ZoneHandle, triggers: ZoneTrigger, allowed: ZoneTrigger) -> Self {
        let mut test = Self {
            zone,
            triggers: ZoneTrigger::empty(),
            allowed,
        };
        test.set_triggers(triggers);
        test
    }

    pub fn zone(&self) -> &ZoneHandle {
        &self.zone
    }

    pub fn set_zone(&mut self, zone: ZoneHandle) {
        self.zone = zone;
    }

    pub fn triggers(&self) -> ZoneTrigger {
        self.triggers
    }

    pub fn allowed(&self) -> ZoneTrigger {
        self.allowed
    }

    /// Bits outside the allowed set are dropped
    pub fn set_triggers(&mut self, triggers: ZoneTrigger) {
        let rejected = triggers - self.allowed;
        if !rejected.is_empty() {
            log::warn!("Zone triggers {rejected:?} are not supported by this modifier and are ignored");
        }
        self.triggers = triggers & self.allowed;
    }

    /// Whether any configured trigger fires for `particle`
    pub fn is_triggered(&self, particle: &Particle, radius: f32) -> bool {
        if self.triggers.contains(ZoneTrigger::ALWAYS) {
            return true;
        }

        let zone = self.zone.borrow();
        let pos = particle.position;
        let old = particle.old_position;

        if self.triggers.intersects(ZoneTrigger::INSIDE | ZoneTrigger::OUTSIDE) {
            let inside = zone.contains(pos, radius);
            if (inside && self.triggers.contains(ZoneTrigger::INSIDE))
                || (!inside && self.triggers.contains(ZoneTrigger::OUTSIDE))
            {
                return true;
            }
        }

        if self.triggers.contains(ZoneTrigger::INTERSECT) && zone.intersects(old, pos, radius).is_some() {
            return true;
        }

        if self.triggers.intersects(ZoneTrigger::ENTER | ZoneTrigger::LEAVE) {
            let was_inside = zone.contains(old, radius);
            let is_inside = zone.contains(pos, radius);
            if (!was_inside && is_inside && self.triggers.contains(ZoneTrigger::ENTER))
                || (was_inside && !is_inside && self.triggers.contains(ZoneTrigger::LEAVE))
            {
                return true;
            }
        }

        false
    }

    pub fn propagate_update_transform(&mut self, parent: &Affine3A) {
        let mut zone = self.zone.borrow_mut();
        if !zone.is_shared() {
            zone.update_transform(parent);
        }
    }
}
