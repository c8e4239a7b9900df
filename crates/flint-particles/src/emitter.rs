//! Emitters: zone-bound particle sources with flow/tank accounting

use crate::particle::{Param, Particle};
use crate::rng::ParticleRng;
use crate::zone::{Zone, ZoneHandle};
use glam::{Affine3A, Vec3};

/// How an emitter picks the direction of a new particle's velocity
#[derive(Debug, Clone)]
pub enum EmitterKind {
    /// Particles are born motionless
    Static,
    /// Uniformly random directions
    Random,
    /// Always the same direction
    Straight { direction: Vec3 },
    /// Directions whose angle to `direction` lies in [`angle_min`, `angle_max`]
    /// radians
    Spheric {
        direction: Vec3,
        angle_min: f32,
        angle_max: f32,
    },
    /// Along the normal of `normal_zone` (the emitter zone when `None`) at the
    /// spawn position, optionally inverted
    Normal {
        normal_zone: Option<ZoneHandle>,
        inverted: bool,
    },
}

impl EmitterKind {
    pub fn straight(direction: Vec3) -> Self {
        EmitterKind::Straight {
            direction: normalize_direction(direction),
        }
    }

    pub fn spheric(direction: Vec3, angle_min: f32, angle_max: f32) -> Self {
        let (angle_min, angle_max) = if angle_min > angle_max {
            log::warn!("Spheric emitter angles {angle_min} > {angle_max}, values are swapped");
            (angle_max, angle_min)
        } else {
            (angle_min, angle_max)
        };
        EmitterKind::Spheric {
            direction: normalize_direction(direction),
            angle_min,
            angle_max,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EmitterKind::Static => "static",
            EmitterKind::Random => "random",
            EmitterKind::Straight { .. } => "straight",
            EmitterKind::Spheric { .. } => "spheric",
            EmitterKind::Normal { .. } => "normal",
        }
    }
}

fn normalize_direction(direction: Vec3) -> Vec3 {
    match direction.try_normalize() {
        Some(d) => d,
        None => {
            log::warn!("Emitter direction {direction} cannot be normalized, using +Z");
            Vec3::Z
        }
    }
}

/// Runtime state for one emitter
pub struct Emitter {
    kind: EmitterKind,
    active: bool,
    zone: ZoneHandle,
    full: bool,
    /// Remaining supply; negative means unlimited
    tank: i32,
    /// Particles per second; negative emits the whole tank at once
    flow: f32,
    force_min: f32,
    force_max: f32,
    /// Fractional particle accumulator for sub-frame emission
    fraction: f32,
}

impl Emitter {
    /// An active emitter on a private point zone at the origin, with an
    /// unlimited tank and a flow of one particle per second.
    pub fn new(kind: EmitterKind) -> Self {
        Self {
            kind,
            active: true,
            zone: Zone::point(Vec3::ZERO).into_handle(),
            full: true,
            tank: -1,
            flow: 1.0,
            force_min: 0.0,
            force_max: 0.0,
            fraction: 0.0,
        }
    }

    /// An emitter that releases its whole tank in the first step.
    /// A negative `tank` is treated as empty.
    pub fn burst(kind: EmitterKind, tank: i32) -> Self {
        if tank < 0 {
            log::warn!("Burst emitter needs a finite tank, got {tank}, using 0");
        }
        Self {
            tank: tank.max(0),
            flow: -1.0,
            ..Self::new(kind)
        }
    }

    pub fn with_zone(mut self, zone: ZoneHandle, full: bool) -> Self {
        self.set_zone(zone, full);
        self
    }

    /// A negative flow needs a finite tank, so call `with_tank` first or
    /// use [`Emitter::burst`].
    pub fn with_flow(mut self, flow: f32) -> Self {
        self.set_flow(flow);
        self
    }

    pub fn with_tank(mut self, tank: i32) -> Self {
        self.set_tank(tank);
        self
    }

    pub fn with_force(mut self, min: f32, max: f32) -> Self {
        self.set_force(min, max);
        self
    }

    pub fn kind(&self) -> &EmitterKind {
        &self.kind
    }

    pub fn set_kind(&mut self, kind: EmitterKind) {
        self.kind = kind;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn zone(&self) -> &ZoneHandle {
        &self.zone
    }

    pub fn is_full_zone(&self) -> bool {
        self.full
    }

    pub fn set_zone(&mut self, zone: ZoneHandle, full: bool) {
        self.zone = zone;
        self.full = full;
    }

    pub fn tank(&self) -> i32 {
        self.tank
    }

    /// A negative tank is unlimited. Flow and tank cannot both be negative.
    pub fn set_tank(&mut self, tank: i32) {
        debug_assert!(
            self.flow >= 0.0 || tank >= 0,
            "the flow and tank of an emitter cannot be both negative"
        );
        self.tank = tank;
    }

    pub fn flow(&self) -> f32 {
        self.flow
    }

    /// A negative flow empties the tank in one step. Flow and tank cannot both
    /// be negative.
    pub fn set_flow(&mut self, flow: f32) {
        debug_assert!(
            flow >= 0.0 || self.tank >= 0,
            "the flow and tank of an emitter cannot be both negative"
        );
        self.flow = flow;
    }

    pub fn force_min(&self) -> f32 {
        self.force_min
    }

    pub fn force_max(&self) -> f32 {
        self.force_max
    }

    pub fn set_force(&mut self, min: f32, max: f32) {
        if min <= max {
            self.force_min = min;
            self.force_max = max;
        } else {
            log::warn!("Emitter force min {min} is higher than max {max}, values are swapped");
            self.force_min = max;
            self.force_max = min;
        }
    }

    /// Whether this emitter can still produce particles
    pub fn is_alive(&self) -> bool {
        self.active && self.tank != 0
    }

    /// Resets the fractional accumulator (the tank is left untouched)
    pub fn reset_fraction(&mut self) {
        self.fraction = 0.0;
    }

    /// Number of particles to emit for a step of `dt` seconds. Consumes tank.
    pub fn update_number(&mut self, dt: f32) -> u32 {
        if !self.active {
            return 0;
        }

        if self.flow < 0.0 {
            let born = self.tank.max(0) as u32;
            self.tank = 0;
            return born;
        }

        if self.tank == 0 {
            return 0;
        }

        self.fraction += self.flow * dt;
        let mut born = self.fraction as u32;
        if self.tank > 0 {
            born = born.min(self.tank as u32);
            self.tank -= born as i32;
        }
        self.fraction -= born as f32;
        born
    }

    /// Place `particle` in the zone and give it its initial velocity
    pub fn emit(&self, particle: &mut Particle, rng: &mut ParticleRng) {
        let position = self.zone.borrow().generate_position(self.full, 0.0, rng);
        particle.position = position;
        particle.old_position = position;

        let mass = particle.param(Param::Mass);
        let force = rng.range(self.force_min, self.force_max);
        let speed = if mass != 0.0 { force / mass } else { force };
        particle.velocity = self.direction(position, rng) * speed;
    }

    fn direction(&self, position: Vec3, rng: &mut ParticleRng) -> Vec3 {
        match &self.kind {
            EmitterKind::Static => Vec3::ZERO,
            EmitterKind::Random => rng.random_direction(),
            EmitterKind::Straight { direction } => *direction,
            EmitterKind::Spheric {
                direction,
                angle_min,
                angle_max,
            } => rng.ring_direction(*direction, *angle_min, *angle_max),
            EmitterKind::Normal {
                normal_zone,
                inverted,
            } => {
                let zone = normal_zone.as_ref().unwrap_or(&self.zone);
                let normal = zone.borrow().compute_normal(position, rng);
                if *inverted {
                    -normal
                } else {
                    normal
                }
            }
        }
    }

    /// Push the owner's transform into the zone unless the zone is shared
    pub fn propagate_update_transform(&mut self, parent: &Affine3A) {
        let mut zone = self.zone.borrow_mut();
        if !zone.is_shared() {
            zone.update_transform(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_force_swaps_misordered_values() {
        let mut emitter = Emitter::new(EmitterKind::Random);
        emitter.set_force(5.0, 2.0);
        assert_eq!(emitter.force_min(), 2.0);
        assert_eq!(emitter.force_max(), 5.0);

        emitter.set_force(1.0, 3.0);
        assert_eq!((emitter.force_min(), emitter.force_max()), (1.0, 3.0));
    }

    #[test]
    fn flow_fraction_carries_between_steps() {
        let mut emitter = Emitter::new(EmitterKind::Static).with_flow(10.0);
        // 0.25 s at 10/s = 2.5 particles: 2 now, the half carries over
        assert_eq!(emitter.update_number(0.25), 2);
        assert_eq!(emitter.update_number(0.25), 3);
        assert_eq!(emitter.update_number(0.05), 0);
    }

    #[test]
    fn finite_tank_runs_dry() {
        let mut emitter = Emitter::new(EmitterKind::Static)
            .with_tank(5)
            .with_flow(100.0);
        assert_eq!(emitter.update_number(0.045), 4);
        assert_eq!(emitter.tank(), 1);
        assert_eq!(emitter.update_number(0.045), 1);
        assert_eq!(emitter.tank(), 0);
        assert!(!emitter.is_alive());
        assert_eq!(emitter.update_number(1.0), 0);
    }

    #[test]
    fn negative_flow_empties_tank_at_once() {
        let mut emitter = Emitter::new(EmitterKind::Static)
            .with_tank(12)
            .with_flow(-1.0);
        assert_eq!(emitter.update_number(0.001), 12);
        assert_eq!(emitter.update_number(0.001), 0);
    }

    #[test]
    fn burst_sets_tank_and_flow_together() {
        let mut emitter = Emitter::burst(EmitterKind::Static, 7);
        assert_eq!((emitter.tank(), emitter.flow()), (7, -1.0));
        assert_eq!(emitter.update_number(0.01), 7);
        assert!(!emitter.is_alive());

        let empty = Emitter::burst(EmitterKind::Static, -3);
        assert_eq!(empty.tank(), 0);
    }

    #[test]
    fn inactive_emitter_emits_nothing() {
        let mut emitter = Emitter::new(EmitterKind::Static).with_flow(1000.0);
        emitter.set_active(false);
        assert_eq!(emitter.update_number(1.0), 0);
        assert!(!emitter.is_alive());
    }

    #[test]
    #[should_panic(expected = "cannot be both negative")]
    #[cfg(debug_assertions)]
    fn negative_flow_and_tank_is_a_contract_violation() {
        let mut emitter = Emitter::new(EmitterKind::Static).with_tank(-1);
        emitter.set_flow(-1.0);
    }

    #[test]
    fn emit_uses_zone_and_mass() {
        let zone = Zone::point(Vec3::new(0.0, 2.0, 0.0)).into_handle();
        let emitter = Emitter::new(EmitterKind::straight(Vec3::new(0.0, 0.0, 3.0)))
            .with_zone(zone, true)
            .with_force(4.0, 4.0);
        let mut particle = Particle::dead();
        particle.set_param(Param::Mass, 2.0);

        let mut rng = ParticleRng::new(8);
        emitter.emit(&mut particle, &mut rng);
        assert_eq!(particle.position, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(particle.old_position, particle.position);
        assert!((particle.velocity - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn force_is_drawn_from_range() {
        let emitter = Emitter::new(EmitterKind::Random).with_force(1.0, 3.0);
        let mut rng = ParticleRng::new(13);
        for _ in 0..100 {
            let mut particle = Particle::dead();
            emitter.emit(&mut particle, &mut rng);
            let speed = particle.velocity.length();
            assert!((1.0 - 1e-4..3.0 + 1e-4).contains(&speed));
        }
    }

    #[test]
    fn normal_kind_follows_zone_normal() {
        let zone = Zone::plane(Vec3::new(1.0, 1.0, 1.0), Vec3::X).into_handle();
        let mut emitter = Emitter::new(EmitterKind::Normal {
            normal_zone: None,
            inverted: false,
        })
        .with_zone(zone, true)
        .with_force(2.0, 2.0);

        let mut rng = ParticleRng::new(17);
        let mut particle = Particle::dead();
        emitter.emit(&mut particle, &mut rng);
        assert_eq!(particle.position, Vec3::new(1.0, 1.0, 1.0));
        assert!((particle.velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);

        emitter.set_kind(EmitterKind::Normal {
            normal_zone: None,
            inverted: true,
        });
        emitter.emit(&mut particle, &mut rng);
        assert!((particle.velocity - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn normal_kind_never_fires_into_surface_zones() {
        let center = Vec3::new(0.4, -2.0, 1.5);
        let zones = [
            Zone::sphere(center, 1.3),
            Zone::cuboid(center, Vec3::new(1.0, 0.5, 2.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.2, 1.0, 0.0)),
        ];
        let mut rng = ParticleRng::new(21);
        for zone in zones {
            let emitter = Emitter::new(EmitterKind::Normal {
                normal_zone: None,
                inverted: false,
            })
            .with_zone(zone.into_handle(), false)
            .with_force(1.0, 1.0);

            for _ in 0..1000 {
                let mut particle = Particle::dead();
                emitter.emit(&mut particle, &mut rng);
                let radial = particle.position - center;
                assert!(particle.velocity.dot(radial) > 0.0, "{} fired inward", particle.position);
            }
        }
    }

    #[test]
    fn spheric_kind_swaps_angles() {
        let EmitterKind::Spheric {
            angle_min,
            angle_max,
            ..
        } = EmitterKind::spheric(Vec3::Y, 1.0, 0.5)
        else {
            panic!("expected spheric");
        };
        assert_eq!((angle_min, angle_max), (0.5, 1.0));
    }

    #[test]
    fn shared_zone_ignores_owner_transform() {
        let shared = Zone::point(Vec3::ZERO).with_shared(true).into_handle();
        let private = Zone::point(Vec3::ZERO).into_handle();
        let mut a = Emitter::new(EmitterKind::Static).with_zone(shared.clone(), true);
        let mut b = Emitter::new(EmitterKind::Static).with_zone(private.clone(), true);

        let parent = Affine3A::from_translation(Vec3::X);
        a.propagate_update_transform(&parent);
        b.propagate_update_transform(&parent);

        assert_eq!(shared.borrow().transformed_position(), Vec3::ZERO);
        assert_eq!(private.borrow().transformed_position(), Vec3::X);
    }
}
