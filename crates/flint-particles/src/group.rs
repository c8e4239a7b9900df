//! Groups: a fixed-capacity particle pool with its emitters, modifiers and
//! particle model
//!
//! One `update` runs a single simulation step:
//! 1. integrate live particles (age, gravity, friction, motion, life curves)
//! 2. let every emitter spawn into free slots
//! 3. run modifiers in ascending priority
//! 4. recycle dead particles
//! 5. optionally compute camera distances and sort far-to-near

use crate::context::SimulationContext;
use crate::emitter::Emitter;
use crate::modifier::{Modifier, ModifyContext};
use crate::particle::{Param, Particle, ParticleInstance, ParticlePool};
use crate::rng::ParticleRng;
use flint_core::GroupId;
use glam::{Affine3A, FloatExt, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Blend mode hint for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleBlendMode {
    #[default]
    Alpha,
    Additive,
}

impl ParticleBlendMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "alpha" => Some(ParticleBlendMode::Alpha),
            "additive" => Some(ParticleBlendMode::Additive),
            _ => None,
        }
    }
}

/// How one particle parameter is chosen at birth and evolves with age
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamModel {
    /// Uniform in [`min`, `max`] at birth
    Random { min: f32, max: f32 },
    /// Linear from `start` at birth to `end` at death
    Interpolated { start: f32, end: f32 },
}

impl ParamModel {
    pub fn constant(value: f32) -> Self {
        ParamModel::Random {
            min: value,
            max: value,
        }
    }
}

/// Birth values and life curves shared by all particles of a group
#[derive(Debug, Clone)]
pub struct ParticleModel {
    lifetime_min: f32,
    lifetime_max: f32,
    immortal: bool,
    params: [ParamModel; Param::COUNT],
    color_start: [f32; 4],
    color_end: Option<[f32; 4]>,
}

impl Default for ParticleModel {
    fn default() -> Self {
        Self {
            lifetime_min: 1.0,
            lifetime_max: 1.0,
            immortal: false,
            params: Param::ALL.map(|p| ParamModel::constant(p.default_value())),
            color_start: [1.0; 4],
            color_end: None,
        }
    }
}

impl ParticleModel {
    pub fn lifetime(&self) -> (f32, f32) {
        (self.lifetime_min, self.lifetime_max)
    }

    pub fn set_lifetime(&mut self, min: f32, max: f32) {
        if min <= max {
            self.lifetime_min = min;
            self.lifetime_max = max;
        } else {
            log::warn!("Lifetime min {min} is higher than max {max}, values are swapped");
            self.lifetime_min = max;
            self.lifetime_max = min;
        }
    }

    pub fn is_immortal(&self) -> bool {
        self.immortal
    }

    pub fn set_immortal(&mut self, immortal: bool) {
        self.immortal = immortal;
    }

    pub fn param(&self, param: Param) -> ParamModel {
        self.params[param as usize]
    }

    pub fn set_param(&mut self, param: Param, model: ParamModel) {
        let model = match model {
            ParamModel::Random { min, max } if min > max => {
                log::warn!("{} range [{min}, {max}] is reversed, values are swapped", param.name());
                ParamModel::Random { min: max, max: min }
            }
            other => other,
        };
        self.params[param as usize] = model;
    }

    pub fn color(&self) -> ([f32; 4], Option<[f32; 4]>) {
        (self.color_start, self.color_end)
    }

    /// Birth color, and the color reached at death when `end` is set
    pub fn set_color(&mut self, start: [f32; 4], end: Option<[f32; 4]>) {
        self.color_start = start;
        self.color_end = end;
    }

    fn init(&self, p: &mut Particle, rng: &mut ParticleRng) {
        p.age = 0.0;
        p.lifetime = rng.range(self.lifetime_min, self.lifetime_max);
        p.velocity = Vec3::ZERO;
        p.sqr_dist = 0.0;
        p.color = self.color_start;
        for param in Param::ALL {
            let value = match self.params[param as usize] {
                ParamModel::Random { min, max } => rng.range(min, max),
                ParamModel::Interpolated { start, .. } => start,
            };
            p.set_param(param, value);
        }
        p.alive = true;
    }

    fn apply_life_curves(&self, p: &mut Particle, dt: f32) {
        let t = p.age_ratio();
        for param in Param::ALL {
            if let ParamModel::Interpolated { start, end } = self.params[param as usize] {
                p.set_param(param, start.lerp(end, t));
            }
        }
        if !matches!(self.params[Param::Angle as usize], ParamModel::Interpolated { .. }) {
            let angle = p.param(Param::Angle) + p.param(Param::RotationSpeed) * dt;
            p.set_param(Param::Angle, angle);
        }
        if let Some(end) = self.color_end {
            p.color = Vec4::from(self.color_start).lerp(Vec4::from(end), t).into();
        }
    }
}

pub struct Group {
    id: GroupId,
    pool: ParticlePool,
    model: ParticleModel,
    emitters: Vec<Emitter>,
    /// Sorted by ascending priority, insertion order among equals
    modifiers: Vec<Box<dyn Modifier>>,
    gravity: Vec3,
    friction: f32,
    radius: f32,
    distance_computation: bool,
    sorting: bool,
    blend_mode: ParticleBlendMode,
    instances: Vec<ParticleInstance>,
}

impl Group {
    /// All `capacity` slots are allocated here; the group never grows.
    pub fn new(capacity: usize) -> Self {
        Self {
            id: GroupId::new(),
            pool: ParticlePool::new(capacity),
            model: ParticleModel::default(),
            emitters: Vec::new(),
            modifiers: Vec::new(),
            gravity: Vec3::ZERO,
            friction: 0.0,
            radius: 0.0,
            distance_computation: false,
            sorting: false,
            blend_mode: ParticleBlendMode::Alpha,
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn with_model(mut self, model: ParticleModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.set_friction(friction);
        self
    }

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.add_emitter(emitter);
        self
    }

    pub fn with_modifier(mut self, modifier: Box<dyn Modifier>) -> Self {
        self.add_modifier(modifier);
        self
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn nb_particles(&self) -> usize {
        self.pool.alive_count()
    }

    /// The live particles, in storage order
    pub fn particles(&self) -> &[Particle] {
        self.pool.alive_slice()
    }

    pub fn model(&self) -> &ParticleModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ParticleModel {
        &mut self.model
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Velocity damping per second
    pub fn set_friction(&mut self, friction: f32) {
        if friction < 0.0 {
            log::warn!("Group friction {friction} is negative, using 0");
        }
        self.friction = friction.max(0.0);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Physical radius of the particles in zone tests
    pub fn set_radius(&mut self, radius: f32) {
        if radius < 0.0 {
            log::warn!("Group radius {radius} is negative, using its absolute value");
        }
        self.radius = radius.abs();
    }

    pub fn is_distance_computation_enabled(&self) -> bool {
        self.distance_computation
    }

    pub fn enable_distance_computation(&mut self, enabled: bool) {
        self.distance_computation = enabled;
        if !enabled {
            self.sorting = false;
        }
    }

    pub fn is_sorting_enabled(&self) -> bool {
        self.sorting
    }

    /// Sorting needs distances, so enabling it also enables them
    pub fn enable_sorting(&mut self, enabled: bool) {
        self.sorting = enabled;
        if enabled {
            self.distance_computation = true;
        }
    }

    pub fn blend_mode(&self) -> ParticleBlendMode {
        self.blend_mode
    }

    pub fn set_blend_mode(&mut self, blend_mode: ParticleBlendMode) {
        self.blend_mode = blend_mode;
    }

    pub fn add_emitter(&mut self, emitter: Emitter) {
        self.emitters.push(emitter);
    }

    pub fn remove_emitter(&mut self, index: usize) -> Option<Emitter> {
        (index < self.emitters.len()).then(|| self.emitters.remove(index))
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [Emitter] {
        &mut self.emitters
    }

    pub fn add_modifier(&mut self, modifier: Box<dyn Modifier>) {
        let priority = modifier.priority();
        let at = self.modifiers.partition_point(|m| m.priority() <= priority);
        self.modifiers.insert(at, modifier);
    }

    /// Removes the first modifier called `name`
    pub fn remove_modifier(&mut self, name: &str) -> Option<Box<dyn Modifier>> {
        let index = self.modifiers.iter().position(|m| m.name() == name)?;
        Some(self.modifiers.remove(index))
    }

    pub fn modifiers(&self) -> &[Box<dyn Modifier>] {
        &self.modifiers
    }

    /// Kill every particle immediately
    pub fn empty(&mut self) {
        self.pool.clear();
    }

    /// Drop the packed render instances
    pub fn flush_buffers(&mut self) {
        self.instances.clear();
    }

    pub fn propagate_update_transform(&mut self, parent: &Affine3A) {
        for emitter in &mut self.emitters {
            emitter.propagate_update_transform(parent);
        }
        for modifier in &mut self.modifiers {
            modifier.propagate_update_transform(parent);
        }
    }

    /// Advance the group by one step of `dt` seconds. Returns whether it still
    /// has live particles or an emitter that can produce more.
    pub fn update(&mut self, dt: f32, ctx: &mut SimulationContext) -> bool {
        let damping = (1.0 - self.friction * dt).max(0.0);
        for p in self.pool.alive_slice_mut() {
            p.old_position = p.position;
            p.age += dt;
            if !self.model.immortal && p.age >= p.lifetime {
                p.kill();
                continue;
            }
            p.velocity += self.gravity * dt;
            p.velocity *= damping;
            p.position += p.velocity * dt;
            self.model.apply_life_curves(p, dt);
        }

        for emitter in &mut self.emitters {
            let count = emitter.update_number(dt);
            for _ in 0..count {
                let Some(p) = self.pool.spawn() else {
                    break;
                };
                self.model.init(p, &mut ctx.rng);
                emitter.emit(p, &mut ctx.rng);
            }
        }

        let mut modify_ctx = ModifyContext {
            dt,
            radius: self.radius,
            rng: &mut ctx.rng,
        };
        for modifier in &mut self.modifiers {
            modifier.modify(self.pool.alive_slice_mut(), &mut modify_ctx);
        }

        self.pool.compact();

        if self.distance_computation {
            let camera = ctx.camera_position;
            let particles = self.pool.alive_slice_mut();
            for p in particles.iter_mut() {
                p.sqr_dist = p.position.distance_squared(camera);
            }
            if self.sorting {
                particles.sort_unstable_by(|a, b| b.sqr_dist.total_cmp(&a.sqr_dist));
            }
        }

        self.is_alive()
    }

    /// Whether the group has live particles or an emitter that can produce more
    pub fn is_alive(&self) -> bool {
        self.pool.alive_count() > 0 || self.emitters.iter().any(Emitter::is_alive)
    }

    /// Pack the live particles into the instance buffer and return it
    pub fn pack_instances(&mut self) -> &[ParticleInstance] {
        self.instances.clear();
        self.instances
            .extend(self.pool.alive_slice().iter().map(ParticleInstance::from_particle));
        &self.instances
    }

    /// Instances from the last `pack_instances`
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// Min and max corners of the live particles, grown by the physical radius
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.pool.alive_slice().iter();
        let first = iter.next()?.position;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (min.min(p.position), max.max(p.position))
        });
        Some((min - Vec3::splat(self.radius), max + Vec3::splat(self.radius)))
    }
}
