//! Particle types: CPU simulation state, GPU instance data and the slot pool

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Indexed scalar parameters carried by every particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Size = 0,
    Mass = 1,
    Angle = 2,
    TextureIndex = 3,
    RotationSpeed = 4,
}

impl Param {
    pub const COUNT: usize = 5;

    pub const ALL: [Param; Param::COUNT] = [
        Param::Size,
        Param::Mass,
        Param::Angle,
        Param::TextureIndex,
        Param::RotationSpeed,
    ];

    /// Value a freshly spawned particle gets when its group sets nothing else
    pub fn default_value(self) -> f32 {
        match self {
            Param::Size | Param::Mass => 1.0,
            Param::Angle | Param::TextureIndex | Param::RotationSpeed => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Param::Size => "size",
            Param::Mass => "mass",
            Param::Angle => "angle",
            Param::TextureIndex => "texture_index",
            Param::RotationSpeed => "rotation_speed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Param::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// CPU-side particle state (not sent to GPU)
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec3,
    /// Position at the start of the current step, before integration
    pub old_position: Vec3,
    pub velocity: Vec3,
    pub params: [f32; Param::COUNT],
    pub color: [f32; 4],
    pub age: f32,
    pub lifetime: f32,
    /// Squared distance to the camera, when the group computes it
    pub sqr_dist: f32,
    pub alive: bool,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            old_position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            params: Param::ALL.map(Param::default_value),
            color: [1.0; 4],
            age: 0.0,
            lifetime: 0.0,
            sqr_dist: 0.0,
            alive: false,
        }
    }

    pub fn param(&self, param: Param) -> f32 {
        self.params[param as usize]
    }

    pub fn set_param(&mut self, param: Param, value: f32) {
        self.params[param as usize] = value;
    }

    /// Flags the particle for recycling at the end of the current pass
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Normalized age in [0, 1]
    pub fn age_ratio(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).min(1.0)
        }
    }
}

/// Per-particle instance data handed to the renderer.
/// 48 bytes laid out as three rows of vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// World position + size packed into vec4
    pub pos_size: [f32; 4], // xyz = position, w = size
    /// Color with alpha
    pub color: [f32; 4], // rgba
    /// Angle, texture index, rotation speed, squared camera distance
    pub angle_texture: [f32; 4],
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            pos_size: [p.position.x, p.position.y, p.position.z, p.param(Param::Size)],
            color: p.color,
            angle_texture: [
                p.param(Param::Angle),
                p.param(Param::TextureIndex),
                p.param(Param::RotationSpeed),
                p.sqr_dist,
            ],
        }
    }
}

/// Swap-remove pool for O(1) particle kill and contiguous alive iteration.
///
/// All slots are allocated up front; the pool never grows.
pub struct ParticlePool {
    particles: Vec<Particle>,
    alive_count: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::dead(); capacity],
            alive_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    pub fn is_full(&self) -> bool {
        self.alive_count >= self.particles.len()
    }

    /// Spawn one particle, returning a mutable ref to initialize it.
    /// Returns None if pool is full.
    pub fn spawn(&mut self) -> Option<&mut Particle> {
        if self.is_full() {
            return None;
        }
        let idx = self.alive_count;
        self.particles[idx].alive = true;
        self.alive_count += 1;
        Some(&mut self.particles[idx])
    }

    /// Recycle every particle flagged dead via swap-remove.
    pub fn compact(&mut self) {
        let mut i = 0;
        while i < self.alive_count {
            if !self.particles[i].alive {
                self.alive_count -= 1;
                if i < self.alive_count {
                    self.particles.swap(i, self.alive_count);
                }
                // The swapped-in particle has not been checked yet
            } else {
                i += 1;
            }
        }
    }

    /// Kill every particle at once
    pub fn clear(&mut self) {
        for p in &mut self.particles[..self.alive_count] {
            p.alive = false;
        }
        self.alive_count = 0;
    }

    /// Access alive particles slice for reading (first `alive_count` elements)
    pub fn alive_slice(&self) -> &[Particle] {
        &self.particles[..self.alive_count]
    }

    /// Access alive particles mutably
    pub fn alive_slice_mut(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.alive_count]
    }
}
