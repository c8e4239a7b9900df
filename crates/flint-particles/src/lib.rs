//! Flint Particles - CPU particle simulation
//!
//! Provides pooled particle groups driven by a `System` with:
//! - Geometric zones (point, sphere, plane, box) shared between emitters and modifiers
//! - Flow/tank emitters with per-kind initial velocities
//! - Priority-ordered modifiers reacting to zone triggers (obstacles, destroyers)
//! - Real, constant and adaptive time stepping with clamping
//! - Swap-remove particle pools and instance packing for instanced draw calls
//! - TOML scene loading through the attribute descriptor protocol

pub mod config;
pub mod context;
pub mod emitter;
pub mod group;
pub mod io;
pub mod modifier;
pub mod particle;
pub mod rng;
pub mod step;
pub mod system;
pub mod zone;

pub use config::{Scene, SimulationSettings};
pub use context::SimulationContext;
pub use emitter::{Emitter, EmitterKind};
pub use group::{Group, ParamModel, ParticleBlendMode, ParticleModel};
pub use io::{Attribute, AttributeValue, Descriptor};
pub use modifier::{Destroyer, Modifier, ModifyContext, Obstacle, ZoneTest, ZoneTrigger};
pub use particle::{Param, Particle, ParticleInstance, ParticlePool};
pub use rng::ParticleRng;
pub use step::{StepConfig, StepMode, StepPlan};
pub use system::{ParticleDrawData, ParticleRenderer, System};
pub use zone::{Zone, ZoneHandle, ZoneShape};
