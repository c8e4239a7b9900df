//! Simulation context shared by every system stepped in a frame

use crate::rng::ParticleRng;
use crate::step::StepConfig;
use glam::Vec3;

/// Step policy, camera and random source handed to `System::update`.
///
/// Systems that should follow the same stepping rules share one context; each
/// system still keeps its own leftover time.
pub struct SimulationContext {
    pub step: StepConfig,
    /// Used for per-particle camera distances and sorting
    pub camera_position: Vec3,
    pub rng: ParticleRng,
}

impl SimulationContext {
    pub fn new(seed: u64) -> Self {
        Self {
            step: StepConfig::default(),
            camera_position: Vec3::ZERO,
            rng: ParticleRng::new(seed),
        }
    }

    pub fn with_step(mut self, step: StepConfig) -> Self {
        self.step = step;
        self
    }

    pub fn with_camera(mut self, camera_position: Vec3) -> Self {
        self.camera_position = camera_position;
        self
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(0x5EED)
    }
}
