//! Time-step policy: how a frame delta is split into simulation sub-steps

use serde::{Deserialize, Serialize};

/// Sub-step counts tolerate this much float error before dropping a step
const STEP_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    /// One step of the frame delta
    #[default]
    Real,
    /// Fixed steps of `constant_step`, leftover carried to the next frame
    Constant,
    /// One step when the delta is within [`min_step`, `max_step`], fixed
    /// steps of the nearest bound otherwise
    Adaptive,
}

impl StepMode {
    pub fn name(self) -> &'static str {
        match self {
            StepMode::Real => "real",
            StepMode::Constant => "constant",
            StepMode::Adaptive => "adaptive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "real" => Some(StepMode::Real),
            "constant" => Some(StepMode::Constant),
            "adaptive" => Some(StepMode::Adaptive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConfig {
    mode: StepMode,
    constant_step: f32,
    min_step: f32,
    max_step: f32,
    clamp: Option<f32>,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            mode: StepMode::Real,
            constant_step: 1.0 / 60.0,
            min_step: 1.0 / 120.0,
            max_step: 1.0 / 30.0,
            clamp: None,
        }
    }
}

impl StepConfig {
    pub fn real() -> Self {
        Self::default()
    }

    pub fn constant(step: f32) -> Self {
        let mut config = Self {
            mode: StepMode::Constant,
            ..Self::default()
        };
        config.set_constant_step(step);
        config
    }

    pub fn adaptive(min_step: f32, max_step: f32) -> Self {
        let mut config = Self {
            mode: StepMode::Adaptive,
            ..Self::default()
        };
        config.set_adaptive_steps(min_step, max_step);
        config
    }

    pub fn with_clamp(mut self, max_delta: f32) -> Self {
        self.set_clamp(Some(max_delta));
        self
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: StepMode) {
        self.mode = mode;
    }

    pub fn constant_step(&self) -> f32 {
        self.constant_step
    }

    /// Non-positive steps are ignored
    pub fn set_constant_step(&mut self, step: f32) {
        if step <= 0.0 {
            log::warn!("Constant step {step} must be positive, keeping {}", self.constant_step);
            return;
        }
        self.constant_step = step;
    }

    pub fn min_step(&self) -> f32 {
        self.min_step
    }

    pub fn max_step(&self) -> f32 {
        self.max_step
    }

    pub fn set_adaptive_steps(&mut self, min_step: f32, max_step: f32) {
        if min_step <= 0.0 || max_step <= 0.0 {
            log::warn!(
                "Adaptive steps [{min_step}, {max_step}] must be positive, keeping [{}, {}]",
                self.min_step,
                self.max_step
            );
            return;
        }
        if min_step > max_step {
            log::warn!("Adaptive min step {min_step} is higher than max {max_step}, values are swapped");
            self.min_step = max_step;
            self.max_step = min_step;
        } else {
            self.min_step = min_step;
            self.max_step = max_step;
        }
    }

    pub fn clamp(&self) -> Option<f32> {
        self.clamp
    }

    /// Cap on the incoming frame delta; `None` disables clamping
    pub fn set_clamp(&mut self, clamp: Option<f32>) {
        match clamp {
            Some(c) if c <= 0.0 => {
                log::warn!("Clamp step {c} must be positive, clamping is disabled");
                self.clamp = None;
            }
            other => self.clamp = other,
        }
    }

    /// Split `delta` into sub-steps, using and updating `leftover`.
    pub fn plan(&self, delta: f32, leftover: &mut f32) -> StepPlan {
        let delta = match self.clamp {
            Some(c) => delta.min(c),
            None => delta,
        }
        .max(0.0);

        match self.mode {
            StepMode::Real => {
                *leftover = 0.0;
                StepPlan { step: delta, count: 1 }
            }
            StepMode::Constant => fixed_steps(self.constant_step, delta, leftover),
            StepMode::Adaptive => {
                let total = delta + *leftover;
                if total > self.max_step {
                    fixed_steps(self.max_step, delta, leftover)
                } else if total < self.min_step {
                    fixed_steps(self.min_step, delta, leftover)
                } else {
                    *leftover = 0.0;
                    StepPlan { step: total, count: 1 }
                }
            }
        }
    }
}

fn fixed_steps(step: f32, delta: f32, leftover: &mut f32) -> StepPlan {
    let total = delta + *leftover;
    let count = (total / step + STEP_EPSILON).floor() as u32;
    *leftover = (total - count as f32 * step).max(0.0);
    StepPlan { step, count }
}

/// `count` sub-steps of `step` seconds each
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    pub step: f32,
    pub count: u32,
}

impl StepPlan {
    pub fn iter(&self) -> impl Iterator<Item = f32> {
        std::iter::repeat(self.step).take(self.count as usize)
    }

    pub fn total(&self) -> f32 {
        self.step * self.count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_mode_is_one_step() {
        let mut leftover = 0.0;
        let plan = StepConfig::real().plan(0.07, &mut leftover);
        assert_eq!(plan, StepPlan { step: 0.07, count: 1 });
        assert_eq!(leftover, 0.0);
    }

    #[test]
    fn constant_mode_carries_remainder() {
        let config = StepConfig::constant(0.25);
        let mut leftover = 0.0;

        let plan = config.plan(0.625, &mut leftover);
        assert_eq!(plan.count, 2);
        assert_eq!(plan.step, 0.25);
        assert_eq!(leftover, 0.125);

        // 0.125 carried + 0.125 new = one more step
        let plan = config.plan(0.125, &mut leftover);
        assert_eq!(plan.count, 1);
        assert_eq!(leftover, 0.0);
    }

    #[test]
    fn constant_mode_tiny_delta_runs_nothing() {
        let config = StepConfig::constant(0.25);
        let mut leftover = 0.0;
        assert_eq!(config.plan(0.125, &mut leftover).count, 0);
        assert_eq!(leftover, 0.125);
    }

    #[test]
    fn adaptive_mode_picks_single_or_bounded_steps() {
        let config = StepConfig::adaptive(0.01, 0.05);

        let mut leftover = 0.0;
        let plan = config.plan(0.03, &mut leftover);
        assert_eq!(plan, StepPlan { step: 0.03, count: 1 });
        assert_eq!(leftover, 0.0);

        let mut leftover = 0.0;
        let plan = config.plan(0.2, &mut leftover);
        assert_eq!(plan.step, 0.05);
        assert_eq!(plan.count, 4);
        assert!(leftover < 1e-5);

        let mut leftover = 0.0;
        let plan = config.plan(0.005, &mut leftover);
        assert_eq!(plan.step, 0.01);
        assert_eq!(plan.count, 0);
        assert_eq!(leftover, 0.005);
    }

    #[test]
    fn clamp_caps_the_delta_first() {
        let config = StepConfig::real().with_clamp(0.1);
        let mut leftover = 0.0;
        assert_eq!(config.plan(2.0, &mut leftover).step, 0.1);

        let config = StepConfig::constant(0.25).with_clamp(0.5);
        let mut leftover = 0.0;
        assert_eq!(config.plan(10.0, &mut leftover).count, 2);
    }

    #[test]
    fn invalid_settings_are_ignored() {
        let mut config = StepConfig::constant(0.5);
        config.set_constant_step(-1.0);
        assert_eq!(config.constant_step(), 0.5);

        config.set_adaptive_steps(0.2, 0.1);
        assert_eq!((config.min_step(), config.max_step()), (0.1, 0.2));

        config.set_clamp(Some(0.0));
        assert_eq!(config.clamp(), None);
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in [StepMode::Real, StepMode::Constant, StepMode::Adaptive] {
            assert_eq!(StepMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(StepMode::from_name("Fixed"), None);
    }

    #[test]
    fn mode_serializes_by_name() {
        assert_eq!(
            serde_json::to_string(&StepMode::Adaptive).unwrap(),
            "\"adaptive\""
        );
    }
}
