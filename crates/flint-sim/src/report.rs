//! Per-frame statistics printed by the driver

use flint_particles::{StepMode, System};
use serde::Serialize;

/// Everything printed by a JSON run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scene: String,
    pub step_mode: StepMode,
    pub dt: f32,
    pub frames: Vec<FrameReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub id: u64,
    pub particles: usize,
    pub capacity: usize,
    pub alive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: u32,
    /// Wall time fed to the system so far, in seconds
    pub time: f32,
    pub particles: usize,
    pub alive: bool,
    /// Time carried to the next frame by constant/adaptive stepping
    pub leftover: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aabb: Option<[[f32; 3]; 2]>,
    pub groups: Vec<GroupReport>,
}

impl FrameReport {
    pub fn capture(frame: u32, time: f32, alive: bool, system: &System) -> Self {
        let aabb = system
            .is_aabb_computation_enabled()
            .then(|| [system.aabb_min().to_array(), system.aabb_max().to_array()]);
        Self {
            frame,
            time,
            particles: system.nb_particles(),
            alive,
            leftover: system.leftover(),
            aabb,
            groups: system
                .groups()
                .iter()
                .map(|g| GroupReport {
                    id: g.id().raw(),
                    particles: g.nb_particles(),
                    capacity: g.capacity(),
                    alive: g.is_alive(),
                })
                .collect(),
        }
    }

    /// One line of text output
    pub fn to_line(&self) -> String {
        let groups: Vec<String> = self
            .groups
            .iter()
            .map(|g| format!("{}/{}", g.particles, g.capacity))
            .collect();
        let mut line = format!(
            "frame {:>5}  t={:>8.3}s  particles={:<6} groups=[{}]",
            self.frame,
            self.time,
            self.particles,
            groups.join(" ")
        );
        if let Some([min, max]) = self.aabb {
            line.push_str(&format!(
                "  aabb=({:.2}, {:.2}, {:.2})..({:.2}, {:.2}, {:.2})",
                min[0], min[1], min[2], max[0], max[1], max[2]
            ));
        }
        if !self.alive {
            line.push_str("  [dead]");
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flint_particles::{Emitter, EmitterKind, Group, SimulationContext};

    #[test]
    fn capture_counts_particles() {
        let mut system = System::new();
        let mut group = Group::new(8).with_emitter(Emitter::burst(EmitterKind::Static, 5));
        group.model_mut().set_immortal(true);
        system.add_group(group);
        let mut ctx = SimulationContext::new(1);
        let alive = system.update(0.1, &mut ctx);

        let report = FrameReport::capture(0, 0.1, alive, &system);
        assert_eq!(report.particles, 5);
        assert_eq!(report.groups[0].capacity, 8);
        assert!(report.aabb.is_none());

        let line = report.to_line();
        assert!(line.contains("particles=5"));
        assert!(line.contains("5/8"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["particles"], 5);
        assert!(json.get("aabb").is_none());
    }
}
