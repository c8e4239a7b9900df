//! Systems: ordered groups stepped under the context's step policy

use crate::context::SimulationContext;
use crate::group::{Group, ParticleBlendMode};
use crate::particle::ParticleInstance;
use flint_core::{GroupId, Transform};
use glam::{Affine3A, Vec3};

/// Draw data for one group, consumed by the renderer
pub struct ParticleDrawData<'a> {
    pub group: GroupId,
    pub instances: &'a [ParticleInstance],
    pub blend_mode: ParticleBlendMode,
}

/// Rendering backend fed by `System::render`
pub trait ParticleRenderer {
    fn render(&mut self, data: &ParticleDrawData<'_>);
}

pub struct System {
    groups: Vec<Group>,
    transform: Transform,
    transform_dirty: bool,
    aabb_enabled: bool,
    aabb_min: Vec3,
    aabb_max: Vec3,
    /// Time not yet simulated by constant or adaptive stepping
    leftover: f32,
}

impl System {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            transform: Transform::IDENTITY,
            transform_dirty: false,
            aabb_enabled: false,
            aabb_min: Vec3::ZERO,
            aabb_max: Vec3::ZERO,
            leftover: 0.0,
        }
    }

    /// Add an empty group with `capacity` slots
    pub fn create_group(&mut self, capacity: usize) -> GroupId {
        self.add_group(Group::new(capacity))
    }

    pub fn add_group(&mut self, mut group: Group) -> GroupId {
        let id = group.id();
        group.propagate_update_transform(&self.transform.to_affine());
        log::debug!("Created group {id} with {} slots", group.capacity());
        self.groups.push(group);
        id
    }

    /// Remove a group; later groups move down one index
    pub fn destroy_group(&mut self, id: GroupId) -> bool {
        let Some(index) = self.groups.iter().position(|g| g.id() == id) else {
            return false;
        };
        let group = self.groups.remove(index);
        log::debug!("Destroyed group {id} with {} live particles", group.nb_particles());
        true
    }

    /// Panics if `index` is out of bounds
    pub fn group(&self, index: usize) -> &Group {
        &self.groups[index]
    }

    /// Panics if `index` is out of bounds
    pub fn group_mut(&mut self, index: usize) -> &mut Group {
        &mut self.groups[index]
    }

    pub fn group_by_id(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn group_by_id_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id() == id)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn nb_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn nb_particles(&self) -> usize {
        self.groups.iter().map(Group::nb_particles).sum()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Takes effect on the next `update` or `update_transform`
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.transform_dirty = true;
    }

    /// Push a pending transform into every non-shared zone of every group
    pub fn update_transform(&mut self) {
        if !self.transform_dirty {
            return;
        }
        let parent = self.transform.to_affine();
        for group in &mut self.groups {
            group.propagate_update_transform(&parent);
        }
        self.transform_dirty = false;
    }

    pub fn world_transform(&self) -> Affine3A {
        self.transform.to_affine()
    }

    pub fn is_aabb_computation_enabled(&self) -> bool {
        self.aabb_enabled
    }

    pub fn enable_aabb_computation(&mut self, enabled: bool) {
        self.aabb_enabled = enabled;
    }

    /// Valid after an `update` with AABB computation enabled
    pub fn aabb_min(&self) -> Vec3 {
        self.aabb_min
    }

    pub fn aabb_max(&self) -> Vec3 {
        self.aabb_max
    }

    /// Time carried to the next `update` by constant or adaptive stepping
    pub fn leftover(&self) -> f32 {
        self.leftover
    }

    /// Advance every group by `dt` seconds split by `ctx.step`. Returns whether
    /// any group is still alive.
    pub fn update(&mut self, dt: f32, ctx: &mut SimulationContext) -> bool {
        self.update_transform();

        let plan = ctx.step.plan(dt, &mut self.leftover);
        for step in plan.iter() {
            for group in &mut self.groups {
                group.update(step, ctx);
            }
        }

        if self.aabb_enabled {
            self.compute_aabb();
        }

        self.groups.iter().any(Group::is_alive)
    }

    fn compute_aabb(&mut self) {
        let bounds = self
            .groups
            .iter()
            .filter_map(Group::bounds)
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)));
        (self.aabb_min, self.aabb_max) = bounds.unwrap_or((Vec3::ZERO, Vec3::ZERO));
    }

    /// Pack every group's live particles for rendering
    pub fn pack_instances(&mut self) {
        for group in &mut self.groups {
            group.pack_instances();
        }
    }

    /// Draw data for each group with packed instances
    pub fn draw_data(&self) -> Vec<ParticleDrawData<'_>> {
        self.groups
            .iter()
            .filter(|g| !g.instances().is_empty())
            .map(|g| ParticleDrawData {
                group: g.id(),
                instances: g.instances(),
                blend_mode: g.blend_mode(),
            })
            .collect()
    }

    pub fn render(&self, renderer: &mut dyn ParticleRenderer) {
        for data in self.draw_data() {
            renderer.render(&data);
        }
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{Emitter, EmitterKind};
    use crate::step::StepConfig;
    use crate::zone::Zone;

    fn fountain(capacity: usize, flow: f32) -> Group {
        let mut group = Group::new(capacity).with_emitter(
            Emitter::new(EmitterKind::Random)
                .with_flow(flow)
                .with_force(1.0, 2.0),
        );
        group.model_mut().set_immortal(true);
        group
    }

    #[test]
    fn destroy_group_compacts_and_reduces_count() {
        let mut system = System::new();
        let first = system.add_group(fountain(100, 40.0));
        let second = system.add_group(fountain(100, 80.0));
        let mut ctx = SimulationContext::new(1);
        system.update(0.25, &mut ctx);
        assert_eq!(system.nb_particles(), 30);

        assert!(system.destroy_group(first));
        assert!(!system.destroy_group(first));
        assert_eq!(system.nb_groups(), 1);
        assert_eq!(system.group(0).id(), second);
        assert_eq!(system.nb_particles(), 20);
    }

    #[test]
    #[should_panic]
    fn group_index_out_of_bounds_panics() {
        let system = System::new();
        let _ = system.group(0);
    }

    #[test]
    fn constant_step_runs_sub_steps_and_carries() {
        let mut system = System::new();
        system.add_group(fountain(100, 4.0));
        let mut ctx = SimulationContext::new(2).with_step(StepConfig::constant(0.25));

        system.update(0.625, &mut ctx);
        // Two steps of 0.25 at 4 particles per second
        assert_eq!(system.nb_particles(), 2);
        assert_eq!(system.leftover(), 0.125);

        system.update(0.125, &mut ctx);
        assert_eq!(system.nb_particles(), 3);
        assert_eq!(system.leftover(), 0.0);
    }

    #[test]
    fn transform_reaches_non_shared_zones_only() {
        let private = Zone::point(Vec3::ZERO).into_handle();
        let shared = Zone::point(Vec3::ZERO).with_shared(true).into_handle();
        let group = Group::new(4)
            .with_emitter(Emitter::new(EmitterKind::Static).with_zone(private.clone(), true))
            .with_emitter(Emitter::new(EmitterKind::Static).with_zone(shared.clone(), true));

        let mut system = System::new();
        system.add_group(group);
        system.set_transform(Transform::from_position(Vec3::new(0.0, 3.0, 0.0)));
        system.update_transform();
        // Applying the same transform again changes nothing
        system.set_transform(Transform::from_position(Vec3::new(0.0, 3.0, 0.0)));
        system.update_transform();

        assert_eq!(private.borrow().transformed_position(), Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(shared.borrow().transformed_position(), Vec3::ZERO);
    }

    #[test]
    fn aabb_covers_live_particles() {
        let emitter = Emitter::burst(EmitterKind::Static, 50)
            .with_zone(
                Zone::cuboid(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), Vec3::Z, Vec3::Y).into_handle(),
                true,
            );
        let mut group = Group::new(50).with_emitter(emitter);
        group.model_mut().set_immortal(true);

        let mut system = System::new();
        system.add_group(group);
        system.enable_aabb_computation(true);
        let mut ctx = SimulationContext::new(3);
        assert!(system.update(0.1, &mut ctx));

        let (min, max) = (system.aabb_min(), system.aabb_max());
        assert!(min.cmpge(Vec3::new(-1.0, -2.0, -3.0) - 1e-5).all());
        assert!(max.cmple(Vec3::new(1.0, 2.0, 3.0) + 1e-5).all());
        for p in system.group(0).particles() {
            assert!(p.position.cmpge(min).all() && p.position.cmple(max).all());
        }
    }

    struct CountingRenderer {
        calls: usize,
        instances: usize,
    }

    impl ParticleRenderer for CountingRenderer {
        fn render(&mut self, data: &ParticleDrawData<'_>) {
            self.calls += 1;
            self.instances += data.instances.len();
        }
    }

    #[test]
    fn render_skips_empty_groups() {
        let mut system = System::new();
        system.add_group(fountain(16, 40.0));
        system.create_group(16);
        let mut ctx = SimulationContext::new(4);
        system.update(0.25, &mut ctx);
        system.pack_instances();

        let mut renderer = CountingRenderer {
            calls: 0,
            instances: 0,
        };
        system.render(&mut renderer);
        assert_eq!(renderer.calls, 1);
        assert_eq!(renderer.instances, 10);
    }

    #[test]
    fn dead_system_reports_false() {
        let mut system = System::new();
        system.create_group(4);
        let mut ctx = SimulationContext::new(5);
        assert!(!system.update(0.1, &mut ctx));
    }
}
