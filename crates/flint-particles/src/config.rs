//! TOML scene descriptions
//!
//! ```toml
//! [simulation]
//! step = "constant"          # real | constant | adaptive
//! constant_step = 0.016
//! clamp = 0.1
//! camera = [0, 2, 10]
//! seed = 7
//!
//! [zones.floor]
//! type = "plane"
//! position = [0, 0, 0]
//! normal = [0, 1, 0]
//! shared = true
//!
//! [[groups]]
//! capacity = 500
//! lifetime = [1.0, 2.0]
//! gravity = [0, -9.8, 0]
//!
//! [[groups.emitters]]
//! kind = "spheric"
//! zone = { type = "point", position = [0, 1, 0] }
//! direction = [0, 1, 0]
//! angles = [0, 30]           # degrees
//! flow = 200
//! force = [2, 4]
//!
//! [[groups.modifiers]]
//! type = "obstacle"
//! zone = "floor"
//! bouncing_ratio = 0.6
//! ```

use crate::context::SimulationContext;
use crate::emitter::{Emitter, EmitterKind};
use crate::group::{Group, ParamModel, ParticleBlendMode};
use crate::io::{toml_f32, Descriptor};
use crate::modifier::{Destroyer, Modifier, Obstacle, ZoneTrigger};
use crate::particle::Param;
use crate::step::{StepConfig, StepMode};
use crate::system::System;
use crate::zone::{Zone, ZoneHandle};
use flint_core::{FlintError, Result, Transform};
use glam::Vec3;
use std::collections::BTreeMap;
use std::path::Path;

type Table = toml::value::Table;

/// The `[simulation]` table
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub step: StepConfig,
    pub camera_position: Vec3,
    pub seed: u64,
    pub aabb: bool,
    pub transform: Transform,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            step: StepConfig::default(),
            camera_position: Vec3::ZERO,
            seed: 0x5EED,
            aabb: false,
            transform: Transform::IDENTITY,
        }
    }
}

impl SimulationSettings {
    pub fn from_toml(table: &Table) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(v) = table.get("step") {
            let name = expect_str(v, "simulation.step")?;
            let mode = StepMode::from_name(name)
                .ok_or_else(|| FlintError::invalid_enum(name, &["real", "constant", "adaptive"]))?;
            settings.step.set_mode(mode);
        }
        if let Some(v) = table.get("constant_step") {
            settings
                .step
                .set_constant_step(toml_f32(v).unwrap_or(settings.step.constant_step()));
        }
        if table.contains_key("min_step") || table.contains_key("max_step") {
            let min = table
                .get("min_step")
                .and_then(toml_f32)
                .unwrap_or(settings.step.min_step());
            let max = table
                .get("max_step")
                .and_then(toml_f32)
                .unwrap_or(settings.step.max_step());
            settings.step.set_adaptive_steps(min, max);
        }
        if let Some(v) = table.get("clamp") {
            settings.step.set_clamp(toml_f32(v));
        }
        if let Some(v) = table.get("camera") {
            settings.camera_position = toml_vec3(v, settings.camera_position);
        }
        if let Some(v) = table.get("seed") {
            settings.seed = v.as_integer().unwrap_or(0).max(0) as u64;
        }
        if let Some(v) = table.get("aabb") {
            settings.aabb = v.as_bool().unwrap_or(false);
        }
        if let Some(t) = table.get("transform").and_then(|v| v.as_table()) {
            settings.transform = read_transform(t);
        }

        Ok(settings)
    }

    /// A fresh context following these settings
    pub fn context(&self) -> SimulationContext {
        SimulationContext::new(self.seed)
            .with_step(self.step)
            .with_camera(self.camera_position)
    }
}

/// A loaded scene: settings, named zones and the system built from them
pub struct Scene {
    pub settings: SimulationSettings,
    pub zones: BTreeMap<String, ZoneHandle>,
    pub system: System,
}

impl Scene {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let root: Table = toml::from_str(source)?;

        let settings = match root.get("simulation") {
            Some(v) => SimulationSettings::from_toml(expect_table(v, "simulation")?)?,
            None => SimulationSettings::default(),
        };

        let mut zones = BTreeMap::new();
        if let Some(v) = root.get("zones") {
            for (name, zone) in expect_table(v, "zones")? {
                let zone = zone_from_table(expect_table(zone, &format!("zones.{name}"))?)?;
                zones.insert(name.clone(), zone.into_handle());
            }
        }

        let mut system = System::new();
        system.enable_aabb_computation(settings.aabb);
        system.set_transform(settings.transform);
        if let Some(v) = root.get("groups") {
            let groups = v.as_array().ok_or_else(|| FlintError::InvalidFieldType {
                field: "groups".to_string(),
                expected: "array of tables".to_string(),
            })?;
            for (i, group) in groups.iter().enumerate() {
                let table = expect_table(group, &format!("groups[{i}]"))?;
                system.add_group(group_from_table(table, &zones)?);
            }
        }
        system.update_transform();

        log::debug!(
            "Loaded scene with {} zones and {} groups",
            zones.len(),
            system.nb_groups()
        );

        Ok(Self {
            settings,
            zones,
            system,
        })
    }

    /// The named zones as a `zones` table, in the same format they load from
    pub fn zones_to_toml(&self) -> Table {
        self.zones
            .iter()
            .map(|(name, zone)| {
                let mut table = zone.borrow().to_descriptor().to_toml();
                if let Some(toml::Value::String(t)) = table.get_mut("type") {
                    *t = t.to_ascii_lowercase();
                }
                (name.clone(), toml::Value::Table(table))
            })
            .collect()
    }
}

fn zone_from_table(table: &Table) -> Result<Zone> {
    let type_name = table
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| FlintError::MissingRequiredField("type".to_string()))?;
    Zone::from_descriptor(&Descriptor::from_toml(type_name, table))
}

/// A zone reference is either the name of a `[zones]` entry or an inline table
fn zone_ref(value: &toml::Value, zones: &BTreeMap<String, ZoneHandle>) -> Result<ZoneHandle> {
    match value {
        toml::Value::String(name) => zones
            .get(name)
            .cloned()
            .ok_or_else(|| FlintError::ZoneNotFound(name.clone())),
        toml::Value::Table(table) => Ok(zone_from_table(table)?.into_handle()),
        _ => Err(FlintError::InvalidFieldType {
            field: "zone".to_string(),
            expected: "zone name or table".to_string(),
        }),
    }
}

fn group_from_table(table: &Table, zones: &BTreeMap<String, ZoneHandle>) -> Result<Group> {
    let capacity = table
        .get("capacity")
        .ok_or_else(|| FlintError::MissingRequiredField("capacity".to_string()))?
        .as_integer()
        .ok_or_else(|| FlintError::InvalidFieldType {
            field: "capacity".to_string(),
            expected: "integer".to_string(),
        })?;
    if capacity <= 0 {
        return Err(FlintError::ValidationError(format!(
            "group capacity must be positive, got {capacity}"
        )));
    }

    let mut group = Group::new(capacity as usize);

    let model = group.model_mut();
    if let Some(v) = table.get("lifetime") {
        let (min, max) = toml_pair(v, model.lifetime());
        model.set_lifetime(min, max);
    }
    if let Some(v) = table.get("immortal") {
        model.set_immortal(v.as_bool().unwrap_or(false));
    }
    if let Some(v) = table.get("params") {
        for (name, value) in expect_table(v, "params")? {
            let param = Param::from_name(name).ok_or_else(|| {
                FlintError::invalid_enum(name, &Param::ALL.map(Param::name))
            })?;
            model.set_param(param, param_model(value, param)?);
        }
    }
    if table.contains_key("color_start") || table.contains_key("color_end") {
        let (start, _) = model.color();
        let start = table
            .get("color_start")
            .map(|v| toml_vec4(v, start))
            .unwrap_or(start);
        let end = table.get("color_end").map(|v| toml_vec4(v, start));
        model.set_color(start, end);
    }

    if let Some(v) = table.get("gravity") {
        group.set_gravity(toml_vec3(v, Vec3::ZERO));
    }
    if let Some(v) = table.get("friction") {
        group.set_friction(toml_f32(v).unwrap_or(0.0));
    }
    if let Some(v) = table.get("radius") {
        group.set_radius(toml_f32(v).unwrap_or(0.0));
    }
    if let Some(v) = table.get("distance") {
        group.enable_distance_computation(v.as_bool().unwrap_or(false));
    }
    if let Some(v) = table.get("sort") {
        group.enable_sorting(v.as_bool().unwrap_or(false));
    }
    if let Some(v) = table.get("blend_mode") {
        let name = expect_str(v, "blend_mode")?;
        let mode = ParticleBlendMode::from_name(name)
            .ok_or_else(|| FlintError::invalid_enum(name, &["alpha", "additive"]))?;
        group.set_blend_mode(mode);
    }

    for (i, emitter) in array_of_tables(table, "emitters")?.enumerate() {
        let emitter = expect_table(emitter, &format!("emitters[{i}]"))?;
        group.add_emitter(emitter_from_table(emitter, zones)?);
    }
    for (i, modifier) in array_of_tables(table, "modifiers")?.enumerate() {
        let modifier = expect_table(modifier, &format!("modifiers[{i}]"))?;
        group.add_modifier(modifier_from_table(modifier, zones)?);
    }

    Ok(group)
}

/// `1.5`, `[min, max]` or `{ start = .., end = .. }`
fn param_model(value: &toml::Value, param: Param) -> Result<ParamModel> {
    if let Some(f) = toml_f32(value) {
        return Ok(ParamModel::constant(f));
    }
    if let Some(table) = value.as_table() {
        let start = table
            .get("start")
            .and_then(toml_f32)
            .unwrap_or(param.default_value());
        let end = table.get("end").and_then(toml_f32).unwrap_or(start);
        return Ok(ParamModel::Interpolated { start, end });
    }
    if value.as_array().is_some_and(|a| a.len() == 2) {
        let default = param.default_value();
        let (min, max) = toml_pair(value, (default, default));
        return Ok(ParamModel::Random { min, max });
    }
    Err(FlintError::InvalidFieldType {
        field: param.name().to_string(),
        expected: "number, [min, max] or { start, end }".to_string(),
    })
}

fn emitter_from_table(table: &Table, zones: &BTreeMap<String, ZoneHandle>) -> Result<Emitter> {
    let kind_name = table.get("kind").map(|v| expect_str(v, "kind")).transpose()?;
    let direction = table
        .get("direction")
        .map(|v| toml_vec3(v, Vec3::Y))
        .unwrap_or(Vec3::Y);

    let kind = match kind_name.unwrap_or("random").to_ascii_lowercase().as_str() {
        "static" => EmitterKind::Static,
        "random" => EmitterKind::Random,
        "straight" => EmitterKind::straight(direction),
        "spheric" => {
            let (min, max) = table
                .get("angles")
                .map(|v| toml_pair(v, (0.0, 0.0)))
                .unwrap_or((0.0, 0.0));
            EmitterKind::spheric(direction, min.to_radians(), max.to_radians())
        }
        "normal" => EmitterKind::Normal {
            normal_zone: table
                .get("normal_zone")
                .map(|v| zone_ref(v, zones))
                .transpose()?,
            inverted: table
                .get("inverted")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        },
        other => {
            return Err(FlintError::invalid_enum(
                other,
                &["static", "random", "straight", "spheric", "normal"],
            ))
        }
    };

    let tank = table
        .get("tank")
        .and_then(|v| v.as_integer())
        .unwrap_or(-1)
        .clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    let flow = table.get("flow").and_then(toml_f32).unwrap_or(1.0);
    if flow < 0.0 && tank < 0 {
        return Err(FlintError::ValidationError(
            "emitter flow and tank cannot both be negative".to_string(),
        ));
    }

    let mut emitter = Emitter::new(kind).with_tank(tank).with_flow(flow);
    if let Some(v) = table.get("zone") {
        let full = table.get("full").and_then(|v| v.as_bool()).unwrap_or(true);
        emitter.set_zone(zone_ref(v, zones)?, full);
    }
    if let Some(v) = table.get("force") {
        let (min, max) = toml_pair(v, (0.0, 0.0));
        emitter.set_force(min, max);
    }
    if let Some(v) = table.get("active") {
        emitter.set_active(v.as_bool().unwrap_or(true));
    }
    Ok(emitter)
}

fn modifier_from_table(
    table: &Table,
    zones: &BTreeMap<String, ZoneHandle>,
) -> Result<Box<dyn Modifier>> {
    let type_name = table
        .get("type")
        .map(|v| expect_str(v, "type"))
        .transpose()?
        .ok_or_else(|| FlintError::MissingRequiredField("type".to_string()))?;
    let zone = zone_ref(
        table
            .get("zone")
            .ok_or_else(|| FlintError::MissingRequiredField("zone".to_string()))?,
        zones,
    )?;
    let triggers = table.get("triggers").map(read_triggers).transpose()?;
    let name = table.get("name").and_then(|v| v.as_str());

    match type_name.to_ascii_lowercase().as_str() {
        "obstacle" => {
            let mut obstacle = Obstacle::new(zone);
            if let Some(t) = triggers {
                obstacle = obstacle.with_triggers(t);
            }
            if let Some(n) = name {
                obstacle = obstacle.with_name(n);
            }
            let bouncing = table
                .get("bouncing_ratio")
                .and_then(toml_f32)
                .unwrap_or(obstacle.bouncing_ratio());
            let friction = table
                .get("friction")
                .and_then(toml_f32)
                .unwrap_or(obstacle.friction());
            Ok(Box::new(obstacle.with_response(bouncing, friction)))
        }
        "destroyer" => {
            let mut destroyer = Destroyer::new(zone);
            if let Some(t) = triggers {
                destroyer = destroyer.with_triggers(t);
            }
            if let Some(n) = name {
                destroyer = destroyer.with_name(n);
            }
            Ok(Box::new(destroyer))
        }
        other => Err(FlintError::invalid_enum(other, &["obstacle", "destroyer"])),
    }
}

fn read_triggers(value: &toml::Value) -> Result<ZoneTrigger> {
    let names: Vec<&str> = match value {
        toml::Value::String(s) => vec![s.as_str()],
        toml::Value::Array(arr) => arr
            .iter()
            .map(|v| {
                v.as_str().ok_or_else(|| FlintError::InvalidFieldType {
                    field: "triggers".to_string(),
                    expected: "array of strings".to_string(),
                })
            })
            .collect::<Result<_>>()?,
        _ => {
            return Err(FlintError::InvalidFieldType {
                field: "triggers".to_string(),
                expected: "string or array of strings".to_string(),
            })
        }
    };
    if names.is_empty() {
        return Err(FlintError::ValidationError(
            "a modifier needs at least one trigger".to_string(),
        ));
    }
    ZoneTrigger::parse(names.iter().copied()).ok_or_else(|| {
        FlintError::invalid_enum(
            &names.join(", "),
            &["inside", "outside", "intersect", "enter", "leave", "always"],
        )
    })
}

fn read_transform(table: &Table) -> Transform {
    let field = |name: &str, default: Vec3| table.get(name).map_or(default, |v| toml_vec3(v, default));
    let transform = Transform::IDENTITY
        .with_position(field("position", Vec3::ZERO))
        .with_rotation(field("rotation", Vec3::ZERO))
        .with_scale(field("scale", Vec3::ONE));
    match table.get("rotation_quat") {
        Some(v) => transform.with_rotation_quat(toml_vec4(v, [0.0, 0.0, 0.0, 1.0])),
        None => transform,
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn expect_table<'a>(value: &'a toml::Value, field: &str) -> Result<&'a Table> {
    value.as_table().ok_or_else(|| FlintError::InvalidFieldType {
        field: field.to_string(),
        expected: "table".to_string(),
    })
}

fn expect_str<'a>(value: &'a toml::Value, field: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| FlintError::InvalidFieldType {
        field: field.to_string(),
        expected: "string".to_string(),
    })
}

fn array_of_tables<'a>(table: &'a Table, key: &str) -> Result<std::slice::Iter<'a, toml::Value>> {
    match table.get(key) {
        None => Ok(Default::default()),
        Some(toml::Value::Array(arr)) => Ok(arr.iter()),
        Some(_) => Err(FlintError::InvalidFieldType {
            field: key.to_string(),
            expected: "array of tables".to_string(),
        }),
    }
}

fn toml_vec3(v: &toml::Value, default: Vec3) -> Vec3 {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 3 {
            return Vec3::new(
                toml_f32(&arr[0]).unwrap_or(default.x),
                toml_f32(&arr[1]).unwrap_or(default.y),
                toml_f32(&arr[2]).unwrap_or(default.z),
            );
        }
    }
    default
}

fn toml_vec4(v: &toml::Value, default: [f32; 4]) -> [f32; 4] {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 4 {
            return [
                toml_f32(&arr[0]).unwrap_or(default[0]),
                toml_f32(&arr[1]).unwrap_or(default[1]),
                toml_f32(&arr[2]).unwrap_or(default[2]),
                toml_f32(&arr[3]).unwrap_or(default[3]),
            ];
        }
    }
    default
}

/// `[a, b]`, or a single number used for both
fn toml_pair(v: &toml::Value, default: (f32, f32)) -> (f32, f32) {
    if let Some(f) = toml_f32(v) {
        return (f, f);
    }
    if let Some(arr) = v.as_array() {
        if arr.len() >= 2 {
            return (
                toml_f32(&arr[0]).unwrap_or(default.0),
                toml_f32(&arr[1]).unwrap_or(default.1),
            );
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneShape;

    const SCENE: &str = r#"
        [simulation]
        step = "constant"
        constant_step = 0.25
        clamp = 1
        camera = [0, 2, 10]
        seed = 7
        aabb = true

        [zones.floor]
        type = "plane"
        position = [0, 0, 0]
        normal = [0, 1, 0]
        shared = true

        [[groups]]
        capacity = 64
        lifetime = [2, 3]
        gravity = [0, -9.8, 0]
        sort = true
        blend_mode = "additive"
        color_start = [1, 0.5, 0, 1]
        color_end = [1, 0, 0, 0]

        [groups.params]
        size = { start = 0.5, end = 0.1 }
        mass = [1, 2]
        rotation_speed = 3

        [[groups.emitters]]
        kind = "spheric"
        zone = { type = "sphere", position = [0, 1, 0], radius = 0.25 }
        direction = [0, 1, 0]
        angles = [30, 10]
        flow = 40
        force = [2, 4]

        [[groups.modifiers]]
        type = "obstacle"
        name = "ground"
        zone = "floor"
        bouncing_ratio = 0.6
        friction = 0.9

        [[groups.modifiers]]
        type = "destroyer"
        zone = { type = "box", position = [0, -5, 0], dimension = [10, 1, 10] }
        triggers = ["inside"]
    "#;

    #[test]
    fn parse_full_scene() {
        let scene = Scene::from_toml_str(SCENE).unwrap();
        let settings = &scene.settings;
        assert_eq!(settings.step.mode(), StepMode::Constant);
        assert_eq!(settings.step.constant_step(), 0.25);
        assert_eq!(settings.step.clamp(), Some(1.0));
        assert_eq!(settings.camera_position, Vec3::new(0.0, 2.0, 10.0));
        assert_eq!(settings.seed, 7);
        assert!(scene.system.is_aabb_computation_enabled());

        assert!(scene.zones["floor"].borrow().is_shared());
        assert_eq!(scene.system.nb_groups(), 1);

        let group = scene.system.group(0);
        assert_eq!(group.capacity(), 64);
        assert_eq!(group.model().lifetime(), (2.0, 3.0));
        assert_eq!(group.gravity(), Vec3::new(0.0, -9.8, 0.0));
        assert!(group.is_sorting_enabled());
        assert_eq!(group.blend_mode(), ParticleBlendMode::Additive);
        assert_eq!(
            group.model().param(Param::Size),
            ParamModel::Interpolated { start: 0.5, end: 0.1 }
        );
        assert_eq!(
            group.model().param(Param::Mass),
            ParamModel::Random { min: 1.0, max: 2.0 }
        );
        assert_eq!(group.model().param(Param::RotationSpeed), ParamModel::constant(3.0));

        let emitter = &group.emitters()[0];
        assert_eq!(emitter.flow(), 40.0);
        assert_eq!(emitter.tank(), -1);
        assert_eq!((emitter.force_min(), emitter.force_max()), (2.0, 4.0));
        let EmitterKind::Spheric {
            angle_min,
            angle_max,
            ..
        } = *emitter.kind()
        else {
            panic!("expected a spheric emitter");
        };
        assert!((angle_min - 10f32.to_radians()).abs() < 1e-6);
        assert!((angle_max - 30f32.to_radians()).abs() < 1e-6);

        let names: Vec<&str> = group.modifiers().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["destroyer", "ground"]);
    }

    #[test]
    fn bundled_fountain_scene_loads() {
        let mut scene =
            Scene::from_toml_str(include_str!("../../../scenes/fountain.toml")).unwrap();
        assert_eq!(scene.settings.step.mode(), StepMode::Adaptive);
        assert_eq!(scene.system.nb_groups(), 2);
        assert_eq!(scene.zones.len(), 2);

        let mut ctx = scene.settings.context();
        for _ in 0..10 {
            assert!(scene.system.update(1.0 / 60.0, &mut ctx));
        }
        // The smoke puff empties its tank on the first step
        assert_eq!(scene.system.group(1).nb_particles(), 150);
        assert!(scene.system.group(0).nb_particles() > 0);
    }

    #[test]
    fn named_zones_are_shared_handles() {
        let scene = Scene::from_toml_str(
            r#"
            [zones.well]
            type = "sphere"
            radius = 2

            [[groups]]
            capacity = 4
            [[groups.modifiers]]
            type = "destroyer"
            zone = "well"
            [[groups.modifiers]]
            type = "obstacle"
            zone = "well"
            "#,
        )
        .unwrap();
        // The map plus the two modifiers
        assert_eq!(std::rc::Rc::strong_count(&scene.zones["well"]), 3);
    }

    #[test]
    fn loaded_scene_simulates() {
        let mut scene = Scene::from_toml_str(SCENE).unwrap();
        let mut ctx = scene.settings.context();
        assert!(scene.system.update(0.5, &mut ctx));
        // Two constant steps at 40 particles per second
        assert_eq!(scene.system.nb_particles(), 20);
    }

    #[test]
    fn unknown_zone_reference() {
        let err = Scene::from_toml_str(
            r#"
            [[groups]]
            capacity = 4
            [[groups.emitters]]
            zone = "nowhere"
            "#,
        )
        .err()
        .unwrap();
        assert!(matches!(err, FlintError::ZoneNotFound(name) if name == "nowhere"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let bad_step = Scene::from_toml_str("[simulation]\nstep = \"warp\"").err().unwrap();
        assert!(matches!(bad_step, FlintError::InvalidEnumValue { .. }));

        let no_capacity = Scene::from_toml_str("[[groups]]\nlifetime = 1").err().unwrap();
        assert!(matches!(no_capacity, FlintError::MissingRequiredField(_)));

        let unlimited_burst = Scene::from_toml_str(
            "[[groups]]\ncapacity = 4\n[[groups.emitters]]\nflow = -1\ntank = -1",
        )
        .err()
        .unwrap();
        assert!(matches!(unlimited_burst, FlintError::ValidationError(_)));

        let bad_trigger = Scene::from_toml_str(
            "[[groups]]\ncapacity = 4\n[[groups.modifiers]]\ntype = \"destroyer\"\nzone = { type = \"point\" }\ntriggers = \"above\"",
        )
        .err()
        .unwrap();
        assert!(matches!(bad_trigger, FlintError::InvalidEnumValue { .. }));

        assert!(matches!(
            Scene::from_toml_str("not toml at all ="),
            Err(FlintError::TomlParseError(_))
        ));
    }

    #[test]
    fn trigger_lists_must_be_non_empty_strings() {
        let modifier = |triggers: &str| {
            Scene::from_toml_str(&format!(
                "[[groups]]\ncapacity = 4\n[[groups.modifiers]]\ntype = \"destroyer\"\nzone = {{ type = \"point\" }}\ntriggers = {triggers}"
            ))
        };

        assert!(matches!(
            modifier("[1, \"inside\"]"),
            Err(FlintError::InvalidFieldType { field, .. }) if field == "triggers"
        ));
        assert!(matches!(modifier("[]"), Err(FlintError::ValidationError(_))));
        assert!(modifier("[\"inside\", \"leave\"]").is_ok());
    }

    #[test]
    fn simulation_transform_reads_quaternion() {
        let scene = Scene::from_toml_str(
            r#"
            [simulation.transform]
            position = [1, 2, 3]
            scale = [2, 2, 2]
            rotation_quat = [0, 0, 0.70710677, 0.70710677]
            "#,
        )
        .unwrap();
        let t = scene.settings.transform;
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Vec3::ZERO);
        assert!(t.rotation_quat.is_some());
        let d = t.to_affine().transform_vector3(Vec3::X);
        assert!((d - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn zones_round_trip_through_toml() {
        let scene = Scene::from_toml_str(
            r#"
            [zones.crate]
            type = "box"
            position = [1, 2, 3]
            dimension = [0.5, 1, 2]
            front = [0, 0, 1]
            up = [0, 1, 0]
            "#,
        )
        .unwrap();

        let mut root = Table::new();
        root.insert("zones".to_string(), toml::Value::Table(scene.zones_to_toml()));
        let exported = toml::to_string(&root).unwrap();
        let reloaded = Scene::from_toml_str(&exported).unwrap();

        let zone = reloaded.zones["crate"].borrow();
        assert_eq!(zone.position(), Vec3::new(1.0, 2.0, 3.0));
        let ZoneShape::Box(b) = zone.shape() else {
            panic!("expected a box");
        };
        assert_eq!(b.dimension(), Vec3::new(0.5, 1.0, 2.0));
    }
}
