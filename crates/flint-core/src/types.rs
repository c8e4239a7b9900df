//! Spatial types

use glam::{Affine3A, EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A 3D transform with position, rotation (Euler angles), and scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation in degrees (Euler angles: pitch, yaw, roll)
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Optional quaternion rotation [x, y, z, w]. When present, takes precedence
    /// over Euler angles in to_affine() to avoid gimbal lock.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rotation_quat: Option<[f32; 4]>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
        rotation_quat: None,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation_quat(mut self, q: [f32; 4]) -> Self {
        self.rotation_quat = Some(q);
        self
    }

    /// Rotation as a quaternion (ZYX Euler order when no quaternion is set)
    pub fn rotation_quat(&self) -> Quat {
        match self.rotation_quat {
            Some(q) => Quat::from_array(q).normalize(),
            None => Quat::from_euler(
                EulerRot::ZYX,
                self.rotation.z.to_radians(),
                self.rotation.y.to_radians(),
                self.rotation.x.to_radians(),
            ),
        }
    }

    /// Convert to an affine transform (scale, then rotation, then translation)
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}
