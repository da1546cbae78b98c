use generational_arena::Index;
use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::name_hash;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct TransformId(pub Index);
impl Into<Index> for TransformId {
    fn into(self) -> Index {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct Transform {
    name: String,
    hash: u64,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub(crate) parent: Option<TransformId>,
    pub(crate) children: Vec<TransformId>,
}
impl Transform {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hash: name_hash(name),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
            children: vec![],
        }
    }

    pub fn with_trs(name: &str, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Self::new(name)
        }
    }

    /// Euler angles in degrees, applied roll (z) then pitch (x) then yaw (y).
    pub fn from_euler_degrees(name: &str, position: Vec3, euler: Vec3, scale: Vec3) -> Self {
        Self::with_trs(name, position, euler_degrees_to_quat(euler), scale)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// [`name_hash`] of the current name.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
        self.hash = name_hash(name);
    }

    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    pub fn children(&self) -> &[TransformId] {
        &self.children
    }

    /// Scale, then rotation, then translation.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn euler_degrees(&self) -> Vec3 {
        quat_to_euler_degrees(self.rotation)
    }
}

pub fn euler_degrees_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

pub fn quat_to_euler_degrees(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}
