use glam::{Mat4, Quat, Vec3};

/// Local transform of a scene node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Decomposes a column-major matrix, as stored in glTF nodes.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Rotates about the local X axis.
    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.rotation *= Quat::from_rotation_x(angle);
        self
    }

    /// Rotates about the local Y axis.
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.rotation *= Quat::from_rotation_y(angle);
        self
    }

    pub fn set_uniform_scale(&mut self, factor: f32) -> &mut Self {
        self.scale = Vec3::splat(factor);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
