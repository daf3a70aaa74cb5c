use glam::{Mat4, Vec3};

/// Placement of one draw: scale, per-axis rotation in degrees, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSpec {
    pub scale: Vec3,
    pub rotation_degrees: Vec3,
    pub translation: Vec3,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }
}

impl TransformSpec {
    pub fn new(scale: Vec3, rotation_degrees: Vec3, translation: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            translation,
        }
    }

    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation_degrees = Vec3::new(x, y, z);
        self
    }

    /// `T * Rx * Ry * Rz * S`. The order is fixed; changing it alters any
    /// draw with non-uniform scale or rotation about more than one axis.
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = self.rotation_degrees;
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_x(rotation.x.to_radians())
            * Mat4::from_rotation_y(rotation.y.to_radians())
            * Mat4::from_rotation_z(rotation.z.to_radians())
            * Mat4::from_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_rotate_translate_unit_corner() {
        let transform = TransformSpec::new(
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(0.0, 90.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
        );
        let corner = transform.model_matrix().transform_point3(Vec3::X);
        assert!(corner.abs_diff_eq(Vec3::new(5.0, 0.0, -2.0), 1e-5), "{corner}");
    }

    #[test]
    fn rotations_apply_z_first() {
        let transform = TransformSpec::default().rotated(90.0, 0.0, 90.0);
        // Z takes +X to +Y, then X takes +Y to +Z.
        let moved = transform.model_matrix().transform_point3(Vec3::X);
        assert!(moved.abs_diff_eq(Vec3::Z, 1e-5), "{moved}");
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(TransformSpec::default().model_matrix(), Mat4::IDENTITY);
    }
}
