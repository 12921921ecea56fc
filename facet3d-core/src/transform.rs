/// 3D transformation matrices and accumulated per-object transform state
use nalgebra::{Matrix4, Vector3};

/// Accumulated transform channels of a scene object.
///
/// The matrix is always rebuilt from these channels, never accumulated
/// multiplicatively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub offset: Vector3<f32>,
    /// Per-axis rotation in radians, unbounded
    pub angle: Vector3<f32>,
    pub scale: Vector3<f32>,
    /// Phase of the circular orbit trajectory in radians
    pub orbit_phase: f32,
}

impl TransformState {
    pub fn new(offset: Vector3<f32>) -> Self {
        Self {
            offset,
            angle: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
            orbit_phase: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, delta: &Vector3<f32>) {
        self.angle += delta;
    }

    /// Additive scale accumulation; zero and negative scales are kept as-is
    pub fn rescale(&mut self, delta: &Vector3<f32>) {
        self.scale += delta;
    }

    pub fn translate(&mut self, delta: &Vector3<f32>) {
        self.offset += delta;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::model_matrix(&self.offset, &self.angle, &self.scale)
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(Vector3::zeros())
    }
}

/// Optional per-channel deltas for one transform update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformDelta {
    pub angle: Option<Vector3<f32>>,
    pub offset: Option<Vector3<f32>>,
    pub scale: Option<Vector3<f32>>,
}

impl TransformDelta {
    pub fn rotate(angle: Vector3<f32>) -> Self {
        Self {
            angle: Some(angle),
            ..Self::default()
        }
    }

    pub fn translate(offset: Vector3<f32>) -> Self {
        Self {
            offset: Some(offset),
            ..Self::default()
        }
    }

    pub fn rescale(scale: Vector3<f32>) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.angle.is_none() && self.offset.is_none() && self.scale.is_none()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn rotation_x(theta: f32) -> Matrix4<f32> {
        let (s, c) = theta.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0,   c,  -s, 0.0,
            0.0,   s,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    pub fn rotation_y(theta: f32) -> Matrix4<f32> {
        let (s, c) = theta.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
              c, 0.0,   s, 0.0,
            0.0, 1.0, 0.0, 0.0,
             -s, 0.0,   c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    pub fn rotation_z(theta: f32) -> Matrix4<f32> {
        let (s, c) = theta.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
              c,  -s, 0.0, 0.0,
              s,   c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        m
    }

    /// Create a rotation matrix from per-axis angles
    pub fn rotation_matrix(angle: &Vector3<f32>) -> Matrix4<f32> {
        // Apply rotations in order: X, then Y, then Z
        Self::rotation_z(angle.z) * Self::rotation_y(angle.y) * Self::rotation_x(angle.x)
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a scale matrix
    pub fn scale_matrix(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// `T(offset) · Rz · Ry · Rx · S(scale)`: scale first, translate last
    pub fn model_matrix(
        offset: &Vector3<f32>,
        angle: &Vector3<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation_matrix(offset) * Self::rotation_matrix(angle) * Self::scale_matrix(scale)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}
