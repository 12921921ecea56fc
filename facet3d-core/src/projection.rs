/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Closest the camera may dolly toward its target
const MIN_DISTANCE: f32 = 0.1;

/// Mouse-look pitch limit, short of straight up or down
pub const MAX_PITCH_DEGREES: f32 = 89.0;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
    /// Lowest height panning may take the camera to
    pub floor: Option<f32>,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
            mode: ProjectionMode::Perspective,
            floor: None,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let (_, up) = self.basis();
        Matrix4::look_at_rh(&self.position, &self.target, &up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let height = (self.position - self.target).norm();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Unit view direction; looks down -z when position and target coincide
    fn forward(&self) -> Vector3<f32> {
        (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3::z())
    }

    /// Unit vectors to the camera's right and up, in world space.
    ///
    /// Looking along `up` falls back to world x as the right axis.
    fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = self.forward();
        let right = forward
            .cross(&self.up)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);
        (right, up)
    }

    /// Slide camera and target together across the view plane.
    ///
    /// A move that would take the camera below `floor` is dropped.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (right, up) = self.basis();
        let shift = right * dx + up * dy;
        if let Some(floor) = self.floor {
            if self.position.y + shift.y < floor {
                return;
            }
        }
        self.position += shift;
        self.target += shift;
    }

    /// Move toward (positive) or away from (negative) the target
    pub fn zoom(&mut self, amount: f32) {
        let distance = ((self.target - self.position).norm() - amount).max(MIN_DISTANCE);
        self.position = self.target - self.forward() * distance;
    }

    /// Turn the view around the camera position by yaw and pitch deltas in
    /// degrees. Pitch stays within [`MAX_PITCH_DEGREES`] of level and the
    /// distance to the target is kept.
    pub fn look(&mut self, yaw: f32, pitch: f32) {
        let distance = (self.target - self.position).norm().max(MIN_DISTANCE);
        let forward = self.forward();

        let limit = MAX_PITCH_DEGREES.to_radians();
        let yaw = forward.z.atan2(forward.x) + yaw.to_radians();
        let pitch = (forward.y.clamp(-1.0, 1.0).asin() + pitch.to_radians()).clamp(-limit, limit);

        let front = Vector3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.target = self.position + front * distance;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Project a 3D point to 2D screen space.
    ///
    /// Returns `(x, y, depth)` with depth in normalized device units, or `None`
    /// when the point is behind the camera or outside the depth range. Points
    /// off-screen sideways are still returned so triangles can be clipped.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection_matrix() * self.view_matrix() * model_matrix;
        self.project_with(&mvp, point, width, height)
    }

    /// Same as [`Camera::project_to_screen`] with a precomputed MVP matrix
    pub fn project_with(
        &self,
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero or negative w (behind the eye)
        if clip.w < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        if !(-1.0..=1.0).contains(&depth) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_center_projects_to_middle() {
        let camera = Camera::new(80, 40);
        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 80, 40)
            .unwrap();
        assert_relative_eq!(x, 40.0, epsilon = 1e-4);
        assert_relative_eq!(y, 20.0, epsilon = 1e-4);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_behind_camera_rejected() {
        let camera = Camera::default();
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 800, 600)
            .is_none());
    }

    #[test]
    fn test_pan_and_zoom() {
        let mut camera = Camera::default();
        camera.pan(1.0, 0.0);
        assert_relative_eq!(camera.position, Point3::new(1.0, 0.0, 5.0), epsilon = 1e-6);
        assert_relative_eq!(camera.target, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-6);

        camera.zoom(2.0);
        assert_relative_eq!(camera.position, Point3::new(1.0, 0.0, 3.0), epsilon = 1e-6);

        camera.zoom(100.0);
        assert_relative_eq!((camera.target - camera.position).norm(), MIN_DISTANCE, epsilon = 1e-6);
    }

    #[test]
    fn test_top_down_camera_stays_finite() {
        let mut camera = Camera {
            position: Point3::new(0.0, 5.0, 0.0),
            ..Camera::default()
        };
        camera.pan(0.1, 0.0);
        assert_relative_eq!(camera.position, Point3::new(0.1, 5.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(camera.target, Point3::new(0.1, 0.0, 0.0), epsilon = 1e-6);
        assert!(camera.view_matrix().iter().all(|v| v.is_finite()));

        let (x, y, _) = camera
            .project_to_screen(&Point3::new(0.1, 0.0, 0.0), &Matrix4::identity(), 80, 40)
            .unwrap();
        assert_relative_eq!(x, 40.0, epsilon = 1e-3);
        assert_relative_eq!(y, 20.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zoom_on_target_stays_finite() {
        let mut camera = Camera {
            position: Point3::origin(),
            ..Camera::default()
        };
        camera.zoom(1.0);
        camera.pan(0.0, 0.5);
        assert!(camera.position.iter().all(|v| v.is_finite()));
        assert!(camera.target.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_look_turns_and_clamps_pitch() {
        let mut camera = Camera::default();
        camera.look(90.0, 0.0);
        assert_relative_eq!(camera.target, Point3::new(5.0, 0.0, 5.0), epsilon = 1e-4);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));

        camera.look(0.0, 200.0);
        let forward = (camera.target - camera.position).normalize();
        assert_relative_eq!(forward.y, MAX_PITCH_DEGREES.to_radians().sin(), epsilon = 1e-5);
        assert_relative_eq!((camera.target - camera.position).norm(), 5.0, epsilon = 1e-4);

        camera.look(0.0, -400.0);
        let forward = (camera.target - camera.position).normalize();
        assert_relative_eq!(forward.y, -MAX_PITCH_DEGREES.to_radians().sin(), epsilon = 1e-5);
    }

    #[test]
    fn test_pan_respects_floor() {
        let mut camera = Camera {
            floor: Some(0.0),
            ..Camera::default()
        };
        camera.pan(0.0, -0.1);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));
        camera.pan(0.0, 0.1);
        assert_relative_eq!(camera.position.y, 0.1, epsilon = 1e-6);
        camera.pan(0.0, -0.1);
        assert_relative_eq!(camera.position.y, 0.0, epsilon = 1e-6);
    }
}
