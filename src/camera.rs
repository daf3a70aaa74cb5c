use glam::{Mat4, Vec3};

pub const DEFAULT_MOVEMENT_SPEED: f32 = 2.5;
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.1;
const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Free-flying camera steered by yaw and pitch.
///
/// `front`, `right` and `up` are always derived from yaw/pitch and the world
/// up axis, so they stay orthonormal.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Camera {
    pub fn new(position: Vec3, front: Vec3, world_up: Vec3, zoom: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: world_up.normalize_or_zero(),
            yaw: -90.0,
            pitch: 0.0,
            zoom,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
        };
        camera.look_along(front);
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Overwrites the whole pose. Yaw and pitch are recovered from `front`.
    pub fn set_pose(&mut self, position: Vec3, front: Vec3, world_up: Vec3) {
        self.position = position;
        self.world_up = world_up.normalize_or_zero();
        self.look_along(front);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Moves along the camera basis by `movement_speed * delta_time`.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        let offset = match direction {
            CameraMovement::Forward => self.front,
            CameraMovement::Backward => -self.front,
            CameraMovement::Left => -self.right,
            CameraMovement::Right => self.right,
            CameraMovement::Up => self.up,
            CameraMovement::Down => -self.up,
        };
        self.position += offset * velocity;
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Narrows the field of view for positive offsets. No limits are applied.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom -= y_offset;
    }

    fn look_along(&mut self, front: Vec3) {
        let front = front.normalize_or_zero();
        if front != Vec3::ZERO {
            self.yaw = front.z.atan2(front.x).to_degrees();
            self.pitch = front.y.asin().to_degrees().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(self.world_up).normalize_or_zero();
        self.up = self.right.cross(self.front).normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    #[test]
    fn yaw_and_pitch_follow_initial_front() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, -0.5, -2.0), Vec3::Y, 80.0);
        assert!((camera.yaw() + 90.0).abs() < 1e-3);
        assert!(camera.pitch() < 0.0);
        assert!(close(camera.front(), Vec3::new(0.0, -0.5, -2.0).normalize()));
        assert!(close(camera.right(), Vec3::X));
    }

    #[test]
    fn keyboard_moves_along_basis_scaled_by_delta() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 45.0);
        camera.process_keyboard(CameraMovement::Forward, 2.0);
        assert!(close(camera.position, Vec3::new(0.0, 0.0, -5.0)));
        camera.process_keyboard(CameraMovement::Right, 0.4);
        camera.process_keyboard(CameraMovement::Up, 0.4);
        assert!(close(camera.position, Vec3::new(1.0, 1.0, -5.0)));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 45.0);
        camera.process_mouse_movement(0.0, 10_000.0);
        assert_eq!(camera.pitch(), 89.0);
        assert!(camera.front().y < 1.0);
        assert!(camera.up().y > 0.0);
    }

    #[test]
    fn scroll_is_unclamped() {
        let mut camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 45.0);
        camera.process_mouse_scroll(50.0);
        assert_eq!(camera.zoom, -5.0);
    }

    #[test]
    fn view_matrix_looks_down_front() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, Vec3::Y, 45.0);
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(close(origin, Vec3::new(0.0, 0.0, -10.0)));
    }
}
