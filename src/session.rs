//! Per-window view state: the camera, its projection mode, the cursor
//! tracker and the frame clock, owned together and passed by reference to
//! every per-frame step.

use glam::{Mat4, Vec2, Vec3};
use log::{debug, info};

use crate::camera::{Camera, CameraMovement};
use crate::config::{KeyBindings, ProjectionConfig, ViewerConfig};
use crate::input::InputState;
use crate::shader::{self, ShaderUniforms};

/// Pose the camera is reset to when switching into orthographic mode.
const ORTHO_POSITION: Vec3 = Vec3::new(0.0, 0.0, 10.0);
const ORTHO_FRONT: Vec3 = Vec3::NEG_Z;
const ORTHO_UP: Vec3 = Vec3::Y;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

/// Matrices for one frame, as pushed by [`RenderSession::apply_view`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec3,
}

#[derive(Debug, Clone)]
pub struct RenderSession {
    camera: Camera,
    mode: ProjectionMode,
    projection: ProjectionConfig,
    bindings: KeyBindings,
    viewport: (u32, u32),
    last_cursor: Option<Vec2>,
    last_frame: f32,
    delta_time: f32,
    close_requested: bool,
}

impl RenderSession {
    pub fn new(camera: Camera, viewport: (u32, u32)) -> Self {
        Self {
            camera,
            mode: ProjectionMode::Perspective,
            projection: ProjectionConfig::default(),
            bindings: KeyBindings::default(),
            viewport: (viewport.0.max(1), viewport.1.max(1)),
            last_cursor: None,
            last_frame: 0.0,
            delta_time: 0.0,
            close_requested: false,
        }
    }

    pub fn from_config(config: &ViewerConfig, bindings: KeyBindings) -> Self {
        let settings = &config.camera;
        let mut camera = Camera::new(settings.position, settings.front, settings.up, settings.zoom);
        camera.movement_speed = settings.movement_speed;
        camera.mouse_sensitivity = settings.mouse_sensitivity;
        let mut session = Self::new(camera, (config.window.width, config.window.height));
        session.projection = config.projection;
        session.bindings = bindings;
        session
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    /// Switches projection. Entering orthographic mode resets the camera pose;
    /// the previous pose is not restored when leaving it. Returns whether the
    /// mode changed.
    pub fn select_projection(&mut self, mode: ProjectionMode) -> bool {
        if self.mode == mode {
            return false;
        }
        if mode == ProjectionMode::Orthographic {
            self.camera.set_pose(ORTHO_POSITION, ORTHO_FRONT, ORTHO_UP);
        }
        info!("projection switched to {mode:?}");
        self.mode = mode;
        true
    }

    /// Advances the frame clock to `now` (seconds) and applies held keys.
    pub fn begin_frame(&mut self, now: f32, input: &InputState) {
        self.delta_time = now - self.last_frame;
        self.last_frame = now;
        self.process_keys(input);
    }

    fn process_keys(&mut self, input: &InputState) {
        let keys = self.bindings;
        if input.is_key_down(keys.close) {
            self.request_close();
        }

        // Movement is ignored while the orthographic pose is pinned.
        if self.mode == ProjectionMode::Perspective {
            let moves = [
                (keys.forward, CameraMovement::Forward),
                (keys.backward, CameraMovement::Backward),
                (keys.left, CameraMovement::Left),
                (keys.right, CameraMovement::Right),
                (keys.up, CameraMovement::Up),
                (keys.down, CameraMovement::Down),
            ];
            for (key, movement) in moves {
                if input.is_key_down(key) {
                    self.camera.process_keyboard(movement, self.delta_time);
                }
            }
        }

        if input.is_key_down(keys.perspective) {
            self.select_projection(ProjectionMode::Perspective);
        }
        if input.is_key_down(keys.orthographic) {
            self.select_projection(ProjectionMode::Orthographic);
        }
    }

    /// Feeds an absolute cursor position. Returns the offset applied, with y
    /// pointing up; the first position ever seen yields a zero offset.
    pub fn handle_cursor(&mut self, x: f32, y: f32) -> Vec2 {
        let current = Vec2::new(x, y);
        let last = self.last_cursor.replace(current).unwrap_or(current);
        let offset = Vec2::new(current.x - last.x, last.y - current.y);
        if self.mode == ProjectionMode::Perspective && offset != Vec2::ZERO {
            self.camera.process_mouse_movement(offset.x, offset.y);
        }
        offset
    }

    pub fn handle_scroll(&mut self, y_offset: f32) {
        debug!("scroll y offset = {y_offset}");
        self.camera.process_mouse_scroll(y_offset);
    }

    pub fn compute_matrices(&self) -> FrameMatrices {
        let aspect = self.aspect_ratio();
        let ProjectionConfig {
            near,
            far,
            ortho_half_height: scale,
        } = self.projection;
        match self.mode {
            ProjectionMode::Perspective => FrameMatrices {
                view: self.camera.view_matrix(),
                projection: Mat4::perspective_rh(self.camera.zoom.to_radians(), aspect, near, far),
                view_position: self.camera.position,
            },
            ProjectionMode::Orthographic => FrameMatrices {
                view: Mat4::look_at_rh(ORTHO_POSITION, ORTHO_POSITION + ORTHO_FRONT, ORTHO_UP),
                projection: Mat4::orthographic_rh(
                    -scale * aspect,
                    scale * aspect,
                    -scale,
                    scale,
                    near,
                    far,
                ),
                view_position: ORTHO_POSITION,
            },
        }
    }

    /// Pushes `view`, `projection` and `viewPosition` for the current frame.
    pub fn apply_view(&self, shader: &mut dyn ShaderUniforms) -> FrameMatrices {
        let matrices = self.compute_matrices();
        shader.set_mat4(shader::VIEW, matrices.view);
        shader.set_mat4(shader::PROJECTION, matrices.projection);
        shader.set_vec3(shader::VIEW_POSITION, matrices.view_position);
        matrices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, NamedKey};
    use crate::recording::RecordingBackend;
    use crate::shader::UniformValue;

    fn session() -> RenderSession {
        RenderSession::from_config(&ViewerConfig::default(), KeyBindings::default())
    }

    fn press(key: char) -> InputState {
        let mut input = InputState::new();
        input.set_key_down(KeyCode::Character(key));
        input
    }

    #[test]
    fn first_cursor_event_is_debounced() {
        let mut session = session();
        let before = session.camera().clone();
        assert_eq!(session.handle_cursor(731.0, 12.0), Vec2::ZERO);
        assert_eq!(session.camera(), &before);

        let offset = session.handle_cursor(741.0, 2.0);
        assert_eq!(offset, Vec2::new(10.0, 10.0));
        assert!(session.camera().yaw() > before.yaw());
        assert!(session.camera().pitch() > before.pitch());
    }

    #[test]
    fn orthographic_switch_resets_pose_once() {
        let mut session = session();
        assert!(session.select_projection(ProjectionMode::Orthographic));
        assert_eq!(session.camera().position, ORTHO_POSITION);

        session.camera.position = Vec3::new(3.0, 3.0, 3.0);
        assert!(!session.select_projection(ProjectionMode::Orthographic));
        assert_eq!(session.camera().position, Vec3::new(3.0, 3.0, 3.0));

        assert!(session.select_projection(ProjectionMode::Perspective));
        assert!(!session.select_projection(ProjectionMode::Perspective));
        assert_eq!(session.camera().position, Vec3::new(3.0, 3.0, 3.0));

        assert!(session.select_projection(ProjectionMode::Orthographic));
        assert_eq!(session.camera().position, ORTHO_POSITION);
    }

    #[test]
    fn perspective_pose_is_not_restored() {
        let mut session = session();
        let start = session.camera().position;
        session.begin_frame(0.0, &press('O'));
        session.begin_frame(0.1, &press('P'));
        assert_eq!(session.mode(), ProjectionMode::Perspective);
        assert_ne!(session.camera().position, start);
        assert_eq!(session.camera().position, ORTHO_POSITION);
    }

    #[test]
    fn movement_scales_with_frame_delta() {
        let mut session = session();
        session.begin_frame(1.0, &InputState::new());
        let start = session.camera().position;
        session.begin_frame(1.5, &press('W'));
        assert!((session.delta_time() - 0.5).abs() < 1e-6);
        let travelled = session.camera().position.distance(start);
        assert!((travelled - 1.25).abs() < 1e-4);
    }

    #[test]
    fn escape_requests_close() {
        let mut session = session();
        let mut input = InputState::new();
        input.set_key_down(KeyCode::Named(NamedKey::Escape));
        assert!(!session.should_close());
        session.begin_frame(0.016, &input);
        assert!(session.should_close());
    }

    #[test]
    fn perspective_projection_uses_zoom_and_aspect() {
        let mut session = session();
        session.handle_scroll(35.0);
        assert_eq!(session.camera().zoom, 45.0);
        let expected = Mat4::perspective_rh(45f32.to_radians(), 1000.0 / 800.0, 0.1, 100.0);
        assert!(session.compute_matrices().projection.abs_diff_eq(expected, 1e-6));

        session.resize(500, 1000);
        let expected = Mat4::perspective_rh(45f32.to_radians(), 0.5, 0.1, 100.0);
        assert!(session.compute_matrices().projection.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn every_scroll_event_updates_zoom_immediately() {
        let mut session = session();
        session.handle_scroll(1.0);
        assert_eq!(session.camera().zoom, 79.0);
        session.handle_scroll(-3.0);
        assert_eq!(session.camera().zoom, 82.0);
        let expected = Mat4::perspective_rh(82f32.to_radians(), 1000.0 / 800.0, 0.1, 100.0);
        assert!(session.compute_matrices().projection.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn orthographic_view_ignores_camera_pose() {
        let mut session = session();
        session.select_projection(ProjectionMode::Orthographic);
        session.camera.position = Vec3::new(-4.0, 9.0, 1.0);
        let matrices = session.compute_matrices();
        let expected_view = Mat4::look_at_rh(ORTHO_POSITION, Vec3::ZERO, Vec3::Y);
        assert!(matrices.view.abs_diff_eq(expected_view, 1e-6));
        let expected = Mat4::orthographic_rh(-12.5, 12.5, -10.0, 10.0, 0.1, 100.0);
        assert!(matrices.projection.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn apply_view_pushes_camera_uniforms() {
        let session = session();
        let mut shader = RecordingBackend::new();
        let matrices = session.apply_view(&mut shader);
        let names: Vec<String> = shader.uniform_pushes().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["view", "projection", "viewPosition"]);
        assert_eq!(
            shader.last_uniform("viewPosition"),
            Some(UniformValue::Vec3(Vec3::new(0.0, 5.0, 12.0)))
        );
        assert_eq!(matrices.view_position, Vec3::new(0.0, 5.0, 12.0));
    }
}
