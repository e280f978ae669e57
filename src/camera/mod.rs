/// Cameras producing the view/projection pair a renderer draws with.
/// `Camera3D` is a yaw/pitch fly camera, `Camera2D` a pan/zoom/rotate view.
use crate::math;
use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub yaw: f32,   // Rotation around Y axis (radians)
    pub pitch: f32, // Rotation around X axis (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,

    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: 60.0f32.to_radians(),
            near: 0.1,
            far: 100.0,
            aspect_ratio,
            move_speed: 4.0,
            mouse_sensitivity: 0.002,
        }
    }

    /// Turn to face `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
    }

    pub fn view_matrix(&self) -> Mat4 {
        let rotation = self.rotation_quat();
        let target = self.position + rotation * Vec3::NEG_Z;
        math::look_at(self.position, target, rotation * Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        math::perspective(self.fov, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation_quat() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation_quat() * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation_quat() * Vec3::Y
    }

    fn rotation_quat(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    /// Update orientation from a mouse delta in pixels.
    pub fn rotate(&mut self, mouse_delta_x: f32, mouse_delta_y: f32) {
        self.yaw -= mouse_delta_x * self.mouse_sensitivity;
        self.pitch -= mouse_delta_y * self.mouse_sensitivity;

        const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move in camera space; `up` is world up.
    pub fn move_local(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        let move_vec = self.forward() * forward + self.right() * right + Vec3::Y * up;
        self.position += move_vec * self.move_speed * dt;
    }

    /// Call when the target is resized.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Pixel-space view for 2D drawing: world point `center` lands on `origin`
/// (usually the middle of the viewport), scaled by `zoom` and rotated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera2D {
    pub center: Vec2,
    pub origin: Vec2,
    pub zoom: f32,
    pub rotation: f32,
}

impl Camera2D {
    pub fn new(origin: Vec2) -> Self {
        Self {
            center: Vec2::ZERO,
            origin,
            zoom: 1.0,
            rotation: 0.0,
        }
    }

    /// World to screen pixels.
    pub fn transform(&self) -> Mat3 {
        math::translate2d(self.origin)
            * math::rotate2d(self.rotation)
            * math::scale2d(Vec2::splat(self.zoom))
            * math::translate2d(-self.center)
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        math::transform_point2d(&self.transform().inverse(), p)
    }

    pub fn pan(&mut self, screen_delta: Vec2) {
        let rot = math::rotate2d(-self.rotation);
        self.center -= rot.transform_vector2(screen_delta) / self.zoom.max(f32::EPSILON);
    }
}

/// Key state driving a [`Camera3D`].
#[derive(Copy, Clone, Debug, Default)]
pub struct CameraController {
    pub forward_pressed: bool,
    pub backward_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_camera(&self, camera: &mut Camera3D, dt: f32) {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        camera.move_local(
            axis(self.forward_pressed, self.backward_pressed),
            axis(self.right_pressed, self.left_pressed),
            axis(self.up_pressed, self.down_pressed),
            dt,
        );
    }
}
