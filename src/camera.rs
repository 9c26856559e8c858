use std::f32::consts::FRAC_PI_2;
use glam::{vec3, Mat4, Vec3, Vec4};
use crate::polygon::Vertex2D;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.1;

/// Perspective camera. The view, projection and screen matrices are cached
/// and rebuilt together whenever the pose, clip range, fov or viewport
/// changes, which is why the fields are private.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    znear: f32,
    zfar: f32,
    width: usize,
    height: usize,

    view: Mat4,
    projection: Mat4,
    screen: Mat4,
}

impl Camera {
    pub fn new(width: usize, height: usize) -> Camera {
        let mut camera = Camera {
            position: vec3(0.0, 0.0, 5.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 60.0,
            znear: 0.1,
            zfar: 100.0,
            width,
            height,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            screen: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    pub fn position(&self) -> Vec3 { self.position }
    pub fn yaw(&self) -> f32 { self.yaw }
    pub fn pitch(&self) -> f32 { self.pitch }
    pub fn fov(&self) -> f32 { self.fov }
    pub fn znear(&self) -> f32 { self.znear }
    pub fn zfar(&self) -> f32 { self.zfar }
    pub fn viewport(&self) -> (usize, usize) { (self.width, self.height) }

    pub fn screen_mat(&self) -> &Mat4 { &self.screen }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrices();
    }

    /// Sets yaw and pitch (radians); pitch is clamped short of straight up/down.
    pub fn set_rotation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_matrices();
    }

    /// `fov` is the vertical field of view in degrees.
    pub fn set_lens(&mut self, fov: f32, znear: f32, zfar: f32) {
        self.fov = fov;
        self.znear = znear;
        self.zfar = zfar;
        self.update_matrices();
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.update_matrices();
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.set_rotation(self.yaw + delta_yaw, self.pitch + delta_pitch);
    }

    /// Moves along the look direction, the horizontal right vector and world up.
    pub fn move_by(&mut self, forward: f32, right: f32, up: f32) {
        self.position += self.forward() * forward + self.right() * right + Vec3::Y * up;
        self.update_matrices();
    }

    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        vec3(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        vec3(cos_yaw, 0.0, -sin_yaw)
    }

    fn update_matrices(&mut self) {
        self.view = Self::build_view(self.position, self.yaw, self.pitch);
        self.projection = Self::build_projection(self.fov, self.aspect(), self.znear, self.zfar);
        self.screen = Self::build_screen(self.width as f32, self.height as f32);
    }

    fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    fn build_view(position: Vec3, yaw: f32, pitch: f32) -> Mat4 {
        let rotation = Mat4::from_rotation_x(-pitch) * Mat4::from_rotation_y(-yaw);
        let translation = Mat4::from_translation(-position);
        rotation * translation
    }

    fn build_projection(fov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
        let tan_half_fov = (0.5 * fov.to_radians()).tan();
        let depth = zfar - znear;

        Mat4::from_cols(
            Vec4::new(1.0 / (aspect * tan_half_fov), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0 / tan_half_fov, 0.0, 0.0),
            // w' = -z_view
            Vec4::new(0.0, 0.0, -(zfar + znear) / depth, -1.0),
            Vec4::new(0.0, 0.0, -2.0 * zfar * znear / depth, 0.0),
        )
    }

    fn build_screen(width: f32, height: f32) -> Mat4 {
        // NDC [-1, 1] to pixels, screen Y grows downwards
        Mat4::from_cols(
            Vec4::new(width / 2.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, -height / 2.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(width / 2.0, height / 2.0, 0.0, 1.0),
        )
    }

    pub fn world_to_view(&self, p: Vec3) -> Vec3 {
        self.view.transform_point3(p)
    }

    /// Projects a view-space point to screen space.
    ///
    /// Returns `None` for points on or behind the eye plane (`w <= 0`); the
    /// near-plane clip is expected to have removed those already.
    pub fn view_to_screen(&self, p: Vec3) -> Option<Vertex2D> {
        let clip = self.projection * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }

        let ndc = clip / clip.w;
        let screen = self.screen * ndc;

        Some(Vertex2D::new(screen.x, screen.y, 1.0 / clip.w))
    }

    pub fn world_to_screen(&self, p: Vec3) -> Option<Vertex2D> {
        self.view_to_screen(self.world_to_view(p))
    }
}
