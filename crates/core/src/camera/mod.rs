use glam::{Mat4, Vec2, Vec3};

use crate::{config::CameraConfig, smoothing::lerp};

/// Perspective camera that drifts toward a pointer-controlled position while
/// always looking at a fixed point.
#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    look_at: Vec3,
    fov_degrees: f32,
    near: f32,
    far: f32,
    gain: Vec2,
    height_offset: f32,
    smoothing: f32,
}

impl CameraRig {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: config.initial_position,
            look_at: config.look_at,
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
            gain: Vec2::new(config.pointer_gain_x, config.pointer_gain_y),
            height_offset: config.height_offset,
            smoothing: config.smoothing,
        }
    }

    /// Where the camera wants to be for the given pointer. Depth is untouched.
    pub fn target_for(&self, pointer: Vec2) -> Vec2 {
        Vec2::new(
            pointer.x * self.gain.x,
            self.height_offset + pointer.y * self.gain.y,
        )
    }

    /// Eases x and y one step toward the pointer target.
    pub fn follow(&mut self, pointer: Vec2) {
        let target = self.target_for(pointer);
        self.position.x = lerp(self.position.x, target.x, self.smoothing);
        self.position.y = lerp(self.position.y, target.y, self.smoothing);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    /// View matrix rebuilt from the current position; the orientation is never
    /// smoothed on its own.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
