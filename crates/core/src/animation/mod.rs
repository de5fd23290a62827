use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    camera::CameraRig,
    config::{AnimationConfig, CameraConfig},
    gesture::GestureSnapshot,
    layout::ParticleLayout,
    ornament::Ornament,
    smoothing::{lerp, ExponentialSmoother},
};

/// Per-frame transform of a single particle. Rotation holds XYZ Euler angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for ParticleTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl ParticleTransform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.position)
    }
}

/// Advances the blend between the tree and chaos layouts once per render frame
/// and keeps the ornament and camera moving with it.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    progress: ExponentialSmoother,
    spin_rate: f32,
    tree_scale: f32,
    chaos_scale: f32,
    field_rotation_step: f32,
    field_rotation: f32,
    transforms: Vec<ParticleTransform>,
    ornament: Ornament,
    camera: CameraRig,
    frames: u64,
}

impl AnimationDriver {
    /// Creates a driver whose transform buffer holds exactly `particle_count`
    /// entries.
    pub fn new(config: &AnimationConfig, camera: &CameraConfig, particle_count: usize) -> Self {
        Self {
            progress: ExponentialSmoother::new(0.0, config.progress_smoothing),
            spin_rate: config.particle_spin_rate,
            tree_scale: config.tree_scale,
            chaos_scale: config.chaos_scale,
            field_rotation_step: config.field_rotation_step,
            field_rotation: 0.0,
            transforms: vec![ParticleTransform::default(); particle_count],
            ornament: Ornament::new(config),
            camera: CameraRig::new(camera),
            frames: 0,
        }
    }

    /// Runs one render frame.
    ///
    /// `layout` must hold as many particles as the driver was created for.
    pub fn advance(&mut self, gesture: GestureSnapshot, elapsed: f32, layout: &ParticleLayout) {
        debug_assert_eq!(
            layout.len(),
            self.transforms.len(),
            "transform buffer must match the particle count"
        );

        let progress = self.progress.update(gesture.mode.target_progress());
        let scale = lerp(self.tree_scale, self.chaos_scale, progress);
        let spin = elapsed * self.spin_rate;

        let positions = layout
            .target_positions()
            .iter()
            .zip(layout.chaos_positions());
        for (index, (transform, (target, chaos))) in
            self.transforms.iter_mut().zip(positions).enumerate()
        {
            transform.position = target.lerp(*chaos, progress);
            transform.rotation = Vec3::new(spin, index as f32, 0.0);
            transform.scale = scale;
        }
        self.field_rotation += self.field_rotation_step;

        self.ornament.advance(elapsed);
        self.camera.follow(gesture.pointer);
        self.frames += 1;
    }

    /// Blend factor between the tree (0) and chaos (1) layouts.
    pub fn progress(&self) -> f32 {
        self.progress.value()
    }

    pub fn transforms(&self) -> &[ParticleTransform] {
        &self.transforms
    }

    /// Rotation of the whole particle field about the vertical axis.
    pub fn field_rotation(&self) -> f32 {
        self.field_rotation
    }

    pub fn ornament(&self) -> &Ornament {
        &self.ornament
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LayoutConfig, gesture::GestureMode};
    use glam::Vec2;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixture(count: usize) -> (AnimationDriver, ParticleLayout) {
        let layout = ParticleLayout::generate(
            &LayoutConfig {
                particle_count: count,
                ..LayoutConfig::default()
            },
            &mut StdRng::seed_from_u64(11),
        );
        let driver =
            AnimationDriver::new(&AnimationConfig::default(), &CameraConfig::default(), count);
        (driver, layout)
    }

    fn snapshot(mode: GestureMode) -> GestureSnapshot {
        GestureSnapshot {
            mode,
            pointer: Vec2::ZERO,
        }
    }

    #[test]
    fn idle_tree_matches_target_layout() {
        let (mut driver, layout) = fixture(300);
        for frame in 0..600 {
            driver.advance(snapshot(GestureMode::Tree), frame as f32 / 60.0, &layout);
        }
        assert_eq!(driver.progress(), 0.0);
        for (transform, target) in driver.transforms().iter().zip(layout.target_positions()) {
            assert_eq!(transform.position, *target);
            assert_eq!(transform.scale, 1.0);
        }
    }

    #[test]
    fn tree_settles_back_after_chaos() {
        let (mut driver, layout) = fixture(300);
        let mut frame = 0;
        for _ in 0..300 {
            driver.advance(snapshot(GestureMode::Chaos), frame as f32 / 60.0, &layout);
            frame += 1;
        }
        assert!(driver.progress() > 0.99);

        for _ in 0..1_000 {
            driver.advance(snapshot(GestureMode::Tree), frame as f32 / 60.0, &layout);
            frame += 1;
        }
        assert!(driver.progress() < 1e-6, "progress {}", driver.progress());
        for (transform, target) in driver.transforms().iter().zip(layout.target_positions()) {
            assert!(transform.position.distance(*target) < 1e-5, "{transform:?}");
            assert_eq!(transform.scale, 1.0);
        }
    }

    #[test]
    fn settled_chaos_matches_sphere_layout() {
        let (mut driver, layout) = fixture(300);
        for frame in 0..1_000 {
            driver.advance(snapshot(GestureMode::Chaos), frame as f32 / 60.0, &layout);
        }
        assert!((driver.progress() - 1.0).abs() < 1e-4);
        for (transform, chaos) in driver.transforms().iter().zip(layout.chaos_positions()) {
            assert!(transform.position.distance(*chaos) < 1e-2);
            assert!((transform.scale - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn progress_stays_in_unit_interval() {
        let (mut driver, layout) = fixture(10);
        let modes = [GestureMode::Chaos, GestureMode::Tree];
        for frame in 0..2_000 {
            let mode = modes[(frame / 37) % 2];
            driver.advance(snapshot(mode), frame as f32 / 60.0, &layout);
            let progress = driver.progress();
            assert!((0.0..=1.0).contains(&progress), "progress {progress}");
        }
    }

    #[test]
    fn first_chaos_frame_moves_four_percent() {
        let (mut driver, layout) = fixture(5);
        driver.advance(snapshot(GestureMode::Chaos), 0.0, &layout);
        assert!((driver.progress() - 0.04).abs() < 1e-7);
        let expected = layout.target_positions()[0].lerp(layout.chaos_positions()[0], 0.04);
        assert!(driver.transforms()[0].position.distance(expected) < 1e-5);
        assert!((driver.transforms()[0].scale - 0.98).abs() < 1e-6);
    }

    #[test]
    fn rotation_uses_time_and_particle_index() {
        let (mut driver, layout) = fixture(4);
        driver.advance(snapshot(GestureMode::Tree), 2.0, &layout);
        for (index, transform) in driver.transforms().iter().enumerate() {
            assert!((transform.rotation.x - 0.2).abs() < 1e-6);
            assert_eq!(transform.rotation.y, index as f32);
            assert_eq!(transform.rotation.z, 0.0);
        }
    }

    #[test]
    fn field_rotation_accumulates_regardless_of_progress() {
        let (mut driver, layout) = fixture(4);
        for frame in 0..100 {
            let mode = if frame < 50 { GestureMode::Chaos } else { GestureMode::Tree };
            driver.advance(snapshot(mode), 0.0, &layout);
        }
        assert!((driver.field_rotation() - 0.15).abs() < 1e-4);
        assert_eq!(driver.frames(), 100);
    }

    #[test]
    fn camera_follows_pointer() {
        let (mut driver, layout) = fixture(1);
        let gesture = GestureSnapshot {
            mode: GestureMode::Tree,
            pointer: Vec2::new(1.0, -1.0),
        };
        for _ in 0..1_000 {
            driver.advance(gesture, 0.0, &layout);
        }
        let position = driver.camera().position();
        assert!((position.x - 7.0).abs() < 1e-3);
        assert!((position.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn matrix_applies_scale_then_translation() {
        let transform = ParticleTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::ZERO,
            scale: 0.5,
        };
        let moved = transform.matrix().transform_point3(Vec3::X);
        assert!(moved.distance(Vec3::new(1.5, 2.0, 3.0)) < 1e-6);
    }
}
