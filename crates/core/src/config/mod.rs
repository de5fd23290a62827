use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Top-level configuration structure for the application.
///
/// Every value is a fixed constant of the display; the structure exists so the
/// subsystems share one source of truth and the constants can be inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub gesture: GestureConfig,
    pub layout: LayoutConfig,
    pub animation: AnimationConfig,
    pub camera: CameraConfig,
    pub detector: DetectorConfig,
}

/// Smoothing and hysteresis constants for the gesture signal adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    pub initial_pinch_distance: f32,
    pub distance_smoothing: f32,
    /// Smoothed pinch distance above which the display scatters.
    pub chaos_threshold: f32,
    /// Smoothed pinch distance below which the display gathers into the tree.
    pub tree_threshold: f32,
    pub pointer_smoothing: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            initial_pinch_distance: 0.15,
            distance_smoothing: 0.1,
            chaos_threshold: 0.25,
            tree_threshold: 0.10,
            pointer_smoothing: 0.05,
        }
    }
}

/// Shape constants for the two particle layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub particle_count: usize,
    pub chaos_radius: f32,
    pub tree_height: f32,
    pub tree_radius_factor: f32,
    /// Power applied to the radial sample; values below one pull particles
    /// toward the outer surface of the cone.
    pub tree_density_exponent: f32,
    pub gold_probability: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            particle_count: 2000,
            chaos_radius: 18.0,
            tree_height: 14.0,
            tree_radius_factor: 0.32,
            tree_density_exponent: 0.6,
            gold_probability: 0.6,
        }
    }
}

/// Per-frame animation constants. Rates are applied once per render frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub progress_smoothing: f32,
    pub particle_spin_rate: f32,
    pub tree_scale: f32,
    pub chaos_scale: f32,
    pub field_rotation_step: f32,
    pub ornament_rotation_step: f32,
    pub ornament_base_height: f32,
    pub ornament_bob_amplitude: f32,
    pub ornament_bob_frequency: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            progress_smoothing: 0.04,
            particle_spin_rate: 0.1,
            tree_scale: 1.0,
            chaos_scale: 0.5,
            field_rotation_step: 0.0015,
            ornament_rotation_step: 0.005,
            ornament_base_height: 7.6,
            ornament_bob_amplitude: 0.05,
            ornament_bob_frequency: 1.5,
        }
    }
}

/// Camera placement and pointer-follow constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub initial_position: Vec3,
    pub look_at: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub pointer_gain_x: f32,
    pub pointer_gain_y: f32,
    pub height_offset: f32,
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_position: Vec3::new(0.0, 4.0, 24.0),
            look_at: Vec3::new(0.0, 1.0, 0.0),
            fov_degrees: 40.0,
            near: 0.1,
            far: 200.0,
            pointer_gain_x: 7.0,
            pointer_gain_y: 4.0,
            height_offset: 5.0,
            smoothing: 0.05,
        }
    }
}

/// Options forwarded to the external hand-landmark detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub capture_width: u32,
    pub capture_height: u32,
    pub max_num_hands: u32,
    pub model_complexity: u32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            capture_width: 640,
            capture_height: 480,
            max_num_hands: 1,
            model_complexity: 1,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl DetectorConfig {
    /// Renders the options as command line arguments for the detector process.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "--width".to_string(),
            self.capture_width.to_string(),
            "--height".to_string(),
            self.capture_height.to_string(),
            "--max-num-hands".to_string(),
            self.max_num_hands.to_string(),
            "--model-complexity".to_string(),
            self.model_complexity.to_string(),
            "--min-detection-confidence".to_string(),
            self.min_detection_confidence.to_string(),
            "--min-tracking-confidence".to_string(),
            self.min_tracking_confidence.to_string(),
        ]
    }
}
