use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::layout::{hex_to_linear, ParticleColor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: u32,
    pub intensity: f32,
}

/// Spot light aimed at `target`. `angle` is the half-angle of the cone in
/// radians and `penumbra` the fraction of it that fades out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotLight {
    pub position: Vec3,
    pub target: Vec3,
    pub angle: f32,
    pub penumbra: f32,
    pub intensity: f32,
    pub color: u32,
}

impl SpotLight {
    /// Attenuation for a point seen from the light along `direction`
    /// (normalised, light → point).
    pub fn cone_attenuation(&self, direction: Vec3) -> f32 {
        let axis = (self.target - self.position).normalize_or_zero();
        let cone = self.angle.cos();
        let penumbra = (self.angle * (1.0 - self.penumbra)).cos();
        smoothstep(cone, penumbra, axis.dot(direction))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
    pub color: u32,
}

/// Image-based reflection source approximated by a vertical sky gradient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub preset: String,
    pub sky: u32,
    pub ground: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub env_intensity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bloom {
    pub luminance_threshold: f32,
    pub intensity: f32,
    pub mipmap_blur: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToneMapping {
    AcesFilmic,
    Reinhard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vignette {
    pub darkness: f32,
    pub offset: f32,
}

/// Post-processing passes, applied in field order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessing {
    pub bloom: Bloom,
    pub tone_mapping: ToneMapping,
    pub vignette: Vignette,
}

/// Screen-space decorations drawn on top of the 3D scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlay {
    pub title: String,
    pub title_color: u32,
    pub preview_width: usize,
    pub preview_height: usize,
    pub preview_margin: usize,
    pub preview_mirrored: bool,
}

/// Fixed description of everything rendered around the particle field.
///
/// The software renderer reads the lights, materials, post chain and overlay.
/// `environment.preset`, `particle_segments` and the ornament's metalness and
/// roughness are descriptive only: they record the scene as authored and no
/// pass samples them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub background: u32,
    pub ambient: AmbientLight,
    pub spot: SpotLight,
    pub point: PointLight,
    pub environment: Environment,
    pub particle_radius: f32,
    pub particle_segments: u32,
    pub particle_material: Material,
    pub ornament_material: Material,
    pub post: PostProcessing,
    pub overlay: Overlay,
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        let gold = ParticleColor::GOLD_HEX;
        let red = ParticleColor::RED_HEX;
        Self {
            background: 0x010403,
            ambient: AmbientLight {
                color: gold,
                intensity: 0.4,
            },
            spot: SpotLight {
                position: Vec3::new(15.0, 20.0, 15.0),
                target: Vec3::ZERO,
                angle: 0.5,
                penumbra: 1.0,
                intensity: 2.0,
                color: gold,
            },
            point: PointLight {
                position: Vec3::new(-10.0, 5.0, -10.0),
                intensity: 1.5,
                color: red,
            },
            environment: Environment {
                preset: "city".to_string(),
                sky: 0x9DB4C8,
                ground: 0x2A2522,
            },
            particle_radius: 0.25,
            particle_segments: 24,
            particle_material: Material {
                color: 0xFFFFFF,
                emissive: 0x000000,
                emissive_intensity: 0.0,
                metalness: 1.0,
                roughness: 0.1,
                env_intensity: 2.5,
            },
            ornament_material: Material {
                color: gold,
                emissive: gold,
                emissive_intensity: 3.0,
                metalness: 1.0,
                roughness: 0.1,
                env_intensity: 3.0,
            },
            post: PostProcessing {
                bloom: Bloom {
                    luminance_threshold: 0.8,
                    intensity: 1.5,
                    mipmap_blur: true,
                },
                tone_mapping: ToneMapping::AcesFilmic,
                vignette: Vignette {
                    darkness: 1.2,
                    offset: 0.2,
                },
            },
            overlay: Overlay {
                title: "MERRY CHRISTMAS, VANDY".to_string(),
                title_color: gold,
                preview_width: 160,
                preview_height: 120,
                preview_margin: 20,
                preview_mirrored: true,
            },
        }
    }
}

impl SceneDescriptor {
    pub fn background_linear(&self) -> Vec3 {
        hex_to_linear(self.background)
    }
}

/// Hermite step between `edge0` and `edge1`. The edges may be given in either
/// order; reversed edges produce a falling step.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_is_full_on_axis_and_dark_outside_cone() {
        let scene = SceneDescriptor::default();
        let axis = (scene.spot.target - scene.spot.position).normalize();
        assert!((scene.spot.cone_attenuation(axis) - 1.0).abs() < 1e-6);
        assert_eq!(scene.spot.cone_attenuation(-axis), 0.0);
    }

    #[test]
    fn smoothstep_handles_reversed_edges() {
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.8, 0.16, 0.0), 1.0);
        assert_eq!(smoothstep(0.8, 0.16, 1.0), 0.0);
    }

    #[test]
    fn descriptor_serializes() {
        let json = serde_json::to_string(&SceneDescriptor::default()).unwrap();
        assert!(json.contains("\"luminance_threshold\":0.8"));
        assert!(json.contains("\"title\":\"MERRY CHRISTMAS, VANDY\""));
    }
}
