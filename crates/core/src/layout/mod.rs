use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// Fixed colour assigned to a particle when the layout is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleColor {
    Gold,
    Red,
}

impl ParticleColor {
    pub const GOLD_HEX: u32 = 0xFABC02;
    pub const RED_HEX: u32 = 0xC30F16;

    pub fn hex(self) -> u32 {
        match self {
            Self::Gold => Self::GOLD_HEX,
            Self::Red => Self::RED_HEX,
        }
    }

    /// Linear-light RGB, the space the renderer shades in.
    pub fn linear_rgb(self) -> Vec3 {
        hex_to_linear(self.hex())
    }
}

/// Converts a `0xRRGGBB` sRGB colour to linear-light RGB.
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// The two precomputed particle arrangements plus per-particle colours.
///
/// The three arrays are parallel and never change after generation.
#[derive(Debug, Clone)]
pub struct ParticleLayout {
    chaos: Vec<Vec3>,
    target: Vec<Vec3>,
    colors: Vec<ParticleColor>,
}

impl ParticleLayout {
    /// Samples a layout from `rng`. Per particle the draws happen in a fixed
    /// order (sphere, cone, colour), so a seeded generator reproduces a layout.
    pub fn generate<R: Rng + ?Sized>(config: &LayoutConfig, rng: &mut R) -> Self {
        let count = config.particle_count;
        let mut chaos = Vec::with_capacity(count);
        let mut target = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for _ in 0..count {
            chaos.push(sample_sphere(config.chaos_radius, rng));
            target.push(sample_cone(
                config.tree_height,
                config.tree_radius_factor,
                config.tree_density_exponent,
                rng,
            ));
            colors.push(if rng.gen_bool(config.gold_probability) {
                ParticleColor::Gold
            } else {
                ParticleColor::Red
            });
        }

        tracing::debug!(count, "generated particle layout");

        Self {
            chaos,
            target,
            colors,
        }
    }

    pub fn from_entropy(config: &LayoutConfig) -> Self {
        Self::generate(config, &mut rand::thread_rng())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn chaos_positions(&self) -> &[Vec3] {
        &self.chaos
    }

    pub fn target_positions(&self) -> &[Vec3] {
        &self.target
    }

    pub fn colors(&self) -> &[ParticleColor] {
        &self.colors
    }
}

/// Point in a ball of `radius`, with the radial sample taken as
/// `radius * sqrt(u)` and the direction from spherical coordinates.
pub fn sample_sphere<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let r = radius * rng.gen::<f32>().sqrt();
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Point inside an upright cone of `height` whose radius shrinks linearly to
/// the apex. The cone is centred vertically on the origin.
pub fn sample_cone<R: Rng + ?Sized>(
    height: f32,
    radius_factor: f32,
    density_exponent: f32,
    rng: &mut R,
) -> Vec3 {
    let h = rng.gen::<f32>() * height;
    let radius = (height - h) * radius_factor * rng.gen::<f32>().powf(density_exponent);
    let angle = rng.gen::<f32>() * TAU;
    Vec3::new(angle.cos() * radius, h - height * 0.5, angle.sin() * radius)
}
