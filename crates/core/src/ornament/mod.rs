use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec2, Vec3};

use crate::config::AnimationConfig;

/// Profile and extrusion settings for the star on top of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct StarProfile {
    pub points: usize,
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub depth: f32,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_segments: usize,
}

impl Default for StarProfile {
    fn default() -> Self {
        Self {
            points: 5,
            outer_radius: 0.8,
            inner_radius: 0.4,
            depth: 0.2,
            bevel_thickness: 0.05,
            bevel_size: 0.05,
            bevel_segments: 3,
        }
    }
}

/// Extruded star as a stack of closed rings ordered from back to front.
///
/// Every ring has the same vertex count as the outline and is centred on the
/// bounding box of the whole solid.
#[derive(Debug, Clone)]
pub struct StarGeometry {
    outline: Vec<Vec2>,
    rings: Vec<Vec<Vec3>>,
}

impl StarGeometry {
    pub fn new(profile: &StarProfile) -> Self {
        let outline = star_outline(profile.points, profile.outer_radius, profile.inner_radius);
        let segments = profile.bevel_segments.max(1);

        let bevel = |b: usize| {
            let t = b as f32 / segments as f32;
            let z = profile.bevel_thickness * (t * FRAC_PI_2).cos();
            let size = profile.bevel_size * (t * FRAC_PI_2).sin();
            (z, size)
        };

        let mut rings = Vec::with_capacity(segments * 2 + 2);
        for b in 0..segments {
            let (z, size) = bevel(b);
            rings.push(lift(&offset_contour(&outline, size), -z));
        }
        let side = offset_contour(&outline, profile.bevel_size);
        rings.push(lift(&side, 0.0));
        rings.push(lift(&side, profile.depth));
        for b in (0..segments).rev() {
            let (z, size) = bevel(b);
            rings.push(lift(&offset_contour(&outline, size), profile.depth + z));
        }

        center_rings(&mut rings);
        Self { outline, rings }
    }

    /// The flat star outline before extrusion, counter-clockwise.
    pub fn outline(&self) -> &[Vec2] {
        &self.outline
    }

    pub fn rings(&self) -> &[Vec<Vec3>] {
        &self.rings
    }

    /// Axis-aligned bounds over every ring vertex.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        bounds(&self.rings)
    }
}

impl Default for StarGeometry {
    fn default() -> Self {
        Self::new(&StarProfile::default())
    }
}

/// Alternating outer/inner vertices starting on the +x axis.
pub fn star_outline(points: usize, outer_radius: f32, inner_radius: f32) -> Vec<Vec2> {
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            let angle = i as f32 * PI / points as f32;
            Vec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// Pushes every vertex of a counter-clockwise contour outward by `distance`
/// along its mitred corner direction.
fn offset_contour(contour: &[Vec2], distance: f32) -> Vec<Vec2> {
    if distance == 0.0 {
        return contour.to_vec();
    }
    let n = contour.len();
    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let current = contour[i];
            let next = contour[(i + 1) % n];
            let incoming = outward_normal(current - prev);
            let outgoing = outward_normal(next - current);
            let bisector = (incoming + outgoing).normalize_or_zero();
            // Clamp the miter so needle-sharp corners stay bounded.
            let cos_half = bisector.dot(incoming).max(0.25);
            current + bisector * (distance / cos_half)
        })
        .collect()
}

fn outward_normal(edge: Vec2) -> Vec2 {
    Vec2::new(edge.y, -edge.x).normalize_or_zero()
}

fn lift(contour: &[Vec2], z: f32) -> Vec<Vec3> {
    contour.iter().map(|p| p.extend(z)).collect()
}

fn bounds(rings: &[Vec<Vec3>]) -> (Vec3, Vec3) {
    rings.iter().flatten().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    )
}

fn center_rings(rings: &mut [Vec<Vec3>]) {
    let (min, max) = bounds(rings);
    let center = (min + max) * 0.5;
    for point in rings.iter_mut().flatten() {
        *point -= center;
    }
}

/// Time-driven motion of the star: a slow spin and a small vertical bob.
#[derive(Debug, Clone)]
pub struct Ornament {
    rotation_y: f32,
    height: f32,
    rotation_step: f32,
    base_height: f32,
    bob_amplitude: f32,
    bob_frequency: f32,
}

impl Ornament {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            rotation_y: 0.0,
            height: config.ornament_base_height,
            rotation_step: config.ornament_rotation_step,
            base_height: config.ornament_base_height,
            bob_amplitude: config.ornament_bob_amplitude,
            bob_frequency: config.ornament_bob_frequency,
        }
    }

    /// Advances the spin by one frame and sets the height for `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f32) {
        self.rotation_y += self.rotation_step;
        self.height = self.base_height + (elapsed * self.bob_frequency).sin() * self.bob_amplitude;
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, self.height, 0.0)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position()) * Mat4::from_rotation_y(self.rotation_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_alternates_radii() {
        let outline = star_outline(5, 0.8, 0.4);
        assert_eq!(outline.len(), 10);
        for (i, point) in outline.iter().enumerate() {
            let expected = if i % 2 == 0 { 0.8 } else { 0.4 };
            assert!((point.length() - expected).abs() < 1e-5);
        }
        assert!((outline[0] - Vec2::new(0.8, 0.0)).length() < 1e-6);
    }

    #[test]
    fn extrusion_is_centred_with_expected_thickness() {
        let star = StarGeometry::default();
        assert_eq!(star.rings().len(), 8);
        assert!(star.rings().iter().all(|ring| ring.len() == 10));

        let (min, max) = star.bounds();
        let center = (min + max) * 0.5;
        assert!(center.length() < 1e-5);
        // depth plus a bevel on either face
        assert!(((max.z - min.z) - 0.3).abs() < 1e-5);
    }

    #[test]
    fn bevel_widens_the_side_walls() {
        let star = StarGeometry::default();
        let face = &star.rings()[0];
        let side = &star.rings()[3];
        let spread = |ring: &Vec<Vec3>| ring[0].truncate().distance(ring[5].truncate());
        assert!(spread(side) > spread(face));
    }

    #[test]
    fn bob_stays_within_amplitude() {
        let mut ornament = Ornament::new(&AnimationConfig::default());
        for frame in 0..600 {
            ornament.advance(frame as f32 / 60.0);
            assert!((ornament.height() - 7.6).abs() <= 0.05 + 1e-6);
        }
        assert!((ornament.rotation_y() - 600.0 * 0.005).abs() < 1e-3);
    }
}
