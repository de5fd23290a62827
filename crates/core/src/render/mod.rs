//! Software renderer for the particle field.
//!
//! Every frame is rasterised into a linear HDR buffer, run through the post
//! chain and packed into 0RGB pixels ready for a window surface.

use glam::{Mat4, Vec2, Vec3};

use crate::{
    layout::{hex_to_linear, ParticleColor},
    ornament::StarGeometry,
    scene::SceneDescriptor,
    session::RenderState,
};

mod overlay;
mod post;
mod raster;

pub use overlay::{draw_overlay, text_width, Canvas};
pub use post::{luminance, pack_srgb, tone_map, vignette, PostChain};
pub use raster::{RenderTarget, ScreenVertex};

/// Weight of the environment gradient relative to direct light.
const ENV_SCALE: f32 = 0.3;
/// Below this many pixels a particle is skipped entirely.
const MIN_PARTICLE_RADIUS: f32 = 0.2;

/// Scene lighting resolved to linear colours once at construction.
#[derive(Debug, Clone)]
struct Lighting {
    ambient: Vec3,
    spot_color: Vec3,
    point_color: Vec3,
    sky: Vec3,
    ground: Vec3,
    gold: Vec3,
    red: Vec3,
    particle_tint: Vec3,
    ornament: Vec3,
    shininess: f32,
}

impl Lighting {
    fn new(scene: &SceneDescriptor) -> Self {
        let roughness = scene.particle_material.roughness.max(0.02);
        Self {
            ambient: hex_to_linear(scene.ambient.color) * scene.ambient.intensity,
            spot_color: hex_to_linear(scene.spot.color) * scene.spot.intensity,
            point_color: hex_to_linear(scene.point.color) * scene.point.intensity,
            sky: hex_to_linear(scene.environment.sky),
            ground: hex_to_linear(scene.environment.ground),
            gold: ParticleColor::Gold.linear_rgb(),
            red: ParticleColor::Red.linear_rgb(),
            particle_tint: hex_to_linear(scene.particle_material.color),
            ornament: ornament_color(scene),
            shininess: 2.0 / (roughness * roughness) - 2.0,
        }
    }
}

/// Flat colour of the star: its emission plus ambient and environment light
/// reflected off the base colour.
fn ornament_color(scene: &SceneDescriptor) -> Vec3 {
    let material = &scene.ornament_material;
    let base = hex_to_linear(material.color);
    let ambient = hex_to_linear(scene.ambient.color) * scene.ambient.intensity;
    let environment = hex_to_linear(scene.environment.sky)
        .lerp(hex_to_linear(scene.environment.ground), 0.5)
        * material.env_intensity
        * ENV_SCALE;
    hex_to_linear(material.emissive) * material.emissive_intensity + base * (ambient + environment)
}

/// Draws [`RenderState`]s into a fixed-size pixel buffer.
#[derive(Debug)]
pub struct Renderer {
    width: usize,
    height: usize,
    scene: SceneDescriptor,
    lighting: Lighting,
    star: StarGeometry,
    target: RenderTarget,
    post: PostChain,
    pixels: Vec<u32>,
}

impl Renderer {
    pub fn new(width: usize, height: usize, scene: SceneDescriptor) -> Self {
        Self {
            width,
            height,
            lighting: Lighting::new(&scene),
            scene,
            star: StarGeometry::default(),
            target: RenderTarget::new(width, height),
            post: PostChain::new(width, height),
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scene(&self) -> &SceneDescriptor {
        &self.scene
    }

    /// Renders one frame and returns the packed 0RGB pixels, row-major.
    pub fn draw(&mut self, state: &RenderState<'_>) -> &[u32] {
        self.target.clear(self.scene.background_linear());

        if self.width > 0 && self.height > 0 {
            let projector = Projector::new(state, self.width, self.height);
            self.draw_particles(state, &projector);
            self.draw_ornament(state, &projector);
        }

        self.post
            .apply(self.target.color_mut(), &self.scene.post, &mut self.pixels);

        let mut canvas = Canvas::new(&mut self.pixels, self.width, self.height);
        draw_overlay(&mut canvas, &self.scene.overlay, state.hand);

        &self.pixels
    }

    fn draw_particles(&mut self, state: &RenderState<'_>, projector: &Projector) {
        let field = Mat4::from_rotation_y(state.field_rotation);
        let radius = self.scene.particle_radius;
        let metalness = self.scene.particle_material.metalness;
        let env_intensity = self.scene.particle_material.env_intensity;
        let lighting = &self.lighting;
        let scene = &self.scene;
        let eye = projector.eye;

        for (transform, color) in state.transforms.iter().zip(state.colors) {
            let center = field.transform_point3(transform.position);
            let Some(screen) = projector.project(center) else {
                continue;
            };
            let world_radius = radius * transform.scale;
            let pixel_radius = world_radius * projector.focal / screen.depth;
            if pixel_radius < MIN_PARTICLE_RADIUS {
                continue;
            }

            let base = match color {
                ParticleColor::Gold => lighting.gold,
                ParticleColor::Red => lighting.red,
            } * lighting.particle_tint;

            self.target.fill_disc(screen.position, pixel_radius, |offset| {
                let z = (1.0 - offset.length_squared()).max(0.0).sqrt();
                let normal = projector
                    .camera_to_world
                    .transform_vector3(Vec3::new(offset.x, -offset.y, z))
                    .normalize_or_zero();
                let point = center + normal * world_radius;
                let view_dir = (eye - point).normalize_or_zero();

                let mut light = lighting.ambient * base;

                let reflected = normal * (2.0 * normal.dot(view_dir)) - view_dir;
                let sky_mix = reflected.y * 0.5 + 0.5;
                light += lighting.ground.lerp(lighting.sky, sky_mix) * base * env_intensity * ENV_SCALE;

                let spot_dir = (scene.spot.position - point).normalize_or_zero();
                let spot = scene.spot.cone_attenuation(-spot_dir);
                light += blinn_phong(normal, view_dir, spot_dir, base, metalness, lighting.shininess)
                    * lighting.spot_color
                    * spot;

                let point_dir = (scene.point.position - point).normalize_or_zero();
                light += blinn_phong(normal, view_dir, point_dir, base, metalness, lighting.shininess)
                    * lighting.point_color;

                (light, screen.depth - z * world_radius)
            });
        }
    }

    fn draw_ornament(&mut self, state: &RenderState<'_>, projector: &Projector) {
        let model = state.ornament.model_matrix();
        let color = self.lighting.ornament;

        for ring in self.star.rings() {
            let projected: Option<Vec<ScreenVertex>> = ring
                .iter()
                .map(|p| projector.project(model.transform_point3(*p)))
                .collect();
            let Some(projected) = projected else {
                continue;
            };
            let centroid = ring.iter().copied().sum::<Vec3>() / ring.len().max(1) as f32;
            let Some(hub) = projector.project(model.transform_point3(centroid)) else {
                continue;
            };
            for (i, a) in projected.iter().enumerate() {
                let b = projected[(i + 1) % projected.len()];
                self.target.fill_triangle(hub, *a, b, color);
            }
        }
    }
}

/// Maps world positions to screen pixels for the current camera.
struct Projector {
    view_projection: Mat4,
    view: Mat4,
    camera_to_world: Mat4,
    eye: Vec3,
    near: f32,
    size: Vec2,
    /// Pixels per world unit at distance 1.
    focal: f32,
}

impl Projector {
    fn new(state: &RenderState<'_>, width: usize, height: usize) -> Self {
        let aspect = width as f32 / height as f32;
        let view = state.camera.view();
        let half_fov = state.camera.fov_degrees().to_radians() * 0.5;
        Self {
            view_projection: state.camera.view_projection(aspect),
            view,
            camera_to_world: view.inverse(),
            eye: state.camera.position(),
            near: state.camera.near(),
            size: Vec2::new(width as f32, height as f32),
            focal: height as f32 * 0.5 / half_fov.tan(),
        }
    }

    fn project(&self, world: Vec3) -> Option<ScreenVertex> {
        let depth = -self.view.transform_point3(world).z;
        if depth <= self.near {
            return None;
        }
        let ndc = self.view_projection.project_point3(world);
        let position = Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.size.x,
            (0.5 - ndc.y * 0.5) * self.size.y,
        );
        Some(ScreenVertex { position, depth })
    }
}

fn blinn_phong(
    normal: Vec3,
    view_dir: Vec3,
    light_dir: Vec3,
    base: Vec3,
    metalness: f32,
    shininess: f32,
) -> Vec3 {
    let n_dot_l = normal.dot(light_dir).max(0.0);
    if n_dot_l == 0.0 {
        return Vec3::ZERO;
    }
    let half = (light_dir + view_dir).normalize_or_zero();
    let specular = normal.dot(half).max(0.0).powf(shininess) * (shininess + 8.0) / 8.0;
    // fully metallic surfaces keep a quarter of the diffuse term
    let diffuse = (1.0 - 0.75 * metalness) * n_dot_l;
    base * (diffuse + specular * n_dot_l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, LayoutConfig};
    use crate::session::Session;
    use rand::{rngs::StdRng, SeedableRng};

    fn session(particles: usize) -> Session {
        let config = AppConfig {
            layout: LayoutConfig {
                particle_count: particles,
                ..LayoutConfig::default()
            },
            ..AppConfig::default()
        };
        Session::with_rng(&config, &mut StdRng::seed_from_u64(3))
    }

    fn channels(pixel: u32) -> [u32; 3] {
        [(pixel >> 16) & 0xFF, (pixel >> 8) & 0xFF, pixel & 0xFF]
    }

    #[test]
    fn frame_matches_requested_size() {
        let mut session = session(100);
        session.on_render_frame(1.0 / 60.0);
        let mut renderer = Renderer::new(240, 150, SceneDescriptor::default());
        let pixels = renderer.draw(&session.render_state());
        assert_eq!(pixels.len(), 240 * 150);
    }

    #[test]
    fn empty_field_shows_dark_background() {
        let mut session = session(0);
        session.on_render_frame(1.0 / 60.0);
        let mut renderer = Renderer::new(200, 200, SceneDescriptor::default());
        let pixels = renderer.draw(&session.render_state());
        for channel in channels(pixels[100 * 200 + 10]) {
            assert!(channel < 0x10);
        }
    }

    #[test]
    fn tree_and_star_light_up_the_frame() {
        let mut session = session(2000);
        for _ in 0..10 {
            session.on_render_frame(1.0 / 60.0);
        }
        let mut renderer = Renderer::new(320, 200, SceneDescriptor::default());
        let pixels = renderer.draw(&session.render_state());
        let brightest = pixels.iter().map(|p| channels(*p)[0]).max().unwrap_or(0);
        assert!(brightest > 0x80);
    }

    #[test]
    fn ornament_reflects_its_environment() {
        let mut scene = SceneDescriptor::default();
        let lit = ornament_color(&scene);
        scene.ornament_material.env_intensity = 0.0;
        let unlit = ornament_color(&scene);
        assert!(lit.x > unlit.x && lit.y > unlit.y);

        scene.ornament_material.emissive_intensity = 0.0;
        scene.ambient.intensity = 0.0;
        assert_eq!(ornament_color(&scene), Vec3::ZERO);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let session = session(0);
        let projector = Projector::new(&session.render_state(), 100, 100);
        assert!(projector.project(Vec3::new(0.0, 4.0, 40.0)).is_none());
        let centre = projector.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert!((centre.position - Vec2::splat(50.0)).length() < 1e-3);
    }
}
