use glam::{Vec2, Vec3};

/// Linear-light colour buffer with a matching depth buffer.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: usize,
    height: usize,
    color: Vec<Vec3>,
    depth: Vec<f32>,
}

/// A vertex already projected to the screen. `depth` is the view-space
/// distance in front of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub position: Vec2,
    pub depth: f32,
}

impl RenderTarget {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            color: vec![Vec3::ZERO; width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Vec3) {
        self.color.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    pub fn color(&self) -> &[Vec3] {
        &self.color
    }

    pub fn color_mut(&mut self) -> &mut [Vec3] {
        &mut self.color
    }

    /// Writes `color` at (x, y) if `depth` is closer than what is stored.
    #[inline]
    pub fn plot(&mut self, x: usize, y: usize, depth: f32, color: Vec3) -> bool {
        let index = y * self.width + x;
        if depth < self.depth[index] {
            self.depth[index] = depth;
            self.color[index] = color;
            true
        } else {
            false
        }
    }

    /// Fills a disc around `center`, calling `shade` with the offset from the
    /// centre in units of the radius (x right, y down). `shade` returns the
    /// colour and the depth of that sample.
    pub fn fill_disc<F>(&mut self, center: Vec2, radius: f32, mut shade: F)
    where
        F: FnMut(Vec2) -> (Vec3, f32),
    {
        if radius <= 0.0 {
            return;
        }
        let radius = radius.max(0.75);
        let Some((x0, x1, y0, y1)) = self.clip_box(center - Vec2::splat(radius), center + Vec2::splat(radius)) else {
            return;
        };
        let inv_radius = 1.0 / radius;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let offset = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center) * inv_radius;
                if offset.length_squared() > 1.0 {
                    continue;
                }
                let (color, depth) = shade(offset);
                self.plot(x, y, depth, color);
            }
        }
    }

    /// Flat-coloured triangle with depth interpolated across its surface.
    pub fn fill_triangle(&mut self, a: ScreenVertex, b: ScreenVertex, c: ScreenVertex, color: Vec3) {
        let area = edge(a.position, b.position, c.position);
        if area.abs() < f32::EPSILON {
            return;
        }
        let min = a.position.min(b.position).min(c.position);
        let max = a.position.max(b.position).max(c.position);
        let Some((x0, x1, y0, y1)) = self.clip_box(min, max) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.position, c.position, p) / area;
                let w1 = edge(c.position, a.position, p) / area;
                let w2 = edge(a.position, b.position, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
                self.plot(x, y, depth, color);
            }
        }
    }

    /// Pixel bounds of a screen rectangle, clipped to the target.
    fn clip_box(&self, min: Vec2, max: Vec2) -> Option<(usize, usize, usize, usize)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        if max.x < 0.0 || max.y < 0.0 || min.x >= self.width as f32 || min.y >= self.height as f32 {
            return None;
        }
        let x0 = min.x.max(0.0) as usize;
        let y0 = min.y.max(0.0) as usize;
        let x1 = (max.x as usize).min(self.width - 1);
        let y1 = (max.y as usize).min(self.height - 1);
        Some((x0, x1, y0, y1))
    }
}

/// Twice the signed area of the triangle (a, b, p).
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
