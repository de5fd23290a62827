use glam::Vec2;

use crate::{
    gesture::{landmarks::SKELETON, LandmarkFrame},
    scene::Overlay,
};

const TITLE_SCALE: usize = 4;
const TITLE_TOP: usize = 40;
const PREVIEW_FILL: u32 = 0x000000;
const PREVIEW_FILL_ALPHA: f32 = 0.6;
const PREVIEW_BORDER: usize = 2;
const BONE_COLOR: u32 = 0x2ECC71;
const JOINT_COLOR: u32 = 0xFFFFFF;

/// Packed 0RGB pixel buffer that overlay primitives draw into.
pub struct Canvas<'a> {
    pixels: &'a mut [u32],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(pixels: &'a mut [u32], width: usize, height: usize) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            pixels,
            width,
            height,
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.pixels[row * self.width + col] = color;
            }
        }
    }

    fn blend_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32, alpha: f32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                let index = row * self.width + col;
                self.pixels[index] = blend(self.pixels[index], color, alpha);
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, thickness: usize, color: u32) {
        self.fill_rect(x, y, w, thickness, color);
        self.fill_rect(x, (y + h).saturating_sub(thickness), w, thickness, color);
        self.fill_rect(x, y, thickness, h, color);
        self.fill_rect((x + w).saturating_sub(thickness), y, thickness, h, color);
    }

    /// Bresenham line between two pixel positions.
    fn draw_line(&mut self, from: (isize, isize), to: (isize, isize), color: u32) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_dot(&mut self, center: (isize, isize), radius: isize, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(center.0 + dx, center.1 + dy, color);
                }
            }
        }
    }

    /// Draws `text` with the 3×5 font, each font pixel `scale` screen pixels wide.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..3 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx >= self.width {
                break;
            }
        }
    }
}

/// Pixel width of `text` drawn at `scale`, without the trailing gap.
pub fn text_width(text: &str, scale: usize) -> usize {
    (text.chars().count() * 4).saturating_sub(1) * scale
}

/// Title banner plus the hand preview box.
pub fn draw_overlay(canvas: &mut Canvas<'_>, overlay: &Overlay, hand: Option<&LandmarkFrame>) {
    let width = text_width(&overlay.title, TITLE_SCALE);
    let x = canvas.width.saturating_sub(width) / 2;
    canvas.draw_text(&overlay.title, x, TITLE_TOP, TITLE_SCALE, overlay.title_color);

    draw_preview(canvas, overlay, hand);
}

fn draw_preview(canvas: &mut Canvas<'_>, overlay: &Overlay, hand: Option<&LandmarkFrame>) {
    let (w, h) = (overlay.preview_width, overlay.preview_height);
    let right = canvas.width.saturating_sub(overlay.preview_margin);
    let bottom = canvas.height.saturating_sub(overlay.preview_margin);
    let (x, y) = (right.saturating_sub(w), bottom.saturating_sub(h));

    canvas.blend_rect(x, y, w, h, PREVIEW_FILL, PREVIEW_FILL_ALPHA);
    canvas.draw_border(x, y, w, h, PREVIEW_BORDER, overlay.title_color);

    let Some(hand) = hand else {
        return;
    };
    let to_pixel = |point: Vec2| {
        let u = if overlay.preview_mirrored { 1.0 - point.x } else { point.x };
        let px = x as f32 + u.clamp(0.0, 1.0) * (w as f32 - 1.0);
        let py = y as f32 + point.y.clamp(0.0, 1.0) * (h as f32 - 1.0);
        (px.round() as isize, py.round() as isize)
    };

    for &(a, b) in SKELETON.iter() {
        let from = to_pixel(hand.landmark(a).planar());
        let to = to_pixel(hand.landmark(b).planar());
        canvas.draw_line(from, to, BONE_COLOR);
    }
    for landmark in hand.landmarks() {
        canvas.draw_dot(to_pixel(landmark.planar()), 1, JOINT_COLOR);
    }
}

fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        ((ca * (1.0 - t) + cb * t).round() as u32) << shift
    };
    mix(16) | mix(8) | mix(0)
}

/// Rows of a 3×5 glyph, most significant bit on the left.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        _ => [0; 5],
    }
}
