use glam::{Vec2, Vec3};

use crate::scene::{smoothstep, Bloom, PostProcessing, ToneMapping, Vignette};

const LUMA: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);
const LUMINANCE_SMOOTHING: f32 = 0.025;
/// Blur radii standing in for successive mip levels of the bloom pyramid.
const BLOOM_RADII: [usize; 3] = [2, 6, 14];

pub fn luminance(color: Vec3) -> f32 {
    color.dot(LUMA)
}

/// Scratch buffers for the full-screen passes, reused across frames.
#[derive(Debug, Clone)]
pub struct PostChain {
    width: usize,
    height: usize,
    bright: Vec<Vec3>,
    blurred: Vec<Vec3>,
    accumulated: Vec<Vec3>,
    scratch: Vec<Vec3>,
    column: Vec<Vec3>,
}

impl PostChain {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            bright: vec![Vec3::ZERO; len],
            blurred: vec![Vec3::ZERO; len],
            accumulated: vec![Vec3::ZERO; len],
            scratch: vec![Vec3::ZERO; len],
            column: vec![Vec3::ZERO; height],
        }
    }

    /// Runs bloom, tone mapping and vignette over `hdr`, then writes packed
    /// 0RGB pixels to `output`.
    pub fn apply(&mut self, hdr: &mut [Vec3], settings: &PostProcessing, output: &mut [u32]) {
        debug_assert_eq!(hdr.len(), self.width * self.height);
        debug_assert_eq!(output.len(), hdr.len());

        self.bloom(hdr, &settings.bloom);

        let size = Vec2::new(self.width as f32, self.height as f32);
        for (index, (color, out)) in hdr.iter().zip(output.iter_mut()).enumerate() {
            let x = index % self.width;
            let y = index / self.width;
            let uv = (Vec2::new(x as f32, y as f32) + 0.5) / size;
            let mapped = tone_map(*color, settings.tone_mapping);
            let shaded = mapped * vignette(uv, &settings.vignette);
            *out = pack_srgb(shaded);
        }
    }

    fn bloom(&mut self, hdr: &mut [Vec3], bloom: &Bloom) {
        if bloom.intensity <= 0.0 {
            return;
        }
        let threshold = bloom.luminance_threshold;
        for (bright, color) in self.bright.iter_mut().zip(hdr.iter()) {
            let weight = smoothstep(threshold, threshold + LUMINANCE_SMOOTHING, luminance(*color));
            *bright = *color * weight;
        }

        let levels: &[usize] = if bloom.mipmap_blur {
            &BLOOM_RADII
        } else {
            &BLOOM_RADII[..1]
        };
        self.accumulated.fill(Vec3::ZERO);
        for &radius in levels {
            self.blurred.copy_from_slice(&self.bright);
            box_blur(
                &mut self.blurred,
                &mut self.scratch,
                &mut self.column,
                self.width,
                radius,
            );
            for (sum, value) in self.accumulated.iter_mut().zip(&self.blurred) {
                *sum += *value;
            }
        }

        let gain = bloom.intensity / levels.len() as f32;
        for (color, glow) in hdr.iter_mut().zip(&self.accumulated) {
            *color += *glow * gain;
        }
    }
}

/// Separable box blur of `radius` pixels, edges clamped. `scratch` matches
/// `data` in size and `column` holds one column of the image.
fn box_blur(
    data: &mut [Vec3],
    scratch: &mut [Vec3],
    column: &mut [Vec3],
    width: usize,
    radius: usize,
) {
    let height = column.len();
    if radius == 0 || width == 0 || height == 0 {
        return;
    }
    debug_assert_eq!(data.len(), width * height);
    let norm = 1.0 / (2 * radius + 1) as f32;

    for y in 0..height {
        let row = &data[y * width..(y + 1) * width];
        let out = &mut scratch[y * width..(y + 1) * width];
        blur_line(width, radius, norm, |i| row[i], |i, v| out[i] = v);
    }
    for x in 0..width {
        let read = |i: usize| scratch[i * width + x];
        blur_line(height, radius, norm, read, |i, v| column[i] = v);
        for (y, value) in column.iter().enumerate() {
            data[y * width + x] = *value;
        }
    }
}

/// Running-sum blur over one line of `len` samples.
fn blur_line<R, W>(len: usize, radius: usize, norm: f32, read: R, mut write: W)
where
    R: Fn(usize) -> Vec3,
    W: FnMut(usize, Vec3),
{
    let clamp = |i: isize| read(i.clamp(0, len as isize - 1) as usize);
    let r = radius as isize;
    let mut sum = Vec3::ZERO;
    for i in -r..=r {
        sum += clamp(i);
    }
    for i in 0..len as isize {
        write(i as usize, sum * norm);
        sum += clamp(i + r + 1) - clamp(i - r);
    }
}

pub fn tone_map(color: Vec3, mode: ToneMapping) -> Vec3 {
    match mode {
        ToneMapping::AcesFilmic => {
            let aces = |x: f32| {
                ((x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14)).clamp(0.0, 1.0)
            };
            Vec3::new(aces(color.x), aces(color.y), aces(color.z))
        }
        ToneMapping::Reinhard => color / (Vec3::ONE + color),
    }
}

/// Darkening factor for a pixel at normalised screen position `uv`.
pub fn vignette(uv: Vec2, settings: &Vignette) -> f32 {
    let distance = uv.distance(Vec2::splat(0.5));
    smoothstep(
        0.8,
        settings.offset * 0.799,
        distance * (settings.darkness + settings.offset),
    )
}

/// Encodes linear colour as sRGB and packs it into 0RGB.
pub fn pack_srgb(color: Vec3) -> u32 {
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        let s = if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        };
        (s * 255.0 + 0.5) as u32
    };
    (encode(color.x) << 16) | (encode(color.y) << 8) | encode(color.z)
}
