//! Procedural RGBA8 textures standing in for decoded image assets.

/// Tightly packed RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    /// Red channel as `[0, 1]`.
    fn height_at(&self, x: u32, y: u32) -> f32 {
        f32::from(self.pixel(x, y)[0]) / 255.0
    }
}

/// Tangent-space normal pointing straight out of the surface.
pub const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

pub fn solid(rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(4, 4, |_, _| rgba)
}

// ── noise ─────────────────────────────────────────────────────────────────

fn hash(x: u32, y: u32, seed: u32) -> f32 {
    let mut h = x.wrapping_mul(0x27d4_eb2d) ^ y.wrapping_mul(0x1656_67b1) ^ seed.wrapping_mul(0x9e37_79b9);
    h ^= h >> 15;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    (h & 0x00ff_ffff) as f32 / 16_777_215.0
}

/// Value noise on a `period`-cell lattice, tiling horizontally so sphere seams match.
fn value_noise(u: f32, v: f32, period: u32, seed: u32) -> f32 {
    let x = u * period as f32;
    let y = v * period as f32;
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (sx, sy) = (fx * fx * (3.0 - 2.0 * fx), fy * fy * (3.0 - 2.0 * fy));

    let xi = (x0 as i64).rem_euclid(i64::from(period)) as u32;
    let xj = (xi + 1) % period;
    let yi = y0.max(0.0) as u32;

    let a = hash(xi, yi, seed);
    let b = hash(xj, yi, seed);
    let c = hash(xi, yi + 1, seed);
    let d = hash(xj, yi + 1, seed);
    let top = a + (b - a) * sx;
    let bottom = c + (d - c) * sx;
    top + (bottom - top) * sy
}

/// Fractal sum of `octaves` noise layers, normalized to `[0, 1]`.
fn fbm(u: f32, v: f32, base_period: u32, octaves: u32, seed: u32) -> f32 {
    let (mut sum, mut amp, mut norm) = (0.0, 1.0, 0.0);
    for o in 0..octaves {
        sum += amp * value_noise(u, v, base_period << o, seed.wrapping_add(o));
        norm += amp;
        amp *= 0.5;
    }
    sum / norm
}

fn shade(rgb: [f32; 3], k: f32) -> [u8; 4] {
    let c = |v: f32| (v * k).clamp(0.0, 255.0) as u8;
    [c(rgb[0]), c(rgb[1]), c(rgb[2]), 255]
}

fn gray(v: f32) -> [u8; 4] {
    let g = (v.clamp(0.0, 1.0) * 255.0) as u8;
    [g, g, g, 255]
}

// ── materials ─────────────────────────────────────────────────────────────

/// Grainy sand color.
pub fn sand(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let (u, v) = (x as f32 / size as f32, y as f32 / size as f32);
        let grain = hash(x, y, 7);
        let dunes = fbm(u, v, 4, 3, 11);
        shade([222.0, 190.0, 140.0], 0.75 + 0.15 * dunes + 0.1 * grain)
    })
}

/// Brushed metal plate with a rivet grid: `(diffuse, bump)`.
pub fn metal(size: u32) -> (RgbaImage, RgbaImage) {
    let cells = 8.0;
    let rivet = |x: u32, y: u32| {
        let (u, v) = (x as f32 / size as f32 * cells, y as f32 / size as f32 * cells);
        let (du, dv) = (u.fract() - 0.5, v.fract() - 0.5);
        let r = (du * du + dv * dv).sqrt();
        (1.0 - r / 0.22).clamp(0.0, 1.0).sqrt()
    };
    let seam = |x: u32, y: u32| {
        let (u, v) = (x as f32 / size as f32 * cells * 0.5, y as f32 / size as f32 * cells * 0.5);
        let edge = |f: f32| (f.fract() - 0.5).abs() > 0.48;
        edge(u) || edge(v)
    };

    let diffuse = RgbaImage::from_fn(size, size, |x, y| {
        let brushed = hash(0, y, 3) * 0.6 + hash(x, y, 5) * 0.4;
        let k = if seam(x, y) { 0.45 } else { 0.7 + 0.15 * brushed + 0.15 * rivet(x, y) };
        shade([180.0, 184.0, 190.0], k)
    });
    let bump = RgbaImage::from_fn(size, size, |x, y| {
        let base = if seam(x, y) { 0.0 } else { 0.4 };
        gray(base + 0.6 * rivet(x, y))
    });
    (diffuse, bump)
}

/// Planet-like map: oceans, continents, ice caps. Returns `(diffuse, bump)`.
///
/// `width` should be twice `height` (equirectangular).
pub fn earth(width: u32, height: u32) -> (RgbaImage, RgbaImage) {
    let land = |x: u32, y: u32| {
        let (u, v) = (x as f32 / width as f32, y as f32 / height as f32);
        fbm(u, v * 0.5, 6, 5, 42)
    };
    let sea_level = 0.52;

    let diffuse = RgbaImage::from_fn(width, height, |x, y| {
        let lat = (y as f32 / height as f32 - 0.5).abs() * 2.0;
        let h = land(x, y);
        if lat > 0.88 {
            shade([240.0, 244.0, 250.0], 1.0)
        } else if h < sea_level {
            shade([20.0, 50.0, 120.0], 0.7 + 0.6 * h)
        } else if h < sea_level + 0.12 {
            shade([70.0, 120.0, 50.0], 0.8 + h * 0.4)
        } else {
            shade([130.0, 110.0, 80.0], 0.8 + h * 0.3)
        }
    });
    let bump = RgbaImage::from_fn(width, height, |x, y| {
        let h = land(x, y);
        gray(((h - sea_level) / (1.0 - sea_level)).max(0.0))
    });
    (diffuse, bump)
}

/// Tangent-space normal map from the red channel of `height` (central differences).
///
/// Wraps horizontally and clamps vertically, like the material sampler.
pub fn normal_from_height(height: &RgbaImage, strength: f32) -> RgbaImage {
    let (w, h) = (height.width, height.height);
    RgbaImage::from_fn(w, h, |x, y| {
        let left = height.height_at((x + w - 1) % w, y);
        let right = height.height_at((x + 1) % w, y);
        let up = height.height_at(x, y.saturating_sub(1));
        let down = height.height_at(x, (y + 1).min(h - 1));

        // +v runs down the image; the bitangent points up
        let nx = (left - right) * strength;
        let ny = (down - up) * strength;
        let len = (nx * nx + ny * ny + 1.0).sqrt();
        let enc = |c: f32| ((c / len * 0.5 + 0.5) * 255.0).round() as u8;
        [enc(nx), enc(ny), enc(1.0), 255]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_are_row_major() {
        let img = RgbaImage::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
        assert_eq!(img.pixels.len(), 3 * 2 * 4);
        assert_eq!(img.pixel(2, 1), [2, 1, 0, 255]);
        assert_eq!(&img.pixels[4..8], &[1, 0, 0, 255]);
    }

    #[test]
    fn flat_height_gives_flat_normals() {
        let n = normal_from_height(&solid([90, 90, 90, 255]), 4.0);
        for y in 0..n.height {
            for x in 0..n.width {
                assert_eq!(n.pixel(x, y), FLAT_NORMAL);
            }
        }
    }

    #[test]
    fn slopes_tilt_normals_downhill() {
        // height rising to the right
        let ramp = RgbaImage::from_fn(8, 8, |x, _| gray(x as f32 / 7.0 * 0.5));
        let n = normal_from_height(&ramp, 4.0);
        let px = n.pixel(3, 3);
        assert!(px[0] < 128, "x should tilt away from the slope");
        assert_eq!(px[1], 128);
    }

    #[test]
    fn noise_tiles_horizontally() {
        for i in 0..8 {
            let v = i as f32 / 8.0;
            assert!((value_noise(0.0, v, 6, 1) - value_noise(1.0, v, 6, 1)).abs() < 1e-6);
            let f = fbm(0.3, v, 4, 4, 2);
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn earth_maps_share_dimensions() {
        let (diffuse, bump) = earth(64, 32);
        assert_eq!((diffuse.width, diffuse.height), (64, 32));
        assert_eq!(bump.pixels.len(), diffuse.pixels.len());
    }
}
