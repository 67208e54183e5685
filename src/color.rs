use crate::particle::ParticleKind;
use crate::settings::{Background, Palette, SimulationSettings};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed swatches used by the classic palette
const SWATCHES: [Rgb; 3] = [
    Rgb::new(100, 180, 255),
    Rgb::new(50, 120, 220),
    Rgb::new(20, 80, 180),
];

/// Light direction for the synthetic shading of front layers
const LIGHT_DIRECTION: [f32; 3] = [0.5, -0.5, 0.7];
const LIGHT_INTENSITY: f32 = 1.2;

/// Layers in front of this index receive shading
const LIT_LAYERS: u8 = 2;

/// Plain 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiply every channel by `k` (clamped to the u8 range)
    pub fn scale(self, k: f32) -> Rgb {
        let k = k.max(0.0);
        let s = |v: u8| ((v as f32) * k).round().clamp(0.0, 255.0) as u8;
        Rgb::new(s(self.r), s(self.g), s(self.b))
    }

    /// Image pixel with the given opacity (0.0-1.0)
    pub fn to_rgba(self, alpha: f32) -> image::Rgba<u8> {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([self.r, self.g, self.b, a])
    }

    pub fn to_color(self) -> ratatui::style::Color {
        ratatui::style::Color::Rgb(self.r, self.g, self.b)
    }
}

/// Convert HSV (all components in 0.0-1.0) to RGB
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;

    if s <= 0.0 {
        let g = to_u8(v);
        return Rgb::new(g, g, g);
    }

    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u8 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}

/// Brightness multiplier for a random surface normal facing the viewer
pub fn light_factor<R: Rng>(rng: &mut R) -> f32 {
    let nx = rng.gen_range(-1.0..=1.0f32);
    let ny = rng.gen_range(-1.0..=1.0f32);
    let nz = rng.gen_range(0.5..=1.0f32);
    let norm = (nx * nx + ny * ny + nz * nz).sqrt();

    let dot = (nx * LIGHT_DIRECTION[0] + ny * LIGHT_DIRECTION[1] + nz * LIGHT_DIRECTION[2]) / norm;
    (0.5 + dot * LIGHT_INTENSITY).clamp(0.2, 1.0)
}

/// Pick a particle color from the configured palette
pub fn sample_color<R: Rng>(
    settings: &SimulationSettings,
    kind: ParticleKind,
    layer: u8,
    rng: &mut R,
) -> Rgb {
    match settings.palette {
        Palette::Swatches => SWATCHES[rng.gen_range(0..SWATCHES.len())],
        Palette::BlueBand => {
            let h = rng.gen_range(0.55..=0.65);
            let s = rng.gen_range(0.7..=1.0);
            let v = rng.gen_range(0.7..=1.0);
            hsv_to_rgb(h, s, v)
        }
        Palette::DepthShaded => match kind {
            ParticleKind::Heart => {
                let depth = layer as i32;
                let base_hue: f32 = rng.gen_range(0.55..=0.65);
                let h = (base_hue - 0.03 * layer as f32).clamp(0.5, 0.7);
                let s = rng.gen_range(0.7..=1.0) * 0.9f32.powi(depth);
                let mut v = rng.gen_range(0.7..=1.0) * 0.85f32.powi(depth);
                if layer < LIT_LAYERS {
                    v = (v * light_factor(rng)).min(1.0);
                }
                hsv_to_rgb(h, s, v)
            }
            ParticleKind::Background => {
                let h = rng.gen_range(0.5..=0.7);
                let s = rng.gen_range(0.5..=0.9);
                let v = rng.gen_range(0.5..=0.9);
                hsv_to_rgb(h, s, v)
            }
        },
    }
}

/// Background color at a vertical fraction (0.0 = top, 1.0 = bottom)
pub fn background_at(background: Background, v: f32) -> Rgb {
    match background {
        Background::Solid => Rgb::BLACK,
        Background::Gradient => {
            let fade = 1.0 - v.clamp(0.0, 1.0);
            Rgb::new(0, (10.0 * fade) as u8, (30.0 * fade) as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Variant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hsv_primary_values() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(0.5, 1.0, 1.0), Rgb::new(0, 255, 255));
        assert_eq!(hsv_to_rgb(0.5, 0.5, 1.0), Rgb::new(127, 255, 255));
        assert_eq!(hsv_to_rgb(0.3, 0.0, 0.5), Rgb::new(127, 127, 127));
    }

    #[test]
    fn test_blue_band_is_blue() {
        let mut rng = StdRng::seed_from_u64(7);
        for variant in Variant::ALL {
            let settings = SimulationSettings::for_variant(variant);
            for layer in 0..settings.layers {
                for kind in [ParticleKind::Heart, ParticleKind::Background] {
                    let c = sample_color(&settings, kind, layer, &mut rng);
                    assert!(c.b >= c.r, "{:?} is not blue", c);
                }
            }
        }
    }

    #[test]
    fn test_light_factor_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let f = light_factor(&mut rng);
            assert!((0.2..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_gradient_darkens_downward() {
        let top = background_at(Background::Gradient, 0.0);
        let bottom = background_at(Background::Gradient, 1.0);
        assert_eq!(top, Rgb::new(0, 10, 30));
        assert_eq!(bottom, Rgb::BLACK);
        assert_eq!(background_at(Background::Solid, 0.3), Rgb::BLACK);
    }

    #[test]
    fn test_to_rgba_alpha() {
        let white = Rgb::new(255, 255, 255);
        assert_eq!(white.to_rgba(1.0), image::Rgba([255, 255, 255, 255]));
        assert_eq!(white.to_rgba(0.5), image::Rgba([255, 255, 255, 128]));
        assert_eq!(white.to_rgba(-1.0)[3], 0);
    }
}
