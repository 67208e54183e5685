use crate::particle::{Particle, ParticleKind};
use crate::settings::{depth, SimulationSettings};
use rand::Rng;

/// The curve parameter is swept in hundredths of a radian over [0, 2π)
const SWEEP: usize = 628;

/// Per-layer translation of stacked hearts (both axes)
const LAYER_OFFSET: f32 = 2.0;

/// Point on the heart curve at parameter `t` (curve units, y up)
pub fn heart_point(t: f32) -> (f32, f32) {
    let x = 16.0 * t.sin().powi(3);
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    (x, y)
}

/// Number of sample points for a step given in hundredths of a radian
pub fn sample_count(step: usize) -> usize {
    let step = step.max(1);
    SWEEP.div_ceil(step)
}

/// Sample the heart curve in world coordinates (y grows downward)
pub fn sample_heart(center: (f32, f32), scale: f32, step: usize) -> Vec<(f32, f32)> {
    let (cx, cy) = center;
    let mut points = Vec::with_capacity(sample_count(step));
    points.extend((0..SWEEP).step_by(step.max(1)).map(|k| {
        let (x, y) = heart_point(k as f32 / 100.0);
        (cx + x * scale, cy - y * scale)
    }));
    points
}

/// Where and how densely to seed a heart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartSeed {
    pub center: (f32, f32),
    pub scale: f32,
    /// Flat hearts only: finer sampling, more particles, wider jitter
    pub density: f32,
    /// 1 for a flat heart, otherwise the number of stacked depth layers
    pub layers: u8,
}

impl HeartSeed {
    /// Seed at the given place using the density and layers of `settings`
    pub fn new(center: (f32, f32), scale: f32, settings: &SimulationSettings) -> Self {
        Self {
            center,
            scale,
            density: settings.seed_density,
            layers: settings.layers.max(1),
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// Emit heart particles along the curve, layer-major then in sample order
pub fn seed_heart<R: Rng>(
    seed: &HeartSeed,
    settings: &SimulationSettings,
    rng: &mut R,
) -> Vec<Particle> {
    if seed.layers <= 1 {
        seed_flat(seed, settings, rng)
    } else {
        seed_layered(seed, settings, rng)
    }
}

fn seed_flat<R: Rng>(seed: &HeartSeed, settings: &SimulationSettings, rng: &mut R) -> Vec<Particle> {
    let density = seed.density.max(0.0);
    let step = ((settings.seed_step as f32 / density) as usize).max(1);
    let max_instances = ((settings.seed_instances as f32 * density) as usize).max(1);
    let jitter = settings.seed_jitter;

    let points = sample_heart(seed.center, seed.scale, step);
    let mut particles = Vec::with_capacity(points.len() * max_instances);

    for (x, y) in points {
        for _ in 0..rng.gen_range(1..=max_instances) {
            let ox = rng.gen_range(-jitter..=jitter) * density;
            let oy = rng.gen_range(-jitter..=jitter) * density;
            particles.push(Particle::new(x + ox, y + oy, ParticleKind::Heart, 0, settings, rng));
        }
    }

    particles
}

fn seed_layered<R: Rng>(
    seed: &HeartSeed,
    settings: &SimulationSettings,
    rng: &mut R,
) -> Vec<Particle> {
    let mut particles = Vec::new();

    for layer in 0..seed.layers {
        let scale = seed.scale * depth::falloff(depth::SIZE, layer);
        let offset = LAYER_OFFSET * layer as f32;
        let center = (seed.center.0 + offset, seed.center.1 + offset);

        // Front layers are sampled twice as finely and filled more
        let front = layer < 2;
        let step = if front { 1 } else { 2 };
        let spread = (2.0 - 0.5 * layer as f32).max(0.5);

        for (x, y) in sample_heart(center, scale, step) {
            let count = if front {
                rng.gen_range(2..=5)
            } else {
                rng.gen_range(1..=3)
            };
            for _ in 0..count {
                let ox = rng.gen_range(-2.0..=2.0) * spread;
                let oy = rng.gen_range(-2.0..=2.0) * spread;
                particles.push(Particle::new(
                    x + ox,
                    y + oy,
                    ParticleKind::Heart,
                    layer,
                    settings,
                    rng,
                ));
            }
        }
    }

    particles
}

/// Scatter `count` background particles uniformly over the world
pub fn seed_background<R: Rng>(
    count: usize,
    settings: &SimulationSettings,
    rng: &mut R,
) -> Vec<Particle> {
    (0..count)
        .map(|_| background_particle(settings, rng))
        .collect()
}

/// A single background particle at a random place and depth
pub fn background_particle<R: Rng>(settings: &SimulationSettings, rng: &mut R) -> Particle {
    let x = rng.gen_range(0.0..=settings.width);
    let y = rng.gen_range(0.0..=settings.height);
    let layer = rng.gen_range(0..settings.layers.max(1));
    Particle::new(x, y, ParticleKind::Background, layer, settings, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Variant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_heart_point_top_and_sides() {
        let (x, y) = heart_point(0.0);
        assert!(x.abs() < 1e-6);
        assert!((y - 5.0).abs() < 1e-5);

        let (x, _) = heart_point(std::f32::consts::FRAC_PI_2);
        assert!((x - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(2), 314);
        assert_eq!(sample_count(1), 628);
        assert_eq!(sample_count(3), 210);
        assert_eq!(sample_count(0), 628);

        for step in 1..10 {
            assert_eq!(sample_heart((0.0, 0.0), 10.0, step).len(), sample_count(step));
        }
    }

    #[test]
    fn test_sample_heart_translation_invariant() {
        let a = sample_heart((400.0, 300.0), 10.0, 2);
        let b = sample_heart((100.0, 50.0), 10.0, 2);
        assert_eq!(a.len(), b.len());
        for (p, q) in a.iter().zip(&b) {
            assert!((p.0 - q.0 - 300.0).abs() < 1e-3);
            assert!((p.1 - q.1 - 250.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_sample_heart_flips_y() {
        let points = sample_heart((400.0, 300.0), 10.0, 2);
        // t = 0 is the top notch of the heart, above the center on screen
        assert!((points[0].1 - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_classic_seed_scenario() {
        let settings = SimulationSettings::for_variant(Variant::Classic);
        let mut rng = StdRng::seed_from_u64(42);
        let seed = HeartSeed::new((400.0, 300.0), 10.0, &settings);
        let particles = seed_heart(&seed, &settings, &mut rng);

        // 314 sample points, 1 to 3 particles each
        assert!(particles.len() >= 314 && particles.len() <= 314 * 3);
        assert!(particles.iter().all(|p| p.layer() == 0));
        assert!(particles.iter().all(|p| p.kind() == ParticleKind::Heart));
    }

    #[test]
    fn test_density_changes_sampling() {
        let settings = SimulationSettings::for_variant(Variant::Enhanced);
        let mut rng = StdRng::seed_from_u64(3);

        // step max(1, 3 / 1.5) = 2 and up to 3 particles per point
        let dense = seed_heart(&HeartSeed::new((400.0, 300.0), 10.0, &settings), &settings, &mut rng);
        assert!(dense.len() >= 314 && dense.len() <= 314 * 3);

        // step 6 and exactly one particle per point
        let sparse_seed = HeartSeed::new((400.0, 300.0), 10.0, &settings).with_density(0.5);
        let sparse = seed_heart(&sparse_seed, &settings, &mut rng);
        assert_eq!(sparse.len(), sample_count(6));
    }

    #[test]
    fn test_layered_seed_layers() {
        let settings = SimulationSettings::for_variant(Variant::Layered);
        let mut rng = StdRng::seed_from_u64(9);
        let seed = HeartSeed::new((400.0, 300.0), 10.0, &settings);
        let particles = seed_heart(&seed, &settings, &mut rng);

        for layer in 0..settings.layers {
            let n = particles.iter().filter(|p| p.layer() == layer).count();
            if layer < 2 {
                assert!(n >= 628 * 2 && n <= 628 * 5, "layer {} had {}", layer, n);
            } else {
                assert!(n >= 314 && n <= 314 * 3, "layer {} had {}", layer, n);
            }
        }

        // Layer-major ordering
        assert!(particles.windows(2).all(|w| w[0].layer() <= w[1].layer()));
    }

    #[test]
    fn test_background_inside_world() {
        let settings = SimulationSettings::for_variant(Variant::Interactive);
        let mut rng = StdRng::seed_from_u64(5);
        let particles = seed_background(200, &settings, &mut rng);
        assert_eq!(particles.len(), 200);
        for p in &particles {
            assert!(p.x >= 0.0 && p.x <= settings.width);
            assert!(p.y >= 0.0 && p.y <= settings.height);
            assert!(p.layer() < settings.layers);
            assert_eq!(p.kind(), ParticleKind::Background);
        }
    }
}
