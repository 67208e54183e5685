use crate::particle::ParticleKind;
use serde::{Deserialize, Serialize};

/// Per-layer falloff bases. A value at depth layer `L` is scaled by `base^L`.
pub mod depth {
    /// Particle size and the scale of each stacked heart layer
    pub const SIZE: f32 = 0.85;
    /// Base opacity
    pub const OPACITY: f32 = 0.8;
    /// Pulse radius and amplitude
    pub const DISTANCE: f32 = 0.9;
    /// Pulse frequency (deeper layers beat faster)
    pub const PULSE_SPEED: f32 = 1.1;
    /// Angle random walk (deeper layers jitter more)
    pub const ANGLE_DRIFT: f32 = 1.1;
    /// Initial fall speed
    pub const FALL_SPEED: f32 = 0.8;
    /// Gravity and wind acceleration
    pub const GRAVITY: f32 = 0.9;
    /// Pointer attraction strength
    pub const ATTRACTION: f32 = 0.8;

    /// `base^layer`
    pub fn falloff(base: f32, layer: u8) -> f32 {
        base.powi(layer as i32)
    }
}

/// The four heart animations this app can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Single flat heart with swatch colors that keeps blooming
    Classic,
    /// Flat heart with trails, fading particles, a gradient sky and attraction
    Enhanced,
    /// Five stacked depth layers that eventually fall in the wind
    Layered,
    /// Layered heart plus recycled background particles and attraction
    #[default]
    Interactive,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Classic,
        Variant::Enhanced,
        Variant::Layered,
        Variant::Interactive,
    ];

    pub fn name(&self) -> &str {
        match self {
            Variant::Classic => "Classic",
            Variant::Enhanced => "Enhanced",
            Variant::Layered => "Layered",
            Variant::Interactive => "Interactive",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Variant::Classic => Variant::Enhanced,
            Variant::Enhanced => Variant::Layered,
            Variant::Layered => Variant::Interactive,
            Variant::Interactive => Variant::Classic,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Variant::Classic => Variant::Interactive,
            Variant::Enhanced => Variant::Classic,
            Variant::Layered => Variant::Enhanced,
            Variant::Interactive => Variant::Layered,
        }
    }
}

/// How particle colors are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Three fixed blue swatches
    Swatches,
    /// Random HSV sample in the blue hue band
    BlueBand,
    /// Hue/saturation/value darkened by depth layer, front layers lit
    #[default]
    DepthShaded,
}

/// Frame clear style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Background {
    #[default]
    Solid,
    /// Dark blue at the top fading to black at the bottom
    Gradient,
}

/// What happens to a particle's life fraction over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifeCycle {
    /// Life never decays
    #[default]
    Immortal,
    /// Life decays; on expiry the anchor is nudged by up to one unit
    Drift,
    /// Life decays; on expiry the particle jumps to a new random anchor
    Respawn,
}

impl LifeCycle {
    pub fn is_mortal(&self) -> bool {
        !matches!(self, LifeCycle::Immortal)
    }
}

/// Glow drawn around every particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Glow {
    /// Translucent disc `scale` times the particle size
    Halo { scale: f32, alpha: f32 },
    /// Thin outline rings; front heart layers get a second, wider ring
    Rings,
}

/// Every tunable of the simulation. Built per variant, passed by reference to
/// the seeder and the update rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    // === World ===
    /// Logical world width
    pub width: f32,
    /// Logical world height
    pub height: f32,
    /// Number of stacked depth layers (1 = flat heart)
    pub layers: u8,

    // === Appearance ===
    /// Base particle size range before depth falloff
    pub size_range: (f32, f32),
    /// Base opacity range (0.0-1.0) before depth falloff
    pub alpha_range: (f32, f32),
    pub palette: Palette,
    pub background: Background,
    pub glow: Glow,
    /// Trail length range in positions (0 disables trails)
    pub trail_range: (usize, usize),

    // === Heart seeding ===
    /// Heart curve scale in world units
    pub heart_scale: f32,
    /// Angular step of the flat heart, in hundredths of a radian
    pub seed_step: usize,
    /// Density multiplier for flat hearts
    pub seed_density: f32,
    /// Particles per sample point (before density)
    pub seed_instances: usize,
    /// Positional jitter around each sample point (before density)
    pub seed_jitter: f32,

    // === Pulse ===
    /// Pulse radius range
    pub distance_range: (f32, f32),
    /// Pulse frequency range
    pub pulse_speed_range: (f32, f32),
    /// Maximum angle change per tick
    pub angle_drift: f32,
    /// Start each particle at a random point of its pulse cycle
    pub random_start_time: bool,

    // === Falling ===
    /// Heart particles eventually fall
    pub falling: bool,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Horizontal acceleration per tick at full wind
    pub wind_strength: f32,
    /// Maximum wind direction change per tick (radians)
    pub wind_change: f32,
    /// Chance that a heart particle falls when the fall is triggered
    pub fall_trigger_probability: f32,

    // === Attraction ===
    /// Pointer attraction can be switched on
    pub attraction: bool,
    /// Pointer influence radius
    pub attract_radius: f32,
    /// Attraction constant (divided by distance)
    pub attract_strength: f32,
    /// Size gain while attracted (still capped at 1.5x)
    pub attract_growth: f32,

    // === Life ===
    pub heart_life: LifeCycle,
    pub background_life: LifeCycle,
    /// Life lost per tick range
    pub fade_range: (f32, f32),

    // === Population ===
    /// Background particles created with the heart
    pub initial_background: usize,
    /// Per-tick chance of adding bloom particles to the heart
    pub bloom_probability: f32,
    /// Bloom only while the heart has fewer particles than this
    pub bloom_below: usize,
    /// Particles added per bloom
    pub bloom_batch: usize,
    /// Seeding density used for bloom hearts
    pub bloom_density: f32,
    /// Heartbeat amplitude applied to the bloom scale
    pub pulse_depth: f32,
    /// Per-tick chance of adding a stray background particle
    pub stray_probability: f32,
    /// Strays only while the background has fewer particles than this
    pub stray_below: usize,
    /// Hard caps enforced after every tick
    pub heart_cap: usize,
    pub background_cap: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

impl SimulationSettings {
    /// Settings reproducing one of the built-in variants
    pub fn for_variant(variant: Variant) -> Self {
        let layered = Self {
            width: 800.0,
            height: 600.0,
            layers: 5,

            size_range: (0.5, 1.8),
            alpha_range: (1.0, 1.0),
            palette: Palette::DepthShaded,
            background: Background::Solid,
            glow: Glow::Rings,
            trail_range: (0, 0),

            heart_scale: 10.0,
            seed_step: 2,
            seed_density: 1.0,
            seed_instances: 3,
            seed_jitter: 2.0,

            distance_range: (0.8, 3.0),
            pulse_speed_range: (0.02, 0.05),
            angle_drift: 0.05,
            random_start_time: true,

            falling: true,
            gravity: 0.03,
            wind_strength: 0.02,
            wind_change: 0.005,
            fall_trigger_probability: 0.7,

            attraction: false,
            attract_radius: 150.0,
            attract_strength: 0.5,
            attract_growth: 1.0,

            heart_life: LifeCycle::Immortal,
            background_life: LifeCycle::Immortal,
            fade_range: (0.001, 0.003),

            initial_background: 0,
            bloom_probability: 0.0,
            bloom_below: 0,
            bloom_batch: 0,
            bloom_density: 1.0,
            pulse_depth: 0.15,
            stray_probability: 0.0,
            stray_below: 0,
            heart_cap: 10_000,
            background_cap: 0,
        };

        match variant {
            Variant::Layered => layered,
            Variant::Interactive => Self {
                attraction: true,
                background_life: LifeCycle::Respawn,
                initial_background: 200,
                stray_probability: 0.05,
                stray_below: 300,
                background_cap: 300,
                ..layered
            },
            Variant::Classic => Self {
                layers: 1,
                size_range: (2.0, 5.0),
                palette: Palette::Swatches,
                glow: Glow::Halo {
                    scale: 2.0,
                    alpha: 30.0 / 255.0,
                },
                seed_step: 2,
                seed_density: 1.0,
                seed_instances: 3,
                seed_jitter: 5.0,
                distance_range: (1.0, 3.0),
                random_start_time: false,
                falling: false,
                bloom_probability: 0.1,
                bloom_below: 500,
                bloom_batch: 5,
                bloom_density: 1.0,
                pulse_depth: 0.1,
                stray_probability: 0.1,
                stray_below: 300,
                heart_cap: 800,
                background_cap: 300,
                ..layered
            },
            Variant::Enhanced => Self {
                layers: 1,
                size_range: (1.5, 4.5),
                alpha_range: (150.0 / 255.0, 1.0),
                palette: Palette::BlueBand,
                background: Background::Gradient,
                glow: Glow::Halo {
                    scale: 3.0,
                    alpha: 30.0 / 255.0,
                },
                trail_range: (3, 8),
                seed_step: 3,
                seed_density: 1.5,
                seed_instances: 2,
                seed_jitter: 3.0,
                distance_range: (1.0, 4.0),
                pulse_speed_range: (0.01, 0.04),
                angle_drift: 0.03,
                falling: false,
                attraction: true,
                attract_growth: 2.0,
                heart_life: LifeCycle::Drift,
                background_life: LifeCycle::Drift,
                fade_range: (0.001, 0.005),
                initial_background: 100,
                bloom_probability: 0.05,
                bloom_below: 1000,
                bloom_batch: 10,
                bloom_density: 0.5,
                pulse_depth: 0.15,
                stray_probability: 0.05,
                stray_below: 200,
                heart_cap: 1000,
                background_cap: 200,
                ..layered
            },
        }
    }

    /// World center point
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Smallest size any particle can have (deepest layer, smallest draw)
    #[cfg(test)]
    pub fn min_particle_size(&self) -> f32 {
        self.size_range.0 * depth::falloff(depth::SIZE, self.layers.saturating_sub(1))
    }

    /// Adjust gravity within bounds
    pub fn adjust_gravity(&mut self, delta: f32) {
        self.gravity = (self.gravity + delta).clamp(0.0, 0.2);
    }

    /// Adjust wind strength within bounds
    pub fn adjust_wind_strength(&mut self, delta: f32) {
        self.wind_strength = (self.wind_strength + delta).clamp(0.0, 0.1);
    }

    /// Adjust attraction radius within bounds
    pub fn adjust_attract_radius(&mut self, delta: f32) {
        self.attract_radius = (self.attract_radius + delta).clamp(50.0, 400.0);
    }

    /// Clamp values read from config and preset files into workable ranges
    pub fn sanitize(&mut self) {
        self.width = self.width.max(1.0);
        self.height = self.height.max(1.0);
        self.layers = self.layers.max(1);

        self.size_range = ordered(self.size_range);
        self.alpha_range = ordered((
            self.alpha_range.0.clamp(0.0, 1.0),
            self.alpha_range.1.clamp(0.0, 1.0),
        ));
        self.trail_range = ordered(self.trail_range);
        if let Glow::Halo { scale, alpha } = &mut self.glow {
            *scale = (*scale).max(0.0);
            *alpha = (*alpha).clamp(0.0, 1.0);
        }

        self.seed_step = self.seed_step.max(1);
        self.seed_density = self.seed_density.max(0.1);
        self.seed_jitter = self.seed_jitter.abs();

        self.distance_range = ordered(self.distance_range);
        self.pulse_speed_range = ordered(self.pulse_speed_range);
        self.angle_drift = self.angle_drift.abs();

        self.gravity = self.gravity.clamp(0.0, 0.2);
        self.wind_strength = self.wind_strength.clamp(0.0, 0.1);
        self.wind_change = self.wind_change.abs();
        self.fall_trigger_probability = self.fall_trigger_probability.clamp(0.0, 1.0);

        self.attract_radius = self.attract_radius.clamp(50.0, 400.0);
        self.fade_range = ordered(self.fade_range);

        self.bloom_probability = self.bloom_probability.clamp(0.0, 1.0);
        self.bloom_density = self.bloom_density.max(0.1);
        self.stray_probability = self.stray_probability.clamp(0.0, 1.0);
    }

    /// Life cycle for a particle kind
    pub fn life_cycle(&self, kind: ParticleKind) -> LifeCycle {
        match kind {
            ParticleKind::Heart => self.heart_life,
            ParticleKind::Background => self.background_life,
        }
    }
}

/// Swap a (low, high) pair that was written the wrong way round
fn ordered<T: PartialOrd>(range: (T, T)) -> (T, T) {
    if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_cycle() {
        for variant in Variant::ALL {
            assert_eq!(variant.next().prev(), variant);
        }
        let mut v = Variant::Classic;
        for _ in 0..4 {
            v = v.next();
        }
        assert_eq!(v, Variant::Classic);
    }

    #[test]
    fn test_variant_features() {
        let classic = SimulationSettings::for_variant(Variant::Classic);
        assert_eq!(classic.layers, 1);
        assert!(!classic.falling && !classic.attraction);

        let enhanced = SimulationSettings::for_variant(Variant::Enhanced);
        assert!(enhanced.attraction);
        assert_eq!(enhanced.heart_life, LifeCycle::Drift);
        assert_eq!(enhanced.background, Background::Gradient);

        let layered = SimulationSettings::for_variant(Variant::Layered);
        assert_eq!(layered.layers, 5);
        assert!(layered.falling && !layered.attraction);
        assert_eq!(layered.initial_background, 0);

        let interactive = SimulationSettings::for_variant(Variant::Interactive);
        assert!(interactive.falling && interactive.attraction);
        assert_eq!(interactive.heart_life, LifeCycle::Immortal);
        assert_eq!(interactive.background_life, LifeCycle::Respawn);
    }

    #[test]
    fn test_falloff() {
        assert_eq!(depth::falloff(depth::SIZE, 0), 1.0);
        assert!((depth::falloff(depth::SIZE, 2) - 0.7225).abs() < 1e-6);
    }

    #[test]
    fn test_adjust_clamps() {
        let mut s = SimulationSettings::default();
        s.adjust_gravity(10.0);
        assert_eq!(s.gravity, 0.2);
        s.adjust_gravity(-10.0);
        assert_eq!(s.gravity, 0.0);
        s.adjust_wind_strength(1.0);
        assert_eq!(s.wind_strength, 0.1);
        s.adjust_attract_radius(-1000.0);
        assert_eq!(s.attract_radius, 50.0);
    }

    #[test]
    fn test_sanitize_keeps_builtin_variants() {
        for variant in Variant::ALL {
            let mut s = SimulationSettings::for_variant(variant);
            s.sanitize();
            assert_eq!(s, SimulationSettings::for_variant(variant));
        }
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let mut s = SimulationSettings::for_variant(Variant::Enhanced);
        s.width = 0.0;
        s.height = -5.0;
        s.layers = 0;
        s.trail_range = (5, 2);
        s.size_range = (4.0, 1.0);
        s.alpha_range = (1.5, -0.2);
        s.seed_jitter = -1.0;
        s.seed_step = 0;
        s.angle_drift = -0.1;
        s.gravity = 3.0;
        s.bloom_probability = 2.0;
        s.glow = Glow::Halo {
            scale: -1.0,
            alpha: 4.0,
        };
        s.sanitize();

        assert_eq!((s.width, s.height), (1.0, 1.0));
        assert_eq!(s.layers, 1);
        assert_eq!(s.trail_range, (2, 5));
        assert_eq!(s.size_range, (1.0, 4.0));
        assert_eq!(s.alpha_range, (0.0, 1.0));
        assert_eq!(s.seed_jitter, 1.0);
        assert_eq!(s.seed_step, 1);
        assert_eq!(s.angle_drift, 0.1);
        assert_eq!(s.gravity, 0.2);
        assert_eq!(s.bloom_probability, 1.0);
        assert_eq!(
            s.glow,
            Glow::Halo {
                scale: 0.0,
                alpha: 1.0
            }
        );
    }
}
