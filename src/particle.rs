use crate::color::{sample_color, Rgb};
use crate::settings::{depth, Glow, LifeCycle, SimulationSettings};
use rand::Rng;
use std::collections::VecDeque;

/// Time advanced per tick
const TIME_STEP: f32 = 0.05;
/// Pulse amplitude multiplier
const PULSE_AMPLITUDE: f32 = 5.0;

/// Chance per tick of falling once the fall delay has passed
const FALL_CHANCE: f32 = 0.002;
/// Range of the per-particle fall delay in ticks
const FALL_DELAY: (u32, u32) = (100, 500);
/// Range of the initial fall speed (before depth falloff)
const FALL_SPEED: (f32, f32) = (0.1, 0.5);
/// Distance outside the world at which falling particles wrap or bounce
const EDGE_MARGIN: f32 = 10.0;
/// Horizontal speed retained after bouncing off a side wall
const BOUNCE_DAMPING: f32 = 0.8;

/// Attraction distance floor (avoids dividing by zero under the pointer)
const MIN_ATTRACT_DISTANCE: f32 = 0.1;
/// Attraction never grows a particle past this multiple of its base size
const MAX_GROWTH: f32 = 1.5;
/// Size lost per tick while relaxing back to the base size
const SIZE_RELAX: f32 = 0.1;

/// Which population a particle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Seeded along the heart curve
    Heart,
    /// Scattered over the whole world
    Background,
}

/// Motion model currently driving a particle. Only ever moves from
/// `Pulsing` to `Falling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Pulsing,
    Falling,
}

/// External inputs applied to every particle in a tick
#[derive(Debug, Clone, Copy, Default)]
pub struct Forces {
    /// Last known pointer position in world coordinates
    pub pointer: Option<(f32, f32)>,
    /// Attraction toggled on by the user
    pub attract: bool,
    /// Wind direction in radians
    pub wind_direction: f32,
}

/// A single particle: simulation state plus the attributes a renderer reads.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    origin_x: f32,
    origin_y: f32,
    pub size: f32,
    base_size: f32,
    pub color: Rgb,
    base_alpha: f32,
    layer: u8,
    kind: ParticleKind,
    phase: MotionPhase,
    life: f32,
    mortal: bool,

    angle: f32,
    distance: f32,
    phase_offset: f32,
    pulse_speed: f32,
    time: f32,

    fall_speed: f32,
    drift_speed: f32,
    fall_delay: u32,
    fall_counter: u32,
    fade_speed: f32,

    trail: VecDeque<(f32, f32)>,
    trail_length: usize,
}

/// Fresh life fraction in (0.7, 1.0]
fn sample_life<R: Rng>(rng: &mut R) -> f32 {
    1.0 - rng.gen::<f32>() * 0.3
}

fn sample_range<R: Rng>(range: (f32, f32), rng: &mut R) -> f32 {
    if range.1 > range.0 {
        rng.gen_range(range.0..=range.1)
    } else {
        range.0
    }
}

fn initial_fall_speed<R: Rng>(layer: u8, rng: &mut R) -> f32 {
    rng.gen_range(FALL_SPEED.0..=FALL_SPEED.1) * depth::falloff(depth::FALL_SPEED, layer)
}

impl Particle {
    /// Create a particle anchored at (x, y) on the given depth layer
    pub fn new<R: Rng>(
        x: f32,
        y: f32,
        kind: ParticleKind,
        layer: u8,
        settings: &SimulationSettings,
        rng: &mut R,
    ) -> Self {
        let layer = layer.min(settings.layers.saturating_sub(1));
        let base_size = sample_range(settings.size_range, rng) * depth::falloff(depth::SIZE, layer);
        let base_alpha =
            sample_range(settings.alpha_range, rng) * depth::falloff(depth::OPACITY, layer);
        let color = sample_color(settings, kind, layer, rng);
        let trail_length = if settings.trail_range.1 > 0 {
            rng.gen_range(settings.trail_range.0..=settings.trail_range.1)
        } else {
            0
        };

        Self {
            x,
            y,
            origin_x: x,
            origin_y: y,
            size: base_size,
            base_size,
            color,
            base_alpha,
            layer,
            kind,
            phase: MotionPhase::Pulsing,
            life: sample_life(rng),
            mortal: settings.life_cycle(kind).is_mortal(),

            angle: rng.gen_range(0.0..std::f32::consts::TAU),
            distance: sample_range(settings.distance_range, rng)
                * depth::falloff(depth::DISTANCE, layer),
            phase_offset: rng.gen_range(0.0..std::f32::consts::TAU),
            pulse_speed: sample_range(settings.pulse_speed_range, rng)
                * depth::falloff(depth::PULSE_SPEED, layer),
            time: if settings.random_start_time {
                rng.gen_range(0.0..100.0)
            } else {
                0.0
            },

            fall_speed: initial_fall_speed(layer, rng),
            drift_speed: 0.0,
            fall_delay: rng.gen_range(FALL_DELAY.0..=FALL_DELAY.1),
            fall_counter: 0,
            fade_speed: sample_range(settings.fade_range, rng),

            trail: VecDeque::with_capacity(trail_length + 1),
            trail_length,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.phase == MotionPhase::Falling
    }

    /// Recent positions, oldest first
    pub fn trail(&self) -> &VecDeque<(f32, f32)> {
        &self.trail
    }

    /// Current opacity (0.0-1.0): depth-scaled base alpha, faded by life
    pub fn opacity(&self) -> f32 {
        if self.mortal {
            self.base_alpha * self.life
        } else {
            self.base_alpha
        }
    }

    /// Radius of the primary glow around the particle
    pub fn glow_radius(&self, glow: Glow) -> f32 {
        match glow {
            Glow::Halo { scale, .. } => self.size * scale,
            Glow::Rings => self.size * (1.3 + 0.1 * self.layer as f32),
        }
    }

    /// Radius of the wider ring drawn around front heart particles
    pub fn outer_glow_radius(&self, glow: Glow) -> Option<f32> {
        match glow {
            Glow::Rings if self.kind == ParticleKind::Heart && self.layer < 2 => {
                Some(self.size * 2.0)
            }
            _ => None,
        }
    }

    /// Switch to falling motion. Falling particles stay falling.
    pub fn fall(&mut self) {
        self.phase = MotionPhase::Falling;
    }

    /// Advance the particle by one tick
    pub fn update<R: Rng>(&mut self, forces: &Forces, settings: &SimulationSettings, rng: &mut R) {
        self.time += TIME_STEP;

        if self.kind == ParticleKind::Heart
            && settings.falling
            && self.phase == MotionPhase::Pulsing
        {
            self.fall_counter += 1;
            if self.fall_counter > self.fall_delay && rng.gen::<f32>() < FALL_CHANCE {
                self.phase = MotionPhase::Falling;
            }
        }

        let (mut x, mut y) = match self.phase {
            MotionPhase::Pulsing => self.pulse_position(),
            MotionPhase::Falling => self.fall_position(forces.wind_direction, settings, rng),
        };

        let mut attracted = false;
        if settings.attraction && forces.attract {
            if let Some((px, py)) = forces.pointer {
                let dx = px - x;
                let dy = py - y;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_ATTRACT_DISTANCE);

                if distance < settings.attract_radius {
                    let force = settings.attract_strength
                        * depth::falloff(depth::ATTRACTION, self.layer)
                        / distance;
                    x += dx * force;
                    y += dy * force;
                    self.size = (self.base_size * MAX_GROWTH).min(self.base_size + settings.attract_growth);
                    attracted = true;
                }
            }
        }
        if !attracted {
            self.size = (self.size - SIZE_RELAX).max(self.base_size);
        }

        self.x = x;
        self.y = y;

        let drift = settings.angle_drift;
        self.angle += rng.gen_range(-drift..=drift) * depth::falloff(depth::ANGLE_DRIFT, self.layer);

        if self.trail_length > 0 {
            self.trail.push_back((x, y));
            while self.trail.len() > self.trail_length {
                self.trail.pop_front();
            }
        }

        self.age(settings, rng);
    }

    /// Oscillate around the anchor along the current angle
    fn pulse_position(&self) -> (f32, f32) {
        let pulse = (self.time * self.pulse_speed + self.phase_offset).sin()
            * PULSE_AMPLITUDE
            * depth::falloff(depth::DISTANCE, self.layer);
        (
            self.origin_x + self.angle.cos() * self.distance * pulse,
            self.origin_y + self.angle.sin() * self.distance * pulse,
        )
    }

    /// Gravity plus wind drift; wraps at the bottom, bounces off the sides
    fn fall_position<R: Rng>(
        &mut self,
        wind_direction: f32,
        settings: &SimulationSettings,
        rng: &mut R,
    ) -> (f32, f32) {
        let weight = depth::falloff(depth::GRAVITY, self.layer);
        self.fall_speed += settings.gravity * weight;
        self.drift_speed += wind_direction.cos() * settings.wind_strength * weight;

        let mut x = self.x + self.drift_speed;
        let mut y = self.y + self.fall_speed;

        if y > settings.height + EDGE_MARGIN {
            y = -EDGE_MARGIN;
            x = rng.gen_range(0.0..settings.width);
            self.fall_speed = initial_fall_speed(self.layer, rng);
            self.drift_speed = 0.0;
            self.trail.clear();
        }

        if x < -EDGE_MARGIN {
            x = -EDGE_MARGIN;
            self.drift_speed = self.drift_speed.abs() * BOUNCE_DAMPING;
        } else if x > settings.width + EDGE_MARGIN {
            x = settings.width + EDGE_MARGIN;
            self.drift_speed = -self.drift_speed.abs() * BOUNCE_DAMPING;
        }

        (x, y)
    }

    /// Decay life and recycle the particle once it runs out
    fn age<R: Rng>(&mut self, settings: &SimulationSettings, rng: &mut R) {
        let cycle = settings.life_cycle(self.kind);
        if !cycle.is_mortal() {
            return;
        }

        self.life -= self.fade_speed;
        if self.life > 0.0 {
            return;
        }

        self.life = sample_life(rng);
        match cycle {
            LifeCycle::Drift => {
                self.origin_x += rng.gen_range(-1.0..=1.0);
                self.origin_y += rng.gen_range(-1.0..=1.0);
            }
            LifeCycle::Respawn => {
                let x = rng.gen_range(0.0..=settings.width);
                let y = rng.gen_range(0.0..=settings.height);
                self.x = x;
                self.y = y;
                self.origin_x = x;
                self.origin_y = y;
                self.trail.clear();
            }
            LifeCycle::Immortal => {}
        }
    }
}

/// Read-only views of the simulation state
#[cfg(test)]
impl Particle {
    pub fn layer(&self) -> u8 {
        self.layer
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    pub fn origin(&self) -> (f32, f32) {
        (self.origin_x, self.origin_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Variant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn heart_particle(variant: Variant, layer: u8, seed: u64) -> (Particle, SimulationSettings, StdRng) {
        let settings = SimulationSettings::for_variant(variant);
        let mut rng = StdRng::seed_from_u64(seed);
        let p = Particle::new(400.0, 300.0, ParticleKind::Heart, layer, &settings, &mut rng);
        (p, settings, rng)
    }

    #[test]
    fn test_layer_is_clamped_and_fixed() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Interactive, 9, 1);
        assert_eq!(p.layer(), settings.layers - 1);

        let forces = Forces::default();
        for _ in 0..500 {
            p.update(&forces, &settings, &mut rng);
            assert_eq!(p.layer(), settings.layers - 1);
        }
    }

    #[test]
    fn test_pulsing_stays_near_anchor() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Classic, 0, 2);
        let reach = settings.distance_range.1 * PULSE_AMPLITUDE + 1e-3;
        let forces = Forces::default();
        for _ in 0..1000 {
            p.update(&forces, &settings, &mut rng);
            let (ox, oy) = p.origin();
            let d = ((p.x - ox).powi(2) + (p.y - oy).powi(2)).sqrt();
            assert!(d <= reach, "drifted {} from anchor", d);
            assert!(!p.is_falling());
        }
    }

    #[test]
    fn test_falling_never_reverts() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Layered, 0, 3);
        p.fall();
        let forces = Forces {
            wind_direction: 1.0,
            ..Forces::default()
        };
        for _ in 0..3000 {
            p.update(&forces, &settings, &mut rng);
            assert_eq!(p.phase(), MotionPhase::Falling);
        }
    }

    #[test]
    fn test_fall_transition_happens_after_delay() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Layered, 0, 4);
        let forces = Forces::default();
        for _ in 0..FALL_DELAY.0 {
            p.update(&forces, &settings, &mut rng);
            assert!(!p.is_falling());
        }
        // Geometric wait after the delay: 20k ticks at 0.2% is practically certain
        for _ in 0..20_000 {
            p.update(&forces, &settings, &mut rng);
        }
        assert!(p.is_falling());
    }

    #[test]
    fn test_background_never_falls() {
        let settings = SimulationSettings::for_variant(Variant::Interactive);
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = Particle::new(10.0, 10.0, ParticleKind::Background, 0, &settings, &mut rng);
        let forces = Forces::default();
        for _ in 0..5000 {
            p.update(&forces, &settings, &mut rng);
        }
        assert!(!p.is_falling());
    }

    #[test]
    fn test_bottom_edge_wraps_to_top() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Layered, 2, 6);
        p.fall();
        p.y = settings.height + 9.0;
        p.fall_speed = 5.0;

        p.update(&Forces::default(), &settings, &mut rng);

        assert_eq!(p.y, -EDGE_MARGIN);
        assert!(p.x >= 0.0 && p.x < settings.width);
        let falloff = depth::falloff(depth::FALL_SPEED, 2);
        assert!(p.fall_speed >= FALL_SPEED.0 * falloff - 1e-6);
        assert!(p.fall_speed <= FALL_SPEED.1 * falloff + 1e-6);
        assert_eq!(p.drift_speed, 0.0);
    }

    #[test]
    fn test_side_walls_bounce_with_damping() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Layered, 0, 7);
        p.fall();
        p.x = -9.0;
        p.drift_speed = -5.0;
        // cos(pi/2) ~ 0: no wind contribution
        let forces = Forces {
            wind_direction: std::f32::consts::FRAC_PI_2,
            ..Forces::default()
        };

        p.update(&forces, &settings, &mut rng);

        assert_eq!(p.x, -EDGE_MARGIN);
        assert!((p.drift_speed - 5.0 * BOUNCE_DAMPING).abs() < 1e-4);

        p.x = settings.width + 9.0;
        p.drift_speed = 6.0;
        p.update(&forces, &settings, &mut rng);
        assert_eq!(p.x, settings.width + EDGE_MARGIN);
        assert!(p.drift_speed < 0.0);
    }

    #[test]
    fn test_attraction_pulls_toward_pointer() {
        let (p, settings, rng) = heart_particle(Variant::Interactive, 0, 8);

        let mut free = p.clone();
        let mut free_rng = rng.clone();
        free.update(&Forces::default(), &settings, &mut free_rng);

        // Pointer 50 units from where the particle would otherwise land
        let pointer = (free.x + 30.0, free.y + 40.0);
        let mut pulled = p.clone();
        let mut pulled_rng = rng.clone();
        let forces = Forces {
            pointer: Some(pointer),
            attract: true,
            wind_direction: 0.0,
        };
        pulled.update(&forces, &settings, &mut pulled_rng);

        let moved = (pulled.x - free.x, pulled.y - free.y);
        let toward = (pointer.0 - free.x, pointer.1 - free.y);
        assert!(moved.0 * toward.0 + moved.1 * toward.1 > 0.0);
        assert!(pulled.size > pulled.base_size());
    }

    #[test]
    fn test_attraction_ignores_far_pointer_and_disabled_variants() {
        let (p, settings, rng) = heart_particle(Variant::Interactive, 0, 9);
        let mut a = p.clone();
        let mut b = p.clone();
        let (mut ra, mut rb) = (rng.clone(), rng);

        a.update(&Forces::default(), &settings, &mut ra);
        let far = Forces {
            pointer: Some((a.x + 500.0, a.y)),
            attract: true,
            wind_direction: 0.0,
        };
        b.update(&far, &settings, &mut rb);
        assert_eq!((a.x, a.y), (b.x, b.y));

        let (mut c, layered, mut rc) = heart_particle(Variant::Layered, 0, 9);
        let near = Forces {
            pointer: Some((c.x + 1.0, c.y)),
            attract: true,
            wind_direction: 0.0,
        };
        c.update(&near, &layered, &mut rc);
        assert_eq!(c.size, c.base_size());
    }

    #[test]
    fn test_size_stays_within_bounds() {
        for variant in [Variant::Enhanced, Variant::Interactive] {
            let (mut p, settings, mut rng) = heart_particle(variant, 1, 10);
            let min = settings.min_particle_size();
            for tick in 0..400 {
                let attract = (tick / 25) % 2 == 0;
                let forces = Forces {
                    pointer: Some((p.x + 3.0, p.y - 4.0)),
                    attract,
                    wind_direction: 0.0,
                };
                p.update(&forces, &settings, &mut rng);
                assert!(p.size >= p.base_size() - 1e-6);
                assert!(p.size <= p.base_size() * MAX_GROWTH + 1e-6);
                assert!(p.size >= min - 1e-6);
            }
        }
    }

    #[test]
    fn test_life_resampled_on_expiry() {
        let settings = SimulationSettings::for_variant(Variant::Interactive);
        let mut rng = StdRng::seed_from_u64(11);
        let mut p = Particle::new(50.0, 60.0, ParticleKind::Background, 0, &settings, &mut rng);
        let forces = Forces::default();

        for _ in 0..5000 {
            p.life = p.life.min(p.fade_speed * 0.5);
            p.update(&forces, &settings, &mut rng);
            assert!(p.life() > 0.7 && p.life() <= 1.0, "life {}", p.life());
        }
    }

    #[test]
    fn test_respawn_moves_anchor_inside_world() {
        let settings = SimulationSettings::for_variant(Variant::Interactive);
        let mut rng = StdRng::seed_from_u64(12);
        let mut p = Particle::new(-500.0, -500.0, ParticleKind::Background, 0, &settings, &mut rng);
        p.life = 0.0;
        p.update(&Forces::default(), &settings, &mut rng);
        let (ox, oy) = p.origin();
        assert!((0.0..=settings.width).contains(&ox));
        assert!((0.0..=settings.height).contains(&oy));
    }

    #[test]
    fn test_immortal_heart_keeps_life() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Interactive, 0, 13);
        let life = p.life();
        for _ in 0..100 {
            p.update(&Forces::default(), &settings, &mut rng);
        }
        assert_eq!(p.life(), life);
        assert_eq!(p.opacity(), p.base_alpha);
    }

    #[test]
    fn test_trail_is_bounded() {
        let (mut p, settings, mut rng) = heart_particle(Variant::Enhanced, 0, 14);
        assert!((3..=8).contains(&p.trail_length));
        for _ in 0..50 {
            p.update(&Forces::default(), &settings, &mut rng);
            assert!(p.trail().len() <= p.trail_length);
        }
        assert_eq!(p.trail().len(), p.trail_length);
        assert_eq!(*p.trail().back().unwrap(), (p.x, p.y));
    }

    #[test]
    fn test_glow_radii() {
        let (p, settings, _) = heart_particle(Variant::Interactive, 0, 15);
        assert!((p.glow_radius(settings.glow) - p.size * 1.3).abs() < 1e-6);
        assert_eq!(p.outer_glow_radius(settings.glow), Some(p.size * 2.0));

        let (deep, settings, _) = heart_particle(Variant::Interactive, 3, 15);
        assert_eq!(deep.outer_glow_radius(settings.glow), None);

        let (flat, classic, _) = heart_particle(Variant::Classic, 0, 15);
        assert_eq!(flat.glow_radius(classic.glow), flat.size * 2.0);
    }
}
