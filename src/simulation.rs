use crate::heart::{background_particle, seed_background, seed_heart, HeartSeed};
use crate::particle::{Forces, Particle};
use crate::settings::SimulationSettings;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

/// Heartbeat phase advanced per tick
const HEARTBEAT_STEP: f32 = 0.03;

/// Particle heart simulation: owns both particle groups and steps them
pub struct HeartSimulation {
    /// Particles seeded along the heart curve (plus bloom)
    heart: Vec<Particle>,
    /// Scattered background particles (plus strays)
    background: Vec<Particle>,
    pub settings: SimulationSettings,
    rng: StdRng,
    heartbeat: f32,
    wind_direction: f32,
    pointer: Option<(f32, f32)>,
    attract: bool,
    pub paused: bool,
    frame: u64,
}

impl HeartSimulation {
    pub fn new(settings: SimulationSettings, rng: StdRng) -> Self {
        let mut sim = Self {
            heart: Vec::new(),
            background: Vec::new(),
            settings,
            rng,
            heartbeat: 0.0,
            wind_direction: 0.0,
            pointer: None,
            attract: false,
            paused: false,
            frame: 0,
        };
        sim.reset();
        sim
    }

    /// Fresh heart and fresh background
    pub fn reset(&mut self) {
        self.regenerate();
        self.background = seed_background(
            self.settings.initial_background,
            &self.settings,
            &mut self.rng,
        );
        self.background.truncate(self.settings.background_cap);
        self.heartbeat = 0.0;
        self.wind_direction = 0.0;
        self.frame = 0;
        self.paused = false;
    }

    /// Replace the heart with a freshly seeded one; background is kept
    pub fn regenerate(&mut self) {
        let seed = HeartSeed::new(self.settings.center(), self.settings.heart_scale, &self.settings);
        self.heart = seed_heart(&seed, &self.settings, &mut self.rng);
        self.heart.truncate(self.settings.heart_cap);
        info!(particles = self.heart.len(), "heart regenerated");
    }

    /// Each heart particle falls with the configured probability.
    /// Returns how many switched this call.
    pub fn trigger_fall(&mut self) -> usize {
        let probability = self.settings.fall_trigger_probability;
        let mut switched = 0;
        for p in self.heart.iter_mut() {
            if !p.is_falling() && self.rng.gen::<f32>() < probability {
                p.fall();
                switched += 1;
            }
        }
        info!(switched, total = self.heart.len(), "fall triggered");
        switched
    }

    /// Advance the whole field by one tick
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }

        self.frame += 1;
        self.heartbeat += HEARTBEAT_STEP;
        if self.settings.falling {
            let change = self.settings.wind_change;
            self.wind_direction += self.rng.gen_range(-1.0..=1.0) * change;
        }

        let forces = self.forces();
        for p in self.heart.iter_mut().chain(self.background.iter_mut()) {
            p.update(&forces, &self.settings, &mut self.rng);
        }

        self.bloom();
        self.add_strays();
        self.enforce_caps();
    }

    /// Occasionally grow the heart with a few particles at the current beat
    fn bloom(&mut self) {
        let s = &self.settings;
        if s.bloom_batch == 0 || self.heart.len() >= s.bloom_below {
            return;
        }
        if self.rng.gen::<f32>() >= s.bloom_probability {
            return;
        }

        let seed = HeartSeed::new(s.center(), s.heart_scale * self.pulse_factor(), s)
            .with_density(s.bloom_density);
        let mut fresh = seed_heart(&seed, s, &mut self.rng);
        fresh.truncate(s.bloom_batch);
        self.heart.extend(fresh);
    }

    fn add_strays(&mut self) {
        if self.background.len() >= self.settings.stray_below {
            return;
        }
        if self.rng.gen::<f32>() < self.settings.stray_probability {
            let p = background_particle(&self.settings, &mut self.rng);
            self.background.push(p);
        }
    }

    /// Drop whatever lies past each cap (the tail of the list)
    fn enforce_caps(&mut self) {
        let (heart_cap, background_cap) = (self.settings.heart_cap, self.settings.background_cap);
        if self.heart.len() > heart_cap || self.background.len() > background_cap {
            debug!(
                heart = self.heart.len(),
                background = self.background.len(),
                "truncating to population caps"
            );
        }
        self.heart.truncate(heart_cap);
        self.background.truncate(background_cap);
    }

    /// External inputs for this tick
    pub fn forces(&self) -> Forces {
        Forces {
            pointer: self.pointer,
            attract: self.attract,
            wind_direction: self.wind_direction,
        }
    }

    pub fn set_pointer(&mut self, pointer: Option<(f32, f32)>) {
        self.pointer = pointer;
    }

    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    /// Flip attraction; returns the new state
    pub fn toggle_attract(&mut self) -> bool {
        self.attract = !self.attract;
        info!(attract = self.attract, "attraction toggled");
        self.attract
    }

    /// Attraction is both switched on and supported by the settings
    pub fn attracting(&self) -> bool {
        self.attract && self.settings.attraction
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn heart(&self) -> &[Particle] {
        &self.heart
    }

    pub fn background(&self) -> &[Particle] {
        &self.background
    }

    /// All particles in draw order (background behind the heart)
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.background.iter().chain(self.heart.iter())
    }

    /// Heart particles currently falling
    pub fn falling_count(&self) -> usize {
        self.heart.iter().filter(|p| p.is_falling()).count()
    }

    /// Current heartbeat scale applied to bloom hearts
    pub fn pulse_factor(&self) -> f32 {
        1.0 + self.settings.pulse_depth * self.heartbeat.sin()
    }

    pub fn wind_direction(&self) -> f32 {
        self.wind_direction
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
