use crate::braille;
use crate::config::AppConfig;
use crate::error::Result;
use crate::export;
use crate::settings::{SimulationSettings, Variant};
use crate::simulation::HeartSimulation;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::Rect;
use std::path::PathBuf;
use tracing::info;

/// Maximum simulation ticks per rendered frame
pub const MAX_SPEED: usize = 10;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Variant,
    Gravity,
    Wind,
    Radius,
    Speed,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in display order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Variant,
            Focus::Variant => Focus::Gravity,
            Focus::Gravity => Focus::Wind,
            Focus::Wind => Focus::Radius,
            Focus::Radius => Focus::Speed,
            Focus::Speed => Focus::Variant,
        }
    }

    /// Shift+Tab cycles backwards
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Speed,
            Focus::Variant => Focus::Speed,
            Focus::Gravity => Focus::Variant,
            Focus::Wind => Focus::Gravity,
            Focus::Radius => Focus::Wind,
            Focus::Speed => Focus::Radius,
        }
    }

    /// Line index in the parameters box
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::Variant => 0,
            Focus::Gravity => 1,
            Focus::Wind => 2,
            Focus::Radius => 3,
            Focus::Speed => 4,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Main application state
pub struct App {
    pub simulation: HeartSimulation,
    pub variant: Variant,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub steps_per_frame: usize,
    pub show_help: bool,
    pub show_glow: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// Inner canvas rect in terminal cells, refreshed before each draw
    pub canvas: Rect,
    /// One-line feedback shown in the sidebar
    pub status: Option<String>,
    /// Where `s` writes PNG snapshots
    pub snapshot_dir: PathBuf,
    seed: Option<u64>,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            simulation: HeartSimulation::new(config.settings.clone(), make_rng(config.seed)),
            variant: config.variant,
            focus: Focus::Controls,
            fullscreen_mode: config.fullscreen,
            steps_per_frame: config.steps_per_frame.clamp(1, MAX_SPEED),
            show_help: false,
            show_glow: true,
            help_scroll: 0,
            controls_scroll: 0,
            canvas: Rect::default(),
            status: None,
            snapshot_dir: PathBuf::from("."),
            seed: config.seed,
        }
    }

    /// Run simulation steps for current frame
    pub fn tick(&mut self) {
        for _ in 0..self.steps_per_frame {
            self.simulation.tick();
        }
    }

    /// Switch to a variant with its default settings
    pub fn set_variant(&mut self, variant: Variant) {
        self.set_settings(variant, SimulationSettings::for_variant(variant));
    }

    /// Restart the simulation with explicit settings
    pub fn set_settings(&mut self, variant: Variant, settings: SimulationSettings) {
        let pointer = self.simulation.pointer();
        self.variant = variant;
        self.simulation = HeartSimulation::new(settings, make_rng(self.seed));
        self.simulation.set_pointer(pointer);
        info!(variant = variant.name(), "variant selected");
        self.status = Some(format!("{} heart", variant.name()));
    }

    /// Rebuild the heart, keeping the background
    pub fn regenerate(&mut self) {
        self.simulation.regenerate();
        self.status = Some("Heart regenerated".to_string());
    }

    /// Let the heart fall
    pub fn trigger_fall(&mut self) {
        if !self.simulation.settings.falling {
            self.status = Some(format!("{} heart does not fall", self.variant.name()));
            return;
        }
        let n = self.simulation.trigger_fall();
        self.status = Some(format!("{} particles falling", n));
    }

    /// Toggle attraction mode
    pub fn toggle_attract(&mut self) {
        let on = self.simulation.toggle_attract();
        self.status = Some(if !self.simulation.settings.attraction {
            format!("{} heart ignores the pointer", self.variant.name())
        } else if on {
            "Attract: ON".to_string()
        } else {
            "Attract: OFF".to_string()
        });
    }

    /// Map a terminal cell to world coordinates if it lies on the canvas
    pub fn cell_to_world(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        let c = self.canvas;
        if c.width == 0 || c.height == 0 {
            return None;
        }
        if column < c.x || row < c.y || column >= c.x + c.width || row >= c.y + c.height {
            return None;
        }
        Some(braille::cell_to_world(
            &self.simulation.settings,
            c.width,
            c.height,
            column - c.x,
            row - c.y,
        ))
    }

    /// Pointer moved over the terminal
    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        if let Some(world) = self.cell_to_world(column, row) {
            self.simulation.set_pointer(Some(world));
        }
    }

    /// Pointer button pressed: clicks on the canvas toggle attraction
    pub fn pointer_pressed(&mut self, column: u16, row: u16) {
        if let Some(world) = self.cell_to_world(column, row) {
            self.simulation.set_pointer(Some(world));
            self.toggle_attract();
        }
    }

    /// Save the current frame as a PNG in the snapshot directory
    pub fn save_snapshot(&mut self) -> Result<PathBuf> {
        let path = self
            .snapshot_dir
            .join(format!("heart-{:06}.png", self.simulation.frame()));
        let result = export::save_snapshot(
            &self.simulation,
            &path,
            export::DEFAULT_WIDTH,
            export::DEFAULT_HEIGHT,
        );
        self.status = Some(match &result {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Snapshot failed: {}", e),
        });
        result.map(|_| path)
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Variant => self.set_variant(self.variant.next()),
            Focus::Gravity => self.simulation.settings.adjust_gravity(0.01),
            Focus::Wind => self.simulation.settings.adjust_wind_strength(0.005),
            Focus::Radius => self.simulation.settings.adjust_attract_radius(10.0),
            Focus::Speed => self.increase_speed(),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Variant => self.set_variant(self.variant.prev()),
            Focus::Gravity => self.simulation.settings.adjust_gravity(-0.01),
            Focus::Wind => self.simulation.settings.adjust_wind_strength(-0.005),
            Focus::Radius => self.simulation.settings.adjust_attract_radius(-10.0),
            Focus::Speed => self.decrease_speed(),
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.simulation.toggle_pause();
    }

    /// Toggle glow rendering
    pub fn toggle_glow(&mut self) {
        self.show_glow = !self.show_glow;
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Increase simulation speed
    pub fn increase_speed(&mut self) {
        self.steps_per_frame = (self.steps_per_frame + 1).min(MAX_SPEED);
    }

    /// Decrease simulation speed
    pub fn decrease_speed(&mut self) {
        self.steps_per_frame = self.steps_per_frame.saturating_sub(1).max(1);
    }
}
