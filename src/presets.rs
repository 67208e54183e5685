use crate::error::{HeartError, Result};
use crate::settings::{LifeCycle, SimulationSettings, Variant};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A named preset: a variant plus tuned settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub variant: Variant,
    pub settings: SimulationSettings,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        variant: Variant,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            variant,
            settings,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    /// Where user presets live (None if no config dir exists)
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    pub fn new() -> Self {
        Self::with_dir(Self::presets_dir())
    }

    /// Manager reading and writing user presets in `dir`
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the default presets directory path
    fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("heart-particles").join("presets"))
    }

    /// Load user presets from disk, skipping unreadable files
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_deref() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match read_preset(&path) {
                Ok(preset) => self.user.push(preset),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping preset"),
            }
        }
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<PathBuf> {
        let dir = self.dir.as_ref().ok_or(HeartError::NoConfigDir)?;
        fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}.json", file_stem(&preset.name)));
        fs::write(&path, serde_json::to_string_pretty(&preset)?)?;
        info!(name = %preset.name, path = %path.display(), "preset saved");

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(path)
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Like `find`, but an unknown name is an error
    pub fn resolve(&self, name: &str) -> Result<&Preset> {
        self.find(name)
            .ok_or_else(|| HeartError::UnknownPreset(name.to_string()))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}

fn read_preset(path: &Path) -> Result<Preset> {
    let content = fs::read_to_string(path)?;
    let mut preset: Preset = serde_json::from_str(&content)?;
    preset.settings.sanitize();
    Ok(preset)
}

/// Sanitize a preset name into a file stem
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn builtin_presets() -> Vec<Preset> {
    let mut presets: Vec<Preset> = Variant::ALL
        .iter()
        .map(|&variant| {
            let description = match variant {
                Variant::Classic => "Flat blue heart that keeps blooming",
                Variant::Enhanced => "Trails, fading particles and a night gradient",
                Variant::Layered => "Five stacked layers that fall in the wind",
                Variant::Interactive => "Layered heart with drifting stars and attraction",
            };
            Preset::new(
                variant.name(),
                description,
                variant,
                SimulationSettings::for_variant(variant),
            )
        })
        .collect();

    let layered = SimulationSettings::for_variant(Variant::Layered);
    presets.push(Preset::new(
        "Snowfall",
        "Slow, windy fall with nearly every particle let go",
        Variant::Layered,
        SimulationSettings {
            gravity: 0.01,
            wind_strength: 0.05,
            wind_change: 0.02,
            fall_trigger_probability: 0.95,
            ..layered
        },
    ));

    let interactive = SimulationSettings::for_variant(Variant::Interactive);
    presets.push(Preset::new(
        "Stardust",
        "Dense starfield with a wide pull radius",
        Variant::Interactive,
        SimulationSettings {
            initial_background: 400,
            stray_probability: 0.2,
            stray_below: 500,
            background_cap: 500,
            background_life: LifeCycle::Respawn,
            attract_radius: 250.0,
            fade_range: (0.002, 0.006),
            ..interactive
        },
    ));

    presets
}
