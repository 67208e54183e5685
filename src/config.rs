use crate::error::Result;
use crate::settings::{SimulationSettings, Variant};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete application configuration for export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Variant the settings were derived from
    pub variant: Variant,
    /// All simulation settings
    pub settings: SimulationSettings,
    /// Simulation ticks per rendered frame (app-level)
    pub steps_per_frame: usize,
    /// Start without the sidebar (app-level)
    pub fullscreen: bool,
    /// Random seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Config for a built-in variant
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            settings: SimulationSettings::for_variant(variant),
            ..Self::default()
        }
    }

    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.settings.sanitize();
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            variant: Variant::default(),
            settings: SimulationSettings::default(),
            steps_per_frame: 1,
            fullscreen: false,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeartError;
    use crate::settings::{Background, Glow, LifeCycle, Palette};
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = AppConfig::for_variant(Variant::Enhanced);
        config.settings.gravity = 0.07;
        config.settings.attract_radius = 220.0;
        config.steps_per_frame = 3;
        config.fullscreen = true;
        config.seed = Some(99);

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.variant, Variant::Enhanced);
        assert_eq!(parsed.settings.gravity, 0.07);
        assert_eq!(parsed.settings.attract_radius, 220.0);
        assert_eq!(parsed.settings.palette, Palette::BlueBand);
        assert_eq!(parsed.settings.background, Background::Gradient);
        assert_eq!(parsed.settings.heart_life, LifeCycle::Drift);
        assert_eq!(parsed.settings.trail_range, (3, 8));
        assert_eq!(
            parsed.settings.glow,
            Glow::Halo {
                scale: 3.0,
                alpha: 30.0 / 255.0
            }
        );
        assert_eq!(parsed.steps_per_frame, 3);
        assert!(parsed.fullscreen);
        assert_eq!(parsed.seed, Some(99));
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::for_variant(Variant::Layered);

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.variant, Variant::Layered);
        assert_eq!(loaded.settings.layers, 5);
        assert_eq!(loaded.steps_per_frame, config.steps_per_frame);
    }

    #[test]
    fn test_seed_is_optional() {
        let mut value = serde_json::to_value(AppConfig::default()).unwrap();
        value.as_object_mut().unwrap().remove("seed");
        let parsed: AppConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.seed, None);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(HeartError::Json(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(HeartError::Io(_))));
    }

    #[test]
    fn test_loaded_settings_are_sanitized() {
        use crate::simulation::HeartSimulation;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut value = serde_json::to_value(AppConfig::for_variant(Variant::Enhanced)).unwrap();
        let settings = value["settings"].as_object_mut().unwrap();
        settings.insert("trail_range".into(), serde_json::json!([5, 2]));
        settings.insert("seed_jitter".into(), serde_json::json!(-1.0));
        settings.insert("angle_drift".into(), serde_json::json!(-0.1));
        settings.insert("width".into(), serde_json::json!(0.0));

        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), value.to_string()).unwrap();
        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(loaded.settings.trail_range, (2, 5));
        assert_eq!(loaded.settings.seed_jitter, 1.0);
        assert!((loaded.settings.angle_drift - 0.1).abs() < 1e-6);
        assert_eq!(loaded.settings.width, 1.0);

        // Runs without hitting an empty random range
        let mut sim = HeartSimulation::new(loaded.settings, StdRng::seed_from_u64(7));
        for _ in 0..50 {
            sim.tick();
        }
        assert_eq!(sim.frame(), 50);
    }
}
