//! Application configuration
//!
//! Settings come from an optional JSON file; any field left out keeps its
//! default. Command-line flags are applied on top by the binary.
//!
//! ```json
//! {
//!   "game": { "grid_width": 24, "grid_height": 18 },
//!   "classifier": { "confidence_threshold": 0.5, "dwell_ms": 250, "emit_policy": "once" },
//!   "tick_ms": 120
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::game::GameConfig;
use crate::pose::ClassifierConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub classifier: ClassifierConfig,
    /// Interval between simulation steps
    pub tick_ms: u64,
    /// Pose sampling rate
    pub pose_fps: u32,
    /// Screen refresh rate
    pub render_fps: u32,
    /// Fixed seed for food placement; random when absent
    pub seed: Option<u64>,
    /// Size the grid to the terminal instead of using `game.grid_*`
    pub auto_grid: bool,
    /// Restart a pose script from the top when it runs out
    pub loop_script: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            classifier: ClassifierConfig::default(),
            tick_ms: 150,
            pose_fps: 20,
            render_fps: 30,
            seed: None,
            auto_grid: false,
            loop_script: true,
        }
    }
}

impl AppConfig {
    /// Read a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Check every setting; returns a message naming the first bad one
    pub fn validate(&self) -> Result<(), String> {
        // Also the fallback when an auto-sized grid would not fit the terminal
        self.game.validate()?;
        self.classifier.validate()?;

        if self.tick_ms == 0 {
            return Err("tick_ms must be at least 1".to_string());
        }

        if self.pose_fps == 0 || self.pose_fps > 1000 {
            return Err(format!("pose_fps must be in [1, 1000], got {}", self.pose_fps));
        }

        if self.render_fps == 0 || self.render_fps > 1000 {
            return Err(format!(
                "render_fps must be in [1, 1000], got {}",
                self.render_fps
            ));
        }

        Ok(())
    }

    /// [`validate`](Self::validate) as an `anyhow` error
    pub fn ensure_valid(&self) -> Result<()> {
        self.validate()
            .map_err(|msg| anyhow!("Invalid configuration: {}", msg))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.pose_fps as u64)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.render_fps as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::EmitPolicy;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(150));
        assert_eq!(config.sample_interval(), Duration::from_millis(50));
        assert_eq!(config.classifier.dwell_ms, 220);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"game":{{"grid_width":24}},"classifier":{{"emit_policy":"once"}},"tick_ms":120}}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.game.grid_width, 24);
        assert_eq!(config.game.grid_height, 15);
        assert_eq!(config.classifier.emit_policy, EmitPolicy::Once);
        assert_eq!(config.classifier.confidence_threshold, 0.4);
        assert_eq!(config.tick_ms, 120);
        assert_eq!(config.pose_fps, 20);
    }

    #[test]
    fn test_load_errors_carry_path() {
        let missing = AppConfig::load(Path::new("/nonexistent/pose_snake.json")).unwrap_err();
        assert!(format!("{:#}", missing).contains("pose_snake.json"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.tick_ms = 0;
        assert!(config.validate().is_err());
        assert!(config.ensure_valid().is_err());

        let mut config = AppConfig::default();
        config.pose_fps = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.game.grid_width = 2;
        assert!(config.validate().is_err());
        config.auto_grid = true;
        assert!(config.validate().is_err());
    }
}
