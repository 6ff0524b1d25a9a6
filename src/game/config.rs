use serde::{Deserialize, Serialize};

/// Configuration for the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: u32,
    /// Height of the game grid in cells
    pub grid_height: u32,
    /// Length of the snake at (re)start
    pub initial_snake_length: usize,
    /// Points awarded per food eaten
    pub food_score: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 15,
            initial_snake_length: 3,
            food_score: 10,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Check that a fresh snake fits the grid
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        if self.grid_height == 0 {
            return Err("grid_height must be at least 1".to_string());
        }

        // The snake starts centred and trails to the left of the centre column
        let room = (self.grid_width / 2) as usize + 1;
        if room < self.initial_snake_length {
            return Err(format!(
                "grid_width {} is too narrow for a snake of length {}",
                self.grid_width, self.initial_snake_length
            ));
        }

        Ok(())
    }
}
