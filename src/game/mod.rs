//! Core grid simulation for Snake
//!
//! This module contains the game logic without any I/O or rendering dependencies.
//! Direction commands come in through [`GameEngine::set_direction`], ticks through
//! [`GameEngine::step`]; observers read snapshots or subscribe to changes.

pub mod action;
pub mod config;
pub mod engine;
pub mod grid;
pub mod state;

// Re-export commonly used types
pub use action::{CommandSource, Direction};
pub use config::GameConfig;
pub use engine::{CollisionType, GameEngine, StepOutcome, SubscriptionId};
pub use grid::{compute_grid, is_in_bounds, manhattan_distance, pick_free_cell, GridLayout};
pub use state::{GameState, Phase, Position};
