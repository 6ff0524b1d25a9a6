//! Pose Snake - a grid Snake steered by body posture
//!
//! This library provides:
//! - Core grid simulation (game module)
//! - Posture classification and pose feeds (pose module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Session statistics (metrics module)
//! - The interactive play loop (modes module)

pub mod config;
pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod pose;
pub mod render;
