//! Sprint Arcade - a shared engine for six retro desktop mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clocks, input, collision, the six games)
//! - `narrator`: End-of-run flavor text from final score and level
//! - `highscores`: Per-game top-10 boards with JSON persistence
//! - `settings`: Input/display preferences

pub mod highscores;
pub mod narrator;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

use std::fmt;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep for frame-driven games (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;
    /// Maximum interval ticks replayed per advance after a stall
    pub const MAX_CATCHUP_TICKS: u32 = 8;
}

/// Error type for settings/high-score storage
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage i/o error: {}", e),
            StoreError::Json(e) => write!(f, "storage encoding error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}
