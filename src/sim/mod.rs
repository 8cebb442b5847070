//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep or fixed interval only
//! - Seeded RNG only
//! - Stable iteration order (entity store order)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod games;
pub mod input;
pub mod progress;
pub mod session;

pub use clock::{FrameClock, IntervalClock};
pub use collision::{Body, Cell};
pub use games::GameKind;
pub use session::{Session, Signal};

/// Lifecycle of a single play session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Pre-start screen shown, no entities live
    Idle,
    /// Simulation active
    Running,
    /// Run ended, state frozen
    GameOver,
}

/// How a game wants to be ticked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// One tick per fixed-timestep frame (continuous physics)
    EveryFrame,
    /// One tick per fixed period in milliseconds (discrete steps)
    Fixed(u64),
}

/// Axis-aligned movement direction on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    /// Grid delta (x grows right, y grows down)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }
}

/// One-way HUD notification pushed after every state-changing tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    pub score: u64,
    /// Wave / sprint / speed bucket, depending on the game
    pub level: u32,
    /// Remaining lives or failure budget; `None` for binary-fail games
    pub lives: Option<u8>,
}

/// Terminal event emitted once on entering `GameOver`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub final_score: u64,
    pub final_level: u32,
}

/// The generic tick contract every mini-game implements.
///
/// A game owns all mutable state for one play session. Counters never move
/// backward, entities never outlive the session, and every entry point is a
/// no-op outside `Running`.
pub trait Game {
    /// Normalized command vocabulary for this game
    type Command;

    fn kind(&self) -> GameKind;

    fn status(&self) -> Status;

    /// Begin a fresh run with all counters at initial values.
    ///
    /// Valid from `Idle` and `GameOver` only; ignored while `Running`.
    fn start(&mut self, seed: u64);

    /// Feed one normalized command. Ignored unless `Running`.
    fn command(&mut self, cmd: Self::Command);

    /// Current tick cadence. Fixed-cadence games may change the period as
    /// difficulty rises; the driver replaces the old interval, never stacks.
    fn cadence(&self) -> Cadence;

    /// Advance one simulation step.
    ///
    /// Order within a tick: apply input, update positions/timers, resolve
    /// spawns, resolve collisions/scoring, check terminal conditions.
    fn tick(&mut self, dt: f32);

    fn hud(&self) -> HudSnapshot;
}
