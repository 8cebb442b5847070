//! Bug Squash: whack-a-grid against the clock
//!
//! Bugs pop up on a fixed grid and escape if not squashed in time; each
//! escape spawns two more and burns one point of a ten-escape failure
//! budget. Feature decoys punish careless taps, and two powerups (hotfix,
//! coverage) swing the pace back. The grid is an explicit cell-to-occupant
//! map; the display layer reads it and never writes it.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{progress, Cadence, Game, GameKind, HudSnapshot, Status};

/// Grid dimensions (row-major cell indices)
pub const GRID_COLS: usize = 4;
pub const GRID_ROWS: usize = 3;
pub const GRID_CELLS: usize = GRID_COLS * GRID_ROWS;

/// Housekeeping tick period
pub const TICK_MS: u64 = 100;

const MAX_ESCAPED: u32 = 10;
const SPAWN_BASE_MS: u64 = 1500;
const SPAWN_STEP_MS: u64 = 100;
const SPAWN_FLOOR_MS: u64 = 500;
/// Squashes per spawn-rate step
const SQUASHES_PER_STEP: u32 = 5;

const ESCAPE_BASE_MS: u64 = 3000;
const ESCAPE_STEP_MS: u64 = 20;
const ESCAPE_FLOOR_MS: u64 = 1500;

const FEATURE_TTL_MS: u64 = 2500;
const POWERUP_TTL_MS: u64 = 3000;
/// Delay before penalty/escape respawns appear
const RESPAWN_DELAY_MS: u64 = 300;
const COVERAGE_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Tap/click on a grid cell
    Tap(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    /// Squash every bug on the board
    Hotfix,
    /// Halve the spawn pace for a while
    Coverage,
}

/// What currently occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occupant {
    #[default]
    Empty,
    Bug {
        escapes_at_ms: u64,
    },
    /// Decoy: tapping it spawns penalty bugs; expiring is free
    Feature {
        fades_at_ms: u64,
    },
    Powerup {
        kind: PowerupKind,
        fades_at_ms: u64,
    },
}

#[derive(Debug)]
pub struct BugSquash {
    status: Status,
    rng: Pcg32,
    /// Cell index -> occupant
    pub cells: Vec<Occupant>,
    pub squashed: u32,
    pub escaped: u32,
    /// Accumulated simulation time
    clock_ms: u64,
    next_spawn_at_ms: u64,
    spawn_interval_ms: u64,
    /// Coverage powerup doubles the spawn interval until this deadline
    slow_until_ms: u64,
    /// Deferred spawn batches: (due time, count)
    pending_spawns: Vec<(u64, u32)>,
}

impl BugSquash {
    pub fn new(seed: u64) -> Self {
        Self {
            status: Status::Idle,
            rng: Pcg32::seed_from_u64(seed),
            cells: vec![Occupant::Empty; GRID_CELLS],
            squashed: 0,
            escaped: 0,
            clock_ms: 0,
            next_spawn_at_ms: 0,
            spawn_interval_ms: SPAWN_BASE_MS,
            slow_until_ms: 0,
            pending_spawns: Vec::new(),
        }
    }

    pub fn bugs_active(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Occupant::Bug { .. }))
            .count()
    }

    /// Remaining failure budget before the run ends
    pub fn escapes_left(&self) -> u32 {
        MAX_ESCAPED.saturating_sub(self.escaped)
    }

    fn effective_spawn_interval(&self) -> u64 {
        if self.clock_ms < self.slow_until_ms {
            self.spawn_interval_ms * 2
        } else {
            self.spawn_interval_ms
        }
    }

    fn escape_deadline(&self) -> u64 {
        let shaved = ESCAPE_STEP_MS * self.squashed as u64;
        self.clock_ms + ESCAPE_BASE_MS.saturating_sub(shaved).max(ESCAPE_FLOOR_MS)
    }

    /// Spawn one occupant on a random empty cell: 10% powerup, 20% feature
    /// decoy, 70% bug. No empty cell means the board is saturated and the
    /// spawn is skipped.
    fn spawn_one(&mut self) {
        let empty: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Occupant::Empty)
            .map(|(i, _)| i)
            .collect();
        let Some(&cell) = empty.get(self.rng.random_range(0..empty.len().max(1))) else {
            return;
        };

        let roll = self.rng.random::<f64>();
        self.cells[cell] = if roll < 0.10 {
            let kind = if self.rng.random_bool(0.5) {
                PowerupKind::Hotfix
            } else {
                PowerupKind::Coverage
            };
            Occupant::Powerup {
                kind,
                fades_at_ms: self.clock_ms + POWERUP_TTL_MS,
            }
        } else if roll < 0.30 {
            Occupant::Feature {
                fades_at_ms: self.clock_ms + FEATURE_TTL_MS,
            }
        } else {
            Occupant::Bug {
                escapes_at_ms: self.escape_deadline(),
            }
        };
    }

    fn spawn_batch(&mut self, count: u32) {
        for _ in 0..count {
            self.spawn_one();
        }
    }

    /// Spawn pace tightens every few squashes
    fn refresh_spawn_interval(&mut self) {
        self.spawn_interval_ms = progress::shrinking_interval(
            SPAWN_BASE_MS,
            SPAWN_STEP_MS,
            SPAWN_FLOOR_MS,
            self.squashed / SQUASHES_PER_STEP + 1,
        );
    }

    fn note_squash(&mut self) {
        self.squashed += 1;
        self.refresh_spawn_interval();
    }

    /// Returns true when the failure budget ran out
    fn note_escape(&mut self) -> bool {
        self.escaped += 1;
        self.pending_spawns
            .push((self.clock_ms + RESPAWN_DELAY_MS, 2));
        if self.escaped >= MAX_ESCAPED {
            self.status = Status::GameOver;
            return true;
        }
        false
    }

    fn tap(&mut self, cell: usize) {
        if cell >= GRID_CELLS {
            return;
        }
        match self.cells[cell] {
            Occupant::Bug { .. } => {
                self.cells[cell] = Occupant::Empty;
                self.note_squash();
            }
            Occupant::Feature { .. } => {
                // Penalty: the decoy vanishes and brings two bugs with it
                self.cells[cell] = Occupant::Empty;
                self.pending_spawns
                    .push((self.clock_ms + RESPAWN_DELAY_MS, 2));
            }
            Occupant::Powerup { kind, .. } => {
                self.cells[cell] = Occupant::Empty;
                match kind {
                    PowerupKind::Hotfix => {
                        for i in 0..GRID_CELLS {
                            if matches!(self.cells[i], Occupant::Bug { .. }) {
                                self.cells[i] = Occupant::Empty;
                                self.note_squash();
                            }
                        }
                    }
                    PowerupKind::Coverage => {
                        self.slow_until_ms = self.clock_ms + COVERAGE_MS;
                    }
                }
            }
            Occupant::Empty => {}
        }
    }
}

impl Game for BugSquash {
    type Command = Command;

    fn kind(&self) -> GameKind {
        GameKind::BugSquash
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self, seed: u64) {
        if self.status == Status::Running {
            return;
        }
        *self = BugSquash::new(seed);
        self.status = Status::Running;
        // First bug up immediately, then on the interval
        self.spawn_one();
        self.next_spawn_at_ms = self.spawn_interval_ms;
    }

    fn command(&mut self, cmd: Command) {
        if self.status != Status::Running {
            return;
        }
        match cmd {
            Command::Tap(cell) => self.tap(cell),
        }
    }

    fn cadence(&self) -> Cadence {
        Cadence::Fixed(TICK_MS)
    }

    fn tick(&mut self, dt: f32) {
        if self.status != Status::Running {
            return;
        }
        self.clock_ms += (dt * 1000.0).round() as u64;

        // Expiries first: escaped bugs, faded decoys and powerups
        for i in 0..GRID_CELLS {
            match self.cells[i] {
                Occupant::Bug { escapes_at_ms } if self.clock_ms >= escapes_at_ms => {
                    self.cells[i] = Occupant::Empty;
                    if self.note_escape() {
                        return;
                    }
                }
                Occupant::Feature { fades_at_ms } if self.clock_ms >= fades_at_ms => {
                    self.cells[i] = Occupant::Empty;
                }
                Occupant::Powerup { fades_at_ms, .. } if self.clock_ms >= fades_at_ms => {
                    self.cells[i] = Occupant::Empty;
                }
                _ => {}
            }
        }

        // Deferred penalty/escape spawns that have come due
        let due: Vec<(u64, u32)> = {
            let clock = self.clock_ms;
            let (ready, later): (Vec<_>, Vec<_>) =
                self.pending_spawns.drain(..).partition(|(at, _)| clock >= *at);
            self.pending_spawns = later;
            ready
        };
        for (_, count) in due {
            self.spawn_batch(count);
        }

        // Scheduled spawn on the (possibly slowed) interval
        if self.clock_ms >= self.next_spawn_at_ms {
            self.spawn_one();
            self.next_spawn_at_ms = self.clock_ms + self.effective_spawn_interval();
        }
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.squashed as u64,
            level: self.squashed / SQUASHES_PER_STEP + 1,
            lives: Some(self.escapes_left().min(u8::MAX as u32) as u8),
        }
    }
}
