//! Stakeholder Snake: grid snake fed on incoming requests
//!
//! One queued turn per step; exact reversals are rejected so the head can
//! never fold onto its own neck. Eating speeds the step interval up every
//! five requests. Wall contact or self contact ends the run immediately.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::collision::Cell;
use crate::sim::{progress, Cadence, Dir, Game, GameKind, HudSnapshot, Status};

pub const GRID_SIDE: i32 = 16;

const START_LEN: usize = 3;
const START_CELL: Cell = Cell { x: 8, y: 8 };
const POINTS_PER_FOOD: u64 = 10;
/// Foods per speed step
const FOODS_PER_STEP: u32 = 5;
const PERIOD_BASE_MS: u64 = 200;
const PERIOD_STEP_MS: u64 = 10;
const PERIOD_FLOOR_MS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Dir),
}

#[derive(Debug)]
pub struct Snake {
    status: Status,
    rng: Pcg32,
    pub score: u64,
    /// Head first
    pub body: VecDeque<Cell>,
    pub heading: Dir,
    queued: Dir,
    pub food: Cell,
    pub foods_eaten: u32,
    period_ms: u64,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        Self {
            status: Status::Idle,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            body: VecDeque::new(),
            heading: Dir::Right,
            queued: Dir::Right,
            food: Cell::new(0, 0),
            foods_eaten: 0,
            period_ms: PERIOD_BASE_MS,
        }
    }

    pub fn level(&self) -> u32 {
        self.foods_eaten / FOODS_PER_STEP + 1
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Drop food on a free cell; `None` when the snake fills the grid
    fn place_food(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..GRID_SIDE)
            .flat_map(|y| (0..GRID_SIDE).map(move |x| Cell::new(x, y)))
            .filter(|c| !self.body.contains(c))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.random_range(0..free.len())])
    }

    /// Queue a turn. Reversals (and redundant same-axis turns) are rejected
    /// so a single step can never fold the head back onto the neck.
    fn turn(&mut self, dir: Dir) {
        if dir.horizontal() == self.heading.horizontal() {
            return;
        }
        self.queued = dir;
    }
}

impl Game for Snake {
    type Command = Command;

    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self, seed: u64) {
        if self.status == Status::Running {
            return;
        }
        *self = Snake::new(seed);
        self.body = (0..START_LEN as i32)
            .map(|i| Cell::new(START_CELL.x - i, START_CELL.y))
            .collect();
        self.food = self.place_food().expect("fresh grid has free cells");
        self.status = Status::Running;
    }

    fn command(&mut self, cmd: Command) {
        if self.status != Status::Running {
            return;
        }
        match cmd {
            Command::Turn(dir) => self.turn(dir),
        }
    }

    fn cadence(&self) -> Cadence {
        Cadence::Fixed(self.period_ms)
    }

    fn tick(&mut self, _dt: f32) {
        if self.status != Status::Running {
            return;
        }

        self.heading = self.queued;
        let head = self.body[0].step(self.heading);

        if !head.in_bounds(GRID_SIDE) {
            self.status = Status::GameOver;
            return;
        }
        // Self contact checks the whole trailing body; the queued-turn
        // rejection already guarantees the just-vacated head cell can never
        // be re-entered in the same step.
        if self.body.contains(&head) {
            self.status = Status::GameOver;
            return;
        }

        self.body.push_front(head);

        if head == self.food {
            self.score += POINTS_PER_FOOD;
            self.foods_eaten += 1;
            if self.foods_eaten.is_multiple_of(FOODS_PER_STEP) {
                self.period_ms = progress::shrinking_interval(
                    PERIOD_BASE_MS,
                    PERIOD_STEP_MS,
                    PERIOD_FLOOR_MS,
                    self.level(),
                );
            }
            match self.place_food() {
                Some(cell) => self.food = cell,
                // Board full: nothing left to chase
                None => self.status = Status::GameOver,
            }
        } else {
            self.body.pop_back();
        }
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            level: self.level(),
            lives: None,
        }
    }
}
