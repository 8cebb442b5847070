//! Backlog Tetris: a falling-piece board game
//!
//! Seven story shapes drop into a 10x20 board. Completed rows score by the
//! current sprint, and every ten cleared rows starts a faster sprint. The
//! run ends when a fresh piece cannot enter the board.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{Cadence, Game, GameKind, HudSnapshot, Status};

pub const COLS: i32 = 10;
pub const ROWS: i32 = 20;

/// Gravity interval per sprint (seconds), floor-clamped
const DROP_BASE: f32 = 1.0;
const DROP_STEP: f32 = 0.1;
const DROP_FLOOR: f32 = 0.1;
/// Rows needed to advance one sprint
const ROWS_PER_SPRINT: u32 = 10;
/// Score for 1..=4 rows cleared at once, multiplied by sprint
const ROW_SCORES: [u64; 5] = [0, 100, 300, 500, 800];

/// The seven story shapes. Cell values are the color index.
const SHAPES: [&[&[u8]]; 7] = [
    // I
    &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
    // O
    &[&[2, 2], &[2, 2]],
    // T
    &[&[0, 3, 0], &[3, 3, 3], &[0, 0, 0]],
    // S
    &[&[0, 4, 4], &[4, 4, 0], &[0, 0, 0]],
    // Z
    &[&[5, 5, 0], &[0, 5, 5], &[0, 0, 0]],
    // J
    &[&[6, 0, 0], &[6, 6, 6], &[0, 0, 0]],
    // L
    &[&[0, 0, 7], &[7, 7, 7], &[0, 0, 0]],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Left,
    Right,
    Rotate,
    SoftDrop,
    HardDrop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub cells: Vec<Vec<u8>>,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    fn from_shape(index: usize, x: i32, y: i32) -> Self {
        let cells = SHAPES[index]
            .iter()
            .map(|row| row.to_vec())
            .collect();
        Self { cells, x, y }
    }

    /// Clockwise rotation: transpose, then reverse each row
    fn rotated(&self) -> Vec<Vec<u8>> {
        let n = self.cells.len();
        (0..self.cells[0].len())
            .map(|col| (0..n).rev().map(|row| self.cells[row][col]).collect())
            .collect()
    }

    pub fn width(&self) -> i32 {
        self.cells[0].len() as i32
    }
}

#[derive(Debug)]
pub struct Backlog {
    status: Status,
    rng: Pcg32,
    pub board: Vec<Vec<u8>>,
    pub piece: Option<Piece>,
    pub score: u64,
    pub sprint: u32,
    pub rows_cleared: u32,
    drop_timer: f32,
    drop_interval: f32,
}

/// Gravity interval for a given sprint, strictly shrinking to the floor
pub fn drop_interval_for(sprint: u32) -> f32 {
    (DROP_BASE - DROP_STEP * (sprint.max(1) - 1) as f32).max(DROP_FLOOR)
}

fn empty_board() -> Vec<Vec<u8>> {
    vec![vec![0; COLS as usize]; ROWS as usize]
}

fn collides(board: &[Vec<u8>], cells: &[Vec<u8>], x: i32, y: i32) -> bool {
    for (row, line) in cells.iter().enumerate() {
        for (col, &value) in line.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let nx = x + col as i32;
            let ny = y + row as i32;
            if nx < 0 || nx >= COLS || ny >= ROWS {
                return true;
            }
            if ny >= 0 && board[ny as usize][nx as usize] != 0 {
                return true;
            }
        }
    }
    false
}

impl Backlog {
    pub fn new(seed: u64) -> Self {
        Self {
            status: Status::Idle,
            rng: Pcg32::seed_from_u64(seed),
            board: empty_board(),
            piece: None,
            score: 0,
            sprint: 1,
            rows_cleared: 0,
            drop_timer: 0.0,
            drop_interval: DROP_BASE,
        }
    }

    fn spawn_piece(&mut self) {
        let index = self.rng.random_range(0..SHAPES.len());
        let width = SHAPES[index][0].len() as i32;
        let piece = Piece::from_shape(index, (COLS - width) / 2, -1);
        if collides(&self.board, &piece.cells, piece.x, piece.y + 1) {
            self.status = Status::GameOver;
            self.piece = None;
            return;
        }
        self.piece = Some(piece);
    }

    fn merge_piece(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        for (row, line) in piece.cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                let ny = piece.y + row as i32;
                let nx = piece.x + col as i32;
                if ny >= 0 {
                    self.board[ny as usize][nx as usize] = value;
                }
            }
        }
    }

    fn clear_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = ROWS as usize;
        while y > 0 {
            y -= 1;
            if self.board[y].iter().all(|&c| c != 0) {
                self.board.remove(y);
                self.board.insert(0, vec![0; COLS as usize]);
                cleared += 1;
                y += 1; // recheck the row that slid down
            }
        }
        cleared
    }

    /// One gravity step: move down, or lock + clear + respawn
    fn drop_step(&mut self) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        piece.y += 1;
        if collides(&self.board, &piece.cells, piece.x, piece.y) {
            piece.y -= 1;
            self.merge_piece();

            let cleared = self.clear_rows();
            if cleared > 0 {
                self.rows_cleared += cleared;
                self.score += ROW_SCORES[cleared.min(4) as usize] * self.sprint as u64;

                let sprint = self.rows_cleared / ROWS_PER_SPRINT + 1;
                if sprint > self.sprint {
                    self.sprint = sprint;
                    self.drop_interval = drop_interval_for(sprint);
                }
            }

            self.spawn_piece();
        }
        self.drop_timer = 0.0;
    }

    fn shift(&mut self, dx: i32) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        piece.x += dx;
        if collides(&self.board, &piece.cells, piece.x, piece.y) {
            piece.x -= dx;
        }
    }

    /// Rotate with a simple wall kick: try in place, then 1 and 2 columns
    /// away from the nearer wall.
    fn rotate(&mut self) {
        let Some(piece) = self.piece.as_ref() else {
            return;
        };
        let rotated = piece.rotated();
        let mut offset = 0;
        if collides(&self.board, &rotated, piece.x, piece.y) {
            offset = if piece.x > COLS / 2 { -1 } else { 1 };
            if collides(&self.board, &rotated, piece.x + offset, piece.y) {
                offset *= 2;
                if collides(&self.board, &rotated, piece.x + offset, piece.y) {
                    return;
                }
            }
        }
        let piece = self.piece.as_mut().unwrap();
        piece.cells = rotated;
        piece.x += offset;
    }

    fn hard_drop(&mut self) {
        while let Some(piece) = self.piece.as_ref() {
            if collides(&self.board, &piece.cells, piece.x, piece.y + 1) {
                break;
            }
            self.piece.as_mut().unwrap().y += 1;
            self.score += 2;
        }
        self.drop_step();
    }

    /// Where the current piece would land (for ghost rendering)
    pub fn ghost_y(&self) -> Option<i32> {
        let piece = self.piece.as_ref()?;
        let mut y = piece.y;
        while !collides(&self.board, &piece.cells, piece.x, y + 1) {
            y += 1;
        }
        Some(y)
    }
}

impl Game for Backlog {
    type Command = Command;

    fn kind(&self) -> GameKind {
        GameKind::Backlog
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self, seed: u64) {
        if self.status == Status::Running {
            return;
        }
        *self = Backlog::new(seed);
        self.status = Status::Running;
        self.spawn_piece();
    }

    fn command(&mut self, cmd: Command) {
        if self.status != Status::Running {
            return;
        }
        match cmd {
            Command::Left => self.shift(-1),
            Command::Right => self.shift(1),
            Command::Rotate => self.rotate(),
            Command::SoftDrop => {
                self.drop_step();
                if self.status == Status::Running {
                    self.score += 1;
                }
            }
            Command::HardDrop => self.hard_drop(),
        }
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryFrame
    }

    fn tick(&mut self, dt: f32) {
        if self.status != Status::Running {
            return;
        }
        self.drop_timer += dt;
        if self.drop_timer >= self.drop_interval {
            self.drop_step();
        }
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            level: self.sprint,
            lives: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(seed: u64) -> Backlog {
        let mut game = Backlog::new(seed);
        game.start(seed);
        game
    }

    #[test]
    fn start_spawns_centered_piece() {
        let game = running(3);
        let piece = game.piece.as_ref().unwrap();
        assert_eq!(piece.y, -1);
        assert!(piece.x >= 0 && piece.x + piece.width() <= COLS);
    }

    #[test]
    fn rotation_is_clockwise() {
        let piece = Piece::from_shape(2, 0, 0); // T
        let rotated = piece.rotated();
        // T pointing up becomes T pointing right
        assert_eq!(rotated, vec![vec![0, 3, 0], vec![0, 3, 3], vec![0, 3, 0]]);
    }

    #[test]
    fn four_rotations_restore_shape() {
        for index in 0..SHAPES.len() {
            let mut piece = Piece::from_shape(index, 0, 0);
            let initial = piece.cells.clone();
            for _ in 0..4 {
                piece.cells = piece.rotated();
            }
            assert_eq!(piece.cells, initial);
        }
    }

    #[test]
    fn shift_stops_at_walls() {
        let mut game = running(3);
        for _ in 0..20 {
            game.command(Command::Left);
        }
        let piece = game.piece.as_ref().unwrap();
        assert!(!collides(&game.board, &piece.cells, piece.x, piece.y));
        let x = piece.x;
        game.command(Command::Left);
        assert_eq!(game.piece.as_ref().unwrap().x, x);
    }

    #[test]
    fn full_rows_clear_and_collapse() {
        let mut game = running(3);
        for x in 0..COLS as usize {
            game.board[ROWS as usize - 1][x] = 1;
        }
        game.board[ROWS as usize - 2][0] = 2;

        let cleared = game.clear_rows();
        assert_eq!(cleared, 1);
        // The stack collapsed: the marker cell slid into the bottom row
        assert_eq!(game.board[ROWS as usize - 1][0], 2);
        assert!(game.board[0].iter().all(|&c| c == 0));
    }

    #[test]
    fn sprint_advances_every_ten_rows_and_speeds_up() {
        let mut game = running(3);
        game.rows_cleared = 9;
        let slow = game.drop_interval;

        // Complete the bottom row and lock a piece into it
        for x in 0..COLS as usize {
            game.board[ROWS as usize - 1][x] = 1;
        }
        game.drop_step(); // piece falls one step, no lock yet
        // Force lock by teleporting the piece onto the stack floor
        while game.piece.is_some() && game.rows_cleared == 9 {
            game.drop_step();
        }
        assert_eq!(game.rows_cleared, 10);
        assert_eq!(game.sprint, 2);
        assert!(game.drop_interval < slow);
    }

    #[test]
    fn gravity_interval_monotone_with_floor() {
        let mut prev = f32::MAX;
        for sprint in 1..30 {
            let interval = drop_interval_for(sprint);
            assert!(interval <= prev);
            assert!(interval >= DROP_FLOOR - f32::EPSILON);
            prev = interval;
        }
    }

    #[test]
    fn blocked_spawn_ends_run() {
        let mut game = running(3);
        // Fill the top rows so the next spawn cannot enter
        for y in 0..3 {
            for x in 0..COLS as usize {
                game.board[y][x] = 1;
            }
        }
        game.spawn_piece();
        assert_eq!(game.status(), Status::GameOver);
        assert!(game.piece.is_none());
    }

    #[test]
    fn ghost_projects_to_the_stack() {
        let game = running(3);
        let piece = game.piece.as_ref().unwrap();
        let ghost = game.ghost_y().unwrap();
        assert!(ghost >= piece.y);
        // One more row down would collide
        assert!(collides(&game.board, &piece.cells, piece.x, ghost + 1));
    }

    #[test]
    fn hard_drop_locks_and_respawns() {
        let mut game = running(3);
        let score = game.score;
        game.command(Command::HardDrop);
        assert!(game.score > score); // per-cell bonus
        assert!(game.piece.is_some());
        // Something locked into the board
        assert!(game.board.iter().flatten().any(|&c| c != 0));
    }
}
