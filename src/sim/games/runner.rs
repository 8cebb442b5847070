//! Roadmap Runner: side-scrolling jump/slide survival
//!
//! The track scrolls faster as distance accumulates. Obstacles must be
//! jumped over or slid under; collectibles pay points. Any unresolved
//! obstacle overlap ends the run - there are no lives here.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::collision::Body;
use crate::sim::{Cadence, Game, GameKind, HudSnapshot, Status};

pub const ARENA_W: f32 = 480.0;
pub const GROUND_Y: f32 = 160.0;

const GRAVITY: f32 = 0.8;
const JUMP_IMPULSE: f32 = -14.0;
const SLIDE_TICKS: u32 = 30;
const SLIDE_H: f32 = 20.0;
const NORMAL_H: f32 = 40.0;
const PLAYER_W: f32 = 30.0;
const PLAYER_X: f32 = 60.0;

const BASE_SPEED: f32 = 5.0;
const SPEED_STEP: f32 = 0.5;
const MAX_SPEED: f32 = 15.0;
/// Distance per speed step (also the progression-level bucket)
const DISTANCE_PER_LEVEL: f32 = 100.0;

const SPAWN_BASE_TICKS: u32 = 80;
const SPAWN_FLOOR_TICKS: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    Slide,
}

/// How an obstacle is avoided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Ground-level: jump over it
    Jump,
    /// Overhead: slide under it
    Slide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub body: Body,
    pub kind: ObstacleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub body: Body,
    pub points: u64,
}

/// Obstacle templates: (width, height, kind, fixed y override)
const OBSTACLE_TEMPLATES: [(f32, f32, ObstacleKind, Option<f32>); 4] = [
    (30.0, 35.0, ObstacleKind::Jump, None),
    (25.0, 40.0, ObstacleKind::Jump, None),
    (40.0, 20.0, ObstacleKind::Slide, Some(GROUND_Y - 70.0)),
    (30.0, 35.0, ObstacleKind::Jump, None),
];

const COLLECTIBLE_POINTS: [u64; 2] = [10, 25];

#[derive(Debug)]
pub struct Runner {
    status: Status,
    rng: Pcg32,
    pub score: u64,
    pub distance: f32,
    pub speed: f32,
    pub player: Body,
    pub jumping: bool,
    pub sliding: bool,
    slide_timer: u32,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    spawn_timer: u32,
}

impl Runner {
    pub fn new(seed: u64) -> Self {
        Self {
            status: Status::Idle,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            distance: 0.0,
            speed: BASE_SPEED,
            player: Body::new(PLAYER_X, GROUND_Y - NORMAL_H, PLAYER_W, NORMAL_H),
            jumping: false,
            sliding: false,
            slide_timer: 0,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            spawn_timer: 0,
        }
    }

    pub fn level(&self) -> u32 {
        (self.distance / DISTANCE_PER_LEVEL) as u32 + 1
    }

    fn jump(&mut self) {
        if !self.jumping && !self.sliding {
            self.player.vel.y = JUMP_IMPULSE;
            self.jumping = true;
        }
    }

    fn slide(&mut self) {
        if !self.jumping && !self.sliding {
            self.sliding = true;
            self.slide_timer = SLIDE_TICKS;
            self.player.size.y = SLIDE_H;
            self.player.pos.y = GROUND_Y - SLIDE_H;
        }
    }

    /// 70% obstacle, 30% collectible, entering from the right edge
    fn spawn(&mut self) {
        if self.rng.random_bool(0.7) {
            let (w, h, kind, fixed_y) =
                OBSTACLE_TEMPLATES[self.rng.random_range(0..OBSTACLE_TEMPLATES.len())];
            let y = fixed_y.unwrap_or(GROUND_Y - h);
            self.obstacles.push(Obstacle {
                body: Body::new(ARENA_W + 50.0, y, w, h),
                kind,
            });
        } else {
            let points = COLLECTIBLE_POINTS[self.rng.random_range(0..COLLECTIBLE_POINTS.len())];
            let y = if self.rng.random_bool(0.5) {
                GROUND_Y - 30.0
            } else {
                GROUND_Y - 70.0
            };
            self.collectibles.push(Collectible {
                body: Body::new(ARENA_W + 50.0, y, 25.0, 25.0),
                points,
            });
        }
    }

    /// True when the player clears the obstacle instead of hitting it
    fn avoided(&self, obstacle: &Obstacle) -> bool {
        match obstacle.kind {
            ObstacleKind::Slide => self.sliding,
            ObstacleKind::Jump => {
                self.jumping && self.player.bottom() < obstacle.body.pos.y + 10.0
            }
        }
    }
}

impl Game for Runner {
    type Command = Command;

    fn kind(&self) -> GameKind {
        GameKind::Runner
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self, seed: u64) {
        if self.status == Status::Running {
            return;
        }
        *self = Runner::new(seed);
        self.status = Status::Running;
    }

    fn command(&mut self, cmd: Command) {
        if self.status != Status::Running {
            return;
        }
        match cmd {
            Command::Jump => self.jump(),
            Command::Slide => self.slide(),
        }
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryFrame
    }

    fn tick(&mut self, _dt: f32) {
        if self.status != Status::Running {
            return;
        }

        // Distance drives speed; both only ever rise
        self.distance += self.speed * 0.1;
        self.speed =
            (BASE_SPEED + (self.distance / DISTANCE_PER_LEVEL).floor() * SPEED_STEP).min(MAX_SPEED);

        // Jump physics
        if self.jumping {
            self.player.vel.y += GRAVITY;
            self.player.pos.y += self.player.vel.y;
            if self.player.pos.y >= GROUND_Y - self.player.size.y {
                self.player.pos.y = GROUND_Y - self.player.size.y;
                self.player.vel.y = 0.0;
                self.jumping = false;
            }
        }

        // Slide countdown
        if self.sliding {
            self.slide_timer -= 1;
            if self.slide_timer == 0 {
                self.sliding = false;
                self.player.size.y = NORMAL_H;
                self.player.pos.y = GROUND_Y - NORMAL_H;
            }
        }

        // Spawn gap shrinks with distance
        self.spawn_timer += 1;
        let spawn_interval = SPAWN_BASE_TICKS
            .saturating_sub((self.distance / 50.0) as u32)
            .max(SPAWN_FLOOR_TICKS);
        if self.spawn_timer >= spawn_interval {
            self.spawn_timer = 0;
            self.spawn();
        }

        // Scroll the world
        let speed = self.speed;
        for o in &mut self.obstacles {
            o.body.pos.x -= speed;
        }
        self.obstacles.retain(|o| o.body.pos.x > -50.0);
        for c in &mut self.collectibles {
            c.body.pos.x -= speed;
        }
        self.collectibles.retain(|c| c.body.pos.x > -50.0);

        // Obstacle contact is fatal unless actively avoided
        for i in 0..self.obstacles.len() {
            let obstacle = self.obstacles[i].clone();
            if self.player.overlaps(&obstacle.body) && !self.avoided(&obstacle) {
                self.status = Status::GameOver;
                return;
            }
        }

        // Collectibles pay out and vanish
        let player = self.player;
        let mut earned = 0;
        self.collectibles.retain(|c| {
            if c.body.overlaps(&player) {
                earned += c.points;
                false
            } else {
                true
            }
        });
        self.score += earned;
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            level: self.level(),
            lives: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn running(seed: u64) -> Runner {
        let mut game = Runner::new(seed);
        game.start(seed);
        game
    }

    #[test]
    fn jump_arcs_and_lands() {
        let mut game = running(5);
        game.command(Command::Jump);
        assert!(game.jumping);
        game.tick(DT);
        assert!(game.player.pos.y < GROUND_Y - NORMAL_H);

        let mut ticks = 0;
        while game.jumping && ticks < 200 {
            game.tick(DT);
            ticks += 1;
        }
        assert!(!game.jumping);
        assert_eq!(game.player.pos.y, GROUND_Y - NORMAL_H);
    }

    #[test]
    fn no_double_jump() {
        let mut game = running(5);
        game.command(Command::Jump);
        game.tick(DT);
        let vy = game.player.vel.y;
        game.command(Command::Jump);
        assert_eq!(game.player.vel.y, vy);
    }

    #[test]
    fn slide_shrinks_then_restores() {
        let mut game = running(5);
        game.command(Command::Slide);
        assert!(game.sliding);
        assert_eq!(game.player.size.y, SLIDE_H);

        for _ in 0..SLIDE_TICKS {
            game.tick(DT);
        }
        assert!(!game.sliding);
        assert_eq!(game.player.size.y, NORMAL_H);
    }

    #[test]
    fn sliding_clears_overhead_obstacles() {
        let mut game = running(5);
        game.command(Command::Slide);
        game.obstacles.push(Obstacle {
            body: Body::new(PLAYER_X, GROUND_Y - 70.0, 40.0, 20.0),
            kind: ObstacleKind::Slide,
        });
        game.tick(DT);
        assert_eq!(game.status(), Status::Running);
    }

    #[test]
    fn standing_into_obstacle_ends_run() {
        let mut game = running(5);
        game.obstacles.push(Obstacle {
            body: Body::new(PLAYER_X + 2.0, GROUND_Y - 35.0, 30.0, 35.0),
            kind: ObstacleKind::Jump,
        });
        game.tick(DT);
        assert_eq!(game.status(), Status::GameOver);

        // Frozen after the terminal tick
        let distance = game.distance;
        game.tick(DT);
        assert_eq!(game.distance, distance);
    }

    #[test]
    fn collectible_pays_and_disappears() {
        let mut game = running(5);
        game.collectibles.push(Collectible {
            body: Body::new(PLAYER_X + 2.0, GROUND_Y - 30.0, 25.0, 25.0),
            points: 25,
        });
        game.tick(DT);
        assert_eq!(game.score, 25);
        assert!(game.collectibles.is_empty());
    }

    #[test]
    fn speed_rises_with_distance_to_cap() {
        let mut game = running(5);
        game.distance = 0.0;
        game.tick(DT);
        let slow = game.speed;

        game.distance = 10_000.0;
        game.obstacles.clear();
        game.tick(DT);
        assert!(game.speed > slow);
        assert_eq!(game.speed, MAX_SPEED);
    }

    #[test]
    fn level_tracks_distance_buckets() {
        let mut game = running(5);
        assert_eq!(game.level(), 1);
        game.distance = 250.0;
        assert_eq!(game.level(), 3);
    }
}
