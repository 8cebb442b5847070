//! Scope Creep: a fixed-formation shooter
//!
//! Waves of feature requests march across the arena and descend when they
//! hit an edge. Every fifth wave is a single boss. Kills score by wave,
//! may drop one powerup per wave, and clearing the formation advances the
//! wave. Letting any regular enemy reach the player's row ends the run
//! regardless of remaining lives.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::collision::Body;
use crate::sim::input::HeldKeys;
use crate::sim::{progress, Cadence, Dir, Game, GameKind, HudSnapshot, Status};

pub const ARENA_W: f32 = 480.0;
pub const ARENA_H: f32 = 400.0;

const PLAYER_W: f32 = 40.0;
const PLAYER_H: f32 = 30.0;
const PLAYER_SPEED: f32 = 6.0;
const PLAYER_MARGIN: f32 = 10.0;

const BULLET_SPEED: f32 = 8.0;
const ENEMY_BULLET_SPEED: f32 = 4.0;
/// Ticks between shots (250 ms at 60 Hz), and under rapid fire (100 ms)
const SHOT_COOLDOWN: u32 = 15;
const RAPID_COOLDOWN: u32 = 6;
const RAPID_FIRE_TICKS: u32 = 600;
const INVINCIBLE_TICKS: u32 = 120;

const ENEMY_SIZE: f32 = 36.0;
const MARCH_BASE: u32 = 60;
const MARCH_STEP: u32 = 5;
const MARCH_FLOOR: u32 = 15;
const MARCH_DROP: f32 = 20.0;
const EDGE_MARGIN: f32 = 20.0;

const POWERUP_SIZE: f32 = 24.0;
const POWERUP_FALL: f32 = 2.0;
const POWERUP_CHANCE: f64 = 0.15;
const MAX_LIVES: u8 = 5;
const BLAST_FRAMES: u32 = 15;
const BOSS_WAVE_EVERY: u32 = 5;

/// Normalized commands: steer left/right (held state) and shoot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SteerLeft(bool),
    SteerRight(bool),
    Fire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    RapidFire,
    Shield,
    ExtraLife,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub body: Body,
    pub hp: u8,
    pub max_hp: u8,
    pub boss: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Powerup {
    pub body: Body,
    pub kind: PowerupKind,
}

/// Transient explosion effect, display-only
#[derive(Debug, Clone, PartialEq)]
pub struct Blast {
    pub pos: Vec2,
    pub frame: u32,
    pub scale: f32,
}

#[derive(Debug)]
pub struct ScopeCreep {
    status: Status,
    rng: Pcg32,
    pub score: u64,
    pub wave: u32,
    pub lives: u8,
    pub player: Body,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Body>,
    pub enemy_bullets: Vec<Body>,
    pub powerups: Vec<Powerup>,
    pub blasts: Vec<Blast>,
    pub shield: bool,
    pub rapid_fire_ticks: u32,
    pub invincible_ticks: u32,
    /// One powerup drop per wave
    pub powerup_dropped: bool,
    march_dir: f32,
    march_timer: u32,
    march_interval: u32,
    shot_cooldown: u32,
    held: HeldKeys,
    fire_queued: bool,
}

impl ScopeCreep {
    pub fn new(seed: u64) -> Self {
        Self {
            status: Status::Idle,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            wave: 1,
            lives: 3,
            player: Body::new(
                ARENA_W / 2.0 - PLAYER_W / 2.0,
                ARENA_H - 50.0,
                PLAYER_W,
                PLAYER_H,
            ),
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            powerups: Vec::new(),
            blasts: Vec::new(),
            shield: false,
            rapid_fire_ticks: 0,
            invincible_ticks: 0,
            powerup_dropped: false,
            march_dir: 1.0,
            march_timer: 0,
            march_interval: MARCH_BASE,
            shot_cooldown: 0,
            held: HeldKeys::default(),
            fire_queued: false,
        }
    }

    fn init_wave(&mut self) {
        self.player = Body::new(
            ARENA_W / 2.0 - PLAYER_W / 2.0,
            ARENA_H - 50.0,
            PLAYER_W,
            PLAYER_H,
        );
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.powerups.clear();
        self.blasts.clear();
        self.march_dir = 1.0;
        self.march_timer = 0;
        self.march_interval = MARCH_BASE
            .saturating_sub(MARCH_STEP * (self.wave - 1))
            .max(MARCH_FLOOR);
        self.powerup_dropped = false;

        self.enemies = if self.wave.is_multiple_of(BOSS_WAVE_EVERY) {
            self.boss_formation()
        } else {
            match (self.wave - 1) % 4 {
                0 => self.grid_formation(),
                1 => self.v_formation(),
                2 => self.diamond_formation(),
                _ => self.scattered_formation(),
            }
        };
    }

    /// From wave 3 onward some enemies spawn shielded (2 hp)
    fn roll_hp(&mut self) -> u8 {
        if self.wave > 2 {
            let chance = progress::rising_chance(0.2, 0.05, 1.0, self.wave);
            if self.rng.random_bool(chance) {
                return 2;
            }
        }
        1
    }

    fn make_enemy(&mut self, x: f32, y: f32) -> Enemy {
        let hp = self.roll_hp();
        Enemy {
            body: Body::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
            hp,
            max_hp: hp,
            boss: false,
        }
    }

    fn grid_formation(&mut self) -> Vec<Enemy> {
        let mut enemies = Vec::new();
        for row in 0..3 {
            for col in 0..5 {
                enemies.push(self.make_enemy(60.0 + col as f32 * 70.0, 40.0 + row as f32 * 50.0));
            }
        }
        enemies
    }

    fn v_formation(&mut self) -> Vec<Enemy> {
        const ROWS: [&[u32]; 5] = [&[2], &[1, 3], &[0, 4], &[0, 4], &[1, 3]];
        let mut enemies = Vec::new();
        for (row, cols) in ROWS.iter().enumerate() {
            for &col in *cols {
                enemies.push(self.make_enemy(100.0 + col as f32 * 70.0, 30.0 + row as f32 * 45.0));
            }
        }
        enemies
    }

    fn diamond_formation(&mut self) -> Vec<Enemy> {
        const ROWS: [&[u32]; 5] = [&[2], &[1, 2, 3], &[0, 1, 2, 3, 4], &[1, 2, 3], &[2]];
        let mut enemies = Vec::new();
        for (row, cols) in ROWS.iter().enumerate() {
            for &col in *cols {
                enemies.push(self.make_enemy(80.0 + col as f32 * 65.0, 25.0 + row as f32 * 42.0));
            }
        }
        enemies
    }

    fn scattered_formation(&mut self) -> Vec<Enemy> {
        let count = progress::rising_count(10, 1, 25, self.wave / 2 + 1);
        let mut enemies = Vec::new();
        for _ in 0..count {
            let x = 40.0 + self.rng.random::<f32>() * (ARENA_W - 120.0);
            let y = 30.0 + self.rng.random::<f32>() * 150.0;
            enemies.push(self.make_enemy(x, y));
        }
        enemies
    }

    fn boss_formation(&mut self) -> Vec<Enemy> {
        let hp = (10 + (self.wave / BOSS_WAVE_EVERY) * 5).min(u8::MAX as u32) as u8;
        vec![Enemy {
            body: Body::new(ARENA_W / 2.0 - 40.0, 60.0, 80.0, 80.0),
            hp,
            max_hp: hp,
            boss: true,
        }]
    }

    fn blast_at(&mut self, pos: Vec2, scale: f32) {
        self.blasts.push(Blast {
            pos,
            frame: 0,
            scale,
        });
    }

    fn fire(&mut self) {
        let cooldown = if self.rapid_fire_ticks > 0 {
            RAPID_COOLDOWN
        } else {
            SHOT_COOLDOWN
        };
        if self.shot_cooldown > 0 {
            return;
        }
        self.shot_cooldown = cooldown;
        self.bullets.push(
            Body::new(
                self.player.pos.x + self.player.size.x / 2.0 - 3.0,
                self.player.pos.y,
                6.0,
                15.0,
            )
            .with_vel(0.0, -BULLET_SPEED),
        );
    }

    fn march(&mut self) {
        self.march_timer += 1;
        if self.march_timer < self.march_interval {
            return;
        }
        self.march_timer = 0;

        let hit_edge = self.enemies.iter().any(|e| {
            (e.body.right() > ARENA_W - EDGE_MARGIN && self.march_dir > 0.0)
                || (e.body.pos.x < EDGE_MARGIN && self.march_dir < 0.0)
        });

        if hit_edge {
            self.march_dir = -self.march_dir;
            for e in &mut self.enemies {
                if !e.boss {
                    e.body.pos.y += MARCH_DROP;
                }
            }
        } else {
            let step = if self.enemies.iter().any(|e| e.boss) {
                20.0
            } else {
                15.0
            };
            for e in &mut self.enemies {
                e.body.pos.x += self.march_dir * step;
            }
        }
    }

    fn enemy_fire(&mut self) {
        let regulars: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.boss)
            .map(|(i, _)| i)
            .collect();

        if !regulars.is_empty() {
            let chance = progress::rising_chance(0.02, 0.005, 1.0, self.wave);
            if self.rng.random_bool(chance) {
                let pick = regulars[self.rng.random_range(0..regulars.len())];
                let shooter = self.enemies[pick].body;
                self.enemy_bullets.push(
                    Body::new(
                        shooter.pos.x + shooter.size.x / 2.0 - 3.0,
                        shooter.bottom(),
                        6.0,
                        15.0,
                    )
                    .with_vel(0.0, ENEMY_BULLET_SPEED),
                );
            }
        }

        // Boss fires a 3-shot spread, more often
        if let Some(boss) = self.enemies.iter().find(|e| e.boss) {
            let body = boss.body;
            if self.rng.random_bool(0.08) {
                for i in -1i32..=1 {
                    self.enemy_bullets.push(
                        Body::new(
                            body.pos.x + body.size.x / 2.0 - 3.0 + (i as f32 * 30.0),
                            body.bottom(),
                            8.0,
                            18.0,
                        )
                        .with_vel(0.0, ENEMY_BULLET_SPEED),
                    );
                }
            }
        }
    }

    /// Bullet/enemy resolution. Each bullet is consumed by its first hit in
    /// store order and cannot score against a second enemy in the same tick.
    fn resolve_player_bullets(&mut self) {
        let mut consumed = vec![false; self.bullets.len()];
        for bi in 0..self.bullets.len() {
            let bullet = self.bullets[bi];
            let hit = self.enemies.iter().position(|e| e.body.overlaps(&bullet));
            let Some(ei) = hit else { continue };
            consumed[bi] = true;

            self.enemies[ei].hp -= 1;
            if self.enemies[ei].hp == 0 {
                let enemy = self.enemies.remove(ei);
                let points = if enemy.boss {
                    progress::scaled_points(100, self.wave)
                } else {
                    progress::scaled_points(10, self.wave)
                };
                self.score += points;

                let center = enemy.body.center();
                let scale = if enemy.boss { 2.0 } else { 1.0 };
                self.blast_at(center, scale);
                self.roll_powerup_drop(center);
            }
        }

        let mut keep = consumed.iter();
        self.bullets.retain(|_| !keep.next().copied().unwrap_or(false));
    }

    /// One drop roll per kill, at most one drop per wave
    fn roll_powerup_drop(&mut self, pos: Vec2) {
        if self.powerup_dropped {
            return;
        }
        if !self.rng.random_bool(POWERUP_CHANCE) {
            return;
        }
        self.powerup_dropped = true;
        let kind = match self.rng.random_range(0..3) {
            0 => PowerupKind::RapidFire,
            1 => PowerupKind::Shield,
            _ => PowerupKind::ExtraLife,
        };
        self.powerups.push(Powerup {
            body: Body::new(
                pos.x - POWERUP_SIZE / 2.0,
                pos.y - POWERUP_SIZE / 2.0,
                POWERUP_SIZE,
                POWERUP_SIZE,
            )
            .with_vel(0.0, POWERUP_FALL),
            kind,
        });
    }

    fn apply_powerup(&mut self, kind: PowerupKind) {
        match kind {
            PowerupKind::RapidFire => self.rapid_fire_ticks = RAPID_FIRE_TICKS,
            PowerupKind::Shield => self.shield = true,
            PowerupKind::ExtraLife => self.lives = (self.lives + 1).min(MAX_LIVES),
        }
    }

    /// Enemy bullets against the player; shield absorbs one hit, then lives
    /// burn with an invincibility window. Returns true when the run ended.
    fn resolve_enemy_bullets(&mut self) -> bool {
        let player = self.player;
        let mut i = 0;
        while i < self.enemy_bullets.len() {
            if self.invincible_ticks == 0 && self.enemy_bullets[i].overlaps(&player) {
                self.enemy_bullets.remove(i);
                if self.shield {
                    self.shield = false;
                    self.blast_at(Vec2::new(player.center().x, player.pos.y), 0.5);
                } else {
                    self.lives -= 1;
                    self.invincible_ticks = INVINCIBLE_TICKS;
                    self.blast_at(player.center(), 0.8);
                    if self.lives == 0 {
                        self.status = Status::GameOver;
                        return true;
                    }
                }
            } else {
                i += 1;
            }
        }
        false
    }
}

impl Game for ScopeCreep {
    type Command = Command;

    fn kind(&self) -> GameKind {
        GameKind::ScopeCreep
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self, seed: u64) {
        if self.status == Status::Running {
            return;
        }
        *self = ScopeCreep::new(seed);
        self.status = Status::Running;
        self.init_wave();
    }

    fn command(&mut self, cmd: Command) {
        if self.status != Status::Running {
            return;
        }
        match cmd {
            Command::SteerLeft(held) => self.held.set(Dir::Left, held),
            Command::SteerRight(held) => self.held.set(Dir::Right, held),
            Command::Fire => self.fire_queued = true,
        }
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryFrame
    }

    fn tick(&mut self, _dt: f32) {
        if self.status != Status::Running {
            return;
        }

        // 1. Apply input
        let new_x = (self.player.pos.x + self.held.axis_x() * PLAYER_SPEED)
            .clamp(PLAYER_MARGIN, ARENA_W - self.player.size.x - PLAYER_MARGIN);
        self.player.pos.x = new_x;
        if self.shot_cooldown > 0 {
            self.shot_cooldown -= 1;
        }
        if self.fire_queued {
            self.fire_queued = false;
            self.fire();
        }

        // 2. Update timers and positions
        self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
        self.rapid_fire_ticks = self.rapid_fire_ticks.saturating_sub(1);

        for b in &mut self.bullets {
            b.pos += b.vel;
        }
        self.bullets.retain(|b| b.pos.y > -20.0);

        for b in &mut self.enemy_bullets {
            b.pos += b.vel;
        }
        self.enemy_bullets.retain(|b| b.pos.y < ARENA_H + 20.0);

        for p in &mut self.powerups {
            p.body.pos += p.body.vel;
        }
        self.powerups.retain(|p| p.body.pos.y < ARENA_H + 20.0);

        for blast in &mut self.blasts {
            blast.frame += 1;
        }
        self.blasts.retain(|b| b.frame < BLAST_FRAMES);

        self.march();

        // 3. Resolve spawns
        self.enemy_fire();

        // 4. Resolve collisions and scoring
        self.resolve_player_bullets();

        let player = self.player;
        let mut collected = Vec::new();
        self.powerups.retain(|p| {
            if p.body.overlaps(&player) {
                collected.push(p.kind);
                false
            } else {
                true
            }
        });
        for kind in collected {
            self.apply_powerup(kind);
        }

        if self.resolve_enemy_bullets() {
            return;
        }

        // 5. Terminal conditions
        let breached = self
            .enemies
            .iter()
            .any(|e| !e.boss && e.body.bottom() > self.player.pos.y);
        if breached {
            self.status = Status::GameOver;
            return;
        }

        if self.enemies.is_empty() {
            self.wave += 1;
            self.init_wave();
        }
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            level: self.wave,
            lives: Some(self.lives),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(seed: u64) -> ScopeCreep {
        let mut game = ScopeCreep::new(seed);
        game.start(seed);
        game
    }

    #[test]
    fn start_builds_wave_one() {
        let game = running(7);
        assert_eq!(game.status(), Status::Running);
        assert_eq!(game.wave, 1);
        assert_eq!(game.lives, 3);
        assert_eq!(game.enemies.len(), 15); // 3x5 grid
        assert!(game.enemies.iter().all(|e| !e.boss));
    }

    #[test]
    fn idle_instance_has_no_entities() {
        let game = ScopeCreep::new(7);
        assert_eq!(game.status(), Status::Idle);
        assert!(game.enemies.is_empty());
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn commands_ignored_while_idle() {
        let mut game = ScopeCreep::new(7);
        let x = game.player.pos.x;
        game.command(Command::SteerLeft(true));
        game.tick(1.0 / 60.0);
        assert_eq!(game.player.pos.x, x);
    }

    #[test]
    fn boss_every_fifth_wave() {
        let mut game = running(7);
        game.wave = 5;
        game.init_wave();
        assert_eq!(game.enemies.len(), 1);
        assert!(game.enemies[0].boss);
        assert_eq!(game.enemies[0].hp, 15);
    }

    #[test]
    fn march_interval_shrinks_with_wave() {
        let mut game = running(7);
        let mut prev = u32::MAX;
        for wave in 1..20 {
            game.wave = wave;
            game.init_wave();
            assert!(game.march_interval <= prev);
            assert!(game.march_interval >= MARCH_FLOOR);
            prev = game.march_interval;
        }
    }

    #[test]
    fn one_bullet_scores_one_enemy() {
        let mut game = running(7);
        // Two overlapping enemies and one bullet over both
        game.enemies = vec![
            Enemy {
                body: Body::new(100.0, 100.0, 36.0, 36.0),
                hp: 1,
                max_hp: 1,
                boss: false,
            },
            Enemy {
                body: Body::new(110.0, 100.0, 36.0, 36.0),
                hp: 1,
                max_hp: 1,
                boss: false,
            },
        ];
        game.bullets = vec![Body::new(115.0, 110.0, 6.0, 15.0)];
        game.resolve_player_bullets();

        assert_eq!(game.enemies.len(), 1);
        assert_eq!(game.score, 10); // one kill at wave 1
        assert!(game.bullets.is_empty());
    }

    #[test]
    fn depleted_enemy_removed_exactly_once() {
        let mut game = running(7);
        game.enemies = vec![Enemy {
            body: Body::new(100.0, 100.0, 36.0, 36.0),
            hp: 1,
            max_hp: 1,
            boss: false,
        }];
        // Two bullets over the same enemy: first kills it, second flies on
        game.bullets = vec![
            Body::new(110.0, 110.0, 6.0, 15.0),
            Body::new(112.0, 110.0, 6.0, 15.0),
        ];
        game.resolve_player_bullets();
        assert!(game.enemies.is_empty());
        assert_eq!(game.score, 10);
        assert_eq!(game.bullets.len(), 1);
    }

    #[test]
    fn at_most_one_powerup_per_wave() {
        let mut game = running(7);
        game.powerup_dropped = false;
        for _ in 0..200 {
            game.roll_powerup_drop(Vec2::new(100.0, 100.0));
        }
        assert!(game.powerups.len() <= 1);
    }

    #[test]
    fn shield_absorbs_one_hit() {
        let mut game = running(7);
        game.shield = true;
        game.enemy_bullets = vec![Body::new(
            game.player.center().x,
            game.player.pos.y + 5.0,
            6.0,
            15.0,
        )];
        let ended = game.resolve_enemy_bullets();
        assert!(!ended);
        assert!(!game.shield);
        assert_eq!(game.lives, 3);
    }

    #[test]
    fn losing_last_life_ends_run_in_same_tick() {
        let mut game = running(7);
        game.lives = 1;
        game.enemies.clear();
        game.enemy_bullets = vec![Body::new(
            game.player.center().x,
            game.player.pos.y + 5.0,
            6.0,
            15.0,
        )];
        game.tick(1.0 / 60.0);
        assert_eq!(game.status(), Status::GameOver);
        // Frozen after the terminal tick
        let score = game.score;
        game.tick(1.0 / 60.0);
        assert_eq!(game.score, score);
        assert_eq!(game.status(), Status::GameOver);
    }

    #[test]
    fn breach_ends_run_with_lives_left() {
        let mut game = running(7);
        game.enemies = vec![Enemy {
            body: Body::new(100.0, ARENA_H - 60.0, 36.0, 36.0),
            hp: 1,
            max_hp: 1,
            boss: false,
        }];
        game.tick(1.0 / 60.0);
        assert_eq!(game.status(), Status::GameOver);
        assert!(game.lives > 0);
    }

    #[test]
    fn clearing_wave_advances_and_resets_drop_cap() {
        let mut game = running(7);
        game.powerup_dropped = true;
        game.enemies.clear();
        game.tick(1.0 / 60.0);
        assert_eq!(game.wave, 2);
        assert!(!game.powerup_dropped);
        assert!(!game.enemies.is_empty());
    }
}
