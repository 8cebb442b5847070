//! Input adapter: keyboard, pointer/tap and touch normalized into per-game
//! command vocabularies.
//!
//! Keyboard movement is held-state based: key events flip flags, and the
//! simulation resolves held flags once per tick so holding a key produces
//! smooth motion bounded by a fixed per-tick step. Taps map a surface
//! position to one discrete command; swipes map a start/end delta to one
//! directional command; press-and-hold repeats a direction on a fixed
//! interval until release.

use glam::Vec2;

use super::Dir;

/// Held-state flags for directional keys, resolved per simulation tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl HeldKeys {
    pub fn set(&mut self, dir: Dir, held: bool) {
        match dir {
            Dir::Left => self.left = held,
            Dir::Right => self.right = held,
            Dir::Up => self.up = held,
            Dir::Down => self.down = held,
        }
    }

    /// Horizontal axis as -1 / 0 / +1 (both held cancel out)
    pub fn axis_x(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }

    pub fn clear(&mut self) {
        *self = HeldKeys::default();
    }
}

/// Map a tap to the logical half of the surface it landed in
pub fn tap_side(x: f32, width: f32) -> Dir {
    if x < width / 2.0 { Dir::Left } else { Dir::Right }
}

/// Map a tap on a grid surface to a cell index (row-major), `None` if the
/// tap landed outside the surface.
pub fn tap_cell(pos: Vec2, surface: Vec2, cols: usize, rows: usize) -> Option<usize> {
    if pos.x < 0.0 || pos.y < 0.0 || pos.x >= surface.x || pos.y >= surface.y {
        return None;
    }
    let col = (pos.x / (surface.x / cols as f32)) as usize;
    let row = (pos.y / (surface.y / rows as f32)) as usize;
    Some(row.min(rows - 1) * cols + col.min(cols - 1))
}

/// Turns a touch start/end pair into at most one directional command.
///
/// The dominant axis wins; travel below the threshold yields nothing, so
/// partial or jittery touches are silently ignored.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    min_travel: f32,
    start: Option<Vec2>,
}

impl SwipeTracker {
    pub fn new(min_travel: f32) -> Self {
        Self {
            min_travel,
            start: None,
        }
    }

    pub fn begin(&mut self, pos: Vec2) {
        self.start = Some(pos);
    }

    /// Finish the gesture. Consumes the start point either way.
    pub fn end(&mut self, pos: Vec2) -> Option<Dir> {
        let start = self.start.take()?;
        let delta = pos - start;
        if delta.x.abs() >= delta.y.abs() {
            if delta.x > self.min_travel {
                Some(Dir::Right)
            } else if delta.x < -self.min_travel {
                Some(Dir::Left)
            } else {
                None
            }
        } else if delta.y > self.min_travel {
            Some(Dir::Down)
        } else if delta.y < -self.min_travel {
            Some(Dir::Up)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

/// Press-and-hold on a directional control: one command immediately, then a
/// repeat on a fixed interval until release.
#[derive(Debug, Clone)]
pub struct HoldRepeater {
    period_ms: f32,
    carry_ms: f32,
    held: Option<Dir>,
}

impl HoldRepeater {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1) as f32,
            carry_ms: 0.0,
            held: None,
        }
    }

    /// Start holding. Returns the immediate first command.
    pub fn press(&mut self, dir: Dir) -> Dir {
        self.held = Some(dir);
        self.carry_ms = 0.0;
        dir
    }

    pub fn release(&mut self) {
        self.held = None;
        self.carry_ms = 0.0;
    }

    /// Advance wall time; returns the direction and how many repeats fired.
    pub fn advance(&mut self, dt_ms: f32) -> Option<(Dir, u32)> {
        let dir = self.held?;
        self.carry_ms += dt_ms;
        let repeats = (self.carry_ms / self.period_ms) as u32;
        self.carry_ms -= repeats as f32 * self.period_ms;
        if repeats > 0 { Some((dir, repeats)) } else { None }
    }
}
