//! Session: owns one game instance plus its tick source
//!
//! The session is the single place that enforces the loop contract: no ticks
//! outside `Running`, exactly-once cancellation of the tick source on the
//! `Running -> GameOver` edge, HUD pushes after state-changing ticks, and a
//! single terminal event per run. Hosts pump `advance` from their frame or
//! timer loop and drain the signal outbox; a stale pump against a finished
//! session is a silent no-op.

use std::collections::VecDeque;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

use super::clock::{FrameClock, IntervalClock};
use super::{Cadence, Game, GameOverReport, HudSnapshot, Status};

/// One-way notifications from the engine to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Score/level/lives changed
    Hud(HudSnapshot),
    /// The run ended; feed this to the narrator / high score board
    Ended(GameOverReport),
}

enum Driver {
    Frames(FrameClock),
    Steps(IntervalClock),
}

impl Driver {
    fn for_cadence(cadence: Cadence) -> Self {
        match cadence {
            Cadence::EveryFrame => Driver::Frames(FrameClock::new(SIM_DT, MAX_SUBSTEPS)),
            Cadence::Fixed(period_ms) => Driver::Steps(IntervalClock::new(period_ms)),
        }
    }

    fn cancel(&mut self) {
        match self {
            Driver::Frames(clock) => clock.cancel(),
            Driver::Steps(clock) => clock.cancel(),
        }
    }
}

/// Owns a game instance and drives it per its cadence
pub struct Session<G: Game> {
    game: G,
    driver: Driver,
    signals: VecDeque<Signal>,
    ended_emitted: bool,
}

impl<G: Game> Session<G> {
    pub fn new(game: G) -> Self {
        let driver = Driver::for_cadence(game.cadence());
        Self {
            game,
            driver,
            signals: VecDeque::new(),
            ended_emitted: false,
        }
    }

    /// Read-only view for the display sink
    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn status(&self) -> Status {
        self.game.status()
    }

    /// Start (or restart) a run. Accepted from `Idle` and `GameOver` only;
    /// while `Running` this is ignored, matching the navigation contract.
    pub fn start(&mut self, seed: u64) {
        if self.game.status() == Status::Running {
            log::debug!("start ignored: session already running");
            return;
        }
        self.game.start(seed);
        self.driver = Driver::for_cadence(self.game.cadence());
        self.ended_emitted = false;
        self.signals.push_back(Signal::Hud(self.game.hud()));
        log::info!("session started (seed {seed})");
    }

    /// Forward one normalized command. Dropped unless the game is running.
    ///
    /// Commands can themselves end a run (a hard drop that blocks the next
    /// spawn), so the terminal edge is handled here as well as in `step`.
    pub fn command(&mut self, cmd: G::Command) {
        if self.game.status() != Status::Running {
            return;
        }
        let before = self.game.hud();
        self.game.command(cmd);
        let after = self.game.hud();
        if after != before {
            self.signals.push_back(Signal::Hud(after));
        }
        if self.game.status() == Status::GameOver {
            self.finish(after);
        }
    }

    /// Pump the session with a wall-clock delta in seconds.
    pub fn advance(&mut self, dt: f32) {
        // Status check before touching any state: a timer firing after
        // game over must be a silent no-op.
        if self.game.status() != Status::Running {
            return;
        }

        let (due, step_dt) = match &mut self.driver {
            Driver::Frames(clock) => (clock.advance(dt), clock.sim_dt()),
            Driver::Steps(clock) => {
                // Difficulty may have changed the period since last pump
                if let Cadence::Fixed(period_ms) = self.game.cadence() {
                    clock.set_period(period_ms);
                }
                let due = clock.advance(dt * 1000.0);
                (due, clock.period_ms() as f32 / 1000.0)
            }
        };

        for _ in 0..due {
            if self.game.status() != Status::Running {
                break;
            }
            self.step(step_dt);

            // A tick may have raised the difficulty: replace the interval
            // immediately and stop consuming ticks that were due at the old
            // period.
            if let (Driver::Steps(clock), Cadence::Fixed(period_ms)) =
                (&mut self.driver, self.game.cadence())
            {
                if period_ms != clock.period_ms() {
                    clock.set_period(period_ms);
                    break;
                }
            }
        }
    }

    fn step(&mut self, dt: f32) {
        let before = self.game.hud();
        self.game.tick(dt);
        let after = self.game.hud();
        if after != before {
            self.signals.push_back(Signal::Hud(after));
        }
        if self.game.status() == Status::GameOver {
            self.finish(after);
        }
    }

    /// Cancel the tick source and emit the terminal event exactly once.
    /// Safe to reach twice (host close racing natural game over).
    fn finish(&mut self, hud: HudSnapshot) {
        self.driver.cancel();
        if !self.ended_emitted {
            self.ended_emitted = true;
            self.signals.push_back(Signal::Ended(GameOverReport {
                final_score: hud.score,
                final_level: hud.level,
            }));
            log::info!(
                "session over: score {} level {}",
                hud.score,
                hud.level
            );
        }
    }

    /// Drain pending HUD/terminal signals, oldest first
    pub fn drain_signals(&mut self) -> std::collections::vec_deque::IntoIter<Signal> {
        std::mem::take(&mut self.signals).into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameKind;

    /// Minimal fixed-cadence game: scores one point per tick, ends itself
    /// after `lifetime` ticks.
    struct Countdown {
        status: Status,
        score: u64,
        lifetime: u64,
        period_ms: u64,
    }

    impl Countdown {
        fn new(lifetime: u64, period_ms: u64) -> Self {
            Self {
                status: Status::Idle,
                score: 0,
                lifetime,
                period_ms,
            }
        }
    }

    impl Game for Countdown {
        type Command = ();

        fn kind(&self) -> GameKind {
            GameKind::Snake
        }

        fn status(&self) -> Status {
            self.status
        }

        fn start(&mut self, _seed: u64) {
            if self.status == Status::Running {
                return;
            }
            self.status = Status::Running;
            self.score = 0;
        }

        fn command(&mut self, _cmd: ()) {}

        fn cadence(&self) -> Cadence {
            Cadence::Fixed(self.period_ms)
        }

        fn tick(&mut self, _dt: f32) {
            if self.status != Status::Running {
                return;
            }
            self.score += 1;
            if self.score >= self.lifetime {
                self.status = Status::GameOver;
            }
        }

        fn hud(&self) -> HudSnapshot {
            HudSnapshot {
                score: self.score,
                level: 1,
                lives: None,
            }
        }
    }

    #[test]
    fn no_ticks_before_start() {
        let mut session = Session::new(Countdown::new(10, 100));
        session.advance(1.0);
        assert_eq!(session.game().score, 0);
        assert_eq!(session.drain_signals().count(), 0);
    }

    #[test]
    fn fixed_cadence_ticks_at_period() {
        let mut session = Session::new(Countdown::new(100, 100));
        session.start(1);
        session.advance(0.35);
        assert_eq!(session.game().score, 3);
    }

    #[test]
    fn terminal_event_emitted_once() {
        let mut session = Session::new(Countdown::new(3, 100));
        session.start(1);
        session.advance(0.5); // five ticks due, run dies on the third
        let ended: Vec<_> = session
            .drain_signals()
            .filter(|s| matches!(s, Signal::Ended(_)))
            .collect();
        assert_eq!(ended.len(), 1);
        assert_eq!(
            ended[0],
            Signal::Ended(GameOverReport {
                final_score: 3,
                final_level: 1
            })
        );
    }

    #[test]
    fn no_state_mutation_after_game_over() {
        let mut session = Session::new(Countdown::new(3, 100));
        session.start(1);
        session.advance(1.0);
        assert_eq!(session.status(), Status::GameOver);
        let score = session.game().score;
        session.drain_signals().count();

        // Stale pumps must change nothing and emit nothing
        session.advance(5.0);
        session.advance(5.0);
        assert_eq!(session.game().score, score);
        assert_eq!(session.drain_signals().count(), 0);
    }

    #[test]
    fn restart_resets_counters_before_any_tick() {
        let mut session = Session::new(Countdown::new(100, 100));
        session.start(1);
        session.advance(0.5);
        assert!(session.game().score > 0);

        // "Play again" is ignored while running...
        session.start(2);
        assert!(session.game().score > 0);

        // ...but accepted from game over, and yields a fresh instance
        while session.status() == Status::Running {
            session.advance(1.0);
        }
        session.start(3);
        assert_eq!(session.status(), Status::Running);
        assert_eq!(session.game().score, 0);
    }

    #[test]
    fn hud_pushed_only_on_change() {
        let mut session = Session::new(Countdown::new(100, 100));
        session.start(1);
        session.drain_signals().count(); // initial hud
        session.advance(0.25); // two ticks
        let huds = session
            .drain_signals()
            .filter(|s| matches!(s, Signal::Hud(_)))
            .count();
        assert_eq!(huds, 2);

        // No tick due, no hud
        session.advance(0.01);
        assert_eq!(session.drain_signals().count(), 0);
    }
}
