//! Standup Speedrun: beat the clock with status updates
//!
//! Each round presents a status line to reproduce before the timer runs
//! out. Desktop play types it; touch play taps the scrambled words back
//! into order. Completions pay a time and streak bonus; a timeout resets
//! the streak and burns one of three lives. The per-round timer tightens
//! as completions accumulate.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{Cadence, Game, GameKind, HudSnapshot, Status};

/// Housekeeping tick period
pub const TICK_MS: u64 = 100;

const START_LIVES: u8 = 3;
/// Completions per one-second timer reduction
const COMPLETIONS_PER_STEP: u32 = 3;
/// Keep a few prompts in reserve before recycling the pool
const POOL_RESERVE: usize = 5;

const STATUS_PROMPTS: &[&str] = &[
    // Yesterday
    "Shipped the login fix",
    "Reviewed the PRD",
    "Fixed the payment bug",
    "Pushed to staging",
    "Merged the feature branch",
    "Updated the docs",
    "Closed 5 tickets",
    "Deployed to prod",
    "Finished code review",
    "Synced with design",
    "Wrote unit tests",
    "Refactored the API",
    "Fixed the flaky test",
    "Updated dependencies",
    "Cleared the backlog",
    // Today
    "Starting sprint planning",
    "Working on the dashboard",
    "Writing the spec",
    "Pairing with Sarah",
    "Investigating the bug",
    "Setting up CI/CD",
    "Building the prototype",
    "Reviewing pull requests",
    "Updating the roadmap",
    "Finishing the migration",
    // Blockers
    "Blocked by legal review",
    "Waiting on API docs",
    "Need design approval",
    "Blocked by DevOps",
    "Waiting for QA signoff",
    "Need stakeholder input",
    "Blocked by infra team",
    "Waiting on vendor",
    // The rest of us
    "Surviving meetings",
    "Drinking more coffee",
    "Fighting scope creep",
    "Herding cats as usual",
    "Same as yesterday lol",
    "Putting out fires",
    "Moving tickets around",
    "Updating Jira forever",
];

/// How updates are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// Type the prompt; checked as a case-insensitive prefix
    Typing,
    /// Tap shuffled words back into prompt order
    Scramble,
}

impl EntryMode {
    /// Per-round timer: base shrinks one second per few completions
    fn round_seconds(self, completed: u32) -> f32 {
        let (base, floor) = match self {
            EntryMode::Typing => (15, 5),
            EntryMode::Scramble => (8, 3),
        };
        (base - (completed / COMPLETIONS_PER_STEP) as i32).max(floor) as f32
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TypeChar(char),
    Backspace,
    /// Tap the word at this position in the shuffled layout
    TapWord(usize),
}

#[derive(Debug)]
pub struct Standup {
    status: Status,
    rng: Pcg32,
    pub mode: EntryMode,
    pub score: u64,
    pub streak: u32,
    pub completed: u32,
    pub lives: u8,
    pub time_left: f32,
    prompt_idx: usize,
    used: Vec<usize>,
    pub typed: String,
    /// Scramble layout: word indices into the prompt, shuffled
    pub word_order: Vec<usize>,
    tapped: Vec<bool>,
    built: usize,
}

impl Standup {
    pub fn new(seed: u64, mode: EntryMode) -> Self {
        Self {
            status: Status::Idle,
            rng: Pcg32::seed_from_u64(seed),
            mode,
            score: 0,
            streak: 0,
            completed: 0,
            lives: START_LIVES,
            time_left: 0.0,
            prompt_idx: 0,
            used: Vec::new(),
            typed: String::new(),
            word_order: Vec::new(),
            tapped: Vec::new(),
            built: 0,
        }
    }

    pub fn prompt(&self) -> &'static str {
        STATUS_PROMPTS[self.prompt_idx]
    }

    fn prompt_words(&self) -> Vec<&'static str> {
        self.prompt().split(' ').collect()
    }

    /// Word at a shuffled layout position (for rendering the tap buttons)
    pub fn shuffled_word(&self, position: usize) -> Option<&'static str> {
        let word = *self.word_order.get(position)?;
        self.prompt_words().get(word).copied()
    }

    pub fn word_tapped(&self, position: usize) -> bool {
        self.tapped.get(position).copied().unwrap_or(false)
    }

    /// Whether the typed text is still on track for the prompt
    pub fn entry_on_track(&self) -> bool {
        self.prompt()
            .to_lowercase()
            .starts_with(&self.typed.to_lowercase())
    }

    fn next_prompt(&mut self) {
        if self.used.len() >= STATUS_PROMPTS.len() - POOL_RESERVE {
            self.used.clear();
        }
        let idx = loop {
            let idx = self.rng.random_range(0..STATUS_PROMPTS.len());
            if !self.used.contains(&idx) {
                break idx;
            }
        };
        self.used.push(idx);
        self.prompt_idx = idx;
        self.typed.clear();
        self.built = 0;

        let word_count = self.prompt_words().len();
        self.word_order = (0..word_count).collect();
        self.word_order.shuffle(&mut self.rng);
        self.tapped = vec![false; word_count];

        self.time_left = self.mode.round_seconds(self.completed);
    }

    fn complete_round(&mut self) {
        let time_bonus = (self.time_left * 10.0).floor().max(0.0) as u64;
        let streak_bonus = self.streak as u64 * 5;
        self.score += 100 + time_bonus + streak_bonus;
        self.streak += 1;
        self.completed += 1;
        self.next_prompt();
    }

    fn type_char(&mut self, c: char) {
        if self.mode != EntryMode::Typing {
            return;
        }
        self.typed.push(c);
        if self.typed.eq_ignore_ascii_case(self.prompt()) {
            self.complete_round();
        }
    }

    fn tap_word(&mut self, position: usize) {
        if self.mode != EntryMode::Scramble {
            return;
        }
        let Some(word) = self.shuffled_word(position) else {
            return;
        };
        if self.word_tapped(position) {
            return;
        }
        let words = self.prompt_words();
        let expected = words[self.built];
        // Compare by value so duplicate words are interchangeable
        if word != expected {
            return;
        }
        self.tapped[position] = true;
        self.built += 1;
        if self.built == words.len() {
            self.complete_round();
        }
    }

    fn timeout(&mut self) {
        self.streak = 0;
        self.lives -= 1;
        if self.lives == 0 {
            self.status = Status::GameOver;
            return;
        }
        self.next_prompt();
    }
}

impl Game for Standup {
    type Command = Command;

    fn kind(&self) -> GameKind {
        GameKind::Standup
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self, seed: u64) {
        if self.status == Status::Running {
            return;
        }
        *self = Standup::new(seed, self.mode);
        self.status = Status::Running;
        self.next_prompt();
    }

    fn command(&mut self, cmd: Command) {
        if self.status != Status::Running {
            return;
        }
        match cmd {
            Command::TypeChar(c) => self.type_char(c),
            Command::Backspace => {
                if self.mode == EntryMode::Typing {
                    self.typed.pop();
                }
            }
            Command::TapWord(position) => self.tap_word(position),
        }
    }

    fn cadence(&self) -> Cadence {
        Cadence::Fixed(TICK_MS)
    }

    fn tick(&mut self, dt: f32) {
        if self.status != Status::Running {
            return;
        }
        self.time_left -= dt;
        if self.time_left <= 0.0 {
            self.timeout();
        }
    }

    fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            level: self.completed,
            lives: Some(self.lives),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = TICK_MS as f32 / 1000.0;

    fn running(mode: EntryMode) -> Standup {
        let mut game = Standup::new(21, mode);
        game.start(21);
        game
    }

    fn type_prompt(game: &mut Standup) {
        for c in game.prompt().to_string().chars() {
            game.command(Command::TypeChar(c));
        }
    }

    #[test]
    fn typing_the_prompt_completes_the_round() {
        let mut game = running(EntryMode::Typing);
        let first = game.prompt();
        type_prompt(&mut game);
        assert_eq!(game.completed, 1);
        assert_eq!(game.streak, 1);
        assert!(game.score >= 100);
        assert!(game.typed.is_empty());
        assert_ne!(game.prompt(), first);
    }

    #[test]
    fn typing_is_case_insensitive() {
        let mut game = running(EntryMode::Typing);
        for c in game.prompt().to_string().to_uppercase().chars() {
            game.command(Command::TypeChar(c));
        }
        assert_eq!(game.completed, 1);
    }

    #[test]
    fn wrong_text_goes_off_track_and_backspace_recovers() {
        let mut game = running(EntryMode::Typing);
        game.command(Command::TypeChar('\u{7}'));
        assert!(!game.entry_on_track());
        game.command(Command::Backspace);
        assert!(game.entry_on_track());
    }

    #[test]
    fn faster_completion_pays_more() {
        let mut game = running(EntryMode::Typing);
        type_prompt(&mut game);
        let fast = game.score;

        // Burn most of the round before finishing the next one
        let mut slow_game = running(EntryMode::Typing);
        for _ in 0..140 {
            slow_game.tick(DT);
        }
        type_prompt(&mut slow_game);
        assert!(slow_game.score < fast);
    }

    #[test]
    fn timeout_burns_a_life_and_resets_streak() {
        let mut game = running(EntryMode::Typing);
        type_prompt(&mut game);
        assert_eq!(game.streak, 1);

        for _ in 0..200 {
            game.tick(DT);
        }
        assert_eq!(game.lives, START_LIVES - 1);
        assert_eq!(game.streak, 0);
        assert_eq!(game.status(), Status::Running);
    }

    #[test]
    fn third_timeout_ends_the_run() {
        let mut game = running(EntryMode::Typing);
        for _ in 0..3 {
            let deadline = (game.time_left / DT).ceil() as u32 + 2;
            for _ in 0..deadline {
                game.tick(DT);
            }
        }
        assert_eq!(game.lives, 0);
        assert_eq!(game.status(), Status::GameOver);

        // Frozen afterwards
        let score = game.score;
        game.command(Command::TypeChar('x'));
        game.tick(DT);
        assert_eq!(game.score, score);
        assert!(game.typed.is_empty());
    }

    #[test]
    fn round_timer_tightens_with_completions() {
        assert_eq!(EntryMode::Typing.round_seconds(0), 15.0);
        assert!(EntryMode::Typing.round_seconds(9) < 15.0);
        assert_eq!(EntryMode::Typing.round_seconds(1000), 5.0);
        assert_eq!(EntryMode::Scramble.round_seconds(1000), 3.0);
    }

    #[test]
    fn scramble_requires_prompt_order() {
        let mut game = running(EntryMode::Scramble);
        let words = game.prompt_words();
        // Find the layout position of the first prompt word and tap it
        let first_pos = (0..game.word_order.len())
            .find(|&p| game.shuffled_word(p) == Some(words[0]))
            .unwrap();

        // Tapping a wrong word first does nothing
        if let Some(wrong) = (0..game.word_order.len())
            .find(|&p| game.shuffled_word(p) != Some(words[0]))
        {
            game.command(Command::TapWord(wrong));
            assert_eq!(game.built, 0);
        }

        game.command(Command::TapWord(first_pos));
        assert_eq!(game.built, 1);
        assert!(game.word_tapped(first_pos));
    }

    #[test]
    fn scramble_full_order_completes() {
        let mut game = running(EntryMode::Scramble);
        let words = game.prompt_words();
        for word in words {
            let pos = (0..game.word_order.len())
                .find(|&p| !game.word_tapped(p) && game.shuffled_word(p) == Some(word))
                .unwrap();
            game.command(Command::TapWord(pos));
        }
        assert_eq!(game.completed, 1);
        assert_eq!(game.built, 0); // fresh round
    }

    #[test]
    fn typed_input_ignored_in_scramble_mode() {
        let mut game = running(EntryMode::Scramble);
        game.command(Command::TypeChar('a'));
        assert!(game.typed.is_empty());
    }

    #[test]
    fn prompts_do_not_repeat_until_pool_recycles() {
        let mut game = running(EntryMode::Typing);
        let mut seen = vec![game.prompt_idx];
        for _ in 0..(STATUS_PROMPTS.len() - POOL_RESERVE - 1) {
            game.next_prompt();
            assert!(!seen.contains(&game.prompt_idx));
            seen.push(game.prompt_idx);
        }
    }
}
