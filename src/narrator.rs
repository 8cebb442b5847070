//! End-of-run flavor text
//!
//! A pure function of the terminal event: final score and final level pick
//! one line from a per-game threshold table, ranked best to worst. The
//! engine stays decoupled from the copy; hosts call this when they receive
//! the terminal signal.

use crate::sim::games::GameKind;
use crate::sim::GameOverReport;

struct Threshold {
    /// Reached at this level...
    min_level: u32,
    /// ...or at this score
    min_score: u64,
    line: &'static str,
}

/// A level-only threshold row
const fn at_level(min_level: u32, line: &'static str) -> Threshold {
    Threshold {
        min_level,
        min_score: u64::MAX,
        line,
    }
}

const SCOPE_CREEP_LINES: &[Threshold] = &[
    Threshold {
        min_level: 10,
        min_score: 2000,
        line: "Senior PM energy. The scope fears you.",
    },
    Threshold {
        min_level: 5,
        min_score: 800,
        line: "You held the line... briefly.",
    },
    Threshold {
        min_level: 3,
        min_score: 300,
        line: "The scope crept. It always does.",
    },
];

const BACKLOG_LINES: &[Threshold] = &[
    Threshold {
        min_level: 5,
        min_score: 4000,
        line: "Principal PM energy. The backlog trembles.",
    },
    Threshold {
        min_level: 3,
        min_score: 1500,
        line: "Senior shipping skills. Impressive velocity.",
    },
    Threshold {
        min_level: 2,
        min_score: 600,
        line: "You cleared a few sprints. Not bad.",
    },
    Threshold {
        min_level: u32::MAX,
        min_score: 200,
        line: "The backlog won. It always does.",
    },
];

const BUG_SQUASH_LINES: &[Threshold] = &[
    Threshold {
        min_level: 11,
        min_score: 50,
        line: "Senior debugger energy. The codebase fears you.",
    },
    Threshold {
        min_level: 7,
        min_score: 30,
        line: "Solid QA skills. Ship it!",
    },
    Threshold {
        min_level: 4,
        min_score: 15,
        line: "You squashed a few. Could be worse.",
    },
    Threshold {
        min_level: 2,
        min_score: 5,
        line: "Too many bugs escaped. QA is not happy.",
    },
];

const RUNNER_LINES: &[Threshold] = &[
    at_level(11, "Principal PM energy. Nothing stops you."),
    at_level(6, "Solid roadmap execution. Ship it!"),
    at_level(3, "You stayed on track for a while."),
    at_level(2, "The roadmap had other plans."),
];

const SNAKE_LINES: &[Threshold] = &[
    Threshold {
        min_level: 6,
        min_score: 270,
        line: "Principal PM energy. Scope management master.",
    },
    Threshold {
        min_level: 4,
        min_score: 170,
        line: "Senior backlog wrangler. Impressive.",
    },
    Threshold {
        min_level: 3,
        min_score: 120,
        line: "You managed the chaos for a while.",
    },
    Threshold {
        min_level: 2,
        min_score: 70,
        line: "The backlog consumed itself.",
    },
];

const STANDUP_LINES: &[Threshold] = &[
    at_level(20, "Principal communicator. Meetings bow to you."),
    at_level(15, "Senior standup energy. Fast fingers."),
    at_level(10, "Solid update velocity."),
    at_level(5, "Meeting adjourned. Not bad."),
];

/// Fallback line per game when no threshold is reached
fn floor_line(kind: GameKind) -> &'static str {
    match kind {
        GameKind::ScopeCreep => "The backlog won this round.",
        GameKind::Backlog => "Sprint planning needed.",
        GameKind::BugSquash => "Did you even try? The bugs won.",
        GameKind::Runner => "Blockers won this sprint.",
        GameKind::Snake => "Scope collapse. It happens.",
        GameKind::Standup => "Need more coffee next time.",
    }
}

fn table(kind: GameKind) -> &'static [Threshold] {
    match kind {
        GameKind::ScopeCreep => SCOPE_CREEP_LINES,
        GameKind::Backlog => BACKLOG_LINES,
        GameKind::BugSquash => BUG_SQUASH_LINES,
        GameKind::Runner => RUNNER_LINES,
        GameKind::Snake => SNAKE_LINES,
        GameKind::Standup => STANDUP_LINES,
    }
}

/// Pick the closing line for a finished run
pub fn closing_line(kind: GameKind, report: GameOverReport) -> &'static str {
    // Dying to the boss wave gets its own line
    if kind == GameKind::ScopeCreep
        && report.final_level >= 5
        && report.final_level.is_multiple_of(5)
    {
        return "Even the exec's pet feature couldn't stop you... wait, it did.";
    }

    table(kind)
        .iter()
        .find(|t| report.final_level >= t.min_level || report.final_score >= t.min_score)
        .map(|t| t.line)
        .unwrap_or_else(|| floor_line(kind))
}
