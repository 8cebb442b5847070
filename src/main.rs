//! Sprint Arcade entry point
//!
//! Headless demo driver: picks one of the six games, runs it in real time
//! with a small autopilot feeding normalized commands, logs HUD updates and
//! prints the closing line. Doubles as a smoke test for the whole engine
//! without any rendering stack.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use std::{env, process, thread};

use sprint_arcade::highscores::HighScores;
use sprint_arcade::narrator;
use sprint_arcade::settings::Settings;
use sprint_arcade::sim::games::{
    backlog, bug_squash, runner, scope_creep, snake, standup, Backlog, BugSquash, GameKind,
    Runner, ScopeCreep, Snake, Standup,
};
use sprint_arcade::sim::{Dir, Game, GameOverReport, Session, Signal, Status};

const FRAME: Duration = Duration::from_millis(16); // ~60 FPS

const SETTINGS_PATH: &str = "settings.json";
const HIGHSCORES_PATH: &str = "highscores.json";

struct Args {
    kind: GameKind,
    seed: u64,
    max_secs: u64,
}

fn usage() -> ! {
    eprintln!("usage: sprint-arcade [GAME] [--seed N] [--secs N]");
    eprintln!("games:");
    for kind in GameKind::ALL {
        eprintln!("  {:<12} {}", kind.slug(), kind.title());
    }
    process::exit(2);
}

fn parse_args() -> Args {
    let mut kind = GameKind::Snake;
    let mut seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut max_secs = 30;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => match args.next().and_then(|v| v.parse().ok()) {
                Some(v) => seed = v,
                None => usage(),
            },
            "--secs" => match args.next().and_then(|v| v.parse().ok()) {
                Some(v) => max_secs = v,
                None => usage(),
            },
            "--help" | "-h" => usage(),
            slug => match GameKind::from_slug(slug) {
                Some(k) => kind = k,
                None => usage(),
            },
        }
    }

    Args {
        kind,
        seed,
        max_secs,
    }
}

/// Drive one session in real time until it ends or the clock runs out
fn run<G: Game>(
    game: G,
    seed: u64,
    max_secs: u64,
    mut pilot: impl FnMut(&G, u64) -> Vec<G::Command>,
) -> Option<GameOverReport> {
    let mut session = Session::new(game);
    session.start(seed);

    let started = Instant::now();
    let mut last = Instant::now();
    let mut frame: u64 = 0;
    let mut report = None;

    while report.is_none() && started.elapsed().as_secs() < max_secs {
        thread::sleep(FRAME);
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;
        frame += 1;

        for cmd in pilot(session.game(), frame) {
            session.command(cmd);
        }
        session.advance(dt);

        for signal in session.drain_signals() {
            match signal {
                Signal::Hud(hud) => {
                    log::debug!(
                        "score {} level {} lives {:?}",
                        hud.score,
                        hud.level,
                        hud.lives
                    );
                }
                Signal::Ended(r) => report = Some(r),
            }
        }
    }

    if report.is_none() && session.status() == Status::Running {
        let hud = session.game().hud();
        log::info!(
            "time limit reached while still alive: score {} level {}",
            hud.score,
            hud.level
        );
    }
    report
}

/// Steer at the food, refusing moves that hit a wall or the body
fn snake_pilot(game: &Snake, _frame: u64) -> Vec<snake::Command> {
    let head = game.body[0];
    let mut wishes = Vec::new();
    if game.food.x > head.x {
        wishes.push(Dir::Right);
    } else if game.food.x < head.x {
        wishes.push(Dir::Left);
    }
    if game.food.y > head.y {
        wishes.push(Dir::Down);
    } else if game.food.y < head.y {
        wishes.push(Dir::Up);
    }
    wishes.extend([Dir::Right, Dir::Down, Dir::Left, Dir::Up]);

    for dir in wishes {
        if dir == game.heading.opposite() {
            continue;
        }
        let next = head.step(dir);
        if next.in_bounds(snake::GRID_SIDE) && !game.body.contains(&next) {
            return vec![snake::Command::Turn(dir)];
        }
    }
    Vec::new()
}

/// Chase the nearest enemy column and keep the trigger held
fn scope_pilot(game: &ScopeCreep, _frame: u64) -> Vec<scope_creep::Command> {
    use scope_creep::Command;

    let player_x = game.player.center().x;
    let target = game
        .enemies
        .iter()
        .map(|e| e.body.center().x)
        .min_by(|a, b| {
            (a - player_x)
                .abs()
                .partial_cmp(&(b - player_x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let mut cmds = vec![Command::Fire];
    match target {
        Some(x) if x < player_x - 8.0 => {
            cmds.push(Command::SteerLeft(true));
            cmds.push(Command::SteerRight(false));
        }
        Some(x) if x > player_x + 8.0 => {
            cmds.push(Command::SteerRight(true));
            cmds.push(Command::SteerLeft(false));
        }
        _ => {
            cmds.push(Command::SteerLeft(false));
            cmds.push(Command::SteerRight(false));
        }
    }
    cmds
}

/// Nudge pieces around and drop on a cycle; not clever, just alive
fn backlog_pilot(_game: &Backlog, frame: u64) -> Vec<backlog::Command> {
    use backlog::Command;
    let mut cmds = Vec::new();
    match frame % 45 {
        7 => cmds.push(Command::Rotate),
        14 | 21 => cmds.push(if frame.is_multiple_of(2) {
            Command::Left
        } else {
            Command::Right
        }),
        28 => cmds.push(Command::SoftDrop),
        44 => cmds.push(Command::HardDrop),
        _ => {}
    }
    cmds
}

/// Jump or slide at whatever is closest ahead
fn runner_pilot(game: &Runner, _frame: u64) -> Vec<runner::Command> {
    let ahead = game
        .obstacles
        .iter()
        .filter(|o| o.body.pos.x > game.player.pos.x && o.body.pos.x < game.player.pos.x + 90.0)
        .min_by(|a, b| {
            a.body
                .pos
                .x
                .partial_cmp(&b.body.pos.x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    match ahead {
        Some(o) if o.kind == runner::ObstacleKind::Slide => vec![runner::Command::Slide],
        Some(_) => vec![runner::Command::Jump],
        None => Vec::new(),
    }
}

/// Tap the first bug on the board every few frames
fn bug_pilot(game: &BugSquash, frame: u64) -> Vec<bug_squash::Command> {
    if !frame.is_multiple_of(4) {
        return Vec::new();
    }
    game.cells
        .iter()
        .position(|c| matches!(c, bug_squash::Occupant::Bug { .. }))
        .map(|cell| vec![bug_squash::Command::Tap(cell)])
        .unwrap_or_default()
}

/// Type the next correct character of the prompt
fn standup_pilot(game: &Standup, frame: u64) -> Vec<standup::Command> {
    if !frame.is_multiple_of(3) {
        return Vec::new();
    }
    game.prompt()
        .chars()
        .nth(game.typed.chars().count())
        .map(|c| vec![standup::Command::TypeChar(c)])
        .unwrap_or_default()
}

fn main() {
    env_logger::init();

    let args = parse_args();
    let settings = Settings::load_or_default(Path::new(SETTINGS_PATH));
    log::info!(
        "starting {} (seed {}, swipe threshold {}px)",
        args.kind.title(),
        args.seed,
        settings.swipe_threshold_px
    );

    let report = match args.kind {
        GameKind::ScopeCreep => run(
            ScopeCreep::new(args.seed),
            args.seed,
            args.max_secs,
            scope_pilot,
        ),
        GameKind::Backlog => run(
            Backlog::new(args.seed),
            args.seed,
            args.max_secs,
            backlog_pilot,
        ),
        GameKind::BugSquash => run(
            BugSquash::new(args.seed),
            args.seed,
            args.max_secs,
            bug_pilot,
        ),
        GameKind::Runner => run(
            Runner::new(args.seed),
            args.seed,
            args.max_secs,
            runner_pilot,
        ),
        GameKind::Snake => run(Snake::new(args.seed), args.seed, args.max_secs, snake_pilot),
        GameKind::Standup => run(
            Standup::new(args.seed, standup::EntryMode::Typing),
            args.seed,
            args.max_secs,
            standup_pilot,
        ),
    };

    let Some(report) = report else {
        println!("{}: still going when the demo clock ran out", args.kind.title());
        return;
    };

    println!(
        "{}: score {} / level {}",
        args.kind.title(),
        report.final_score,
        report.final_level
    );
    println!("\"{}\"", narrator::closing_line(args.kind, report));

    let path = Path::new(HIGHSCORES_PATH);
    match HighScores::load(path) {
        Ok(mut scores) => {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            if let Some(rank) = scores.record(
                args.kind,
                report.final_score,
                report.final_level,
                timestamp,
            ) {
                println!("high score! rank #{rank}");
            }
            if let Err(e) = scores.save(path) {
                log::warn!("could not save high scores: {e}");
            }
        }
        Err(e) => log::warn!("could not load high scores: {e}"),
    }
}
