//! Interactive terminal session.
//!
//! Input is line based: the learner types a key and presses Enter. The loop
//! waits on three things at once: the next stdin line, the current card's
//! deadline, and the practice flush interval.

use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::error::Result;
use crate::game::FlashcardGame;
use crate::practice::PracticeTracker;
use crate::render;
use crate::score::Score;
use crate::settings::GameSettings;
use crate::storage::Storage;
use crate::timer::TimerEvent;

const PROGRESS_WIDTH: usize = 20;

const HELP: &str =
    "[Enter] reveal  [y] correct  [n] missed  [r] review  [s] skip  [p] pause  [q] quit";

/// A command typed by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Show the answer.
    Reveal,
    /// Grade the card as correct.
    Correct,
    /// Grade the card as missed.
    Incorrect,
    /// Move on after the time ran out.
    Continue,
    /// Enter or leave review mode.
    Review,
    /// Pause or resume.
    Pause,
    /// Draw a new card without grading.
    Skip,
    /// End the session.
    Quit,
    /// Anything else.
    Unknown,
}

impl Key {
    /// Parse one line of input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" => Self::Reveal,
            "y" | "yes" => Self::Correct,
            "n" | "no" => Self::Incorrect,
            "c" => Self::Continue,
            "r" => Self::Review,
            "p" => Self::Pause,
            "s" => Self::Skip,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

/// What the loop should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed; redraw.
    Redraw,
    /// Nothing changed; show a hint.
    Ignored(&'static str),
    /// Leave the session.
    Quit,
}

/// Apply `key` to `game`.
///
/// While paused only pause and quit are accepted. After a timeout the card
/// can only be continued past.
pub fn handle_key<R: Rng>(game: &mut FlashcardGame<R>, key: Key, now: Instant) -> Outcome {
    game.clear_review_finished();
    match key {
        Key::Quit => return Outcome::Quit,
        Key::Pause => {
            if game.is_paused() {
                game.resume(now);
            } else {
                game.pause(now);
            }
        }
        _ if game.is_paused() => return Outcome::Ignored("Paused. Press p to resume."),
        Key::Continue if game.is_time_expired() => game.timeout_continue(now),
        _ if game.is_time_expired() => return Outcome::Ignored("Time's up. Press c to continue."),
        Key::Continue => return Outcome::Ignored("Nothing to continue."),
        Key::Reveal if game.is_revealed() => return Outcome::Ignored("Already revealed."),
        Key::Reveal => game.reveal(now),
        Key::Correct => game.mark_correct(now),
        Key::Incorrect => game.mark_incorrect(now),
        Key::Review => {
            if !game.toggle_review(now) {
                return Outcome::Ignored("No missed notes to review.");
            }
        }
        Key::Skip => game.next_card(now),
        Key::Unknown => return Outcome::Ignored(HELP),
    }
    Outcome::Redraw
}

/// Text for the current state of `game`.
#[must_use]
pub fn frame<R: Rng>(game: &FlashcardGame<R>, now: Instant) -> String {
    let view = game.card_view();
    let mut lines = Vec::new();

    let mode = if game.is_review_mode() {
        format!("  Review ({} left)", game.review_queue_len())
    } else {
        String::new()
    };
    lines.push(format!("{} clef{mode}", view.clef));
    lines.push(String::new());
    lines.extend(render::staff(&view));
    lines.push(String::new());

    if game.is_revealed() {
        lines.push(format!("Answer: {} ({})", view.answer, view.display_name));
    }
    if game.is_time_expired() {
        lines.push("Time's up! Press c to continue.".to_string());
    } else if game.settings().time_limit_enabled && !game.is_revealed() {
        let left = game.timer_time_left(now).as_secs_f64();
        lines.push(format!(
            "{} {left:.0}s",
            render::progress_bar(game.timer_progress(now), PROGRESS_WIDTH)
        ));
    }
    if game.is_review_finished() {
        lines.push("Review complete!".to_string());
    }
    if game.is_paused() {
        lines.push("Paused.".to_string());
    }

    let mut status = render::score_line(game.score());
    if !game.is_review_mode() && game.can_review() {
        status.push_str(&format!("  ({} to review)", game.pending_review_len()));
    }
    lines.push(status);
    lines.push(HELP.to_string());
    lines.join("\n")
}

/// Run a session until the learner quits or stdin closes.
///
/// Practice time is written to `storage` every `flush_interval` while the game
/// is active, and once more on exit.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or practice time cannot be saved.
pub async fn run(storage: &Storage, settings: GameSettings, flush_interval: Duration) -> Result<Score> {
    let mut game = FlashcardGame::new(settings);
    let mut tracker = PracticeTracker::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut flush = tokio::time::interval(flush_interval);
    flush.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately
    flush.tick().await;

    game.start(Instant::now());
    sync_practice(&mut tracker, &game, storage)?;
    println!("{}", frame(&game, Instant::now()));

    loop {
        let deadline = game.timer_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match handle_key(&mut game, Key::parse(&line), Instant::now()) {
                    Outcome::Quit => break,
                    Outcome::Ignored(hint) => println!("{hint}"),
                    Outcome::Redraw => println!("\n{}", frame(&game, Instant::now())),
                }
                sync_practice(&mut tracker, &game, storage)?;
            }
            () = wait_until(deadline) => {
                if game.tick(Instant::now()) == TimerEvent::Expired {
                    println!("\n{}", frame(&game, Instant::now()));
                }
            }
            _ = flush.tick() => {
                if let Some(entry) = tracker.tick(Instant::now(), today()) {
                    storage.add_practice(entry)?;
                }
            }
        }
    }

    if let Some(entry) = tracker.set_active(false, Instant::now(), today()) {
        storage.add_practice(entry)?;
    }
    info!(score = %game.score(), "Session ended");
    Ok(game.score())
}

/// Start or stop the practice clock to match the game.
fn sync_practice<R: Rng>(
    tracker: &mut PracticeTracker,
    game: &FlashcardGame<R>,
    storage: &Storage,
) -> Result<()> {
    if tracker.is_active() == game.is_active() {
        return Ok(());
    }
    if let Some(entry) = tracker.set_active(game.is_active(), Instant::now(), today()) {
        storage.add_practice(entry)?;
    }
    Ok(())
}

/// Local calendar day practice time is credited to.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
