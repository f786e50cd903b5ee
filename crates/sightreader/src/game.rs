//! The flashcard game.
//!
//! [`FlashcardGame`] wires note selection, scoring, the review queue and the
//! per-card timer together. It owns no clock: operations that can start or
//! stop the timer take the current [`Instant`], and the front end calls
//! [`FlashcardGame::tick`] whenever the timer's deadline passes.
//!
//! After every transition the timer is brought in line with one rule: it runs
//! only while a time limit is set, the settings panel is closed, the game is
//! not paused, and the current card is still hidden.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::Result;
use crate::review::ReviewQueue;
use crate::score::Score;
use crate::selection::{Card, CardView, NoteSelector};
use crate::settings::{GameSettings, SettingsPatch};
use crate::timer::{CountdownTimer, TimerEvent};

/// A single learner's flashcard session.
#[derive(Debug)]
pub struct FlashcardGame<R = StdRng> {
    settings: GameSettings,
    settings_open: bool,
    selector: NoteSelector,
    score: Score,
    review: ReviewQueue,
    timer: CountdownTimer,
    paused: bool,
    time_expired: bool,
    rng: R,
}

impl FlashcardGame<StdRng> {
    /// Create a game seeded from the operating system.
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }
}

impl<R: Rng> FlashcardGame<R> {
    /// Create a game drawing cards from `rng`.
    ///
    /// The game starts with the settings panel open.
    pub fn with_rng(settings: GameSettings, mut rng: R) -> Self {
        let selector = NoteSelector::new(&settings, &mut rng);
        let timer = CountdownTimer::new(time_limit_duration(&settings));
        Self {
            settings,
            settings_open: true,
            selector,
            score: Score::default(),
            review: ReviewQueue::new(),
            timer,
            paused: false,
            time_expired: false,
            rng,
        }
    }

    // === Session ===

    /// Close the settings panel and begin a fresh round.
    pub fn start(&mut self, now: Instant) {
        self.settings_open = false;
        self.paused = false;
        self.score.reset();
        self.review.reset();
        info!(
            clef = %self.settings.clef,
            max_ledger_lines = self.settings.max_ledger_lines,
            time_limit = ?self.settings.time_limit(),
            "Game started"
        );
        self.draw_random(now);
    }

    /// Return to the settings panel.
    pub fn reset(&mut self, now: Instant) {
        self.settings_open = true;
        self.time_expired = false;
        self.timer.reset();
        self.sync_timer(now);
        debug!("Returned to settings");
    }

    /// Apply a settings change.
    ///
    /// A changed time limit restarts the current card's countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the patched settings are invalid; the game is left
    /// unchanged.
    pub fn update_settings(&mut self, patch: &SettingsPatch, now: Instant) -> Result<&GameSettings> {
        let updated = self.settings.apply(patch)?;
        let duration_changed = updated.time_limit_seconds != self.settings.time_limit_seconds;
        let enabled_changed = updated.time_limit_enabled != self.settings.time_limit_enabled;
        self.settings = updated;

        if duration_changed {
            self.timer.set_duration(time_limit_duration(&self.settings));
        } else if enabled_changed {
            self.timer.reset();
        }
        self.sync_timer(now);
        Ok(&self.settings)
    }

    /// Freeze the timer and practice clock.
    ///
    /// Returns `false` if there is nothing to pause.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.settings_open || self.paused {
            return false;
        }
        self.paused = true;
        self.sync_timer(now);
        debug!("Paused");
        true
    }

    /// Undo [`FlashcardGame::pause`].
    pub fn resume(&mut self, now: Instant) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.sync_timer(now);
        debug!("Resumed");
        true
    }

    // === Cards ===

    /// Show the answer. The countdown refills and stops.
    pub fn reveal(&mut self, now: Instant) {
        self.selector.reveal();
        self.timer.reset();
        self.sync_timer(now);
    }

    /// Self-graded correct answer.
    pub fn mark_correct(&mut self, now: Instant) {
        self.score.record_correct();

        if self.review.is_review_mode() {
            match self.review.advance().cloned() {
                Some(card) => self.show(card, now),
                None => {
                    info!(score = %self.score, "Review complete");
                    self.draw_random(now);
                }
            }
        } else {
            self.draw_random(now);
        }
    }

    /// Self-graded miss.
    ///
    /// Outside review the card is remembered for later; during review it goes
    /// to the back of the queue.
    pub fn mark_incorrect(&mut self, now: Instant) {
        self.score.record_incorrect();

        if self.review.is_review_mode() {
            if let Some(card) = self.review.requeue().cloned() {
                self.show(card, now);
                return;
            }
        } else {
            self.review.add_incorrect(self.selector.current().clone());
        }
        self.draw_random(now);
    }

    /// Move past a card whose time ran out. Counts as a miss.
    pub fn timeout_continue(&mut self, now: Instant) {
        self.mark_incorrect(now);
    }

    /// Skip the current card without grading.
    ///
    /// During review the skipped card goes to the back of the queue, so it
    /// still has to be answered before the review can finish.
    pub fn next_card(&mut self, now: Instant) {
        if self.review.is_review_mode() {
            if let Some(card) = self.review.requeue().cloned() {
                self.show(card, now);
                return;
            }
        }
        self.draw_random(now);
    }

    /// Poll the countdown.
    ///
    /// When time runs out the answer is revealed and the card is flagged as
    /// expired; the learner can only continue with
    /// [`FlashcardGame::timeout_continue`].
    pub fn tick(&mut self, now: Instant) -> TimerEvent {
        let event = self.timer.poll(now);
        if event == TimerEvent::Expired {
            self.time_expired = true;
            self.selector.reveal();
            info!(note = %self.selector.current().note, "Time expired");
        }
        event
    }

    // === Review ===

    /// Enter or leave review mode.
    ///
    /// Returns `false` when there was nothing to review.
    pub fn toggle_review(&mut self, now: Instant) -> bool {
        if self.review.is_review_mode() {
            self.review.stop();
            self.draw_random(now);
            return true;
        }

        match self.review.start(&mut self.rng).cloned() {
            Some(card) => {
                info!(cards = self.review.queue_len(), "Reviewing missed cards");
                self.show(card, now);
                true
            }
            None => false,
        }
    }

    /// Acknowledge the "review complete" state.
    pub fn clear_review_finished(&mut self) {
        self.review.clear_finished();
    }

    // === Views ===

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Whether the settings panel is showing.
    #[must_use]
    pub fn is_settings_open(&self) -> bool {
        self.settings_open
    }

    /// Whether the game is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether practice time should be accruing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.settings_open && !self.paused
    }

    /// The card being shown.
    #[must_use]
    pub fn card(&self) -> &Card {
        self.selector.current()
    }

    /// Render data for the current card.
    #[must_use]
    pub fn card_view(&self) -> CardView {
        self.selector.current().view()
    }

    /// Whether the answer is showing.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.selector.is_revealed()
    }

    /// Whether the current card timed out.
    #[must_use]
    pub fn is_time_expired(&self) -> bool {
        self.time_expired
    }

    /// Running score.
    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    /// Whether a review is in progress.
    #[must_use]
    pub fn is_review_mode(&self) -> bool {
        self.review.is_review_mode()
    }

    /// Whether the last review just finished.
    #[must_use]
    pub fn is_review_finished(&self) -> bool {
        self.review.is_finished()
    }

    /// Whether review can be toggled.
    #[must_use]
    pub fn can_review(&self) -> bool {
        self.review.can_review()
    }

    /// Cards left in the active review.
    #[must_use]
    pub fn review_queue_len(&self) -> usize {
        self.review.queue_len()
    }

    /// Missed cards waiting for review.
    #[must_use]
    pub fn pending_review_len(&self) -> usize {
        self.review.pending_len()
    }

    /// Time left on the current card.
    #[must_use]
    pub fn timer_time_left(&self, now: Instant) -> Duration {
        self.timer.time_left(now)
    }

    /// Fraction of the countdown remaining.
    #[must_use]
    pub fn timer_progress(&self, now: Instant) -> f64 {
        self.timer.progress(now)
    }

    /// Whether the countdown is running.
    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// When the countdown will expire, if running.
    #[must_use]
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    // === Internals ===

    fn draw_random(&mut self, now: Instant) {
        self.selector.next(&self.settings, &mut self.rng);
        self.after_new_card(now);
    }

    fn show(&mut self, card: Card, now: Instant) {
        self.selector.set(card);
        self.after_new_card(now);
    }

    fn after_new_card(&mut self, now: Instant) {
        self.time_expired = false;
        self.timer.reset();
        self.sync_timer(now);
        debug!(note = %self.selector.current().note, clef = %self.selector.current().clef, "Showing card");
    }

    fn sync_timer(&mut self, now: Instant) {
        let should_run = self.settings.time_limit_enabled
            && !self.settings_open
            && !self.paused
            && !self.selector.is_revealed()
            && !self.time_expired;
        if should_run {
            self.timer.start(now);
        } else {
            self.timer.pause(now);
        }
    }
}

fn time_limit_duration(settings: &GameSettings) -> Duration {
    Duration::from_secs(u64::from(settings.time_limit_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;
    use crate::note::{ClefMode, Note, NoteName};

    fn game(settings: GameSettings) -> FlashcardGame<StdRng> {
        init_test_logging();
        FlashcardGame::with_rng(settings, StdRng::seed_from_u64(1234))
    }

    fn timed() -> GameSettings {
        GameSettings {
            time_limit_enabled: true,
            ..GameSettings::default()
        }
    }

    #[test]
    fn test_initial_state() {
        let game = game(GameSettings::default());
        assert_eq!(game.settings(), &GameSettings::default());
        assert_eq!(game.score(), Score::default());
        assert!(game.is_settings_open());
        assert!(!game.is_active());
        assert!(!game.can_review());
    }

    #[test]
    fn test_start_and_grade() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        assert!(!game.is_settings_open());
        assert!(game.is_active());

        game.mark_correct(now);
        assert_eq!(game.score(), Score { correct: 1, total: 1 });

        game.mark_incorrect(now);
        assert_eq!(game.score(), Score { correct: 1, total: 2 });
    }

    #[test]
    fn test_start_resets_score_and_review() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        game.mark_incorrect(now);
        assert!(game.can_review());

        game.reset(now);
        game.start(now);
        assert_eq!(game.score(), Score::default());
        assert!(!game.can_review());
    }

    #[test]
    fn test_reset_opens_settings() {
        let now = Instant::now();
        let mut game = game(timed());
        game.start(now);
        game.reset(now);
        assert!(game.is_settings_open());
        assert!(!game.is_timer_running());
    }

    #[test]
    fn test_grading_hides_answer() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        game.reveal(now);
        assert!(game.is_revealed());
        game.mark_correct(now);
        assert!(!game.is_revealed());
    }

    #[test]
    fn test_review_round_trip() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);

        let first = game.card().clone();
        game.mark_incorrect(now);
        assert!(game.can_review());
        assert!(!game.is_review_mode());

        assert!(game.toggle_review(now));
        assert!(game.is_review_mode());
        assert_eq!(game.review_queue_len(), 1);
        assert_eq!(game.card(), &first);

        // leaving early keeps the card for later
        assert!(game.toggle_review(now));
        assert!(!game.is_review_mode());
        assert!(game.can_review());

        assert!(game.toggle_review(now));
        assert!(game.is_review_mode());

        // a miss during review requeues rather than re-adding
        game.mark_incorrect(now);
        assert!(game.is_review_mode());
        assert_eq!(game.review_queue_len(), 1);
        assert_eq!(game.card(), &first);

        game.mark_correct(now);
        assert!(!game.is_review_mode());
        assert!(game.is_review_finished());
        assert_eq!(game.review_queue_len(), 0);
        assert!(!game.can_review());

        game.clear_review_finished();
        assert!(!game.is_review_finished());
    }

    #[test]
    fn test_review_with_several_cards() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);

        let mut missed = Vec::new();
        while missed.len() < 2 {
            let card = game.card().clone();
            if !missed.iter().any(|c: &Card| c.same_card(&card)) {
                missed.push(card);
            }
            game.mark_incorrect(now);
        }
        let pending = game.pending_review_len();

        assert!(game.toggle_review(now));
        assert_eq!(pending, 2);
        assert_eq!(game.review_queue_len(), 2);
        assert!(missed.iter().any(|c| c.same_card(game.card())));

        for remaining in (0..pending).rev() {
            game.mark_correct(now);
            assert_eq!(game.review_queue_len(), remaining);
        }
        assert!(!game.is_review_mode());
    }

    #[test]
    fn test_toggle_review_without_misses() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        assert!(!game.toggle_review(now));
        assert!(!game.is_review_mode());
    }

    #[test]
    fn test_timer_runs_only_when_enabled() {
        let now = Instant::now();
        let mut untimed = game(GameSettings::default());
        untimed.start(now);
        assert!(!untimed.is_timer_running());

        let mut timed_game = game(timed());
        assert!(!timed_game.is_timer_running());
        timed_game.start(now);
        assert!(timed_game.is_timer_running());
        assert_eq!(timed_game.timer_deadline(), Some(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_reveal_resets_timer() {
        let t0 = Instant::now();
        let mut game = game(timed());
        game.start(t0);

        let t1 = t0 + Duration::from_secs(5);
        assert_eq!(game.timer_time_left(t1), Duration::from_secs(5));

        game.reveal(t1);
        assert!(!game.is_timer_running());
        assert_eq!(game.timer_time_left(t1), Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_reveals_and_continue_counts_miss() {
        let t0 = Instant::now();
        let mut game = game(timed());
        game.start(t0);
        let card = game.card().clone();

        assert_eq!(game.tick(t0 + Duration::from_secs(3)), TimerEvent::Running);
        assert_eq!(game.tick(t0 + Duration::from_secs(10)), TimerEvent::Expired);
        assert!(game.is_time_expired());
        assert!(game.is_revealed());
        assert!(!game.is_timer_running());

        let t1 = t0 + Duration::from_secs(12);
        game.timeout_continue(t1);
        assert_eq!(game.score(), Score { correct: 0, total: 1 });
        assert!(!game.is_time_expired());
        assert!(!game.is_revealed());
        assert!(game.is_timer_running());
        assert_eq!(game.pending_review_len(), 1);

        game.toggle_review(t1);
        assert_eq!(game.card(), &card);
    }

    #[test]
    fn test_timeout_continue_without_timeout() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        game.timeout_continue(now);
        assert_eq!(game.score(), Score { correct: 0, total: 1 });
    }

    #[test]
    fn test_timeout_during_review_requeues() {
        let t0 = Instant::now();
        let mut game = game(timed());
        game.start(t0);
        game.mark_incorrect(t0);
        game.toggle_review(t0);
        let card = game.card().clone();

        game.tick(t0 + Duration::from_secs(11));
        game.timeout_continue(t0 + Duration::from_secs(11));
        assert!(game.is_review_mode());
        assert_eq!(game.card(), &card);
        assert_eq!(game.review_queue_len(), 1);
    }

    #[test]
    fn test_pause_freezes_timer() {
        let t0 = Instant::now();
        let mut game = game(timed());
        game.start(t0);

        assert!(game.pause(t0 + Duration::from_secs(4)));
        assert!(!game.is_active());
        assert!(!game.pause(t0 + Duration::from_secs(5)));

        let later = t0 + Duration::from_secs(100);
        assert_eq!(game.tick(later), TimerEvent::Idle);
        assert_eq!(game.timer_time_left(later), Duration::from_secs(6));

        assert!(game.resume(later));
        assert!(game.is_active());
        assert_eq!(game.timer_deadline(), Some(later + Duration::from_secs(6)));
        assert!(!game.resume(later));
    }

    #[test]
    fn test_pause_ignored_on_settings_panel() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        assert!(!game.pause(now));
    }

    #[test]
    fn test_update_settings_applies_to_next_card() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);

        let patch = SettingsPatch {
            clef: Some(ClefMode::Bass),
            ..SettingsPatch::default()
        };
        game.update_settings(&patch, now).unwrap();
        game.next_card(now);
        assert_eq!(game.card().clef, crate::note::Clef::Bass);
    }

    #[test]
    fn test_update_settings_enables_timer() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        assert!(!game.is_timer_running());

        let patch = SettingsPatch {
            time_limit_enabled: Some(true),
            time_limit_seconds: Some(5),
            ..SettingsPatch::default()
        };
        game.update_settings(&patch, now).unwrap();
        assert!(game.is_timer_running());
        assert_eq!(game.timer_time_left(now), Duration::from_secs(5));
    }

    #[test]
    fn test_update_settings_rejects_invalid() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        let patch = SettingsPatch {
            max_ledger_lines: Some(42),
            ..SettingsPatch::default()
        };
        assert!(game.update_settings(&patch, now).is_err());
        assert_eq!(game.settings(), &GameSettings::default());
    }

    #[test]
    fn test_cards_respect_ledger_limit() {
        let now = Instant::now();
        let settings = GameSettings {
            max_ledger_lines: 3,
            ..GameSettings::default()
        };
        let mut game = game(settings);
        game.start(now);
        for _ in 0..200 {
            game.next_card(now);
            assert!(game.card().note.diatonic_step <= 16);
            assert!(game.card().note.diatonic_step >= -4);
        }
    }

    #[test]
    fn test_card_view_matches_card() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        let view = game.card_view();
        assert_eq!(view.step, game.card().note.diatonic_step);
        assert_eq!(view.answer, game.card().note.name.to_string());
    }

    #[test]
    fn test_skip_during_review_keeps_card_queued() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);

        let a5 = Card::new(Note::new(NoteName::A, 5), crate::note::Clef::Treble);
        let f5 = Card::new(Note::new(NoteName::F, 5), crate::note::Clef::Treble);
        game.show(a5.clone(), now);
        game.mark_incorrect(now);
        game.show(f5.clone(), now);
        game.mark_incorrect(now);

        assert!(game.toggle_review(now));
        let skipped = game.card().clone();
        let other = if skipped.same_card(&a5) { f5 } else { a5 };

        game.next_card(now);
        assert!(game.is_review_mode());
        assert_eq!(game.review_queue_len(), 2);
        assert_eq!(game.card(), &other);
        assert_eq!(game.score(), Score { correct: 0, total: 2 });

        // answering the new front leaves only the skipped card
        game.mark_correct(now);
        assert_eq!(game.review_queue_len(), 1);
        assert_eq!(game.card(), &skipped);

        game.mark_correct(now);
        assert!(!game.is_review_mode());
        assert!(game.is_review_finished());
    }

    #[test]
    fn test_duplicate_misses_queue_once() {
        let now = Instant::now();
        let mut game = game(GameSettings::default());
        game.start(now);
        let card = Card::new(Note::new(NoteName::A, 5), crate::note::Clef::Treble);

        game.show(card.clone(), now);
        game.mark_incorrect(now);
        game.show(card, now);
        game.mark_incorrect(now);

        assert_eq!(game.pending_review_len(), 1);
        assert_eq!(game.score().total, 2);
    }
}
