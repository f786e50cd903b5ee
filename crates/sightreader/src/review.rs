//! Review queue for missed cards.
//!
//! Missed cards collect in a pending list. Starting a review shuffles them into
//! a FIFO queue: a correct answer drops the front card, a miss sends it to the
//! back. The review finishes when the queue empties. Stopping early puts the
//! unreviewed cards back in the pending list.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::selection::Card;

/// Missed-card bookkeeping and the active review queue.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    incorrect: Vec<Card>,
    queue: VecDeque<Card>,
    review_mode: bool,
    finished: bool,
}

impl ReviewQueue {
    /// Create an empty review queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a missed card. Duplicates (same name, octave and clef) are
    /// ignored.
    pub fn add_incorrect(&mut self, card: Card) {
        self.finished = false;
        if self.incorrect.iter().any(|c| c.same_card(&card)) {
            return;
        }
        debug!(note = %card.note, clef = %card.clef, "Queued missed card");
        self.incorrect.push(card);
    }

    /// Whether a review can be started or is already running.
    #[must_use]
    pub fn can_review(&self) -> bool {
        !self.incorrect.is_empty() || self.review_mode
    }

    /// Whether a review is in progress.
    #[must_use]
    pub fn is_review_mode(&self) -> bool {
        self.review_mode
    }

    /// Whether the last review ran to completion.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Cards left in the active review.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Missed cards waiting for the next review.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.incorrect.len()
    }

    /// The card under review.
    #[must_use]
    pub fn current(&self) -> Option<&Card> {
        self.queue.front()
    }

    /// Shuffle the missed cards into the queue and enter review mode.
    ///
    /// Returns the first card, or `None` if nothing was missed.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Card> {
        if self.incorrect.is_empty() {
            return None;
        }

        let mut cards = std::mem::take(&mut self.incorrect);
        cards.shuffle(rng);
        self.queue = cards.into();
        self.review_mode = true;
        self.finished = false;

        debug!(cards = self.queue.len(), "Review started");
        self.queue.front()
    }

    /// Drop the front card after a correct answer.
    ///
    /// Returns the next card, or `None` once the queue is exhausted, at which
    /// point review mode ends and the review is marked finished.
    pub fn advance(&mut self) -> Option<&Card> {
        self.queue.pop_front();
        if self.queue.is_empty() {
            self.review_mode = false;
            self.finished = true;
            debug!("Review finished");
            return None;
        }
        self.queue.front()
    }

    /// Send the front card to the back after a miss.
    pub fn requeue(&mut self) -> Option<&Card> {
        let card = self.queue.pop_front()?;
        self.queue.push_back(card);
        self.queue.front()
    }

    /// Leave review mode early, returning unreviewed cards to the pending
    /// list.
    pub fn stop(&mut self) {
        for card in std::mem::take(&mut self.queue) {
            if !self.incorrect.iter().any(|c| c.same_card(&card)) {
                self.incorrect.push(card);
            }
        }
        self.review_mode = false;
        self.finished = false;
        debug!(pending = self.incorrect.len(), "Review stopped");
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Acknowledge a finished review.
    pub fn clear_finished(&mut self) {
        self.finished = false;
    }
}
