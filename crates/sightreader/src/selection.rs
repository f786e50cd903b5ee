//! The card currently in front of the learner.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::note::{self, Clef, Note, StemDirection};
use crate::settings::GameSettings;

/// A note on a specific clef.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// The note shown.
    pub note: Note,
    /// The clef it is shown on.
    pub clef: Clef,
}

impl Card {
    /// Create a new card.
    #[must_use]
    pub fn new(note: Note, clef: Clef) -> Self {
        Self { note, clef }
    }

    /// Draw a random card under `settings`.
    pub fn random<R: Rng + ?Sized>(settings: &GameSettings, rng: &mut R) -> Self {
        let clef = settings.clef.pick(rng);
        let note = note::random_note(
            clef,
            settings.max_ledger_lines,
            settings.only_ledger_lines,
            rng,
        );
        Self { note, clef }
    }

    /// Two cards are the same flashcard when name, octave and clef match.
    #[must_use]
    pub fn same_card(&self, other: &Self) -> bool {
        self.clef == other.clef && self.note.same_pitch_class_and_octave(&other.note)
    }

    /// Everything a renderer needs to draw this card.
    #[must_use]
    pub fn view(&self) -> CardView {
        let step = self.note.diatonic_step;
        CardView {
            answer: self.note.name.to_string(),
            display_name: self.note.display_name(),
            clef: self.clef,
            step,
            is_ledger: note::is_ledger_line(step, self.clef),
            ledger_lines: note::ledger_line_count(step, self.clef),
            stem: note::stem_direction(step, self.clef),
        }
    }
}

/// Plain data describing how to draw a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    /// Letter name the learner should answer with.
    pub answer: String,
    /// Full name with octave, e.g. `C4`.
    pub display_name: String,
    /// Clef to draw.
    pub clef: Clef,
    /// Diatonic step of the note head.
    pub step: i32,
    /// Whether the note sits off the staff.
    pub is_ledger: bool,
    /// Number of ledger lines to draw.
    pub ledger_lines: u32,
    /// Stem direction.
    pub stem: StemDirection,
}

/// Holds the current card and whether its answer is showing.
#[derive(Debug, Clone)]
pub struct NoteSelector {
    current: Card,
    revealed: bool,
}

impl NoteSelector {
    /// Start with a random card.
    pub fn new<R: Rng + ?Sized>(settings: &GameSettings, rng: &mut R) -> Self {
        Self {
            current: Card::random(settings, rng),
            revealed: false,
        }
    }

    /// The card being shown.
    #[must_use]
    pub fn current(&self) -> &Card {
        &self.current
    }

    /// Whether the answer is showing.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Replace the card with a fresh random one and hide the answer.
    pub fn next<R: Rng + ?Sized>(&mut self, settings: &GameSettings, rng: &mut R) -> &Card {
        self.set(Card::random(settings, rng))
    }

    /// Show a specific card and hide the answer.
    pub fn set(&mut self, card: Card) -> &Card {
        self.current = card;
        self.revealed = false;
        &self.current
    }

    /// Show the answer.
    pub fn reveal(&mut self) {
        self.revealed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{ClefMode, NoteName};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_new_selector_is_hidden() {
        let selector = NoteSelector::new(&GameSettings::default(), &mut rng());
        assert!(!selector.is_revealed());
        assert_eq!(selector.current().clef, Clef::Treble);
    }

    #[test]
    fn test_reveal_then_next_hides_answer() {
        let settings = GameSettings::default();
        let mut rng = rng();
        let mut selector = NoteSelector::new(&settings, &mut rng);

        selector.reveal();
        assert!(selector.is_revealed());

        selector.next(&settings, &mut rng);
        assert!(!selector.is_revealed());
    }

    #[test]
    fn test_set_installs_card() {
        let mut selector = NoteSelector::new(&GameSettings::default(), &mut rng());
        selector.reveal();

        let card = Card::new(Note::new(NoteName::G, 2), Clef::Bass);
        selector.set(card.clone());

        assert_eq!(selector.current(), &card);
        assert!(!selector.is_revealed());
    }

    #[test]
    fn test_random_cards_respect_settings() {
        let settings = GameSettings {
            clef: ClefMode::Both,
            max_ledger_lines: 2,
            ..GameSettings::default()
        };
        let mut rng = rng();
        let mut clefs = std::collections::HashSet::new();
        for _ in 0..300 {
            let card = Card::random(&settings, &mut rng);
            assert!(card.clef.note_range(2).contains(card.note.diatonic_step));
            clefs.insert(card.clef);
        }
        assert_eq!(clefs.len(), 2);
    }

    #[test]
    fn test_same_card_ignores_accidental() {
        let a = Card::new(Note::new(NoteName::C, 4), Clef::Treble);
        let b = Card::new(Note::new(NoteName::C, 4).with_accidental("#"), Clef::Treble);
        let c = Card::new(Note::new(NoteName::C, 4), Clef::Bass);
        assert!(a.same_card(&b));
        assert!(!a.same_card(&c));
    }

    #[test]
    fn test_view_middle_c_treble() {
        let view = Card::new(Note::new(NoteName::C, 4), Clef::Treble).view();
        assert_eq!(view.answer, "C");
        assert_eq!(view.display_name, "C4");
        assert_eq!(view.step, 0);
        assert!(view.is_ledger);
        assert_eq!(view.ledger_lines, 1);
        assert_eq!(view.stem, StemDirection::Up);
    }

    #[test]
    fn test_view_on_staff() {
        let view = Card::new(Note::new(NoteName::B, 4), Clef::Treble).view();
        assert!(!view.is_ledger);
        assert_eq!(view.ledger_lines, 0);
        assert_eq!(view.stem, StemDirection::Down);
    }
}
