//! Notes, clefs and staff geometry.
//!
//! Pitches are addressed by *diatonic step*: the number of letter names above
//! (or below) middle C, so C4 is step 0, D4 is step 1 and B3 is step -1.
//! Accidentals never change the step. Staff positions, ledger lines and stem
//! directions are all simple comparisons against step ranges.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The seven natural note names in diatonic order, starting from C.
pub const NOTE_NAMES: [NoteName; 7] = [
    NoteName::C,
    NoteName::D,
    NoteName::E,
    NoteName::F,
    NoteName::G,
    NoteName::A,
    NoteName::B,
];

/// Octave number of middle C.
const MIDDLE_C_OCTAVE: i32 = 4;

/// A natural note name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    /// C
    C,
    /// D
    D,
    /// E
    E,
    /// F
    F,
    /// G
    G,
    /// A
    A,
    /// B
    B,
}

impl NoteName {
    /// Position of this name within the octave, C = 0 through B = 6.
    #[must_use]
    pub fn index(self) -> i32 {
        match self {
            Self::C => 0,
            Self::D => 1,
            Self::E => 2,
            Self::F => 3,
            Self::G => 4,
            Self::A => 5,
            Self::B => 6,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::A => "A",
            Self::B => "B",
        };
        f.write_str(s)
    }
}

/// A clef a single card is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    /// G clef on the second line.
    Treble,
    /// F clef on the fourth line.
    Bass,
}

impl Clef {
    /// Steps covered by the five staff lines and the spaces between them.
    #[must_use]
    pub fn staff_range(self) -> StepRange {
        match self {
            // E4 ..= F5
            Self::Treble => StepRange::new(2, 10),
            // G2 ..= A3
            Self::Bass => StepRange::new(-10, -2),
        }
    }

    /// Step of the middle staff line (B4 in treble, D3 in bass).
    #[must_use]
    pub fn middle_line(self) -> i32 {
        match self {
            Self::Treble => 6,
            Self::Bass => -6,
        }
    }

    /// Steps reachable with at most `max_ledger_lines` ledger lines above or
    /// below the staff.
    #[must_use]
    pub fn note_range(self, max_ledger_lines: u8) -> StepRange {
        let staff = self.staff_range();
        let extra = i32::from(max_ledger_lines) * 2;
        StepRange::new(staff.min - extra, staff.max + extra)
    }
}

impl fmt::Display for Clef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Treble => write!(f, "treble"),
            Self::Bass => write!(f, "bass"),
        }
    }
}

/// Which clefs cards may be drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClefMode {
    /// Treble clef only.
    #[default]
    Treble,
    /// Bass clef only.
    Bass,
    /// Either clef, chosen per card.
    Both,
}

impl ClefMode {
    /// Resolve to a concrete clef, flipping a coin for [`ClefMode::Both`].
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> Clef {
        match self {
            Self::Treble => Clef::Treble,
            Self::Bass => Clef::Bass,
            Self::Both => {
                if rng.random_bool(0.5) {
                    Clef::Treble
                } else {
                    Clef::Bass
                }
            }
        }
    }
}

impl fmt::Display for ClefMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Treble => write!(f, "treble"),
            Self::Bass => write!(f, "bass"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// An inclusive range of diatonic steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRange {
    /// Lowest step, inclusive.
    pub min: i32,
    /// Highest step, inclusive.
    pub max: i32,
}

impl StepRange {
    /// Create a range; `min` must not exceed `max`.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Check whether `step` falls inside the range.
    #[must_use]
    pub fn contains(&self, step: i32) -> bool {
        (self.min..=self.max).contains(&step)
    }

    /// Smallest range covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Number of steps in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.max - self.min + 1).unwrap_or(0)
    }

    /// Check whether the range is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Direction of a note's stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    /// Stem on the right, pointing up.
    Up,
    /// Stem on the left, pointing down.
    Down,
}

/// A single pitch shown on a flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Natural letter name.
    pub name: NoteName,
    /// Scientific pitch octave (middle C is in octave 4).
    pub octave: i32,
    /// Accidental glyph, if any (e.g. `#`, `b`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accidental: Option<String>,
    /// Diatonic steps above middle C.
    pub diatonic_step: i32,
}

impl Note {
    /// Create a natural note from its name and octave.
    #[must_use]
    pub fn new(name: NoteName, octave: i32) -> Self {
        Self {
            name,
            octave,
            accidental: None,
            diatonic_step: diatonic_step(name, octave),
        }
    }

    /// Build the natural note sitting on the given diatonic step.
    #[must_use]
    pub fn from_diatonic_step(step: i32) -> Self {
        // rem_euclid/div_euclid keep negative steps in the octave below
        let name = NOTE_NAMES[usize::try_from(step.rem_euclid(7)).unwrap_or_default()];
        let octave = step.div_euclid(7) + MIDDLE_C_OCTAVE;
        Self {
            name,
            octave,
            accidental: None,
            diatonic_step: step,
        }
    }

    /// Attach an accidental glyph.
    #[must_use]
    pub fn with_accidental(mut self, accidental: impl Into<String>) -> Self {
        self.accidental = Some(accidental.into());
        self
    }

    /// Name, accidental and octave, e.g. `F#5`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!(
            "{}{}{}",
            self.name,
            self.accidental.as_deref().unwrap_or_default(),
            self.octave
        )
    }

    /// Check whether two notes share letter name and octave.
    #[must_use]
    pub fn same_pitch_class_and_octave(&self, other: &Self) -> bool {
        self.name == other.name && self.octave == other.octave
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Diatonic step of a natural note.
#[must_use]
pub fn diatonic_step(name: NoteName, octave: i32) -> i32 {
    (octave - MIDDLE_C_OCTAVE) * 7 + name.index()
}

/// Check whether a step lies off the five-line staff.
///
/// Steps directly above or below the staff count as ledger notes even
/// though they need no ledger line of their own.
#[must_use]
pub fn is_ledger_line(step: i32, clef: Clef) -> bool {
    !clef.staff_range().contains(step)
}

/// Number of ledger lines that must be drawn to show `step`.
#[must_use]
pub fn ledger_line_count(step: i32, clef: Clef) -> u32 {
    let staff = clef.staff_range();
    let beyond = if step < staff.min {
        staff.min - step
    } else if step > staff.max {
        step - staff.max
    } else {
        0
    };
    u32::try_from(beyond / 2).unwrap_or(0)
}

/// Stem direction for a note: down on or above the middle line, up below it.
#[must_use]
pub fn stem_direction(step: i32, clef: Clef) -> StemDirection {
    if step >= clef.middle_line() {
        StemDirection::Down
    } else {
        StemDirection::Up
    }
}

/// Draw a random natural note for `clef`.
///
/// With `only_ledger_lines` the staff steps are excluded, leaving only notes
/// above or below the staff. If that leaves nothing (no ledger lines allowed)
/// the whole range is used instead.
pub fn random_note<R: Rng + ?Sized>(
    clef: Clef,
    max_ledger_lines: u8,
    only_ledger_lines: bool,
    rng: &mut R,
) -> Note {
    let range = clef.note_range(max_ledger_lines);

    if only_ledger_lines {
        let candidates: Vec<i32> = (range.min..=range.max)
            .filter(|&step| is_ledger_line(step, clef))
            .collect();
        if !candidates.is_empty() {
            let step = candidates[rng.random_range(0..candidates.len())];
            return Note::from_diatonic_step(step);
        }
        debug!(
            %clef,
            max_ledger_lines, "no ledger-only steps available, using the full range"
        );
    }

    Note::from_diatonic_step(rng.random_range(range.min..=range.max))
}
