//! Plain-text drawing for the terminal front end.
//!
//! Each staff row is one diatonic step, so lines and spaces alternate.

use crate::note::StemDirection;
use crate::score::Score;
use crate::selection::CardView;

const STAFF_WIDTH: usize = 17;
const NOTE_COLUMN: usize = 8;
const LEDGER_HALF_WIDTH: usize = 2;
/// Stem length in steps (three and a half spaces).
const STEM_STEPS: i32 = 6;

/// Draw `view` on a small ASCII staff, top row first.
///
/// Ledger lines are drawn only between the staff and the note.
#[must_use]
pub fn staff(view: &CardView) -> Vec<String> {
    let staff = view.clef.staff_range();
    let step = view.step;

    let (stem_top, stem_bottom) = match view.stem {
        StemDirection::Up => (step + STEM_STEPS, step + 1),
        StemDirection::Down => (step - 1, step - STEM_STEPS),
    };
    let top = staff.max.max(step).max(stem_top);
    let bottom = staff.min.min(step).min(stem_bottom);

    let mut rows = Vec::new();
    for row in (bottom..=top).rev() {
        let on_line = (row - staff.min).rem_euclid(2) == 0;
        let mut cells = vec![' '; STAFF_WIDTH];

        if on_line && staff.contains(row) {
            cells.fill('-');
        } else if on_line && needs_ledger(row, step, staff.min, staff.max) {
            let start = NOTE_COLUMN - LEDGER_HALF_WIDTH;
            cells[start..=NOTE_COLUMN + LEDGER_HALF_WIDTH].fill('-');
        }

        if row == step {
            cells[NOTE_COLUMN] = 'O';
        } else if (stem_bottom..=stem_top).contains(&row) {
            let column = match view.stem {
                StemDirection::Up => NOTE_COLUMN + 1,
                StemDirection::Down => NOTE_COLUMN - 1,
            };
            cells[column] = '|';
        }

        rows.push(cells.into_iter().collect::<String>().trim_end().to_string());
    }
    rows
}

fn needs_ledger(row: i32, step: i32, staff_min: i32, staff_max: i32) -> bool {
    (row > staff_max && row <= step) || (row < staff_min && row >= step)
}

/// A fixed-width bar, full at `fraction == 1.0`.
#[must_use]
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
}

/// `Score: 3 / 4 (75%)`, or without a percentage before the first answer.
#[must_use]
pub fn score_line(score: Score) -> String {
    match score.accuracy() {
        Some(accuracy) => format!("Score: {score} ({:.0}%)", accuracy * 100.0),
        None => format!("Score: {score}"),
    }
}
