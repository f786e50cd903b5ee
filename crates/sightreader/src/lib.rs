//! `sightreader` - Note-reading flashcards
//!
//! This library provides the game logic behind the `sightread` binary: random
//! note selection within ledger-line limits, scoring, a review queue for missed
//! notes, a per-card countdown, and persisted practice time and settings.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod note;
pub mod practice;
pub mod render;
pub mod review;
pub mod score;
pub mod selection;
pub mod session;
pub mod settings;
pub mod storage;
pub mod timer;

pub use config::Config;
pub use error::{Error, Result};
pub use game::FlashcardGame;
pub use logging::init_logging;
pub use note::{Clef, ClefMode, Note, NoteName};
pub use practice::{format_duration, PracticeEntry, PracticeLog, PracticeTracker};
pub use score::Score;
pub use selection::{Card, CardView};
pub use settings::{GameSettings, SettingsPatch};
pub use storage::{Storage, StorageStats};
pub use timer::{CountdownTimer, TimerEvent};
