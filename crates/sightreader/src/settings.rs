//! Game settings and their persisted form.
//!
//! Settings are stored as a flat JSON object. Restoring merges whatever keys
//! were saved over the configured initial settings, so a file written by an
//! older version (missing newer keys) still loads. Anything unreadable falls
//! back to the initial settings with a warning.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::note::{Clef, ClefMode, StepRange};

/// Largest number of ledger lines the settings allow.
pub const MAX_LEDGER_LINES: u8 = 6;

/// User-adjustable game settings.
///
/// Serialized with camelCase keys, both in storage and in the `[game]`
/// section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Clef(s) cards are drawn on.
    pub clef: ClefMode,
    /// How many ledger lines above/below the staff notes may use.
    pub max_ledger_lines: u8,
    /// Only draw notes that sit off the staff.
    pub only_ledger_lines: bool,
    /// Enforce a per-card time limit.
    pub time_limit_enabled: bool,
    /// Length of the per-card time limit.
    pub time_limit_seconds: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            clef: ClefMode::Treble,
            max_ledger_lines: 1,
            only_ledger_lines: false,
            time_limit_enabled: false,
            time_limit_seconds: 10,
        }
    }
}

/// A partial settings update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    /// New clef mode.
    pub clef: Option<ClefMode>,
    /// New ledger line limit.
    pub max_ledger_lines: Option<u8>,
    /// New ledger-only flag.
    pub only_ledger_lines: Option<bool>,
    /// Enable or disable the time limit.
    pub time_limit_enabled: Option<bool>,
    /// New time limit length.
    pub time_limit_seconds: Option<u32>,
}

impl SettingsPatch {
    /// Check whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl GameSettings {
    /// Validate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] if a field is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.max_ledger_lines > MAX_LEDGER_LINES {
            return Err(Error::invalid_settings(format!(
                "max_ledger_lines ({}) must be at most {MAX_LEDGER_LINES}",
                self.max_ledger_lines
            )));
        }
        if self.time_limit_seconds == 0 {
            return Err(Error::invalid_settings(
                "time_limit_seconds must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Return a copy with `patch` applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] if the result would be invalid;
    /// `self` is never modified.
    pub fn apply(&self, patch: &SettingsPatch) -> Result<Self> {
        let mut next = self.clone();
        if let Some(clef) = patch.clef {
            next.clef = clef;
        }
        if let Some(lines) = patch.max_ledger_lines {
            next.max_ledger_lines = lines;
        }
        if let Some(only) = patch.only_ledger_lines {
            next.only_ledger_lines = only;
        }
        if let Some(enabled) = patch.time_limit_enabled {
            next.time_limit_enabled = enabled;
        }
        if let Some(seconds) = patch.time_limit_seconds {
            next.time_limit_seconds = seconds;
        }
        next.validate()?;
        Ok(next)
    }

    /// Restore settings saved by [`GameSettings::to_json`], layered over
    /// `initial`.
    ///
    /// Never fails: unreadable or invalid saved data yields `initial`.
    #[must_use]
    pub fn restore(saved: Option<&str>, initial: &Self) -> Self {
        let Some(saved) = saved else {
            return initial.clone();
        };
        match Self::merge_saved(saved, initial) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to parse saved settings, using defaults: {e}");
                initial.clone()
            }
        }
    }

    fn merge_saved(saved: &str, initial: &Self) -> Result<Self> {
        let saved: serde_json::Value = serde_json::from_str(saved)?;
        let serde_json::Value::Object(saved) = saved else {
            return Err(Error::invalid_settings("saved settings are not a JSON object"));
        };

        let mut merged = serde_json::to_value(initial)?;
        if let serde_json::Value::Object(fields) = &mut merged {
            for (key, value) in saved {
                fields.insert(key, value);
            }
        }

        let settings: Self = serde_json::from_value(merged)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Per-card time limit, if enabled.
    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_enabled
            .then(|| Duration::from_secs(u64::from(self.time_limit_seconds)))
    }

    /// Steps any card can land on under these settings.
    #[must_use]
    pub fn note_range(&self) -> StepRange {
        let treble = Clef::Treble.note_range(self.max_ledger_lines);
        let bass = Clef::Bass.note_range(self.max_ledger_lines);
        match self.clef {
            ClefMode::Treble => treble,
            ClefMode::Bass => bass,
            ClefMode::Both => treble.union(&bass),
        }
    }
}
