//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::note::ClefMode;
use crate::settings::{SettingsPatch, MAX_LEDGER_LINES};

/// Play command arguments.
#[derive(Debug, Args)]
pub struct PlayCommand {
    /// Settings to change before starting (saved for next time)
    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Saved settings commands.
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the settings the next game will use
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change and save settings
    Set(SettingsArgs),

    /// Forget saved settings and fall back to the configured defaults
    Reset,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Flags that change game settings.
#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    /// Clef(s) to draw notes on
    #[arg(long, value_enum)]
    pub clef: Option<ClefArg>,

    /// Ledger lines allowed above and below the staff
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_LEDGER_LINES)))]
    pub max_ledger_lines: Option<u8>,

    /// Only draw notes that sit off the staff
    #[arg(long, conflicts_with = "all_notes")]
    pub only_ledger_lines: bool,

    /// Draw notes both on and off the staff
    #[arg(long)]
    pub all_notes: bool,

    /// Enable a per-card time limit of SECS seconds
    #[arg(long, value_name = "SECS", conflicts_with = "no_time_limit",
          value_parser = clap::value_parser!(u32).range(1..))]
    pub time_limit: Option<u32>,

    /// Disable the per-card time limit
    #[arg(long)]
    pub no_time_limit: bool,
}

impl SettingsArgs {
    /// Convert the flags into a settings patch.
    #[must_use]
    pub fn to_patch(&self) -> SettingsPatch {
        let only_ledger_lines = if self.only_ledger_lines {
            Some(true)
        } else if self.all_notes {
            Some(false)
        } else {
            None
        };

        let time_limit_enabled = if self.time_limit.is_some() {
            Some(true)
        } else if self.no_time_limit {
            Some(false)
        } else {
            None
        };

        SettingsPatch {
            clef: self.clef.map(ClefMode::from),
            max_ledger_lines: self.max_ledger_lines,
            only_ledger_lines,
            time_limit_enabled,
            time_limit_seconds: self.time_limit,
        }
    }
}

/// Clef choice for CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClefArg {
    /// Treble clef only
    Treble,
    /// Bass clef only
    Bass,
    /// A random clef for every card
    Both,
}

impl From<ClefArg> for ClefMode {
    fn from(arg: ClefArg) -> Self {
        match arg {
            ClefArg::Treble => Self::Treble,
            ClefArg::Bass => Self::Bass,
            ClefArg::Both => Self::Both,
        }
    }
}
