//! `sightread` - CLI for sightreader
//!
//! This binary runs flashcard sessions in the terminal and manages saved
//! settings and practice statistics.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::warn;

use sightreader::cli::{Cli, Command, ConfigCommand, SettingsCommand};
use sightreader::{format_duration, init_logging, render, session};
use sightreader::{Config, GameSettings, SettingsPatch, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Play(play_cmd) => handle_play(&config, &play_cmd.settings.to_patch()).await,
        Command::Stats(stats_cmd) => handle_stats(&config, stats_cmd.json),
        Command::Settings(settings_cmd) => handle_settings(&config, settings_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

/// Saved settings layered over the configured defaults.
fn load_settings(config: &Config, storage: &Storage) -> GameSettings {
    let saved = storage.load_settings_json().unwrap_or_else(|e| {
        warn!("Failed to read saved settings: {e}");
        None
    });
    GameSettings::restore(saved.as_deref(), &config.game)
}

fn save_patch(
    config: &Config,
    storage: &Storage,
    patch: &SettingsPatch,
) -> anyhow::Result<GameSettings> {
    let settings = load_settings(config, storage).apply(patch)?;
    storage.save_settings_json(&settings.to_json()?)?;
    Ok(settings)
}

async fn handle_play(config: &Config, patch: &SettingsPatch) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let settings = if patch.is_empty() {
        load_settings(config, &storage)
    } else {
        save_patch(config, &storage, patch)?
    };

    let score = session::run(&storage, settings, config.flush_interval()).await?;

    let today = storage.practice_log()?.seconds_on(Local::now().date_naive());
    println!();
    println!("{}", render::score_line(score));
    println!("Practiced today: {}", format_duration(today));
    Ok(())
}

fn handle_stats(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let log = storage.practice_log()?;
    let stats = storage.stats()?;
    let today = Local::now().date_naive();

    if json {
        let report = serde_json::json!({
            "today_seconds": log.seconds_on(today),
            "this_week_seconds": log.this_week_seconds(today),
            "total_seconds": log.total_seconds(),
            "days_recorded": stats.days_recorded,
            "first_day": stats.first_day,
            "last_day": stats.last_day,
            "last_practiced_at": stats.last_practiced_at,
            "days": log,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Practice time");
        println!("-------------");
        println!("Today:         {}", format_duration(log.seconds_on(today)));
        println!("This week:     {}", format_duration(log.this_week_seconds(today)));
        println!("All time:      {}", format_duration(log.total_seconds()));
        println!("Days practiced: {}", stats.days_recorded);
        if let (Some(first), Some(last)) = (stats.first_day, stats.last_day) {
            println!("Range:         {first} to {last}");
        }
        if let Some(at) = stats.last_practiced_at {
            let local = at.with_timezone(&Local);
            println!("Last practice: {}", local.format("%Y-%m-%d %H:%M"));
        }
        println!("Database:      {}", storage.path().display());
    }
    Ok(())
}

fn handle_settings(config: &Config, cmd: SettingsCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        SettingsCommand::Show { json } => {
            let settings = load_settings(config, &storage);
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings);
            }
        }
        SettingsCommand::Set(args) => {
            let patch = args.to_patch();
            if patch.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            let settings = save_patch(config, &storage, &patch)?;
            println!("Settings saved.");
            print_settings(&settings);
        }
        SettingsCommand::Reset => {
            if storage.clear_settings()? {
                println!("Saved settings removed.");
            } else {
                println!("No saved settings.");
            }
            print_settings(&config.game);
        }
    }
    Ok(())
}

fn print_settings(settings: &GameSettings) {
    println!("Clef:              {}", settings.clef);
    println!("Max ledger lines:  {}", settings.max_ledger_lines);
    println!("Only ledger lines: {}", settings.only_ledger_lines);
    match settings.time_limit() {
        Some(limit) => println!("Time limit:        {}s", limit.as_secs()),
        None => println!("Time limit:        off"),
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Practice]");
                println!(
                    "  Flush interval:     {}s",
                    config.practice.flush_interval_secs
                );
                println!();
                println!("[Game defaults]");
                print_settings(&config.game);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
