//! Storage layer for sightreader.
//!
//! This module provides `SQLite`-based persistence for the practice log and
//! the learner's saved settings, so both survive between sessions.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::practice::{PracticeEntry, PracticeLog};

/// Metadata key holding the saved settings JSON.
const SETTINGS_KEY: &str = "settings";

/// Date format used for the `practice_log.day` column.
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Persistent store for practice time and settings.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&mut conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add practice seconds to a day's total.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_practice(&self, entry: PracticeEntry) -> Result<()> {
        let day = entry.day.format(DAY_FORMAT).to_string();
        let seconds = i64::try_from(entry.seconds).unwrap_or(i64::MAX);

        self.conn.execute(
            r"
            INSERT INTO practice_log (day, seconds, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(day) DO UPDATE SET
                seconds = seconds + excluded.seconds,
                updated_at = excluded.updated_at
            ",
            params![day, seconds, Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)],
        )?;

        debug!(%day, seconds, "Recorded practice time");
        Ok(())
    }

    /// Load every practice day.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored day is malformed.
    pub fn practice_log(&self) -> Result<PracticeLog> {
        let mut stmt = self
            .conn
            .prepare("SELECT day, seconds FROM practice_log ORDER BY day ASC")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(day, seconds)| {
                Ok(PracticeEntry {
                    day: parse_day(&day)?,
                    seconds: u64::try_from(seconds).unwrap_or(0),
                })
            })
            .collect()
    }

    /// Delete all practice history.
    ///
    /// Returns the number of days removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_practice(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM practice_log", [])?;
        if affected > 0 {
            info!("Cleared {} practice days", affected);
        }
        Ok(affected)
    }

    /// Raw settings JSON saved by the last session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn load_settings_json(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                [SETTINGS_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Replace the saved settings JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_settings_json(&self, json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![SETTINGS_KEY, json],
        )?;
        debug!("Saved settings");
        Ok(())
    }

    /// Forget saved settings.
    ///
    /// Returns `true` if anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_settings(&self) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM metadata WHERE key = ?1", [SETTINGS_KEY])?;
        Ok(affected > 0)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (days_recorded, total_seconds): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(seconds), 0) FROM practice_log",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let first: Option<String> = self
            .conn
            .query_row(
                "SELECT day FROM practice_log ORDER BY day ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last: Option<String> = self
            .conn
            .query_row(
                "SELECT day FROM practice_log ORDER BY day DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        // fixed-width UTC timestamps, so the text maximum is the latest
        let updated: Option<String> = self.conn.query_row(
            "SELECT MAX(updated_at) FROM practice_log",
            [],
            |row| row.get(0),
        )?;
        let last_practiced_at = updated.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|at| at.with_timezone(&Utc))
                .map_err(|e| warn!("Ignoring unreadable updated_at '{raw}': {e}"))
                .ok()
        });

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            days_recorded: u64::try_from(days_recorded).unwrap_or(0),
            total_seconds: u64::try_from(total_seconds).unwrap_or(0),
            first_day: first.as_deref().map(parse_day).transpose()?,
            last_day: last.as_deref().map(parse_day).transpose()?,
            last_practiced_at,
            db_size_bytes,
        })
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT).map_err(|_| Error::InvalidPracticeDay {
        day: raw.to_string(),
    })
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of days with recorded practice.
    pub days_recorded: u64,
    /// Seconds practised across all days.
    pub total_seconds: u64,
    /// Earliest recorded day.
    pub first_day: Option<NaiveDate>,
    /// Latest recorded day.
    pub last_day: Option<NaiveDate>,
    /// When practice time was last written.
    pub last_practiced_at: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
