//! `SQLite` schema definitions for sightreader.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the practice log table.
///
/// One row per local calendar day, keyed by ISO date (`YYYY-MM-DD`).
pub const CREATE_PRACTICE_LOG_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS practice_log (
    day TEXT PRIMARY KEY,
    seconds INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_PRACTICE_LOG_TABLE, CREATE_METADATA_TABLE];
