//! SQLite database - schema definitions and connection management
//!
//! This file contains:
//! - Database struct definition
//! - Connection management (new, init)
//! - Schema creation
//!
//! All table operations are in the tables/ subdirectory.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

/// Main database wrapper; the Mutex serializes access to the single connection
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection and initialize schema
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    /// Initialize all database tables
    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        // Attempts cascade with their request
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        // Submitted recipe criteria
        conn.execute(
            "CREATE TABLE IF NOT EXISTS recipe_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cuisine TEXT NOT NULL DEFAULT '',
                allergies TEXT NOT NULL DEFAULT '',
                ingredients TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // One row per chef attempt, append-only
        conn.execute(
            "CREATE TABLE IF NOT EXISTS generated_recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                request_id INTEGER NOT NULL REFERENCES recipe_requests(id) ON DELETE CASCADE,
                attempt_number INTEGER NOT NULL,
                recipe_name TEXT NOT NULL,
                recipe_text TEXT NOT NULL,
                is_safe INTEGER NOT NULL DEFAULT 0,
                safety_notes TEXT NOT NULL DEFAULT '',
                accepted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                UNIQUE(request_id, attempt_number)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_generated_recipes_request ON generated_recipes(request_id, attempt_number)",
            [],
        )?;

        Ok(())
    }
}

/// Parse an RFC 3339 column, reporting bad values as a conversion failure on that column
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
