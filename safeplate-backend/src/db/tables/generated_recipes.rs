//! Generated recipe (attempt) database operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

use crate::agents::AgentAttempt;
use crate::db::parse_timestamp;
use crate::models::GeneratedRecipe;
use super::super::Database;

const ATTEMPT_COLUMNS: &str =
    "id, request_id, attempt_number, recipe_name, recipe_text, is_safe, safety_notes, accepted, created_at";

fn row_to_attempt(row: &Row<'_>) -> SqliteResult<GeneratedRecipe> {
    let created_at_str: String = row.get(8)?;
    Ok(GeneratedRecipe {
        id: row.get(0)?,
        request_id: row.get(1)?,
        attempt_number: row.get(2)?,
        recipe_name: row.get(3)?,
        recipe_text: row.get(4)?,
        is_safe: row.get::<_, i64>(5)? != 0,
        safety_notes: row.get(6)?,
        accepted: row.get::<_, i64>(7)? != 0,
        created_at: parse_timestamp(8, &created_at_str)?,
    })
}

impl Database {
    /// Append an attempt to a request. The attempt number is the next one in sequence.
    pub fn record_attempt(&self, request_id: i64, attempt: &AgentAttempt) -> SqliteResult<GeneratedRecipe> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let now = Utc::now();

        let attempt_number: u32 = tx.query_row(
            "SELECT COALESCE(MAX(attempt_number), 0) + 1 FROM generated_recipes WHERE request_id = ?1",
            [request_id],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO generated_recipes
                (request_id, attempt_number, recipe_name, recipe_text, is_safe, safety_notes, accepted, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                request_id,
                attempt_number,
                attempt.recipe_name,
                attempt.recipe_text,
                attempt.is_safe as i32,
                attempt.safety_notes,
                now.to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(GeneratedRecipe {
            id,
            request_id,
            attempt_number,
            recipe_name: attempt.recipe_name.clone(),
            recipe_text: attempt.recipe_text.clone(),
            is_safe: attempt.is_safe,
            safety_notes: attempt.safety_notes.clone(),
            accepted: false,
            created_at: now,
        })
    }

    /// Mark an attempt as the request's final recipe.
    ///
    /// Returns false (and changes nothing) if the attempt is unknown, unsafe,
    /// or its request already has an accepted attempt.
    pub fn accept_attempt(&self, attempt_id: i64) -> SqliteResult<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let rows_affected = tx.execute(
            "UPDATE generated_recipes SET accepted = 1
             WHERE id = ?1
               AND is_safe = 1
               AND accepted = 0
               AND NOT EXISTS (
                   SELECT 1 FROM generated_recipes other
                   WHERE other.request_id = generated_recipes.request_id AND other.accepted = 1
               )",
            [attempt_id],
        )?;
        tx.commit()?;

        Ok(rows_affected > 0)
    }

    /// All attempts for a request in attempt order
    pub fn list_attempts(&self, request_id: i64) -> SqliteResult<Vec<GeneratedRecipe>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM generated_recipes WHERE request_id = ?1 ORDER BY attempt_number ASC",
            ATTEMPT_COLUMNS
        ))?;

        let attempts = stmt
            .query_map([request_id], row_to_attempt)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(attempts)
    }

    pub fn get_accepted_attempt(&self, request_id: i64) -> SqliteResult<Option<GeneratedRecipe>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!(
                "SELECT {} FROM generated_recipes WHERE request_id = ?1 AND accepted = 1",
                ATTEMPT_COLUMNS
            ),
            [request_id],
            row_to_attempt,
        )
        .optional()
    }

    pub fn count_generated_recipes(&self) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM generated_recipes", [], |row| row.get(0))
    }
}
