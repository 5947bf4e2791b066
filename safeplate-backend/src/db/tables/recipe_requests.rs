//! Recipe request database operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

use crate::db::parse_timestamp;
use crate::models::{RecipeRequest, RequestSummary};
use super::super::Database;

fn row_to_request(row: &Row<'_>) -> SqliteResult<RecipeRequest> {
    let created_at_str: String = row.get(4)?;
    Ok(RecipeRequest {
        id: row.get(0)?,
        cuisine: row.get(1)?,
        allergies: row.get(2)?,
        ingredients: row.get(3)?,
        created_at: parse_timestamp(4, &created_at_str)?,
    })
}

impl Database {
    /// Store submitted criteria. Requests are never updated afterwards.
    pub fn create_recipe_request(
        &self,
        cuisine: &str,
        allergies: &str,
        ingredients: &str,
    ) -> SqliteResult<RecipeRequest> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO recipe_requests (cuisine, allergies, ingredients, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![cuisine, allergies, ingredients, now.to_rfc3339()],
        )?;

        Ok(RecipeRequest {
            id: conn.last_insert_rowid(),
            cuisine: cuisine.to_string(),
            allergies: allergies.to_string(),
            ingredients: ingredients.to_string(),
            created_at: now,
        })
    }

    pub fn get_recipe_request(&self, id: i64) -> SqliteResult<Option<RecipeRequest>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, cuisine, allergies, ingredients, created_at FROM recipe_requests WHERE id = ?1",
            [id],
            row_to_request,
        )
        .optional()
    }

    /// Newest requests first, with how many attempts each took and the accepted recipe if any
    pub fn list_recent_requests(&self, limit: u32) -> SqliteResult<Vec<RequestSummary>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT r.id, r.cuisine, r.allergies, r.ingredients, r.created_at,
                    (SELECT COUNT(*) FROM generated_recipes g WHERE g.request_id = r.id),
                    (SELECT g.recipe_name FROM generated_recipes g WHERE g.request_id = r.id AND g.accepted = 1)
             FROM recipe_requests r
             ORDER BY r.id DESC
             LIMIT ?1",
        )?;

        let summaries = stmt
            .query_map([limit], |row| {
                Ok(RequestSummary {
                    request: row_to_request(row)?,
                    attempt_count: row.get(5)?,
                    accepted_recipe_name: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(summaries)
    }

    pub fn count_recipe_requests(&self) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM recipe_requests", [], |row| row.get(0))
    }

    /// Delete a request and, through the foreign key, all of its attempts
    pub fn delete_recipe_request(&self, id: i64) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows_affected = conn.execute("DELETE FROM recipe_requests WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }
}
