use rusqlite::{Connection, OptionalExtension};

use crate::Database;
use crate::error::{DbError, DbResult};
use crate::models::UserRow;

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, first_name, last_name, password)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, username, email, first_name, last_name, password_hash),
            )
            .map_err(|e| DbError::classify_conflict(e, "username"))?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    /// Batch-fetch users for a set of ids (recipe authors in list responses).
    pub fn users_by_ids(&self, ids: &[String]) -> DbResult<Vec<UserRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, username, email, first_name, last_name, password, created_at
                 FROM users WHERE id IN ({})",
                super::placeholders(ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), map_user_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, cond: &str, value: &str) -> DbResult<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, email, first_name, last_name, password, created_at
         FROM users WHERE {cond}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], map_user_row).optional()?;
    Ok(row)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        password: row.get(5)?,
        created_at: row.get(6)?,
    })
}
