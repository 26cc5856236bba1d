use rusqlite::OptionalExtension;

use crate::Database;
use crate::error::{DbError, DbResult};
use crate::models::{IngredientRow, TagRow};

impl Database {
    // -- Tags --

    pub fn insert_tag(&self, id: &str, name: &str, color: &str, slug: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO tags (id, name, color, slug) VALUES (?1, ?2, ?3, ?4)",
                (id, name, color, slug),
            )
            .map_err(|e| DbError::classify_conflict(e, "tag"))?;
            Ok(())
        })
    }

    pub fn list_tags(&self) -> DbResult<Vec<TagRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, color, slug FROM tags ORDER BY name")?;
            let rows = stmt
                .query_map([], map_tag_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_tag(&self, id: &str) -> DbResult<Option<TagRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, color, slug FROM tags WHERE id = ?1")?;
            let row = stmt.query_row([id], map_tag_row).optional()?;
            Ok(row)
        })
    }

    // -- Ingredients --

    pub fn insert_ingredient(&self, id: &str, name: &str, measurement_unit: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO ingredients (id, name, measurement_unit) VALUES (?1, ?2, ?3)",
                (id, name, measurement_unit),
            )
            .map_err(|e| DbError::classify_conflict(e, "ingredient"))?;
            Ok(())
        })
    }

    /// List the catalog, optionally narrowed to names starting with `prefix`.
    pub fn list_ingredients(&self, prefix: Option<&str>) -> DbResult<Vec<IngredientRow>> {
        self.with_conn(|conn| {
            let rows = match prefix {
                Some(prefix) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, name, measurement_unit FROM ingredients
                         WHERE name LIKE ?1 || '%' ORDER BY name",
                    )?;
                    stmt.query_map([prefix], map_ingredient_row)?
                        .collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
                    )?;
                    stmt.query_map([], map_ingredient_row)?
                        .collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(rows)
        })
    }

    pub fn get_ingredient(&self, id: &str) -> DbResult<Option<IngredientRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, measurement_unit FROM ingredients WHERE id = ?1")?;
            let row = stmt.query_row([id], map_ingredient_row).optional()?;
            Ok(row)
        })
    }
}

fn map_tag_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TagRow> {
    Ok(TagRow {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        slug: row.get(3)?,
    })
}

fn map_ingredient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IngredientRow> {
    Ok(IngredientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        measurement_unit: row.get(2)?,
    })
}
