use rusqlite::types::ToSql;
use rusqlite::{OptionalExtension, Transaction};

use crate::Database;
use crate::error::{DbError, DbResult};
use crate::models::{IngredientLineRow, RecipeRow, TagRow};

pub struct NewRecipe<'a> {
    pub id: &'a str,
    pub author_id: &'a str,
    pub name: &'a str,
    pub image: &'a [u8],
    pub description: &'a str,
    pub cooking_time: i64,
    pub tag_ids: &'a [String],
    /// (ingredient_id, amount) pairs, already validated for shape
    /// (positive amounts, no duplicates) at the API boundary.
    pub lines: &'a [(String, i64)],
}

/// Partial update. Scalars patch in place; `tag_ids` and `lines`, when
/// present, replace the stored set wholesale — lines not re-submitted are
/// dropped, never merged.
#[derive(Default)]
pub struct RecipeChanges<'a> {
    pub name: Option<&'a str>,
    pub image: Option<&'a [u8]>,
    pub description: Option<&'a str>,
    pub cooking_time: Option<i64>,
    pub tag_ids: Option<&'a [String]>,
    pub lines: Option<&'a [(String, i64)]>,
}

/// A list filter that needs the caller's identity to evaluate. Kept as an
/// explicit variant set, each mapping to one SQL clause.
pub enum ScopedFilter {
    Favorited { user_id: String, value: bool },
    InShoppingCart { user_id: String, value: bool },
}

impl ScopedFilter {
    fn clause(&self) -> &'static str {
        match self {
            ScopedFilter::Favorited { value: true, .. } => {
                "EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ?)"
            }
            ScopedFilter::Favorited { value: false, .. } => {
                "NOT EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ?)"
            }
            ScopedFilter::InShoppingCart { value: true, .. } => {
                "EXISTS (SELECT 1 FROM shopping_cart sc WHERE sc.recipe_id = r.id AND sc.user_id = ?)"
            }
            ScopedFilter::InShoppingCart { value: false, .. } => {
                "NOT EXISTS (SELECT 1 FROM shopping_cart sc WHERE sc.recipe_id = r.id AND sc.user_id = ?)"
            }
        }
    }

    fn user_id(&self) -> &String {
        match self {
            ScopedFilter::Favorited { user_id, .. } => user_id,
            ScopedFilter::InShoppingCart { user_id, .. } => user_id,
        }
    }
}

#[derive(Default)]
pub struct RecipeFilter {
    pub author_id: Option<String>,
    pub tag_slugs: Vec<String>,
    pub scoped: Vec<ScopedFilter>,
    pub limit: i64,
    pub offset: i64,
}

impl Database {
    /// Insert a recipe with its ingredient lines and tag links as one
    /// transaction; either everything lands or nothing does.
    pub fn create_recipe(&self, recipe: &NewRecipe<'_>) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO recipes (id, author_id, name, image, description, cooking_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    recipe.id,
                    recipe.author_id,
                    recipe.name,
                    recipe.image,
                    recipe.description,
                    recipe.cooking_time,
                ),
            )
            .map_err(|e| DbError::classify_conflict(e, "recipe name"))?;

            link_tags(&tx, recipe.id, recipe.tag_ids)?;
            insert_lines(&tx, recipe.id, recipe.lines)?;

            tx.commit()?;
            Ok(())
        })
    }

    pub fn update_recipe(&self, recipe_id: &str, changes: &RecipeChanges<'_>) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "UPDATE recipes SET
                    name = COALESCE(?1, name),
                    image = COALESCE(?2, image),
                    description = COALESCE(?3, description),
                    cooking_time = COALESCE(?4, cooking_time)
                 WHERE id = ?5",
                (
                    changes.name,
                    changes.image,
                    changes.description,
                    changes.cooking_time,
                    recipe_id,
                ),
            )
            .map_err(|e| DbError::classify_conflict(e, "recipe name"))?;

            if let Some(tag_ids) = changes.tag_ids {
                tx.execute("DELETE FROM recipe_tags WHERE recipe_id = ?1", [recipe_id])?;
                link_tags(&tx, recipe_id, tag_ids)?;
            }

            if let Some(lines) = changes.lines {
                tx.execute(
                    "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
                    [recipe_id],
                )?;
                insert_lines(&tx, recipe_id, lines)?;
            }

            tx.commit()?;
            Ok(())
        })
    }

    /// Ingredient lines, tag links, favorites, and cart entries go with the
    /// recipe via ON DELETE CASCADE.
    pub fn delete_recipe(&self, recipe_id: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute("DELETE FROM recipes WHERE id = ?1", [recipe_id])?;
            if affected == 0 {
                return Err(DbError::NotFound("recipe"));
            }
            Ok(())
        })
    }

    pub fn get_recipe(&self, id: &str) -> DbResult<Option<RecipeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, author_id, name, image, description, cooking_time, created_at
                 FROM recipes WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_recipe_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_recipes(&self, filter: &RecipeFilter) -> DbResult<Vec<RecipeRow>> {
        self.with_conn(|conn| {
            let mut conditions: Vec<String> = Vec::new();
            let mut params: Vec<&dyn ToSql> = Vec::new();

            if let Some(author_id) = &filter.author_id {
                conditions.push("r.author_id = ?".into());
                params.push(author_id);
            }

            if !filter.tag_slugs.is_empty() {
                conditions.push(format!(
                    "EXISTS (SELECT 1 FROM recipe_tags rt
                             JOIN tags t ON t.id = rt.tag_id
                             WHERE rt.recipe_id = r.id AND t.slug IN ({}))",
                    super::placeholders(filter.tag_slugs.len())
                ));
                for slug in &filter.tag_slugs {
                    params.push(slug);
                }
            }

            for scoped in &filter.scoped {
                conditions.push(scoped.clause().into());
                params.push(scoped.user_id());
            }

            let mut sql = String::from(
                "SELECT r.id, r.author_id, r.name, r.image, r.description, r.cooking_time, r.created_at
                 FROM recipes r",
            );
            if !conditions.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&conditions.join(" AND "));
            }
            // Newest first; id tiebreak keeps the order deterministic within
            // one timestamp second.
            sql.push_str(" ORDER BY r.created_at DESC, r.id LIMIT ? OFFSET ?");
            params.push(&filter.limit);
            params.push(&filter.offset);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), map_recipe_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn recipes_by_author(&self, author_id: &str, limit: Option<i64>) -> DbResult<Vec<RecipeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, author_id, name, image, description, cooking_time, created_at
                 FROM recipes WHERE author_id = ?1
                 ORDER BY created_at DESC, id LIMIT ?2",
            )?;
            let rows = stmt
                .query_map((author_id, limit.unwrap_or(-1)), map_recipe_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_recipes_by_author(&self, author_id: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM recipes WHERE author_id = ?1",
                [author_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Batch-fetch ingredient lines for a set of recipes (joined with the
    /// catalog), avoiding per-recipe queries in list responses.
    pub fn lines_for_recipes(&self, recipe_ids: &[String]) -> DbResult<Vec<IngredientLineRow>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
                 FROM recipe_ingredients ri
                 JOIN ingredients i ON i.id = ri.ingredient_id
                 WHERE ri.recipe_id IN ({})
                 ORDER BY i.name",
                super::placeholders(recipe_ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn ToSql> =
                recipe_ids.iter().map(|id| id as &dyn ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(IngredientLineRow {
                        recipe_id: row.get(0)?,
                        ingredient_id: row.get(1)?,
                        name: row.get(2)?,
                        measurement_unit: row.get(3)?,
                        amount: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Batch-fetch tag links for a set of recipes as (recipe_id, tag) pairs.
    pub fn tags_for_recipes(&self, recipe_ids: &[String]) -> DbResult<Vec<(String, TagRow)>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
                 FROM recipe_tags rt
                 JOIN tags t ON t.id = rt.tag_id
                 WHERE rt.recipe_id IN ({})
                 ORDER BY t.name",
                super::placeholders(recipe_ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn ToSql> =
                recipe_ids.iter().map(|id| id as &dyn ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok((
                        row.get(0)?,
                        TagRow {
                            id: row.get(1)?,
                            name: row.get(2)?,
                            color: row.get(3)?,
                            slug: row.get(4)?,
                        },
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn link_tags(tx: &Transaction<'_>, recipe_id: &str, tag_ids: &[String]) -> DbResult<()> {
    for tag_id in tag_ids {
        let known: Option<String> = tx
            .query_row("SELECT id FROM tags WHERE id = ?1", [tag_id.as_str()], |row| {
                row.get(0)
            })
            .optional()?;
        if known.is_none() {
            return Err(DbError::MissingReference {
                kind: "tag",
                id: tag_id.clone(),
            });
        }

        tx.execute(
            "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)",
            (recipe_id, tag_id.as_str()),
        )?;
    }
    Ok(())
}

fn insert_lines(tx: &Transaction<'_>, recipe_id: &str, lines: &[(String, i64)]) -> DbResult<()> {
    for (ingredient_id, amount) in lines {
        let known: Option<String> = tx
            .query_row(
                "SELECT id FROM ingredients WHERE id = ?1",
                [ingredient_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Err(DbError::MissingReference {
                kind: "ingredient",
                id: ingredient_id.clone(),
            });
        }

        tx.execute(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?1, ?2, ?3)",
            (recipe_id, ingredient_id.as_str(), amount),
        )?;
    }
    Ok(())
}

fn map_recipe_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecipeRow> {
    Ok(RecipeRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        name: row.get(2)?,
        image: row.get(3)?,
        description: row.get(4)?,
        cooking_time: row.get(5)?,
        created_at: row.get(6)?,
    })
}
