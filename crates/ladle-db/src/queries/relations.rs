use std::collections::HashSet;

use rusqlite::types::ToSql;

use crate::Database;
use crate::error::{DbError, DbResult};
use crate::models::{ShoppingListRow, UserRow};

impl Database {
    // -- Favorites --

    pub fn add_favorite(&self, user_id: &str, recipe_id: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO favorites (user_id, recipe_id) VALUES (?1, ?2)",
                (user_id, recipe_id),
            )
            .map_err(|e| DbError::classify_conflict(e, "favorite"))?;
            Ok(())
        })
    }

    pub fn remove_favorite(&self, user_id: &str, recipe_id: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM favorites WHERE user_id = ?1 AND recipe_id = ?2",
                (user_id, recipe_id),
            )?;
            if affected == 0 {
                return Err(DbError::NotFound("favorite"));
            }
            Ok(())
        })
    }

    /// Which of `recipe_ids` the user has favorited.
    pub fn favorited_among(&self, user_id: &str, recipe_ids: &[String]) -> DbResult<HashSet<String>> {
        self.pair_subset("favorites", user_id, recipe_ids)
    }

    // -- Shopping cart --

    pub fn add_cart_entry(&self, user_id: &str, recipe_id: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO shopping_cart (user_id, recipe_id) VALUES (?1, ?2)",
                (user_id, recipe_id),
            )
            .map_err(|e| DbError::classify_conflict(e, "shopping cart entry"))?;
            Ok(())
        })
    }

    pub fn remove_cart_entry(&self, user_id: &str, recipe_id: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM shopping_cart WHERE user_id = ?1 AND recipe_id = ?2",
                (user_id, recipe_id),
            )?;
            if affected == 0 {
                return Err(DbError::NotFound("shopping cart entry"));
            }
            Ok(())
        })
    }

    /// Which of `recipe_ids` sit in the user's cart.
    pub fn in_cart_among(&self, user_id: &str, recipe_ids: &[String]) -> DbResult<HashSet<String>> {
        self.pair_subset("shopping_cart", user_id, recipe_ids)
    }

    /// Flatten the cart's recipes to ingredient lines, group by ingredient,
    /// and sum amounts. Joining through shopping_cart keeps the aggregation
    /// scoped to exactly the cart's recipes; SUM (not COUNT) over amounts.
    /// Ordered by ingredient name so the report is stable for a given cart.
    pub fn shopping_list(&self, user_id: &str) -> DbResult<Vec<ShoppingListRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.name, i.measurement_unit, SUM(ri.amount) AS total_amount
                 FROM shopping_cart sc
                 JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
                 JOIN ingredients i ON i.id = ri.ingredient_id
                 WHERE sc.user_id = ?1
                 GROUP BY i.id, i.name, i.measurement_unit
                 ORDER BY i.name",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ShoppingListRow {
                        name: row.get(0)?,
                        measurement_unit: row.get(1)?,
                        total_amount: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Follows --

    pub fn add_follow(&self, follower_id: &str, author_id: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO follows (follower_id, author_id) VALUES (?1, ?2)",
                (follower_id, author_id),
            )
            .map_err(|e| DbError::classify_conflict(e, "follow"))?;
            Ok(())
        })
    }

    pub fn remove_follow(&self, follower_id: &str, author_id: &str) -> DbResult<()> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND author_id = ?2",
                (follower_id, author_id),
            )?;
            if affected == 0 {
                return Err(DbError::NotFound("follow"));
            }
            Ok(())
        })
    }

    pub fn is_following(&self, follower_id: &str, author_id: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND author_id = ?2",
                (follower_id, author_id),
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Which of `author_ids` the user follows.
    pub fn following_among(&self, follower_id: &str, author_ids: &[String]) -> DbResult<HashSet<String>> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT author_id FROM follows WHERE follower_id = ? AND author_id IN ({})",
                super::placeholders(author_ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn ToSql> = vec![&follower_id];
            for id in author_ids {
                params.push(id);
            }

            let rows = stmt
                .query_map(params.as_slice(), |row| row.get::<_, String>(0))?
                .collect::<Result<HashSet<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Authors the user follows, ordered by username for stable listings.
    pub fn followed_authors(&self, follower_id: &str) -> DbResult<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.password, u.created_at
                 FROM follows f
                 JOIN users u ON u.id = f.author_id
                 WHERE f.follower_id = ?1
                 ORDER BY u.username",
            )?;

            let rows = stmt
                .query_map([follower_id], |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        first_name: row.get(3)?,
                        last_name: row.get(4)?,
                        password: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Shared shape of favorites and shopping_cart: (user_id, recipe_id)
    /// pairs with a composite primary key.
    fn pair_subset(
        &self,
        table: &str,
        user_id: &str,
        recipe_ids: &[String],
    ) -> DbResult<HashSet<String>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT recipe_id FROM {table} WHERE user_id = ? AND recipe_id IN ({})",
                super::placeholders(recipe_ids.len())
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn ToSql> = vec![&user_id];
            for id in recipe_ids {
                params.push(id);
            }

            let rows = stmt
                .query_map(params.as_slice(), |row| row.get::<_, String>(0))?
                .collect::<Result<HashSet<_>, _>>()?;

            Ok(rows)
        })
    }
}
