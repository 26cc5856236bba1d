use rusqlite::Connection;
use tracing::info;

use crate::error::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE COLLATE NOCASE,
            email       TEXT NOT NULL,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS tags (
            id      TEXT PRIMARY KEY,
            name    TEXT NOT NULL UNIQUE,
            color   TEXT NOT NULL,
            slug    TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS ingredients (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL UNIQUE,
            measurement_unit    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_ingredients_name
            ON ingredients(name);

        CREATE TABLE IF NOT EXISTS recipes (
            id              TEXT PRIMARY KEY,
            author_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name            TEXT NOT NULL,
            image           BLOB NOT NULL,
            description     TEXT NOT NULL DEFAULT '',
            cooking_time    INTEGER NOT NULL CHECK (cooking_time > 0),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(author_id, name)
        );

        CREATE INDEX IF NOT EXISTS idx_recipes_author
            ON recipes(author_id, created_at);

        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            recipe_id       TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            ingredient_id   TEXT NOT NULL REFERENCES ingredients(id),
            amount          INTEGER NOT NULL CHECK (amount > 0),
            PRIMARY KEY (recipe_id, ingredient_id)
        );

        CREATE TABLE IF NOT EXISTS recipe_tags (
            recipe_id   TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            tag_id      TEXT NOT NULL REFERENCES tags(id),
            PRIMARY KEY (recipe_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS follows (
            follower_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            author_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (follower_id, author_id),
            CHECK (follower_id <> author_id)
        );

        CREATE TABLE IF NOT EXISTS favorites (
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            recipe_id   TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, recipe_id)
        );

        CREATE TABLE IF NOT EXISTS shopping_cart (
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            recipe_id   TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, recipe_id)
        );

        -- Seed the stock tags
        INSERT OR IGNORE INTO tags (id, name, color, slug) VALUES
            ('00000000-0000-0000-0000-000000000001', 'breakfast', '#E26C2D', 'breakfast'),
            ('00000000-0000-0000-0000-000000000002', 'lunch', '#49B64E', 'lunch'),
            ('00000000-0000-0000-0000-000000000003', 'dinner', '#8775D2', 'dinner');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
