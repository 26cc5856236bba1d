mod catalog;
mod recipes;
mod relations;
mod users;

pub use recipes::{NewRecipe, RecipeChanges, RecipeFilter, ScopedFilter};

/// Build a `?, ?, ...` placeholder list for an IN clause.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
