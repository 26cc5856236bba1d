use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference data: a recipe tag (e.g. "breakfast"). Color is a `#RRGGBB`
/// hex string, validated at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Reference data: a catalog ingredient. Never mutated by user actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

/// A user as seen by other users. `is_subscribed` is computed against the
/// requesting identity and is always false for anonymous callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// One (ingredient, amount) line of a recipe, joined with catalog data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLine {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}
