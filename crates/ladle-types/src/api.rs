use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{IngredientLine, Tag, UserProfile};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and token issuance.
/// Canonical definition lives here in ladle-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Catalog --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub measurement_unit: String,
}

// -- Recipes --

/// One submitted (ingredient, amount) pair. Catalog name and unit are
/// resolved server-side.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngredientLineRequest {
    pub id: Uuid,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRecipeRequest {
    pub name: String,
    /// Base64-encoded image payload.
    pub image: String,
    #[serde(default)]
    pub text: String,
    pub cooking_time: i64,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<IngredientLineRequest>,
}

/// PATCH body. Omitted fields keep their stored value; `tags` and
/// `ingredients`, when present, replace the whole set (never merged).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<IngredientLineRequest>>,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub author: UserProfile,
    pub name: String,
    /// Base64-encoded image payload.
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<IngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Short recipe form used in favorite/cart confirmations and subscription
/// listings.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

// -- Subscriptions --

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}
