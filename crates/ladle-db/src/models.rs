//! Database row types mapping directly to SQLite rows. Distinct from the
//! ladle-types API models to keep the storage layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub created_at: String,
}

pub struct TagRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub slug: String,
}

pub struct IngredientRow {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
}

pub struct RecipeRow {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub image: Vec<u8>,
    pub description: String,
    pub cooking_time: i64,
    pub created_at: String,
}

/// One recipe line joined with its catalog ingredient.
pub struct IngredientLineRow {
    pub recipe_id: String,
    pub ingredient_id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// One aggregated shopping-list line: `amount` summed over every recipe in
/// the user's cart that uses the ingredient.
pub struct ShoppingListRow {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}
