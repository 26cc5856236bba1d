use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use ladle_db::models::{IngredientRow, TagRow};
use ladle_types::api::{CreateIngredientRequest, CreateTagRequest};
use ladle_types::models::{Ingredient, Tag};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Prefix search on the ingredient name.
    pub name: Option<String>,
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let rows = state.db.list_tags()?;
    let tags: Vec<Tag> = rows.iter().map(tag_from_row).collect();
    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let row = state
        .db
        .get_tag(&tag_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("tag not found".into()))?;

    Ok(Json(tag_from_row(&row)))
}

/// Reference data is normally loaded by operators; this endpoint stands in
/// for that import path and is open to any authenticated user.
pub async fn create_tag(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(req): Json<CreateTagRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() || req.slug.trim().is_empty() {
        return Err(ApiError::Validation("tag name and slug are required".into()));
    }
    validate::hex_color(&req.color)?;

    let id = Uuid::new_v4();
    state
        .db
        .insert_tag(&id.to_string(), &req.name, &req.color, &req.slug)?;

    Ok((
        StatusCode::CREATED,
        Json(Tag {
            id,
            name: req.name,
            color: req.color,
            slug: req.slug,
        }),
    ))
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.db.list_ingredients(query.name.as_deref())?;
    let ingredients: Vec<Ingredient> = rows.iter().map(ingredient_from_row).collect();
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let row = state
        .db
        .get_ingredient(&ingredient_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("ingredient not found".into()))?;

    Ok(Json(ingredient_from_row(&row)))
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Json(req): Json<CreateIngredientRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() || req.measurement_unit.trim().is_empty() {
        return Err(ApiError::Validation(
            "ingredient name and measurement_unit are required".into(),
        ));
    }

    let id = Uuid::new_v4();
    state
        .db
        .insert_ingredient(&id.to_string(), &req.name, &req.measurement_unit)?;

    Ok((
        StatusCode::CREATED,
        Json(Ingredient {
            id,
            name: req.name,
            measurement_unit: req.measurement_unit,
        }),
    ))
}

pub fn tag_from_row(row: &TagRow) -> Tag {
    Tag {
        id: crate::parse_uuid(&row.id, "tag id"),
        name: row.name.clone(),
        color: row.color.clone(),
        slug: row.slug.clone(),
    }
}

fn ingredient_from_row(row: &IngredientRow) -> Ingredient {
    Ingredient {
        id: crate::parse_uuid(&row.id, "ingredient id"),
        name: row.name.clone(),
        measurement_unit: row.measurement_unit.clone(),
    }
}
