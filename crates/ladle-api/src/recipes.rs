use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::{error, warn};
use uuid::Uuid;

use ladle_db::models::RecipeRow;
use ladle_db::queries::{NewRecipe, RecipeChanges};
use ladle_types::api::{
    Claims, CreateRecipeRequest, IngredientLineRequest, RecipeResponse, RecipeSummary,
    UpdateRecipeRequest,
};
use ladle_types::models::{IngredientLine, Tag, UserProfile};

use crate::auth::{AppState, profile};
use crate::error::{ApiError, ApiResult};
use crate::filters::{RecipeListQuery, build_filter};
use crate::middleware::{AuthUser, MaybeClaims};
use crate::{catalog, validate};

pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(MaybeClaims(claims)): Extension<MaybeClaims>,
    axum_extra::extract::Query(query): axum_extra::extract::Query<RecipeListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = build_filter(query, claims.as_ref())?;

    // Run blocking DB work off the async runtime
    let db_state = state.clone();
    let responses = tokio::task::spawn_blocking(move || {
        let rows = db_state.db.list_recipes(&filter)?;
        build_responses(&db_state, rows, claims.as_ref())
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("join error: {e}"))
    })??;

    Ok(Json(responses))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Extension(MaybeClaims(claims)): Extension<MaybeClaims>,
) -> ApiResult<impl IntoResponse> {
    let row = state
        .db
        .get_recipe(&recipe_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;

    let mut responses = build_responses(&state, vec![row], claims.as_ref())?;
    let response = responses
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("recipe response vanished")))?;

    Ok(Json(response))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<impl IntoResponse> {
    validate::recipe_name(&req.name)?;
    validate::cooking_time(req.cooking_time)?;
    validate::tag_set(&req.tags)?;
    validate::ingredient_lines(&req.ingredients)?;

    let image = B64
        .decode(&req.image)
        .map_err(|_| ApiError::Validation("image must be base64-encoded".into()))?;

    let recipe_id = Uuid::new_v4();
    let tag_ids = uuid_strings(&req.tags);
    let lines = line_pairs(&req.ingredients);

    state.db.create_recipe(&NewRecipe {
        id: &recipe_id.to_string(),
        author_id: &claims.sub.to_string(),
        name: req.name.trim(),
        image: &image,
        description: &req.text,
        cooking_time: req.cooking_time,
        tag_ids: &tag_ids,
        lines: &lines,
    })?;

    let response = reload(&state, recipe_id, &claims)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
    Json(req): Json<UpdateRecipeRequest>,
) -> ApiResult<impl IntoResponse> {
    require_author(&state, recipe_id, &claims)?;

    if let Some(name) = &req.name {
        validate::recipe_name(name)?;
    }
    if let Some(minutes) = req.cooking_time {
        validate::cooking_time(minutes)?;
    }
    if let Some(tags) = &req.tags {
        validate::tag_set(tags)?;
    }
    if let Some(lines) = &req.ingredients {
        validate::ingredient_lines(lines)?;
    }

    let image = match &req.image {
        Some(encoded) => Some(
            B64.decode(encoded)
                .map_err(|_| ApiError::Validation("image must be base64-encoded".into()))?,
        ),
        None => None,
    };

    let tag_ids = req.tags.as_deref().map(uuid_strings);
    let lines = req.ingredients.as_deref().map(line_pairs);

    state.db.update_recipe(
        &recipe_id.to_string(),
        &RecipeChanges {
            name: req.name.as_deref().map(str::trim),
            image: image.as_deref(),
            description: req.text.as_deref(),
            cooking_time: req.cooking_time,
            tag_ids: tag_ids.as_deref(),
            lines: lines.as_deref(),
        },
    )?;

    let response = reload(&state, recipe_id, &claims)?;
    Ok(Json(response))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> ApiResult<impl IntoResponse> {
    require_author(&state, recipe_id, &claims)?;
    state.db.delete_recipe(&recipe_id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Favorites --

pub async fn favorite(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let row = state
        .db
        .get_recipe(&recipe_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;

    state
        .db
        .add_favorite(&claims.sub.to_string(), &row.id)?;

    Ok((StatusCode::CREATED, Json(summary(&row))))
}

pub async fn unfavorite(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .remove_favorite(&claims.sub.to_string(), &recipe_id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Response assembly --

/// Build full responses for a page of recipes, batch-fetching lines, tags,
/// authors, and the caller's favorite/cart/follow relations to avoid
/// per-recipe queries.
pub fn build_responses(
    state: &AppState,
    rows: Vec<RecipeRow>,
    claims: Option<&Claims>,
) -> ApiResult<Vec<RecipeResponse>> {
    let recipe_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let author_ids: Vec<String> = rows.iter().map(|r| r.author_id.clone()).collect();

    let line_rows = state.db.lines_for_recipes(&recipe_ids)?;
    let tag_rows = state.db.tags_for_recipes(&recipe_ids)?;
    let authors = state.db.users_by_ids(&author_ids)?;

    let (favorited, in_cart, following) = match claims {
        Some(claims) => {
            let user_id = claims.sub.to_string();
            (
                state.db.favorited_among(&user_id, &recipe_ids)?,
                state.db.in_cart_among(&user_id, &recipe_ids)?,
                state.db.following_among(&user_id, &author_ids)?,
            )
        }
        None => Default::default(),
    };

    let mut lines_map: HashMap<String, Vec<IngredientLine>> = HashMap::new();
    for line in line_rows {
        lines_map
            .entry(line.recipe_id.clone())
            .or_default()
            .push(IngredientLine {
                id: crate::parse_uuid(&line.ingredient_id, "ingredient id"),
                name: line.name,
                measurement_unit: line.measurement_unit,
                amount: line.amount,
            });
    }

    let mut tags_map: HashMap<String, Vec<Tag>> = HashMap::new();
    for (recipe_id, tag) in tag_rows {
        tags_map
            .entry(recipe_id)
            .or_default()
            .push(catalog::tag_from_row(&tag));
    }

    let profiles: HashMap<String, UserProfile> = authors
        .iter()
        .map(|u| (u.id.clone(), profile(u, following.contains(&u.id))))
        .collect();

    let responses = rows
        .into_iter()
        .map(|row| {
            let author = profiles.get(&row.author_id).cloned().unwrap_or_else(|| {
                warn!("Recipe '{}' has no author row '{}'", row.id, row.author_id);
                UserProfile {
                    id: Uuid::default(),
                    username: "unknown".into(),
                    email: String::new(),
                    first_name: String::new(),
                    last_name: String::new(),
                    is_subscribed: false,
                }
            });

            RecipeResponse {
                id: crate::parse_uuid(&row.id, "recipe id"),
                author,
                name: row.name,
                image: B64.encode(&row.image),
                text: row.description,
                cooking_time: row.cooking_time,
                tags: tags_map.remove(&row.id).unwrap_or_default(),
                ingredients: lines_map.remove(&row.id).unwrap_or_default(),
                is_favorited: favorited.contains(&row.id),
                is_in_shopping_cart: in_cart.contains(&row.id),
                created_at: parse_created_at(&row.created_at, &row.id),
            }
        })
        .collect();

    Ok(responses)
}

pub fn summary(row: &RecipeRow) -> RecipeSummary {
    RecipeSummary {
        id: crate::parse_uuid(&row.id, "recipe id"),
        name: row.name.clone(),
        image: B64.encode(&row.image),
        cooking_time: row.cooking_time,
    }
}

fn require_author(state: &AppState, recipe_id: Uuid, claims: &Claims) -> ApiResult<RecipeRow> {
    let row = state
        .db
        .get_recipe(&recipe_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("recipe not found".into()))?;

    if row.author_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden(
            "only the author may modify a recipe".into(),
        ));
    }

    Ok(row)
}

fn reload(state: &AppState, recipe_id: Uuid, claims: &Claims) -> ApiResult<RecipeResponse> {
    let row = state
        .db
        .get_recipe(&recipe_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("recipe vanished after write")))?;

    let mut responses = build_responses(state, vec![row], Some(claims))?;
    responses
        .pop()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("recipe response vanished")))
}

fn uuid_strings(ids: &[Uuid]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn line_pairs(lines: &[IngredientLineRequest]) -> Vec<(String, i64)> {
    lines
        .iter()
        .map(|line| (line.id.to_string(), line.amount))
        .collect()
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC and convert, tolerating RFC 3339 as well.
fn parse_created_at(value: &str, recipe_id: &str) -> chrono::DateTime<chrono::Utc> {
    value
        .parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!(
                "Corrupt created_at '{}' on recipe '{}': {}",
                value, recipe_id, e
            );
            chrono::DateTime::default()
        })
}
