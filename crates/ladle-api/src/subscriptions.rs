use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use ladle_types::api::{RecipeSummary, SubscriptionResponse};

use crate::auth::{AppState, profile};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::recipes::summary;

#[derive(Debug, Deserialize)]
pub struct SubscriptionQuery {
    /// Truncates each author's recipe list in the response; display slicing
    /// only, never a data rule.
    pub recipes_limit: Option<i64>,
}

pub async fn subscribe(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
    axum::extract::Query(query): axum::extract::Query<SubscriptionQuery>,
) -> ApiResult<impl IntoResponse> {
    if user_id == claims.sub {
        return Err(ApiError::Validation("cannot follow yourself".into()));
    }

    let author = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    state
        .db
        .add_follow(&claims.sub.to_string(), &author.id)?;

    let response = author_response(&state, &author.id, query.recipes_limit)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .remove_follow(&claims.sub.to_string(), &user_id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}

/// Followed authors with their recipes (truncated to `recipes_limit`) and
/// total recipe counts.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    axum::extract::Query(query): axum::extract::Query<SubscriptionQuery>,
) -> ApiResult<impl IntoResponse> {
    let authors = state.db.followed_authors(&claims.sub.to_string())?;

    let mut responses = Vec::with_capacity(authors.len());
    for author in &authors {
        responses.push(author_response(&state, &author.id, query.recipes_limit)?);
    }

    Ok(Json(responses))
}

fn author_response(
    state: &AppState,
    author_id: &str,
    recipes_limit: Option<i64>,
) -> ApiResult<SubscriptionResponse> {
    let author = state
        .db
        .get_user_by_id(author_id)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let rows = state
        .db
        .recipes_by_author(author_id, recipes_limit.map(|l| l.max(0)))?;
    let recipes: Vec<RecipeSummary> = rows.iter().map(summary).collect();
    let recipes_count = state.db.count_recipes_by_author(author_id)?;

    Ok(SubscriptionResponse {
        author: profile(&author, true),
        recipes,
        recipes_count,
    })
}
