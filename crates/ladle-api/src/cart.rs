use std::fmt::Write as _;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

use ladle_db::models::ShoppingListRow;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::recipes::summary;

pub async fn add_to_cart(
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
        .add_cart_entry(&claims.sub.to_string(), &row.id)?;

    Ok((StatusCode::CREATED, Json(summary(&row))))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    AuthUser(claims): AuthUser,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .remove_cart_entry(&claims.sub.to_string(), &recipe_id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /recipes/download_shopping_cart — the aggregated shopping list as a
/// plain-text attachment. Pure read; downloading twice without cart changes
/// yields the same bytes.
pub async fn download(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();

    // Run blocking DB aggregation off the async runtime
    let db_state = state.clone();
    let items = tokio::task::spawn_blocking(move || db_state.db.shopping_list(&user_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("join error: {e}"))
        })??;

    let filename = format!("{}_shopping_cart.txt", claims.username);
    let body = render_shopping_list(&items);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    ))
}

fn render_shopping_list(items: &[ShoppingListRow]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{}: {} {}",
            item.name, item.total_amount, item.measurement_unit
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shopping_list_renders_one_line_per_ingredient() {
        let items = vec![
            ShoppingListRow {
                name: "egg".into(),
                measurement_unit: "pcs".into(),
                total_amount: 2,
            },
            ShoppingListRow {
                name: "flour".into(),
                measurement_unit: "g".into(),
                total_amount: 300,
            },
        ];

        assert_eq!(render_shopping_list(&items), "egg: 2 pcs\nflour: 300 g\n");
    }

    #[test]
    fn empty_cart_renders_empty_report() {
        assert_eq!(render_shopping_list(&[]), "");
    }
}
