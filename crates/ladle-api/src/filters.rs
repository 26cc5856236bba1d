use serde::Deserialize;
use uuid::Uuid;

use ladle_db::queries::{RecipeFilter, ScopedFilter};
use ladle_types::api::Claims;

use crate::error::{ApiError, ApiResult};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// Query parameters of GET /recipes. `tags` may repeat
/// (`?tags=lunch&tags=dinner`), which is why the handler uses
/// axum-extra's Query extractor.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub author: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Resolve query parameters against the caller's identity. Identity-scoped
/// filters from an anonymous caller are an authentication error, not a
/// validation error.
pub fn build_filter(query: RecipeListQuery, claims: Option<&Claims>) -> ApiResult<RecipeFilter> {
    let mut scoped = Vec::new();

    if let Some(value) = query.is_favorited {
        let claims = claims.ok_or(ApiError::AuthenticationRequired)?;
        scoped.push(ScopedFilter::Favorited {
            user_id: claims.sub.to_string(),
            value,
        });
    }

    if let Some(value) = query.is_in_shopping_cart {
        let claims = claims.ok_or(ApiError::AuthenticationRequired)?;
        scoped.push(ScopedFilter::InShoppingCart {
            user_id: claims.sub.to_string(),
            value,
        });
    }

    Ok(RecipeFilter {
        author_id: query.author.map(|id| id.to_string()),
        tag_slugs: query.tags,
        scoped,
        limit: query.limit.min(MAX_LIMIT) as i64,
        offset: query.offset as i64,
    })
}
