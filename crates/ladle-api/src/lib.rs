pub mod auth;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod recipes;
pub mod subscriptions;
pub mod validate;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tracing::warn;
use uuid::Uuid;

use crate::auth::AppState;
use crate::middleware::attach_identity;

/// Assemble the full route tree. The identity middleware runs on every
/// route; handlers that mutate state demand an authenticated caller via the
/// `AuthUser` extractor, browse routes read the optional identity.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/me", get(auth::me))
        .route("/users/subscriptions", get(subscriptions::list_subscriptions))
        .route("/users/{user_id}", get(auth::get_user))
        .route(
            "/users/{user_id}/subscribe",
            post(subscriptions::subscribe).delete(subscriptions::unsubscribe),
        )
        .route("/tags", get(catalog::list_tags).post(catalog::create_tag))
        .route("/tags/{tag_id}", get(catalog::get_tag))
        .route(
            "/ingredients",
            get(catalog::list_ingredients).post(catalog::create_ingredient),
        )
        .route("/ingredients/{ingredient_id}", get(catalog::get_ingredient))
        .route(
            "/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route("/recipes/download_shopping_cart", get(cart::download))
        .route(
            "/recipes/{recipe_id}",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/{recipe_id}/favorite",
            post(recipes::favorite).delete(recipes::unfavorite),
        )
        .route(
            "/recipes/{recipe_id}/shopping_cart",
            post(cart::add_to_cart).delete(cart::remove_from_cart),
        )
        .layer(from_fn_with_state(state.clone(), attach_identity))
        .with_state(state)
}

/// Parse a stored uuid, logging and falling back to the nil uuid on corrupt
/// rows rather than failing the whole response.
pub(crate) fn parse_uuid(value: &str, context: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", context, value, e);
        Uuid::default()
    })
}
