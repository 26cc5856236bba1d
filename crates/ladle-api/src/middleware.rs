use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{DecodingKey, Validation, decode};

use ladle_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// Identity attached to every request by `attach_identity`. `None` means an
/// anonymous caller.
#[derive(Debug, Clone)]
pub struct MaybeClaims(pub Option<Claims>);

/// Authenticated identity. Rejects the request with 401 when no valid
/// bearer token was presented.
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let MaybeClaims(claims) = parts
            .extensions
            .get::<MaybeClaims>()
            .cloned()
            .ok_or(ApiError::AuthenticationRequired)?;

        claims.map(AuthUser).ok_or(ApiError::AuthenticationRequired)
    }
}

/// Decode the bearer JWT when one is present and stash the result as a
/// request extension. Anonymous requests pass through; a token that is
/// present but invalid is rejected outright.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(&state, &req)?;
    req.extensions_mut().insert(MaybeClaims(claims));
    Ok(next.run(req).await)
}

fn bearer_claims(state: &AppState, req: &Request) -> Result<Option<Claims>, ApiError> {
    let Some(auth_header) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(None);
    };

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::AuthenticationRequired)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::AuthenticationRequired)?;

    Ok(Some(token_data.claims))
}
