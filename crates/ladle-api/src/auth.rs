use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use ladle_db::Database;
use ladle_db::models::UserRow;
use ladle_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use ladle_types::models::UserProfile;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, MaybeClaims};
use crate::validate;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate::username(&req.username)?;
    validate::password(&req.password)?;
    if !req.email.contains('@') {
        return Err(ApiError::Validation("invalid email address".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?
        .to_string();

    let user_id = Uuid::new_v4();

    state.db.create_user(
        &user_id.to_string(),
        &req.username,
        &req.email,
        &req.first_name,
        &req.last_name,
        &password_hash,
    )?;

    let token = create_token(&state.jwt_secret, user_id, &req.username)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}': {e}", user.id)))?;

    let token = create_token(&state.jwt_secret, user_id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    Ok(Json(profile(&user, false)))
}

/// Public profile. `is_subscribed` reflects the requesting identity when one
/// is attached.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(MaybeClaims(claims)): Extension<MaybeClaims>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let is_subscribed = match &claims {
        Some(claims) => state
            .db
            .is_following(&claims.sub.to_string(), &user.id)?,
        None => false,
    };

    Ok(Json(profile(&user, is_subscribed)))
}

pub fn profile(user: &UserRow, is_subscribed: bool) -> UserProfile {
    UserProfile {
        id: crate::parse_uuid(&user.id, "user id"),
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed,
    }
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> ApiResult<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("token encoding failed: {e}")))?;

    Ok(token)
}
