use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use barter_core::{AdService, ExchangeEngine, TransitionPolicy};
use barter_db::{Database, is_unique_violation};
use barter_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use barter_types::models::User;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub engine: ExchangeEngine<Database>,
    pub ads: AdService<Database>,
    pub jwt_secret: String,
    pub token_days: i64,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, policy: TransitionPolicy, jwt_secret: String, token_days: i64) -> AppState {
        Arc::new(Self {
            engine: ExchangeEngine::new(db.clone(), policy),
            ads: AdService::new(db.clone()),
            db,
            jwt_secret,
            token_days,
        })
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Check if username is taken
    if state
        .db
        .get_user_by_username(&req.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        return Err(StatusCode::CONFLICT);
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(&user_id.to_string(), &req.username, &password_hash)
        .map_err(|e| {
            // Lost a race with another registration of the same name
            if is_unique_violation(&e) {
                return StatusCode::CONFLICT;
            }
            error!("Failed to create user {}: {}", req.username, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let token = create_token(&state.jwt_secret, user_id, &req.username, state.token_days)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    info!("Registered user {} ({})", req.username, user_id);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user_id, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = state
        .db
        .get_user_by_username(&req.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Verify password
    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let user_id: Uuid = user.id.parse().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let token = create_token(&state.jwt_secret, user_id, &user.username, state.token_days)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        token,
    }))
}

/// The signed-in account.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, StatusCode> {
    let row = state
        .db
        .get_user_by_id(&claims.sub.to_string())
        .map_err(|e| {
            error!("Failed to load user {}: {}", claims.sub, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let user = row.into_user().map_err(|e| {
        error!("Corrupt user row {}: {:#}", claims.sub, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(user))
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str, days: i64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(days)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
