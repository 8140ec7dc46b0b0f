use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use replate_db::Database;
use replate_db::models::UserRow;
use replate_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};

use crate::error::ApiError;
use crate::{load_user, run_blocking};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Emails granted the admin flag at registration time.
    pub admin_emails: Vec<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if !req.email.contains('@') {
        return Err(ApiError::bad_request("a valid email address is required"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    run_blocking(move || {
        if state
            .db
            .get_user_by_email(&req.email)
            .map_err(ApiError::storage)?
            .is_some()
        {
            return Err(ApiError::conflict("a user with this email already exists"));
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|_| ApiError::internal())?
            .to_string();

        let is_admin = state.admin_emails.iter().any(|e| e == &req.email);
        let user_id = Uuid::new_v4();

        state
            .db
            .create_user(&UserRow {
                id: user_id.to_string(),
                email: req.email.clone(),
                password: password_hash,
                name: req.name,
                phone: req.phone,
                role: req.role.as_str().to_string(),
                organization_type: req.organization_type,
                address: req.address,
                description: req.description,
                is_admin,
                is_verified: false,
                verified_at: None,
                rejected_at: None,
                created_at: Utc::now().to_rfc3339(),
            })
            .map_err(ApiError::storage)?;

        let user = load_user(&state.db, user_id)?;
        let token = create_token(&state.jwt_secret, user_id, &user.email)
            .map_err(|_| ApiError::internal())?;

        Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
    })
    .await
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let row = state
            .db
            .get_user_by_email(&req.email)
            .map_err(ApiError::storage)?
            .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

        // Verify password
        let parsed_hash = PasswordHash::new(&row.password).map_err(|_| ApiError::internal())?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::unauthorized("invalid credentials"))?;

        let user = row.into_user().map_err(ApiError::storage)?;
        let token = create_token(&state.jwt_secret, user.id, &user.email)
            .map_err(|_| ApiError::internal())?;

        Ok(Json(AuthResponse { user, token }))
    })
    .await
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let user = load_user(&state.db, claims.sub)?;
        Ok(Json(user))
    })
    .await
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
