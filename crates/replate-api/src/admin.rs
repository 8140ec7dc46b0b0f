//! Admin NGO verification workflow: review queue, verify, reject.
//! Rejection keeps the row (marked rejected) so the decision is auditable.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use replate_db::Database;
use replate_types::api::Claims;
use replate_types::models::User;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{load_user, run_blocking};

#[derive(Debug, Deserialize)]
pub struct NgoListQuery {
    /// "pending", "verified", or "rejected"; anything else lists all NGOs.
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NgoActionResponse {
    pub message: String,
    pub ngo: User,
}

fn require_admin(db: &Database, claims: &Claims) -> Result<User, ApiError> {
    let user = load_user(db, claims.sub)?;
    if !user.is_admin {
        return Err(ApiError::forbidden("admin access required"));
    }
    Ok(user)
}

pub async fn list_ngos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NgoListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        require_admin(&state.db, &claims)?;

        let rows = state
            .db
            .list_ngos(query.status.as_deref())
            .map_err(ApiError::storage)?;
        let ngos = rows
            .into_iter()
            .map(|row| row.into_user())
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(ApiError::storage)?;
        Ok(Json(ngos))
    })
    .await
}

pub async fn verify_ngo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ngo_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let admin = require_admin(&state.db, &claims)?;

        let verified = state
            .db
            .verify_ngo(&ngo_id.to_string(), &Utc::now().to_rfc3339())
            .map_err(ApiError::storage)?;
        if !verified {
            return Err(ApiError::not_found("NGO not found"));
        }

        info!("NGO {} verified by admin {}", ngo_id, admin.id);
        let ngo = load_user(&state.db, ngo_id)?;
        Ok(Json(NgoActionResponse {
            message: "NGO verified successfully".to_string(),
            ngo,
        }))
    })
    .await
}

pub async fn reject_ngo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(ngo_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let admin = require_admin(&state.db, &claims)?;

        let rejected = state
            .db
            .reject_ngo(&ngo_id.to_string(), &Utc::now().to_rfc3339())
            .map_err(ApiError::storage)?;
        if !rejected {
            return Err(ApiError::not_found("pending NGO not found"));
        }

        info!("NGO {} rejected by admin {}", ngo_id, admin.id);
        let ngo = load_user(&state.db, ngo_id)?;
        Ok(Json(NgoActionResponse {
            message: "NGO verification rejected".to_string(),
            ngo,
        }))
    })
    .await
}
