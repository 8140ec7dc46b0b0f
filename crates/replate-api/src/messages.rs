//! Per-listing chat endpoints, gated by the conversation access filter.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use replate_core::conversation;
use replate_types::api::{Claims, SendMessageRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{load_user, run_blocking};

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub other_user_id: Uuid,
}

pub async fn get_listing_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
    Query(query): Query<ConversationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let messages = conversation::list_participant_messages(
            &state.db,
            claims.sub,
            listing_id,
            query.other_user_id,
        )?;
        Ok(Json(messages))
    })
    .await
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let caller = load_user(&state.db, claims.sub)?;
        let message = conversation::append_message(
            &state.db,
            &caller,
            req.receiver_id,
            req.listing_id,
            req.text,
        )?;
        Ok((StatusCode::CREATED, Json(message)))
    })
    .await
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let conversations = conversation::list_conversations(&state.db, claims.sub)?;
        Ok(Json(conversations))
    })
    .await
}
