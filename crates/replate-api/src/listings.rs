//! Listing endpoints. Handlers stay thin: fetch the caller's fresh record,
//! then delegate to the lifecycle engine, which owns every authorization and
//! transition decision.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use replate_core::lifecycle;
use replate_db::models::ListingFilters;
use replate_types::api::{
    Claims, CreateListingRequest, ListingActionResponse, UpdateListingRequest, UpdateStatusRequest,
};
use replate_types::models::Urgency;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::{load_user, run_blocking};

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub location: Option<String>,
    pub urgency: Option<Urgency>,
    pub food_type: Option<String>,
    pub provider_id: Option<Uuid>,
}

impl ListingQuery {
    fn into_filters(self) -> ListingFilters {
        ListingFilters {
            location: self.location,
            urgency: self.urgency.map(|u| u.as_str().to_string()),
            food_type: self.food_type,
            provider_id: self.provider_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let listings = lifecycle::list_listings(&state.db, &query.into_filters())?;
        Ok(Json(listings))
    })
    .await
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let listing = lifecycle::get_listing(&state.db, listing_id)?;
        Ok(Json(listing))
    })
    .await
}

pub async fn create_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let caller = load_user(&state.db, claims.sub)?;
        let listing = lifecycle::create_listing(&state.db, &caller, req)?;
        Ok((StatusCode::CREATED, Json(listing)))
    })
    .await
}

pub async fn update_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
    Json(patch): Json<UpdateListingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let caller = load_user(&state.db, claims.sub)?;
        let listing = lifecycle::update_listing(&state.db, &caller, listing_id, patch)?;
        Ok(Json(listing))
    })
    .await
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let caller = load_user(&state.db, claims.sub)?;
        lifecycle::soft_delete_listing(&state.db, &caller, listing_id)?;
        Ok(Json(DeleteResponse { success: true }))
    })
    .await
}

pub async fn claim_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let caller = load_user(&state.db, claims.sub)?;
        let listing = lifecycle::claim(&state.db, &caller, listing_id)?;
        Ok(Json(ListingActionResponse {
            message: "listing claimed successfully".to_string(),
            listing,
        }))
    })
    .await
}

pub async fn unclaim_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let caller = load_user(&state.db, claims.sub)?;
        let listing = lifecycle::unclaim(&state.db, &caller, listing_id)?;
        Ok(Json(ListingActionResponse {
            message: "listing unclaimed successfully".to_string(),
            listing,
        }))
    })
    .await
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(move || {
        let caller = load_user(&state.db, claims.sub)?;
        let listing =
            lifecycle::advance_status(&state.db, &caller, listing_id, req.claim_status)?;
        Ok(Json(ListingActionResponse {
            message: "status updated successfully".to_string(),
            listing,
        }))
    })
    .await
}
