use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ClaimStatus, FoodListing, Message, Urgency, User, UserRole};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and the auth handlers.
/// Canonical definition lives here in replate-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub organization_type: String,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Listings --

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub food_type: String,
    #[serde(default)]
    pub urgency: Urgency,
    pub expires_in: String,
    pub contact_info: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub location: Option<String>,
    pub food_type: Option<String>,
    pub urgency: Option<Urgency>,
    pub expires_in: Option<String>,
    pub contact_info: Option<String>,
    pub special_instructions: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub claim_status: ClaimStatus,
}

#[derive(Debug, Serialize)]
pub struct ListingActionResponse {
    pub message: String,
    pub listing: FoodListing,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub text: String,
    pub receiver_id: Uuid,
    pub listing_id: Uuid,
}

/// One entry in a user's inbox: a listing they have chatted on, with the
/// latest message exchanged.
#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub listing: FoodListing,
    pub last_message: Message,
}
