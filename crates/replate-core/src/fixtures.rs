//! Shared test fixtures for the lifecycle core.

use chrono::Utc;
use uuid::Uuid;

use replate_db::Database;
use replate_db::models::UserRow;
use replate_types::api::CreateListingRequest;
use replate_types::models::{ClaimStatus, FoodListing, Urgency, User, UserRole};

pub fn provider() -> User {
    user(UserRole::Provider, false, false)
}

pub fn verified_ngo() -> User {
    user(UserRole::Ngo, true, false)
}

pub fn unverified_ngo() -> User {
    user(UserRole::Ngo, false, false)
}

pub fn admin() -> User {
    user(UserRole::Provider, false, true)
}

fn user(role: UserRole, is_verified: bool, is_admin: bool) -> User {
    let id = Uuid::new_v4();
    User {
        id,
        email: format!("{}@example.org", id.simple()),
        name: "Test User".to_string(),
        phone: "555-0100".to_string(),
        role,
        organization_type: match role {
            UserRole::Provider => "restaurant".to_string(),
            UserRole::Ngo => "food bank".to_string(),
        },
        address: "1 Main St".to_string(),
        description: None,
        is_admin,
        is_verified,
        verified_at: None,
        rejected_at: None,
        created_at: Utc::now(),
    }
}

/// An open, active listing owned by `provider`, not yet persisted.
pub fn listing(provider: &User) -> FoodListing {
    let now = Utc::now();
    FoodListing {
        id: Uuid::new_v4(),
        title: "Surplus trays from lunch service".to_string(),
        description: "20 trays of cooked rice and vegetables".to_string(),
        quantity: "20 trays".to_string(),
        location: "Midtown".to_string(),
        food_type: "cooked meal".to_string(),
        urgency: Urgency::High,
        expires_in: "4 hours".to_string(),
        contact_info: "555-0100".to_string(),
        special_instructions: None,
        tags: vec!["vegetarian".to_string()],
        provider_id: provider.id,
        claimed_by_ngo_id: None,
        claim_status: ClaimStatus::Open,
        claimed_at: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn listing_request() -> CreateListingRequest {
    CreateListingRequest {
        title: "Surplus trays from lunch service".to_string(),
        description: "20 trays of cooked rice and vegetables".to_string(),
        quantity: "20 trays".to_string(),
        location: "Midtown".to_string(),
        food_type: "cooked meal".to_string(),
        urgency: Urgency::High,
        expires_in: "4 hours".to_string(),
        contact_info: "555-0100".to_string(),
        special_instructions: None,
        tags: vec!["vegetarian".to_string()],
    }
}

/// Persists a user model so engine operations can reference it.
pub fn seed_user(db: &Database, user: &User) {
    db.create_user(&UserRow {
        id: user.id.to_string(),
        email: user.email.clone(),
        password: "argon2-hash".to_string(),
        name: user.name.clone(),
        phone: user.phone.clone(),
        role: user.role.as_str().to_string(),
        organization_type: user.organization_type.clone(),
        address: user.address.clone(),
        description: user.description.clone(),
        is_admin: user.is_admin,
        is_verified: user.is_verified,
        verified_at: None,
        rejected_at: None,
        created_at: user.created_at.to_rfc3339(),
    })
    .expect("seed user");
}
