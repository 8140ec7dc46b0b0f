//! Database row types — these map directly to SQLite rows.
//! Distinct from the replate-types API models to keep the DB layer independent;
//! notably the user row carries the password hash, which the API model never does.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use replate_types::models::{ClaimStatus, FoodListing, Message, Urgency, User, UserRole};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub role: String,
    pub organization_type: String,
    pub address: String,
    pub description: Option<String>,
    pub is_admin: bool,
    pub is_verified: bool,
    pub verified_at: Option<String>,
    pub rejected_at: Option<String>,
    pub created_at: String,
}

pub struct ListingRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub food_type: String,
    pub urgency: String,
    pub expires_in: String,
    pub contact_info: String,
    pub special_instructions: Option<String>,
    pub tags: String,
    pub provider_id: String,
    pub claimed_by_ngo_id: Option<String>,
    pub claim_status: String,
    pub claimed_at: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub text: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub listing_id: String,
    pub created_at: String,
}

/// Listing read filters; every present field becomes an exact-match condition.
#[derive(Debug, Default, Clone)]
pub struct ListingFilters {
    pub location: Option<String>,
    pub urgency: Option<String>,
    pub food_type: Option<String>,
    pub provider_id: Option<String>,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            email: self.email,
            name: self.name,
            phone: self.phone,
            role: UserRole::parse(&self.role)
                .ok_or_else(|| anyhow!("Corrupt role '{}' on user '{}'", self.role, self.id))?,
            organization_type: self.organization_type,
            address: self.address,
            description: self.description,
            is_admin: self.is_admin,
            is_verified: self.is_verified,
            verified_at: self.verified_at.as_deref().map(parse_timestamp).transpose()?,
            rejected_at: self.rejected_at.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl ListingRow {
    pub fn into_listing(self) -> Result<FoodListing> {
        Ok(FoodListing {
            id: parse_uuid(&self.id)?,
            title: self.title,
            description: self.description,
            quantity: self.quantity,
            location: self.location,
            food_type: self.food_type,
            urgency: Urgency::parse(&self.urgency).ok_or_else(|| {
                anyhow!("Corrupt urgency '{}' on listing '{}'", self.urgency, self.id)
            })?,
            expires_in: self.expires_in,
            contact_info: self.contact_info,
            special_instructions: self.special_instructions,
            tags: serde_json::from_str(&self.tags)
                .map_err(|e| anyhow!("Corrupt tags on listing '{}': {}", self.id, e))?,
            provider_id: parse_uuid(&self.provider_id)?,
            claimed_by_ngo_id: self
                .claimed_by_ngo_id
                .as_deref()
                .map(parse_uuid)
                .transpose()?,
            claim_status: ClaimStatus::parse(&self.claim_status).ok_or_else(|| {
                anyhow!(
                    "Corrupt claim_status '{}' on listing '{}'",
                    self.claim_status,
                    self.id
                )
            })?,
            claimed_at: self.claimed_at.as_deref().map(parse_timestamp).transpose()?,
            is_active: self.is_active,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl MessageRow {
    pub fn into_message(self) -> Result<Message> {
        Ok(Message {
            id: parse_uuid(&self.id)?,
            text: self.text,
            sender_id: parse_uuid(&self.sender_id)?,
            receiver_id: parse_uuid(&self.receiver_id)?,
            listing_id: parse_uuid(&self.listing_id)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub fn parse_uuid(s: &str) -> Result<Uuid> {
    s.parse().map_err(|e| anyhow!("Corrupt id '{}': {}", s, e))
}

/// Timestamps are written as RFC 3339, but SQLite column defaults produce
/// "YYYY-MM-DD HH:MM:SS" without a timezone. Accept both, treating the naive
/// form as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| anyhow!("Corrupt timestamp '{}': {}", s, e))
}
