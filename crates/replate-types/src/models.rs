use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Provider,
    Ngo,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Provider => "provider",
            UserRole::Ngo => "ngo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "provider" => Some(UserRole::Provider),
            "ngo" => Some(UserRole::Ngo),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Urgency::Low),
            "medium" => Some(Urgency::Medium),
            "high" => Some(Urgency::High),
            _ => None,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim lifecycle of a listing. The allowed transitions between these states
/// are owned by `replate-core::transitions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Open,
    Claimed,
    Confirmed,
    InProcess,
    DeliveryPartnerAssigned,
    InTransit,
    Completed,
    Cancelled,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 8] = [
        ClaimStatus::Open,
        ClaimStatus::Claimed,
        ClaimStatus::Confirmed,
        ClaimStatus::InProcess,
        ClaimStatus::DeliveryPartnerAssigned,
        ClaimStatus::InTransit,
        ClaimStatus::Completed,
        ClaimStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "open",
            ClaimStatus::Claimed => "claimed",
            ClaimStatus::Confirmed => "confirmed",
            ClaimStatus::InProcess => "in_process",
            ClaimStatus::DeliveryPartnerAssigned => "delivery_partner_assigned",
            ClaimStatus::InTransit => "in_transit",
            ClaimStatus::Completed => "completed",
            ClaimStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|st| st.as_str() == s)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API-facing user. The password hash never leaves the database layer's row
/// type, so it cannot accidentally end up in a response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
    pub organization_type: String,
    pub address: String,
    pub description: Option<String>,
    pub is_admin: bool,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodListing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub food_type: String,
    pub urgency: Urgency,
    pub expires_in: String,
    pub contact_info: String,
    pub special_instructions: Option<String>,
    pub tags: Vec<String>,
    /// Owner; immutable for the lifetime of the listing.
    pub provider_id: Uuid,
    pub claimed_by_ngo_id: Option<Uuid>,
    pub claim_status: ClaimStatus,
    pub claimed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodListing {
    /// Invariant: a listing is open exactly when it has no claimant.
    pub fn claim_invariant_holds(&self) -> bool {
        (self.claim_status == ClaimStatus::Open) == self.claimed_by_ngo_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_status_parse_roundtrip() {
        for status in ClaimStatus::ALL {
            assert_eq!(ClaimStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ClaimStatus::parse("reopened"), None);
    }

    #[test]
    fn claim_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&ClaimStatus::DeliveryPartnerAssigned).unwrap();
        assert_eq!(json, "\"delivery_partner_assigned\"");
        let back: ClaimStatus = serde_json::from_str("\"in_transit\"").unwrap();
        assert_eq!(back, ClaimStatus::InTransit);
    }
}
