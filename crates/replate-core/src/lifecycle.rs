//! Listing lifecycle engine: creation, edits, soft delete, atomic claiming,
//! administrative unclaim, and status progression against the transition
//! table. Every operation re-checks authorization against freshly fetched
//! records before persisting.

use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use replate_db::Database;
use replate_db::models::{ListingFilters, ListingRow};
use replate_types::api::{CreateListingRequest, UpdateListingRequest};
use replate_types::models::{ClaimStatus, FoodListing, User};

use crate::error::CoreError;
use crate::{guard, transitions};

/// Looks up an active listing. Soft-deleted and missing rows are both
/// reported as NotFound; the row itself is retained for audit either way.
pub fn get_listing(db: &Database, listing_id: Uuid) -> Result<FoodListing, CoreError> {
    match db.get_listing(&listing_id.to_string())? {
        Some(row) if row.is_active => Ok(row.into_listing()?),
        _ => Err(CoreError::NotFound("listing")),
    }
}

pub fn list_listings(db: &Database, filters: &ListingFilters) -> Result<Vec<FoodListing>, CoreError> {
    let rows = db.list_listings(filters)?;
    let listings = rows
        .into_iter()
        .map(|row| row.into_listing())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(listings)
}

pub fn create_listing(
    db: &Database,
    caller: &User,
    req: CreateListingRequest,
) -> Result<FoodListing, CoreError> {
    guard::can_create_listing(caller)?;

    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    db.insert_listing(&ListingRow {
        id: id.to_string(),
        title: req.title,
        description: req.description,
        quantity: req.quantity,
        location: req.location,
        food_type: req.food_type,
        urgency: req.urgency.as_str().to_string(),
        expires_in: req.expires_in,
        contact_info: req.contact_info,
        special_instructions: req.special_instructions,
        tags: encode_tags(&req.tags)?,
        provider_id: caller.id.to_string(),
        claimed_by_ngo_id: None,
        claim_status: ClaimStatus::Open.as_str().to_string(),
        claimed_at: None,
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
    })?;

    debug!("listing {} created by provider {}", id, caller.id);
    get_listing(db, id)
}

/// Applies a partial edit. Listings are only editable while open; once an NGO
/// has claimed, the record is frozen apart from claim-state changes.
pub fn update_listing(
    db: &Database,
    caller: &User,
    listing_id: Uuid,
    patch: UpdateListingRequest,
) -> Result<FoodListing, CoreError> {
    let listing = get_listing(db, listing_id)?;
    guard::can_mutate_listing(caller, &listing)?;
    require_open(&listing)?;

    let tags = match &patch.tags {
        Some(tags) => encode_tags(tags)?,
        None => encode_tags(&listing.tags)?,
    };
    let updated = ListingRow {
        id: listing.id.to_string(),
        title: patch.title.unwrap_or(listing.title),
        description: patch.description.unwrap_or(listing.description),
        quantity: patch.quantity.unwrap_or(listing.quantity),
        location: patch.location.unwrap_or(listing.location),
        food_type: patch.food_type.unwrap_or(listing.food_type),
        urgency: patch.urgency.unwrap_or(listing.urgency).as_str().to_string(),
        expires_in: patch.expires_in.unwrap_or(listing.expires_in),
        contact_info: patch.contact_info.unwrap_or(listing.contact_info),
        special_instructions: patch.special_instructions.or(listing.special_instructions),
        tags,
        provider_id: listing.provider_id.to_string(),
        claimed_by_ngo_id: None,
        claim_status: listing.claim_status.as_str().to_string(),
        claimed_at: None,
        is_active: listing.is_active,
        created_at: listing.created_at.to_rfc3339(),
        updated_at: Utc::now().to_rfc3339(),
    };
    if !db.update_listing(&updated)? {
        return Err(CoreError::NotFound("listing"));
    }
    get_listing(db, listing_id)
}

/// Soft delete: flips is_active so the row vanishes from reads but stays for
/// audit. Same open-only policy as edits.
pub fn soft_delete_listing(
    db: &Database,
    caller: &User,
    listing_id: Uuid,
) -> Result<(), CoreError> {
    let listing = get_listing(db, listing_id)?;
    guard::can_mutate_listing(caller, &listing)?;
    require_open(&listing)?;

    if !db.soft_delete_listing(&listing_id.to_string(), &Utc::now().to_rfc3339())? {
        return Err(CoreError::NotFound("listing"));
    }
    info!("listing {} soft-deleted by {}", listing_id, caller.id);
    Ok(())
}

/// Atomic claim acquisition. The store-side compare-and-swap on
/// `claim_status = 'open'` guarantees that of two racing claimants exactly
/// one observes a successful write; the loser gets ClaimConflict.
pub fn claim(db: &Database, caller: &User, listing_id: Uuid) -> Result<FoodListing, CoreError> {
    // Role and verification are rejected before the store is ever touched.
    guard::can_claim(caller)?;

    let now = Utc::now().to_rfc3339();
    let won = db.claim_listing(&listing_id.to_string(), &caller.id.to_string(), &now)?;
    if won {
        info!("listing {} claimed by NGO {}", listing_id, caller.id);
        return get_listing(db, listing_id);
    }

    // Zero rows changed: either the row is gone/inactive, or someone else
    // holds the claim. Re-read to tell the two apart.
    match db.get_listing(&listing_id.to_string())? {
        Some(row) if row.is_active => Err(CoreError::ClaimConflict),
        _ => Err(CoreError::NotFound("listing")),
    }
}

/// Administrative reset to open. Deliberately bypasses the transition table:
/// this is the recovery override for admins and claimants backing out, not a
/// forward progression.
pub fn unclaim(db: &Database, caller: &User, listing_id: Uuid) -> Result<FoodListing, CoreError> {
    let listing = get_listing(db, listing_id)?;
    guard::can_unclaim(caller, &listing)?;

    if !db.unclaim_listing(&listing_id.to_string(), &Utc::now().to_rfc3339())? {
        return Err(CoreError::NotFound("listing"));
    }
    info!("listing {} unclaimed by {}", listing_id, caller.id);
    get_listing(db, listing_id)
}

/// Moves a claimed listing forward (or to cancelled) per the transition
/// table. The current status is re-read immediately before validation so the
/// decision is never made on stale state.
pub fn advance_status(
    db: &Database,
    caller: &User,
    listing_id: Uuid,
    requested: ClaimStatus,
) -> Result<FoodListing, CoreError> {
    let listing = get_listing(db, listing_id)?;
    guard::can_update_status(caller, &listing)?;
    transitions::check(listing.claim_status, requested)?;

    let updated = db.set_listing_status(
        &listing_id.to_string(),
        requested.as_str(),
        &Utc::now().to_rfc3339(),
    )?;
    if !updated {
        return Err(CoreError::NotFound("listing"));
    }
    debug!(
        "listing {} advanced {} -> {} by {}",
        listing_id, listing.claim_status, requested, caller.id
    );
    get_listing(db, listing_id)
}

fn require_open(listing: &FoodListing) -> Result<(), CoreError> {
    if listing.claim_status == ClaimStatus::Open {
        Ok(())
    } else {
        Err(CoreError::Forbidden)
    }
}

fn encode_tags(tags: &[String]) -> Result<String, CoreError> {
    serde_json::to_string(tags)
        .map_err(|e| CoreError::Storage(anyhow!("failed to encode tags: {}", e)))
}
