//! Authorization predicates, consolidated so every entry point enforces the
//! same rules. All checks are pure evaluations of already-fetched records;
//! nothing here touches storage.

use replate_types::models::{FoodListing, User, UserRole};
use uuid::Uuid;

use crate::error::CoreError;

/// Only providers create listings.
pub fn can_create_listing(user: &User) -> Result<(), CoreError> {
    if user.role == UserRole::Provider {
        Ok(())
    } else {
        Err(CoreError::Forbidden)
    }
}

/// Edit/delete: the owning provider, or an admin. The open-only edit policy
/// is enforced separately by the lifecycle engine.
pub fn can_mutate_listing(user: &User, listing: &FoodListing) -> Result<(), CoreError> {
    if user.is_admin || user.id == listing.provider_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden)
    }
}

/// Claiming requires a verified NGO. Checked before any store access, and the
/// unverified case is reported distinctly from a plain role mismatch.
pub fn can_claim(user: &User) -> Result<(), CoreError> {
    if user.role != UserRole::Ngo {
        return Err(CoreError::Forbidden);
    }
    if !user.is_verified {
        return Err(CoreError::VerificationRequired);
    }
    Ok(())
}

/// Unclaiming: the current claimant, or an admin (recovery path).
pub fn can_unclaim(user: &User, listing: &FoodListing) -> Result<(), CoreError> {
    if user.is_admin || listing.claimed_by_ngo_id == Some(user.id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden)
    }
}

/// Status progression uses the same predicate as unclaim.
pub fn can_update_status(user: &User, listing: &FoodListing) -> Result<(), CoreError> {
    can_unclaim(user, listing)
}

/// Sending: both parties must be the listing's provider or current claimant,
/// and distinct from each other.
pub fn can_send_message(
    listing: &FoodListing,
    sender_id: Uuid,
    receiver_id: Uuid,
) -> Result<(), CoreError> {
    if sender_id == receiver_id {
        return Err(CoreError::InvalidParticipants);
    }
    if !is_participant(listing, sender_id) || !is_participant(listing, receiver_id) {
        return Err(CoreError::InvalidParticipants);
    }
    Ok(())
}

/// Reading: current participants, plus anyone with prior messages on the
/// listing so conversation history survives an unclaim/reclaim cycle.
pub fn can_read_conversation(
    user_id: Uuid,
    listing: &FoodListing,
    has_prior_messages: bool,
) -> Result<(), CoreError> {
    if is_participant(listing, user_id) || has_prior_messages {
        Ok(())
    } else {
        Err(CoreError::Forbidden)
    }
}

fn is_participant(listing: &FoodListing, user_id: Uuid) -> bool {
    user_id == listing.provider_id || listing.claimed_by_ngo_id == Some(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn only_providers_create_listings() {
        assert!(can_create_listing(&fixtures::provider()).is_ok());
        assert!(matches!(
            can_create_listing(&fixtures::verified_ngo()),
            Err(CoreError::Forbidden)
        ));
    }

    #[test]
    fn claim_requires_verified_ngo() {
        assert!(can_claim(&fixtures::verified_ngo()).is_ok());
        assert!(matches!(
            can_claim(&fixtures::unverified_ngo()),
            Err(CoreError::VerificationRequired)
        ));
        assert!(matches!(
            can_claim(&fixtures::provider()),
            Err(CoreError::Forbidden)
        ));
    }

    #[test]
    fn owner_or_admin_mutates_listing() {
        let provider = fixtures::provider();
        let listing = fixtures::listing(&provider);
        assert!(can_mutate_listing(&provider, &listing).is_ok());
        assert!(can_mutate_listing(&fixtures::admin(), &listing).is_ok());
        assert!(can_mutate_listing(&fixtures::verified_ngo(), &listing).is_err());
    }

    #[test]
    fn claimant_or_admin_updates_status() {
        let provider = fixtures::provider();
        let ngo = fixtures::verified_ngo();
        let mut listing = fixtures::listing(&provider);
        listing.claim_status = replate_types::models::ClaimStatus::Claimed;
        listing.claimed_by_ngo_id = Some(ngo.id);

        assert!(can_update_status(&ngo, &listing).is_ok());
        assert!(can_update_status(&fixtures::admin(), &listing).is_ok());
        // the provider does not drive status progression
        assert!(can_update_status(&provider, &listing).is_err());
    }

    #[test]
    fn messaging_restricted_to_listing_parties() {
        let provider = fixtures::provider();
        let ngo = fixtures::verified_ngo();
        let outsider = fixtures::verified_ngo();
        let mut listing = fixtures::listing(&provider);
        listing.claim_status = replate_types::models::ClaimStatus::Claimed;
        listing.claimed_by_ngo_id = Some(ngo.id);

        assert!(can_send_message(&listing, provider.id, ngo.id).is_ok());
        assert!(can_send_message(&listing, ngo.id, provider.id).is_ok());
        assert!(matches!(
            can_send_message(&listing, outsider.id, provider.id),
            Err(CoreError::InvalidParticipants)
        ));
        assert!(matches!(
            can_send_message(&listing, provider.id, provider.id),
            Err(CoreError::InvalidParticipants)
        ));
    }

    #[test]
    fn legacy_participant_keeps_read_access() {
        let provider = fixtures::provider();
        let former_ngo = fixtures::verified_ngo();
        let listing = fixtures::listing(&provider); // back to open, claimant cleared

        assert!(can_read_conversation(former_ngo.id, &listing, true).is_ok());
        assert!(can_read_conversation(former_ngo.id, &listing, false).is_err());
    }
}
