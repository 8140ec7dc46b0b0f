//! The claim-status state machine, owned in one place so the claim path, the
//! generic status update, and the tests all consult the same table.

use replate_types::models::ClaimStatus;

use crate::error::CoreError;

/// Full transition table. `Open -> Claimed` is listed here for completeness
/// but is reserved for the claim operation; see [`check`].
pub fn allowed_next(status: ClaimStatus) -> &'static [ClaimStatus] {
    use ClaimStatus::*;
    match status {
        Open => &[Claimed],
        Claimed => &[Confirmed, Cancelled],
        Confirmed => &[InProcess, Cancelled],
        InProcess => &[DeliveryPartnerAssigned, InTransit, Cancelled],
        DeliveryPartnerAssigned => &[InTransit, Cancelled],
        InTransit => &[Completed],
        Completed | Cancelled => &[],
    }
}

/// Terminal states accept no further transitions from any operation.
pub fn is_terminal(status: ClaimStatus) -> bool {
    allowed_next(status).is_empty()
}

/// States a generic status update may move to from `status`. Leaving `Open`
/// happens only through the claim operation's compare-and-swap, never here.
pub fn advance_targets(status: ClaimStatus) -> &'static [ClaimStatus] {
    if status == ClaimStatus::Open {
        &[]
    } else {
        allowed_next(status)
    }
}

/// Validates a generic status update against the table.
pub fn check(from: ClaimStatus, requested: ClaimStatus) -> Result<(), CoreError> {
    let allowed = advance_targets(from);
    if allowed.contains(&requested) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from,
            requested,
            allowed,
        })
    }
}
