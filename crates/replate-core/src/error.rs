use replate_types::models::ClaimStatus;
use thiserror::Error;

/// Every failure the lifecycle core can report. Failures are terminal for the
/// current request — nothing here retries — and the HTTP layer translates each
/// variant to a status code mechanically.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("not authorized to perform this action")]
    Forbidden,

    /// Unverified NGO attempting to claim. Distinct from [`CoreError::Forbidden`]
    /// so the client can show a "wait for admin approval" message.
    #[error("NGO verification required; please wait for admin approval")]
    VerificationRequired,

    #[error("unable to claim listing: it may already be claimed or no longer exist")]
    ClaimConflict,

    #[error(
        "invalid status transition from '{from}' to '{requested}'; allowed transitions: {}",
        format_statuses(.allowed)
    )]
    InvalidTransition {
        from: ClaimStatus,
        requested: ClaimStatus,
        allowed: &'static [ClaimStatus],
    },

    #[error("sender and receiver must both be participants of this listing")]
    InvalidParticipants,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

fn format_statuses(statuses: &[ClaimStatus]) -> String {
    if statuses.is_empty() {
        return "none (terminal state)".to_string();
    }
    statuses
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
