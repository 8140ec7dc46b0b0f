pub mod admin;
pub mod auth;
pub mod error;
pub mod listings;
pub mod messages;
pub mod middleware;

use tracing::error;
use uuid::Uuid;

use replate_db::Database;
use replate_types::models::User;

use crate::error::ApiError;

/// Runs blocking rusqlite work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::internal()
    })?
}

/// Fetches the authenticated caller's current record. Role, verification and
/// admin flags are always read fresh from the store rather than trusted from
/// the token.
pub(crate) fn load_user(db: &Database, id: Uuid) -> Result<User, ApiError> {
    let row = db
        .get_user_by_id(&id.to_string())
        .map_err(ApiError::storage)?
        .ok_or_else(|| ApiError::unauthorized("user belonging to this token no longer exists"))?;
    row.into_user().map_err(ApiError::storage)
}
