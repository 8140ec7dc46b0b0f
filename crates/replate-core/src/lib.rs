//! The listing lifecycle core: authorization predicates, the claim-status
//! state machine, and conversation access rules. Transport-agnostic — the
//! HTTP layer in replate-api maps [`CoreError`] values to status codes.

pub mod conversation;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod transitions;

pub use error::CoreError;

#[cfg(test)]
pub(crate) mod fixtures;
