//! Errors raised while creating actions or binding stores.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = BindError> = std::result::Result<T, E>;

/// Errors that can occur while creating actions or binding a store.
///
/// Every variant aborts the whole call: nothing is registered and no store is
/// created when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A precondition on the caller's input was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The same action name ended up in both the sync and the async set.
    #[error("action `{0}` is claimed by both the sync and the async action set")]
    ActionCollision(String),

    /// The registry refused to replace an existing namespace.
    #[error("namespace `{0}` is already registered")]
    NamespaceTaken(String),

    /// The registry accepted the actions but does not expose them afterwards.
    #[error("registry does not expose actions under `{0}` after registration")]
    RegistryContract(String),
}

impl BindError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns `true` for input validation failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
