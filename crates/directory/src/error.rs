use {
    promoter_common::{ChatId, UserId},
    promoter_store::StoreError,
};

/// Errors surfaced to the caller of a directory operation.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("chat {0} is already registered")]
    Duplicate(ChatId),

    #[error("chat {0} is not awaiting moderation")]
    NotFound(ChatId),

    #[error("user {0} is not an admin")]
    PermissionDenied(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A state document that breaks the pending/approved membership rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("chat {0} is both pending and approved")]
    InBothSets(ChatId),

    #[error("chat {0} appears more than once in the {1} set")]
    Repeated(ChatId, &'static str),
}
