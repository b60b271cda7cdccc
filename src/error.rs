//! Error types shared by the clicker engine and its collaborators.
//!
//! Only [`ValidationError`] and [`PurchaseError`] ever reach the caller.
//! [`StorageError`] and [`RemoteError`] are logged and swallowed inside the
//! engine so gameplay keeps running on local state.

use thiserror::Error;

/// Failure of the on-device key/value store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("failed to remove `{key}`: {reason}")]
    Remove { key: String, reason: String },
}

/// Failure of the shared remote ledger.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("remote ledger unreachable: {0}")]
    Unavailable(String),
    #[error("remote ledger rejected the request: {0}")]
    Rejected(String),
}

/// Rejected user input. No state changes when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("username must be {min}-{max} characters (got {len})")]
    UsernameLength { len: usize, min: usize, max: usize },
    #[error("a username is required before choosing a team")]
    MissingUsername,
    #[error("a team is already selected")]
    TeamAlreadySelected,
}

/// Rejected bonus purchase. No state changes when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurchaseError {
    #[error("unknown bonus id {0}")]
    UnknownBonus(u32),
    #[error("bonus {0} is already owned")]
    AlreadyOwned(u32),
    #[error("not enough clicks: need {cost}, have {available}")]
    InsufficientClicks { cost: u64, available: u64 },
    #[error("choose a team before buying bonuses")]
    NoTeamSelected,
}
