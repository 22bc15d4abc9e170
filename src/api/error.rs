/// Operation-surface error taxonomy
///
/// Every variant carries a stable machine-readable code and the HTTP status
/// an outer transport would attach. Vendor trouble is deliberately absent:
/// upstream failures degrade responses, they never produce errors here.
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::AddressParseError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Wallet address is required")]
    MissingAddress,

    #[error("Invalid Ethereum address format")]
    InvalidAddress,

    #[error("Wallet already in battle")]
    WalletExists,

    #[error("Wallet not found")]
    WalletNotFound,

    #[error("Follower address is required")]
    MissingFollower,

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Comment too long (max 500 characters)")]
    CommentTooLong,

    #[error("Missing required tournament fields")]
    MissingFields,

    #[error("Tournament not found")]
    TournamentNotFound,

    #[error("Tournament is not active")]
    TournamentInactive,

    #[error("Already joined tournament")]
    AlreadyJoined,

    #[error("Tournament is full")]
    TournamentFull,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status an outer transport should report
    pub fn status(&self) -> u16 {
        match self {
            Self::WalletNotFound | Self::TournamentNotFound => 404,
            Self::WalletExists => 409,
            Self::Internal(_) => 500,
            _ => 400,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAddress => "MISSING_ADDRESS",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::WalletExists => "WALLET_EXISTS",
            Self::WalletNotFound => "WALLET_NOT_FOUND",
            Self::MissingFollower => "MISSING_FOLLOWER",
            Self::EmptyComment => "EMPTY_COMMENT",
            Self::CommentTooLong => "COMMENT_TOO_LONG",
            Self::MissingFields => "MISSING_FIELDS",
            Self::TournamentNotFound => "TOURNAMENT_NOT_FOUND",
            Self::TournamentInactive => "TOURNAMENT_INACTIVE",
            Self::AlreadyJoined => "ALREADY_JOINED",
            Self::TournamentFull => "TOURNAMENT_FULL",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// JSON body in the `{ "error": ..., "code": ... }` wire shape
    pub fn to_body(&self) -> Value {
        json!({
            "error": self.to_string(),
            "code": self.code(),
        })
    }
}

impl From<AddressParseError> for ApiError {
    fn from(_: AddressParseError) -> Self {
        Self::InvalidAddress
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
