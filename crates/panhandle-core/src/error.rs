// SPDX-License-Identifier: AGPL-3.0-only
//! Contract errors.
//!
//! Every failure aborts the whole invocation. The carried string is the
//! revert reason and is displayed verbatim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Caller does not hold the role the operation requires
    #[error("{0}")]
    Unauthorized(String),

    /// Zero address or otherwise malformed input
    #[error("{0}")]
    InvalidArgument(String),

    /// A rate or amount is above its configured or hard-coded ceiling
    #[error("{0}")]
    ExceedsLimit(String),

    /// Arithmetic would leave the u128 range
    #[error("{0}")]
    Overflow(String),

    #[error("{0}")]
    InsufficientBalance(String),

    #[error("{0}")]
    InsufficientAllowance(String),
}

/// Discriminant of [`ContractError`], used to match failures without the reason text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    InvalidArgument,
    ExceedsLimit,
    Overflow,
    InsufficientBalance,
    InsufficientAllowance,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::Unauthorized(_) => ErrorKind::Unauthorized,
            ContractError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ContractError::ExceedsLimit(_) => ErrorKind::ExceedsLimit,
            ContractError::Overflow(_) => ErrorKind::Overflow,
            ContractError::InsufficientBalance(_) => ErrorKind::InsufficientBalance,
            ContractError::InsufficientAllowance(_) => ErrorKind::InsufficientAllowance,
        }
    }

    /// The revert reason.
    pub fn reason(&self) -> &str {
        match self {
            ContractError::Unauthorized(r)
            | ContractError::InvalidArgument(r)
            | ContractError::ExceedsLimit(r)
            | ContractError::Overflow(r)
            | ContractError::InsufficientBalance(r)
            | ContractError::InsufficientAllowance(r) => r,
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_reason_verbatim() {
        let e = ContractError::Unauthorized("Ownable: caller is not the owner".to_string());
        assert_eq!(e.to_string(), "Ownable: caller is not the owner");
        assert_eq!(e.reason(), "Ownable: caller is not the owner");
        assert_eq!(e.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_kind_serde_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ExceedsLimit).unwrap();
        assert_eq!(json, "\"exceeds_limit\"");
    }
}
