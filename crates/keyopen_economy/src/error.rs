//! # Economy Error Types
//!
//! All errors that can occur in the economy system.
//!
//! Every error is recoverable: the operation that returned it left balances,
//! inventories and the account map exactly as they were before the call.

use thiserror::Error;

use crate::money::Money;

/// Errors that can occur in the economy system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// Registration with a username that is already taken.
    #[error("user already exists: {username}")]
    DuplicateUser {
        /// The rejected username.
        username: String,
    },

    /// Unknown username or wrong password. Deliberately does not say which.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Balance too low to cover a debit.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// The amount the operation needed.
        required: Money,
        /// The balance at the time of the call.
        available: Money,
    },

    /// Positional index outside an inventory or the case catalog.
    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Length of the collection at the time of the call.
        len: usize,
    },

    /// Zero credit, or an amount that could not be parsed.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The session does not belong to a registered account of this economy.
    #[error("not logged in")]
    NotLoggedIn,

    /// Arithmetic overflow in a money calculation.
    #[error("arithmetic overflow in economic calculation")]
    ArithmeticOverflow,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The operating system could not provide seed material.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
