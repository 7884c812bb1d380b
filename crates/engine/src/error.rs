//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidQuantity`] thrown when a purchase or cancellation quantity is
//!   outside the range allowed by the current inventory.
//! - [`InvalidFormat`] thrown when a price or a show time cannot be parsed.
//! - [`NotFound`] thrown when a theatre, movie or sale does not exist.
//! - [`Storage`] thrown when the store rejected a read or a write.
//!
//!  [`InvalidQuantity`]: EngineError::InvalidQuantity
//!  [`InvalidFormat`]: EngineError::InvalidFormat
//!  [`NotFound`]: EngineError::NotFound
//!  [`Storage`]: EngineError::Storage
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid ticket quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    Storage(#[from] DbErr),
}

impl EngineError {
    /// `true` for failures of the store itself, after which the in-memory
    /// inventory should be reloaded.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::InvalidFormat(a), Self::InvalidFormat(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
