//! The module contains the error the ledger can throw.
//!
//! The errors are:
//!
//! - [`AlreadyMember`] thrown when a user who is in a family tries to create
//!   or join one.
//! - [`NotFound`] thrown when a referenced expense, family or sheet does not
//!   exist.
//! - [`NoFamily`] thrown when a family operation needs a membership the user
//!   does not have.
//!
//!  [`AlreadyMember`]: LedgerError::AlreadyMember
//!  [`NotFound`]: LedgerError::NotFound
//!  [`NoFamily`]: LedgerError::NoFamily
use thiserror::Error;

use crate::store::StoreError;

/// Ledger custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("already a family member")]
    AlreadyMember,
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("user has no family")]
    NoFamily,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed row in \"{sheet}\": {detail}")]
    MalformedRow { sheet: String, detail: String },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SheetNotFound(title) => LedgerError::NotFound(title),
            StoreError::RowNotFound { sheet, row } => {
                LedgerError::NotFound(format!("{sheet} row {row}"))
            }
            err => LedgerError::StoreUnavailable(err.to_string()),
        }
    }
}
