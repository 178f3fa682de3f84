//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Io`] thrown when the price file cannot be read or the ledger cannot be
//!   written.
//! - [`InvalidConfig`] thrown when a [`Profile`] fails validation, before any
//!   output is produced.
//! - [`Unbalanced`] thrown when a [`Transaction`] does not net to zero at
//!   construction time.
//! - [`UndeclaredAccount`] and [`InvalidDocument`] thrown by the ledger
//!   self-check before anything is written.
//!
//! Malformed price lines and missing prices are never errors: the loader skips
//! the former and the resolver falls back for the latter.
//!
//!  [`Io`]: EngineError::Io
//!  [`InvalidConfig`]: EngineError::InvalidConfig
//!  [`Unbalanced`]: EngineError::Unbalanced
//!  [`UndeclaredAccount`]: EngineError::UndeclaredAccount
//!  [`InvalidDocument`]: EngineError::InvalidDocument
//!  [`Profile`]: crate::Profile
//!  [`Transaction`]: crate::Transaction
use std::path::PathBuf;

use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
    #[error("Invalid commodity: {0}")]
    InvalidCommodity(String),
    #[error("Unbalanced transaction: {0}")]
    Unbalanced(String),
    #[error("\"{0}\" account not declared!")]
    UndeclaredAccount(String),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io { path: a, source: x }, Self::Io { path: b, source: y }) => {
                a == b && x.kind() == y.kind()
            }
            (Self::InvalidConfig(a), Self::InvalidConfig(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidAccount(a), Self::InvalidAccount(b)) => a == b,
            (Self::InvalidCommodity(a), Self::InvalidCommodity(b)) => a == b,
            (Self::Unbalanced(a), Self::Unbalanced(b)) => a == b,
            (Self::UndeclaredAccount(a), Self::UndeclaredAccount(b)) => a == b,
            (Self::InvalidDocument(a), Self::InvalidDocument(b)) => a == b,
            _ => false,
        }
    }
}
