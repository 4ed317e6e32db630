//! Core use-case services.
//!
//! # Responsibility
//! - Compose repository calls into bulk import/export and edit use-cases.
//! - Keep CLI layers decoupled from storage details.

use crate::repo::entry_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod edit;
pub mod transfer;

pub type TransferResult<T> = Result<T, TransferError>;

/// Errors from moving lines between a repository and an external source/sink.
#[derive(Debug)]
pub enum TransferError {
    Io(std::io::Error),
    Repo(RepoError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
