use thiserror::Error;

use storefront_core::{CategoryId, DomainError};

use crate::repository::RepositoryError;

pub type CategoryResult<T> = Result<T, CategoryError>;

/// Errors surfaced by [`CategoryManager`](crate::CategoryManager).
///
/// `Domain` carries the business failures raised here (a missing id). Anything
/// coming from the store is wrapped in `Repository` without translation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CategoryError {
    pub fn not_found(id: &CategoryId) -> Self {
        Self::Domain(DomainError::not_found(format!("Category with id {id} not found")))
    }

    /// Whether a transport should answer with "missing resource".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(err) if err.is_not_found())
    }
}
