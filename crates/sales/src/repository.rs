//! Persistence collaborator contract.
//!
//! The manager only needs four operations from a record store: equality-filtered
//! listing with ordering, single lookup, in-memory instantiation, and upsert.
//! Implementations live in `storefront-infra`.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_core::CategoryId;

use crate::category::{Category, NewCategoryRecord};

/// Failure raised by a record store. Passed through the manager untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("failed to decode record: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Equality filter over category fields. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub id: Option<CategoryId>,
    pub active: Option<bool>,
}

impl CategoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn id(id: CategoryId) -> Self {
        Self {
            id: Some(id),
            active: None,
        }
    }

    pub fn active(active: bool) -> Self {
        Self {
            id: None,
            active: Some(active),
        }
    }

    pub fn matches(&self, category: &Category) -> bool {
        self.id.as_ref().is_none_or(|id| *id == category.id)
            && self.active.is_none_or(|active| active == category.active)
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryOrder {
    #[default]
    NameAsc,
    NameDesc,
}

impl CategoryOrder {
    /// Byte-wise, case-sensitive name comparison; ties broken by id.
    pub fn compare(self, a: &Category, b: &Category) -> Ordering {
        let by_name = a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id));
        match self {
            CategoryOrder::NameAsc => by_name,
            CategoryOrder::NameDesc => by_name.reverse(),
        }
    }

    pub fn sort(self, categories: &mut [Category]) {
        categories.sort_by(|a, b| self.compare(a, b));
    }
}

/// Record store keyed by category id.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All records matching `filter`, sorted by `order`.
    async fn find_many(
        &self,
        filter: CategoryFilter,
        order: CategoryOrder,
    ) -> Result<Vec<Category>, RepositoryError>;

    /// The single record matching `filter`, if any.
    async fn find_one(&self, filter: CategoryFilter) -> Result<Option<Category>, RepositoryError>;

    /// Shape an unsaved record and assign its id. No IO.
    fn instantiate(&self, fields: NewCategoryRecord) -> Category;

    /// Insert or update by id; returns what was stored.
    async fn persist(&self, category: Category) -> Result<Category, RepositoryError>;
}

#[async_trait]
impl<R> CategoryRepository for Arc<R>
where
    R: CategoryRepository + ?Sized,
{
    async fn find_many(
        &self,
        filter: CategoryFilter,
        order: CategoryOrder,
    ) -> Result<Vec<Category>, RepositoryError> {
        (**self).find_many(filter, order).await
    }

    async fn find_one(&self, filter: CategoryFilter) -> Result<Option<Category>, RepositoryError> {
        (**self).find_one(filter).await
    }

    fn instantiate(&self, fields: NewCategoryRecord) -> Category {
        (**self).instantiate(fields)
    }

    async fn persist(&self, category: Category) -> Result<Category, RepositoryError> {
        (**self).persist(category).await
    }
}
