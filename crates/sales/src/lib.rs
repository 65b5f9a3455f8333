//! Sales catalog: category management.
//!
//! This crate holds the business rules for catalog categories. Storage and
//! notification delivery are collaborators injected into [`CategoryManager`].

pub mod category;
pub mod error;
pub mod manager;
pub mod repository;

pub use category::{Category, CategoryChanges, NewCategory, NewCategoryRecord};
pub use error::{CategoryError, CategoryResult};
pub use manager::CategoryManager;
pub use repository::{CategoryFilter, CategoryOrder, CategoryRepository, RepositoryError};
