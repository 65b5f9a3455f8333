//! Category store adapters.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCategoryRepository;
pub use postgres::PostgresCategoryRepository;
