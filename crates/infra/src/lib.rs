//! Infrastructure layer: category stores, configuration, wiring.

pub mod bootstrap;
pub mod config;
pub mod repository;


pub use bootstrap::{
    DefaultCategoryManager, DynCategoryRepository, NotificationBus, build_category_manager,
    connect_repository,
};
pub use config::{ConfigError, InfraConfig, StoreBackend};
pub use repository::{InMemoryCategoryRepository, PostgresCategoryRepository};
