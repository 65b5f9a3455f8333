//! Wiring: config in, ready-to-use category manager out.

use std::sync::Arc;

use storefront_events::{BusEventEmitter, InMemoryEventBus, NotificationMessage};
use storefront_sales::{CategoryManager, CategoryRepository, RepositoryError};

use crate::config::{InfraConfig, StoreBackend};
use crate::repository::{InMemoryCategoryRepository, PostgresCategoryRepository};

pub type DynCategoryRepository = Arc<dyn CategoryRepository>;
pub type NotificationBus = Arc<InMemoryEventBus<NotificationMessage>>;
pub type DefaultCategoryManager =
    CategoryManager<DynCategoryRepository, BusEventEmitter<NotificationBus>>;

/// Open the store selected by `config`. Postgres schemas are created on demand.
pub async fn connect_repository(config: &InfraConfig) -> Result<DynCategoryRepository, RepositoryError> {
    match &config.store {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory category store");
            Ok(Arc::new(InMemoryCategoryRepository::new()))
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            tracing::info!(max_connections, "connecting postgres category store");
            let repo = PostgresCategoryRepository::connect(database_url, *max_connections).await?;
            repo.ensure_schema().await?;
            Ok(Arc::new(repo))
        }
    }
}

/// Manager over the configured store, notifying onto `bus`.
pub async fn build_category_manager(
    config: &InfraConfig,
    bus: NotificationBus,
) -> Result<DefaultCategoryManager, RepositoryError> {
    let repository = connect_repository(config).await?;
    Ok(CategoryManager::new(repository, BusEventEmitter::new(bus)))
}
