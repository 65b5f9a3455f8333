use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_core::CategoryId;
use storefront_sales::{
    Category, CategoryFilter, CategoryOrder, CategoryRepository, NewCategoryRecord, RepositoryError,
};

/// In-memory category store for tests/dev.
///
/// Ids are generated as UUIDv7 strings by `instantiate`. Not optimized for
/// large catalogs: every listing scans the whole map.
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    records: RwLock<HashMap<CategoryId, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `categories`, keyed by their ids.
    pub fn seeded(categories: impl IntoIterator<Item = Category>) -> Self {
        let records = categories
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> RepositoryError {
        RepositoryError::Unavailable("in-memory category store lock poisoned".to_string())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_many(
        &self,
        filter: CategoryFilter,
        order: CategoryOrder,
    ) -> Result<Vec<Category>, RepositoryError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        let mut found: Vec<Category> = records
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        order.sort(&mut found);
        Ok(found)
    }

    async fn find_one(&self, filter: CategoryFilter) -> Result<Option<Category>, RepositoryError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;

        // Fast path for the common lookup-by-id.
        if let Some(id) = &filter.id {
            return Ok(records.get(id).filter(|c| filter.matches(c)).cloned());
        }

        let mut matching: Vec<&Category> = records.values().filter(|c| filter.matches(c)).collect();
        matching.sort_by(|a, b| CategoryOrder::NameAsc.compare(a, b));
        Ok(matching.first().map(|c| (*c).clone()))
    }

    fn instantiate(&self, fields: NewCategoryRecord) -> Category {
        Category {
            id: CategoryId::generate(),
            name: fields.name,
            description: fields.description,
            active: fields.active,
        }
    }

    async fn persist(&self, category: Category) -> Result<Category, RepositoryError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        records.insert(category.id.clone(), category.clone());
        Ok(category)
    }
}
