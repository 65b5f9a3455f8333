//! Category management service.
//!
//! Business rules live here and nowhere else:
//!
//! - the public read path only ever sees active categories
//! - listings are ordered by name, ascending
//! - lookups by id miss with a `NotFound` error before anything is written
//! - deletion is soft: `active` flips to `false` and the record stays
//!
//! Every operation performs at most one read followed by at most one write.
//! There is no transaction around the pair; concurrent writers race at the
//! store and the last write wins.

use storefront_core::{CategoryId, RequestContext};
use storefront_events::EventEmitter;

use crate::category::{Category, CategoryChanges, NewCategory, NewCategoryRecord};
use crate::error::{CategoryError, CategoryResult};
use crate::repository::{CategoryFilter, CategoryOrder, CategoryRepository};

/// Entry point for category queries and commands.
///
/// Collaborators are passed in explicitly; there is no global registry.
#[derive(Debug)]
pub struct CategoryManager<R, N> {
    repository: R,
    notifier: N,
}

impl<R, N> CategoryManager<R, N> {
    pub fn new(repository: R, notifier: N) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Notification sink. No operation emits yet.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_parts(self) -> (R, N) {
        (self.repository, self.notifier)
    }
}

impl<R, N> CategoryManager<R, N>
where
    R: CategoryRepository,
    N: EventEmitter,
{
    /// Active categories, name ascending.
    #[tracing::instrument(skip(self))]
    pub async fn list_public_categories(&self) -> CategoryResult<Vec<Category>> {
        let categories = self
            .repository
            .find_many(CategoryFilter::active(true), CategoryOrder::NameAsc)
            .await?;
        tracing::debug!(count = categories.len(), "listed public categories");
        Ok(categories)
    }

    /// Every category, active or not, name ascending.
    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self) -> CategoryResult<Vec<Category>> {
        let categories = self
            .repository
            .find_many(CategoryFilter::all(), CategoryOrder::NameAsc)
            .await?;
        tracing::debug!(count = categories.len(), "listed categories");
        Ok(categories)
    }

    #[tracing::instrument(skip(self, id), fields(category_id = %id))]
    pub async fn get_category_by_id(&self, id: &CategoryId) -> CategoryResult<Category> {
        self.find_existing(id).await
    }

    /// Create a category. It always starts active.
    #[tracing::instrument(skip(self, input))]
    pub async fn create_category(&self, input: NewCategory) -> CategoryResult<Category> {
        let draft = self.repository.instantiate(NewCategoryRecord::from(input));
        let saved = self.repository.persist(draft).await?;
        tracing::info!(category_id = %saved.id, "category created");
        Ok(saved)
    }

    /// Merge `changes` onto an existing category and save it.
    #[tracing::instrument(
        skip(self, ctx, id, changes),
        fields(
            category_id = %id,
            actor = ?ctx.actor(),
            correlation_id = %ctx.correlation_id()
        )
    )]
    pub async fn update_category(
        &self,
        ctx: &RequestContext,
        id: &CategoryId,
        changes: CategoryChanges,
    ) -> CategoryResult<Category> {
        let mut category = self.find_existing(id).await?;
        changes.apply_to(&mut category);
        let saved = self.repository.persist(category).await?;
        tracing::info!("category updated");
        Ok(saved)
    }

    /// Soft delete: mark the category inactive. Repeating it is harmless.
    #[tracing::instrument(
        skip(self, ctx, id),
        fields(
            category_id = %id,
            actor = ?ctx.actor(),
            correlation_id = %ctx.correlation_id()
        )
    )]
    pub async fn delete_category(&self, ctx: &RequestContext, id: &CategoryId) -> CategoryResult<()> {
        let mut category = self.find_existing(id).await?;
        category.deactivate();
        self.repository.persist(category).await?;
        tracing::info!("category deactivated");
        Ok(())
    }

    async fn find_existing(&self, id: &CategoryId) -> CategoryResult<Category> {
        self.repository
            .find_one(CategoryFilter::id(id.clone()))
            .await?
            .ok_or_else(|| {
                tracing::debug!(category_id = %id, "category lookup missed");
                CategoryError::not_found(id)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::Value as JsonValue;

    use super::*;
    use crate::repository::RepositoryError;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        FindMany(CategoryFilter, CategoryOrder),
        FindOne(CategoryFilter),
        Instantiate(NewCategoryRecord),
        Persist(Category),
    }

    /// Store double that keeps records in a Vec and logs every call.
    #[derive(Debug, Default)]
    struct RecordingRepository {
        records: Mutex<Vec<Category>>,
        calls: Mutex<Vec<Call>>,
        next_id: AtomicUsize,
        failure: Option<RepositoryError>,
    }

    impl RecordingRepository {
        fn with(records: Vec<Category>) -> Self {
            let next_id = AtomicUsize::new(records.len() + 1);
            Self {
                records: Mutex::new(records),
                next_id,
                ..Self::default()
            }
        }

        fn failing(err: RepositoryError) -> Self {
            Self {
                failure: Some(err),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn persisted(&self) -> Vec<Category> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Persist(category) => Some(category),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: Call) -> Result<(), RepositoryError> {
            self.calls.lock().unwrap().push(call);
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CategoryRepository for RecordingRepository {
        async fn find_many(
            &self,
            filter: CategoryFilter,
            order: CategoryOrder,
        ) -> Result<Vec<Category>, RepositoryError> {
            self.record(Call::FindMany(filter.clone(), order))?;
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|c| filter.matches(c))
                .cloned()
                .collect();
            order.sort(&mut found);
            Ok(found)
        }

        async fn find_one(&self, filter: CategoryFilter) -> Result<Option<Category>, RepositoryError> {
            self.record(Call::FindOne(filter.clone()))?;
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|c| filter.matches(c))
                .cloned())
        }

        fn instantiate(&self, fields: NewCategoryRecord) -> Category {
            self.calls.lock().unwrap().push(Call::Instantiate(fields.clone()));
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            Category {
                id: CategoryId::new(id.to_string()),
                name: fields.name,
                description: fields.description,
                active: fields.active,
            }
        }

        async fn persist(&self, category: Category) -> Result<Category, RepositoryError> {
            self.record(Call::Persist(category.clone()))?;
            let mut records = self.records.lock().unwrap();
            match records.iter_mut().find(|c| c.id == category.id) {
                Some(existing) => *existing = category.clone(),
                None => records.push(category.clone()),
            }
            Ok(category)
        }
    }

    #[derive(Debug, Default)]
    struct CountingEmitter {
        emitted: AtomicUsize,
    }

    impl EventEmitter for CountingEmitter {
        fn emit(&self, _event_name: &str, _payload: JsonValue) {
            self.emitted.fetch_add(1, Ordering::SeqCst);
        }
    }

    type TestManager = CategoryManager<RecordingRepository, CountingEmitter>;

    fn manager(records: Vec<Category>) -> TestManager {
        CategoryManager::new(RecordingRepository::with(records), CountingEmitter::default())
    }

    fn category(id: &str, name: &str, active: bool) -> Category {
        Category {
            id: CategoryId::from(id),
            name: name.to_string(),
            description: Some(format!("{name} frescas e selecionadas")),
            active,
        }
    }

    fn frutas_e_verduras() -> Vec<Category> {
        vec![
            category("2", "Verduras", false),
            category("1", "Frutas", true),
        ]
    }

    fn ctx() -> RequestContext {
        RequestContext::anonymous()
    }

    #[tokio::test]
    async fn public_listing_returns_only_active_categories() {
        let manager = manager(frutas_e_verduras());

        let result = manager.list_public_categories().await.unwrap();

        assert_eq!(result, vec![category("1", "Frutas", true)]);
        assert_eq!(
            manager.repository().calls(),
            vec![Call::FindMany(CategoryFilter::active(true), CategoryOrder::NameAsc)]
        );
    }

    #[tokio::test]
    async fn public_listing_of_empty_store_is_empty() {
        let manager = manager(vec![]);

        assert!(manager.list_public_categories().await.unwrap().is_empty());
        assert_eq!(manager.repository().calls().len(), 1);
    }

    #[tokio::test]
    async fn full_listing_includes_inactive_categories_by_name() {
        let manager = manager(frutas_e_verduras());

        let names: Vec<_> = manager
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["Frutas", "Verduras"]);
        assert_eq!(
            manager.repository().calls(),
            vec![Call::FindMany(CategoryFilter::all(), CategoryOrder::NameAsc)]
        );
    }

    #[tokio::test]
    async fn get_by_id_ignores_active_flag() {
        let manager = manager(frutas_e_verduras());

        let found = manager
            .get_category_by_id(&CategoryId::from("2"))
            .await
            .unwrap();

        assert_eq!(found, category("2", "Verduras", false));
        assert_eq!(
            manager.repository().calls(),
            vec![Call::FindOne(CategoryFilter::id(CategoryId::from("2")))]
        );
    }

    #[tokio::test]
    async fn get_by_unknown_id_is_not_found() {
        let manager = manager(vec![]);

        let err = manager
            .get_category_by_id(&CategoryId::from("999"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Category with id 999 not found");
    }

    #[tokio::test]
    async fn create_forces_active_and_returns_persisted_record() {
        let manager = manager(frutas_e_verduras());
        let input: NewCategory = serde_json::from_value(serde_json::json!({
            "name": "Legumes",
            "description": "Legumes frescos",
            "active": false,
        }))
        .unwrap();

        let created = manager.create_category(input).await.unwrap();

        assert!(created.active);
        assert_eq!(created.id, CategoryId::from("3"));
        assert_eq!(created.name, "Legumes");
        assert_eq!(created.description.as_deref(), Some("Legumes frescos"));
        assert_eq!(
            manager.repository().calls(),
            vec![
                Call::Instantiate(NewCategoryRecord {
                    name: "Legumes".to_string(),
                    description: Some("Legumes frescos".to_string()),
                    active: true,
                }),
                Call::Persist(created.clone()),
            ]
        );
    }

    #[tokio::test]
    async fn create_propagates_store_failure() {
        let failure = RepositoryError::Constraint("duplicate key".to_string());
        let manager = CategoryManager::new(
            RecordingRepository::failing(failure.clone()),
            CountingEmitter::default(),
        );

        let err = manager
            .create_category(NewCategory::new("Legumes"))
            .await
            .unwrap_err();

        assert_eq!(err, CategoryError::Repository(failure));
    }

    #[tokio::test]
    async fn update_merges_present_fields_only() {
        let manager = manager(frutas_e_verduras());

        let updated = manager
            .update_category(
                &ctx(),
                &CategoryId::from("1"),
                CategoryChanges::default().name("Frutas Tropicais"),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Frutas Tropicais");
        assert_eq!(
            updated.description.as_deref(),
            Some("Frutas frescas e selecionadas")
        );
        assert!(updated.active);
        assert_eq!(manager.repository().persisted(), vec![updated]);
    }

    #[tokio::test]
    async fn update_never_reactivates() {
        let manager = manager(frutas_e_verduras());

        let updated = manager
            .update_category(
                &ctx(),
                &CategoryId::from("2"),
                CategoryChanges::default()
                    .name("Verduras Orgânicas")
                    .description("Sem agrotóxicos"),
            )
            .await
            .unwrap();

        assert!(!updated.active);
        assert_eq!(updated.description.as_deref(), Some("Sem agrotóxicos"));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found_and_writes_nothing() {
        let manager = manager(vec![]);

        let err = manager
            .update_category(
                &ctx(),
                &CategoryId::from("999"),
                CategoryChanges::default().name("Teste"),
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("999"));
        assert!(manager.repository().persisted().is_empty());
    }

    #[tokio::test]
    async fn delete_deactivates_and_keeps_other_fields() {
        let manager = manager(frutas_e_verduras());

        manager
            .delete_category(&ctx(), &CategoryId::from("1"))
            .await
            .unwrap();

        let mut expected = category("1", "Frutas", true);
        expected.active = false;
        assert_eq!(manager.repository().persisted(), vec![expected]);
    }

    #[tokio::test]
    async fn delete_twice_still_succeeds() {
        let manager = manager(frutas_e_verduras());
        let id = CategoryId::from("1");

        manager.delete_category(&ctx(), &id).await.unwrap();
        manager.delete_category(&ctx(), &id).await.unwrap();

        let stored = manager.get_category_by_id(&id).await.unwrap();
        assert!(!stored.active);
        assert_eq!(manager.repository().persisted().len(), 2);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found_and_writes_nothing() {
        let manager = manager(vec![]);

        let err = manager
            .delete_category(&ctx(), &CategoryId::from("999"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(manager.repository().persisted().is_empty());
    }

    #[tokio::test]
    async fn lookup_failures_are_not_reported_as_not_found() {
        let failure = RepositoryError::Unavailable("connection reset".to_string());
        let manager = CategoryManager::new(
            RecordingRepository::failing(failure.clone()),
            CountingEmitter::default(),
        );

        let err = manager
            .delete_category(&ctx(), &CategoryId::from("1"))
            .await
            .unwrap_err();

        assert!(!err.is_not_found());
        assert_eq!(err, CategoryError::Repository(failure));
    }

    #[tokio::test]
    async fn mutations_emit_no_notifications() {
        let manager = manager(frutas_e_verduras());
        let id = CategoryId::from("1");

        manager.create_category(NewCategory::new("Legumes")).await.unwrap();
        manager
            .update_category(&ctx(), &id, CategoryChanges::default().description("x"))
            .await
            .unwrap();
        manager.delete_category(&ctx(), &id).await.unwrap();

        assert_eq!(manager.notifier().emitted.load(Ordering::SeqCst), 0);
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn arb_categories() -> impl Strategy<Value = Vec<Category>> {
        prop::collection::vec(("[A-Za-z]{1,8}", any::<bool>()), 0..20).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(idx, (name, active))| Category {
                    id: CategoryId::new(idx.to_string()),
                    name,
                    description: None,
                    active,
                })
                .collect()
        })
    }

    fn is_sorted_by_name(categories: &[Category]) -> bool {
        categories.windows(2).all(|w| w[0].name <= w[1].name)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: the public listing is exactly the active subset, by name.
        #[test]
        fn public_listing_is_the_sorted_active_subset(categories in arb_categories()) {
            let manager = manager(categories.clone());
            let listed = block_on(manager.list_public_categories()).unwrap();

            let expected = categories.iter().filter(|c| c.active).count();
            prop_assert_eq!(listed.len(), expected);
            prop_assert!(listed.iter().all(|c| c.active));
            prop_assert!(is_sorted_by_name(&listed));
        }

        /// Property: the full listing contains every record, by name.
        #[test]
        fn full_listing_contains_everything_sorted(categories in arb_categories()) {
            let manager = manager(categories.clone());
            let listed = block_on(manager.list_categories()).unwrap();

            prop_assert_eq!(listed.len(), categories.len());
            prop_assert!(categories.iter().all(|c| listed.contains(c)));
            prop_assert!(is_sorted_by_name(&listed));
        }

        /// Property: whatever the input, a created category is active.
        #[test]
        fn created_categories_start_active(
            name in "[A-Za-z ]{0,12}",
            description in proptest::option::of("[a-z ]{0,20}"),
        ) {
            let manager = manager(vec![]);
            let input = NewCategory { name: name.clone(), description: description.clone() };
            let created = block_on(manager.create_category(input)).unwrap();

            prop_assert!(created.active);
            prop_assert_eq!(created.name, name);
            prop_assert_eq!(created.description, description);
        }
    }
}
