//! Postgres-backed category store.
//!
//! Records live in `sales_categories`. Listing uses `COLLATE "C"` so names sort
//! byte-wise, matching the in-memory store.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use storefront_core::CategoryId;
use storefront_sales::{
    Category, CategoryFilter, CategoryOrder, CategoryRepository, NewCategoryRecord, RepositoryError,
};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sales_categories (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NULL,
    active      BOOLEAN NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_ACTIVE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS sales_categories_active_name_idx
    ON sales_categories (active, name COLLATE "C")
"#;

const SELECT_COLUMNS: &str = "SELECT id, name, description, active FROM sales_categories";

/// Category store over a shared `PgPool`.
///
/// The pool is internally reference-counted; cloning the repository is cheap.
#[derive(Debug, Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the table and index if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in [CREATE_TABLE, CREATE_ACTIVE_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        tracing::debug!("sales_categories schema ensured");
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_many(
        &self,
        filter: CategoryFilter,
        order: CategoryOrder,
    ) -> Result<Vec<Category>, RepositoryError> {
        let mut query = select_query(&filter);
        push_order(&mut query, order);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_category).collect()
    }

    async fn find_one(&self, filter: CategoryFilter) -> Result<Option<Category>, RepositoryError> {
        let mut query = select_query(&filter);
        push_order(&mut query, CategoryOrder::NameAsc);
        query.push(" LIMIT 1");

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_category).transpose()
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
        let row = sqlx::query(
            r#"
            INSERT INTO sales_categories (id, name, description, active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                active = EXCLUDED.active,
                updated_at = NOW()
            RETURNING id, name, description, active
            "#,
        )
        .bind(category.id.as_str())
        .bind(&category.name)
        .bind(category.description.as_deref())
        .bind(category.active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row_to_category(&row)
    }
}

fn select_query(filter: &CategoryFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECT_COLUMNS);
    let mut separator = " WHERE ";

    if let Some(id) = &filter.id {
        query
            .push(separator)
            .push("id = ")
            .push_bind(id.as_str().to_owned());
        separator = " AND ";
    }
    if let Some(active) = filter.active {
        query.push(separator).push("active = ").push_bind(active);
    }

    query
}

fn push_order(query: &mut QueryBuilder<'static, Postgres>, order: CategoryOrder) {
    let direction = match order {
        CategoryOrder::NameAsc => "ASC",
        CategoryOrder::NameDesc => "DESC",
    };
    query.push(format!(
        " ORDER BY name COLLATE \"C\" {direction}, id COLLATE \"C\" {direction}"
    ));
}

fn row_to_category(row: &PgRow) -> Result<Category, RepositoryError> {
    Ok(Category {
        id: CategoryId::new(row.try_get::<String, _>("id").map_err(map_sqlx_error)?),
        name: row.try_get("name").map_err(map_sqlx_error)?,
        description: row.try_get("description").map_err(map_sqlx_error)?,
        active: row.try_get("active").map_err(map_sqlx_error)?,
    })
}

fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() =>
        {
            RepositoryError::Constraint(db.message().to_string())
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => RepositoryError::Unavailable(err.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => RepositoryError::Decode(err.to_string()),
        _ => {
            tracing::error!(error = %err, "category store query failed");
            RepositoryError::Storage(err.to_string())
        }
    }
}
