//! Category repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use catalog_core::{new_id, Category, CategoryRepository, Error, Result};

/// PostgreSQL implementation of CategoryRepository.
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, description FROM category WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| Category::new(r.get::<String, _>("id"), r.get::<String, _>("description"))))
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, description FROM category WHERE description = $1")
            .bind(description)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| Category::new(r.get::<String, _>("id"), r.get::<String, _>("description"))))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, description FROM category ORDER BY description")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Category::new(r.get::<String, _>("id"), r.get::<String, _>("description")))
            .collect())
    }

    async fn save(&self, category: Category) -> Result<Category> {
        let id = category.id.unwrap_or_else(new_id);

        sqlx::query(
            r#"
            INSERT INTO category (id, description)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET description = EXCLUDED.description
            "#,
        )
        .bind(&id)
        .bind(&category.description)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "categories",
            op = "save",
            category_id = %id,
            "Category saved"
        );
        Ok(Category::new(id, category.description))
    }
}
