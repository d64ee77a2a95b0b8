//! # catalog-db
//!
//! PostgreSQL document store for the recipe catalog.
//!
//! This crate provides:
//! - Connection pool management
//! - A JSONB document store for recipe aggregates, with embedded
//!   ingredients located by containment query
//! - Reference data repositories for units of measure and categories
//! - An in-memory store with identical semantics for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use catalog_db::{Database, RecipeLocator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/catalog").await?;
//!
//!     if let Some(recipe) = db.recipes.by_embedded_ingredient_id("INGRED-1").await? {
//!         println!("Ingredient belongs to {}", recipe.description);
//!     }
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod documents;
pub mod memory;
pub mod pool;
pub mod recipes;
pub mod units;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use catalog_core::*;

pub use categories::PgCategoryRepository;
pub use documents::{IngredientDocument, NotesDocument, RecipeDocument};
pub use memory::{MemoryDocumentStore, StoreCall};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use recipes::PgRecipeRepository;
pub use units::PgUnitOfMeasureRepository;

/// DDL for the catalog tables, applied by [`Database::ensure_schema`].
pub const SCHEMA_SQL: &str = include_str!("../../../schema/recipe_catalog.sql");

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Recipe document repository.
    pub recipes: PgRecipeRepository,
    /// Unit of measure repository.
    pub units: PgUnitOfMeasureRepository,
    /// Category repository.
    pub categories: PgCategoryRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            recipes: PgRecipeRepository::new(pool.clone()),
            units: PgUnitOfMeasureRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Create the catalog tables and indexes if they do not exist.
    ///
    /// Every statement is idempotent, so this is safe on every start.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
