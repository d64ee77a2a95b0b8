//! # catalog-service
//!
//! Aggregate services for the recipe catalog.
//!
//! - [`IngredientService`]: find, upsert, and remove ingredients embedded in
//!   a recipe document, re-persisting the whole aggregate on every change
//! - [`RecipeService`]: whole-recipe CRUD with reference data resolution
//! - [`ReferenceDataService`]: units of measure and categories
//!
//! Services depend only on the repository traits from `catalog-core`, so
//! the same code runs over PostgreSQL or the in-memory store.

pub mod ingredients;
pub mod recipes;
pub mod reference_data;
pub mod resolver;

use std::sync::Arc;

use catalog_core::{CategoryRepository, RecipeRepository, UnitOfMeasureRepository};
use catalog_db::Database;

pub use ingredients::IngredientService;
pub use recipes::RecipeService;
pub use reference_data::ReferenceDataService;
pub use resolver::{PostSaveResolver, ResolvedBy};

/// All catalog services wired to one set of repositories.
#[derive(Clone)]
pub struct CatalogServices {
    pub ingredients: IngredientService,
    pub recipes: RecipeService,
    pub reference_data: ReferenceDataService,
}

impl CatalogServices {
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        units: Arc<dyn UnitOfMeasureRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            ingredients: IngredientService::new(recipes.clone(), units.clone()),
            recipes: RecipeService::new(recipes, units.clone(), categories.clone()),
            reference_data: ReferenceDataService::new(units, categories),
        }
    }

    /// Wire every service to the PostgreSQL repositories.
    pub fn from_database(db: &Database) -> Self {
        Self::new(
            Arc::new(db.recipes.clone()),
            Arc::new(db.units.clone()),
            Arc::new(db.categories.clone()),
        )
    }

    /// Wire every service to one store implementing all repository traits.
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: RecipeRepository + UnitOfMeasureRepository + CategoryRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }
}
