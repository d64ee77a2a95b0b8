//! Core traits for recipe catalog persistence.
//!
//! These traits define the interfaces that concrete stores must satisfy.
//! The aggregate services depend only on these, never on a storage
//! technology.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// RECIPE REPOSITORY TRAITS
// =============================================================================

/// Two ways of resolving the recipe aggregate.
///
/// The methods are not interchangeable: one takes a recipe ID, the other
/// an ID of an ingredient embedded somewhere in a recipe.
#[async_trait]
pub trait RecipeLocator: Send + Sync {
    /// Find a recipe by its own ID.
    async fn by_recipe_id(&self, recipe_id: &str) -> Result<Option<Recipe>>;

    /// Find the recipe that embeds an ingredient with this ID.
    async fn by_embedded_ingredient_id(&self, ingredient_id: &str) -> Result<Option<Recipe>>;
}

/// Repository for recipe aggregates.
#[async_trait]
pub trait RecipeRepository: RecipeLocator {
    /// Upsert the whole aggregate as one document write.
    ///
    /// Assigns IDs to the recipe, its notes, and any embedded ingredient
    /// that has none; existing IDs are preserved. Returns the aggregate as
    /// persisted, with references hydrated.
    async fn save(&self, recipe: Recipe) -> Result<Recipe>;

    /// Delete a recipe. Returns `true` if a document was removed.
    async fn delete(&self, recipe_id: &str) -> Result<bool>;

    /// List all recipes.
    async fn list(&self) -> Result<Vec<Recipe>>;

    /// List recipes linked to a category.
    async fn list_by_category(&self, category_id: &str) -> Result<Vec<Recipe>>;
}

// =============================================================================
// REFERENCE DATA REPOSITORY TRAITS
// =============================================================================

/// Repository for units of measure.
#[async_trait]
pub trait UnitOfMeasureRepository: Send + Sync {
    /// Get a unit by ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<UnitOfMeasure>>;

    /// Get a unit by exact description.
    async fn find_by_description(&self, description: &str) -> Result<Option<UnitOfMeasure>>;

    /// List all units ordered by description.
    async fn list(&self) -> Result<Vec<UnitOfMeasure>>;

    /// Insert or update a unit, assigning an ID when absent.
    async fn save(&self, uom: UnitOfMeasure) -> Result<UnitOfMeasure>;
}

/// Repository for recipe categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Get a category by ID.
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>>;

    /// Get a category by exact description.
    async fn find_by_description(&self, description: &str) -> Result<Option<Category>>;

    /// List all categories ordered by description.
    async fn list(&self) -> Result<Vec<Category>>;

    /// Insert or update a category, assigning an ID when absent.
    async fn save(&self, category: Category) -> Result<Category>;
}
