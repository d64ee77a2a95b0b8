//! Error types for the recipe catalog.

use std::fmt;

use thiserror::Error;

/// Result type alias using the catalog's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of entity a NotFound error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Recipe,
    Ingredient,
    UnitOfMeasure,
    Category,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Recipe => "recipe",
            EntityKind::Ingredient => "ingredient",
            EntityKind::UnitOfMeasure => "unit of measure",
            EntityKind::Category => "category",
        };
        f.write_str(name)
    }
}

/// Core error type for recipe catalog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Recipe lookup by recipe ID failed
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    /// No recipe embeds an ingredient with this ID
    #[error("No recipe owns ingredient: {0}")]
    OwningRecipeNotFound(String),

    /// Ingredient absent from an otherwise resolvable recipe
    #[error("Ingredient {ingredient_id} not found for recipe {recipe_id}")]
    IngredientNotFound {
        recipe_id: String,
        ingredient_id: String,
    },

    /// Unit of measure not found
    #[error("Unit of measure not found: {0}")]
    UnitOfMeasureNotFound(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// The store accepted a write but the written ingredient cannot be
    /// located in the persisted aggregate.
    #[error("Inconsistent write on recipe {recipe_id}: {description}")]
    InconsistentWrite {
        recipe_id: String,
        description: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for every NotFound flavour, regardless of entity.
    pub fn is_not_found(&self) -> bool {
        self.missing_entity().is_some()
    }

    /// The entity a NotFound error refers to.
    ///
    /// `OwningRecipeNotFound` reports [`EntityKind::Recipe`]: the ingredient ID
    /// was searched for, but what is missing is a recipe embedding it.
    pub fn missing_entity(&self) -> Option<EntityKind> {
        match self {
            Error::RecipeNotFound(_) | Error::OwningRecipeNotFound(_) => Some(EntityKind::Recipe),
            Error::IngredientNotFound { .. } => Some(EntityKind::Ingredient),
            Error::UnitOfMeasureNotFound(_) => Some(EntityKind::UnitOfMeasure),
            Error::CategoryNotFound(_) => Some(EntityKind::Category),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
