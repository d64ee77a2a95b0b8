//! Core data models for the recipe catalog.
//!
//! `Recipe` is the aggregate root. Its `Ingredient`s are embedded and share
//! the recipe's lifetime; `UnitOfMeasure` and `Category` are reference data
//! that the aggregate only links to.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// Unit of measure shared by many ingredients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitOfMeasure {
    pub id: Option<String>,
    pub description: String,
}

impl UnitOfMeasure {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            description: description.into(),
        }
    }
}

/// Recipe category. Many-to-many with recipes, owned by neither side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
    pub id: Option<String>,
    pub description: String,
}

impl Category {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            description: description.into(),
        }
    }
}

/// How hard a recipe is to prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Trivial,
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Trivial => "trivial",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trivial" => Ok(Difficulty::Trivial),
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(Error::InvalidInput(format!("unknown difficulty: {}", other))),
        }
    }
}

// =============================================================================
// INGREDIENT
// =============================================================================

/// Ingredient embedded in a recipe.
///
/// `id` stays `None` until the owning recipe has been persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingredient {
    pub id: Option<String>,
    pub description: String,
    pub amount: BigDecimal,
    pub uom: UnitOfMeasure,
}

/// Fallback identity of an ingredient whose generated ID is unknown.
///
/// Amounts compare numerically, so `2` and `2.00` are the same key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalKey<'a> {
    pub description: &'a str,
    pub amount: &'a BigDecimal,
    pub uom_id: Option<&'a str>,
}

impl Ingredient {
    pub fn new(description: impl Into<String>, amount: BigDecimal, uom: UnitOfMeasure) -> Self {
        Self {
            id: None,
            description: description.into(),
            amount,
            uom,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn natural_key(&self) -> NaturalKey<'_> {
        NaturalKey {
            description: &self.description,
            amount: &self.amount,
            uom_id: self.uom.id.as_deref(),
        }
    }

    /// Aggregate identity: by ID once assigned, by natural key while both
    /// sides are still unidentified.
    pub fn same_identity(&self, other: &Ingredient) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.natural_key() == other.natural_key(),
            _ => false,
        }
    }
}

// =============================================================================
// NOTES
// =============================================================================

/// Free-text notes attached to one recipe.
///
/// `recipe_id` is bookkeeping maintained by [`Recipe::set_notes`], never a
/// source of truth for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    pub id: Option<String>,
    pub recipe_id: Option<String>,
    pub recipe_notes: String,
}

impl Notes {
    pub fn new(recipe_notes: impl Into<String>) -> Self {
        Self {
            id: None,
            recipe_id: None,
            recipe_notes: recipe_notes.into(),
        }
    }
}

// =============================================================================
// RECIPE
// =============================================================================

/// Recipe aggregate: the unit of atomicity in the document store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    id: Option<String>,
    pub description: String,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub directions: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub image: Option<Vec<u8>>,
    notes: Option<Notes>,
    pub(crate) ingredients: Vec<Ingredient>,
    pub categories: Vec<Category>,
}

impl Recipe {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set the recipe ID, keeping the notes back-reference in step.
    pub fn set_id(&mut self, id: Option<String>) {
        if let Some(notes) = self.notes.as_mut() {
            notes.recipe_id = id.clone();
        }
        self.id = id;
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(Some(id.into()));
        self
    }

    pub fn notes(&self) -> Option<&Notes> {
        self.notes.as_ref()
    }

    pub fn notes_mut(&mut self) -> Option<&mut Notes> {
        self.notes.as_mut()
    }

    /// Attach notes and point their back-reference at this recipe.
    pub fn set_notes(&mut self, notes: Option<Notes>) {
        self.notes = notes.map(|mut n| {
            n.recipe_id = self.id.clone();
            n
        });
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    /// Mutable access to the embedded ingredients, for assigning IDs and
    /// refreshing units in place. Nothing can be added through it.
    pub fn ingredients_mut(&mut self) -> std::slice::IterMut<'_, Ingredient> {
        self.ingredients.iter_mut()
    }

    /// Empty the ingredient set and hand back what it held.
    pub fn take_ingredients(&mut self) -> Vec<Ingredient> {
        std::mem::take(&mut self.ingredients)
    }

    /// Append an ingredient unless one with the same identity is present.
    ///
    /// Returns `true` when the ingredient was added.
    pub fn add_ingredient(&mut self, ingredient: Ingredient) -> bool {
        if self.ingredients.iter().any(|i| i.same_identity(&ingredient)) {
            return false;
        }
        self.ingredients.push(ingredient);
        true
    }

    /// Builder form of [`Recipe::add_ingredient`].
    ///
    /// Panics in debug builds when the ingredient duplicates one already
    /// present; release builds drop the duplicate.
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        let added = self.add_ingredient(ingredient);
        debug_assert!(added, "duplicate ingredient passed to Recipe::with_ingredient");
        self
    }

    pub fn ingredient(&self, ingredient_id: &str) -> Option<&Ingredient> {
        self.ingredients
            .iter()
            .find(|i| i.id.as_deref() == Some(ingredient_id))
    }

    pub fn ingredient_mut(&mut self, ingredient_id: &str) -> Option<&mut Ingredient> {
        self.ingredients
            .iter_mut()
            .find(|i| i.id.as_deref() == Some(ingredient_id))
    }

    pub fn remove_ingredient(&mut self, ingredient_id: &str) -> Option<Ingredient> {
        let pos = self
            .ingredients
            .iter()
            .position(|i| i.id.as_deref() == Some(ingredient_id))?;
        Some(self.ingredients.remove(pos))
    }

    /// IDs of every identified ingredient.
    pub fn ingredient_ids(&self) -> Vec<&str> {
        self.ingredients
            .iter()
            .filter_map(|i| i.id.as_deref())
            .collect()
    }

    /// Link a category unless it is already linked.
    pub fn add_category(&mut self, category: Category) -> bool {
        let linked = self
            .categories
            .iter()
            .any(|c| c.id.is_some() && c.id == category.id);
        if linked {
            return false;
        }
        self.categories.push(category);
        true
    }
}
