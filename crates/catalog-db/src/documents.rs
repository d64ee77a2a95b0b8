//! Persisted document shape of the recipe aggregate.
//!
//! A recipe is stored as one JSON document. Ingredients and notes are
//! embedded; units of measure and categories are stored by ID only and
//! hydrated from their own tables whenever a document is loaded.

use std::collections::HashSet;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use catalog_core::transfer::base64_bytes;
use catalog_core::{
    new_id, present_id, Category, Difficulty, Error, Ingredient, Notes, Recipe, Result,
    UnitOfMeasure,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDocument {
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<NotesDocument>,
    #[serde(default)]
    pub ingredients: Vec<IngredientDocument>,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDocument {
    pub id: String,
    pub description: String,
    pub amount: BigDecimal,
    pub uom_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesDocument {
    pub id: String,
    pub recipe_notes: String,
}

/// Give the recipe, its notes, and every unidentified ingredient a fresh ID.
///
/// Missing and blank IDs are replaced; any other ID is kept untouched.
pub fn assign_identities(recipe: &mut Recipe) {
    let id = present_id(recipe.id())
        .map(str::to_string)
        .unwrap_or_else(new_id);
    recipe.set_id(Some(id));

    if let Some(notes) = recipe.notes_mut() {
        if present_id(notes.id.as_deref()).is_none() {
            notes.id = Some(new_id());
        }
    }

    for ingredient in recipe.ingredients_mut() {
        if present_id(ingredient.id.as_deref()).is_none() {
            ingredient.id = Some(new_id());
        }
    }
}

impl RecipeDocument {
    /// Build the document for a recipe whose identities are assigned.
    ///
    /// Fails if an ingredient has no unit, a category has no ID, or two
    /// ingredients share an ID.
    pub fn from_recipe(recipe: &Recipe) -> Result<Self> {
        let id = recipe
            .id()
            .ok_or_else(|| Error::Internal("recipe saved without an ID".to_string()))?
            .to_string();

        let mut seen = HashSet::new();
        let mut ingredients = Vec::with_capacity(recipe.ingredients().len());
        for ingredient in recipe.ingredients() {
            let ingredient_id = ingredient.id.clone().ok_or_else(|| {
                Error::Internal(format!("ingredient saved without an ID in recipe {}", id))
            })?;
            if !seen.insert(ingredient_id.clone()) {
                return Err(Error::InvalidInput(format!(
                    "recipe {} contains ingredient {} twice",
                    id, ingredient_id
                )));
            }
            let uom_id = ingredient.uom.id.clone().ok_or_else(|| {
                Error::InvalidInput(format!(
                    "ingredient {} has no unit of measure",
                    ingredient_id
                ))
            })?;
            ingredients.push(IngredientDocument {
                id: ingredient_id,
                description: ingredient.description.clone(),
                amount: ingredient.amount.clone(),
                uom_id,
            });
        }

        let mut category_ids: Vec<String> = Vec::with_capacity(recipe.categories.len());
        for category in &recipe.categories {
            let category_id = category.id.clone().ok_or_else(|| {
                Error::InvalidInput(format!(
                    "category '{}' linked to recipe {} has no ID",
                    category.description, id
                ))
            })?;
            if !category_ids.contains(&category_id) {
                category_ids.push(category_id);
            }
        }

        let notes = match recipe.notes() {
            Some(n) => Some(NotesDocument {
                id: n.id.clone().ok_or_else(|| {
                    Error::Internal(format!("notes saved without an ID in recipe {}", id))
                })?,
                recipe_notes: n.recipe_notes.clone(),
            }),
            None => None,
        };

        Ok(Self {
            id,
            description: recipe.description.clone(),
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings: recipe.servings,
            source: recipe.source.clone(),
            url: recipe.url.clone(),
            directions: recipe.directions.clone(),
            difficulty: recipe.difficulty,
            image: recipe.image.clone(),
            notes,
            ingredients,
            category_ids,
        })
    }

    /// Distinct unit IDs referenced by embedded ingredients.
    pub fn uom_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ingredients.iter().map(|i| i.uom_id.clone()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Rebuild the entity, resolving references through the given lookups.
    ///
    /// A dangling unit or category reference is a NotFound for that entity.
    /// A document embedding the same ingredient ID twice is rejected.
    pub fn into_recipe<U, C>(self, unit: U, category: C) -> Result<Recipe>
    where
        U: Fn(&str) -> Option<UnitOfMeasure>,
        C: Fn(&str) -> Option<Category>,
    {
        let mut recipe = Recipe::new(self.description);
        recipe.prep_time = self.prep_time;
        recipe.cook_time = self.cook_time;
        recipe.servings = self.servings;
        recipe.source = self.source;
        recipe.url = self.url;
        recipe.directions = self.directions;
        recipe.difficulty = self.difficulty;
        recipe.image = self.image;
        recipe.set_id(Some(self.id));

        for doc in self.ingredients {
            let uom = unit(&doc.uom_id).ok_or(Error::UnitOfMeasureNotFound(doc.uom_id))?;
            let ingredient_id = doc.id.clone();
            let ingredient = Ingredient::new(doc.description, doc.amount, uom).with_id(doc.id);
            if !recipe.add_ingredient(ingredient) {
                return Err(Error::Internal(format!(
                    "stored recipe {} embeds ingredient {} twice",
                    recipe.id().unwrap_or_default(),
                    ingredient_id
                )));
            }
        }

        for category_id in self.category_ids {
            let linked = category(&category_id).ok_or(Error::CategoryNotFound(category_id))?;
            recipe.categories.push(linked);
        }

        recipe.set_notes(self.notes.map(|n| Notes {
            id: Some(n.id),
            recipe_id: None,
            recipe_notes: n.recipe_notes,
        }));

        Ok(recipe)
    }
}
