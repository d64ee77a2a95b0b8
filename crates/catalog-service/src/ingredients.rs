//! Ingredient operations scoped to their owning recipe.
//!
//! Ingredients live inside the recipe document, so every mutation is a
//! read-modify-write of the whole aggregate: locate the owning recipe,
//! change its ingredient set, save the recipe, then re-read the result from
//! the persisted aggregate rather than from the object that was sent.
//!
//! ## Locating the owner
//!
//! - `find` and `list_for_recipe` resolve the recipe by its own ID and scan
//!   its ingredients.
//! - `save` and `remove` ask the store which recipe embeds the ingredient ID.
//! - `locate` resolves an ingredient from its ID alone.
//!
//! The two lookups take different keys. Passing a recipe ID where an
//! ingredient ID is expected (or the reverse) surfaces as a NotFound naming
//! the entity that was missing.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use catalog_core::{
    present_id, Error, Ingredient, IngredientConverter, IngredientDto, Recipe, RecipeRepository,
    Result, UnitOfMeasure, UnitOfMeasureRepository,
};

use crate::resolver::PostSaveResolver;

/// Find, upsert, and remove ingredients embedded in recipes.
#[derive(Clone)]
pub struct IngredientService {
    recipes: Arc<dyn RecipeRepository>,
    units: Arc<dyn UnitOfMeasureRepository>,
    converter: IngredientConverter,
}

impl IngredientService {
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        units: Arc<dyn UnitOfMeasureRepository>,
    ) -> Self {
        Self {
            recipes,
            units,
            converter: IngredientConverter::default(),
        }
    }

    /// Find one ingredient of a recipe.
    ///
    /// Fails with `RecipeNotFound` when the recipe is absent and with
    /// `IngredientNotFound` when the recipe exists without that ingredient.
    pub async fn find(&self, recipe_id: &str, ingredient_id: &str) -> Result<IngredientDto> {
        let recipe = self.recipe(recipe_id).await?;

        let ingredient = recipe
            .ingredient(ingredient_id)
            .ok_or_else(|| Error::IngredientNotFound {
                recipe_id: recipe_id.to_string(),
                ingredient_id: ingredient_id.to_string(),
            })?;

        Ok(self.view(&recipe, ingredient))
    }

    /// Find an ingredient by its ID alone, whichever recipe embeds it.
    pub async fn locate(&self, ingredient_id: &str) -> Result<IngredientDto> {
        let owner = self
            .recipes
            .by_embedded_ingredient_id(ingredient_id)
            .await?
            .ok_or_else(|| Error::OwningRecipeNotFound(ingredient_id.to_string()))?;

        let ingredient = owner.ingredient(ingredient_id).ok_or_else(|| {
            Error::Internal(format!(
                "recipe {} matched ingredient {} but does not contain it",
                owner.id().unwrap_or_default(),
                ingredient_id
            ))
        })?;

        Ok(self.view(&owner, ingredient))
    }

    /// All ingredients of a recipe, in stored order.
    pub async fn list_for_recipe(&self, recipe_id: &str) -> Result<Vec<IngredientDto>> {
        let recipe = self.recipe(recipe_id).await?;
        Ok(recipe
            .ingredients()
            .iter()
            .map(|i| self.view(&recipe, i))
            .collect())
    }

    /// Create or update an ingredient.
    ///
    /// The path is chosen by whether some recipe already embeds an
    /// ingredient with the DTO's ID, not by a flag. A blank ID counts as no
    /// ID.
    ///
    /// - **update**: overwrite description, amount and unit on the embedded
    ///   ingredient, save, and re-read it by ID.
    /// - **create**: the recipe must exist; append a new ingredient, save,
    ///   and re-locate it by ID or natural key.
    ///
    /// A write the store accepted but whose ingredient cannot be found again
    /// fails with `InconsistentWrite`.
    pub async fn save(&self, recipe_id: &str, dto: &IngredientDto) -> Result<IngredientDto> {
        let start = Instant::now();
        let uom = self.resolve_unit(dto).await?;
        let ingredient_id = present_id(dto.id.as_deref());

        let owner = match ingredient_id {
            Some(id) => self.recipes.by_embedded_ingredient_id(id).await?,
            None => None,
        };

        let view = match (owner, ingredient_id) {
            (Some(owner), Some(ingredient_id)) => {
                self.update(recipe_id, owner, ingredient_id, dto, uom).await?
            }
            _ => self.create(recipe_id, ingredient_id, dto, uom).await?,
        };

        debug!(
            subsystem = "service",
            component = "ingredients",
            op = "save",
            recipe_id = view.recipe_id.as_deref().unwrap_or(recipe_id),
            ingredient_id = view.id.as_deref().unwrap_or_default(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Ingredient saved"
        );
        Ok(view)
    }

    /// Remove an ingredient from its recipe.
    ///
    /// The owner is resolved through the embedded-ingredient lookup, so an
    /// ingredient that no recipe embeds fails with `IngredientNotFound`
    /// carrying both IDs. So does one embedded in a different recipe than
    /// `recipe_id`. Returns whether the ingredient set shrank.
    pub async fn remove(&self, recipe_id: &str, ingredient_id: &str) -> Result<bool> {
        let not_found = || Error::IngredientNotFound {
            recipe_id: recipe_id.to_string(),
            ingredient_id: ingredient_id.to_string(),
        };

        let mut owner = self
            .recipes
            .by_embedded_ingredient_id(ingredient_id)
            .await?
            .ok_or_else(not_found)?;

        if owner.id() != Some(recipe_id) {
            warn!(
                subsystem = "service",
                component = "ingredients",
                op = "remove",
                recipe_id,
                ingredient_id,
                owner_id = owner.id().unwrap_or_default(),
                "Ingredient belongs to a different recipe; refusing to remove"
            );
            return Err(not_found());
        }

        let before = owner.ingredients().len();
        owner.remove_ingredient(ingredient_id);
        let after = owner.ingredients().len();

        self.recipes.save(owner).await?;

        let removed = after < before;
        debug!(
            subsystem = "service",
            component = "ingredients",
            op = "remove",
            recipe_id,
            ingredient_id,
            ingredient_count = after,
            success = removed,
            "Ingredient removal persisted"
        );
        Ok(removed)
    }

    async fn update(
        &self,
        recipe_id: &str,
        mut owner: Recipe,
        ingredient_id: &str,
        dto: &IngredientDto,
        uom: UnitOfMeasure,
    ) -> Result<IngredientDto> {
        let owner_id = owner.id().unwrap_or_default().to_string();
        if owner_id != recipe_id {
            warn!(
                subsystem = "service",
                component = "ingredients",
                op = "save",
                recipe_id,
                ingredient_id,
                owner_id = %owner_id,
                "Ingredient is owned by a different recipe; updating it in place"
            );
        }
        debug!(
            subsystem = "service",
            component = "ingredients",
            op = "save",
            save_path = "update",
            recipe_id = %owner_id,
            ingredient_id,
            "Updating embedded ingredient"
        );

        let existing = owner.ingredient_mut(ingredient_id).ok_or_else(|| {
            Error::Internal(format!(
                "recipe {} matched ingredient {} but does not contain it",
                owner_id, ingredient_id
            ))
        })?;
        existing.description = dto.description.clone();
        existing.amount = dto.amount.clone();
        existing.uom = uom;

        let saved = self.recipes.save(owner).await?;
        let resolver = PostSaveResolver::default();
        match resolver.by_id(&saved, ingredient_id) {
            Some(ingredient) => Ok(self.view(&saved, ingredient)),
            None => Err(inconsistent(&saved, &dto.description)),
        }
    }

    async fn create(
        &self,
        recipe_id: &str,
        ingredient_id: Option<&str>,
        dto: &IngredientDto,
        uom: UnitOfMeasure,
    ) -> Result<IngredientDto> {
        let mut recipe = self.recipe(recipe_id).await?;
        debug!(
            subsystem = "service",
            component = "ingredients",
            op = "save",
            save_path = "create",
            recipe_id,
            ingredient_count = recipe.ingredients().len(),
            "Appending ingredient"
        );

        let mut candidate = Ingredient::new(dto.description.clone(), dto.amount.clone(), uom);
        candidate.id = ingredient_id.map(str::to_string);

        let resolver = PostSaveResolver::before_save(&recipe);
        if !recipe.add_ingredient(candidate.clone()) {
            return Err(Error::InvalidInput(format!(
                "recipe {} already contains ingredient '{}'",
                recipe_id, dto.description
            )));
        }

        let saved = self.recipes.save(recipe).await?;

        match resolver.resolve(&saved, candidate.id.as_deref(), &candidate.natural_key()) {
            Some((ingredient, stage)) => {
                debug!(
                    subsystem = "service",
                    component = "ingredients",
                    op = "save",
                    recipe_id,
                    ingredient_id = ingredient.id.as_deref().unwrap_or_default(),
                    resolved_by = stage.as_str(),
                    "Re-identified created ingredient"
                );
                Ok(self.view(&saved, ingredient))
            }
            None => Err(inconsistent(&saved, &dto.description)),
        }
    }

    async fn recipe(&self, recipe_id: &str) -> Result<Recipe> {
        self.recipes
            .by_recipe_id(recipe_id)
            .await?
            .ok_or_else(|| Error::RecipeNotFound(recipe_id.to_string()))
    }

    async fn resolve_unit(&self, dto: &IngredientDto) -> Result<UnitOfMeasure> {
        let uom_id = dto.uom.id.as_deref().ok_or_else(|| {
            Error::InvalidInput(format!(
                "ingredient '{}' has no unit of measure ID",
                dto.description
            ))
        })?;

        self.units
            .find_by_id(uom_id)
            .await?
            .ok_or_else(|| Error::UnitOfMeasureNotFound(uom_id.to_string()))
    }

    fn view(&self, recipe: &Recipe, ingredient: &Ingredient) -> IngredientDto {
        self.converter.to_transfer_in(recipe.id(), ingredient)
    }
}

fn inconsistent(saved: &Recipe, description: &str) -> Error {
    let recipe_id = saved.id().unwrap_or_default().to_string();
    error!(
        subsystem = "service",
        component = "ingredients",
        op = "save",
        recipe_id = %recipe_id,
        ingredient_count = saved.ingredients().len(),
        "Saved ingredient '{}' cannot be located in the persisted recipe",
        description
    );
    Error::InconsistentWrite {
        recipe_id,
        description: format!("ingredient '{}' not found after save", description),
    }
}
