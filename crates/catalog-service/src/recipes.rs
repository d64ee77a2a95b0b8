//! Whole-recipe operations.

use std::sync::Arc;

use tracing::{debug, info};

use catalog_core::{
    present_id, BiConverter, CategoryRepository, Error, Recipe, RecipeConverter, RecipeDto,
    RecipeRepository, Result, UnitOfMeasureRepository,
};

/// CRUD over recipe aggregates, with reference data resolved on write.
#[derive(Clone)]
pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
    units: Arc<dyn UnitOfMeasureRepository>,
    categories: Arc<dyn CategoryRepository>,
    converter: RecipeConverter,
}

impl RecipeService {
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        units: Arc<dyn UnitOfMeasureRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            recipes,
            units,
            categories,
            converter: RecipeConverter::default(),
        }
    }

    pub async fn find(&self, recipe_id: &str) -> Result<RecipeDto> {
        let recipe = self.recipe(recipe_id).await?;
        Ok(self.converter.to_transfer(&recipe))
    }

    pub async fn list(&self) -> Result<Vec<RecipeDto>> {
        let recipes = self.recipes.list().await?;
        debug!(
            subsystem = "service",
            component = "recipes",
            op = "list",
            result_count = recipes.len(),
            "Listed recipes"
        );
        Ok(self.converter.to_transfer_all(&recipes))
    }

    /// Recipes linked to a category. The category itself must exist.
    pub async fn list_by_category(&self, category_id: &str) -> Result<Vec<RecipeDto>> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(Error::CategoryNotFound(category_id.to_string()));
        }
        let recipes = self.recipes.list_by_category(category_id).await?;
        debug!(
            subsystem = "service",
            component = "recipes",
            op = "list_by_category",
            category_id,
            result_count = recipes.len(),
            "Listed recipes for category"
        );
        Ok(self.converter.to_transfer_all(&recipes))
    }

    /// Upsert a recipe from its transfer form.
    ///
    /// Every ingredient unit and every category must resolve against
    /// reference data; the stored copies replace whatever the caller sent.
    /// Two ingredients with the same identity are rejected as `InvalidInput`.
    pub async fn save(&self, dto: &RecipeDto) -> Result<RecipeDto> {
        let mut recipe = self.converter.to_entity(dto);
        collect_ingredients(&mut recipe)?;
        self.resolve_references(&mut recipe).await?;

        let saved = self.recipes.save(recipe).await?;
        info!(
            subsystem = "service",
            component = "recipes",
            op = "save",
            recipe_id = saved.id().unwrap_or_default(),
            ingredient_count = saved.ingredients().len(),
            "Recipe saved"
        );
        Ok(self.converter.to_transfer(&saved))
    }

    /// Delete a recipe and every ingredient it embeds.
    pub async fn delete(&self, recipe_id: &str) -> Result<()> {
        if !self.recipes.delete(recipe_id).await? {
            return Err(Error::RecipeNotFound(recipe_id.to_string()));
        }
        info!(
            subsystem = "service",
            component = "recipes",
            op = "delete",
            recipe_id,
            "Recipe deleted"
        );
        Ok(())
    }

    /// Replace the recipe image.
    pub async fn save_image(&self, recipe_id: &str, image: Vec<u8>) -> Result<RecipeDto> {
        let mut recipe = self.recipe(recipe_id).await?;
        let size = image.len();
        recipe.image = Some(image);

        let saved = self.recipes.save(recipe).await?;
        debug!(
            subsystem = "service",
            component = "recipes",
            op = "save_image",
            recipe_id,
            image_bytes = size,
            "Recipe image stored"
        );
        Ok(self.converter.to_transfer(&saved))
    }

    async fn recipe(&self, recipe_id: &str) -> Result<Recipe> {
        self.recipes
            .by_recipe_id(recipe_id)
            .await?
            .ok_or_else(|| Error::RecipeNotFound(recipe_id.to_string()))
    }

    async fn resolve_references(&self, recipe: &mut Recipe) -> Result<()> {
        for ingredient in recipe.ingredients_mut() {
            let uom_id = ingredient.uom.id.clone().ok_or_else(|| {
                Error::InvalidInput(format!(
                    "ingredient '{}' has no unit of measure ID",
                    ingredient.description
                ))
            })?;
            ingredient.uom = self
                .units
                .find_by_id(&uom_id)
                .await?
                .ok_or(Error::UnitOfMeasureNotFound(uom_id))?;
        }

        for category in &mut recipe.categories {
            let category_id = category.id.clone().ok_or_else(|| {
                Error::InvalidInput(format!("category '{}' has no ID", category.description))
            })?;
            *category = self
                .categories
                .find_by_id(&category_id)
                .await?
                .ok_or(Error::CategoryNotFound(category_id))?;
        }
        Ok(())
    }
}

/// Re-add every converted ingredient through the aggregate so duplicates
/// are caught. Blank IDs are cleared first.
fn collect_ingredients(recipe: &mut Recipe) -> Result<()> {
    for mut ingredient in recipe.take_ingredients() {
        ingredient.id = present_id(ingredient.id.as_deref()).map(str::to_string);
        let description = ingredient.description.clone();
        if !recipe.add_ingredient(ingredient) {
            return Err(Error::InvalidInput(format!(
                "recipe '{}' lists ingredient '{}' more than once",
                recipe.description, description
            )));
        }
    }
    Ok(())
}
