//! Bidirectional converters between entities and transfer representations.
//!
//! Converters are stateless and purely structural: no validation, no lookups.
//! The `_opt` variants are nil-safe (`None` in, `None` out) and the `_all`
//! variants map N items to N items.

use crate::models::{Category, Ingredient, Notes, Recipe, UnitOfMeasure};
use crate::transfer::{CategoryDto, IngredientDto, NotesDto, RecipeDto, UnitOfMeasureDto};

/// Structural mapping between an entity and its transfer form.
pub trait BiConverter {
    type Entity;
    type Transfer;

    fn to_transfer(&self, entity: &Self::Entity) -> Self::Transfer;

    fn to_entity(&self, transfer: &Self::Transfer) -> Self::Entity;

    fn to_transfer_opt(&self, entity: Option<&Self::Entity>) -> Option<Self::Transfer> {
        entity.map(|e| self.to_transfer(e))
    }

    fn to_entity_opt(&self, transfer: Option<&Self::Transfer>) -> Option<Self::Entity> {
        transfer.map(|t| self.to_entity(t))
    }

    fn to_transfer_all<'a, I>(&self, entities: I) -> Vec<Self::Transfer>
    where
        I: IntoIterator<Item = &'a Self::Entity>,
        Self::Entity: 'a,
    {
        entities.into_iter().map(|e| self.to_transfer(e)).collect()
    }

    fn to_entity_all<'a, I>(&self, transfers: I) -> Vec<Self::Entity>
    where
        I: IntoIterator<Item = &'a Self::Transfer>,
        Self::Transfer: 'a,
    {
        transfers.into_iter().map(|t| self.to_entity(t)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnitOfMeasureConverter;

impl BiConverter for UnitOfMeasureConverter {
    type Entity = UnitOfMeasure;
    type Transfer = UnitOfMeasureDto;

    fn to_transfer(&self, entity: &UnitOfMeasure) -> UnitOfMeasureDto {
        UnitOfMeasureDto {
            id: entity.id.clone(),
            description: entity.description.clone(),
        }
    }

    fn to_entity(&self, transfer: &UnitOfMeasureDto) -> UnitOfMeasure {
        UnitOfMeasure {
            id: transfer.id.clone(),
            description: transfer.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryConverter;

impl BiConverter for CategoryConverter {
    type Entity = Category;
    type Transfer = CategoryDto;

    fn to_transfer(&self, entity: &Category) -> CategoryDto {
        CategoryDto {
            id: entity.id.clone(),
            description: entity.description.clone(),
        }
    }

    fn to_entity(&self, transfer: &CategoryDto) -> Category {
        Category {
            id: transfer.id.clone(),
            description: transfer.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotesConverter;

impl BiConverter for NotesConverter {
    type Entity = Notes;
    type Transfer = NotesDto;

    fn to_transfer(&self, entity: &Notes) -> NotesDto {
        NotesDto {
            id: entity.id.clone(),
            recipe_id: entity.recipe_id.clone(),
            recipe_notes: entity.recipe_notes.clone(),
        }
    }

    fn to_entity(&self, transfer: &NotesDto) -> Notes {
        Notes {
            id: transfer.id.clone(),
            recipe_id: transfer.recipe_id.clone(),
            recipe_notes: transfer.recipe_notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngredientConverter {
    uom: UnitOfMeasureConverter,
}

impl IngredientConverter {
    /// Convert and stamp the owning recipe ID on the view.
    pub fn to_transfer_in(&self, recipe_id: Option<&str>, entity: &Ingredient) -> IngredientDto {
        let mut dto = self.to_transfer(entity);
        dto.recipe_id = recipe_id.map(str::to_string);
        dto
    }
}

impl BiConverter for IngredientConverter {
    type Entity = Ingredient;
    type Transfer = IngredientDto;

    fn to_transfer(&self, entity: &Ingredient) -> IngredientDto {
        IngredientDto {
            id: entity.id.clone(),
            recipe_id: None,
            description: entity.description.clone(),
            amount: entity.amount.clone(),
            uom: self.uom.to_transfer(&entity.uom),
        }
    }

    fn to_entity(&self, transfer: &IngredientDto) -> Ingredient {
        Ingredient {
            id: transfer.id.clone(),
            description: transfer.description.clone(),
            amount: transfer.amount.clone(),
            uom: self.uom.to_entity(&transfer.uom),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeConverter {
    ingredients: IngredientConverter,
    notes: NotesConverter,
    categories: CategoryConverter,
}

impl BiConverter for RecipeConverter {
    type Entity = Recipe;
    type Transfer = RecipeDto;

    fn to_transfer(&self, entity: &Recipe) -> RecipeDto {
        let recipe_id = entity.id();
        RecipeDto {
            id: recipe_id.map(str::to_string),
            description: entity.description.clone(),
            prep_time: entity.prep_time,
            cook_time: entity.cook_time,
            servings: entity.servings,
            source: entity.source.clone(),
            url: entity.url.clone(),
            directions: entity.directions.clone(),
            difficulty: entity.difficulty,
            image: entity.image.clone(),
            notes: self.notes.to_transfer_opt(entity.notes()),
            ingredients: entity
                .ingredients()
                .iter()
                .map(|i| self.ingredients.to_transfer_in(recipe_id, i))
                .collect(),
            categories: self.categories.to_transfer_all(&entity.categories),
        }
    }

    fn to_entity(&self, transfer: &RecipeDto) -> Recipe {
        let mut recipe = Recipe::new(transfer.description.clone());
        recipe.prep_time = transfer.prep_time;
        recipe.cook_time = transfer.cook_time;
        recipe.servings = transfer.servings;
        recipe.source = transfer.source.clone();
        recipe.url = transfer.url.clone();
        recipe.directions = transfer.directions.clone();
        recipe.difficulty = transfer.difficulty;
        recipe.image = transfer.image.clone();
        recipe.ingredients = self.ingredients.to_entity_all(&transfer.ingredients);
        recipe.categories = self.categories.to_entity_all(&transfer.categories);
        recipe.set_id(transfer.id.clone());
        recipe.set_notes(self.notes.to_entity_opt(transfer.notes.as_ref()));
        recipe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use bigdecimal::BigDecimal;

    fn ingredient_dto(id: Option<&str>) -> IngredientDto {
        IngredientDto {
            id: id.map(str::to_string),
            recipe_id: None,
            description: "Avocado".to_string(),
            amount: BigDecimal::from(2),
            uom: UnitOfMeasureDto {
                id: Some("UOM-1".to_string()),
                description: "Each".to_string(),
            },
        }
    }

    #[test]
    fn test_nil_input_yields_nil_output() {
        assert!(UnitOfMeasureConverter.to_transfer_opt(None).is_none());
        assert!(CategoryConverter.to_entity_opt(None).is_none());
        assert!(IngredientConverter::default().to_transfer_opt(None).is_none());
        assert!(RecipeConverter::default().to_entity_opt(None).is_none());
    }

    #[test]
    fn test_ingredient_converts_nested_unit() {
        let entity = IngredientConverter::default().to_entity(&ingredient_dto(Some("INGRED-1")));

        assert_eq!(entity.id.as_deref(), Some("INGRED-1"));
        assert_eq!(entity.uom.id.as_deref(), Some("UOM-1"));
        assert_eq!(entity.uom.description, "Each");
        assert_eq!(entity.amount, BigDecimal::from(2));
    }

    #[test]
    fn test_ingredient_view_carries_recipe_id() {
        let entity = IngredientConverter::default().to_entity(&ingredient_dto(Some("INGRED-1")));
        let view = IngredientConverter::default().to_transfer_in(Some("RECIPE-1"), &entity);
        assert_eq!(view.recipe_id.as_deref(), Some("RECIPE-1"));
    }

    #[test]
    fn test_collection_conversion_preserves_count() {
        let categories = vec![
            Category::new("CAT-1", "American"),
            Category::new("CAT-2", "Mexican"),
            Category::new("CAT-3", "Italian"),
        ];
        let dtos = CategoryConverter.to_transfer_all(&categories);
        assert_eq!(dtos.len(), 3);
    }

    #[test]
    fn test_recipe_to_entity_sets_notes_back_reference() {
        let dto = RecipeDto {
            id: Some("RECIPE-1".to_string()),
            description: "Guacamole".to_string(),
            difficulty: Some(Difficulty::Easy),
            notes: Some(NotesDto {
                id: Some("NOTES-1".to_string()),
                recipe_id: None,
                recipe_notes: "Use ripe avocados".to_string(),
            }),
            ingredients: vec![ingredient_dto(Some("INGRED-1"))],
            categories: vec![CategoryDto {
                id: Some("CAT-1".to_string()),
                description: "Mexican".to_string(),
            }],
            ..Default::default()
        };

        let recipe = RecipeConverter::default().to_entity(&dto);

        assert_eq!(recipe.id(), Some("RECIPE-1"));
        assert_eq!(
            recipe.notes().and_then(|n| n.recipe_id.as_deref()),
            Some("RECIPE-1")
        );
        assert_eq!(recipe.ingredients().len(), 1);
        assert_eq!(recipe.categories.len(), 1);
        assert_eq!(recipe.difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn test_recipe_to_entity_keeps_every_ingredient() {
        let dto = RecipeDto {
            description: "Guacamole".to_string(),
            ingredients: vec![ingredient_dto(None), ingredient_dto(None)],
            ..Default::default()
        };

        let recipe = RecipeConverter::default().to_entity(&dto);
        assert_eq!(recipe.ingredients().len(), 2);
    }

    #[test]
    fn test_recipe_to_transfer_stamps_ingredient_views() {
        let recipe = Recipe::new("Guacamole")
            .with_id("RECIPE-1")
            .with_ingredient(IngredientConverter::default().to_entity(&ingredient_dto(Some("A"))));

        let dto = RecipeConverter::default().to_transfer(&recipe);

        assert_eq!(dto.ingredients.len(), 1);
        assert_eq!(dto.ingredients[0].recipe_id.as_deref(), Some("RECIPE-1"));
    }
}
