//! Ingredient aggregate service behaviour over the in-memory document store.
//!
//! Every test starts from recipe RECIPE-1 holding one ingredient, INGRED-1
//! (2 x UOM-1), and drives the service through its public operations.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use catalog_db::{
    EntityKind, Error, Ingredient, IngredientDto, MemoryDocumentStore, Recipe, RecipeLocator,
    UnitOfMeasure, UnitOfMeasureDto,
};
use catalog_service::CatalogServices;

fn each() -> UnitOfMeasure {
    UnitOfMeasure::new("UOM-1", "Each")
}

fn seeded_store() -> MemoryDocumentStore {
    let store = MemoryDocumentStore::new()
        .with_unit(each())
        .with_unit(UnitOfMeasure::new("UOM-2", "Teaspoon"));
    store
        .insert_recipe(
            Recipe::new("Guacamole").with_id("RECIPE-1").with_ingredient(
                Ingredient::new("Avocado", BigDecimal::from(2), each()).with_id("INGRED-1"),
            ),
        )
        .expect("seed recipe");
    store
}

fn services(store: &MemoryDocumentStore) -> CatalogServices {
    CatalogServices::with_store(Arc::new(store.clone()))
}

fn dto(id: Option<&str>, description: &str, amount: i32, uom_id: &str) -> IngredientDto {
    IngredientDto {
        id: id.map(str::to_string),
        recipe_id: None,
        description: description.to_string(),
        amount: BigDecimal::from(amount),
        uom: UnitOfMeasureDto::reference(uom_id),
    }
}

#[tokio::test]
async fn test_save_without_id_appends_new_ingredient() {
    let store = seeded_store();
    let services = services(&store);

    let view = services
        .ingredients
        .save("RECIPE-1", &dto(None, "Salt", 1, "UOM-1"))
        .await
        .expect("save failed");

    let new_id = view.id.clone().expect("new ingredient must carry an ID");
    assert_ne!(new_id, "INGRED-1");
    assert_eq!(view.recipe_id.as_deref(), Some("RECIPE-1"));
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(2));

    let found = services.ingredients.find("RECIPE-1", &new_id).await.unwrap();
    assert_eq!(found.description, "Salt");
    assert_eq!(found.amount, BigDecimal::from(1));
    assert_eq!(found.uom.id.as_deref(), Some("UOM-1"));
    assert_eq!(found.uom.description, "Each");
}

#[tokio::test]
async fn test_save_duplicate_natural_key_resolves_to_the_new_ingredient() {
    let store = seeded_store();
    let services = services(&store);

    let view = services
        .ingredients
        .save("RECIPE-1", &dto(None, "Avocado", 2, "UOM-1"))
        .await
        .unwrap();

    assert_ne!(view.id.as_deref(), Some("INGRED-1"));
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(2));
}

#[tokio::test]
async fn test_save_echoes_caller_supplied_id_on_create() {
    let store = seeded_store();
    let services = services(&store);

    let view = services
        .ingredients
        .save("RECIPE-1", &dto(Some("CALLER-ID"), "Lime", 1, "UOM-1"))
        .await
        .unwrap();

    assert_eq!(view.id.as_deref(), Some("CALLER-ID"));
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(2));
}

#[tokio::test]
async fn test_blank_id_creates_a_new_ingredient_each_time() {
    let store = seeded_store();
    let services = services(&store);

    let salt = services
        .ingredients
        .save("RECIPE-1", &dto(Some(""), "Salt", 1, "UOM-1"))
        .await
        .unwrap();
    let lime = services
        .ingredients
        .save("RECIPE-1", &dto(Some("  "), "Lime", 1, "UOM-1"))
        .await
        .unwrap();

    let salt_id = salt.id.expect("salt gets a generated ID");
    let lime_id = lime.id.expect("lime gets a generated ID");
    assert!(!salt_id.trim().is_empty());
    assert_ne!(salt_id, lime_id);
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(3));

    let listed = services.ingredients.list_for_recipe("RECIPE-1").await.unwrap();
    let names: Vec<&str> = listed.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(names, vec!["Avocado", "Salt", "Lime"]);
    assert!(store.by_embedded_ingredient_id("").await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_path_overwrites_fields_and_is_idempotent() {
    let store = seeded_store();
    let services = services(&store);
    let mut update = dto(Some("INGRED-1"), "Hass avocado", 3, "UOM-2");
    update.uom.description = "ignored by the service".to_string();

    let first = services.ingredients.save("RECIPE-1", &update).await.unwrap();
    let after_first = store.by_recipe_id("RECIPE-1").await.unwrap();
    let second = services.ingredients.save("RECIPE-1", &update).await.unwrap();
    let after_second = store.by_recipe_id("RECIPE-1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
    assert_eq!(first.id.as_deref(), Some("INGRED-1"));
    assert_eq!(first.description, "Hass avocado");
    assert_eq!(first.amount, BigDecimal::from(3));
    assert_eq!(first.uom.description, "Teaspoon");
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(1));
}

#[tokio::test]
async fn test_update_path_locates_owner_by_ingredient_id() {
    let store = seeded_store();
    let services = services(&store);
    store.clear_calls();

    services
        .ingredients
        .save("RECIPE-1", &dto(Some("INGRED-1"), "Avocado", 4, "UOM-1"))
        .await
        .unwrap();

    assert_eq!(store.call_count("by_embedded_ingredient_id"), 1);
    assert_eq!(store.call_count("by_recipe_id"), 0);
    assert_eq!(store.call_count("save"), 1);
}

#[tokio::test]
async fn test_create_path_requires_existing_recipe() {
    let store = seeded_store();
    let services = services(&store);

    let err = services
        .ingredients
        .save("NO-SUCH-RECIPE", &dto(None, "Salt", 1, "UOM-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RecipeNotFound(ref id) if id == "NO-SUCH-RECIPE"));
    assert_eq!(store.call_count("save"), 0);
    assert_eq!(store.recipe_count(), 1);
}

#[tokio::test]
async fn test_save_rejects_unknown_or_missing_unit() {
    let store = seeded_store();
    let services = services(&store);

    let err = services
        .ingredients
        .save("RECIPE-1", &dto(None, "Salt", 1, "UOM-404"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnitOfMeasureNotFound(ref id) if id == "UOM-404"));

    let mut no_unit = dto(None, "Salt", 1, "UOM-1");
    no_unit.uom.id = None;
    let err = services
        .ingredients
        .save("RECIPE-1", &no_unit)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert_eq!(store.ingredient_count("RECIPE-1"), Some(1));
}

#[tokio::test]
async fn test_unlocatable_write_is_reported_as_inconsistent() {
    let store = seeded_store().with_save_hook(|doc| {
        for ingredient in &mut doc.ingredients {
            ingredient.description = ingredient.description.to_uppercase();
        }
    });
    let services = services(&store);

    let err = services
        .ingredients
        .save("RECIPE-1", &dto(None, "Salt", 1, "UOM-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InconsistentWrite { ref recipe_id, .. } if recipe_id == "RECIPE-1"));
    assert!(!err.is_not_found());
    // The store accepted the write.
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(2));
}

#[tokio::test]
async fn test_find_missing_ingredient_names_the_ingredient() {
    let store = seeded_store();
    let services = services(&store);

    let err = services
        .ingredients
        .find("RECIPE-1", "NOPE")
        .await
        .unwrap_err();

    assert_eq!(err.missing_entity(), Some(EntityKind::Ingredient));
    match err {
        Error::IngredientNotFound {
            recipe_id,
            ingredient_id,
        } => {
            assert_eq!(recipe_id, "RECIPE-1");
            assert_eq!(ingredient_id, "NOPE");
        }
        other => panic!("expected IngredientNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_find_with_swapped_ids_names_the_recipe() {
    let store = seeded_store();
    let services = services(&store);

    let err = services
        .ingredients
        .find("INGRED-1", "RECIPE-1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RecipeNotFound(ref id) if id == "INGRED-1"));
    assert_eq!(err.missing_entity(), Some(EntityKind::Recipe));
}

#[tokio::test]
async fn test_locate_by_ingredient_id_alone() {
    let store = seeded_store();
    let services = services(&store);

    let view = services.ingredients.locate("INGRED-1").await.unwrap();
    assert_eq!(view.recipe_id.as_deref(), Some("RECIPE-1"));

    let err = services.ingredients.locate("RECIPE-1").await.unwrap_err();
    assert!(matches!(err, Error::OwningRecipeNotFound(ref id) if id == "RECIPE-1"));
}

#[tokio::test]
async fn test_remove_twice_then_find() {
    let store = seeded_store();
    let services = services(&store);

    let removed = services
        .ingredients
        .remove("RECIPE-1", "INGRED-1")
        .await
        .unwrap();
    assert!(removed);
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(0));

    let err = services
        .ingredients
        .remove("RECIPE-1", "INGRED-1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::IngredientNotFound { ref recipe_id, ref ingredient_id }
            if recipe_id == "RECIPE-1" && ingredient_id == "INGRED-1"
    ));

    let err = services
        .ingredients
        .find("RECIPE-1", "INGRED-1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IngredientNotFound { .. }));
}

#[tokio::test]
async fn test_remove_refuses_ingredient_of_another_recipe() {
    let store = seeded_store();
    store
        .insert_recipe(Recipe::new("Salsa").with_id("RECIPE-2"))
        .unwrap();
    let services = services(&store);

    let err = services
        .ingredients
        .remove("RECIPE-2", "INGRED-1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::IngredientNotFound { ref recipe_id, .. } if recipe_id == "RECIPE-2"));
    assert_eq!(store.ingredient_count("RECIPE-1"), Some(1));
    assert_eq!(store.call_count("save"), 0);
}

#[tokio::test]
async fn test_list_for_recipe_keeps_order() {
    let store = seeded_store();
    let services = services(&store);
    services
        .ingredients
        .save("RECIPE-1", &dto(None, "Lime", 1, "UOM-1"))
        .await
        .unwrap();

    let listed = services.ingredients.list_for_recipe("RECIPE-1").await.unwrap();
    let names: Vec<&str> = listed.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(names, vec!["Avocado", "Lime"]);
    assert!(listed
        .iter()
        .all(|i| i.recipe_id.as_deref() == Some("RECIPE-1")));

    let err = services.ingredients.list_for_recipe("NOPE").await.unwrap_err();
    assert!(matches!(err, Error::RecipeNotFound(_)));
}
