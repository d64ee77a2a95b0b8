//! In-memory document store for deterministic testing.
//!
//! Stores recipes in the same document shape as the PostgreSQL store, so ID
//! assignment, reference hydration, and validation behave identically. Every
//! repository call is recorded so tests can assert on access patterns.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_db::memory::MemoryDocumentStore;
//!
//! let store = MemoryDocumentStore::new()
//!     .with_unit(UnitOfMeasure::new("UOM-1", "Cup"));
//! let saved = store.insert_recipe(Recipe::new("Pancakes").with_id("RECIPE-1"))?;
//! assert_eq!(store.call_count("save"), 0);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use catalog_core::{
    new_id, Category, CategoryRepository, Recipe, RecipeLocator, RecipeRepository, Result,
    UnitOfMeasure, UnitOfMeasureRepository,
};

use crate::documents::{assign_identities, RecipeDocument};

/// Hook applied to each document right before it is stored.
///
/// Lets tests simulate a store that rewrites data on write.
pub type SaveHook = Arc<dyn Fn(&mut RecipeDocument) + Send + Sync>;

/// A recorded repository call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub operation: String,
    pub key: Option<String>,
}

#[derive(Default)]
struct StoreState {
    recipes: BTreeMap<String, RecipeDocument>,
    units: BTreeMap<String, UnitOfMeasure>,
    categories: BTreeMap<String, Category>,
    calls: Vec<StoreCall>,
}

impl StoreState {
    fn hydrate(&self, doc: RecipeDocument) -> Result<Recipe> {
        doc.into_recipe(
            |id| self.units.get(id).cloned(),
            |id| self.categories.get(id).cloned(),
        )
    }

    fn store(&mut self, mut recipe: Recipe, hook: Option<&SaveHook>) -> Result<Recipe> {
        assign_identities(&mut recipe);
        let mut doc = RecipeDocument::from_recipe(&recipe)?;
        if let Some(hook) = hook {
            hook(&mut doc);
        }

        // Hydrate before committing so a dangling reference leaves state unchanged.
        let saved = self.hydrate(doc.clone())?;
        self.recipes.insert(doc.id.clone(), doc);
        Ok(saved)
    }

    fn sorted(&self, docs: Vec<RecipeDocument>) -> Result<Vec<Recipe>> {
        let mut recipes = docs
            .into_iter()
            .map(|doc| self.hydrate(doc))
            .collect::<Result<Vec<_>>>()?;
        recipes.sort_by(|a, b| {
            a.description
                .cmp(&b.description)
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(recipes)
    }
}

/// In-memory implementation of every catalog repository trait.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<Mutex<StoreState>>,
    save_hook: Option<SaveHook>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a unit of measure. A unit without an ID is given one.
    pub fn with_unit(self, mut uom: UnitOfMeasure) -> Self {
        let id = uom.id.get_or_insert_with(new_id).clone();
        self.lock().units.insert(id, uom);
        self
    }

    /// Seed a category. A category without an ID is given one.
    pub fn with_category(self, mut category: Category) -> Self {
        let id = category.id.get_or_insert_with(new_id).clone();
        self.lock().categories.insert(id, category);
        self
    }

    /// Install a hook that rewrites every document on save.
    pub fn with_save_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RecipeDocument) + Send + Sync + 'static,
    {
        self.save_hook = Some(Arc::new(hook));
        self
    }

    /// Store a recipe without recording a call or running the save hook.
    pub fn insert_recipe(&self, recipe: Recipe) -> Result<Recipe> {
        self.lock().store(recipe, None)
    }

    /// Number of stored recipes.
    pub fn recipe_count(&self) -> usize {
        self.lock().recipes.len()
    }

    /// Number of ingredients embedded in a stored recipe, if it exists.
    pub fn ingredient_count(&self, recipe_id: &str) -> Option<usize> {
        self.lock().recipes.get(recipe_id).map(|d| d.ingredients.len())
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls for an operation.
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, operation: &str, key: Option<&str>) -> MutexGuard<'_, StoreState> {
        let mut state = self.lock();
        state.calls.push(StoreCall {
            operation: operation.to_string(),
            key: key.map(str::to_string),
        });
        state
    }
}

#[async_trait]
impl RecipeLocator for MemoryDocumentStore {
    async fn by_recipe_id(&self, recipe_id: &str) -> Result<Option<Recipe>> {
        let state = self.record("by_recipe_id", Some(recipe_id));
        state
            .recipes
            .get(recipe_id)
            .cloned()
            .map(|doc| state.hydrate(doc))
            .transpose()
    }

    async fn by_embedded_ingredient_id(&self, ingredient_id: &str) -> Result<Option<Recipe>> {
        let state = self.record("by_embedded_ingredient_id", Some(ingredient_id));
        state
            .recipes
            .values()
            .find(|doc| doc.ingredients.iter().any(|i| i.id == ingredient_id))
            .cloned()
            .map(|doc| state.hydrate(doc))
            .transpose()
    }
}

#[async_trait]
impl RecipeRepository for MemoryDocumentStore {
    async fn save(&self, recipe: Recipe) -> Result<Recipe> {
        let mut state = self.record("save", recipe.id());
        state.store(recipe, self.save_hook.as_ref())
    }

    async fn delete(&self, recipe_id: &str) -> Result<bool> {
        let mut state = self.record("delete", Some(recipe_id));
        Ok(state.recipes.remove(recipe_id).is_some())
    }

    async fn list(&self) -> Result<Vec<Recipe>> {
        let state = self.record("list", None);
        let docs = state.recipes.values().cloned().collect();
        state.sorted(docs)
    }

    async fn list_by_category(&self, category_id: &str) -> Result<Vec<Recipe>> {
        let state = self.record("list_by_category", Some(category_id));
        let docs = state
            .recipes
            .values()
            .filter(|doc| doc.category_ids.iter().any(|c| c == category_id))
            .cloned()
            .collect();
        state.sorted(docs)
    }
}

#[async_trait]
impl UnitOfMeasureRepository for MemoryDocumentStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UnitOfMeasure>> {
        let state = self.record("uom.find_by_id", Some(id));
        Ok(state.units.get(id).cloned())
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<UnitOfMeasure>> {
        let state = self.record("uom.find_by_description", Some(description));
        Ok(state
            .units
            .values()
            .find(|u| u.description == description)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<UnitOfMeasure>> {
        let state = self.record("uom.list", None);
        let mut units: Vec<UnitOfMeasure> = state.units.values().cloned().collect();
        units.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(units)
    }

    async fn save(&self, mut uom: UnitOfMeasure) -> Result<UnitOfMeasure> {
        let mut state = self.record("uom.save", uom.id.as_deref());
        let id = uom.id.get_or_insert_with(new_id).clone();
        state.units.insert(id, uom.clone());
        Ok(uom)
    }
}

#[async_trait]
impl CategoryRepository for MemoryDocumentStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        let state = self.record("category.find_by_id", Some(id));
        Ok(state.categories.get(id).cloned())
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<Category>> {
        let state = self.record("category.find_by_description", Some(description));
        Ok(state
            .categories
            .values()
            .find(|c| c.description == description)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let state = self.record("category.list", None);
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(categories)
    }

    async fn save(&self, mut category: Category) -> Result<Category> {
        let mut state = self.record("category.save", category.id.as_deref());
        let id = category.id.get_or_insert_with(new_id).clone();
        state.categories.insert(id, category.clone());
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use catalog_core::{Error, Ingredient};

    fn store() -> MemoryDocumentStore {
        MemoryDocumentStore::new()
            .with_unit(UnitOfMeasure::new("UOM-1", "Cup"))
            .with_category(Category::new("CAT-1", "American"))
    }

    fn cup() -> UnitOfMeasure {
        UnitOfMeasure::new("UOM-1", "Cup")
    }

    #[tokio::test]
    async fn test_save_assigns_ids_and_preserves_existing() {
        let store = store();
        let recipe = Recipe::new("Pancakes")
            .with_ingredient(Ingredient::new("Flour", BigDecimal::from(2), cup()))
            .with_ingredient(Ingredient::new("Milk", BigDecimal::from(1), cup()).with_id("MILK"));

        let saved = RecipeRepository::save(&store, recipe).await.unwrap();

        assert!(saved.id().is_some());
        assert!(saved.ingredients()[0].id.is_some());
        assert_eq!(saved.ingredients()[1].id.as_deref(), Some("MILK"));
        assert_eq!(store.recipe_count(), 1);
        assert_eq!(store.call_count("save"), 1);
    }

    #[tokio::test]
    async fn test_locate_by_embedded_ingredient() {
        let store = store();
        store
            .insert_recipe(
                Recipe::new("Pancakes")
                    .with_id("RECIPE-1")
                    .with_ingredient(
                        Ingredient::new("Flour", BigDecimal::from(2), cup()).with_id("INGRED-1"),
                    ),
            )
            .unwrap();

        let found = store.by_embedded_ingredient_id("INGRED-1").await.unwrap();
        assert_eq!(found.unwrap().id(), Some("RECIPE-1"));

        // The two lookups take different keys.
        assert!(store.by_recipe_id("INGRED-1").await.unwrap().is_none());
        assert!(store
            .by_embedded_ingredient_id("RECIPE-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_save_with_dangling_unit_leaves_state_unchanged() {
        let store = store();
        let recipe = Recipe::new("Soup").with_ingredient(Ingredient::new(
            "Salt",
            BigDecimal::from(1),
            UnitOfMeasure::new("MISSING", "Pinch"),
        ));

        let err = RecipeRepository::save(&store, recipe).await.unwrap_err();

        assert!(matches!(err, Error::UnitOfMeasureNotFound(ref id) if id == "MISSING"));
        assert_eq!(store.recipe_count(), 0);
    }

    #[tokio::test]
    async fn test_save_hook_rewrites_document() {
        let store = store().with_save_hook(|doc| {
            for ingredient in &mut doc.ingredients {
                ingredient.description = ingredient.description.to_uppercase();
            }
        });

        let saved = RecipeRepository::save(
            &store,
            Recipe::new("Soup")
                .with_ingredient(Ingredient::new("salt", BigDecimal::from(1), cup())),
        )
        .await
            .unwrap();

        assert_eq!(saved.ingredients()[0].description, "SALT");
    }

    #[tokio::test]
    async fn test_list_by_category_filters_and_sorts() {
        let store = store();
        let mut waffles = Recipe::new("Waffles");
        waffles.add_category(Category::new("CAT-1", "American"));
        let mut burger = Recipe::new("Burger");
        burger.add_category(Category::new("CAT-1", "American"));
        store.insert_recipe(waffles).unwrap();
        store.insert_recipe(burger).unwrap();
        store.insert_recipe(Recipe::new("Tacos")).unwrap();

        let listed = RecipeRepository::list_by_category(&store, "CAT-1")
            .await
            .unwrap();

        let names: Vec<&str> = listed.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, vec!["Burger", "Waffles"]);
    }

    #[tokio::test]
    async fn test_call_log_records_keys() {
        let store = store();
        store.by_recipe_id("RECIPE-1").await.unwrap();
        UnitOfMeasureRepository::find_by_id(&store, "UOM-1")
            .await
            .unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operation, "by_recipe_id");
        assert_eq!(calls[0].key.as_deref(), Some("RECIPE-1"));

        store.clear_calls();
        assert!(store.calls().is_empty());
    }
}
