//! Post-save re-identification of a written ingredient.
//!
//! After a recipe is persisted the caller's in-memory ingredient may not
//! know its generated ID. The resolver finds it again in the persisted
//! aggregate, first by ID and then by natural key.

use std::collections::HashSet;
use std::fmt;

use catalog_core::{Ingredient, NaturalKey, Recipe};

/// Which stage located the ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    Id,
    NaturalKey,
}

impl ResolvedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedBy::Id => "id",
            ResolvedBy::NaturalKey => "natural_key",
        }
    }
}

impl fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-stage lookup of an ingredient inside a freshly saved recipe.
///
/// Ingredients whose IDs existed before the save are never matched by
/// natural key, so an appended duplicate cannot resolve to an older entry.
#[derive(Debug, Default)]
pub struct PostSaveResolver {
    preexisting: HashSet<String>,
}

impl PostSaveResolver {
    /// Snapshot the ingredient IDs of the aggregate about to be saved.
    pub fn before_save(recipe: &Recipe) -> Self {
        Self {
            preexisting: recipe.ingredient_ids().into_iter().map(str::to_string).collect(),
        }
    }

    pub fn by_id<'a>(&self, saved: &'a Recipe, id: &str) -> Option<&'a Ingredient> {
        saved.ingredient(id)
    }

    pub fn by_natural_key<'a>(
        &self,
        saved: &'a Recipe,
        key: &NaturalKey<'_>,
    ) -> Option<&'a Ingredient> {
        saved.ingredients().iter().find(|i| {
            let is_new = i
                .id
                .as_deref()
                .map_or(true, |id| !self.preexisting.contains(id));
            is_new && i.natural_key() == *key
        })
    }

    /// ID match when an ID is known, natural key otherwise or as fallback.
    pub fn resolve<'a>(
        &self,
        saved: &'a Recipe,
        id: Option<&str>,
        key: &NaturalKey<'_>,
    ) -> Option<(&'a Ingredient, ResolvedBy)> {
        if let Some(found) = id.and_then(|id| self.by_id(saved, id)) {
            return Some((found, ResolvedBy::Id));
        }
        self.by_natural_key(saved, key)
            .map(|found| (found, ResolvedBy::NaturalKey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use catalog_core::UnitOfMeasure;

    fn each() -> UnitOfMeasure {
        UnitOfMeasure::new("UOM-1", "Each")
    }

    fn guacamole() -> Recipe {
        Recipe::new("Guacamole").with_id("RECIPE-1").with_ingredient(
            Ingredient::new("Avocado", BigDecimal::from(2), each()).with_id("INGRED-1"),
        )
    }

    #[test]
    fn test_resolves_by_id_first() {
        let before = guacamole();
        let resolver = PostSaveResolver::before_save(&before);
        let mut saved = before.clone();
        saved.add_ingredient(Ingredient::new("Salt", BigDecimal::from(1), each()).with_id("NEW"));

        let candidate = Ingredient::new("Salt", BigDecimal::from(1), each());
        let (found, stage) = resolver
            .resolve(&saved, Some("NEW"), &candidate.natural_key())
            .unwrap();

        assert_eq!(found.id.as_deref(), Some("NEW"));
        assert_eq!(stage, ResolvedBy::Id);
    }

    #[test]
    fn test_falls_back_to_natural_key() {
        let before = guacamole();
        let resolver = PostSaveResolver::before_save(&before);
        let mut saved = before.clone();
        saved.add_ingredient(
            Ingredient::new("Salt", "1.00".parse().unwrap(), each()).with_id("GENERATED"),
        );

        let candidate = Ingredient::new("Salt", BigDecimal::from(1), each());
        let (found, stage) = resolver
            .resolve(&saved, None, &candidate.natural_key())
            .unwrap();

        assert_eq!(found.id.as_deref(), Some("GENERATED"));
        assert_eq!(stage, ResolvedBy::NaturalKey);
    }

    #[test]
    fn test_natural_key_skips_preexisting_duplicate() {
        let before = guacamole();
        let resolver = PostSaveResolver::before_save(&before);
        let mut saved = before.clone();
        saved.add_ingredient(
            Ingredient::new("Avocado", BigDecimal::from(2), each()).with_id("SECOND"),
        );

        let candidate = Ingredient::new("Avocado", BigDecimal::from(2), each());
        let (found, _) = resolver
            .resolve(&saved, None, &candidate.natural_key())
            .unwrap();

        assert_eq!(found.id.as_deref(), Some("SECOND"));
    }

    #[test]
    fn test_no_match_yields_none() {
        let before = guacamole();
        let resolver = PostSaveResolver::before_save(&before);
        let candidate = Ingredient::new("Salt", BigDecimal::from(1), each());

        assert!(resolver
            .resolve(&before, Some("MISSING"), &candidate.natural_key())
            .is_none());
    }
}
