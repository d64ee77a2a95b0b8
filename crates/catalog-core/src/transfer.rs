//! Transfer representations: the caller-facing shape of each entity.
//!
//! These types carry no behavior. They are produced and consumed by the
//! converters in [`crate::converters`].

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::models::Difficulty;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfMeasureDto {
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl UnitOfMeasureDto {
    /// A reference carrying only the unit ID.
    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesDto {
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(default)]
    pub recipe_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientDto {
    pub id: Option<String>,
    /// Owning recipe, stamped on views produced by the ingredient service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: BigDecimal,
    #[serde(default)]
    pub uom: UnitOfMeasureDto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeDto {
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub directions: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    pub notes: Option<NotesDto>,
    #[serde(default)]
    pub ingredients: Vec<IngredientDto>,
    #[serde(default)]
    pub categories: Vec<CategoryDto>,
}

/// Serde adapter encoding an optional byte blob as standard base64.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
