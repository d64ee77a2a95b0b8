//! Units of measure and categories.
//!
//! Both are independently managed and only linked from recipes, so they
//! are created and looked up here rather than through the recipe aggregate.

use std::sync::Arc;

use tracing::info;

use catalog_core::{
    BiConverter, Category, CategoryConverter, CategoryDto, CategoryRepository, Error, Result,
    UnitOfMeasure, UnitOfMeasureConverter, UnitOfMeasureDto, UnitOfMeasureRepository,
};

#[derive(Clone)]
pub struct ReferenceDataService {
    units: Arc<dyn UnitOfMeasureRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ReferenceDataService {
    pub fn new(
        units: Arc<dyn UnitOfMeasureRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self { units, categories }
    }

    pub async fn list_units(&self) -> Result<Vec<UnitOfMeasureDto>> {
        let units = self.units.list().await?;
        Ok(UnitOfMeasureConverter.to_transfer_all(&units))
    }

    pub async fn find_unit_by_description(&self, description: &str) -> Result<UnitOfMeasureDto> {
        self.units
            .find_by_description(description)
            .await?
            .map(|u| UnitOfMeasureConverter.to_transfer(&u))
            .ok_or_else(|| Error::UnitOfMeasureNotFound(description.to_string()))
    }

    /// Create a unit, or return the existing one with the same description.
    pub async fn create_unit(&self, description: &str) -> Result<UnitOfMeasureDto> {
        let description = non_blank(description, "unit of measure")?;
        if let Some(existing) = self.units.find_by_description(description).await? {
            return Ok(UnitOfMeasureConverter.to_transfer(&existing));
        }

        let created = self
            .units
            .save(UnitOfMeasure {
                id: None,
                description: description.to_string(),
            })
            .await?;
        info!(
            subsystem = "service",
            component = "reference_data",
            op = "create_unit",
            uom_id = created.id.as_deref().unwrap_or_default(),
            "Unit of measure created"
        );
        Ok(UnitOfMeasureConverter.to_transfer(&created))
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryDto>> {
        let categories = self.categories.list().await?;
        Ok(CategoryConverter.to_transfer_all(&categories))
    }

    pub async fn find_category_by_description(&self, description: &str) -> Result<CategoryDto> {
        self.categories
            .find_by_description(description)
            .await?
            .map(|c| CategoryConverter.to_transfer(&c))
            .ok_or_else(|| Error::CategoryNotFound(description.to_string()))
    }

    /// Create a category, or return the existing one with the same description.
    pub async fn create_category(&self, description: &str) -> Result<CategoryDto> {
        let description = non_blank(description, "category")?;
        if let Some(existing) = self.categories.find_by_description(description).await? {
            return Ok(CategoryConverter.to_transfer(&existing));
        }

        let created = self
            .categories
            .save(Category {
                id: None,
                description: description.to_string(),
            })
            .await?;
        info!(
            subsystem = "service",
            component = "reference_data",
            op = "create_category",
            category_id = created.id.as_deref().unwrap_or_default(),
            "Category created"
        );
        Ok(CategoryConverter.to_transfer(&created))
    }
}

fn non_blank<'a>(description: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} description is blank", what)));
    }
    Ok(trimmed)
}
