//! catalog-seed: create the catalog schema and load reference data.
//!
//! Seeding is idempotent: units and categories are matched by description
//! and only missing ones are inserted. The sample recipe is skipped when a
//! recipe with the same description already exists.

use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_db::{
    defaults, Category, CategoryRepository, Database, Ingredient, Notes, PoolConfig, Recipe,
    RecipeRepository, UnitOfMeasure, UnitOfMeasureRepository,
};

#[derive(Parser)]
#[command(name = "catalog-seed")]
#[command(author, version, about = "Prepare a recipe catalog database")]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", default_value = defaults::DATABASE_URL)]
    database_url: String,

    /// Assume the tables already exist instead of creating them
    #[arg(long)]
    skip_schema: bool,

    /// Also insert a sample recipe
    #[arg(long)]
    sample_recipes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let db = Database::connect_with_config(&cli.database_url, PoolConfig::from_env())
        .await
        .context("failed to connect to database")?;

    if cli.skip_schema {
        warn!(subsystem = "seed", op = "schema", "Skipping schema creation");
    } else {
        db.ensure_schema().await.context("failed to create schema")?;
        info!(subsystem = "seed", op = "schema", "Catalog schema ready");
    }

    let units = seed_units(&db).await?;
    let categories = seed_categories(&db).await?;
    info!(
        subsystem = "seed",
        op = "reference_data",
        units = units.len(),
        categories = categories.len(),
        "Reference data ready"
    );

    if cli.sample_recipes {
        seed_sample_recipe(&db, &units, &categories).await?;
    }

    catalog_db::log_pool_metrics(db.pool());
    Ok(())
}

// Environment:
//   LOG_FORMAT  - "json" or "text" (default: "text")
//   RUST_LOG    - standard env filter (default: "catalog_db=info,catalog_seed=info")
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalog_db=info,catalog_seed=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn seed_units(db: &Database) -> Result<Vec<UnitOfMeasure>> {
    let mut seeded = Vec::with_capacity(defaults::SEED_UNITS.len());
    for description in defaults::SEED_UNITS {
        let uom = match db.units.find_by_description(description).await? {
            Some(existing) => existing,
            None => {
                db.units
                    .save(UnitOfMeasure {
                        id: None,
                        description: description.to_string(),
                    })
                    .await?
            }
        };
        seeded.push(uom);
    }
    Ok(seeded)
}

async fn seed_categories(db: &Database) -> Result<Vec<Category>> {
    let mut seeded = Vec::with_capacity(defaults::SEED_CATEGORIES.len());
    for description in defaults::SEED_CATEGORIES {
        let category = match db.categories.find_by_description(description).await? {
            Some(existing) => existing,
            None => {
                db.categories
                    .save(Category {
                        id: None,
                        description: description.to_string(),
                    })
                    .await?
            }
        };
        seeded.push(category);
    }
    Ok(seeded)
}

async fn seed_sample_recipe(
    db: &Database,
    units: &[UnitOfMeasure],
    categories: &[Category],
) -> Result<()> {
    const DESCRIPTION: &str = "Perfect Guacamole";

    let existing = RecipeRepository::list(&db.recipes).await?;
    if existing.iter().any(|r| r.description == DESCRIPTION) {
        info!(subsystem = "seed", op = "sample_recipe", "Sample recipe already present");
        return Ok(());
    }

    let unit = |name: &str| {
        units
            .iter()
            .find(|u| u.description == name)
            .cloned()
            .with_context(|| format!("unit '{}' was not seeded", name))
    };

    let mut recipe = Recipe::new(DESCRIPTION);
    recipe.prep_time = Some(10);
    recipe.cook_time = Some(0);
    recipe.servings = Some(4);
    recipe.source = Some("Simply Recipes".to_string());
    recipe.directions = Some(
        "Cut the avocados, scoop out the flesh, and mash with a fork. \
         Stir in salt, lime juice, onion, cilantro, and chiles."
            .to_string(),
    );
    recipe.difficulty = Some(catalog_db::Difficulty::Easy);
    recipe.set_notes(Some(Notes::new("Serve immediately; guacamole browns quickly.")));

    recipe.add_ingredient(Ingredient::new("ripe avocados", BigDecimal::from(2), unit("Each")?));
    recipe.add_ingredient(Ingredient::new("kosher salt", "0.5".parse()?, unit("Teaspoon")?));
    recipe.add_ingredient(Ingredient::new(
        "fresh lime juice",
        BigDecimal::from(1),
        unit("Tablespoon")?,
    ));
    recipe.add_ingredient(Ingredient::new(
        "cilantro, finely chopped",
        BigDecimal::from(2),
        unit("Tablespoon")?,
    ));
    recipe.add_ingredient(Ingredient::new(
        "freshly grated black pepper",
        BigDecimal::from(1),
        unit("Dash")?,
    ));

    for category in categories
        .iter()
        .filter(|c| c.description == "Mexican" || c.description == "American")
    {
        recipe.add_category(category.clone());
    }

    let saved = db.recipes.save(recipe).await?;
    info!(
        subsystem = "seed",
        op = "sample_recipe",
        recipe_id = saved.id().unwrap_or_default(),
        ingredient_count = saved.ingredients().len(),
        "Sample recipe inserted"
    );
    Ok(())
}
