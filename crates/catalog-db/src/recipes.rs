//! Recipe document repository over PostgreSQL JSONB.
//!
//! Each recipe aggregate is one row in `recipe`. Writes replace the whole
//! document in a single upsert; the embedded-ingredient lookup is a JSONB
//! containment query served by a GIN index.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgConnection, Pool, Postgres, Row};
use tracing::{debug, trace};

use catalog_core::{
    Category, Error, Recipe, RecipeLocator, RecipeRepository, Result, UnitOfMeasure,
};

use crate::documents::{assign_identities, RecipeDocument};

/// PostgreSQL implementation of RecipeRepository.
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: Pool<Postgres>,
}

impl PgRecipeRepository {
    /// Create a new PgRecipeRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn load_one(&self, query: &str, key: &str) -> Result<Option<Recipe>> {
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;

        let doc = sqlx::query_scalar::<_, Json<RecipeDocument>>(query)
            .bind(key)
            .fetch_optional(&mut *conn)
            .await
            .map_err(Error::Database)?;

        match doc {
            Some(Json(doc)) => Ok(hydrate(&mut conn, vec![doc]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn load_many(&self, query: &str, key: Option<&str>) -> Result<Vec<Recipe>> {
        let mut conn = self.pool.acquire().await.map_err(Error::Database)?;

        let mut q = sqlx::query_scalar::<_, Json<RecipeDocument>>(query);
        if let Some(key) = key {
            q = q.bind(key);
        }
        let docs = q
            .fetch_all(&mut *conn)
            .await
            .map_err(Error::Database)?
            .into_iter()
            .map(|Json(doc)| doc)
            .collect();

        hydrate(&mut conn, docs).await
    }
}

/// Resolve unit and category references for a batch of documents.
async fn hydrate(conn: &mut PgConnection, docs: Vec<RecipeDocument>) -> Result<Vec<Recipe>> {
    if docs.is_empty() {
        return Ok(Vec::new());
    }

    let mut uom_ids: Vec<String> = docs.iter().flat_map(|d| d.uom_ids()).collect();
    uom_ids.sort_unstable();
    uom_ids.dedup();
    let mut category_ids: Vec<String> = docs.iter().flat_map(|d| d.category_ids.clone()).collect();
    category_ids.sort_unstable();
    category_ids.dedup();

    trace!(
        subsystem = "db",
        component = "recipes",
        op = "hydrate",
        documents = docs.len(),
        uom_refs = uom_ids.len(),
        category_refs = category_ids.len(),
        "Hydrating recipe references"
    );

    let units: HashMap<String, UnitOfMeasure> = if uom_ids.is_empty() {
        HashMap::new()
    } else {
        sqlx::query("SELECT id, description FROM unit_of_measure WHERE id = ANY($1)")
            .bind(&uom_ids)
            .fetch_all(&mut *conn)
            .await
            .map_err(Error::Database)?
            .into_iter()
            .map(|row| {
                let id: String = row.get("id");
                (id.clone(), UnitOfMeasure::new(id, row.get::<String, _>("description")))
            })
            .collect()
    };

    let categories: HashMap<String, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        sqlx::query("SELECT id, description FROM category WHERE id = ANY($1)")
            .bind(&category_ids)
            .fetch_all(&mut *conn)
            .await
            .map_err(Error::Database)?
            .into_iter()
            .map(|row| {
                let id: String = row.get("id");
                (id.clone(), Category::new(id, row.get::<String, _>("description")))
            })
            .collect()
    };

    docs.into_iter()
        .map(|doc| {
            doc.into_recipe(
                |id| units.get(id).cloned(),
                |id| categories.get(id).cloned(),
            )
        })
        .collect()
}

#[async_trait]
impl RecipeLocator for PgRecipeRepository {
    async fn by_recipe_id(&self, recipe_id: &str) -> Result<Option<Recipe>> {
        self.load_one("SELECT doc FROM recipe WHERE id = $1", recipe_id)
            .await
    }

    async fn by_embedded_ingredient_id(&self, ingredient_id: &str) -> Result<Option<Recipe>> {
        self.load_one(
            r#"
            SELECT doc
            FROM recipe
            WHERE doc -> 'ingredients' @> jsonb_build_array(jsonb_build_object('id', $1::text))
            ORDER BY id
            LIMIT 1
            "#,
            ingredient_id,
        )
        .await
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn save(&self, mut recipe: Recipe) -> Result<Recipe> {
        let start = Instant::now();
        assign_identities(&mut recipe);
        let doc = RecipeDocument::from_recipe(&recipe)?;
        let recipe_id = doc.id.clone();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let Json(persisted) = sqlx::query_scalar::<_, Json<RecipeDocument>>(
            r#"
            INSERT INTO recipe (id, doc, updated_at_utc)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
                SET doc = EXCLUDED.doc, updated_at_utc = EXCLUDED.updated_at_utc
            RETURNING doc
            "#,
        )
        .bind(&recipe_id)
        .bind(Json(&doc))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        // Dangling references abort the write: the transaction rolls back on drop.
        let saved = hydrate(&mut tx, vec![persisted])
            .await?
            .pop()
            .ok_or_else(|| Error::Internal(format!("recipe {} vanished during save", recipe_id)))?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "recipes",
            op = "save",
            recipe_id = %recipe_id,
            ingredient_count = saved.ingredients().len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recipe document saved"
        );
        Ok(saved)
    }

    async fn delete(&self, recipe_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipe WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Recipe>> {
        self.load_many("SELECT doc FROM recipe ORDER BY doc ->> 'description', id", None)
            .await
    }

    async fn list_by_category(&self, category_id: &str) -> Result<Vec<Recipe>> {
        self.load_many(
            r#"
            SELECT doc
            FROM recipe
            WHERE doc -> 'category_ids' @> jsonb_build_array($1::text)
            ORDER BY doc ->> 'description', id
            "#,
            Some(category_id),
        )
        .await
    }
}
