//! Unit of measure repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use catalog_core::{new_id, Error, Result, UnitOfMeasure, UnitOfMeasureRepository};

/// PostgreSQL implementation of UnitOfMeasureRepository.
#[derive(Clone)]
pub struct PgUnitOfMeasureRepository {
    pool: Pool<Postgres>,
}

impl PgUnitOfMeasureRepository {
    /// Create a new PgUnitOfMeasureRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_unit(row: sqlx::postgres::PgRow) -> UnitOfMeasure {
    UnitOfMeasure {
        id: Some(row.get("id")),
        description: row.get("description"),
    }
}

#[async_trait]
impl UnitOfMeasureRepository for PgUnitOfMeasureRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UnitOfMeasure>> {
        let row = sqlx::query("SELECT id, description FROM unit_of_measure WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(row_to_unit))
    }

    async fn find_by_description(&self, description: &str) -> Result<Option<UnitOfMeasure>> {
        let row = sqlx::query("SELECT id, description FROM unit_of_measure WHERE description = $1")
            .bind(description)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(row_to_unit))
    }

    async fn list(&self) -> Result<Vec<UnitOfMeasure>> {
        let rows = sqlx::query("SELECT id, description FROM unit_of_measure ORDER BY description")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.into_iter().map(row_to_unit).collect())
    }

    async fn save(&self, uom: UnitOfMeasure) -> Result<UnitOfMeasure> {
        let id = uom.id.unwrap_or_else(new_id);

        let row = sqlx::query(
            r#"
            INSERT INTO unit_of_measure (id, description)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET description = EXCLUDED.description
            RETURNING id, description
            "#,
        )
        .bind(&id)
        .bind(&uom.description)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "units",
            op = "save",
            uom_id = %id,
            "Unit of measure saved"
        );
        Ok(row_to_unit(row))
    }
}
