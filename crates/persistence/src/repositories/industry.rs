//! Industry repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::IndustryEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct IndustryRepository {
    pool: PgPool,
}

impl IndustryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<IndustryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_industries");
        let result = sqlx::query_as::<_, IndustryEntity>(
            "SELECT id, name, created_at FROM industries ORDER BY LOWER(name)",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Names are unique case-insensitively; duplicates are a unique violation.
    pub async fn create(&self, name: &str) -> Result<IndustryEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_industry");
        let result = sqlx::query_as::<_, IndustryEntity>(
            "INSERT INTO industries (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_industry");
        let result = sqlx::query("DELETE FROM industries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
