//! PostgreSQL document store
//!
//! Each collection is a table `(seq BIGSERIAL, id UUID PRIMARY KEY, doc JSONB)`,
//! created by the migrations in `migrations/`. `seq` preserves insertion order.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::{Collection, DocumentStore, Filter};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn is_identifier(field: &str) -> bool {
    !field.is_empty() && field.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Sort fields are interpolated into SQL, so only plain identifiers pass.
/// Text compares bytewise (`COLLATE "C"`), as the memory store does.
fn order_by(sort: Option<&'static str>) -> AppResult<String> {
    match sort {
        None => Ok("seq".to_string()),
        Some(field) if is_identifier(field) => Ok(format!("doc->>'{}' COLLATE \"C\", seq", field)),
        Some(field) => Err(AppError::Internal(format!("Invalid sort field {:?}", field))),
    }
}

/// Unique violations surface as conflicts, everything else as database errors
fn map_write_error(collection: Collection, err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
            "Duplicate record in {}",
            collection.table()
        )),
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_one(&self, collection: Collection, id: Uuid) -> AppResult<Option<Value>> {
        let query = format!("SELECT doc FROM {} WHERE id = $1", collection.table());
        let doc = sqlx::query_scalar::<_, Json<Value>>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(doc)| doc))
    }

    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Value>> {
        let query = format!(
            "SELECT doc FROM {} WHERE doc @> $1 ORDER BY {}",
            collection.table(),
            order_by(sort)?
        );
        let docs = sqlx::query_scalar::<_, Json<Value>>(&query)
            .bind(Json(filter.to_value()))
            .fetch_all(&self.pool)
            .await?;
        Ok(docs.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> AppResult<i64> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE doc @> $1",
            collection.table()
        );
        let count: i64 = sqlx::query_scalar(&query)
            .bind(Json(filter.to_value()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, collection: Collection, id: Uuid, doc: Value) -> AppResult<()> {
        let query = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection.table());
        sqlx::query(&query)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(collection, e))?;
        Ok(())
    }

    async fn replace(&self, collection: Collection, id: Uuid, doc: Value) -> AppResult<bool> {
        let query = format!("UPDATE {} SET doc = $2 WHERE id = $1", collection.table());
        let result = sqlx::query(&query)
            .bind(id)
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(collection, e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> AppResult<bool> {
        let query = format!("DELETE FROM {} WHERE id = $1", collection.table());
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
