//! PostgreSQL document store.
//!
//! All collections share the `documents` table; each row keeps the full
//! canonical JSON of one record in `body`. Filters use JSONB containment
//! (`body @> $filter`), searches use the POSIX regex operator on
//! `body->>field`.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docket_config::StorageConfig;
use serde_json::{Map, Value};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::RepositoryError,
    filter::{Filter, Page},
    repository::{RepoResult, ResourceRepository, materialize, merge_patch},
    resource::Resource,
};

const UNIQUE_VIOLATION: &str = "23505";
const INVALID_REGULAR_EXPRESSION: &str = "2201B";

/// Initializes a PostgreSQL connection pool from the storage settings.
///
/// # Errors
///
/// Fails when `DATABASE_URL` is unset or the connection cannot be made.
pub async fn init_db_pool(config: &StorageConfig) -> Result<PgPool, sqlx::Error> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies the migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// A [`ResourceRepository`] over the `documents` table.
pub struct PgDocumentRepository<T> {
    pool: PgPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PgDocumentRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> PgDocumentRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Maps driver errors whose SQLSTATE has a domain meaning.
    fn classify(err: sqlx::Error) -> RepositoryError {
        let Some(db_err) = err.as_database_error() else {
            return RepositoryError::Storage(err);
        };

        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                let constraint = db_err.constraint().unwrap_or_default();
                let field = T::UNIQUE_FIELDS
                    .iter()
                    .find(|f| constraint.contains(*f))
                    .or_else(|| T::UNIQUE_FIELDS.first())
                    .copied()
                    .unwrap_or("id");
                RepositoryError::DuplicateKey(field.to_string())
            }
            Some(INVALID_REGULAR_EXPRESSION) => RepositoryError::InvalidQuery(db_err.message().to_string()),
            _ => RepositoryError::Storage(err),
        }
    }

    /// Checks unique fields against other rows. The unique indexes in the
    /// migrations back this up under concurrent writers.
    async fn check_unique(&self, id: Uuid, body: &Value) -> RepoResult<()> {
        for field in T::UNIQUE_FIELDS {
            let Some(value) = body.get(*field).filter(|v| !v.is_null()) else {
                continue;
            };

            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM documents \
                 WHERE collection = $1 AND id <> $2 AND body -> $3 = $4)",
            )
            .bind(T::COLLECTION)
            .bind(id)
            .bind(*field)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::classify)?;

            if taken {
                return Err(RepositoryError::DuplicateKey((*field).to_string()));
            }
        }
        Ok(())
    }
}

fn decode<T: Resource>(body: Value) -> RepoResult<T> {
    Ok(serde_json::from_value(body)?)
}

#[async_trait]
impl<T: Resource> ResourceRepository<T> for PgDocumentRepository<T> {
    async fn store(&self, data: Map<String, Value>) -> RepoResult<T> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let (record, body) = materialize::<T>(data, id, now, now)?;

        self.check_unique(id, &body).await?;

        sqlx::query(
            "INSERT INTO documents (collection, id, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4)",
        )
        .bind(T::COLLECTION)
        .bind(id)
        .bind(&body)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Self::classify)?;

        debug!(collection = T::COLLECTION, %id, "Stored document");
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<T>> {
        let body: Option<Value> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(T::COLLECTION)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Self::classify)?;

        body.map(decode).transpose()
    }

    async fn edit(&self, id: Uuid, patch: Map<String, Value>) -> RepoResult<Option<T>> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(Value, DateTime<Utc>)> = sqlx::query_as(
            "SELECT body, created_at FROM documents \
             WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(T::COLLECTION)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Self::classify)?;

        let Some((current, created_at)) = current else {
            return Ok(None);
        };

        let now = Utc::now();
        let merged = merge_patch(&current, patch);
        let (record, body) = materialize::<T>(merged, id, created_at, now)?;

        self.check_unique(id, &body).await?;

        sqlx::query(
            "UPDATE documents SET body = $3, updated_at = $4 \
             WHERE collection = $1 AND id = $2",
        )
        .bind(T::COLLECTION)
        .bind(id)
        .bind(&body)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Self::classify)?;

        tx.commit().await?;
        Ok(Some(record))
    }

    async fn destroy(&self, id: Uuid) -> RepoResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Self::classify)?;
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> RepoResult<Option<T>> {
        let body: Option<Value> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND body @> $2 \
             ORDER BY created_at DESC, id LIMIT 1",
        )
        .bind(T::COLLECTION)
        .bind(filter.to_value())
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::classify)?;

        body.map(decode).transpose()
    }

    async fn find_many(&self, filter: &Filter, page: Option<Page>) -> RepoResult<Vec<T>> {
        let (limit, skip) = match page {
            Some(page) => (Some(page.limit.max(0)), page.skip.max(0)),
            None => (None, 0),
        };

        let bodies: Vec<Value> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND body @> $2 \
             ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
        )
        .bind(T::COLLECTION)
        .bind(filter.to_value())
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::classify)?;

        bodies.into_iter().map(decode).collect()
    }

    async fn search(&self, field: &str, pattern: &str, filter: &Filter) -> RepoResult<Vec<T>> {
        let bodies: Vec<Value> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND body @> $2 \
             AND jsonb_typeof(body -> $3) IN ('string', 'number', 'boolean') \
             AND body ->> $3 ~ $4 ORDER BY created_at DESC, id",
        )
        .bind(T::COLLECTION)
        .bind(filter.to_value())
        .bind(field)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::classify)?;

        bodies.into_iter().map(decode).collect()
    }

    async fn get_count(&self, filter: &Filter) -> RepoResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND body @> $2",
        )
        .bind(T::COLLECTION)
        .bind(filter.to_value())
        .fetch_one(&self.pool)
        .await
        .map_err(Self::classify)?;

        Ok(count.max(0) as u64)
    }
}
