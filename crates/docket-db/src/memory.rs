//! In-process document store.

use std::{collections::HashMap, marker::PhantomData};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::RepositoryError,
    filter::{Filter, Page},
    repository::{RepoResult, ResourceRepository, materialize, merge_patch},
    resource::Resource,
};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    created_at: DateTime<Utc>,
    body: Value,
}

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    entries: HashMap<Uuid, Entry>,
}

impl Inner {
    /// Matching entries, newest first.
    fn select(&self, filter: &Filter) -> Vec<&Entry> {
        let mut found: Vec<&Entry> = self
            .entries
            .values()
            .filter(|entry| filter.matches(&entry.body))
            .collect();
        found.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));
        found
    }

    fn check_unique<T: Resource>(&self, id: Uuid, body: &Value) -> RepoResult<()> {
        for field in T::UNIQUE_FIELDS {
            let Some(value) = body.get(*field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = self
                .entries
                .iter()
                .any(|(other, entry)| *other != id && entry.body.get(*field) == Some(value));
            if taken {
                return Err(RepositoryError::DuplicateKey((*field).to_string()));
            }
        }
        Ok(())
    }
}

/// A [`ResourceRepository`] kept in memory behind a `tokio` lock.
///
/// Each write holds the lock for the whole operation, so the uniqueness
/// check and the insert cannot interleave with another writer.
pub struct MemoryRepository<T> {
    inner: RwLock<Inner>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for MemoryRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository").finish_non_exhaustive()
    }
}

impl<T: Resource> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Text form of a scalar value, as `->>` renders it.
fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn decode<T: Resource>(entry: &Entry) -> RepoResult<T> {
    Ok(serde_json::from_value(entry.body.clone())?)
}

#[async_trait]
impl<T: Resource> ResourceRepository<T> for MemoryRepository<T> {
    async fn store(&self, data: Map<String, Value>) -> RepoResult<T> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let (record, body) = materialize::<T>(data, id, now, now)?;

        let mut inner = self.inner.write().await;
        inner.check_unique::<T>(id, &body)?;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            id,
            Entry {
                seq,
                created_at: now,
                body,
            },
        );

        debug!(collection = T::COLLECTION, %id, "Stored document");
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> RepoResult<Option<T>> {
        let inner = self.inner.read().await;
        inner.entries.get(&id).map(decode).transpose()
    }

    async fn edit(&self, id: Uuid, patch: Map<String, Value>) -> RepoResult<Option<T>> {
        let mut inner = self.inner.write().await;
        let Some(current) = inner.entries.get(&id).cloned() else {
            return Ok(None);
        };

        let merged = merge_patch(&current.body, patch);
        let (record, body) = materialize::<T>(merged, id, current.created_at, Utc::now())?;
        inner.check_unique::<T>(id, &body)?;
        inner.entries.insert(id, Entry { body, ..current });

        Ok(Some(record))
    }

    async fn destroy(&self, id: Uuid) -> RepoResult<()> {
        let mut inner = self.inner.write().await;
        inner.entries.remove(&id);
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> RepoResult<Option<T>> {
        let inner = self.inner.read().await;
        inner.select(filter).first().map(|e| decode(e)).transpose()
    }

    async fn find_many(&self, filter: &Filter, page: Option<Page>) -> RepoResult<Vec<T>> {
        let inner = self.inner.read().await;
        let found = inner.select(filter);
        let found = match page {
            Some(page) => page.apply(found),
            None => found,
        };
        found.into_iter().map(decode).collect()
    }

    async fn search(&self, field: &str, pattern: &str, filter: &Filter) -> RepoResult<Vec<T>> {
        let regex = Regex::new(pattern).map_err(|e| RepositoryError::InvalidQuery(e.to_string()))?;

        let inner = self.inner.read().await;
        inner
            .select(filter)
            .into_iter()
            .filter(|entry| {
                entry
                    .body
                    .get(field)
                    .and_then(searchable_text)
                    .is_some_and(|value| regex.is_match(&value))
            })
            .map(decode)
            .collect()
    }

    async fn get_count(&self, filter: &Filter) -> RepoResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.select(filter).len() as u64)
    }
}
