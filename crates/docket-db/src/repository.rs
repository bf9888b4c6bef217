use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    error::RepositoryError,
    filter::{Filter, Page},
    resource::Resource,
};

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Persistence operations over one collection of `T`.
///
/// Lookups of absent records return `None` rather than an error. Listing
/// operations return newest records first.
#[async_trait]
pub trait ResourceRepository<T: Resource>: Send + Sync {
    fn collection(&self) -> &'static str {
        T::COLLECTION
    }

    /// Inserts a new document. `id`, `created_at` and `updated_at` are
    /// assigned here and override anything in `data`.
    async fn store(&self, data: Map<String, Value>) -> RepoResult<T>;

    async fn get(&self, id: Uuid) -> RepoResult<Option<T>>;

    /// Shallow-merges `patch` into the stored document and returns the
    /// updated record, or `None` when `id` is absent.
    async fn edit(&self, id: Uuid, patch: Map<String, Value>) -> RepoResult<Option<T>>;

    /// Deletes the record. Deleting an absent id succeeds.
    async fn destroy(&self, id: Uuid) -> RepoResult<()>;

    async fn find_one(&self, filter: &Filter) -> RepoResult<Option<T>>;

    async fn find_many(&self, filter: &Filter, page: Option<Page>) -> RepoResult<Vec<T>>;

    /// Records whose `field` matches the regular expression `pattern`,
    /// further restricted by `filter`. Strings, numbers and booleans are
    /// matched on their text form; null, arrays and objects never match.
    async fn search(&self, field: &str, pattern: &str, filter: &Filter) -> RepoResult<Vec<T>>;

    async fn get_all(&self) -> RepoResult<Vec<T>> {
        self.find_many(&Filter::new(), None).await
    }

    async fn get_count(&self, filter: &Filter) -> RepoResult<u64>;
}

/// Builds a stored document from client data: server fields are replaced,
/// and the result must deserialize as `T`. Returns the typed record and its
/// canonical JSON form.
pub(crate) fn materialize<T: Resource>(
    mut data: Map<String, Value>,
    id: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
) -> RepoResult<(T, Value)> {
    data.insert("id".into(), Value::String(id.to_string()));
    data.insert("created_at".into(), serde_json::to_value(created_at)?);
    data.insert("updated_at".into(), serde_json::to_value(updated_at)?);

    let record: T = serde_json::from_value(Value::Object(data))?;
    let canonical = serde_json::to_value(&record)?;
    Ok((record, canonical))
}

/// Applies `patch` on top of `current`, leaving server fields untouched.
pub(crate) fn merge_patch(current: &Value, patch: Map<String, Value>) -> Map<String, Value> {
    let mut merged = current.as_object().cloned().unwrap_or_default();
    for (field, value) in patch {
        if crate::resource::SERVER_FIELDS.contains(&field.as_str()) {
            continue;
        }
        merged.insert(field, value);
    }
    merged
}
