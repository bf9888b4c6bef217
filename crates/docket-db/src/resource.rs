use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::filter::Filter;

/// Fields assigned by storage. Client input never sets them.
pub const SERVER_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// A document type stored in its own collection.
///
/// The associated constants describe how the generic router and the
/// repositories treat the type's fields.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name. Also the URL segment under `/api`.
    const COLLECTION: &'static str;

    /// Fields whose values must be unique within the collection.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Field holding the owning user's id. `None` means the record is
    /// owned by itself (users).
    const OWNER_FIELD: Option<&'static str> = None;

    /// Fields only an admin may write through the API.
    const PROTECTED_FIELDS: &'static [&'static str] = &[];

    /// Fields never rendered in responses and never searchable.
    const HIDDEN_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> Uuid;

    /// Id of the user that owns this record.
    fn owner_id(&self) -> Uuid;

    /// Serializes the record for a response, without hidden fields.
    fn render(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            for field in Self::HIDDEN_FIELDS {
                map.remove(*field);
            }
        }
        Ok(value)
    }

    /// Filter selecting the records owned by `owner`.
    fn owner_filter(owner: Uuid) -> Filter {
        Filter::new().eq(Self::OWNER_FIELD.unwrap_or("id"), owner.to_string())
    }

    /// Rewrites client data before it is stored or merged. Runs after
    /// sanitation, for admins too.
    fn prepare_write(_document: &mut Map<String, Value>) {}

    fn is_hidden(field: &str) -> bool {
        Self::HIDDEN_FIELDS.contains(&field)
    }
}
