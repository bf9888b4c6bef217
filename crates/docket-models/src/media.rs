use chrono::{DateTime, Utc};
use docket_db::Resource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named list of media references owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaList {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    /// Media URIs, in play order.
    #[serde(default)]
    pub items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for MediaList {
    const COLLECTION: &'static str = "media";
    const OWNER_FIELD: Option<&'static str> = Some("owner");

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}
