use chrono::{DateTime, Utc};
use docket_db::Resource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A device registered by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Device {
    const COLLECTION: &'static str = "device";
    const OWNER_FIELD: Option<&'static str> = Some("owner");

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}
