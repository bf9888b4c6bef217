//! User accounts.

use std::fmt;

use chrono::{DateTime, Utc};
use docket_core::crypto::{IV_LENGTH, get_random_string, hash_string};
use docket_db::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account.
///
/// `password` holds `hash_string(plaintext, iv)`, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub iv: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub devices: Vec<Uuid>,
    #[serde(default)]
    pub media: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Document for a new account: a fresh iv, the salted password hash,
    /// and no owned records.
    pub fn new_document(username: &str, password: &str, role: UserRole) -> Map<String, Value> {
        let mut document = match json!({
            "username": username,
            "password": password,
            "role": role,
            "devices": [],
            "media": [],
        }) {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Self::prepare_write(&mut document);
        document
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl Resource for User {
    const COLLECTION: &'static str = "user";
    const UNIQUE_FIELDS: &'static [&'static str] = &["username"];
    const PROTECTED_FIELDS: &'static [&'static str] = &["role", "password", "iv", "devices", "media"];
    const HIDDEN_FIELDS: &'static [&'static str] = &["password", "iv"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.id
    }

    /// A plaintext `password` is replaced by its hash under a fresh iv.
    /// A client-supplied `iv` is always discarded.
    fn prepare_write(document: &mut Map<String, Value>) {
        document.remove("iv");

        let Some(password) = document.get("password").and_then(Value::as_str) else {
            return;
        };

        let iv = get_random_string(IV_LENGTH);
        let hashed = hash_string(password, &iv);
        document.insert("password".to_string(), Value::String(hashed));
        document.insert("iv".to_string(), Value::String(iv));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password: "0f".repeat(32),
            iv: "abcdefgh12345678".to_string(),
            role: UserRole::User,
            devices: vec![],
            media: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_value(UserRole::Admin).unwrap(), json!("ADMIN"));
        assert_eq!(serde_json::to_value(UserRole::User).unwrap(), json!("USER"));
        assert_eq!(UserRole::Admin.to_string(), "ADMIN");
    }

    #[test]
    fn test_role_defaults_to_user() {
        let now = Utc::now();
        let value = json!({
            "id": Uuid::new_v4(),
            "username": "bob",
            "password": "hash",
            "iv": "iv",
            "created_at": now,
            "updated_at": now,
        });
        let user: User = serde_json::from_value(value).unwrap();
        assert_eq!(user.role, UserRole::User);
        assert!(user.devices.is_empty());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_new_document_hashes_password() {
        let document = User::new_document("alice", "secret", UserRole::Admin);
        let iv = document["iv"].as_str().unwrap();

        assert_eq!(iv.len(), IV_LENGTH);
        assert_ne!(document["password"], "secret");
        assert_eq!(document["password"], hash_string("secret", iv));
        assert_eq!(document["role"], "ADMIN");
        assert_eq!(document["devices"], json!([]));
    }

    #[test]
    fn test_prepare_write_hashes_password_under_fresh_iv() {
        let mut document = json!({ "password": "plain", "iv": "chosen" })
            .as_object()
            .cloned()
            .unwrap();
        User::prepare_write(&mut document);

        let iv = document["iv"].as_str().unwrap().to_string();
        assert_ne!(iv, "chosen");
        assert_eq!(iv.len(), IV_LENGTH);
        assert_ne!(document["password"], "plain");
        assert_eq!(document["password"], hash_string("plain", &iv));
    }

    #[test]
    fn test_prepare_write_drops_lone_iv() {
        let mut document = json!({ "username": "bob", "iv": "chosen" })
            .as_object()
            .cloned()
            .unwrap();
        User::prepare_write(&mut document);

        assert!(document.get("iv").is_none());
        assert_eq!(document["username"], "bob");
    }

    #[test]
    fn test_render_hides_credentials() {
        let rendered = user().render().unwrap();
        assert_eq!(rendered["username"], "alice");
        assert!(rendered.get("password").is_none());
        assert!(rendered.get("iv").is_none());
        assert_eq!(rendered["role"], "USER");
    }

    #[test]
    fn test_user_owns_itself() {
        let user = user();
        assert_eq!(user.owner_id(), user.id);
        assert_eq!(
            User::owner_filter(user.id).to_value(),
            json!({ "id": user.id.to_string() })
        );
    }
}
