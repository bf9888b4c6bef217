//! PostgreSQL adapter tests. They need a database reachable through
//! `DATABASE_URL`; run with `cargo test -p docket-db -- --ignored`.

use chrono::{DateTime, Utc};
use docket_db::{Filter, Page, PgDocumentRepository, PgPool, RepositoryError, Resource, ResourceRepository};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tag {
    id: Uuid,
    owner: Uuid,
    label: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Resource for Tag {
    const COLLECTION: &'static str = "tag";
    const UNIQUE_FIELDS: &'static [&'static str] = &["label"];
    const OWNER_FIELD: Option<&'static str> = Some("owner");

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

fn tag(owner: Uuid, label: &str) -> Map<String, Value> {
    json!({ "owner": owner, "label": label })
        .as_object()
        .cloned()
        .unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_store_and_get(pool: PgPool) {
    let repo = PgDocumentRepository::<Tag>::new(pool);
    let stored = repo.store(tag(Uuid::new_v4(), "rust")).await.unwrap();

    let fetched = repo.get(stored.id).await.unwrap().unwrap();
    assert_eq!(fetched.label, "rust");
    assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_unique_field(pool: PgPool) {
    let repo = PgDocumentRepository::<Tag>::new(pool);
    let owner = Uuid::new_v4();
    repo.store(tag(owner, "dup")).await.unwrap();

    let err = repo.store(tag(owner, "dup")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::DuplicateKey(_)));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_edit_and_destroy(pool: PgPool) {
    let repo = PgDocumentRepository::<Tag>::new(pool);
    let stored = repo.store(tag(Uuid::new_v4(), "before")).await.unwrap();

    let patch = json!({ "label": "after" }).as_object().cloned().unwrap();
    let edited = repo.edit(stored.id, patch).await.unwrap().unwrap();
    assert_eq!(edited.label, "after");
    assert_eq!(edited.created_at, stored.created_at);

    repo.destroy(stored.id).await.unwrap();
    repo.destroy(stored.id).await.unwrap();
    assert!(repo.get(stored.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_filters_pages_and_search(pool: PgPool) {
    let repo = PgDocumentRepository::<Tag>::new(pool);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    for label in ["alpha", "beta", "gamma"] {
        repo.store(tag(alice, label)).await.unwrap();
    }
    repo.store(tag(bob, "alphabet")).await.unwrap();

    let mine = Tag::owner_filter(alice);
    assert_eq!(repo.get_count(&mine).await.unwrap(), 3);
    assert_eq!(repo.get_count(&Filter::new()).await.unwrap(), 4);

    let page = repo
        .find_many(&mine, Some(Page { skip: 0, limit: 2 }))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].label, "gamma");

    let found = repo.search("label", "^alpha", &Filter::new()).await.unwrap();
    assert_eq!(found.len(), 2);
    let found = repo.search("label", "^alpha", &mine).await.unwrap();
    assert_eq!(found.len(), 1);

    let err = repo.search("label", "([", &mine).await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidQuery(_)));
}
