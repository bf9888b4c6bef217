//! # Docket DB
//!
//! Document storage for the Docket API.
//!
//! Every resource type lives in one named collection and is reached through
//! the [`ResourceRepository`] trait. Two adapters implement it:
//!
//! - [`PgDocumentRepository`]: PostgreSQL, one JSONB `documents` table
//! - [`MemoryRepository`]: process-local map, used for tests and
//!   `STORAGE_BACKEND=memory`
//!
//! # Example
//!
//! ```ignore
//! use docket_db::{Filter, MemoryRepository, ResourceRepository};
//!
//! let devices = MemoryRepository::<Device>::new();
//! let mine = devices
//!     .find_many(&Filter::new().eq("owner", user_id.to_string()), None)
//!     .await?;
//! ```

pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod resource;

pub use error::RepositoryError;
pub use filter::{Filter, Page};
pub use memory::MemoryRepository;
pub use postgres::{PgDocumentRepository, init_db_pool, run_migrations};
pub use repository::{RepoResult, ResourceRepository};
pub use resource::{Resource, SERVER_FIELDS};

// Re-export PgPool for convenience
pub use sqlx::PgPool;
