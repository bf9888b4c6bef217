//! # Docket Models
//!
//! Domain models and DTOs for the Docket API.
//!
//! # Modules
//!
//! - [`auth`]: Register and authenticate request/response bodies
//! - [`users`]: User accounts and roles
//! - [`devices`]: Devices registered by a user
//! - [`media`]: Media lists owned by a user
//!
//! Every stored model implements [`docket_db::Resource`], which tells the
//! generic router how to store, scope and render it.

pub mod auth;
pub mod devices;
pub mod media;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{AuthenticateRequest, RegisterRequest, RegisterResponse, TokenResponse};
pub use devices::Device;
pub use media::MediaList;
pub use users::{User, UserRole};
