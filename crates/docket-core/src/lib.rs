//! # Docket Core
//!
//! Core types, errors, and utilities for the Docket API.
//!
//! This crate provides foundational types used throughout the Docket application:
//!
//! - [`crypto`]: Salted password hashing and random string generation
//! - [`errors`]: Application error types with HTTP response conversion
//! - [`pagination`]: Page/limit parameters and pagination metadata
//! - [`reply`]: The uniform `{code, message, errors, payload}` response envelope
//!
//! # Example
//!
//! ```ignore
//! use docket_core::crypto::{get_random_string, hash_string};
//! use docket_core::{AppError, Reply};
//!
//! let iv = get_random_string(16);
//! let hash = hash_string("secret", &iv);
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//! let reply = Reply::success(serde_json::json!({ "hash": hash }));
//! ```

pub mod crypto;
pub mod errors;
pub mod pagination;
pub mod reply;

// Re-export commonly used types at crate root
pub use crypto::{get_random_string, hash_string, verify_hash};
pub use errors::{AppError, Rejection};
pub use pagination::{PageParams, Paginated, PaginationMeta};
pub use reply::Reply;

// Re-export StatusCode so crates without an axum dependency can map errors
pub use axum::http::StatusCode;
