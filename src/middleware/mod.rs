//! Middleware for resource routes.
//!
//! # Modules
//!
//! - [`auth`]: Token extraction and verification
//! - [`access`]: Ownership and admin checks, the `Access` extractor
//!
//! # Request Flow
//!
//! 1. `authenticate` (protected routers only) finds a token in the body,
//!    query, `x-access-token` header, route params or bearer header, and
//!    records an `Authentication`
//! 2. `authorize` turns it into one `AccessDecision`: ownership of the
//!    record named by `{id}`, then the admin override
//! 3. The handler's `Access` extractor rejects denied requests with the
//!    decision's status
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::access::Access;
//!
//! async fn show(Access(decision): Access) -> Result<Reply<Value>, AppError> {
//!     // Only reached when access was granted
//! }
//! ```

pub mod access;
pub mod auth;
