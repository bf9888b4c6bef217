//! # Docket CLI
//!
//! Administrative tools that work directly against storage. Admin accounts
//! can only be created here, never through the HTTP API.

pub mod admin;
