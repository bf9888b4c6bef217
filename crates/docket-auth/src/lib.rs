//! # Docket Auth
//!
//! JWT claims and token utilities for the Docket API.
//!
//! - [`claims`]: the claims carried by an access token
//! - [`jwt`]: token creation and verification
//!
//! Tokens are HS256, stateless, and valid until `exp`. There is no
//! revocation list.
//!
//! # Example
//!
//! ```ignore
//! use docket_auth::{create_access_token, verify_token};
//! use docket_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "alice", "USER", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.username, "alice");
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
