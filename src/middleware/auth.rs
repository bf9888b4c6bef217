//! Token authentication.
//!
//! [`authenticate`] runs on protected routers. It never rejects a request
//! itself: it records an [`Authentication`] in the request extensions and
//! hands the request on. The access stage and the handler decide what to do
//! with a failure.

use anyhow::anyhow;
use axum::{
    RequestPartsExt,
    body::{Body, Bytes, to_bytes},
    extract::{Query, RawPathParams, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use docket_auth::verify_token;
use docket_config::JwtConfig;
use docket_core::{AppError, Rejection};

use crate::state::AppState;

pub const TOKEN_FIELD: &str = "token";
pub const TOKEN_HEADER: &str = "x-access-token";

/// Largest request body inspected for a token.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The caller, as established by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    /// Role claimed by the token. Only informational; admin rights are
    /// decided from the stored user.
    pub role: String,
}

/// Outcome of the authentication stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    Authenticated(Identity),
    Failed(Rejection),
}

impl Authentication {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Failed(_) => None,
        }
    }
}

/// Every place a token may be supplied, highest priority first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenSources {
    pub body: Option<String>,
    pub query: Option<String>,
    pub header: Option<String>,
    pub param: Option<String>,
    pub bearer: Option<String>,
}

impl TokenSources {
    pub fn first(&self) -> Option<&str> {
        [
            &self.body,
            &self.query,
            &self.header,
            &self.param,
            &self.bearer,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|token| !token.is_empty())
    }

    async fn collect(parts: &mut Parts, body: &Bytes) -> Self {
        #[derive(Deserialize)]
        struct TokenQuery {
            token: Option<String>,
        }

        let body = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| value.get(TOKEN_FIELD)?.as_str().map(str::to_owned));

        let query = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token);

        let param = parts.extract::<RawPathParams>().await.ok().and_then(|params| {
            params
                .iter()
                .find(|(name, _)| *name == TOKEN_FIELD)
                .map(|(_, value)| value.to_owned())
        });

        Self {
            body,
            query,
            header: header_str(&parts.headers, TOKEN_HEADER),
            param,
            bearer: header_str(&parts.headers, header::AUTHORIZATION.as_str())
                .and_then(|value| value.strip_prefix("Bearer ").map(str::to_owned)),
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Verifies an optional token.
pub fn authenticate_token(token: Option<&str>, jwt_config: &JwtConfig) -> Authentication {
    let Some(token) = token else {
        return Authentication::Failed(Rejection::unauthorized("token not provided"));
    };

    let identity = verify_token(token, jwt_config).ok().and_then(|claims| {
        Some(Identity {
            user_id: claims.user_id()?,
            username: claims.username,
            role: claims.role,
        })
    });

    match identity {
        Some(identity) => Authentication::Authenticated(identity),
        None => Authentication::Failed(Rejection::unauthorized("invalid token")),
    }
}

/// Authentication middleware for protected routers.
///
/// The body is buffered so a `token` field can be read from it, then put
/// back for the handler.
pub async fn authenticate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return AppError::bad_request(anyhow!("Request body could not be read")).into_response();
        }
    };

    let sources = TokenSources::collect(&mut parts, &bytes).await;
    let authentication = authenticate_token(sources.first(), &state.jwt_config);

    match &authentication {
        Authentication::Authenticated(identity) => {
            debug!(user_id = %identity.user_id, "Token accepted");
        }
        Authentication::Failed(rejection) => {
            debug!(reason = %rejection.message, "Token rejected");
        }
    }

    parts.extensions.insert(authentication);
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
