//! Access decisions for resource routes.
//!
//! One [`AccessDecision`] is computed per request by running the stages in
//! order: the authentication outcome, the ownership check against the
//! record named by the route's `id`, then the admin check. Handlers read the
//! result through the [`Access`] extractor.

use axum::{
    RequestExt,
    extract::{FromRequestParts, RawPathParams, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde_json::{Map, Value};
use tracing::{debug, error};
use uuid::Uuid;

use docket_core::{AppError, Rejection};
use docket_db::{Filter, Resource, SERVER_FIELDS};

use crate::middleware::auth::{Authentication, Identity, TOKEN_FIELD};
use crate::state::{AppState, RoutedResource};

/// Per-router settings for the generic resource routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOptions {
    /// Requests must carry a valid token.
    pub is_protected: bool,
    /// Records belong to a user; non-admins only see and write their own.
    pub is_owned: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            is_protected: true,
            is_owned: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// No authentication ran for this router.
    Public,
    OwnerAllowed(Identity),
    AdminAllowed(Identity),
    Denied(Rejection),
}

impl AccessDecision {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::OwnerAllowed(identity) | Self::AdminAllowed(identity) => Some(identity),
            Self::Public | Self::Denied(_) => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::AdminAllowed(_))
    }

    /// Filter restricting list queries to what the caller may see.
    pub fn scope<R: Resource>(&self, options: &RouteOptions) -> Filter {
        match self {
            Self::OwnerAllowed(identity) if options.is_owned => R::owner_filter(identity.user_id),
            _ => Filter::new(),
        }
    }
}

/// Ownership stage. A missing record passes so the handler can report it.
pub async fn check_ownership<R: RoutedResource>(
    state: &AppState,
    authentication: &Authentication,
    target: Option<Uuid>,
) -> AccessDecision {
    let identity = match authentication {
        Authentication::Authenticated(identity) => identity,
        Authentication::Failed(rejection) => return AccessDecision::Denied(rejection.clone()),
    };

    let Some(target) = target else {
        return AccessDecision::OwnerAllowed(identity.clone());
    };

    match R::repository(state).get(target).await {
        Ok(Some(record)) if record.owner_id() != identity.user_id => {
            debug!(user_id = %identity.user_id, %target, "Caller does not own record");
            AccessDecision::Denied(Rejection::forbidden("you do not own this resource"))
        }
        Ok(_) => AccessDecision::OwnerAllowed(identity.clone()),
        Err(e) => {
            error!(error = %e, "Ownership lookup failed");
            AccessDecision::Denied(Rejection::internal("Internal server error"))
        }
    }
}

/// Admin stage. Only a 403 from the earlier stage is re-evaluated; any other
/// rejection passes through unchanged.
pub async fn check_admin(
    state: &AppState,
    authentication: Option<&Authentication>,
    prior: AccessDecision,
) -> AccessDecision {
    let Some(identity) = authentication.and_then(Authentication::identity) else {
        return match authentication {
            None => AccessDecision::Public,
            Some(_) => prior,
        };
    };

    if let AccessDecision::Denied(rejection) = &prior {
        if !rejection.is_forbidden() {
            return prior;
        }
    }

    match state.users.get(identity.user_id).await {
        Ok(Some(user)) if user.is_admin() => {
            debug!(user_id = %identity.user_id, "Admin access granted");
            AccessDecision::AdminAllowed(identity.clone())
        }
        Ok(_) => prior,
        Err(e) => {
            error!(error = %e, "Admin lookup failed");
            AccessDecision::Denied(Rejection::internal("Internal server error"))
        }
    }
}

fn route_id(params: &RawPathParams) -> Option<Uuid> {
    params
        .iter()
        .find(|(name, _)| *name == "id")
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// Runs the ownership and admin stages for resource `R` and stores the
/// decision in the request extensions.
pub async fn authorize<R: RoutedResource>(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let target = req
        .extract_parts::<RawPathParams>()
        .await
        .ok()
        .and_then(|params| route_id(&params));
    let authentication = req.extensions().get::<Authentication>().cloned();

    let decision = match &authentication {
        Some(authentication) => {
            let prior = check_ownership::<R>(&state, authentication, target).await;
            check_admin(&state, Some(authentication), prior).await
        }
        None => AccessDecision::Public,
    };

    req.extensions_mut().insert(decision);
    next.run(req).await
}

/// The caller's access decision. Rejects with the decision's status when
/// access was denied.
#[derive(Debug, Clone)]
pub struct Access(pub AccessDecision);

impl<S> FromRequestParts<S> for Access
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AccessDecision>() {
            Some(AccessDecision::Denied(rejection)) => Err(rejection.clone().into()),
            Some(decision) => Ok(Access(decision.clone())),
            None => Ok(Access(AccessDecision::Public)),
        }
    }
}

/// Re-runs the ownership and admin stages against a record named in the
/// request body rather than the route.
pub async fn recheck_owner<R: RoutedResource>(
    state: &AppState,
    decision: AccessDecision,
    target: Uuid,
) -> Result<AccessDecision, AppError> {
    let AccessDecision::OwnerAllowed(identity) = &decision else {
        return Ok(decision);
    };

    let authentication = Authentication::Authenticated(identity.clone());
    let prior = check_ownership::<R>(state, &authentication, Some(target)).await;
    match check_admin(state, Some(&authentication), prior).await {
        AccessDecision::Denied(rejection) => Err(rejection.into()),
        decision => Ok(decision),
    }
}

/// Cleans client-supplied fields before a store or edit.
///
/// Server fields and `token` are always dropped. Protected fields are
/// dropped unless the caller is an admin. On owned collections a
/// non-admin's records are always owned by the caller.
pub fn sanitize<R: Resource>(
    decision: &AccessDecision,
    options: &RouteOptions,
    mut body: Map<String, Value>,
) -> Map<String, Value> {
    for field in SERVER_FIELDS.iter().chain([&TOKEN_FIELD]) {
        body.remove(*field);
    }

    if decision.is_admin() {
        return body;
    }

    for field in R::PROTECTED_FIELDS {
        body.remove(*field);
    }

    if options.is_owned {
        if let (Some(owner_field), Some(identity)) = (R::OWNER_FIELD, decision.identity()) {
            body.insert(
                owner_field.to_string(),
                Value::String(identity.user_id.to_string()),
            );
        }
    }

    body
}
