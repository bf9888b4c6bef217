use axum::extract::State;
use tracing::instrument;

use docket_core::{AppError, Reply};
use docket_db::Resource;
use docket_models::{AuthenticateRequest, RegisterRequest, RegisterResponse, TokenResponse};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AuthService;

/// Register a new user and sign them in
#[instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<Reply<RegisterResponse>, AppError> {
    let user = AuthService::register_user(state.users.as_ref(), &dto.username, &dto.password).await?;
    let token = AuthService::generate_token(&user, &state.jwt_config)?;

    Ok(Reply::success(RegisterResponse {
        user: user.render()?,
        token,
    }))
}

/// Exchange a username and password for a token
#[instrument(skip_all)]
pub async fn authenticate_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<AuthenticateRequest>,
) -> Result<Reply<TokenResponse>, AppError> {
    let user =
        AuthService::authenticate_user(state.users.as_ref(), &dto.username, &dto.password).await?;
    let token = AuthService::generate_token(&user, &state.jwt_config)?;

    Ok(Reply::success(TokenResponse { token }))
}
