use tracing::{info, instrument, warn};

use docket_auth::create_access_token;
use docket_config::JwtConfig;
use docket_core::AppError;
use docket_core::crypto::verify_hash;
use docket_db::{Filter, RepositoryError, ResourceRepository};
use docket_models::{User, UserRole};

use crate::metrics::{
    track_jwt_issued, track_user_login_failure, track_user_login_success, track_user_registered,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(users, password))]
    pub async fn register_user(
        users: &dyn ResourceRepository<User>,
        username: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = users
            .store(User::new_document(username, password, UserRole::User))
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateKey(_) => AppError::forbidden("username already exists"),
                other => other.into(),
            })?;

        info!(user_id = %user.id, "User registered");
        track_user_registered();
        Ok(user)
    }

    #[instrument(skip(users, password))]
    pub async fn authenticate_user(
        users: &dyn ResourceRepository<User>,
        username: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let Some(user) = users
            .find_one(&Filter::new().eq("username", username))
            .await?
        else {
            warn!("Unknown username");
            track_user_login_failure("unknown_user");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_hash(password, &user.iv, &user.password) {
            warn!(user_id = %user.id, "Wrong password");
            track_user_login_failure("wrong_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        track_user_login_success(user.role.as_str());
        Ok(user)
    }

    pub fn generate_token(user: &User, jwt_config: &JwtConfig) -> Result<String, AppError> {
        let token = create_access_token(user.id, &user.username, user.role.as_str(), jwt_config)?;
        track_jwt_issued();
        Ok(token)
    }
}
