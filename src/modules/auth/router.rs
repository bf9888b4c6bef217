use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{authenticate_user, register_user};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/authenticate", post(authenticate_user))
}
