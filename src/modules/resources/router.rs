use axum::{
    Extension, Router, middleware,
    routing::{get, post},
};

use crate::middleware::access::{RouteOptions, authorize};
use crate::middleware::auth::authenticate;
use crate::state::{AppState, RoutedResource};

use super::controller::{destroy, index, paged, search, show, store, update};

/// Routes for resource `R`, guarded according to `options`.
///
/// Guards are route layers, so they run only for matched routes. The last
/// layer added runs first: authentication, then authorization.
pub fn init_resource_router<R: RoutedResource>(
    state: AppState,
    options: RouteOptions,
) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(index::<R>).post(store::<R>))
        .route("/update", post(update::<R>))
        .route("/search/{field}/{term}", get(search::<R>))
        .route("/{page}/{limit}", get(paged::<R>))
        .route("/{id}", get(show::<R>).delete(destroy::<R>))
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize::<R>));

    let router = if options.is_protected {
        router.route_layer(middleware::from_fn_with_state(state, authenticate))
    } else {
        router
    };

    router.layer(Extension(options))
}
