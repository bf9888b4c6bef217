use std::sync::Arc;

use docket_config::{CorsConfig, JwtConfig, StorageBackend, StorageConfig};
use docket_db::{
    MemoryRepository, PgDocumentRepository, PgPool, Resource, ResourceRepository, init_db_pool,
    run_migrations,
};
use docket_models::{Device, MediaList, User};
use tracing::info;

/// Shared, read-only application state. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn ResourceRepository<User>>,
    pub devices: Arc<dyn ResourceRepository<Device>>,
    pub media: Arc<dyn ResourceRepository<MediaList>>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("users", &self.users.collection())
            .field("devices", &self.devices.collection())
            .field("media", &self.media.collection())
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn in_memory(jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            users: Arc::new(MemoryRepository::<User>::new()),
            devices: Arc::new(MemoryRepository::<Device>::new()),
            media: Arc::new(MemoryRepository::<MediaList>::new()),
            jwt_config,
            cors_config,
        }
    }

    pub fn postgres(pool: PgPool, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            users: Arc::new(PgDocumentRepository::<User>::new(pool.clone())),
            devices: Arc::new(PgDocumentRepository::<Device>::new(pool.clone())),
            media: Arc::new(PgDocumentRepository::<MediaList>::new(pool)),
            jwt_config,
            cors_config,
        }
    }
}

pub async fn init_app_state(storage: &StorageConfig) -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env();
    let cors_config = CorsConfig::from_env();

    let state = match storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            AppState::in_memory(jwt_config, cors_config)
        }
        StorageBackend::Postgres => {
            let pool = init_db_pool(storage).await?;
            run_migrations(&pool).await?;
            AppState::postgres(pool, jwt_config, cors_config)
        }
    };

    Ok(state)
}

/// A resource served by the generic resource router.
pub trait RoutedResource: Resource {
    fn repository(state: &AppState) -> &Arc<dyn ResourceRepository<Self>>;
}

impl RoutedResource for User {
    fn repository(state: &AppState) -> &Arc<dyn ResourceRepository<Self>> {
        &state.users
    }
}

impl RoutedResource for Device {
    fn repository(state: &AppState) -> &Arc<dyn ResourceRepository<Self>> {
        &state.devices
    }
}

impl RoutedResource for MediaList {
    fn repository(state: &AppState) -> &Arc<dyn ResourceRepository<Self>> {
        &state.media
    }
}
