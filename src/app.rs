use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{IdentityVerifier, JwtVerifier, RemoteVerifier};
use crate::config::{AppConfig, StorageBackend};
use crate::handlers::{self, protected};
use crate::middleware::require_identity;
use crate::services::TodoService;
use crate::storage::{MemoryStore, PostgresStore, PostgrestStore, Storage};

/// Shared collaborators handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            todos: TodoService::new(storage),
            verifier,
        }
    }

    /// Wire the storage backend and identity verifier named by the config
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.storage.timeout_secs);
        let project_url = config.storage.project_url.as_deref().unwrap_or_default();
        let api_key = config.storage.api_key.as_deref().unwrap_or_default();

        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
            StorageBackend::Postgrest => Arc::new(
                PostgrestStore::new(project_url, api_key, timeout)
                    .context("failed to configure PostgREST storage")?,
            ),
            StorageBackend::Postgres => {
                let database_url = config.storage.database_url.as_deref().unwrap_or_default();
                Arc::new(
                    PostgresStore::connect(database_url, config.storage.max_connections, timeout)
                        .await
                        .context("failed to connect to Postgres")?,
                )
            }
        };

        let audience = config.security.jwt_audience.as_deref();
        let verifier: Arc<dyn IdentityVerifier> = match &config.security.jwt_secret {
            Some(secret) => Arc::new(JwtVerifier::new(secret, audience).context("invalid JWT secret")?),
            None => Arc::new(
                RemoteVerifier::new(project_url, api_key, timeout)
                    .context("failed to configure remote token verification")?,
            ),
        };

        tracing::info!(
            "Storage backend: {:?}, token verification: {}",
            config.storage.backend,
            if config.security.jwt_secret.is_some() { "local" } else { "remote" }
        );

        Ok(Self::new(storage, verifier))
    }
}

/// Build the full router: public routes, token-protected routes, global layers
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Protected
        .merge(protected_routes(state.clone()))
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(config));

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(folder_routes())
        .merge(list_routes())
        .merge(todo_routes())
        .route_layer(middleware::from_fn_with_state(state, require_identity))
}

fn folder_routes() -> Router<AppState> {
    use protected::folders;

    Router::new()
        .route("/folders", get(folders::folder_list).post(folders::folder_create))
        .route(
            "/folders/:id",
            get(folders::folder_get)
                .put(folders::folder_put)
                .delete(folders::folder_delete),
        )
        .route(
            "/folders/:id/lists",
            get(folders::folder_lists).post(folders::folder_list_create),
        )
}

fn list_routes() -> Router<AppState> {
    use protected::lists;

    Router::new()
        .route("/lists", get(lists::list_index).post(lists::list_create))
        .route(
            "/lists/:id",
            get(lists::list_get).put(lists::list_put).delete(lists::list_delete),
        )
        .route(
            "/lists/:id/todos",
            get(lists::list_todos).post(lists::list_todo_create),
        )
}

fn todo_routes() -> Router<AppState> {
    use protected::todos;

    Router::new().route(
        "/todos/:id",
        get(todos::todo_get).put(todos::todo_put).delete(todos::todo_delete),
    )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
