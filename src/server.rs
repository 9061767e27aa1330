//! REST adapter over the storage facade
//!
//! Translates HTTP requests into [`Storage`] calls and maps error kinds
//! to response codes. Registering a schema proposes and commits
//! back-to-back; a consensus round runs inside commit, between staging
//! and the durable append.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::RegistryError;
use crate::store::Storage;
use crate::version::VersionId;

type SharedStorage = Arc<dyn Storage>;

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct CreateSchemaRequest {
    pub name: String,
    pub schema: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSchemaResponse {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    pub name: String,
    pub versions: Vec<VersionId>,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub name: String,
    pub version: String,
    pub schema: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

// ==================
// Routes
// ==================

/// Create the registry routes
pub fn registry_routes(storage: SharedStorage) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/schemas", post(create_schema_handler))
        .route("/schemas/:name", get(list_versions_handler))
        .route("/schemas/:name/versions/:version", get(get_schema_handler))
        .with_state(storage)
}

// ==================
// Handlers
// ==================

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn create_schema_handler(
    State(storage): State<SharedStorage>,
    Json(request): Json<CreateSchemaRequest>,
) -> Result<Json<CreateSchemaResponse>, (StatusCode, Json<ErrorResponse>)> {
    storage
        .propose(&request.name, &request.schema)
        .map_err(error_response)?;
    storage.commit(&request.name).map_err(error_response)?;

    Ok(Json(CreateSchemaResponse {
        name: request.name,
        status: "committed".to_string(),
    }))
}

async fn list_versions_handler(
    State(storage): State<SharedStorage>,
    Path(name): Path<String>,
) -> Result<Json<VersionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let versions = storage.lookup_versions(&name).map_err(error_response)?;
    Ok(Json(VersionsResponse { name, versions }))
}

async fn get_schema_handler(
    State(storage): State<SharedStorage>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Json<SchemaResponse>, (StatusCode, Json<ErrorResponse>)> {
    let schema = storage.lookup(&name, &version).map_err(error_response)?;
    Ok(Json(SchemaResponse {
        name,
        version,
        schema,
    }))
}

fn error_response(err: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RegistryError::NotProposed { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    warn!("request failed: {err}");
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: status.as_u16(),
        }),
    )
}

// ==================
// Server
// ==================

/// HTTP server for the registry API
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server exposing `storage` under the REST API
    pub fn new(config: ServerConfig, storage: SharedStorage) -> Self {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = registry_routes(storage).layer(cors);
        Self { config, router }
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start serving; runs until the process is stopped
    pub async fn start(self) -> std::io::Result<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;

        info!("listening on {addr}");
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::store::SqlStore;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn test_router(dir: &std::path::Path) -> Router {
        let config = StorageConfig {
            location: dir.join("registry.db"),
        };
        let store = Arc::new(SqlStore::open(&config).unwrap());
        registry_routes(store)
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_then_fetch_roundtrip() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let body = serde_json::json!({
            "name": "user",
            "schema": "{\"type\":\"record\"}"
        });
        let request = Request::builder()
            .method("POST")
            .uri("/schemas")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/schemas/user")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_schema_is_not_found() {
        let dir = tempdir().unwrap();
        let router = test_router(dir.path());

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/schemas/ghost/versions/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
