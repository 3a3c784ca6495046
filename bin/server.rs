// Affiliation History - Web Server
// JSON API over the reconstruction engine

use affiliation_history::{
    parse_entity_ref, portrait_url, AppConfig, ClassificationTable, EsiGateway, Gateway,
    HistoryEngine, Reconstruction, ReconstructionError,
};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "history-server", version)]
struct Args {
    #[arg(long, env = "AFFILIATION_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    #[arg(long, env = "AFFILIATION_CONFIG")]
    config: Option<PathBuf>,
}

/// Shared application state
struct AppState<G> {
    engine: Arc<HistoryEngine<G>>,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// History response: the reconstruction plus display helpers
#[derive(Serialize)]
struct HistoryResponse {
    portrait_url: String,
    notices: Vec<String>,
    #[serde(flatten)]
    reconstruction: Reconstruction,
}

impl From<Reconstruction> for HistoryResponse {
    fn from(reconstruction: Reconstruction) -> Self {
        Self {
            portrait_url: portrait_url(reconstruction.entity.id),
            notices: reconstruction.warnings.notice_batch(),
            reconstruction,
        }
    }
}

#[derive(Deserialize)]
struct LookupParams {
    input: String,
}

#[derive(Serialize)]
struct LookupResponse {
    entity_id: i64,
    portrait_url: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/characters/:id/history - Reconstruct affiliation history
async fn get_history<G: Gateway + 'static>(
    State(state): State<AppState<G>>,
    Path(entity_id): Path<i64>,
) -> impl IntoResponse {
    match state.engine.reconstruct(entity_id).await {
        Ok(reconstruction) => (
            StatusCode::OK,
            Json(ApiResponse::ok(HistoryResponse::from(reconstruction))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(entity_id = e.entity_id(), error = %e, cause = %e.gateway_error(), "reconstruction failed");
            (StatusCode::BAD_GATEWAY, Json(ApiResponse::<HistoryResponse>::err(describe(&e)))).into_response()
        }
    }
}

/// GET /api/lookup?input=... - Extract an entity id from an id or profile URL
async fn lookup(Query(params): Query<LookupParams>) -> impl IntoResponse {
    match parse_entity_ref(&params.input) {
        Ok(entity_id) => (
            StatusCode::OK,
            Json(ApiResponse::ok(LookupResponse {
                entity_id,
                portrait_url: portrait_url(entity_id),
            })),
        )
            .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::<LookupResponse>::err(e))).into_response(),
    }
}

fn describe(error: &ReconstructionError) -> String {
    format!("{}: {}", error, error.gateway_error())
}

fn router<G: Gateway + 'static>(state: AppState<G>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/characters/:id/history", get(get_history::<G>))
        .route("/lookup", get(lookup))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    let gateway = EsiGateway::new(&config.gateway).context("Failed to build ESI client")?;
    let engine = HistoryEngine::new(gateway, ClassificationTable::builtin(), config.engine);
    tracing::info!(feed_order = ?engine.feed_order(), "engine ready");
    let state = AppState {
        engine: Arc::new(engine),
    };

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", args.bind))?;

    tracing::info!(bind = %args.bind, esi = %config.gateway.base_url, "server listening");

    axum::serve(listener, router(state))
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use affiliation_history::{GroupHistoryRecord, MemoryGateway, ResourceKind};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const PILOT: i64 = 2119066983;

    fn app(gateway: MemoryGateway) -> Router {
        router(AppState {
            engine: Arc::new(HistoryEngine::with_defaults(gateway)),
        })
    }

    fn pilot_gateway() -> MemoryGateway {
        MemoryGateway::new()
            .with_entity(PILOT, "Test Pilot")
            .with_group(600, "Second Corp")
            .with_group_history(
                PILOT,
                vec![
                    GroupHistoryRecord::new(500, 1, "2020-01-01T00:00:00Z"),
                    GroupHistoryRecord::new(600, 2, "2022-06-01T00:00:00Z"),
                ],
            )
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(MemoryGateway::new()), "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_history_body_carries_notices_and_portrait() {
        // group 500 has no registered name, so it becomes a notice
        let (status, body) = get(app(pilot_gateway()), "/api/characters/2119066983/history").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("error").is_none());

        let data = &body["data"];
        assert_eq!(data["portrait_url"], portrait_url(PILOT));
        assert_eq!(data["entity"]["display_name"], "Test Pilot");
        assert_eq!(data["entity"]["groups"][0]["group_id"], 600);
        assert_eq!(data["entity"]["groups"][0]["period_end"], "now");
        assert_eq!(data["warnings"].as_array().unwrap().len(), 1);

        let notices = data["notices"].as_array().unwrap();
        let last = notices.last().and_then(|n| n.as_str()).unwrap();
        assert!(notices.len() > 1);
        assert!(last.contains("Group 500"));
    }

    #[tokio::test]
    async fn test_entity_failure_is_bad_gateway() {
        let gateway = pilot_gateway().failing(ResourceKind::EntityDetails, PILOT);

        let (status, body) = get(app(gateway), "/api/characters/2119066983/history").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert!(body.get("data").is_none());
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("2119066983"));
        assert!(error.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_lookup() {
        let (status, body) = get(
            app(MemoryGateway::new()),
            "/api/lookup?input=https%3A%2F%2Fzkillboard.com%2Fcharacter%2F454518485%2F",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["entity_id"], 454518485);
        assert_eq!(body["data"]["portrait_url"], portrait_url(454518485));
    }

    #[tokio::test]
    async fn test_invalid_lookup_is_bad_request() {
        let (status, body) = get(app(MemoryGateway::new()), "/api/lookup?input=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("abc"));
    }
}
