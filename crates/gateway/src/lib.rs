//! HTTP gateway for curhat.
//!
//! Routes:
//! - `POST /chat`: `{ "message": ... }` → `{ "reply": ... }`
//! - `GET /`: liveness, `{ "status": "ok" }`
//! - `GET /health`: liveness plus version and uptime
//!
//! The peer IP address is the client identity. Every well-formed chat
//! request gets a 200 with reply text; only malformed bodies are rejected.
//!
//! Built on Axum.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, header};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use curhat_agent::ReasoningEngine;
use curhat_config::AppConfig;
use curhat_core::ClientId;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: Arc<ReasoningEngine>,
    pub started_at: DateTime<Utc>,
}

impl GatewayState {
    pub fn new(engine: Arc<ReasoningEngine>) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS (any origin when `allowed_origins` contains `"*"`)
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, config: &curhat_config::GatewayConfig) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors_layer(&config.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let engine = Arc::new(ReasoningEngine::from_config(&config)?);
    info!(provider = engine.provider_name(), model = %config.provider.model, "Reasoning engine ready");

    let maintenance = engine.clone().spawn_maintenance(config.maintenance.interval());

    let state = Arc::new(GatewayState::new(engine));
    let app = build_router(state, &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await;

    maintenance.abort();
    served?;
    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

async fn root_handler() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

async fn chat_handler(
    State(state): State<SharedState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let client = ClientId::new(peer.ip().to_string());
    let reply = state
        .engine
        .respond(&client, &req.message, Instant::now())
        .await;

    Json(ChatResponse { reply: reply.text })
}
