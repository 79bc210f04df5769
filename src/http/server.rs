//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with record, connect and health handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics, rate limiting)
//! - Register post-list hooks
//! - Bind server to listener with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::http::connect::connect;
use crate::http::records::{
    create_record, delete_record, list_records, update_record, view_record,
};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::records::{FieldExclusionHook, Hooks, MemoryStore, RecordStore};
use crate::security::admin_auth::{admin_auth_middleware, AdminToken};
use crate::security::rate_limit::{collection_rate_limit_middleware, CollectionRateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub hooks: Hooks,
}

impl AppState {
    /// State with the default hooks registered.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            hooks: Hooks::new().on_records_list(FieldExclusionHook),
        }
    }
}

/// HTTP server for the collection gate.
pub struct GateServer {
    router: Router,
    config: GateConfig,
}

impl GateServer {
    /// Create a server backed by an in-memory store of the configured collections.
    pub fn new(config: GateConfig) -> Self {
        let store = Arc::new(MemoryStore::new(config.store.collections.iter().cloned()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: GateConfig, store: Arc<dyn RecordStore>) -> Self {
        let rate_limiter = Arc::new(CollectionRateLimiter::from_config(
            &config.rate_limit.policies,
        ));

        for policy in rate_limiter.policies() {
            tracing::info!(collection = %policy.collection(), "Rate limit policy registered");
        }

        let router = Self::build_router(&config, AppState::new(store), rate_limiter);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &GateConfig,
        state: AppState,
        rate_limiter: Arc<CollectionRateLimiter>,
    ) -> Router {
        let mut connect_route: MethodRouter<AppState> = get(connect);
        if config.connect.require_admin_auth {
            connect_route = connect_route.layer(middleware::from_fn_with_state(
                AdminToken::new(&config.admin.api_key),
                admin_auth_middleware,
            ));
        } else {
            tracing::warn!("/api/connect is served without admin authorization");
        }

        Router::new()
            .route("/api/health", get(health))
            .route("/api/connect", connect_route)
            .route(
                "/api/collections/{collection}/records",
                get(list_records).post(create_record),
            )
            .route(
                "/api/collections/{collection}/records/{id}",
                get(view_record).patch(update_record).delete(delete_record),
            )
            .fallback(not_found)
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                rate_limiter,
                collection_rate_limit_middleware,
            ))
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"code": 200, "message": "API is healthy.", "data": {}}))
}

async fn not_found() -> Response {
    ApiError::NotFound.into_response()
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
