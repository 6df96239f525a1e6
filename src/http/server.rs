//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bind server to listener
//! - Dispatch requests through routing, binding and the backend
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, FromRequest, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::binding::BodyBinding;
use crate::config::GatewayConfig;
use crate::http::error::GatewayError;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::reply_response;
use crate::observability::{metrics, spans};
use crate::routing::{Lookup, RouteDefinition, RouteTable};
use crate::rpc::{dispatch, Reply};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server serving `routes`.
    pub fn new(config: GatewayConfig, routes: RouteTable) -> Self {
        tracing::info!(routes = routes.len(), "Route table loaded");

        let state = AppState {
            routes: Arc::new(routes),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            // The tower-http limit below is the only body limit.
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(spans::request_span::<Body>))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_size)),
            )
    }

    /// The fully layered router, for serving or in-process testing.
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
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler.
/// Looks up the route, binds the request, invokes the backend and encodes the result.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Transcoding request"
    );

    // 1. Match Route
    let matched = match state.routes.lookup(&method, &path) {
        Lookup::Matched(m) => m,
        Lookup::MethodNotAllowed(allowed) => {
            tracing::warn!(request_id = %request_id, method = %method, path = %path, "Method not allowed");
            metrics::record_unmatched("method_not_allowed");
            return GatewayError::MethodNotAllowed(allowed).into_response();
        }
        Lookup::NotFound => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_unmatched("not_found");
            return GatewayError::NotFound.into_response();
        }
    };
    let route = matched.route;
    let rpc = route.rpc().to_string();

    // 2. Read body, bind, dispatch
    let result = match read_body(route, request).await {
        Ok(body) => transcode(route, &matched.captures, query.as_deref(), &body).await,
        Err(e) => Err(e),
    };

    // 3. Encode
    let response = match result {
        Ok(reply) => reply_response(reply, route.response_field()),
        Err(err) => {
            match &err {
                GatewayError::PayloadTooLarge => {
                    tracing::warn!(
                        request_id = %request_id,
                        rpc = %rpc,
                        "Request body exceeds size limit"
                    );
                }
                GatewayError::Rpc(failure) => {
                    metrics::record_rpc_failure(&rpc, failure);
                    tracing::warn!(
                        request_id = %request_id,
                        rpc = %rpc,
                        code = %failure.code,
                        handled = failure.handled,
                        "RPC failed"
                    );
                }
                _ => {
                    metrics::record_binding_failure(&rpc);
                    tracing::info!(request_id = %request_id, rpc = %rpc, error = %err, "Request rejected");
                }
            }
            err.into_response()
        }
    };

    tracing::debug!(
        request_id = %request_id,
        rpc = %rpc,
        status = response.status().as_u16(),
        "Request complete"
    );
    metrics::record_request(&rpc, response.status().as_u16(), start_time);
    response
}

/// Buffer the body when the route binds one.
///
/// The `Bytes` extractor recognises the tower-http length limit, so a body
/// over the limit is a 413 even when it was sent without a length.
async fn read_body(route: &RouteDefinition, request: Request<Body>) -> Result<Bytes, GatewayError> {
    if matches!(route.body_binding(), BodyBinding::None) {
        return Ok(Bytes::new());
    }
    Bytes::from_request(request, &()).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            GatewayError::Body(rejection)
        }
    })
}

async fn transcode(
    route: &RouteDefinition,
    captures: &[String],
    query: Option<&str>,
    body: &[u8],
) -> Result<Reply, GatewayError> {
    let request = route.bind(captures, query, body)?;
    let reply = dispatch(route.rpc(), route.handler(), request).await?;
    Ok(reply)
}
