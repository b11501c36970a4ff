//! HTTP surface: the gate in front of every page, the page renderer behind it
//! and an ungated health probe.

use crate::{
    cli::telemetry,
    gate::{gate, GateConfig},
};
use anyhow::Result;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

pub mod handlers;

/// Build the site router with the gate installed in front of every route.
#[must_use]
pub fn router(config: Arc<GateConfig>) -> Router {
    Router::new()
        .route("/health", get(handlers::health).options(handlers::health))
        .fallback(handlers::page_handler)
        .layer(middleware::from_fn_with_state(config.clone(), gate))
        .with_state(config)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
}

/// Serve the site until `ctrl-c`.
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails
pub async fn new(port: u16, config: GateConfig) -> Result<()> {
    let app = router(Arc::new(config));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    telemetry::shutdown_tracer();

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, request_id)
}
