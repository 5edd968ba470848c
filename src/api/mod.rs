// ============================================================
// Layer 1 — HTTP API
// ============================================================
// The prediction service as seen from the network:
//
//   GET  /         → {"status": "Active" | "Inactive"}
//   POST /predict  → {"predicted_price": .., "model_version": ..}
//
// The ServiceContext is injected into every handler through a
// `warp::any().map(..)` filter. It is moved into the route tree
// and dropped together with it once the server shuts down.
//
// Reference: warp crate documentation (Filters, graceful shutdown)
//            Rust Book §17 (Async and Await)

pub mod handlers;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use warp::{Filter, Rejection, Reply};

use crate::application::predict_use_case::ServiceContext;

/// Request bodies above this size are refused
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Full route tree of the service
pub fn routes(ctx: ServiceContext) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_ctx = warp::any().map(move || ctx.clone());

    let health = warp::path::end()
        .and(warp::get())
        .and(with_ctx.clone())
        .and_then(handlers::health);

    let predict = warp::path!("predict")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_ctx)
        .and_then(handlers::predict);

    health.or(predict).with(warp::trace::request())
}

/// Serve until Ctrl-C is received
pub async fn serve(ctx: ServiceContext, addr: SocketAddr) -> Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for the shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
    };

    let (bound, server) = warp::serve(routes(ctx))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .with_context(|| format!("Cannot bind to {addr}"))?;

    tracing::info!("Prediction service listening on http://{}", bound);
    server.await;
    tracing::info!("Server stopped, model released");
    Ok(())
}
