// ============================================================
// Layer 1 — HTTP Handlers
// ============================================================
// Thin adapters between warp and the ServiceContext. Handlers
// never fail at the warp level (Infallible): every error kind
// is turned into a status code plus a `{"detail": ...}` body.

use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{self, Reply, Response};

use crate::application::predict_use_case::ServiceContext;
use crate::domain::contract::PredictionRequest;
use crate::domain::error::ServeError;

/// Error body returned for every non-200 answer
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// GET /
pub async fn health(ctx: ServiceContext) -> Result<impl Reply, Infallible> {
    Ok(reply::json(&ctx.health()))
}

/// POST /predict
pub async fn predict(body: Bytes, ctx: ServiceContext) -> Result<Response, Infallible> {
    let result = PredictionRequest::from_json(&body)
        .map_err(ServeError::from)
        .and_then(|request| ctx.predict(&request));

    match result {
        Ok(prediction) => {
            tracing::debug!(
                "Predicted {} with {}",
                prediction.predicted_price,
                prediction.model_version
            );
            Ok(reply::json(&prediction).into_response())
        }
        Err(err) => Ok(error_reply(&err)),
    }
}

fn error_reply(err: &ServeError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match err {
        ServeError::Validation(v) => tracing::warn!("Rejected request, fields {:?}", v.field_names()),
        _ if status.is_server_error() => tracing::error!("Prediction failed: {}", err),
        _ => tracing::warn!("Rejected request: {}", err),
    }
    let body = ErrorBody { detail: err.to_string() };
    reply::with_status(reply::json(&body), status).into_response()
}
