use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Response as HttpResponse, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use textcad_inference::ShapeService;
use textcad_protocol::{
    serialize_json, ErrorResponse, HealthResponse, ParseTextRequest, ParseTextResponse,
    RetrainRequest, RetrainResponse, NO_TEXT_PROVIDED,
};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

/// Shared handler state.
///
/// Parses take the read lock; a retrain holds the write lock until the
/// corpus has been persisted, so there is only ever one writer.
#[derive(Clone)]
pub struct HttpState {
    service: Arc<RwLock<ShapeService>>,
}

impl HttpState {
    #[must_use]
    pub fn new(service: ShapeService) -> Self {
        Self {
            service: Arc::new(RwLock::new(service)),
        }
    }
}

pub fn build_router(state: HttpState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/parse-text", post(parse_text))
        .route("/health", get(health))
        .route("/retrain", post(retrain))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn parse_text(State(state): State<HttpState>, body: Bytes) -> Result<Response, StatusCode> {
    let request: ParseTextRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return build_response(StatusCode::BAD_REQUEST, &ErrorResponse::invalid_json(err))
        }
    };
    let Some(text) = request.text() else {
        return build_response(StatusCode::BAD_REQUEST, &ErrorResponse::new(NO_TEXT_PROVIDED));
    };

    let outcome = state.service.read().await.parse(text);
    build_response(
        StatusCode::OK,
        &ParseTextResponse::new(outcome.objects, outcome.ml_powered),
    )
}

async fn health(State(state): State<HttpState>) -> Result<Response, StatusCode> {
    let health = state.service.read().await.health();
    build_response(
        StatusCode::OK,
        &HealthResponse::healthy(health.models_trained, health.training_examples),
    )
}

async fn retrain(State(state): State<HttpState>, body: Bytes) -> Result<Response, StatusCode> {
    let request: RetrainRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RetrainRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(err) => {
                return build_response(StatusCode::BAD_REQUEST, &ErrorResponse::invalid_json(err))
            }
        }
    };

    let mut service = state.service.write().await;
    match service.retrain(request.example).await {
        Ok(total) => build_response(StatusCode::OK, &RetrainResponse::retrained(total)),
        Err(err) if err.is_client_error() => {
            build_response(StatusCode::BAD_REQUEST, &ErrorResponse::new(err.to_string()))
        }
        Err(err) => {
            log::error!("Retrain failed: {err}");
            build_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorResponse::new(err.to_string()),
            )
        }
    }
}

pub(crate) fn build_response<T: Serialize>(
    status: StatusCode,
    payload: &T,
) -> Result<Response, StatusCode> {
    let bytes = serialize_json(payload)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();

    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
