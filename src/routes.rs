use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::orchestrator::{InvocationResponse, LabelRequest};
use crate::state::AppState;

/// Serverless-style event: only the query string is read
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    #[serde(default)]
    pub query_string_parameters: Option<LabelRequest>,
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // Query-string trigger
        .route("/", get(describe_image))
        .route("/labels", get(describe_image))

        // Event-style trigger
        .route("/invoke", post(invoke))
}

impl IntoResponse for InvocationResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.body).into_response()
    }
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "source_language": state.config.translation_config.source_language,
        "min_confidence": state.config.vision_config.min_confidence
    }))
}

async fn describe_image(
    State(state): State<AppState>,
    Query(request): Query<LabelRequest>,
) -> InvocationResponse {
    state.orchestrator.handle(request).await
}

async fn invoke(
    State(state): State<AppState>,
    Json(event): Json<InvocationEvent>,
) -> Json<InvocationResponse> {
    let request = event.query_string_parameters.unwrap_or_default();
    Json(state.orchestrator.handle(request).await)
}
