//! HTTP surface of the model server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::warn;
use serde_json::{Value, json};

use crate::{
    error::ServeErr,
    request::{ModelSummary, PredictionRequest, PredictionResponse},
    server::ModelServer,
};

type Shared = State<Arc<ModelServer>>;

/// Builds the router serving `server`.
pub fn router(server: Arc<ModelServer>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/model", get(model_info))
        .route("/models", get(list_models))
        .route("/health", get(health))
        .route("/reload", post(reload))
        .with_state(server)
}

async fn predict(
    State(server): Shared,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ServeErr> {
    let Json(body) = body.map_err(|e| ServeErr::BadRequest(e.body_text()))?;
    let Value::Object(features) = body else {
        return Err(ServeErr::BadRequest("expected a JSON object of feature values".into()));
    };

    let request: PredictionRequest = features.into_iter().collect();
    match server.predict(&request) {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(code = e.code(); "rejected prediction: {e}");
            Err(e)
        }
    }
}

async fn model_info(State(server): Shared) -> Json<ModelSummary> {
    Json(server.current().summary())
}

async fn list_models(State(server): Shared) -> Result<Json<Value>, ServeErr> {
    let keys = server.available().await?;
    Ok(Json(json!({ "models": keys })))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

async fn reload(State(server): Shared) -> Result<Json<ModelSummary>, ServeErr> {
    server.reload().await.map(Json)
}

impl IntoResponse for ServeErr {
    fn into_response(self) -> Response {
        let status = match &self {
            ServeErr::ModelLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ServeErr::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServeErr::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let mut body = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let ServeErr::InvalidInput {
            missing,
            unexpected,
            invalid,
        } = &self
        {
            body["missing"] = json!(missing);
            body["unexpected"] = json!(unexpected);
            body["invalid"] = json!(invalid);
        }

        (status, Json(json!({ "error": body }))).into_response()
    }
}
