//! Route handlers for the prediction API

use std::collections::HashMap;

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use super::AppState;

/// Error body returned for any schema mismatch. The offending column is
/// carried as a field so clients need not parse the message.
#[derive(Debug, Serialize)]
pub struct SchemaMismatchBody {
    pub error: &'static str,
    pub column: String,
    pub message: String,
}

/// `GET /predict` - score one record supplied as query parameters.
///
/// Every predictor field is required; values are coerced against the
/// fit-time schema. Success returns the predicted class and both class
/// probabilities rounded to three decimals. Validation failures return
/// 422 with a structured schema_mismatch body - never a crash, never a
/// silently defaulted prediction.
pub async fn predict(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    match state.pipeline.predict_record(&query, state.threshold) {
        Ok(prediction) => HttpResponse::Ok().json(prediction.rounded()),
        Err(err) => HttpResponse::UnprocessableEntity().json(SchemaMismatchBody {
            error: "schema_mismatch",
            column: err.column().to_string(),
            message: err.to_string(),
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub model_trained_at: String,
    pub model_features: usize,
    pub tool_version: String,
}

/// `GET /health` - liveness plus artifact provenance.
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthBody {
        status: "ok",
        model_trained_at: state.pipeline.metadata.created_at.clone(),
        model_features: state.pipeline.features.width(),
        tool_version: state.pipeline.metadata.tool_version.clone(),
    })
}
