use std::sync::Arc;

use axum::{response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "cached_details": services.search.cache().len(),
        "notifications": services.dispatcher_stats(),
    }))
}
