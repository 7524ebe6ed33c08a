use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};

use jobboard_jobs::NewAccount;

use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/", post(register_account))
}

pub async fn register_account(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.accounts.register(body) {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}
