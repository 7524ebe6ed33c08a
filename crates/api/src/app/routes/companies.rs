use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};

use jobboard_jobs::NewCompany;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_company))
        .route("/:id", get(get_company))
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewCompany>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.companies.create(body) {
        Ok(company) => (StatusCode::CREATED, Json(company)).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let company_id = match dto::parse_company_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match services.companies.get(company_id) {
        Ok(company) => Json(company).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}
