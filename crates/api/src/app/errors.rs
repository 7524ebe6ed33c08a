use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use jobboard_infra::JobBoardError;

pub fn board_error_to_response(err: JobBoardError) -> axum::response::Response {
    match err {
        JobBoardError::ClientInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        JobBoardError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        JobBoardError::TransactionAbort { .. } => {
            json_error(StatusCode::CONFLICT, "transaction_aborted", err.to_string())
        }
        JobBoardError::DataAccess(_) | JobBoardError::NotificationDelivery(_) => {
            tracing::error!(error = %err, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "data_access_error", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
