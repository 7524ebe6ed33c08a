use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};

use jobboard_core::CandidateId;
use jobboard_infra::JobBoardError;
use jobboard_jobs::{JobPatch, NewJobPosting};

use crate::app::{dto, errors, services::AppServices};
use crate::context::ViewerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(search_jobs).post(create_job))
        .route("/:id", get(job_detail).patch(update_job).delete(delete_job))
        .route("/:id/apply", post(apply_to_job))
        .route("/:id/save", post(save_job))
}

pub async fn search_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::SearchJobsQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };

    let (page, filter) = query.into_parts();
    match off_runtime(move || services.search.search(page, &filter)).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

pub async fn create_job(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewJobPosting>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.postings.create(body) {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

pub async fn job_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(id): Path<String>,
) -> Response {
    let job_id = match dto::parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match off_runtime(move || services.search.detail(job_id, viewer.viewer())).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

pub async fn update_job(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<JobPatch>, JsonRejection>,
) -> Response {
    let job_id = match dto::parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(patch) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    match services.postings.update(job_id, &patch) {
        Ok(job) => Json(job).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

pub async fn delete_job(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let job_id = match dto::parse_job_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match services.postings.delete(job_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

pub async fn apply_to_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(id): Path<String>,
) -> Response {
    let (candidate_id, job_id) = match candidate_and_job(viewer, &id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match services.engagement.apply(candidate_id, job_id) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

pub async fn save_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(id): Path<String>,
) -> Response {
    let (candidate_id, job_id) = match candidate_and_job(viewer, &id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match services.engagement.save(candidate_id, job_id) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::board_error_to_response(e),
    }
}

/// Run a store-bound lookup on the blocking pool so a slow store cannot
/// stall the async workers.
async fn off_runtime<T, F>(f: F) -> Result<T, JobBoardError>
where
    F: FnOnce() -> Result<T, JobBoardError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .unwrap_or_else(|e| Err(JobBoardError::DataAccess(format!("lookup task failed: {e}"))))
}

fn candidate_and_job(viewer: ViewerContext, raw_id: &str) -> Result<(CandidateId, jobboard_core::JobId), Response> {
    let Some(candidate_id) = viewer.viewer() else {
        return Err(errors::json_error(
            StatusCode::UNAUTHORIZED,
            "viewer_required",
            "candidate identity is required",
        ));
    };
    Ok((candidate_id, dto::parse_job_id(raw_id)?))
}
