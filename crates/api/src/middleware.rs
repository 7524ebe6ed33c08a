use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use jobboard_core::CandidateId;

use crate::app::errors::json_error;
use crate::context::ViewerContext;

/// Identity header forwarded by the gateway after token validation.
pub const VIEWER_HEADER: &str = "x-viewer-id";

pub async fn viewer_middleware(mut req: Request, next: Next) -> Response {
    let viewer = match extract_viewer(req.headers()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };
    req.extensions_mut().insert(viewer);
    next.run(req).await
}

fn extract_viewer(headers: &HeaderMap) -> Result<ViewerContext, Response> {
    let Some(raw) = headers.get(VIEWER_HEADER) else {
        return Ok(ViewerContext::anonymous());
    };

    let raw = raw
        .to_str()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_viewer", "viewer id must be ASCII"))?
        .trim();
    if raw.is_empty() {
        return Ok(ViewerContext::anonymous());
    }

    raw.parse::<CandidateId>()
        .map(ViewerContext::identified)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_viewer", e.to_string()))
}
