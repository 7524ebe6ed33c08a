use jobboard_core::CandidateId;

/// Who is looking at a request's data.
///
/// Set by [`crate::middleware::viewer_middleware`] on every API request;
/// anonymous when the gateway did not forward an identity.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ViewerContext {
    viewer: Option<CandidateId>,
}

impl ViewerContext {
    pub fn anonymous() -> Self {
        Self { viewer: None }
    }

    pub fn identified(viewer: CandidateId) -> Self {
        Self {
            viewer: Some(viewer),
        }
    }

    pub fn viewer(&self) -> Option<CandidateId> {
        self.viewer
    }
}
