//! Read-side shapes assembled by the search engine.

use serde::{Deserialize, Serialize};

use crate::company::CompanyProfile;
use crate::posting::JobPosting;

/// One row of a search result: the posting flattened with company display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(flatten)]
    pub job: JobPosting,
    pub company_name: Option<String>,
    pub company_image: Option<String>,
}

impl JobSummary {
    pub fn new(job: JobPosting, company: Option<&CompanyProfile>) -> Self {
        Self {
            job,
            company_name: company.map(|c| c.name.clone()),
            company_image: company.and_then(|c| c.primary_image().map(str::to_string)),
        }
    }
}

/// Fully joined detail document for one posting and one viewer.
///
/// `is_applied` / `is_saved` are only present for an identified viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetailView {
    #[serde(flatten)]
    pub job: JobPosting,
    pub company: Option<CompanyProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_applied: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_saved: Option<bool>,
}
