use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use jobboard_core::{CompanyId, JobId};
use jobboard_infra::JobBoardError;
use jobboard_jobs::{tags, JobSearchFilter, PageRequest};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `GET /jobs` query string. List filters are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct SearchJobsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub q: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub expire_from: Option<DateTime<Utc>>,
    pub expire_to: Option<DateTime<Utc>>,
    pub salary_from: Option<u64>,
    pub salary_to: Option<u64>,
    pub categories: Option<String>,
    pub locations: Option<String>,
    pub requirements: Option<String>,
    pub level: Option<String>,
    pub is_hot: Option<bool>,
    pub only_active: Option<bool>,
}

impl SearchJobsQuery {
    pub fn into_parts(self) -> (PageRequest, JobSearchFilter) {
        let page = PageRequest::new(self.page.unwrap_or(0), self.page_size.unwrap_or(0));
        let filter = JobSearchFilter {
            q: self.q,
            title: self.title,
            company_name: self.company_name,
            created_from: self.created_from,
            created_to: self.created_to,
            expire_from: self.expire_from,
            expire_to: self.expire_to,
            salary_from: self.salary_from,
            salary_to: self.salary_to,
            categories: split_list(self.categories.as_deref()),
            locations: split_list(self.locations.as_deref()),
            requirements: split_list(self.requirements.as_deref()),
            level: self.level,
            is_hot: self.is_hot,
            only_active: self.only_active.unwrap_or(false),
        };
        (page, filter)
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    tags::normalize(raw.into_iter().flat_map(|s| s.split(',')))
}

// -------------------------
// Path parsing
// -------------------------

pub fn parse_job_id(raw: &str) -> Result<JobId, axum::response::Response> {
    raw.parse()
        .map_err(|e| errors::board_error_to_response(JobBoardError::from(e)))
}

pub fn parse_company_id(raw: &str) -> Result<CompanyId, axum::response::Response> {
    raw.parse()
        .map_err(|e| errors::board_error_to_response(JobBoardError::from(e)))
}
