//! Records linking a candidate to a posting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{CandidateId, JobId};

/// A candidate applied to a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn new(candidate_id: CandidateId, job_id: JobId, now: DateTime<Utc>) -> Self {
        Self {
            candidate_id,
            job_id,
            is_deleted: false,
            created_at: now,
        }
    }

    pub fn links(&self, candidate_id: CandidateId, job_id: JobId) -> bool {
        !self.is_deleted && self.candidate_id == candidate_id && self.job_id == job_id
    }
}

/// A candidate bookmarked a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedJobRecord {
    pub candidate_id: CandidateId,
    pub job_id: JobId,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl SavedJobRecord {
    pub fn new(candidate_id: CandidateId, job_id: JobId, now: DateTime<Utc>) -> Self {
        Self {
            candidate_id,
            job_id,
            is_deleted: false,
            created_at: now,
        }
    }

    pub fn links(&self, candidate_id: CandidateId, job_id: JobId) -> bool {
        !self.is_deleted && self.candidate_id == candidate_id && self.job_id == job_id
    }
}
