//! Storage seams for the job board.
//!
//! The document database is an external collaborator; these traits are the
//! only thing the engine, dispatcher and services see of it. Reads that feed
//! a unit of work go through session traits so the store can track what a
//! transaction observed.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use jobboard_core::{CandidateId, CompanyId, DomainError, JobId};
use jobboard_jobs::{
    Account, ApplicationRecord, CandidateProfile, CompanyProfile, JobDetailView, JobPatch,
    JobPosting, JobQuery, JobSummary, Page, SavedJobRecord,
};

pub mod in_memory;

pub use in_memory::{InMemoryDocumentStore, InMemorySession};

/// Store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("operation exceeded max time of {0:?}")]
    Timeout(Duration),
    #[error("write conflict: {0}")]
    WriteConflict(String),
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("document rejected: {0}")]
    Rejected(#[from] DomainError),
    #[error("session already finished")]
    SessionFinished,
    #[error("storage error: {0}")]
    Storage(String),
}

/// Per-call read options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Upper bound on server-side execution time; `None` means unbounded.
    pub max_time: Option<Duration>,
}

impl FindOptions {
    pub fn with_max_time(max_time: Duration) -> Self {
        Self {
            max_time: Some(max_time),
        }
    }
}

/// Acknowledgement level requested for a transaction's writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteConcern {
    Acknowledged,
    #[default]
    Majority,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    pub write_concern: WriteConcern,
}

/// One page of matches plus the total they were counted from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobMatches {
    pub docs: Vec<JobSummary>,
    pub total: u64,
}

/// Job postings, searched with the company join.
pub trait JobStore: Send + Sync {
    /// One page of matching postings, newest first.
    fn find_jobs(&self, query: &JobQuery, page: Page) -> Result<Vec<JobSummary>, StoreError>;

    /// Number of postings matching `query`, company predicates included.
    fn count_jobs(&self, query: &JobQuery) -> Result<u64, StoreError>;

    /// Page and total taken from the same snapshot, so `total` always
    /// agrees with `docs`.
    fn find_jobs_counted(&self, query: &JobQuery, page: Page) -> Result<JobMatches, StoreError>;

    /// Joined detail view. `None` when the posting is missing or deleted, or
    /// when its company is deleted. Engagement flags are filled only when a
    /// viewer is given.
    fn find_job_detail(
        &self,
        job_id: JobId,
        viewer: Option<CandidateId>,
        options: FindOptions,
    ) -> Result<Option<JobDetailView>, StoreError>;

    fn get_job(&self, job_id: JobId) -> Result<Option<JobPosting>, StoreError>;

    fn insert_job(&self, job: JobPosting) -> Result<(), StoreError>;

    /// Find a live posting, apply `patch` and return the new document.
    fn update_job(&self, job_id: JobId, patch: &JobPatch) -> Result<Option<JobPosting>, StoreError>;

    /// Flip `is_deleted`. Returns `false` when there was no live posting.
    fn soft_delete_job(&self, job_id: JobId) -> Result<bool, StoreError>;
}

pub trait CompanyStore: Send + Sync {
    fn insert_company(&self, company: CompanyProfile) -> Result<(), StoreError>;
    fn get_company(&self, company_id: CompanyId) -> Result<Option<CompanyProfile>, StoreError>;
}

/// Read access to candidate profiles.
pub trait ProfileStore: Send + Sync {
    /// Candidates holding at least one of `skills`.
    fn find_by_skill_intersection(
        &self,
        skills: &BTreeSet<String>,
        exclude_deleted: bool,
    ) -> Result<Vec<CandidateProfile>, StoreError>;

    fn get_candidate(&self, candidate_id: CandidateId) -> Result<Option<CandidateProfile>, StoreError>;
}

/// Multi-document transactions.
pub trait TransactionalStore: Send + Sync {
    type Session;

    fn begin(&self, options: TransactionOptions) -> Result<Self::Session, StoreError>;

    /// Publish every staged write atomically, or none of them.
    fn commit(&self, session: Self::Session) -> Result<(), StoreError>;

    /// Discard staged writes.
    fn abort(&self, session: Self::Session);
}

/// Operations the registration flow runs inside a transaction.
pub trait AccountSession {
    fn find_account_by_email(&mut self, email: &str) -> Result<Option<Account>, StoreError>;
    fn insert_account(&mut self, account: Account) -> Result<(), StoreError>;
    fn insert_candidate(&mut self, profile: CandidateProfile) -> Result<(), StoreError>;
    fn insert_company(&mut self, profile: CompanyProfile) -> Result<(), StoreError>;
}

/// Operations the apply/save flows run inside a transaction.
pub trait EngagementSession {
    fn get_job(&mut self, job_id: JobId) -> Result<Option<JobPosting>, StoreError>;
    fn find_application(
        &mut self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<Option<ApplicationRecord>, StoreError>;
    fn insert_application(&mut self, record: ApplicationRecord) -> Result<(), StoreError>;
    fn find_saved_job(
        &mut self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<Option<SavedJobRecord>, StoreError>;
    fn insert_saved_job(&mut self, record: SavedJobRecord) -> Result<(), StoreError>;
}

impl<S> JobStore for Arc<S>
where
    S: JobStore + ?Sized,
{
    fn find_jobs(&self, query: &JobQuery, page: Page) -> Result<Vec<JobSummary>, StoreError> {
        (**self).find_jobs(query, page)
    }

    fn count_jobs(&self, query: &JobQuery) -> Result<u64, StoreError> {
        (**self).count_jobs(query)
    }

    fn find_jobs_counted(&self, query: &JobQuery, page: Page) -> Result<JobMatches, StoreError> {
        (**self).find_jobs_counted(query, page)
    }

    fn find_job_detail(
        &self,
        job_id: JobId,
        viewer: Option<CandidateId>,
        options: FindOptions,
    ) -> Result<Option<JobDetailView>, StoreError> {
        (**self).find_job_detail(job_id, viewer, options)
    }

    fn get_job(&self, job_id: JobId) -> Result<Option<JobPosting>, StoreError> {
        (**self).get_job(job_id)
    }

    fn insert_job(&self, job: JobPosting) -> Result<(), StoreError> {
        (**self).insert_job(job)
    }

    fn update_job(&self, job_id: JobId, patch: &JobPatch) -> Result<Option<JobPosting>, StoreError> {
        (**self).update_job(job_id, patch)
    }

    fn soft_delete_job(&self, job_id: JobId) -> Result<bool, StoreError> {
        (**self).soft_delete_job(job_id)
    }
}

impl<S> CompanyStore for Arc<S>
where
    S: CompanyStore + ?Sized,
{
    fn insert_company(&self, company: CompanyProfile) -> Result<(), StoreError> {
        (**self).insert_company(company)
    }

    fn get_company(&self, company_id: CompanyId) -> Result<Option<CompanyProfile>, StoreError> {
        (**self).get_company(company_id)
    }
}

impl<S> ProfileStore for Arc<S>
where
    S: ProfileStore + ?Sized,
{
    fn find_by_skill_intersection(
        &self,
        skills: &BTreeSet<String>,
        exclude_deleted: bool,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        (**self).find_by_skill_intersection(skills, exclude_deleted)
    }

    fn get_candidate(&self, candidate_id: CandidateId) -> Result<Option<CandidateProfile>, StoreError> {
        (**self).get_candidate(candidate_id)
    }
}

impl<S> TransactionalStore for Arc<S>
where
    S: TransactionalStore + ?Sized,
{
    type Session = S::Session;

    fn begin(&self, options: TransactionOptions) -> Result<Self::Session, StoreError> {
        (**self).begin(options)
    }

    fn commit(&self, session: Self::Session) -> Result<(), StoreError> {
        (**self).commit(session)
    }

    fn abort(&self, session: Self::Session) {
        (**self).abort(session)
    }
}
