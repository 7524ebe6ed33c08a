//! In-memory document store for tests/dev.
//!
//! Transactions are optimistic: a session remembers the version of every
//! key it read (a document, or a unique-index slot such as an email), keeps
//! its writes to itself, and commits under the write lock only when none of
//! those versions moved. Writes to other keys never conflict.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use jobboard_core::{AccountId, CandidateId, CompanyId, JobId};
use jobboard_jobs::{
    Account, ApplicationRecord, CandidateProfile, CompanyProfile, JobDetailView, JobPatch,
    JobPosting, JobQuery, JobSummary, Page, SavedJobRecord,
};

use super::{
    AccountSession, CompanyStore, EngagementSession, FindOptions, JobMatches, JobStore,
    ProfileStore, StoreError, TransactionOptions, TransactionalStore,
};

/// Unit of conflict detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DocKey {
    Job(JobId),
    Company(CompanyId),
    Candidate(CandidateId),
    /// Normalized email slot of the unique account index.
    AccountEmail(String),
    Application(CandidateId, JobId),
    SavedJob(CandidateId, JobId),
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocKey::Job(id) => write!(f, "job {id}"),
            DocKey::Company(id) => write!(f, "company {id}"),
            DocKey::Candidate(id) => write!(f, "candidate {id}"),
            DocKey::AccountEmail(email) => write!(f, "account email {email}"),
            DocKey::Application(candidate, job) => write!(f, "application of {candidate} to {job}"),
            DocKey::SavedJob(candidate, job) => write!(f, "saved job {job} for {candidate}"),
        }
    }
}

#[derive(Debug, Default)]
struct Collections {
    jobs: HashMap<JobId, JobPosting>,
    companies: HashMap<CompanyId, CompanyProfile>,
    candidates: HashMap<CandidateId, CandidateProfile>,
    accounts: HashMap<AccountId, Account>,
    applications: Vec<ApplicationRecord>,
    saved_jobs: Vec<SavedJobRecord>,
    versions: HashMap<DocKey, u64>,
}

impl Collections {
    fn version(&self, key: &DocKey) -> u64 {
        self.versions.get(key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: DocKey) {
        *self.versions.entry(key).or_insert(0) += 1;
    }

    fn company_of(&self, job: &JobPosting) -> Option<&CompanyProfile> {
        self.companies.get(&job.company_id)
    }

    fn summaries<'a>(&self, jobs: impl IntoIterator<Item = &'a JobPosting>, page: Page) -> Vec<JobSummary> {
        jobs.into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .map(|job| JobSummary::new(job.clone(), self.company_of(job)))
            .collect()
    }

    /// Matching postings ordered by `created_at` desc, then id desc.
    fn matching(&self, query: &JobQuery) -> Vec<&JobPosting> {
        let mut jobs: Vec<&JobPosting> = self
            .jobs
            .values()
            .filter(|job| query.matches(job, self.company_of(job)))
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs
    }

    fn live_account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| !a.is_deleted && a.email == email)
    }

    fn live_application(&self, candidate_id: CandidateId, job_id: JobId) -> Option<&ApplicationRecord> {
        self.applications
            .iter()
            .find(|r| !r.is_deleted && r.links(candidate_id, job_id))
    }

    fn live_saved_job(&self, candidate_id: CandidateId, job_id: JobId) -> Option<&SavedJobRecord> {
        self.saved_jobs
            .iter()
            .find(|r| !r.is_deleted && r.links(candidate_id, job_id))
    }

    fn detail(&self, job_id: JobId, viewer: Option<CandidateId>) -> Option<JobDetailView> {
        let job = self.jobs.get(&job_id).filter(|j| !j.is_deleted)?;
        let company = self.company_of(job);
        if company.is_some_and(|c| c.is_deleted) {
            return None;
        }

        Some(JobDetailView {
            job: job.clone(),
            company: company.cloned(),
            is_applied: viewer.map(|c| self.live_application(c, job_id).is_some()),
            is_saved: viewer.map(|c| self.live_saved_job(c, job_id).is_some()),
        })
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Storage("store lock poisoned".to_string())
}

/// Process-local document store implementing every store trait.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<RwLock<Collections>>,
    next_session: AtomicU64,
    read_latency: Option<Duration>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every detail lookup, to exercise `max_time` handling.
    pub fn with_read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = Some(latency);
        self
    }

    /// Non-transactional profile write, for seeding.
    pub fn put_candidate(&self, profile: CandidateProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let key = DocKey::Candidate(profile.id);
        inner.candidates.insert(profile.id, profile);
        inner.bump(key);
        Ok(())
    }

    pub fn account_count(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.accounts.values().filter(|a| !a.is_deleted).count())
    }

    pub fn application_count(&self, job_id: JobId) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .applications
            .iter()
            .filter(|r| !r.is_deleted && r.job_id == job_id)
            .count())
    }
}

impl JobStore for InMemoryDocumentStore {
    fn find_jobs(&self, query: &JobQuery, page: Page) -> Result<Vec<JobSummary>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.summaries(inner.matching(query), page))
    }

    fn count_jobs(&self, query: &JobQuery) -> Result<u64, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.matching(query).len() as u64)
    }

    fn find_jobs_counted(&self, query: &JobQuery, page: Page) -> Result<JobMatches, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let matching = inner.matching(query);
        let total = matching.len() as u64;
        Ok(JobMatches {
            docs: inner.summaries(matching, page),
            total,
        })
    }

    fn find_job_detail(
        &self,
        job_id: JobId,
        viewer: Option<CandidateId>,
        options: FindOptions,
    ) -> Result<Option<JobDetailView>, StoreError> {
        let started = Instant::now();
        if let Some(latency) = self.read_latency {
            thread::sleep(latency);
        }

        let view = {
            let inner = self.inner.read().map_err(poisoned)?;
            inner.detail(job_id, viewer)
        };

        if let Some(max_time) = options.max_time {
            if started.elapsed() > max_time {
                return Err(StoreError::Timeout(max_time));
            }
        }
        Ok(view)
    }

    fn get_job(&self, job_id: JobId) -> Result<Option<JobPosting>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.jobs.get(&job_id).cloned())
    }

    fn insert_job(&self, job: JobPosting) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.jobs.contains_key(&job.id) {
            return Err(StoreError::Duplicate(format!("job {}", job.id)));
        }
        let key = DocKey::Job(job.id);
        inner.jobs.insert(job.id, job);
        inner.bump(key);
        Ok(())
    }

    fn update_job(&self, job_id: JobId, patch: &JobPatch) -> Result<Option<JobPosting>, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let Some(job) = inner.jobs.get_mut(&job_id).filter(|j| !j.is_deleted) else {
            return Ok(None);
        };
        job.apply_patch(patch)?;
        let updated = job.clone();
        inner.bump(DocKey::Job(job_id));
        Ok(Some(updated))
    }

    fn soft_delete_job(&self, job_id: JobId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let Some(job) = inner.jobs.get_mut(&job_id).filter(|j| !j.is_deleted) else {
            return Ok(false);
        };
        job.soft_delete();
        inner.bump(DocKey::Job(job_id));
        Ok(true)
    }
}

impl CompanyStore for InMemoryDocumentStore {
    fn insert_company(&self, company: CompanyProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.companies.contains_key(&company.id) {
            return Err(StoreError::Duplicate(format!("company {}", company.id)));
        }
        let key = DocKey::Company(company.id);
        inner.companies.insert(company.id, company);
        inner.bump(key);
        Ok(())
    }

    fn get_company(&self, company_id: CompanyId) -> Result<Option<CompanyProfile>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.companies.get(&company_id).cloned())
    }
}

impl ProfileStore for InMemoryDocumentStore {
    fn find_by_skill_intersection(
        &self,
        skills: &BTreeSet<String>,
        exclude_deleted: bool,
    ) -> Result<Vec<CandidateProfile>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut matches: Vec<CandidateProfile> = inner
            .candidates
            .values()
            .filter(|c| !(exclude_deleted && c.is_deleted))
            .filter(|c| c.matches_any(skills))
            .cloned()
            .collect();
        matches.sort_by_key(|c| c.id);
        Ok(matches)
    }

    fn get_candidate(&self, candidate_id: CandidateId) -> Result<Option<CandidateProfile>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.candidates.get(&candidate_id).cloned())
    }
}

impl TransactionalStore for InMemoryDocumentStore {
    type Session = InMemorySession;

    fn begin(&self, options: TransactionOptions) -> Result<InMemorySession, StoreError> {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(session_id = id, write_concern = ?options.write_concern, "transaction started");
        Ok(InMemorySession {
            id,
            inner: Arc::clone(&self.inner),
            options,
            observed: HashMap::new(),
            staged: StagedWrites::default(),
        })
    }

    fn commit(&self, session: InMemorySession) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        for (key, version) in &session.observed {
            if inner.version(key) != *version {
                return Err(StoreError::WriteConflict(format!("{key} changed since it was read")));
            }
        }

        let staged = session.staged;
        for account in &staged.accounts {
            if inner.live_account_by_email(&account.email).is_some() {
                return Err(StoreError::Duplicate(format!("account email {}", account.email)));
            }
        }
        for record in &staged.applications {
            if inner.live_application(record.candidate_id, record.job_id).is_some() {
                return Err(StoreError::Duplicate(format!(
                    "application of {} to {}",
                    record.candidate_id, record.job_id
                )));
            }
        }
        for record in &staged.saved_jobs {
            if inner.live_saved_job(record.candidate_id, record.job_id).is_some() {
                return Err(StoreError::Duplicate(format!(
                    "saved job {} for {}",
                    record.job_id, record.candidate_id
                )));
            }
        }

        for account in staged.accounts {
            inner.bump(DocKey::AccountEmail(account.email.clone()));
            inner.accounts.insert(account.id, account);
        }
        for profile in staged.candidates {
            inner.bump(DocKey::Candidate(profile.id));
            inner.candidates.insert(profile.id, profile);
        }
        for profile in staged.companies {
            inner.bump(DocKey::Company(profile.id));
            inner.companies.insert(profile.id, profile);
        }
        for record in staged.applications {
            inner.bump(DocKey::Application(record.candidate_id, record.job_id));
            inner.applications.push(record);
        }
        for record in staged.saved_jobs {
            inner.bump(DocKey::SavedJob(record.candidate_id, record.job_id));
            inner.saved_jobs.push(record);
        }

        tracing::trace!(
            session_id = session.id,
            write_concern = ?session.options.write_concern,
            "transaction committed"
        );
        Ok(())
    }

    fn abort(&self, session: InMemorySession) {
        tracing::trace!(session_id = session.id, "transaction aborted");
    }
}

#[derive(Debug, Default)]
struct StagedWrites {
    accounts: Vec<Account>,
    candidates: Vec<CandidateProfile>,
    companies: Vec<CompanyProfile>,
    applications: Vec<ApplicationRecord>,
    saved_jobs: Vec<SavedJobRecord>,
}

/// Open transaction against an [`InMemoryDocumentStore`].
#[derive(Debug)]
pub struct InMemorySession {
    id: u64,
    inner: Arc<RwLock<Collections>>,
    options: TransactionOptions,
    observed: HashMap<DocKey, u64>,
    staged: StagedWrites,
}

impl InMemorySession {
    /// Run `f` against committed data and record the version of `key`.
    ///
    /// Fails fast when the key moved since this session first read it.
    fn read<T>(&mut self, key: DocKey, f: impl FnOnce(&Collections) -> T) -> Result<T, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let version = inner.version(&key);
        match self.observed.entry(key) {
            Entry::Occupied(seen) if *seen.get() != version => {
                return Err(StoreError::WriteConflict(format!(
                    "{} changed during the transaction",
                    seen.key()
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(version);
            }
        }
        Ok(f(&inner))
    }
}

impl AccountSession for InMemorySession {
    fn find_account_by_email(&mut self, email: &str) -> Result<Option<Account>, StoreError> {
        if let Some(staged) = self.staged.accounts.iter().find(|a| a.email == email) {
            return Ok(Some(staged.clone()));
        }
        self.read(DocKey::AccountEmail(email.to_string()), |c| {
            c.live_account_by_email(email).cloned()
        })
    }

    fn insert_account(&mut self, account: Account) -> Result<(), StoreError> {
        self.staged.accounts.push(account);
        Ok(())
    }

    fn insert_candidate(&mut self, profile: CandidateProfile) -> Result<(), StoreError> {
        self.staged.candidates.push(profile);
        Ok(())
    }

    fn insert_company(&mut self, profile: CompanyProfile) -> Result<(), StoreError> {
        self.staged.companies.push(profile);
        Ok(())
    }
}

impl EngagementSession for InMemorySession {
    fn get_job(&mut self, job_id: JobId) -> Result<Option<JobPosting>, StoreError> {
        self.read(DocKey::Job(job_id), |c| c.jobs.get(&job_id).cloned())
    }

    fn find_application(
        &mut self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        if let Some(staged) = self
            .staged
            .applications
            .iter()
            .find(|r| r.links(candidate_id, job_id))
        {
            return Ok(Some(staged.clone()));
        }
        self.read(DocKey::Application(candidate_id, job_id), |c| {
            c.live_application(candidate_id, job_id).cloned()
        })
    }

    fn insert_application(&mut self, record: ApplicationRecord) -> Result<(), StoreError> {
        self.staged.applications.push(record);
        Ok(())
    }

    fn find_saved_job(
        &mut self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<Option<SavedJobRecord>, StoreError> {
        if let Some(staged) = self
            .staged
            .saved_jobs
            .iter()
            .find(|r| r.links(candidate_id, job_id))
        {
            return Ok(Some(staged.clone()));
        }
        self.read(DocKey::SavedJob(candidate_id, job_id), |c| {
            c.live_saved_job(candidate_id, job_id).cloned()
        })
    }

    fn insert_saved_job(&mut self, record: SavedJobRecord) -> Result<(), StoreError> {
        self.staged.saved_jobs.push(record);
        Ok(())
    }
}
