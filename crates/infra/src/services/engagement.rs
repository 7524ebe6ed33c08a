use chrono::Utc;
use tracing::info;

use jobboard_core::{CandidateId, JobId};
use jobboard_jobs::{ApplicationRecord, SavedJobRecord};

use crate::error::JobBoardError;
use crate::store::{EngagementSession, TransactionalStore};
use crate::uow::{StepError, UnitOfWork};

/// Candidate actions on a posting. Each is a check-then-insert inside one
/// unit of work, so two concurrent requests cannot both insert.
#[derive(Debug, Clone)]
pub struct EngagementService<S> {
    store: S,
}

impl<S> EngagementService<S>
where
    S: TransactionalStore,
    S::Session: EngagementSession,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn apply(&self, candidate_id: CandidateId, job_id: JobId) -> Result<ApplicationRecord, JobBoardError> {
        let now = Utc::now();
        let record = ApplicationRecord::new(candidate_id, job_id, now);
        let mut uow = UnitOfWork::new(&self.store);

        uow.step("check-job-open", move |session: &mut S::Session| {
            let job = session
                .get_job(job_id)?
                .filter(|job| !job.is_deleted)
                .ok_or_else(|| StepError::missing(format!("job {job_id}")))?;
            if job.is_closed || !job.is_active_at(now) {
                return Err(StepError::rejected(format!("job {job_id} is not accepting applications")));
            }
            Ok(())
        });
        uow.step("check-not-applied", move |session: &mut S::Session| {
            match session.find_application(candidate_id, job_id)? {
                Some(_) => Err(StepError::rejected(format!("already applied to job {job_id}"))),
                None => Ok(()),
            }
        });
        let insert = record.clone();
        uow.step("insert-application", move |session: &mut S::Session| {
            Ok(session.insert_application(insert)?)
        });

        uow.commit()?;
        info!(candidate_id = %candidate_id, job_id = %job_id, "application recorded");
        Ok(record)
    }

    pub fn save(&self, candidate_id: CandidateId, job_id: JobId) -> Result<SavedJobRecord, JobBoardError> {
        let record = SavedJobRecord::new(candidate_id, job_id, Utc::now());
        let mut uow = UnitOfWork::new(&self.store);

        uow.step("check-job-exists", move |session: &mut S::Session| {
            session
                .get_job(job_id)?
                .filter(|job| !job.is_deleted)
                .map(|_| ())
                .ok_or_else(|| StepError::missing(format!("job {job_id}")))
        });
        uow.step("check-not-saved", move |session: &mut S::Session| {
            match session.find_saved_job(candidate_id, job_id)? {
                Some(_) => Err(StepError::rejected(format!("job {job_id} is already saved"))),
                None => Ok(()),
            }
        });
        let insert = record.clone();
        uow.step("insert-saved-job", move |session: &mut S::Session| {
            Ok(session.insert_saved_job(insert)?)
        });

        uow.commit()?;
        info!(candidate_id = %candidate_id, job_id = %job_id, "job saved");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use chrono::Duration;
    use jobboard_core::CompanyId;
    use jobboard_jobs::{JobPatch, JobPosting, SalaryRange};

    use super::*;
    use crate::store::{InMemoryDocumentStore, JobStore};

    fn open_job(store: &InMemoryDocumentStore) -> JobPosting {
        let now = Utc::now();
        let job = JobPosting {
            id: JobId::new(),
            company_id: CompanyId::new(),
            title: "Open".to_string(),
            description: String::new(),
            salary: SalaryRange { min: 1, max: 2 },
            requirements: Default::default(),
            locations: Default::default(),
            categories: Default::default(),
            level: String::new(),
            quantity: 1,
            is_hot: false,
            is_closed: false,
            is_deleted: false,
            created_at: now,
            expire_date: now + Duration::days(3),
        };
        store.insert_job(job.clone()).unwrap();
        job
    }

    #[test]
    fn apply_once_then_abort_on_duplicate() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let job = open_job(&store);
        let service = EngagementService::new(store.clone());
        let candidate = CandidateId::new();

        service.apply(candidate, job.id).unwrap();
        let err = service.apply(candidate, job.id).unwrap_err();

        assert!(matches!(
            err,
            JobBoardError::TransactionAbort { ref step, .. } if step == "check-not-applied"
        ));
        assert_eq!(store.application_count(job.id).unwrap(), 1);
    }

    #[test]
    fn closed_job_rejects_applications() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let job = open_job(&store);
        store
            .update_job(
                job.id,
                &JobPatch {
                    is_closed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        let service = EngagementService::new(store.clone());

        let err = service.apply(CandidateId::new(), job.id).unwrap_err();
        assert!(matches!(
            err,
            JobBoardError::TransactionAbort { ref step, .. } if step == "check-job-open"
        ));
    }

    #[test]
    fn unknown_job_is_not_found() {
        let service = EngagementService::new(Arc::new(InMemoryDocumentStore::new()));
        assert!(matches!(
            service.apply(CandidateId::new(), JobId::new()),
            Err(JobBoardError::NotFound(_))
        ));
        assert!(matches!(
            service.save(CandidateId::new(), JobId::new()),
            Err(JobBoardError::NotFound(_))
        ));
    }

    #[test]
    fn save_is_idempotent_guarded() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let job = open_job(&store);
        let service = EngagementService::new(store.clone());
        let candidate = CandidateId::new();

        service.save(candidate, job.id).unwrap();
        let err = service.save(candidate, job.id).unwrap_err();
        assert!(matches!(
            err,
            JobBoardError::TransactionAbort { ref step, .. } if step == "check-not-saved"
        ));
    }

    #[test]
    fn concurrent_applications_by_one_candidate_insert_once() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let job = open_job(&store);
        let service = Arc::new(EngagementService::new(store.clone()));
        let candidate = CandidateId::new();
        let barrier = Arc::new(Barrier::new(6));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let service = service.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.apply(candidate, job.id).is_ok()
                })
            })
            .collect();
        let ok = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(ok, 1);
        assert_eq!(store.application_count(job.id).unwrap(), 1);
    }
}
