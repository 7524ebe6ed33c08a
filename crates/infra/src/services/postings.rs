use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use jobboard_core::{CompanyId, JobId};
use jobboard_events::ObserverRegistry;
use jobboard_jobs::{CompanyProfile, JobPatch, JobPosted, JobPosting, NewCompany, NewJobPosting};

use crate::error::JobBoardError;
use crate::store::{CompanyStore, JobStore};

/// Posting lifecycle. Creation announces the posting to every registered
/// observer once the document is stored.
pub struct JobPostingService<S> {
    store: S,
    events: Arc<ObserverRegistry<JobPosted>>,
}

impl<S> JobPostingService<S>
where
    S: JobStore + CompanyStore,
{
    pub fn new(store: S, events: Arc<ObserverRegistry<JobPosted>>) -> Self {
        Self { store, events }
    }

    pub fn create(&self, input: NewJobPosting) -> Result<JobPosting, JobBoardError> {
        let now = Utc::now();
        let job = JobPosting::create(JobId::new(), input, now)?;

        let company_live = self
            .store
            .get_company(job.company_id)?
            .is_some_and(|c| !c.is_deleted);
        if !company_live {
            return Err(JobBoardError::not_found(format!("company {}", job.company_id)));
        }

        self.store.insert_job(job.clone())?;
        info!(job_id = %job.id, company_id = %job.company_id, "job posted");

        self.events.notify(&JobPosted {
            job: job.clone(),
            occurred_at: now,
        });
        Ok(job)
    }

    /// Replace the provided fields and return the stored document.
    ///
    /// Cached detail views keep serving the old document until they expire.
    pub fn update(&self, job_id: JobId, patch: &JobPatch) -> Result<JobPosting, JobBoardError> {
        let job = self
            .store
            .update_job(job_id, patch)?
            .ok_or_else(|| JobBoardError::not_found(format!("job {job_id}")))?;
        info!(job_id = %job_id, "job updated");
        Ok(job)
    }

    pub fn delete(&self, job_id: JobId) -> Result<(), JobBoardError> {
        if !self.store.soft_delete_job(job_id)? {
            return Err(JobBoardError::not_found(format!("job {job_id}")));
        }
        info!(job_id = %job_id, "job deleted");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CompanyService<S> {
    store: S,
}

impl<S: CompanyStore> CompanyService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create(&self, input: NewCompany) -> Result<CompanyProfile, JobBoardError> {
        let company = CompanyProfile::create(CompanyId::new(), input, Utc::now())?;
        self.store.insert_company(company.clone())?;
        info!(company_id = %company.id, "company created");
        Ok(company)
    }

    pub fn get(&self, company_id: CompanyId) -> Result<CompanyProfile, JobBoardError> {
        self.store
            .get_company(company_id)?
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| JobBoardError::not_found(format!("company {company_id}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Duration;
    use jobboard_events::Observer;
    use jobboard_jobs::ContactInfo;

    use super::*;
    use crate::store::InMemoryDocumentStore;

    #[derive(Default)]
    struct Collect(Mutex<Vec<JobId>>);

    impl Observer<JobPosted> for Collect {
        fn name(&self) -> &str {
            "collect"
        }

        fn on_event(&self, event: &JobPosted) {
            self.0.lock().unwrap().push(event.job.id);
        }
    }

    fn setup() -> (
        Arc<InMemoryDocumentStore>,
        Arc<Collect>,
        JobPostingService<Arc<InMemoryDocumentStore>>,
        CompanyProfile,
    ) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let company = CompanyService::new(store.clone())
            .create(NewCompany {
                name: "Acme".to_string(),
                contact: ContactInfo::default(),
                images: vec![],
            })
            .unwrap();
        let events = Arc::new(ObserverRegistry::<JobPosted>::new());
        let seen = Arc::new(Collect::default());
        events.register(seen.clone());
        (store.clone(), seen, JobPostingService::new(store, events), company)
    }

    fn new_posting(company_id: CompanyId) -> NewJobPosting {
        NewJobPosting {
            company_id,
            title: "Backend Engineer".to_string(),
            description: String::new(),
            salary_min: 100,
            salary_max: 200,
            requirements: vec!["rust".to_string()],
            locations: vec![],
            categories: vec![],
            level: "mid".to_string(),
            quantity: 1,
            is_hot: false,
            expire_date: Utc::now() + Duration::days(10),
        }
    }

    #[test]
    fn create_stores_and_announces_once() {
        let (store, seen, service, company) = setup();
        let job = service.create(new_posting(company.id)).unwrap();

        assert_eq!(store.get_job(job.id).unwrap().unwrap(), job);
        assert_eq!(*seen.0.lock().unwrap(), vec![job.id]);
    }

    #[test]
    fn create_for_unknown_company_is_not_found_and_silent() {
        let (_store, seen, service, _company) = setup();
        let err = service.create(new_posting(CompanyId::new())).unwrap_err();
        assert!(matches!(err, JobBoardError::NotFound(_)));
        assert!(seen.0.lock().unwrap().is_empty());
    }

    #[test]
    fn invalid_posting_is_client_input() {
        let (_store, _seen, service, company) = setup();
        let mut input = new_posting(company.id);
        input.salary_min = 500;
        assert!(matches!(service.create(input), Err(JobBoardError::ClientInput(_))));
    }

    #[test]
    fn update_and_delete_lifecycle() {
        let (_store, _seen, service, company) = setup();
        let job = service.create(new_posting(company.id)).unwrap();

        let updated = service
            .update(
                job.id,
                &JobPatch {
                    is_hot: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_hot);

        service.delete(job.id).unwrap();
        assert!(matches!(service.delete(job.id), Err(JobBoardError::NotFound(_))));
        assert!(matches!(
            service.update(job.id, &JobPatch::default()),
            Err(JobBoardError::NotFound(_))
        ));
    }
}
