//! Job search and detail lookups.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use jobboard_core::{CandidateId, JobId};
use jobboard_jobs::{JobDetailView, JobQuery, JobSearchFilter, JobSummary, PageRequest, Paginated};

use crate::cache::QueryCache;
use crate::error::JobBoardError;
use crate::store::{FindOptions, JobMatches, JobStore};

pub const DEFAULT_DETAIL_TIMEOUT: Duration = Duration::from_secs(5);

/// Detail cache key; anonymous viewers share one entry per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetailKey {
    pub job_id: JobId,
    pub viewer: Option<CandidateId>,
}

pub type DetailCache = QueryCache<DetailKey, JobDetailView>;

pub struct JobSearchEngine<S> {
    store: S,
    cache: Arc<DetailCache>,
    detail_timeout: Duration,
}

impl<S: JobStore> JobSearchEngine<S> {
    pub fn new(store: S, cache: Arc<DetailCache>) -> Self {
        Self {
            store,
            cache,
            detail_timeout: DEFAULT_DETAIL_TIMEOUT,
        }
    }

    pub fn with_detail_timeout(mut self, timeout: Duration) -> Self {
        self.detail_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<DetailCache> {
        &self.cache
    }

    /// Filtered, joined, paginated search.
    ///
    /// Out-of-range paging falls back to defaults. Store failures surface as
    /// [`JobBoardError::DataAccess`] and are not retried.
    pub fn search(
        &self,
        request: PageRequest,
        filter: &JobSearchFilter,
    ) -> Result<Paginated<JobSummary>, JobBoardError> {
        filter.validate()?;
        let page = request.normalized();
        let query = JobQuery::from_filter(filter, Utc::now());

        let JobMatches { docs, total } = self.store.find_jobs_counted(&query, page).map_err(|err| {
            warn!(error = %err, "job search failed");
            JobBoardError::from(err)
        })?;

        debug!(
            page = page.number,
            page_size = page.size,
            total_docs = total,
            returned = docs.len(),
            "job search"
        );
        Ok(Paginated::new(docs, total, page))
    }

    /// Joined detail view for one viewer, served from cache when fresh.
    ///
    /// Only successful lookups are cached.
    pub fn detail(
        &self,
        job_id: JobId,
        viewer: Option<CandidateId>,
    ) -> Result<JobDetailView, JobBoardError> {
        let key = DetailKey { job_id, viewer };
        if let Some(view) = self.cache.get(&key) {
            debug!(job_id = %job_id, "job detail cache hit");
            return Ok(view);
        }

        let options = FindOptions::with_max_time(self.detail_timeout);
        let view = self
            .store
            .find_job_detail(job_id, viewer, options)
            .map_err(|err| {
                warn!(job_id = %job_id, error = %err, "job detail lookup failed");
                JobBoardError::from(err)
            })?
            .ok_or_else(|| JobBoardError::not_found(format!("job {job_id}")))?;

        self.cache.insert(key, view.clone());
        debug!(job_id = %job_id, "job detail cached");
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration as ChronoDuration;
    use jobboard_core::CompanyId;
    use jobboard_jobs::{tags, CompanyProfile, ContactInfo, JobPatch, JobPosting, Page, SalaryRange};
    use proptest::prelude::*;

    use super::*;
    use crate::cache::ManualClock;
    use crate::store::{CompanyStore, InMemoryDocumentStore, StoreError};

    /// Counts detail lookups reaching the store.
    struct SpyStore {
        inner: InMemoryDocumentStore,
        detail_calls: AtomicUsize,
    }

    impl JobStore for SpyStore {
        fn find_jobs(&self, query: &JobQuery, page: Page) -> Result<Vec<JobSummary>, StoreError> {
            self.inner.find_jobs(query, page)
        }
        fn count_jobs(&self, query: &JobQuery) -> Result<u64, StoreError> {
            self.inner.count_jobs(query)
        }
        fn find_jobs_counted(&self, query: &JobQuery, page: Page) -> Result<JobMatches, StoreError> {
            self.inner.find_jobs_counted(query, page)
        }
        fn find_job_detail(
            &self,
            job_id: JobId,
            viewer: Option<CandidateId>,
            options: FindOptions,
        ) -> Result<Option<JobDetailView>, StoreError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_job_detail(job_id, viewer, options)
        }
        fn get_job(&self, job_id: JobId) -> Result<Option<JobPosting>, StoreError> {
            self.inner.get_job(job_id)
        }
        fn insert_job(&self, job: JobPosting) -> Result<(), StoreError> {
            self.inner.insert_job(job)
        }
        fn update_job(&self, job_id: JobId, patch: &JobPatch) -> Result<Option<JobPosting>, StoreError> {
            self.inner.update_job(job_id, patch)
        }
        fn soft_delete_job(&self, job_id: JobId) -> Result<bool, StoreError> {
            self.inner.soft_delete_job(job_id)
        }
    }

    fn spy(inner: InMemoryDocumentStore) -> Arc<SpyStore> {
        Arc::new(SpyStore {
            inner,
            detail_calls: AtomicUsize::new(0),
        })
    }

    fn posting(company_id: CompanyId, title: &str) -> JobPosting {
        let now = Utc::now();
        JobPosting {
            id: JobId::new(),
            company_id,
            title: title.to_string(),
            description: String::new(),
            salary: SalaryRange { min: 1000, max: 3000 },
            requirements: tags::normalize(["rust"]),
            locations: tags::normalize(["berlin"]),
            categories: tags::normalize(["backend"]),
            level: "senior".to_string(),
            quantity: 1,
            is_hot: false,
            is_closed: false,
            is_deleted: false,
            created_at: now,
            expire_date: now + ChronoDuration::days(30),
        }
    }

    fn engine_with_clock(store: Arc<SpyStore>) -> (Arc<ManualClock>, JobSearchEngine<Arc<SpyStore>>) {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(DetailCache::with_clock(Duration::from_secs(300), clock.clone()));
        (clock, JobSearchEngine::new(store, cache))
    }

    #[test]
    fn second_detail_call_is_served_from_cache() {
        let store = spy(InMemoryDocumentStore::new());
        let job = posting(CompanyId::new(), "cached");
        store.insert_job(job.clone()).unwrap();
        let (_clock, engine) = engine_with_clock(store.clone());

        let first = engine.detail(job.id, None).unwrap();
        let second = engine.detail(job.id, None).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.detail_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn viewers_get_separate_entries() {
        let store = spy(InMemoryDocumentStore::new());
        let job = posting(CompanyId::new(), "per viewer");
        store.insert_job(job.clone()).unwrap();
        let (_clock, engine) = engine_with_clock(store.clone());

        let anonymous = engine.detail(job.id, None).unwrap();
        let viewer = engine.detail(job.id, Some(CandidateId::new())).unwrap();

        assert_eq!(anonymous.is_applied, None);
        assert_eq!(viewer.is_applied, Some(false));
        assert_eq!(store.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn updates_stay_invisible_until_ttl_elapses() {
        let store = spy(InMemoryDocumentStore::new());
        let job = posting(CompanyId::new(), "before");
        store.insert_job(job.clone()).unwrap();
        let (clock, engine) = engine_with_clock(store.clone());

        engine.detail(job.id, None).unwrap();
        store
            .update_job(
                job.id,
                &JobPatch {
                    title: Some("after".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        clock.advance(Duration::from_secs(299));
        assert_eq!(engine.detail(job.id, None).unwrap().job.title, "before");

        clock.advance(Duration::from_secs(2));
        assert_eq!(engine.detail(job.id, None).unwrap().job.title, "after");
    }

    #[test]
    fn missing_or_deleted_job_is_not_found_and_not_cached() {
        let store = spy(InMemoryDocumentStore::new());
        let job = posting(CompanyId::new(), "deleted");
        store.insert_job(job.clone()).unwrap();
        store.soft_delete_job(job.id).unwrap();
        let (_clock, engine) = engine_with_clock(store.clone());

        assert!(matches!(engine.detail(job.id, None), Err(JobBoardError::NotFound(_))));
        assert!(matches!(engine.detail(JobId::new(), None), Err(JobBoardError::NotFound(_))));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn slow_detail_is_data_access_and_not_cached() {
        let store = Arc::new(InMemoryDocumentStore::new().with_read_latency(Duration::from_millis(30)));
        let job = posting(CompanyId::new(), "slow");
        store.insert_job(job.clone()).unwrap();
        let engine = JobSearchEngine::new(store, Arc::new(DetailCache::new(Duration::from_secs(300))))
            .with_detail_timeout(Duration::from_millis(5));

        assert!(matches!(engine.detail(job.id, None), Err(JobBoardError::DataAccess(_))));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn search_defaults_paging_and_reports_filtered_total() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let acme = CompanyProfile {
            id: CompanyId::new(),
            name: "Acme".to_string(),
            contact: ContactInfo::default(),
            images: vec![],
            is_deleted: false,
            created_at: Utc::now(),
        };
        store.insert_company(acme.clone()).unwrap();
        for i in 0..12 {
            store.insert_job(posting(acme.id, &format!("acme {i}"))).unwrap();
        }
        let globex = CompanyProfile {
            id: CompanyId::new(),
            name: "Globex".to_string(),
            ..acme.clone()
        };
        store.insert_company(globex.clone()).unwrap();
        for i in 0..3 {
            store.insert_job(posting(globex.id, &format!("other {i}"))).unwrap();
        }
        let engine = JobSearchEngine::new(store, Arc::new(DetailCache::new(Duration::from_secs(300))));

        let all = engine
            .search(PageRequest::new(0, -5), &JobSearchFilter::default())
            .unwrap();
        assert_eq!(all.page, 1);
        assert_eq!(all.docs.len(), 10);
        assert_eq!(all.total_docs, 15);
        assert_eq!(all.total_page, 2);

        let filter = JobSearchFilter {
            company_name: Some("acme".to_string()),
            ..Default::default()
        };
        let acme_only = engine.search(PageRequest::new(2, 10), &filter).unwrap();
        assert_eq!(acme_only.total_docs, 12);
        assert_eq!(acme_only.docs.len(), 2);
        assert!(acme_only
            .docs
            .iter()
            .all(|d| d.company_name.as_deref() == Some("Acme")));
    }

    #[test]
    fn invalid_filter_is_client_input() {
        let engine = JobSearchEngine::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(DetailCache::new(Duration::from_secs(300))),
        );
        let filter = JobSearchFilter {
            salary_from: Some(5000),
            salary_to: Some(100),
            ..Default::default()
        };
        assert!(matches!(
            engine.search(PageRequest::default(), &filter),
            Err(JobBoardError::ClientInput(_))
        ));
    }

    #[test]
    fn far_past_the_last_page_is_empty_with_totals() {
        let store = Arc::new(InMemoryDocumentStore::new());
        for i in 0..3 {
            store.insert_job(posting(CompanyId::new(), &format!("job {i}"))).unwrap();
        }
        let engine = JobSearchEngine::new(store, Arc::new(DetailCache::new(Duration::from_secs(300))));

        let result = engine
            .search(PageRequest::new(i64::MAX, 10), &JobSearchFilter::default())
            .unwrap();
        assert!(result.docs.is_empty());
        assert_eq!(result.total_docs, 3);
        assert_eq!(result.total_page, 1);
    }

    #[test]
    fn total_agrees_with_docs_under_concurrent_inserts() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let engine = JobSearchEngine::new(store.clone(), Arc::new(DetailCache::new(Duration::from_secs(300))));

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    store.insert_job(posting(CompanyId::new(), &format!("job {i}"))).unwrap();
                }
            })
        };
        for _ in 0..200 {
            let result = engine
                .search(PageRequest::new(1, 1_000), &JobSearchFilter::default())
                .unwrap();
            assert_eq!(result.docs.len() as u64, result.total_docs);
        }
        writer.join().unwrap();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn page_holds_exactly_the_remaining_documents(
            jobs in 0usize..40,
            page in -2i64..6,
            page_size in -2i64..15,
        ) {
            let store = Arc::new(InMemoryDocumentStore::new());
            for i in 0..jobs {
                store.insert_job(posting(CompanyId::new(), &format!("job {i}"))).unwrap();
            }
            let engine = JobSearchEngine::new(store, Arc::new(DetailCache::new(Duration::from_secs(300))));

            let result = engine
                .search(PageRequest::new(page, page_size), &JobSearchFilter::default())
                .unwrap();
            let size = if page_size < 1 { 10 } else { page_size as u64 };
            let number = if page < 1 { 1 } else { page as u64 };
            let skipped = (number - 1) * size;
            let expected = (jobs as u64).saturating_sub(skipped).min(size);

            prop_assert_eq!(result.docs.len() as u64, expected);
            prop_assert_eq!(result.page, number);
            prop_assert_eq!(result.total_docs, jobs as u64);
            prop_assert_eq!(result.total_page, (jobs as u64).div_ceil(size));
        }
    }
}
