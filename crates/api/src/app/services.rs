use std::io;
use std::sync::{Arc, Mutex};

use jobboard_events::ObserverRegistry;
use jobboard_infra::matching::NotificationSink;
use jobboard_infra::services::{AccountService, CompanyService, EngagementService, JobPostingService};
use jobboard_infra::store::InMemoryDocumentStore;
use jobboard_infra::{
    AppConfig, CacheSweeper, DetailCache, DispatcherStats, JobSearchEngine, SkillMatchDispatcher,
    SweeperHandle,
};
use jobboard_jobs::JobPosted;

pub type Store = Arc<InMemoryDocumentStore>;

/// Everything the handlers need, built once at startup.
pub struct AppServices {
    pub config: AppConfig,
    pub store: Store,
    pub search: JobSearchEngine<Store>,
    pub postings: JobPostingService<Store>,
    pub companies: CompanyService<Store>,
    pub accounts: AccountService<Store>,
    pub engagement: EngagementService<Store>,
    pub events: Arc<ObserverRegistry<JobPosted>>,
    dispatcher: Arc<SkillMatchDispatcher>,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl AppServices {
    pub fn dispatcher_stats(&self) -> DispatcherStats {
        self.dispatcher.stats()
    }

    /// Drain the notification pipeline and stop the cache sweeper.
    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
        let sweeper = self.sweeper.lock().ok().and_then(|mut s| s.take());
        if let Some(sweeper) = sweeper {
            sweeper.shutdown();
        }
        tracing::info!("services stopped");
    }
}

pub fn build_services(config: &AppConfig, sink: Arc<dyn NotificationSink>) -> io::Result<AppServices> {
    build_services_with_store(config, Arc::new(InMemoryDocumentStore::new()), sink)
}

pub fn build_services_with_store(
    config: &AppConfig,
    store: Store,
    sink: Arc<dyn NotificationSink>,
) -> io::Result<AppServices> {
    let cache = Arc::new(DetailCache::new(config.cache_ttl));
    let sweeper = CacheSweeper::spawn("detail-cache-sweeper", cache.clone(), config.cache_sweep_interval)?;

    let dispatcher = Arc::new(SkillMatchDispatcher::spawn(store.clone(), sink, config.dispatcher())?);
    let events = Arc::new(ObserverRegistry::<JobPosted>::new());
    events.register(dispatcher.clone());

    Ok(AppServices {
        config: config.clone(),
        search: JobSearchEngine::new(store.clone(), cache).with_detail_timeout(config.detail_timeout),
        postings: JobPostingService::new(store.clone(), events.clone()),
        companies: CompanyService::new(store.clone()),
        accounts: AccountService::new(store.clone()),
        engagement: EngagementService::new(store.clone()),
        store,
        events,
        dispatcher,
        sweeper: Mutex::new(Some(sweeper)),
    })
}
