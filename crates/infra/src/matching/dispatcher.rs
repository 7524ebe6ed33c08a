use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, error, info, warn};

use jobboard_events::Observer;
use jobboard_jobs::{JobPosted, JobPosting};

use super::sink::NotificationSink;
use super::template::{self, FALLBACK_PUBLIC_HOST_URL};
use super::{DispatchTask, NotificationTask};
use crate::error::JobBoardError;
use crate::store::ProfileStore;

/// What the matcher does when the task queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Wait for a worker to free a slot.
    #[default]
    Block,
    /// Discard the task and log it.
    DropAndLog,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub name: String,
    pub workers: usize,
    pub queue_capacity: usize,
    pub overflow: OverflowPolicy,
    pub public_host_url: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: "skill-match".to_string(),
            workers: 5,
            queue_capacity: 100,
            overflow: OverflowPolicy::Block,
            public_host_url: FALLBACK_PUBLIC_HOST_URL.to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_public_host_url(mut self, url: impl Into<String>) -> Self {
        self.public_host_url = url.into();
        self
    }
}

/// Runtime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DispatcherStats {
    pub jobs_received: u64,
    pub matched: u64,
    pub enqueued: u64,
    pub sent: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    jobs_received: AtomicU64,
    matched: AtomicU64,
    enqueued: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatcherStats {
        DispatcherStats {
            jobs_received: self.jobs_received.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Fans newly posted jobs out to candidates whose skills intersect the
/// job's requirements.
///
/// One matcher thread turns each posted job into per-candidate tasks on a
/// bounded queue; a fixed pool of workers renders and sends them. Posting
/// never waits on either.
pub struct SkillMatchDispatcher {
    name: String,
    intake: Mutex<Option<Sender<JobPosting>>>,
    threads: Mutex<Vec<thread::JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl SkillMatchDispatcher {
    pub fn spawn<P>(
        profiles: P,
        sink: Arc<dyn NotificationSink>,
        config: DispatcherConfig,
    ) -> io::Result<Self>
    where
        P: ProfileStore + 'static,
    {
        let workers = config.workers.max(1);
        let capacity = config.queue_capacity.max(1);
        let counters = Arc::new(Counters::default());

        let (intake_tx, intake_rx) = mpsc::channel::<JobPosting>();
        let (queue_tx, queue_rx) = mpsc::sync_channel::<DispatchTask>(capacity);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let host: Arc<str> = Arc::from(config.public_host_url.as_str());

        let mut threads = Vec::with_capacity(workers + 1);

        let matcher_counters = counters.clone();
        let overflow = config.overflow;
        threads.push(
            thread::Builder::new()
                .name(format!("{}-matcher", config.name))
                .spawn(move || match_loop(profiles, intake_rx, queue_tx, overflow, &matcher_counters))?,
        );

        for worker in 0..workers {
            let queue_rx = queue_rx.clone();
            let sink = sink.clone();
            let host = host.clone();
            let counters = counters.clone();
            threads.push(
                thread::Builder::new()
                    .name(format!("{}-worker-{worker}", config.name))
                    .spawn(move || worker_loop(worker, &queue_rx, sink.as_ref(), &host, &counters))?,
            );
        }

        info!(
            dispatcher = %config.name,
            workers,
            queue_capacity = capacity,
            overflow = ?config.overflow,
            "skill match dispatcher started"
        );

        Ok(Self {
            name: config.name,
            intake: Mutex::new(Some(intake_tx)),
            threads: Mutex::new(threads),
            counters,
        })
    }

    /// Hand a posting to the matcher. Never blocks on matching or delivery.
    pub fn submit(&self, job: JobPosting) {
        let job_id = job.id;
        let sent = match self.intake.lock() {
            Ok(intake) => intake.as_ref().is_some_and(|tx| tx.send(job).is_ok()),
            Err(_) => false,
        };
        if !sent {
            warn!(dispatcher = %self.name, job_id = %job_id, "dispatcher stopped; posting not matched");
        }
    }

    pub fn stats(&self) -> DispatcherStats {
        self.counters.snapshot()
    }

    /// Stop accepting postings, finish everything already accepted, then
    /// join every thread. Later calls are no-ops.
    pub fn shutdown(&self) {
        if let Ok(mut intake) = self.intake.lock() {
            intake.take();
        }
        let threads = match self.threads.lock() {
            Ok(mut threads) => std::mem::take(&mut *threads),
            Err(_) => Vec::new(),
        };
        if threads.is_empty() {
            return;
        }
        for handle in threads {
            if handle.join().is_err() {
                error!(dispatcher = %self.name, "dispatcher thread panicked");
            }
        }
        info!(dispatcher = %self.name, stats = ?self.stats(), "skill match dispatcher stopped");
    }
}

impl Observer<JobPosted> for SkillMatchDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&self, event: &JobPosted) {
        self.submit(event.job.clone());
    }
}

impl std::fmt::Debug for SkillMatchDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillMatchDispatcher")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn match_loop<P: ProfileStore>(
    profiles: P,
    intake: Receiver<JobPosting>,
    queue: SyncSender<DispatchTask>,
    overflow: OverflowPolicy,
    counters: &Counters,
) {
    // Ends once the dispatcher drops the intake sender and the backlog is empty.
    for job in intake {
        counters.jobs_received.fetch_add(1, Ordering::Relaxed);

        let candidates = match profiles.find_by_skill_intersection(&job.requirements, true) {
            Ok(candidates) => candidates,
            Err(err) => {
                error!(job_id = %job.id, error = %err, "skill match query failed");
                continue;
            }
        };
        counters.matched.fetch_add(candidates.len() as u64, Ordering::Relaxed);
        debug!(job_id = %job.id, matched = candidates.len(), "skill match computed");

        for candidate in candidates {
            let candidate_id = candidate.id;
            let task = DispatchTask::NotifyCandidate(NotificationTask {
                candidate,
                job: job.clone(),
            });

            match overflow {
                OverflowPolicy::Block => {
                    if queue.send(task).is_err() {
                        error!(job_id = %job.id, "notification workers gone; matcher stopping");
                        return;
                    }
                }
                OverflowPolicy::DropAndLog => match queue.try_send(task) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        counters.dropped.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            job_id = %job.id,
                            candidate_id = %candidate_id,
                            "notification queue full; task dropped"
                        );
                        continue;
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        error!(job_id = %job.id, "notification workers gone; matcher stopping");
                        return;
                    }
                },
            }
            counters.enqueued.fetch_add(1, Ordering::Relaxed);
        }
    }
}

fn worker_loop(
    worker: usize,
    queue: &Mutex<Receiver<DispatchTask>>,
    sink: &dyn NotificationSink,
    public_host_url: &str,
    counters: &Counters,
) {
    loop {
        let next = match queue.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        // Disconnected: matcher is gone and the queue is drained.
        let Ok(task) = next else { break };

        match task {
            DispatchTask::NotifyCandidate(task) => {
                let rendered = template::render(&task, public_host_url);
                match sink.send(&task.candidate.email, &rendered.subject, &rendered.html_body) {
                    Ok(()) => {
                        counters.sent.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            worker,
                            job_id = %task.job.id,
                            candidate_id = %task.candidate.id,
                            "skill match notification sent"
                        );
                    }
                    Err(err) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        let err = JobBoardError::from(err);
                        warn!(
                            worker,
                            job_id = %task.job.id,
                            candidate_id = %task.candidate.id,
                            error = %err,
                            "skill match notification dropped"
                        );
                    }
                }
            }
        }
    }
    debug!(worker, "notification worker exiting");
}
