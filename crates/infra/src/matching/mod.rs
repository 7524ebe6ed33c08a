//! Skill-match notification pipeline.

use jobboard_jobs::{CandidateProfile, JobPosting};

mod dispatcher;
pub mod sink;
pub mod template;

pub use dispatcher::{DispatcherConfig, DispatcherStats, OverflowPolicy, SkillMatchDispatcher};
pub use sink::{
    LogNotificationSink, NotificationError, NotificationSink, RecordingNotificationSink,
    SentNotification,
};

/// One candidate to tell about one posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTask {
    pub candidate: CandidateProfile,
    pub job: JobPosting,
}

/// Unit of work on the notification queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchTask {
    NotifyCandidate(NotificationTask),
}
