//! Infrastructure layer: storage, caching, notification pipeline,
//! transactions and the services built on them.

pub mod cache;
pub mod config;
pub mod error;
pub mod matching;
pub mod search;
pub mod services;
pub mod store;
pub mod uow;

pub use cache::{CacheSweeper, Clock, ManualClock, QueryCache, SweeperHandle, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::JobBoardError;
pub use matching::{
    DispatchTask, DispatcherConfig, DispatcherStats, NotificationSink, NotificationTask,
    OverflowPolicy, SkillMatchDispatcher,
};
pub use search::{DetailCache, DetailKey, JobSearchEngine};
pub use uow::{StepError, UnitOfWork, UnitOfWorkError};
