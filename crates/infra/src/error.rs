//! Error taxonomy shared by the engine, the services and the HTTP layer.

use jobboard_core::DomainError;

use crate::matching::NotificationError;
use crate::store::StoreError;
use crate::uow::{StepError, UnitOfWorkError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobBoardError {
    /// Malformed id, invalid filter or rejected input.
    #[error("invalid input: {0}")]
    ClientInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Store unavailable, failed or timed out. Never retried.
    #[error("data access failed: {0}")]
    DataAccess(String),
    #[error("transaction aborted at step '{step}': {message}")]
    TransactionAbort { step: String, message: String },
    /// Logged by the dispatcher; never returned to a caller.
    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),
}

impl JobBoardError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<DomainError> for JobBoardError {
    fn from(err: DomainError) -> Self {
        Self::ClientInput(err.to_string())
    }
}

impl From<StoreError> for JobBoardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(domain) => Self::ClientInput(domain.to_string()),
            other => Self::DataAccess(other.to_string()),
        }
    }
}

impl From<UnitOfWorkError> for JobBoardError {
    fn from(err: UnitOfWorkError) -> Self {
        match err {
            UnitOfWorkError::Aborted {
                source: StepError::Missing(what),
                ..
            } => Self::NotFound(what),
            UnitOfWorkError::Aborted {
                source: StepError::Store(store),
                ..
            } => Self::from(store),
            UnitOfWorkError::Begin(store) => Self::DataAccess(store.to_string()),
            other => {
                let step = other.step().to_string();
                let message = match other {
                    UnitOfWorkError::Aborted { source, .. } => source.to_string(),
                    UnitOfWorkError::Begin(e)
                    | UnitOfWorkError::Conflict(e)
                    | UnitOfWorkError::Commit(e) => e.to_string(),
                };
                Self::TransactionAbort { step, message }
            }
        }
    }
}

impl From<NotificationError> for JobBoardError {
    fn from(err: NotificationError) -> Self {
        Self::NotificationDelivery(err.to_string())
    }
}
