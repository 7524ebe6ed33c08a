//! Unit of work: named steps that commit together or not at all.
//!
//! Steps run in registration order against one store session. The first
//! failing step aborts the session; nothing it or earlier steps staged
//! becomes visible. `commit` consumes the guard, so a unit of work runs once.

use tracing::{debug, warn};

use crate::store::{StoreError, TransactionOptions, TransactionalStore};

/// Why a step refused to continue.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A precondition the step checks does not hold.
    #[error("{0}")]
    Rejected(String),
    /// The document the step needs does not exist.
    #[error("{0}")]
    Missing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StepError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn missing(msg: impl Into<String>) -> Self {
        Self::Missing(msg.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UnitOfWorkError {
    #[error("failed to start transaction: {0}")]
    Begin(#[source] StoreError),
    #[error("step '{step}' aborted the transaction: {source}")]
    Aborted {
        step: String,
        #[source]
        source: StepError,
    },
    #[error("transaction conflicted with a concurrent write: {0}")]
    Conflict(#[source] StoreError),
    #[error("commit failed: {0}")]
    Commit(#[source] StoreError),
}

impl UnitOfWorkError {
    /// Name of the step (or phase) that ended the transaction.
    pub fn step(&self) -> &str {
        match self {
            UnitOfWorkError::Begin(_) => "begin",
            UnitOfWorkError::Aborted { step, .. } => step,
            UnitOfWorkError::Conflict(_) | UnitOfWorkError::Commit(_) => "commit",
        }
    }
}

type Step<'s, Sess> = Box<dyn FnOnce(&mut Sess) -> Result<(), StepError> + 's>;

pub struct UnitOfWork<'s, S: TransactionalStore> {
    store: &'s S,
    options: TransactionOptions,
    steps: Vec<(String, Step<'s, S::Session>)>,
}

impl<'s, S: TransactionalStore> UnitOfWork<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self::with_options(store, TransactionOptions::default())
    }

    pub fn with_options(store: &'s S, options: TransactionOptions) -> Self {
        Self {
            store,
            options,
            steps: Vec::new(),
        }
    }

    /// Append a step. Steps run in the order they were added.
    pub fn step<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: FnOnce(&mut S::Session) -> Result<(), StepError> + 's,
    {
        self.steps.push((name.into(), Box::new(f)));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step and commit, or abort at the first failure.
    pub fn commit(self) -> Result<(), UnitOfWorkError> {
        let mut session = self.store.begin(self.options).map_err(UnitOfWorkError::Begin)?;

        for (step, run) in self.steps {
            if let Err(source) = run(&mut session) {
                self.store.abort(session);
                warn!(step = %step, error = %source, "unit of work aborted");
                return Err(UnitOfWorkError::Aborted { step, source });
            }
            debug!(step = %step, "unit of work step completed");
        }

        self.store.commit(session).map_err(|err| match err {
            StoreError::WriteConflict(_) | StoreError::Duplicate(_) => {
                warn!(error = %err, "unit of work lost a commit race");
                UnitOfWorkError::Conflict(err)
            }
            other => UnitOfWorkError::Commit(other),
        })
    }
}
