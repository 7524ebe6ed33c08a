use chrono::Utc;
use tracing::info;

use jobboard_core::AccountId;
use jobboard_jobs::{Account, AccountRole, NewAccount};

use crate::error::JobBoardError;
use crate::store::{AccountSession, TransactionalStore};
use crate::uow::{StepError, UnitOfWork};

/// Account registration: email uniqueness, account and profile land together.
#[derive(Debug, Clone)]
pub struct AccountService<S> {
    store: S,
}

impl<S> AccountService<S>
where
    S: TransactionalStore,
    S::Session: AccountSession,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn register(&self, input: NewAccount) -> Result<Account, JobBoardError> {
        let (account, skills) = input.into_account(AccountId::new(), Utc::now())?;

        let mut uow = UnitOfWork::new(&self.store);

        let email = account.email.clone();
        uow.step("check-email-unique", move |session: &mut S::Session| {
            match session.find_account_by_email(&email)? {
                Some(_) => Err(StepError::rejected(format!("email {email} is already registered"))),
                None => Ok(()),
            }
        });

        let record = account.clone();
        uow.step("insert-account", move |session: &mut S::Session| {
            Ok(session.insert_account(record)?)
        });

        match account.role {
            AccountRole::Candidate => {
                let profile = account.candidate_profile(skills);
                uow.step("insert-profile", move |session: &mut S::Session| {
                    Ok(session.insert_candidate(profile)?)
                });
            }
            AccountRole::Company => {
                let profile = account.company_profile();
                uow.step("insert-profile", move |session: &mut S::Session| {
                    Ok(session.insert_company(profile)?)
                });
            }
        }

        uow.commit()?;
        info!(account_id = %account.id, role = ?account.role, "account registered");
        Ok(account)
    }
}
