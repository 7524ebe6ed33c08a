use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{AccountId, DomainError, DomainResult};

use crate::candidate::CandidateProfile;
use crate::company::{CompanyProfile, ContactInfo};
use crate::tags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Candidate,
    Company,
}

/// Login account. Email is unique among active accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub role: AccountRole,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Profile document owned by a candidate account.
    pub fn candidate_profile(&self, skills: BTreeSet<String>) -> CandidateProfile {
        CandidateProfile {
            id: self.id.as_candidate(),
            email: self.email.clone(),
            name: self.display_name.clone(),
            skills,
            is_deleted: false,
        }
    }

    /// Profile document owned by a company account.
    pub fn company_profile(&self) -> CompanyProfile {
        CompanyProfile {
            id: self.id.as_company(),
            name: self.display_name.clone(),
            contact: ContactInfo {
                email: Some(self.email.clone()),
                ..ContactInfo::default()
            },
            images: Vec::new(),
            is_deleted: false,
            created_at: self.created_at,
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub role: AccountRole,
    /// Candidate skills; ignored for company accounts.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl NewAccount {
    /// Lowercased, trimmed email used for uniqueness checks.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let email = self.normalized_email();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(DomainError::validation(format!("invalid email: {}", self.email)));
        }
        if self.display_name.trim().is_empty() {
            return Err(DomainError::validation("display_name must not be empty"));
        }
        Ok(())
    }

    pub fn into_account(self, id: AccountId, now: DateTime<Utc>) -> DomainResult<(Account, BTreeSet<String>)> {
        self.validate()?;
        let account = Account {
            id,
            email: self.normalized_email(),
            display_name: self.display_name.trim().to_string(),
            role: self.role,
            is_deleted: false,
            created_at: now,
        };
        Ok((account, tags::normalize(self.skills)))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            display_name: "Ada".to_string(),
            role: AccountRole::Candidate,
            skills: vec!["Rust".to_string()],
        }
    }

    #[test]
    fn email_is_normalized_for_uniqueness() {
        assert_eq!(input("  Ada@Example.COM ").normalized_email(), "ada@example.com");
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(input("ada").validate().is_err());
        assert!(input("@example.com").validate().is_err());
        assert!(input("ada@localhost").validate().is_err());
        assert!(input("ada@example.com").validate().is_ok());
    }

    #[test]
    fn candidate_profile_shares_account_identity() {
        let (account, skills) = input("ada@example.com")
            .into_account(AccountId::new(), Utc::now())
            .unwrap();
        let profile = account.candidate_profile(skills);
        assert_eq!(profile.id, account.id.as_candidate());
        assert!(profile.skills.contains("Rust"));
    }
}
