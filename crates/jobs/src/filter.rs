use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult};

/// Search criteria for public job listing.
///
/// Every field is optional. Ranges only apply when both bounds are present
/// (and, for salary, both non-zero).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSearchFilter {
    /// Free text over title, description and requirement tags.
    pub q: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub expire_from: Option<DateTime<Utc>>,
    pub expire_to: Option<DateTime<Utc>>,
    pub salary_from: Option<u64>,
    pub salary_to: Option<u64>,
    /// All-of.
    pub categories: BTreeSet<String>,
    /// Any-of.
    pub locations: BTreeSet<String>,
    /// Any-of.
    pub requirements: BTreeSet<String>,
    pub level: Option<String>,
    pub is_hot: Option<bool>,
    /// Only postings whose expiry is still in the future.
    pub only_active: bool,
}

impl JobSearchFilter {
    /// Reject ranges that can never match.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some((from, to)) = both(self.created_from, self.created_to) {
            if from > to {
                return Err(DomainError::validation("created_from must not be after created_to"));
            }
        }
        if let Some((from, to)) = both(self.expire_from, self.expire_to) {
            if from > to {
                return Err(DomainError::validation("expire_from must not be after expire_to"));
            }
        }
        if let Some((from, to)) = self.salary_bounds() {
            if from > to {
                return Err(DomainError::validation("salary_from must not exceed salary_to"));
            }
        }
        Ok(())
    }

    /// Salary bounds, only when both are given and non-zero.
    pub fn salary_bounds(&self) -> Option<(u64, u64)> {
        match (self.salary_from, self.salary_to) {
            (Some(from), Some(to)) if from != 0 && to != 0 => Some((from, to)),
            _ => None,
        }
    }

    pub fn created_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        both(self.created_from, self.created_to)
    }

    pub fn expire_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        both(self.expire_from, self.expire_to)
    }
}

fn both<T>(a: Option<T>, b: Option<T>) -> Option<(T, T)> {
    a.zip(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn salary_needs_both_non_zero_bounds() {
        let only_from = JobSearchFilter {
            salary_from: Some(1000),
            ..Default::default()
        };
        assert_eq!(only_from.salary_bounds(), None);

        let zero_to = JobSearchFilter {
            salary_from: Some(1000),
            salary_to: Some(0),
            ..Default::default()
        };
        assert_eq!(zero_to.salary_bounds(), None);

        let both = JobSearchFilter {
            salary_from: Some(1000),
            salary_to: Some(5000),
            ..Default::default()
        };
        assert_eq!(both.salary_bounds(), Some((1000, 5000)));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let now = Utc::now();
        let dates = JobSearchFilter {
            created_from: Some(now),
            created_to: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert!(dates.validate().is_err());

        let salary = JobSearchFilter {
            salary_from: Some(5000),
            salary_to: Some(1000),
            ..Default::default()
        };
        assert!(salary.validate().is_err());
    }

    #[test]
    fn half_open_date_range_is_ignored() {
        let filter = JobSearchFilter {
            created_from: Some(Utc::now()),
            ..Default::default()
        };
        assert!(filter.validate().is_ok());
        assert!(filter.created_range().is_none());
    }
}
