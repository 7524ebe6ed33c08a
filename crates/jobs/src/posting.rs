use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{CompanyId, DomainError, DomainResult, JobId};
use jobboard_events::Event;

use crate::tags;

/// Offered salary band. Invariant: `min <= max`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

impl SalaryRange {
    pub fn new(min: u64, max: u64) -> DomainResult<Self> {
        if min > max {
            return Err(DomainError::validation(format!(
                "salary min ({min}) must not exceed salary max ({max})"
            )));
        }
        Ok(Self { min, max })
    }
}

/// A job posting owned by a company.
///
/// Postings are never physically removed: deletion flips `is_deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: String,
    pub salary: SalaryRange,
    pub requirements: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub level: String,
    pub quantity: u32,
    pub is_hot: bool,
    pub is_closed: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub expire_date: DateTime<Utc>,
}

impl JobPosting {
    /// Build a posting from validated creation input.
    pub fn create(id: JobId, input: NewJobPosting, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate(now)?;
        Ok(Self {
            id,
            company_id: input.company_id,
            title: input.title.trim().to_string(),
            description: input.description,
            salary: SalaryRange::new(input.salary_min, input.salary_max)?,
            requirements: tags::normalize(input.requirements),
            locations: tags::normalize(input.locations),
            categories: tags::normalize(input.categories),
            level: input.level.trim().to_string(),
            quantity: input.quantity,
            is_hot: input.is_hot,
            is_closed: false,
            is_deleted: false,
            created_at: now,
            expire_date: input.expire_date,
        })
    }

    /// Eligible for search results at all.
    pub fn is_searchable(&self) -> bool {
        !self.is_deleted && !self.is_closed
    }

    /// Not yet expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_date > now
    }

    /// Replace every field the patch provides.
    ///
    /// The posting is left untouched when the result would break the salary
    /// invariant.
    pub fn apply_patch(&mut self, patch: &JobPatch) -> DomainResult<()> {
        let salary = SalaryRange::new(
            patch.salary_min.unwrap_or(self.salary.min),
            patch.salary_max.unwrap_or(self.salary.max),
        )?;
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("title must not be empty"));
            }
        }
        if patch.quantity == Some(0) {
            return Err(DomainError::validation("quantity must be at least 1"));
        }

        self.salary = salary;
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(requirements) = &patch.requirements {
            self.requirements = tags::normalize(requirements);
        }
        if let Some(locations) = &patch.locations {
            self.locations = tags::normalize(locations);
        }
        if let Some(categories) = &patch.categories {
            self.categories = tags::normalize(categories);
        }
        if let Some(level) = &patch.level {
            self.level = level.trim().to_string();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(is_hot) = patch.is_hot {
            self.is_hot = is_hot;
        }
        if let Some(is_closed) = patch.is_closed {
            self.is_closed = is_closed;
        }
        if let Some(expire_date) = patch.expire_date {
            self.expire_date = expire_date;
        }
        Ok(())
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }
}

/// Input for creating a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJobPosting {
    pub company_id: CompanyId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub salary_min: u64,
    #[serde(default)]
    pub salary_max: u64,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub level: String,
    pub quantity: u32,
    #[serde(default)]
    pub is_hot: bool,
    pub expire_date: DateTime<Utc>,
}

impl NewJobPosting {
    pub fn validate(&self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        SalaryRange::new(self.salary_min, self.salary_max)?;
        if self.expire_date <= now {
            return Err(DomainError::validation("expire_date must be in the future"));
        }
        Ok(())
    }
}

/// Partial update: `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub salary_min: Option<u64>,
    pub salary_max: Option<u64>,
    pub requirements: Option<Vec<String>>,
    pub locations: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub level: Option<String>,
    pub quantity: Option<u32>,
    pub is_hot: Option<bool>,
    pub is_closed: Option<bool>,
    pub expire_date: Option<DateTime<Utc>>,
}

/// Raised once per successfully created posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosted {
    pub job: JobPosting,
    pub occurred_at: DateTime<Utc>,
}

impl Event for JobPosted {
    fn event_type(&self) -> &'static str {
        "jobs.posting.created"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
