//! Query builder: turns a [`JobSearchFilter`] into predicates a store can run.
//!
//! The in-memory store evaluates predicates directly via [`JobQuery::matches`];
//! a document-database adapter translates the same list into its own filter
//! language. Either way the predicate list is the single definition of what a
//! filter means.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::company::CompanyProfile;
use crate::filter::JobSearchFilter;
use crate::posting::JobPosting;
use crate::tags;

/// Condition on the posting document itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPredicate {
    /// `!is_deleted && !is_closed`.
    Searchable,
    /// Free text over title, description and requirement tags.
    Text(String),
    TitleContains(String),
    CreatedBetween(DateTime<Utc>, DateTime<Utc>),
    ExpiresBetween(DateTime<Utc>, DateTime<Utc>),
    /// `salary.min >= from && salary.max <= to`.
    SalaryWithin { from: u64, to: u64 },
    CategoriesAll(BTreeSet<String>),
    LocationsAny(BTreeSet<String>),
    RequirementsAny(BTreeSet<String>),
    Level(String),
    Hot(bool),
    /// `expire_date > at`.
    ActiveAt(DateTime<Utc>),
}

impl JobPredicate {
    pub fn matches(&self, job: &JobPosting) -> bool {
        match self {
            JobPredicate::Searchable => job.is_searchable(),
            JobPredicate::Text(text) => {
                tags::contains_ci(&job.title, text)
                    || tags::contains_ci(&job.description, text)
                    || job.requirements.iter().any(|r| tags::contains_ci(r, text))
            }
            JobPredicate::TitleContains(title) => tags::contains_ci(&job.title, title),
            JobPredicate::CreatedBetween(from, to) => job.created_at >= *from && job.created_at <= *to,
            JobPredicate::ExpiresBetween(from, to) => {
                job.expire_date >= *from && job.expire_date <= *to
            }
            JobPredicate::SalaryWithin { from, to } => job.salary.min >= *from && job.salary.max <= *to,
            JobPredicate::CategoriesAll(wanted) => tags::contains_all(&job.categories, wanted),
            JobPredicate::LocationsAny(wanted) => tags::intersects(&job.locations, wanted),
            JobPredicate::RequirementsAny(wanted) => tags::intersects(&job.requirements, wanted),
            JobPredicate::Level(level) => job.level.eq_ignore_ascii_case(level),
            JobPredicate::Hot(hot) => job.is_hot == *hot,
            JobPredicate::ActiveAt(at) => job.is_active_at(*at),
        }
    }
}

/// Condition on the joined company document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyPredicate {
    NameContains(String),
}

impl CompanyPredicate {
    pub fn matches(&self, company: &CompanyProfile) -> bool {
        match self {
            CompanyPredicate::NameContains(name) => tags::contains_ci(&company.name, name),
        }
    }
}

/// Compiled search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub job: Vec<JobPredicate>,
    pub company: Vec<CompanyPredicate>,
}

impl JobQuery {
    /// Query matching every searchable posting.
    pub fn searchable() -> Self {
        Self {
            job: vec![JobPredicate::Searchable],
            company: Vec::new(),
        }
    }

    /// Compile a filter. `now` anchors the `only_active` check.
    pub fn from_filter(filter: &JobSearchFilter, now: DateTime<Utc>) -> Self {
        let mut query = Self::searchable();

        if let Some(q) = non_blank(&filter.q) {
            query.job.push(JobPredicate::Text(q));
        }
        if let Some(title) = non_blank(&filter.title) {
            query.job.push(JobPredicate::TitleContains(title));
        }
        if let Some((from, to)) = filter.created_range() {
            query.job.push(JobPredicate::CreatedBetween(from, to));
        }
        if let Some((from, to)) = filter.expire_range() {
            query.job.push(JobPredicate::ExpiresBetween(from, to));
        }
        if let Some((from, to)) = filter.salary_bounds() {
            query.job.push(JobPredicate::SalaryWithin { from, to });
        }
        if !filter.categories.is_empty() {
            query.job.push(JobPredicate::CategoriesAll(filter.categories.clone()));
        }
        if !filter.locations.is_empty() {
            query.job.push(JobPredicate::LocationsAny(filter.locations.clone()));
        }
        if !filter.requirements.is_empty() {
            query.job.push(JobPredicate::RequirementsAny(filter.requirements.clone()));
        }
        if let Some(level) = non_blank(&filter.level) {
            query.job.push(JobPredicate::Level(level));
        }
        if let Some(hot) = filter.is_hot {
            query.job.push(JobPredicate::Hot(hot));
        }
        if filter.only_active {
            query.job.push(JobPredicate::ActiveAt(now));
        }
        if let Some(name) = non_blank(&filter.company_name) {
            query.company.push(CompanyPredicate::NameContains(name));
        }

        query
    }

    /// Whether the company join takes part in filtering.
    pub fn filters_on_company(&self) -> bool {
        !self.company.is_empty()
    }

    /// Evaluate against a posting and its (possibly missing) company.
    ///
    /// With company predicates, a soft-deleted or non-matching company
    /// excludes the posting; a missing company does not.
    pub fn matches(&self, job: &JobPosting, company: Option<&CompanyProfile>) -> bool {
        if !self.job.iter().all(|p| p.matches(job)) {
            return false;
        }
        if !self.filters_on_company() {
            return true;
        }
        // A posting whose company document is missing stays eligible.
        match company {
            None => true,
            Some(company) if company.is_deleted => false,
            Some(company) => self.company.iter().all(|p| p.matches(company)),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::ContactInfo;
    use crate::posting::SalaryRange;
    use chrono::Duration;
    use jobboard_core::{CompanyId, JobId};

    fn job() -> JobPosting {
        let now = Utc::now();
        JobPosting {
            id: JobId::new(),
            company_id: CompanyId::new(),
            title: "Rust Engineer".to_string(),
            description: "Work on storage engines".to_string(),
            salary: SalaryRange { min: 2000, max: 4000 },
            requirements: tags::normalize(["Rust", "Linux"]),
            locations: tags::normalize(["X", "Y"]),
            categories: tags::normalize(["A", "B"]),
            level: "Senior".to_string(),
            quantity: 1,
            is_hot: true,
            is_closed: false,
            is_deleted: false,
            created_at: now,
            expire_date: now + Duration::days(10),
        }
    }

    fn company(name: &str, deleted: bool) -> CompanyProfile {
        CompanyProfile {
            id: CompanyId::new(),
            name: name.to_string(),
            contact: ContactInfo::default(),
            images: vec![],
            is_deleted: deleted,
            created_at: Utc::now(),
        }
    }

    fn run(filter: JobSearchFilter, job: &JobPosting) -> bool {
        JobQuery::from_filter(&filter, Utc::now()).matches(job, None)
    }

    #[test]
    fn categories_are_all_of_locations_are_any_of() {
        let job = job();
        let categories = JobSearchFilter {
            categories: tags::normalize(["A", "C"]),
            ..Default::default()
        };
        assert!(!run(categories, &job));

        let locations = JobSearchFilter {
            locations: tags::normalize(["X", "Z"]),
            ..Default::default()
        };
        assert!(run(locations, &job));
    }

    #[test]
    fn salary_from_alone_does_not_filter() {
        let job = job();
        let filter = JobSearchFilter {
            salary_from: Some(100_000),
            ..Default::default()
        };
        let query = JobQuery::from_filter(&filter, Utc::now());
        assert_eq!(query, JobQuery::searchable());
        assert!(query.matches(&job, None));
    }

    #[test]
    fn salary_range_requires_posting_band_inside_bounds() {
        let job = job();
        let inside = JobSearchFilter {
            salary_from: Some(1000),
            salary_to: Some(5000),
            ..Default::default()
        };
        assert!(run(inside, &job));

        let too_narrow = JobSearchFilter {
            salary_from: Some(3000),
            salary_to: Some(5000),
            ..Default::default()
        };
        assert!(!run(too_narrow, &job));
    }

    #[test]
    fn closed_and_deleted_postings_never_match() {
        let mut closed = job();
        closed.is_closed = true;
        assert!(!run(JobSearchFilter::default(), &closed));

        let mut deleted = job();
        deleted.is_deleted = true;
        assert!(!run(JobSearchFilter::default(), &deleted));
    }

    #[test]
    fn text_and_title_are_case_insensitive() {
        let job = job();
        let text = JobSearchFilter {
            q: Some("STORAGE".to_string()),
            ..Default::default()
        };
        assert!(run(text, &job));

        let title = JobSearchFilter {
            title: Some("rust eng".to_string()),
            ..Default::default()
        };
        assert!(run(title, &job));

        let blank = JobSearchFilter {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(JobQuery::from_filter(&blank, Utc::now()), JobQuery::searchable());
    }

    #[test]
    fn only_active_excludes_expired() {
        let mut expired = job();
        expired.expire_date = Utc::now() - Duration::hours(1);
        let filter = JobSearchFilter {
            only_active: true,
            ..Default::default()
        };
        assert!(!run(filter.clone(), &expired));
        assert!(run(JobSearchFilter::default(), &expired));
    }

    #[test]
    fn company_name_filter_excludes_deleted_and_mismatched_but_not_missing() {
        let job = job();
        let query = JobQuery::from_filter(
            &JobSearchFilter {
                company_name: Some("acme".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );

        assert!(query.matches(&job, Some(&company("ACME Corp", false))));
        assert!(!query.matches(&job, Some(&company("ACME Corp", true))));
        assert!(!query.matches(&job, Some(&company("Globex", false))));
        assert!(query.matches(&job, None));
    }

    #[test]
    fn without_company_filter_missing_company_is_fine() {
        let job = job();
        assert!(JobQuery::searchable().matches(&job, None));
        assert!(JobQuery::searchable().matches(&job, Some(&company("Gone", true))));
    }
}
