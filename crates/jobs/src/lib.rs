//! Job board domain module.
//!
//! Postings, companies, candidates, accounts and the engagement records that
//! link candidates to postings, plus the pure query/pagination logic used by
//! the search engine. No IO, no HTTP, no storage.

pub mod account;
pub mod candidate;
pub mod company;
pub mod engagement;
pub mod filter;
pub mod page;
pub mod posting;
pub mod query;
pub mod tags;
pub mod view;

pub use account::{Account, AccountRole, NewAccount};
pub use candidate::CandidateProfile;
pub use company::{CompanyProfile, ContactInfo, NewCompany};
pub use engagement::{ApplicationRecord, SavedJobRecord};
pub use filter::JobSearchFilter;
pub use page::{Page, PageRequest, Paginated};
pub use posting::{JobPatch, JobPosted, JobPosting, NewJobPosting, SalaryRange};
pub use query::{CompanyPredicate, JobPredicate, JobQuery};
pub use view::{JobDetailView, JobSummary};
