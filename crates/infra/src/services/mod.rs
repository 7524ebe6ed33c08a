//! Application services: one per write use case.

pub mod accounts;
pub mod engagement;
pub mod postings;

pub use accounts::AccountService;
pub use engagement::EngagementService;
pub use postings::{CompanyService, JobPostingService};
