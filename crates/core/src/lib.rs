//! `jobboard-core`: shared building blocks for the job board crates.
//!
//! This crate holds only identifiers and the domain error model; it knows
//! nothing about storage, HTTP or notifications.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AccountId, CandidateId, CompanyId, JobId};
