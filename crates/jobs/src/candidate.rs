use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use jobboard_core::CandidateId;

use crate::tags;

/// Job-seeker profile. Read-only from the matcher's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: CandidateId,
    pub email: String,
    pub name: String,
    pub skills: BTreeSet<String>,
    pub is_deleted: bool,
}

impl CandidateProfile {
    /// Any-of match against a posting's requirement tags.
    pub fn matches_any(&self, requirements: &BTreeSet<String>) -> bool {
        tags::intersects(&self.skills, requirements)
    }
}
