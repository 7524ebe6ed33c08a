use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{CompanyId, DomainError, DomainResult};

/// Contact block shown next to a company's postings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
}

/// Company profile. Read-only from the search engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: CompanyId,
    pub name: String,
    pub contact: ContactInfo,
    pub images: Vec<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl CompanyProfile {
    pub fn create(id: CompanyId, input: NewCompany, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("company name must not be empty"));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            contact: input.contact,
            images: input.images,
            is_deleted: false,
            created_at: now,
        })
    }

    /// Image used when a posting is rendered in a list.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub images: Vec<String>,
}
