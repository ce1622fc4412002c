//! Entity types held by the record store.
//!
//! Field names follow the portal's relational schema one-to-one so that the
//! JSON the API emits matches what the frontend already binds against.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// A portal account. Created at signup, mutated by profile updates, never
/// deleted by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub scholar_id: Option<String>,
    pub h_index: Option<i64>,
    pub i10_index: Option<i64>,
    pub total_citations: Option<i64>,
    pub id_card_url: Option<String>,
    pub is_verified: bool,
}

/// Intellectual property filing (patent, trademark, copyright, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ipr {
    pub ipr_id: i64,
    pub ipr_type: String,
    pub title: String,
    pub ipr_number: Option<String>,
    pub filing_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub related_startup_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPaper {
    pub paper_id: i64,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub authors: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub doi: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: i64,
}

/// Innovation entries may be department-owned, hence the nullable owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Innovation {
    pub innovation_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
    pub submitted_on: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Startup {
    pub startup_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub founder: Option<String>,
    pub industry: Option<String>,
    pub founded_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: Option<i64>,
}
