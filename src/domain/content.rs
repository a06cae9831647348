//! Content item records.
//!
//! A content item is the schedulable unit: one planned/published piece of
//! content for one client, date, and (question, location) combination. The
//! combination key is the dedup identity the calendar generator enforces.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::id::{generate_id, now_ms};

/// One planned or published piece of content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    /// Record ID: "item-{timestamp}-{hex}"
    pub id: String,

    /// Owning client
    pub client_id: String,

    /// Source question, None for ad hoc items
    pub paa_id: Option<String>,

    /// Target location, None for ad hoc items
    pub location_id: Option<String>,

    /// Rendered question text (placeholders substituted)
    pub question: String,

    pub scheduled_date: NaiveDate,

    pub scheduled_time: NaiveTime,

    pub status: ContentStatus,

    /// Optional call-to-action text attached by the weekly run
    pub cta: Option<String>,

    /// Unix timestamp in milliseconds
    pub created_at: i64,

    /// Unix timestamp in milliseconds
    pub updated_at: i64,
}

impl ContentItem {
    /// Create a new item in `Scheduled` status.
    pub fn new_scheduled(
        client_id: &str,
        paa_id: Option<&str>,
        location_id: Option<&str>,
        question: &str,
        scheduled_date: NaiveDate,
        scheduled_time: NaiveTime,
    ) -> Self {
        let now = now_ms();
        Self {
            id: generate_id("item"),
            client_id: client_id.to_string(),
            paa_id: paa_id.map(str::to_string),
            location_id: location_id.map(str::to_string),
            question: question.to_string(),
            scheduled_date,
            scheduled_time,
            status: ContentStatus::Scheduled,
            cta: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The dedup identity of this item's (question, location) pair.
    pub fn combination_key(&self) -> String {
        combination_key(self.paa_id.as_deref(), self.location_id.as_deref())
    }
}

/// Canonical combination key: `"{paa_id}-{location_id}"` with empty-string
/// fallback for missing references.
pub fn combination_key(paa_id: Option<&str>, location_id: Option<&str>) -> String {
    format!("{}-{}", paa_id.unwrap_or(""), location_id.unwrap_or(""))
}

/// Content item lifecycle. Transitions past `Scheduled` are driven by the
/// external generation pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Scheduled,
    Generating,
    Review,
    Approved,
    Published,
    Failed,
}

impl ContentStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Scheduled => "scheduled",
            ContentStatus::Generating => "generating",
            ContentStatus::Review => "review",
            ContentStatus::Approved => "approved",
            ContentStatus::Published => "published",
            ContentStatus::Failed => "failed",
        }
    }

    /// Parse from the string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ContentStatus::Draft),
            "scheduled" => Some(ContentStatus::Scheduled),
            "generating" => Some(ContentStatus::Generating),
            "review" => Some(ContentStatus::Review),
            "approved" => Some(ContentStatus::Approved),
            "published" => Some(ContentStatus::Published),
            "failed" => Some(ContentStatus::Failed),
            _ => None,
        }
    }

    /// Whether this status is an endpoint of the pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContentStatus::Published | ContentStatus::Failed)
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
