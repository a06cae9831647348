//! Bulk content-calendar generator.
//!
//! Cross-products the client's active question bank (priority ascending)
//! with its active locations (headquarters first, then alphabetical),
//! skips combinations already on file, and assigns each new combination
//! the next date from the Tue/Thu sequencer. Questions iterate outer,
//! locations inner: each question floods every location before the next
//! question starts.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::calendar::dates::{available_dates, default_publish_time, next_publish_day_on_or_after};
use crate::domain::{ContentItem, combination_key, render_template};
use crate::error::{CadencerError, Result};
use crate::store::RosterStore;

/// Size of the rendered-question sample included in a plan summary.
const SAMPLE_SIZE: usize = 10;

/// Options for a calendar generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// First candidate date; defaults to the next Tuesday from today
    pub start_date: Option<NaiveDate>,
    /// Horizon of the date sequence in years
    pub years_ahead: u32,
    /// Per-run cap on items per location
    pub max_per_location: Option<usize>,
    /// Plan without persisting
    pub preview: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            start_date: None,
            years_ahead: 2,
            max_per_location: None,
            preview: false,
        }
    }
}

/// Planned items for one location.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationPlan {
    pub location_id: String,
    pub location_name: String,
    pub planned: usize,
}

/// What a generation run would (or did) schedule.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanSummary {
    pub client_id: String,
    /// Combinations given a date this run
    pub planned: usize,
    /// Combinations skipped because they were already on file
    pub skipped_existing: usize,
    /// Eligible combinations left without a date (sequence exhausted or
    /// per-location cap hit); a capacity limit, not an error
    pub remaining: usize,
    pub per_location: Vec<LocationPlan>,
    /// First rendered questions, up to ten
    pub sample: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Result of [`generate_calendar`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum CalendarOutcome {
    /// Preview mode: nothing was written
    Preview(PlanSummary),
    /// Items were persisted; `inserted` may be below `summary.planned`
    /// when the storage layer skipped duplicates
    Persisted { summary: PlanSummary, inserted: usize },
}

/// Generate (or preview) a client's bulk content calendar.
///
/// Fails with a configuration error when the client has no active
/// locations or no active questions, without touching storage. Running
/// twice with the same inputs plans zero new items the second time.
pub fn generate_calendar(
    store: &mut RosterStore,
    client_id: &str,
    options: &GenerateOptions,
) -> Result<CalendarOutcome> {
    let client = store.require_client(client_id)?;

    let locations = store.list_active_locations(client_id)?;
    if locations.is_empty() {
        return Err(CadencerError::Configuration(format!(
            "client {} has no active service locations",
            client.id
        )));
    }
    let questions = store.list_active_questions(client_id)?;
    if questions.is_empty() {
        return Err(CadencerError::Configuration(format!(
            "client {} has no active PAA questions",
            client.id
        )));
    }

    let used = store.existing_combination_keys(client_id)?;

    let start = match options.start_date {
        Some(date) => date,
        None => next_publish_day_on_or_after(Local::now().date_naive())
            .ok_or_else(|| CadencerError::Configuration("no upcoming publish day".to_string()))?,
    };
    let mut dates = available_dates(start, options.years_ahead);

    let mut items: Vec<ContentItem> = Vec::new();
    let mut per_location: HashMap<String, usize> = HashMap::new();
    let mut skipped_existing = 0usize;
    let mut remaining = 0usize;
    let publish_time = default_publish_time();

    for question in &questions {
        for location in &locations {
            let key = combination_key(Some(&question.id), Some(&location.id));
            if used.contains(&key) {
                skipped_existing += 1;
                continue;
            }
            let count = per_location.entry(location.id.clone()).or_insert(0);
            if let Some(cap) = options.max_per_location
                && *count >= cap
            {
                remaining += 1;
                continue;
            }
            let Some(date) = dates.next() else {
                // Sequence exhausted: a capacity limit, not an error
                remaining += 1;
                continue;
            };
            *count += 1;
            items.push(ContentItem::new_scheduled(
                client_id,
                Some(&question.id),
                Some(&location.id),
                &render_template(&question.template, location),
                date,
                publish_time,
            ));
        }
    }

    let summary = PlanSummary {
        client_id: client_id.to_string(),
        planned: items.len(),
        skipped_existing,
        remaining,
        per_location: locations
            .iter()
            .map(|location| LocationPlan {
                location_id: location.id.clone(),
                location_name: location.display_name(),
                planned: per_location.get(&location.id).copied().unwrap_or(0),
            })
            .collect(),
        sample: items.iter().take(SAMPLE_SIZE).map(|i| i.question.clone()).collect(),
        first_date: items.first().map(|i| i.scheduled_date),
        last_date: items.last().map(|i| i.scheduled_date),
    };

    if options.preview {
        return Ok(CalendarOutcome::Preview(summary));
    }

    let inserted = store.insert_calendar_items(&items)?;
    if let Some(last) = summary.last_date {
        store.mark_calendar_generated(client_id, last)?;
    }
    tracing::info!(
        client = %client_id,
        planned = summary.planned,
        inserted,
        skipped = summary.skipped_existing,
        "Generated content calendar"
    );

    Ok(CalendarOutcome::Persisted { summary, inserted })
}
