//! Bulk content-calendar generation.
//!
//! This module provides:
//! - **Date sequencer**: the canonical Tuesday/Thursday publish-date
//!   sequence used for long-range calendar pre-population.
//! - **Generator**: cross-products a client's question bank with its
//!   service locations, skips combinations already on file, and assigns
//!   each new combination the next available date.
//!
//! The generator is the bulk/preview path; the weekly orchestrator in
//! [`crate::scheduler`] is the live path. Both share the domain records
//! but not dates: bulk dates come from the sequencer, weekly dates from
//! the client's assigned slot.

mod dates;
mod generator;

pub use dates::{PublishDates, available_dates, default_publish_time, next_publish_day_on_or_after};
pub use generator::{CalendarOutcome, GenerateOptions, LocationPlan, PlanSummary, generate_calendar};
