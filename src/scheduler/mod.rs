//! Weekly auto-scheduling.
//!
//! This module provides:
//! - **Rotation**: round-robin/least-recently-used selection of the next
//!   question and location for a client, plus cursor-based CTA pools.
//! - **WeeklyScheduler**: the periodic production entry point that creates
//!   one scheduled content item per eligible client and hands it to the
//!   generation pipeline.
//!
//! # Architecture
//!
//! The run is a single sequential pass: clients are processed one at a
//! time with a throttle delay between them (a rate-limit courtesy for
//! downstream vendors, not a correctness requirement). Per-client failures
//! are downgraded into result entries so one bad client never aborts the
//! batch; only a slot-space exhaustion, which indicates a configuration
//! bug, is fatal.

mod rotation;
mod weekly;

pub use rotation::{
    CtaEntry, CtaKind, KIND_LOCATION, KIND_QUESTION, RotationPool, next_location, next_question,
};
pub use weekly::{
    ClientRunResult, RunStatus, WeeklyOptions, WeeklyRunReport, WeeklyScheduler,
    run_weekly_auto_schedule,
};
