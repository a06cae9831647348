//! Slot space, assignment engine, and conflict resolution.
//!
//! This module provides:
//! - **Slot space**: the closed enumeration of (day-pair, time-slot)
//!   combinations and their weekday geometry.
//! - **Assignment engine**: picks the least-loaded slot for a client from
//!   live roster occupancy.
//! - **Conflict detection/resolution**: finds clients colliding on a
//!   concrete (weekday, time-slot) pair and reassigns the losers.
//!
//! # Architecture
//!
//! Occupancy is never cached: every `find_best_slot` call rescans the
//! persisted roster, so the engine is stateless across process restarts
//! and each reassignment inside a resolution pass observes the previous
//! ones.

mod assign;
mod conflict;
mod space;

pub use assign::{assign_slot, find_best_slot};
pub use conflict::{
    ConflictFixReport, ConflictRecord, ConflictingClient, detect_schedule_conflicts, fix_all_conflicts,
};
pub use space::{
    DayPair, Slot, TIME_SLOT_COUNT, all_day_pairs, all_time_slots, next_publish_datetime, slot_space,
    time_slot_label, time_slot_time, weekday_name, weekday_ordinal,
};
