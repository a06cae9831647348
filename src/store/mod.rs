//! Persistence for the client roster and content calendar.
//!
//! The roster is the single source of truth for slot occupancy: the
//! assignment engine recomputes occupancy by scanning persisted clients on
//! every call instead of keeping in-memory counters, so the engine stays
//! correct across process restarts.

mod roster;

pub use roster::RosterStore;
