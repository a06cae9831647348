//! Cadencer - a publishing-slot and content-calendar engine
//!
//! Cadencer assigns each client a recurring publishing slot (day-pair ×
//! time-slot), detects and repairs cross-client schedule collisions, and
//! generates long-range content calendars from a client's question bank
//! and service locations.

pub mod calendar;
pub mod domain;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod scheduler;
pub mod slots;
pub mod store;

pub use error::{CadencerError, Result};
