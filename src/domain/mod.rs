//! Domain types for the scheduling core.
//!
//! This module defines the records the engine reads and writes:
//! - [`Client`]: roster entry owning a slot assignment and eligibility flags
//! - [`ServiceLocation`]: a city/state the client serves
//! - [`PaaQuestion`]: a templated question in the client's bank
//! - [`ContentItem`]: one planned/published piece of content

mod client;
mod content;
mod location;
mod question;

pub use client::{Client, ClientStatus, SubscriptionStatus};
pub use content::{ContentItem, ContentStatus, combination_key};
pub use location::ServiceLocation;
pub use question::{PaaQuestion, parse_question_block, render_template};
