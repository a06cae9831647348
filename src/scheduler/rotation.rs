//! Round-robin selection for questions, locations, and CTA text.
//!
//! Selection runs against plain usage maps (ref id -> last-used unix ms)
//! loaded from the rotation index, so the policy is testable in isolation
//! from storage. Absence from the map means never used, which always sorts
//! first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{PaaQuestion, ServiceLocation};

/// Rotation-index kind for question usage.
pub const KIND_QUESTION: &str = "question";

/// Rotation-index kind for location usage.
pub const KIND_LOCATION: &str = "location";

/// Pick the next question: never-used first (priority ascending), then the
/// least-recently-used, ties broken by priority ascending.
///
/// `questions` must be priority-sorted, which makes the first minimal
/// element the correct tie-break winner.
pub fn next_question<'a>(
    questions: &'a [PaaQuestion],
    usage: &HashMap<String, i64>,
) -> Option<&'a PaaQuestion> {
    questions
        .iter()
        .min_by_key(|q| (usage.get(&q.id).copied().unwrap_or(i64::MIN), q.priority))
}

/// Pick the next location: never-used first, then least-recently-used.
/// Rotation is even across active locations, not priority-weighted;
/// `locations` must be in roster order (headquarters first) so first use
/// starts at the headquarters.
pub fn next_location<'a>(
    locations: &'a [ServiceLocation],
    usage: &HashMap<String, i64>,
) -> Option<&'a ServiceLocation> {
    locations
        .iter()
        .min_by_key(|l| usage.get(&l.id).copied().unwrap_or(i64::MIN))
}

/// Closed set of call-to-action kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CtaKind {
    Call,
    Quote,
    Book,
    Website,
}

/// One call-to-action option in a rotation pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CtaEntry {
    pub kind: CtaKind,
    pub text: String,
}

/// A rotation pool with an explicit cursor, advanced with wraparound.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RotationPool {
    entries: Vec<CtaEntry>,
    cursor: usize,
}

impl RotationPool {
    /// Create a pool starting at the first entry.
    pub fn new(entries: Vec<CtaEntry>) -> Self {
        Self { entries, cursor: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Return the entry at the cursor and advance, wrapping around.
    pub fn advance(&mut self) -> Option<CtaEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let entry = self.entries[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.entries.len();
        Some(entry)
    }
}
