//! Client roster records.
//!
//! A client owns at most one active slot assignment. Slot collisions across
//! different day-pairs are possible by construction (day-pairs overlap on
//! individual weekdays) and are repaired by the conflict resolver, not
//! prevented here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{generate_id, now_ms};
use crate::slots::{DayPair, Slot};

/// A client in the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    /// Record ID: "client-{timestamp}-{hex}"
    pub id: String,

    /// Display name (shop name)
    pub name: String,

    /// Account status
    pub status: ClientStatus,

    /// Billing state; only Trial and Active are auto-run eligible
    pub subscription_status: SubscriptionStatus,

    /// Whether the weekly auto-scheduler processes this client
    pub auto_schedule_enabled: bool,

    /// Assigned day-pair, None until a slot is assigned
    pub day_pair: Option<DayPair>,

    /// Assigned time-slot index, None until a slot is assigned
    pub time_slot: Option<usize>,

    /// Unix ms when the current slot was assigned
    pub slot_assigned_at: Option<i64>,

    /// Unix ms of the last successful weekly auto-schedule run
    pub last_auto_scheduled_at: Option<i64>,

    /// Unix ms when a bulk calendar was last generated
    pub calendar_generated_at: Option<i64>,

    /// Last date covered by the generated calendar
    pub last_scheduled_date: Option<NaiveDate>,

    /// Unix timestamp in milliseconds
    pub created_at: i64,

    /// Unix timestamp in milliseconds
    pub updated_at: i64,
}

impl Client {
    /// Create a new active client with no slot assignment.
    pub fn new(name: &str) -> Self {
        let now = now_ms();
        Self {
            id: generate_id("client"),
            name: name.to_string(),
            status: ClientStatus::Active,
            subscription_status: SubscriptionStatus::Trial,
            auto_schedule_enabled: true,
            day_pair: None,
            time_slot: None,
            slot_assigned_at: None,
            last_auto_scheduled_at: None,
            calendar_generated_at: None,
            last_scheduled_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The client's current slot, if both halves are assigned.
    pub fn slot(&self) -> Option<Slot> {
        match (self.day_pair, self.time_slot) {
            (Some(day_pair), Some(time_slot)) => Some(Slot { day_pair, time_slot }),
            _ => None,
        }
    }

    /// Whether the weekly auto-scheduler should process this client.
    pub fn is_auto_eligible(&self) -> bool {
        self.auto_schedule_enabled
            && self.status == ClientStatus::Active
            && matches!(
                self.subscription_status,
                SubscriptionStatus::Trial | SubscriptionStatus::Active
            )
    }

    /// Update the timestamp to now.
    pub fn touch(&mut self) {
        self.updated_at = now_ms();
    }
}

/// Client account status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Paused,
    Cancelled,
}

impl ClientStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Paused => "paused",
            ClientStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from the string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ClientStatus::Active),
            "paused" => Some(ClientStatus::Paused),
            "cancelled" => Some(ClientStatus::Cancelled),
            _ => None,
        }
    }
}

/// Billing/subscription state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    PastDue,
    Cancelled,
}

impl SubscriptionStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from the string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(SubscriptionStatus::Trial),
            "active" => Some(SubscriptionStatus::Active),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}
