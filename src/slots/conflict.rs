//! Schedule conflict detection and resolution.
//!
//! Clients collide when their slots occupy the same concrete
//! (weekday, time-slot) pair. Day-pairs overlap on individual weekdays, so
//! clients on *different* day-pair keys can still collide (a MON_WED client
//! and a WED_FRI client both publish on Wednesday).

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::error::Result;
use crate::slots::assign::find_best_slot;
use crate::slots::space::{time_slot_label, weekday_name};
use crate::store::RosterStore;

/// One client inside a conflict group.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConflictingClient {
    pub client_id: String,
    pub client_name: String,
    /// The client's day-pair key, e.g. "WED_FRI"
    pub day_pair: String,
    /// Human label, e.g. "Wednesday & Friday"
    pub day_pair_label: String,
}

/// A (weekday, time-slot) pair occupied by more than one client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConflictRecord {
    /// Weekday ordinal (0 = Sunday .. 6 = Saturday)
    pub weekday: u8,
    /// Day name, e.g. "Wednesday"
    pub day_name: String,
    pub time_slot: usize,
    /// Time label, e.g. "10:00 AM"
    pub time_label: String,
    /// Colliding clients in slot-assignment order; the first is kept on
    /// resolution
    pub clients: Vec<ConflictingClient>,
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ConflictFixReport {
    pub conflicts_found: usize,
    pub clients_reassigned: usize,
}

/// Scan all eligible, slotted clients and report every
/// (weekday, time-slot) pair with more than one occupant.
///
/// Output is deterministic: groups ordered by weekday then time-slot,
/// clients within a group by slot-assignment time then id.
pub fn detect_schedule_conflicts(store: &RosterStore) -> Result<Vec<ConflictRecord>> {
    let clients = store.list_slotted_clients()?;

    let mut groups: BTreeMap<(u8, usize), Vec<ConflictingClient>> = BTreeMap::new();
    for client in &clients {
        let Some(slot) = client.slot() else { continue };
        let (day1, day2) = slot.day_pair.day_ordinals();
        for day in [day1, day2] {
            groups.entry((day, slot.time_slot)).or_default().push(ConflictingClient {
                client_id: client.id.clone(),
                client_name: client.name.clone(),
                day_pair: slot.day_pair.key().to_string(),
                day_pair_label: slot.day_pair.label().to_string(),
            });
        }
    }

    let conflicts = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|((weekday, time_slot), clients)| ConflictRecord {
            weekday,
            day_name: weekday_name(weekday).to_string(),
            time_slot,
            time_label: time_slot_label(time_slot).unwrap_or_else(|| "?".to_string()),
            clients,
        })
        .collect();

    Ok(conflicts)
}

/// Repair every detected conflict: the first client of each group keeps its
/// slot, every other member is cleared and reassigned via the engine.
///
/// Reassignments run strictly one at a time so each `find_best_slot` call
/// observes the occupancy left by the previous one. A client colliding in
/// multiple groups is reassigned at most once per run. Idempotent: a second
/// run with no intervening changes reports zero conflicts.
pub fn fix_all_conflicts(store: &mut RosterStore) -> Result<ConflictFixReport> {
    let conflicts = detect_schedule_conflicts(store)?;
    let conflicts_found = conflicts.len();
    let mut reassigned: HashSet<String> = HashSet::new();

    for conflict in &conflicts {
        tracing::info!(
            day = %conflict.day_name,
            time = %conflict.time_label,
            clients = conflict.clients.len(),
            "Resolving schedule conflict"
        );
        for loser in conflict.clients.iter().skip(1) {
            if !reassigned.insert(loser.client_id.clone()) {
                continue;
            }
            store.clear_client_slot(&loser.client_id)?;
            let slot = find_best_slot(store, Some(&loser.client_id))?;
            // Expected slot is None: we just cleared it
            store.set_client_slot(&loser.client_id, slot, None)?;
            tracing::info!(client = %loser.client_id, slot = %slot, "Reassigned conflicting client");
        }
    }

    Ok(ConflictFixReport {
        conflicts_found,
        clients_reassigned: reassigned.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Client;
    use crate::slots::space::{DayPair, Slot};

    fn client_with_slot(store: &mut RosterStore, name: &str, day_pair: DayPair, time_slot: usize) -> String {
        let client = Client::new(name);
        store.save_client(&client).unwrap();
        store
            .set_client_slot(&client.id, Slot { day_pair, time_slot }, None)
            .unwrap();
        client.id
    }

    #[test]
    fn test_no_conflicts_on_empty_roster() {
        let store = RosterStore::open_in_memory().unwrap();
        assert!(detect_schedule_conflicts(&store).unwrap().is_empty());
    }

    #[test]
    fn test_distinct_slots_do_not_conflict() {
        let mut store = RosterStore::open_in_memory().unwrap();
        client_with_slot(&mut store, "A", DayPair::MonWed, 0);
        client_with_slot(&mut store, "B", DayPair::TueThu, 0);
        assert!(detect_schedule_conflicts(&store).unwrap().is_empty());
    }

    #[test]
    fn test_same_slot_conflicts_on_both_days() {
        let mut store = RosterStore::open_in_memory().unwrap();
        client_with_slot(&mut store, "A", DayPair::TueThu, 3);
        client_with_slot(&mut store, "B", DayPair::TueThu, 3);

        let conflicts = detect_schedule_conflicts(&store).unwrap();
        // Tuesday and Thursday groups
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].day_name, "Tuesday");
        assert_eq!(conflicts[1].day_name, "Thursday");
        assert!(conflicts.iter().all(|c| c.clients.len() == 2));
    }

    #[test]
    fn test_cross_day_pair_overlap_detected() {
        let mut store = RosterStore::open_in_memory().unwrap();
        // MON_WED and WED_FRI share Wednesday at the same time slot
        let a = client_with_slot(&mut store, "A", DayPair::MonWed, 2);
        let b = client_with_slot(&mut store, "B", DayPair::WedFri, 2);

        let conflicts = detect_schedule_conflicts(&store).unwrap();
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.day_name, "Wednesday");
        assert_eq!(conflict.time_slot, 2);
        let ids: Vec<&str> = conflict.clients.iter().map(|c| c.client_id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), b.as_str()]);
        assert_eq!(conflict.clients[0].day_pair, "MON_WED");
        assert_eq!(conflict.clients[1].day_pair, "WED_FRI");
    }

    #[test]
    fn test_first_assigned_client_is_kept() {
        let mut store = RosterStore::open_in_memory().unwrap();
        let keeper = client_with_slot(&mut store, "Keeper", DayPair::MonWed, 2);
        let loser = client_with_slot(&mut store, "Loser", DayPair::WedFri, 2);

        let report = fix_all_conflicts(&mut store).unwrap();
        assert_eq!(report.conflicts_found, 1);
        assert_eq!(report.clients_reassigned, 1);

        let kept = store.get_client(&keeper).unwrap().unwrap();
        assert_eq!(
            kept.slot(),
            Some(Slot {
                day_pair: DayPair::MonWed,
                time_slot: 2
            })
        );
        let moved = store.get_client(&loser).unwrap().unwrap();
        assert_ne!(
            moved.slot(),
            Some(Slot {
                day_pair: DayPair::WedFri,
                time_slot: 2
            })
        );
        assert!(moved.slot().is_some());
    }

    #[test]
    fn test_fix_is_idempotent() {
        let mut store = RosterStore::open_in_memory().unwrap();
        client_with_slot(&mut store, "A", DayPair::TueThu, 3);
        client_with_slot(&mut store, "B", DayPair::TueThu, 3);
        client_with_slot(&mut store, "C", DayPair::MonThu, 3);

        let first = fix_all_conflicts(&mut store).unwrap();
        assert!(first.conflicts_found > 0);

        let second = fix_all_conflicts(&mut store).unwrap();
        assert_eq!(second.conflicts_found, 0);
        assert_eq!(second.clients_reassigned, 0);
    }

    #[test]
    fn test_client_in_two_groups_reassigned_once() {
        let mut store = RosterStore::open_in_memory().unwrap();
        // B collides with A on Tuesday and with C on Thursday
        client_with_slot(&mut store, "A", DayPair::TueFri, 1);
        client_with_slot(&mut store, "B", DayPair::TueThu, 1);
        client_with_slot(&mut store, "C", DayPair::MonThu, 1);

        let report = fix_all_conflicts(&mut store).unwrap();
        assert_eq!(report.conflicts_found, 2);
        // B loses both groups but moves once; C keeps Thursday only if it
        // leads its group, otherwise it moves too
        assert!(report.clients_reassigned <= 2);

        let second = fix_all_conflicts(&mut store).unwrap();
        assert_eq!(second.conflicts_found, 0);
    }

    #[test]
    fn test_detection_is_read_only() {
        let mut store = RosterStore::open_in_memory().unwrap();
        let a = client_with_slot(&mut store, "A", DayPair::MonWed, 2);
        let b = client_with_slot(&mut store, "B", DayPair::WedFri, 2);

        detect_schedule_conflicts(&store).unwrap();

        let slot_a = store.get_client(&a).unwrap().unwrap().slot();
        let slot_b = store.get_client(&b).unwrap().unwrap().slot();
        assert_eq!(
            slot_a,
            Some(Slot {
                day_pair: DayPair::MonWed,
                time_slot: 2
            })
        );
        assert_eq!(
            slot_b,
            Some(Slot {
                day_pair: DayPair::WedFri,
                time_slot: 2
            })
        );
    }
}
