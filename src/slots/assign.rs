//! Slot assignment engine.
//!
//! Greedy load-balancing over the closed slot space: count how many other
//! eligible clients occupy each (day-pair, time-slot) combination and pick
//! the minimum. Not history-aware; it does not consider future churn.

use std::collections::HashMap;

use crate::error::{CadencerError, Result};
use crate::slots::space::{Slot, slot_space, weekday_ordinal};
use crate::store::RosterStore;

/// CAS retry attempts when persisting an assignment races another trigger.
const ASSIGN_ATTEMPTS: usize = 3;

/// Pick the least-loaded slot given current roster occupancy.
///
/// `exclude_client_id` drops that client from occupancy counting, so a
/// client being reassigned does not count against itself.
///
/// Ties break deterministically: fewest weekday collisions at the slot's
/// publish time first (so a fresh assignment avoids creating a conflict a
/// later detection pass would have to repair), then day-pair ordinal, then
/// time-slot index. The result is a pure function of the occupancy snapshot.
pub fn find_best_slot(store: &RosterStore, exclude_client_id: Option<&str>) -> Result<Slot> {
    let mut occupancy: HashMap<Slot, usize> = HashMap::new();
    // (weekday ordinal, time-slot) -> occupants, for the collision tie-break
    let mut day_load: HashMap<(u8, usize), usize> = HashMap::new();

    for client in store.list_slotted_clients()? {
        if Some(client.id.as_str()) == exclude_client_id {
            continue;
        }
        let Some(slot) = client.slot() else { continue };
        *occupancy.entry(slot).or_insert(0) += 1;
        let (day1, day2) = slot.day_pair.day_ordinals();
        *day_load.entry((day1, slot.time_slot)).or_insert(0) += 1;
        *day_load.entry((day2, slot.time_slot)).or_insert(0) += 1;
    }

    let mut best: Option<(usize, usize, Slot)> = None;
    for slot in slot_space() {
        let count = occupancy.get(&slot).copied().unwrap_or(0);
        let (day1, day2) = slot.day_pair.days();
        let collisions = day_load
            .get(&(weekday_ordinal(day1), slot.time_slot))
            .copied()
            .unwrap_or(0)
            + day_load
                .get(&(weekday_ordinal(day2), slot.time_slot))
                .copied()
                .unwrap_or(0);

        // slot_space() iterates in (day-pair ordinal, time-slot) order, so
        // strict less-than keeps the earliest minimum
        let candidate = (count, collisions, slot);
        match best {
            None => best = Some(candidate),
            Some((c, w, _)) if (count, collisions) < (c, w) => best = Some(candidate),
            _ => {}
        }
    }

    best.map(|(_, _, slot)| slot).ok_or(CadencerError::SlotSpaceExhausted)
}

/// Ensure a client holds a slot, assigning the best available one if it has
/// none. Idempotent: a client that already holds a slot keeps it.
pub fn assign_slot(store: &mut RosterStore, client_id: &str) -> Result<Slot> {
    for _ in 0..ASSIGN_ATTEMPTS {
        let client = store.require_client(client_id)?;
        if let Some(slot) = client.slot() {
            return Ok(slot);
        }

        let slot = find_best_slot(store, Some(client_id))?;
        if store.set_client_slot(client_id, slot, None)? {
            tracing::info!(client = %client_id, slot = %slot, "Assigned publishing slot");
            return Ok(slot);
        }
        // Lost the compare-and-swap to a concurrent trigger; re-read
        tracing::debug!(client = %client_id, "Slot assignment raced, retrying");
    }
    Err(CadencerError::Configuration(format!(
        "slot assignment for {client_id} kept racing other writers"
    )))
}
