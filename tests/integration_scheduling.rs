//! End-to-end scheduling integration tests
//!
//! Exercises slot assignment, conflict resolution, calendar generation,
//! and the weekly run against a real on-disk store.

use std::collections::HashMap;
use std::time::Duration;

use cadencer::calendar::{CalendarOutcome, GenerateOptions, generate_calendar};
use cadencer::domain::{Client, PaaQuestion, ServiceLocation, parse_question_block};
use cadencer::error::{CadencerError, Result};
use cadencer::pipeline::RecordingPipeline;
use cadencer::scheduler::{RunStatus, WeeklyOptions, run_weekly_auto_schedule};
use cadencer::slots::{Slot, assign_slot, detect_schedule_conflicts, fix_all_conflicts, slot_space};
use cadencer::store::RosterStore;
use chrono::NaiveDate;
use tempfile::TempDir;

fn seeded_client(store: &mut RosterStore, name: &str) -> Result<Client> {
    let client = Client::new(name);
    store.save_client(&client)?;
    store.save_location(&ServiceLocation::new(&client.id, "Portland", "OR").as_headquarters())?;
    store.save_location(&ServiceLocation::new(&client.id, "Salem", "OR"))?;
    store.replace_questions(
        &client.id,
        &[
            PaaQuestion::new(&client.id, "How much does service cost in {location}?", 1),
            PaaQuestion::new(&client.id, "Who offers same-day service in {location}?", 2),
        ],
    )?;
    Ok(client)
}

fn weekly_options() -> WeeklyOptions {
    WeeklyOptions {
        today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        client_delay: Duration::ZERO,
        deadline: None,
        ctas: Vec::new(),
    }
}

/// Integration test: verify slot assignments survive a store reopen
#[test]
fn test_slot_assignment_persists_across_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let client = {
        let mut store = RosterStore::open(temp_dir.path())?;
        let client = seeded_client(&mut store, "Shop A")?;
        assign_slot(&mut store, &client.id)?;
        client
    };

    let store = RosterStore::open(temp_dir.path())?;
    let reloaded = store.get_client(&client.id)?.unwrap();
    assert!(reloaded.slot().is_some());
    assert!(reloaded.slot_assigned_at.is_some());
    Ok(())
}

/// Integration test: occupancy stays within one across many assignments
#[test]
fn test_assignment_spread_stays_even() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;

    let slots: Vec<Slot> = slot_space().collect();
    let total = slots.len() + 13;
    for i in 0..total {
        let client = Client::new(&format!("Client {i}"));
        store.save_client(&client)?;
        assign_slot(&mut store, &client.id)?;
    }

    let mut occupancy: HashMap<Slot, usize> = HashMap::new();
    for client in store.list_slotted_clients()? {
        *occupancy.entry(client.slot().unwrap()).or_insert(0) += 1;
    }
    let max = occupancy.values().copied().max().unwrap();
    let min = slots
        .iter()
        .map(|s| occupancy.get(s).copied().unwrap_or(0))
        .min()
        .unwrap();
    assert!(max - min <= 1, "spread {max}-{min} exceeds one");
    Ok(())
}

/// Integration test: repeated assignment returns the same slot
#[test]
fn test_assignment_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;
    let client = seeded_client(&mut store, "Shop A")?;

    let first = assign_slot(&mut store, &client.id)?;
    let second = assign_slot(&mut store, &client.id)?;
    assert_eq!(first, second);
    Ok(())
}

/// Integration test: fixing conflicts leaves a conflict-free roster and
/// a second pass finds nothing to do
#[test]
fn test_fix_conflicts_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;

    // Manufacture a Thursday collision across different day-pairs
    let slot_a = Slot {
        day_pair: cadencer::slots::DayPair::TueThu,
        time_slot: 4,
    };
    let slot_b = Slot {
        day_pair: cadencer::slots::DayPair::MonThu,
        time_slot: 4,
    };
    for (name, slot) in [("First", slot_a), ("Second", slot_b)] {
        let client = Client::new(name);
        store.save_client(&client)?;
        store.set_client_slot(&client.id, slot, None)?;
    }

    assert_eq!(detect_schedule_conflicts(&store)?.len(), 1);

    let report = fix_all_conflicts(&mut store)?;
    assert_eq!(report.conflicts_found, 1);
    assert_eq!(report.clients_reassigned, 1);
    assert!(detect_schedule_conflicts(&store)?.is_empty());

    let second = fix_all_conflicts(&mut store)?;
    assert_eq!(second.conflicts_found, 0);
    assert_eq!(second.clients_reassigned, 0);
    Ok(())
}

/// Integration test: full weekly run persists items, dispatches them, and
/// records rotation usage
#[tokio::test]
async fn test_weekly_run_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;
    let a = seeded_client(&mut store, "Shop A")?;
    let b = seeded_client(&mut store, "Shop B")?;

    let pipeline = RecordingPipeline::new();
    let report = run_weekly_auto_schedule(&mut store, &pipeline, weekly_options()).await?;

    assert_eq!(report.processed, 2);
    assert_eq!(report.successful, 2);
    assert_eq!(pipeline.dispatched().len(), 2);

    for client in [&a, &b] {
        assert_eq!(store.count_content_items(&client.id)?, 1);
        let usage = store.rotation_usage(&client.id, "question")?;
        assert_eq!(usage.len(), 1);
        let reloaded = store.get_client(&client.id)?.unwrap();
        assert!(reloaded.slot().is_some());
        assert!(reloaded.last_auto_scheduled_at.is_some());
    }
    Ok(())
}

/// Integration test: clients paused or opted out are not scheduled
#[tokio::test]
async fn test_weekly_run_skips_ineligible_clients() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;
    seeded_client(&mut store, "Active")?;

    let mut paused = seeded_client(&mut store, "Paused")?;
    paused.status = cadencer::domain::ClientStatus::Paused;
    store.save_client(&paused)?;

    let mut opted_out = seeded_client(&mut store, "Opted out")?;
    opted_out.auto_schedule_enabled = false;
    store.save_client(&opted_out)?;

    let pipeline = RecordingPipeline::new();
    let report = run_weekly_auto_schedule(&mut store, &pipeline, weekly_options()).await?;

    assert_eq!(report.processed, 1);
    assert_eq!(report.successful, 1);
    assert_eq!(store.count_content_items(&paused.id)?, 0);
    assert_eq!(store.count_content_items(&opted_out.id)?, 0);
    Ok(())
}

/// Integration test: calendar generation is deduplicated but never blocks
/// the weekly path, which may legitimately revisit a combination
#[tokio::test]
async fn test_calendar_dedup_does_not_block_weekly() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;
    let client = seeded_client(&mut store, "Shop A")?;

    let options = GenerateOptions {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 2),
        ..GenerateOptions::default()
    };
    let outcome = generate_calendar(&mut store, &client.id, &options)?;
    let inserted = match outcome {
        CalendarOutcome::Persisted { inserted, .. } => inserted,
        CalendarOutcome::Preview(_) => panic!("expected persistence"),
    };
    // 2 questions x 2 locations
    assert_eq!(inserted, 4);

    // Second generation finds everything on file
    match generate_calendar(&mut store, &client.id, &options)? {
        CalendarOutcome::Persisted { summary, inserted } => {
            assert_eq!(summary.planned, 0);
            assert_eq!(summary.skipped_existing, 4);
            assert_eq!(inserted, 0);
        }
        CalendarOutcome::Preview(_) => panic!("expected persistence"),
    }

    // The weekly run reuses one of those combinations and still persists
    let pipeline = RecordingPipeline::new();
    let report = run_weekly_auto_schedule(&mut store, &pipeline, weekly_options()).await?;
    assert_eq!(report.successful, 1);
    assert_eq!(store.count_content_items(&client.id)?, 5);
    Ok(())
}

/// Integration test: preview mode plans without writing
#[test]
fn test_generate_preview_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;
    let client = seeded_client(&mut store, "Shop A")?;

    let options = GenerateOptions {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 2),
        preview: true,
        ..GenerateOptions::default()
    };
    match generate_calendar(&mut store, &client.id, &options)? {
        CalendarOutcome::Preview(summary) => {
            assert_eq!(summary.planned, 4);
            assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2024, 1, 2));
        }
        CalendarOutcome::Persisted { .. } => panic!("preview must not persist"),
    }
    assert_eq!(store.count_content_items(&client.id)?, 0);
    Ok(())
}

/// Integration test: generation for an unconfigured client fails without
/// partial writes
#[test]
fn test_generate_requires_configuration() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;
    let bare = Client::new("Bare");
    store.save_client(&bare)?;

    let err = generate_calendar(&mut store, &bare.id, &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, CadencerError::Configuration(_)));
    assert_eq!(store.count_content_items(&bare.id)?, 0);
    Ok(())
}

/// Integration test: question import collects every bad line instead of
/// failing on the first
#[test]
fn test_question_block_validation_collects_errors() {
    let block = "How much does it cost in {location}?\n\
                 Missing the token?\n\
                 No question mark in {location}\n";
    let err = parse_question_block("client-1", block).unwrap_err();
    match err {
        CadencerError::Validation(errors) => {
            assert_eq!(errors.len(), 2);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// Integration test: a valid block replaces the bank in priority order
#[test]
fn test_question_import_replaces_bank() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = RosterStore::open(temp_dir.path())?;
    let client = seeded_client(&mut store, "Shop A")?;

    let block = "Is {location} service available on weekends?\n\
                 \n\
                 What does {location} maintenance include?\n";
    let questions = parse_question_block(&client.id, block)?;
    store.replace_questions(&client.id, &questions)?;

    let bank = store.list_active_questions(&client.id)?;
    assert_eq!(bank.len(), 2);
    assert_eq!(bank[0].priority, 1);
    assert!(bank[0].template.starts_with("Is"));
    assert_eq!(bank[1].priority, 2);
    Ok(())
}
