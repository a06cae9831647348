//! RosterStore implementation backed by SQLite.
//!
//! Single-connection store with indexed queries for the scheduling engine.
//! Slot mutations run inside transactions with a compare-and-swap on the
//! previous slot value, guarding against lost updates when two
//! administrative triggers overlap.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::domain::{
    Client, ClientStatus, ContentItem, ContentStatus, PaaQuestion, ServiceLocation, SubscriptionStatus,
};
use crate::error::{CadencerError, Result};
use crate::id::{monotonic_ms, now_ms};
use crate::slots::{DayPair, Slot};

/// Batch size for bulk content-item inserts.
const INSERT_BATCH_SIZE: usize = 50;

/// SQLite-backed store for clients, locations, questions, and content items.
pub struct RosterStore {
    db: Connection,
}

impl RosterStore {
    /// Open or create a store at `<base_dir>/roster.db`.
    pub fn open(base_dir: &Path) -> Result<Self> {
        fs::create_dir_all(base_dir)?;
        let db = Connection::open(base_dir.join("roster.db"))?;
        Self::init_schema(&db)?;
        Ok(Self { db })
    }

    /// Open an in-memory store. Useful for testing.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        Self::init_schema(&db)?;
        Ok(Self { db })
    }

    /// Initialize the SQLite schema.
    fn init_schema(db: &Connection) -> Result<()> {
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                status TEXT NOT NULL,
                subscription_status TEXT NOT NULL,
                auto_schedule_enabled INTEGER NOT NULL,
                day_pair TEXT,
                time_slot INTEGER,
                slot_assigned_at INTEGER,
                last_auto_scheduled_at INTEGER,
                calendar_generated_at INTEGER,
                last_scheduled_date TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_clients_status ON clients(status);

            CREATE TABLE IF NOT EXISTS service_locations (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                neighborhood TEXT,
                is_active INTEGER NOT NULL,
                is_headquarters INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_locations_client ON service_locations(client_id);

            CREATE TABLE IF NOT EXISTS paa_questions (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                template TEXT NOT NULL,
                priority INTEGER NOT NULL,
                is_active INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_questions_client ON paa_questions(client_id);

            CREATE TABLE IF NOT EXISTS content_items (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                paa_id TEXT,
                location_id TEXT,
                combo_key TEXT NOT NULL,
                source TEXT NOT NULL,
                question TEXT NOT NULL,
                scheduled_date TEXT NOT NULL,
                scheduled_time TEXT NOT NULL,
                status TEXT NOT NULL,
                cta TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_client ON content_items(client_id);

            -- Dedup second line of defense for bulk calendar generation.
            -- Weekly round-robin items may legitimately revisit a combination
            -- once the bank wraps, so only calendar rows are constrained.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_items_combo
                ON content_items(client_id, combo_key) WHERE source = 'calendar';

            CREATE TABLE IF NOT EXISTS rotation_usage (
                client_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                ref_id TEXT NOT NULL,
                last_used_at INTEGER NOT NULL,
                use_count INTEGER NOT NULL,
                PRIMARY KEY (client_id, kind, ref_id)
            );
            "#,
        )?;
        Ok(())
    }

    // ---- clients ----

    /// Insert or replace a client record.
    pub fn save_client(&self, client: &Client) -> Result<()> {
        self.db.execute(
            r#"
            INSERT OR REPLACE INTO clients (
                id, name, status, subscription_status, auto_schedule_enabled,
                day_pair, time_slot, slot_assigned_at, last_auto_scheduled_at,
                calendar_generated_at, last_scheduled_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                client.id,
                client.name,
                client.status.as_str(),
                client.subscription_status.as_str(),
                client.auto_schedule_enabled as i64,
                client.day_pair.map(|p| p.key()),
                client.time_slot.map(|t| t as i64),
                client.slot_assigned_at,
                client.last_auto_scheduled_at,
                client.calendar_generated_at,
                client.last_scheduled_date.map(|d| d.to_string()),
                client.created_at,
                client.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a client by ID.
    pub fn get_client(&self, id: &str) -> Result<Option<Client>> {
        let client = self
            .db
            .query_row("SELECT * FROM clients WHERE id = ?1", params![id], row_to_client)
            .optional()?;
        Ok(client)
    }

    /// Get a client by ID, or fail with `ClientNotFound`.
    pub fn require_client(&self, id: &str) -> Result<Client> {
        self.get_client(id)?
            .ok_or_else(|| CadencerError::ClientNotFound(id.to_string()))
    }

    /// List every client, ordered by creation time then id.
    pub fn list_clients(&self) -> Result<Vec<Client>> {
        let mut stmt = self.db.prepare("SELECT * FROM clients ORDER BY created_at, id")?;
        let clients = stmt
            .query_map([], row_to_client)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clients)
    }

    /// List clients eligible for the weekly auto-schedule run, ordered by
    /// creation time then id for a stable processing order.
    pub fn list_auto_eligible(&self) -> Result<Vec<Client>> {
        let mut stmt = self.db.prepare(
            r#"
            SELECT * FROM clients
            WHERE auto_schedule_enabled = 1
              AND status = 'active'
              AND subscription_status IN ('trial', 'active')
            ORDER BY created_at, id
            "#,
        )?;
        let clients = stmt
            .query_map([], row_to_client)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clients)
    }

    /// List auto-eligible clients holding a slot, ordered by slot-assignment
    /// time then id. This is the occupancy view the assignment engine and
    /// conflict detector scan.
    pub fn list_slotted_clients(&self) -> Result<Vec<Client>> {
        let mut stmt = self.db.prepare(
            r#"
            SELECT * FROM clients
            WHERE auto_schedule_enabled = 1
              AND status = 'active'
              AND subscription_status IN ('trial', 'active')
              AND day_pair IS NOT NULL
              AND time_slot IS NOT NULL
            ORDER BY slot_assigned_at, id
            "#,
        )?;
        let clients = stmt
            .query_map([], row_to_client)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clients)
    }

    /// Set a client's slot, compare-and-swapping against the expected
    /// previous slot. Returns false if the stored slot no longer matches
    /// `expected` (a concurrent trigger won).
    pub fn set_client_slot(&mut self, client_id: &str, slot: Slot, expected: Option<Slot>) -> Result<bool> {
        // Strictly increasing so slot-assignment order never ties, even for
        // same-millisecond writes; conflict resolution keeps the earliest
        let now = monotonic_ms();
        let tx = self.db.transaction()?;
        let changed = tx.execute(
            r#"
            UPDATE clients
            SET day_pair = ?1, time_slot = ?2, slot_assigned_at = ?3, updated_at = ?3
            WHERE id = ?4 AND day_pair IS ?5 AND time_slot IS ?6
            "#,
            params![
                slot.day_pair.key(),
                slot.time_slot as i64,
                now,
                client_id,
                expected.map(|s| s.day_pair.key()),
                expected.map(|s| s.time_slot as i64),
            ],
        )?;
        tx.commit()?;
        Ok(changed == 1)
    }

    /// Clear a client's slot assignment.
    pub fn clear_client_slot(&self, client_id: &str) -> Result<()> {
        self.db.execute(
            r#"
            UPDATE clients
            SET day_pair = NULL, time_slot = NULL, slot_assigned_at = NULL, updated_at = ?1
            WHERE id = ?2
            "#,
            params![now_ms(), client_id],
        )?;
        Ok(())
    }

    /// Record a completed bulk calendar generation.
    pub fn mark_calendar_generated(&self, client_id: &str, last_date: NaiveDate) -> Result<()> {
        self.db.execute(
            r#"
            UPDATE clients
            SET calendar_generated_at = ?1, last_scheduled_date = ?2, updated_at = ?1
            WHERE id = ?3
            "#,
            params![now_ms(), last_date.to_string(), client_id],
        )?;
        Ok(())
    }

    /// Record a successful weekly auto-schedule pass for a client.
    pub fn touch_last_auto_scheduled(&self, client_id: &str) -> Result<()> {
        self.db.execute(
            "UPDATE clients SET last_auto_scheduled_at = ?1, updated_at = ?1 WHERE id = ?2",
            params![now_ms(), client_id],
        )?;
        Ok(())
    }

    // ---- service locations ----

    /// Insert or replace a location. Saving a headquarters demotes any other
    /// headquarters the client has, keeping at most one per client.
    pub fn save_location(&mut self, location: &ServiceLocation) -> Result<()> {
        let tx = self.db.transaction()?;
        if location.is_headquarters {
            tx.execute(
                "UPDATE service_locations SET is_headquarters = 0 WHERE client_id = ?1 AND id != ?2",
                params![location.client_id, location.id],
            )?;
        }
        tx.execute(
            r#"
            INSERT OR REPLACE INTO service_locations (
                id, client_id, city, state, neighborhood, is_active, is_headquarters, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                location.id,
                location.client_id,
                location.city,
                location.state,
                location.neighborhood,
                location.is_active as i64,
                location.is_headquarters as i64,
                location.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Active locations for a client: headquarters first, then alphabetical
    /// by city.
    pub fn list_active_locations(&self, client_id: &str) -> Result<Vec<ServiceLocation>> {
        let mut stmt = self.db.prepare(
            r#"
            SELECT * FROM service_locations
            WHERE client_id = ?1 AND is_active = 1
            ORDER BY is_headquarters DESC, city, id
            "#,
        )?;
        let locations = stmt
            .query_map(params![client_id], row_to_location)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }

    /// Remove a location: soft-delete (deactivate) when generated content
    /// references it, hard-delete otherwise. Returns true on hard delete.
    pub fn remove_location(&mut self, location_id: &str) -> Result<bool> {
        let tx = self.db.transaction()?;
        let referenced: i64 = tx.query_row(
            "SELECT COUNT(*) FROM content_items WHERE location_id = ?1",
            params![location_id],
            |row| row.get(0),
        )?;
        let hard = if referenced > 0 {
            tx.execute(
                "UPDATE service_locations SET is_active = 0 WHERE id = ?1",
                params![location_id],
            )?;
            false
        } else {
            tx.execute("DELETE FROM service_locations WHERE id = ?1", params![location_id])?;
            true
        };
        tx.commit()?;
        Ok(hard)
    }

    // ---- PAA questions ----

    /// Replace a client's entire question bank in one transaction
    /// (delete-and-recreate).
    pub fn replace_questions(&mut self, client_id: &str, questions: &[PaaQuestion]) -> Result<()> {
        let tx = self.db.transaction()?;
        tx.execute("DELETE FROM paa_questions WHERE client_id = ?1", params![client_id])?;
        for question in questions {
            tx.execute(
                r#"
                INSERT INTO paa_questions (id, client_id, template, priority, is_active, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    question.id,
                    question.client_id,
                    question.template,
                    question.priority as i64,
                    question.is_active as i64,
                    question.created_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Active questions for a client, priority ascending.
    pub fn list_active_questions(&self, client_id: &str) -> Result<Vec<PaaQuestion>> {
        let mut stmt = self.db.prepare(
            r#"
            SELECT * FROM paa_questions
            WHERE client_id = ?1 AND is_active = 1
            ORDER BY priority, id
            "#,
        )?;
        let questions = stmt
            .query_map(params![client_id], row_to_question)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    // ---- content items ----

    /// Insert one item created by the weekly run.
    pub fn insert_weekly_item(&self, item: &ContentItem) -> Result<()> {
        self.db.execute(
            r#"
            INSERT INTO content_items (
                id, client_id, paa_id, location_id, combo_key, source,
                question, scheduled_date, scheduled_time, status, cta,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'weekly', ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                item.id,
                item.client_id,
                item.paa_id,
                item.location_id,
                item.combination_key(),
                item.question,
                item.scheduled_date.to_string(),
                item.scheduled_time.format("%H:%M:%S").to_string(),
                item.status.as_str(),
                item.cta,
                item.created_at,
                item.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Insert calendar items in batches, skipping combinations already on
    /// file. Returns the number actually inserted.
    pub fn insert_calendar_items(&mut self, items: &[ContentItem]) -> Result<usize> {
        let mut inserted = 0;
        for chunk in items.chunks(INSERT_BATCH_SIZE) {
            let tx = self.db.transaction()?;
            for item in chunk {
                inserted += tx.execute(
                    r#"
                    INSERT OR IGNORE INTO content_items (
                        id, client_id, paa_id, location_id, combo_key, source,
                        question, scheduled_date, scheduled_time, status, cta,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, 'calendar', ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    "#,
                    params![
                        item.id,
                        item.client_id,
                        item.paa_id,
                        item.location_id,
                        item.combination_key(),
                        item.question,
                        item.scheduled_date.to_string(),
                        item.scheduled_time.format("%H:%M:%S").to_string(),
                        item.status.as_str(),
                        item.cta,
                        item.created_at,
                        item.updated_at,
                    ],
                )?;
            }
            tx.commit()?;
        }
        Ok(inserted)
    }

    /// All combination keys already used by a client's content items.
    pub fn existing_combination_keys(&self, client_id: &str) -> Result<HashSet<String>> {
        let mut stmt = self
            .db
            .prepare("SELECT combo_key FROM content_items WHERE client_id = ?1")?;
        let keys = stmt
            .query_map(params![client_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(keys)
    }

    /// Content items for a client, scheduled date ascending.
    pub fn list_content_items(&self, client_id: &str) -> Result<Vec<ContentItem>> {
        let mut stmt = self.db.prepare(
            "SELECT * FROM content_items WHERE client_id = ?1 ORDER BY scheduled_date, scheduled_time, id",
        )?;
        let items = stmt
            .query_map(params![client_id], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Number of content items a client has.
    pub fn count_content_items(&self, client_id: &str) -> Result<usize> {
        let count: i64 = self.db.query_row(
            "SELECT COUNT(*) FROM content_items WHERE client_id = ?1",
            params![client_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ---- rotation index ----

    /// Last-used timestamps for a rotation kind ("question" or "location"),
    /// keyed by ref id. Absence means never used.
    pub fn rotation_usage(&self, client_id: &str, kind: &str) -> Result<HashMap<String, i64>> {
        let mut stmt = self
            .db
            .prepare("SELECT ref_id, last_used_at FROM rotation_usage WHERE client_id = ?1 AND kind = ?2")?;
        let usage = stmt
            .query_map(params![client_id, kind], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(usage)
    }

    /// Record a rotation use, bumping the use count. Timestamps are strictly
    /// increasing so least-recently-used ordering never ties across
    /// back-to-back runs.
    pub fn record_rotation_use(&self, client_id: &str, kind: &str, ref_id: &str) -> Result<()> {
        self.db.execute(
            r#"
            INSERT INTO rotation_usage (client_id, kind, ref_id, last_used_at, use_count)
            VALUES (?1, ?2, ?3, ?4, 1)
            ON CONFLICT(client_id, kind, ref_id)
            DO UPDATE SET last_used_at = ?4, use_count = use_count + 1
            "#,
            params![client_id, kind, ref_id, monotonic_ms()],
        )?;
        Ok(())
    }
}

fn bad_column(name: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, format!("invalid {name}: {value}").into())
}

fn row_to_client(row: &Row) -> rusqlite::Result<Client> {
    let status_s: String = row.get("status")?;
    let sub_s: String = row.get("subscription_status")?;
    let day_pair_s: Option<String> = row.get("day_pair")?;
    let last_date_s: Option<String> = row.get("last_scheduled_date")?;

    let day_pair = match day_pair_s {
        Some(s) => Some(DayPair::parse(&s).ok_or_else(|| bad_column("day_pair", &s))?),
        None => None,
    };
    let last_scheduled_date = match last_date_s {
        Some(s) => Some(
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| bad_column("last_scheduled_date", &s))?,
        ),
        None => None,
    };

    Ok(Client {
        id: row.get("id")?,
        name: row.get("name")?,
        status: ClientStatus::parse(&status_s).ok_or_else(|| bad_column("status", &status_s))?,
        subscription_status: SubscriptionStatus::parse(&sub_s)
            .ok_or_else(|| bad_column("subscription_status", &sub_s))?,
        auto_schedule_enabled: row.get::<_, i64>("auto_schedule_enabled")? != 0,
        day_pair,
        time_slot: row.get::<_, Option<i64>>("time_slot")?.map(|t| t as usize),
        slot_assigned_at: row.get("slot_assigned_at")?,
        last_auto_scheduled_at: row.get("last_auto_scheduled_at")?,
        calendar_generated_at: row.get("calendar_generated_at")?,
        last_scheduled_date,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_location(row: &Row) -> rusqlite::Result<ServiceLocation> {
    Ok(ServiceLocation {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        city: row.get("city")?,
        state: row.get("state")?,
        neighborhood: row.get("neighborhood")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
        is_headquarters: row.get::<_, i64>("is_headquarters")? != 0,
        created_at: row.get("created_at")?,
    })
}

fn row_to_question(row: &Row) -> rusqlite::Result<PaaQuestion> {
    Ok(PaaQuestion {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        template: row.get("template")?,
        priority: row.get::<_, i64>("priority")? as u32,
        is_active: row.get::<_, i64>("is_active")? != 0,
        created_at: row.get("created_at")?,
    })
}

fn row_to_item(row: &Row) -> rusqlite::Result<ContentItem> {
    let status_s: String = row.get("status")?;
    let date_s: String = row.get("scheduled_date")?;
    let time_s: String = row.get("scheduled_time")?;

    Ok(ContentItem {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        paa_id: row.get("paa_id")?,
        location_id: row.get("location_id")?,
        question: row.get("question")?,
        scheduled_date: NaiveDate::parse_from_str(&date_s, "%Y-%m-%d")
            .map_err(|_| bad_column("scheduled_date", &date_s))?,
        scheduled_time: NaiveTime::parse_from_str(&time_s, "%H:%M:%S")
            .map_err(|_| bad_column("scheduled_time", &time_s))?,
        status: ContentStatus::parse(&status_s).ok_or_else(|| bad_column("status", &status_s))?,
        cta: row.get("cta")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
