//! Weekly auto-scheduler orchestrator.
//!
//! The periodic production entry point. One sequential pass over all
//! eligible clients: ensure a slot, rotate to the next question and
//! location, create the content item, and hand it to the pipeline. Each
//! client is isolated; failures become result entries, not batch aborts.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::domain::{Client, ContentItem, render_template};
use crate::error::{CadencerError, Result};
use crate::pipeline::GenerationPipeline;
use crate::scheduler::rotation::{
    CtaEntry, KIND_LOCATION, KIND_QUESTION, RotationPool, next_location, next_question,
};
use crate::slots::{assign_slot, next_publish_datetime};
use crate::store::RosterStore;

/// Options for one weekly run.
#[derive(Debug, Clone)]
pub struct WeeklyOptions {
    /// Publish dates are computed from this day forward
    pub today: NaiveDate,
    /// Throttle between clients, a courtesy to downstream rate limits
    pub client_delay: Duration,
    /// Wall-clock ceiling for the whole run; clients not reached are
    /// deferred to the next cycle
    pub deadline: Option<Duration>,
    /// Call-to-action pool rotated across created items
    pub ctas: Vec<CtaEntry>,
}

impl Default for WeeklyOptions {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
            client_delay: Duration::from_secs(1),
            deadline: None,
            ctas: Vec::new(),
        }
    }
}

/// Per-client outcome of a run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Skipped,
    Failed,
}

impl RunStatus {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Skipped => "skipped",
            RunStatus::Failed => "failed",
        }
    }
}

/// Detail entry for one client in a run report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientRunResult {
    pub client_id: String,
    pub client_name: String,
    pub status: RunStatus,
    /// Rendered question text, when one was scheduled
    pub question: Option<String>,
    /// Location display name, when one was scheduled
    pub location: Option<String>,
    pub scheduled_for: Option<NaiveDateTime>,
    /// Skip reason or error message
    pub error: Option<String>,
}

/// Aggregate outcome of a weekly run.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct WeeklyRunReport {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<ClientRunResult>,
}

/// Convenience entry point: one weekly pass with the given options.
pub async fn run_weekly_auto_schedule(
    store: &mut RosterStore,
    pipeline: &dyn GenerationPipeline,
    options: WeeklyOptions,
) -> Result<WeeklyRunReport> {
    WeeklyScheduler::new(pipeline, options).run(store).await
}

/// Orchestrates the weekly auto-schedule pass.
pub struct WeeklyScheduler<'a> {
    pipeline: &'a dyn GenerationPipeline,
    options: WeeklyOptions,
    ctas: RotationPool,
}

impl<'a> WeeklyScheduler<'a> {
    /// Create a scheduler with the given pipeline and options.
    pub fn new(pipeline: &'a dyn GenerationPipeline, options: WeeklyOptions) -> Self {
        let ctas = RotationPool::new(options.ctas.clone());
        Self { pipeline, options, ctas }
    }

    /// Run one pass over every eligible client.
    ///
    /// Per-client errors are downgraded into result entries. The one fatal
    /// exception is slot-space exhaustion, which indicates a slot-space
    /// definition bug and is surfaced to the caller.
    pub async fn run(&mut self, store: &mut RosterStore) -> Result<WeeklyRunReport> {
        let clients = store.list_auto_eligible()?;
        tracing::info!(clients = clients.len(), "Starting weekly auto-schedule run");

        let started = Instant::now();
        let mut report = WeeklyRunReport::default();

        for (index, client) in clients.iter().enumerate() {
            if let Some(deadline) = self.options.deadline
                && started.elapsed() >= deadline
            {
                tracing::warn!(
                    deferred = clients.len() - index,
                    "Run deadline reached, deferring remaining clients to next cycle"
                );
                break;
            }
            if index > 0 && !self.options.client_delay.is_zero() {
                tokio::time::sleep(self.options.client_delay).await;
            }

            report.processed += 1;
            let result = match self.schedule_one(store, client).await {
                Ok(result) => result,
                Err(CadencerError::SlotSpaceExhausted) => return Err(CadencerError::SlotSpaceExhausted),
                Err(CadencerError::Configuration(reason)) => {
                    tracing::warn!(client = %client.id, %reason, "Skipping client");
                    ClientRunResult {
                        client_id: client.id.clone(),
                        client_name: client.name.clone(),
                        status: RunStatus::Skipped,
                        question: None,
                        location: None,
                        scheduled_for: None,
                        error: Some(reason),
                    }
                }
                Err(err) => {
                    tracing::error!(client = %client.id, error = %err, "Client failed");
                    ClientRunResult {
                        client_id: client.id.clone(),
                        client_name: client.name.clone(),
                        status: RunStatus::Failed,
                        question: None,
                        location: None,
                        scheduled_for: None,
                        error: Some(err.to_string()),
                    }
                }
            };

            match result.status {
                RunStatus::Success => report.successful += 1,
                RunStatus::Skipped => report.skipped += 1,
                RunStatus::Failed => report.failed += 1,
            }
            report.results.push(result);
        }

        tracing::info!(
            processed = report.processed,
            successful = report.successful,
            failed = report.failed,
            skipped = report.skipped,
            "Weekly auto-schedule run finished"
        );
        Ok(report)
    }

    /// Schedule one content item for one client.
    async fn schedule_one(&mut self, store: &mut RosterStore, client: &Client) -> Result<ClientRunResult> {
        let locations = store.list_active_locations(&client.id)?;
        if locations.is_empty() {
            return Err(CadencerError::Configuration(
                "no active service locations".to_string(),
            ));
        }
        let questions = store.list_active_questions(&client.id)?;
        if questions.is_empty() {
            return Err(CadencerError::Configuration("no active PAA questions".to_string()));
        }

        let slot = assign_slot(store, &client.id)?;
        let publish = next_publish_datetime(slot, self.options.today)
            .ok_or_else(|| CadencerError::Configuration("slot has no upcoming publish day".to_string()))?;

        let question_usage = store.rotation_usage(&client.id, KIND_QUESTION)?;
        let location_usage = store.rotation_usage(&client.id, KIND_LOCATION)?;
        // Both lists are non-empty, checked above
        let question = next_question(&questions, &question_usage)
            .ok_or_else(|| CadencerError::Configuration("question rotation came up empty".to_string()))?;
        let location = next_location(&locations, &location_usage)
            .ok_or_else(|| CadencerError::Configuration("location rotation came up empty".to_string()))?;

        let rendered = render_template(&question.template, location);
        let mut item = ContentItem::new_scheduled(
            &client.id,
            Some(&question.id),
            Some(&location.id),
            &rendered,
            publish.date(),
            publish.time(),
        );
        if let Some(cta) = self.ctas.advance() {
            item.cta = Some(cta.text);
        }

        store.insert_weekly_item(&item)?;
        store.record_rotation_use(&client.id, KIND_QUESTION, &question.id)?;
        store.record_rotation_use(&client.id, KIND_LOCATION, &location.id)?;
        store.touch_last_auto_scheduled(&client.id)?;

        // Fire-and-continue: the item stays persisted either way, the
        // pipeline outcome only colors the result entry
        let (status, error) = match self.pipeline.dispatch(&item).await {
            Ok(()) => (RunStatus::Success, None),
            Err(err) => (RunStatus::Failed, Some(err.to_string())),
        };

        Ok(ClientRunResult {
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            status,
            question: Some(rendered),
            location: Some(location.display_name()),
            scheduled_for: Some(publish),
            error,
        })
    }
}
