//! Seam to the external content-generation pipeline.
//!
//! The engine only schedules; rendering text into blog posts, podcasts, or
//! videos happens elsewhere. Dispatch is fire-and-continue: a failure is
//! reported in the per-client result, never raised as fatal to a bulk run.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::ContentItem;
use crate::error::{CadencerError, Result};

/// Hand-off point for freshly scheduled content items.
#[async_trait]
pub trait GenerationPipeline: Send + Sync {
    /// Notify the pipeline of a newly scheduled item.
    async fn dispatch(&self, item: &ContentItem) -> Result<()>;
}

/// Pipeline that only logs. Used when running the scheduler standalone.
pub struct LogPipeline;

#[async_trait]
impl GenerationPipeline for LogPipeline {
    async fn dispatch(&self, item: &ContentItem) -> Result<()> {
        tracing::info!(
            item = %item.id,
            client = %item.client_id,
            date = %item.scheduled_date,
            "Dispatched content item"
        );
        Ok(())
    }
}

/// Recording pipeline for tests: captures dispatched item ids and can be
/// told to fail for specific clients.
#[derive(Default)]
pub struct RecordingPipeline {
    dispatched: Mutex<Vec<String>>,
    fail_for: Mutex<HashSet<String>>,
}

impl RecordingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make dispatch fail for items belonging to this client.
    pub fn fail_for_client(&self, client_id: &str) {
        self.fail_for.lock().expect("lock poisoned").insert(client_id.to_string());
    }

    /// Ids of items dispatched so far.
    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl GenerationPipeline for RecordingPipeline {
    async fn dispatch(&self, item: &ContentItem) -> Result<()> {
        if self.fail_for.lock().expect("lock poisoned").contains(&item.client_id) {
            return Err(CadencerError::Pipeline(format!(
                "injected failure for {}",
                item.client_id
            )));
        }
        self.dispatched.lock().expect("lock poisoned").push(item.id.clone());
        Ok(())
    }
}
