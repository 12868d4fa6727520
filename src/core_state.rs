//! Application state shared by every command.
//!
//! Owns the key-value store and the orchestrator built on top of it, so the
//! credential and journal always read from the same place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::{GeminiClient, InferenceClient, Orchestrator, PipelineError, RunObserver};
use crate::store::{FileStore, KeyValueStore};

pub struct CoreState {
    /// Where persisted data lives, for status output. `None` for in-memory stores.
    pub data_dir: Option<PathBuf>,
    orchestrator: Orchestrator,
}

impl CoreState {
    pub fn new(
        client: Arc<dyn InferenceClient + Send + Sync>,
        store: Arc<dyn KeyValueStore + Send + Sync>,
        observer: Arc<dyn RunObserver>,
    ) -> Self {
        Self {
            data_dir: None,
            orchestrator: Orchestrator::new(client, store).with_observer(observer),
        }
    }

    /// File-backed state under `dir`, talking to the configured Gemini endpoint.
    pub fn open(dir: PathBuf, observer: Arc<dyn RunObserver>) -> Result<Self, PipelineError> {
        let client = Arc::new(GeminiClient::from_env()?);
        let store = Arc::new(FileStore::new(dir.clone()));
        tracing::debug!(dir = %dir.display(), "Opening store");
        let mut state = Self::new(client, store, observer);
        state.data_dir = Some(dir);
        Ok(state)
    }

    pub fn with_demo_delay(mut self, delay: Duration) -> Self {
        self.orchestrator = self.orchestrator.with_demo_delay(delay);
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}
