use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use super::demo::demo_result;
use super::gemini::InferenceClient;
use super::image::ImagePayload;
use super::normalize::{normalize_classification, normalize_comparison, normalize_single_item};
use super::prompt::{build_classification_prompt, build_comparison_prompt, build_single_item_prompt};
use super::types::{ItemDomain, RunMode, RunResult};
use super::PipelineError;
use crate::catalog::AnalysisContext;
use crate::config::DEMO_DELAY_MS;
use crate::journal::{Journal, JournalEntry};
use crate::store::{KeyValueStore, NonConfidentialCredentialStore, StoreError};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    CredentialCheck,
    ImageCheck,
    Classifying,
    Rejected,
    Branching,
    Analyzing,
    Comparing,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Succeeded | Self::Failed)
    }
}

/// How a run ended. Every error is folded in here; nothing escapes a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Succeeded(JournalEntry),
    /// The classifier said this is not Diablo IV loot. Not an error.
    Rejected {
        domain: ItemDomain,
        title: String,
        reason: String,
        rationale: Option<String>,
    },
    Failed(PipelineError),
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            Self::Succeeded(_) => RunState::Succeeded,
            Self::Rejected { .. } => RunState::Rejected,
            Self::Failed(_) => RunState::Failed,
        }
    }
}

/// Presentation hook; receives every state transition in order.
pub trait RunObserver: Send + Sync {
    fn on_state(&self, state: RunState);
}

pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_state(&self, _state: RunState) {}
}

/// Two-stage pipeline driver: classify → analyze or compare → journal.
///
/// Only one run may be in flight. The action controls are disabled while a
/// run is active and re-enabled whatever way it ends.
pub struct Orchestrator {
    client: Arc<dyn InferenceClient + Send + Sync>,
    credentials: NonConfidentialCredentialStore,
    journal: Journal,
    credential: Mutex<Option<String>>,
    image: Mutex<Option<ImagePayload>>,
    in_flight: AtomicBool,
    state: Mutex<RunState>,
    observer: Arc<dyn RunObserver>,
    demo_delay: Duration,
}

/// Clears the in-flight flag and returns to `Idle` on every exit path.
struct RunGuard<'a> {
    orchestrator: &'a Orchestrator,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.transition(RunState::Idle);
        self.orchestrator.in_flight.store(false, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Orchestrator {
    /// Credential and journal share the same key-value store.
    pub fn new(
        client: Arc<dyn InferenceClient + Send + Sync>,
        store: Arc<dyn KeyValueStore + Send + Sync>,
    ) -> Self {
        Self {
            client,
            credentials: NonConfidentialCredentialStore::new(store.clone()),
            journal: Journal::load(store),
            credential: Mutex::new(None),
            image: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(RunState::Idle),
            observer: Arc::new(NoopObserver),
            demo_delay: Duration::from_millis(DEMO_DELAY_MS),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_demo_delay(mut self, delay: Duration) -> Self {
        self.demo_delay = delay;
        self
    }

    // ── Working state ───────────────────────────────────────

    /// Hold the key in memory and save it to the store.
    pub fn set_credential(&self, credential: &str) -> Result<bool, StoreError> {
        let trimmed = credential.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        *lock(&self.credential) = Some(trimmed.to_string());
        self.credentials.save(trimmed)
    }

    /// Hold the key for this process only.
    pub fn use_session_credential(&self, credential: &str) {
        let trimmed = credential.trim();
        if !trimmed.is_empty() {
            *lock(&self.credential) = Some(trimmed.to_string());
        }
    }

    pub fn forget_credential(&self) -> Result<(), StoreError> {
        *lock(&self.credential) = None;
        self.credentials.clear()
    }

    pub fn has_credential(&self) -> bool {
        lock(&self.credential).is_some() || self.credentials.load().is_some()
    }

    pub fn set_image(&self, image: ImagePayload) {
        *lock(&self.image) = Some(image);
    }

    pub fn clear_image(&self) {
        *lock(&self.image) = None;
    }

    pub fn has_image(&self) -> bool {
        lock(&self.image).is_some()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    /// Whether the analyze/compare/demo actions may start a run.
    pub fn controls_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::SeqCst)
    }

    // ── Runs ────────────────────────────────────────────────

    /// Full two-stage run for the action the user picked.
    pub fn run(&self, mode: RunMode, context: &AnalysisContext) -> RunOutcome {
        let Some(_guard) = self.begin_run() else {
            tracing::warn!(%mode, "Run requested while another is in flight");
            return RunOutcome::Failed(PipelineError::RunInProgress);
        };
        let _span = tracing::info_span!(
            "pipeline_run",
            %mode,
            class = context.category(),
            build = context.sub_category(),
        )
        .entered();

        let outcome = self
            .execute(mode, context)
            .unwrap_or_else(RunOutcome::Failed);
        self.finish(&outcome);
        outcome
    }

    /// Canned result after a fixed delay. Never touches the inference client.
    pub fn run_demo(&self, mode: RunMode, context: &AnalysisContext) -> RunOutcome {
        let Some(_guard) = self.begin_run() else {
            return RunOutcome::Failed(PipelineError::RunInProgress);
        };
        let _span = tracing::info_span!("demo_run", %mode).entered();

        self.transition(stage_state(mode));
        if !self.demo_delay.is_zero() {
            std::thread::sleep(self.demo_delay);
        }

        let entry = JournalEntry::new(context, demo_result(mode));
        self.journal.append(entry.clone());
        let outcome = RunOutcome::Succeeded(entry);
        self.finish(&outcome);
        outcome
    }

    fn begin_run(&self) -> Option<RunGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(RunGuard { orchestrator: self })
    }

    fn execute(
        &self,
        mode: RunMode,
        context: &AnalysisContext,
    ) -> Result<RunOutcome, PipelineError> {
        self.transition(RunState::CredentialCheck);
        let credential = self.resolve_credential().ok_or(PipelineError::NoCredential)?;

        self.transition(RunState::ImageCheck);
        let image = lock(&self.image).clone().ok_or(PipelineError::NoImage)?;

        // Stage 1: domain gate only. It never picks analyze vs compare.
        self.transition(RunState::Classifying);
        let raw = self
            .client
            .generate(&credential, &build_classification_prompt(), &image)?;
        let classification = normalize_classification(&raw)?;
        tracing::info!(
            domain = ?classification.domain,
            rationale = classification.rationale.as_deref().unwrap_or(""),
            "Classification complete"
        );

        if let Some((title, reason)) = classification.domain.rejection() {
            return Ok(RunOutcome::Rejected {
                domain: classification.domain,
                title: title.to_string(),
                reason: reason.to_string(),
                rationale: classification.rationale,
            });
        }

        // Stage 2
        self.transition(RunState::Branching);
        self.transition(stage_state(mode));
        let result = match mode {
            RunMode::Analyze => {
                let raw = self.client.generate(
                    &credential,
                    &build_single_item_prompt(context),
                    &image,
                )?;
                RunResult::Single(normalize_single_item(&raw)?)
            }
            RunMode::Compare => {
                let raw = self.client.generate(
                    &credential,
                    &build_comparison_prompt(context),
                    &image,
                )?;
                RunResult::Comparison(normalize_comparison(&raw)?)
            }
        };

        let entry = JournalEntry::new(context, result);
        self.journal.append(entry.clone());
        Ok(RunOutcome::Succeeded(entry))
    }

    /// In-memory key first, then the store (cached on success).
    fn resolve_credential(&self) -> Option<String> {
        let mut held = lock(&self.credential);
        if held.is_none() {
            *held = self.credentials.load();
        }
        held.clone()
    }

    fn finish(&self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Succeeded(entry) => {
                tracing::info!(entry_id = %entry.id, mode = %entry.mode, "Run succeeded")
            }
            RunOutcome::Rejected { domain, .. } => {
                tracing::info!(domain = ?domain, "Image rejected by classifier")
            }
            RunOutcome::Failed(e) => tracing::warn!(error = %e, "Run failed"),
        }
        self.transition(outcome.state());
    }

    fn transition(&self, next: RunState) {
        *lock(&self.state) = next;
        tracing::debug!(state = ?next, "Run state");
        self.observer.on_state(next);
    }
}

fn stage_state(mode: RunMode) -> RunState {
    match mode {
        RunMode::Analyze => RunState::Analyzing,
        RunMode::Compare => RunState::Comparing,
    }
}
