//! Scan commands: `analyze`, `compare` and `demo`.

use std::io::Write;
use std::path::Path;

use super::{Reply, EXIT_REJECTED};
use crate::catalog::AnalysisContext;
use crate::core_state::CoreState;
use crate::pipeline::{ImagePayload, RunMode, RunObserver, RunOutcome, RunState};
use crate::render;

/// Prints loading messages to stderr so stdout stays clean for results.
pub struct StderrObserver;

impl RunObserver for StderrObserver {
    fn on_state(&self, state: RunState) {
        if let Some(message) = render::state_message(state) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{message}");
        }
    }
}

/// Load the screenshot and run both stages for the chosen action.
pub fn scan_image(
    state: &CoreState,
    image: &Path,
    mode: RunMode,
    context: &AnalysisContext,
    json: bool,
) -> Result<Reply, String> {
    let payload = ImagePayload::from_path(image).map_err(|e| e.to_string())?;
    let orchestrator = state.orchestrator();
    orchestrator.set_image(payload);

    let outcome = orchestrator.run(mode, context);
    orchestrator.clear_image();
    Ok(reply_for(&outcome, json))
}

/// Canned result, no key or network needed.
pub fn demo(
    state: &CoreState,
    mode: RunMode,
    context: &AnalysisContext,
    json: bool,
) -> Result<Reply, String> {
    let outcome = state.orchestrator().run_demo(mode, context);
    Ok(reply_for(&outcome, json))
}

fn reply_for(outcome: &RunOutcome, json: bool) -> Reply {
    let text = if json {
        render::outcome_json(outcome)
    } else {
        render::outcome_text(outcome)
    };
    let code = match outcome {
        RunOutcome::Succeeded(_) => 0,
        RunOutcome::Rejected { .. } => EXIT_REJECTED,
        RunOutcome::Failed(_) => 1,
    };
    Reply { text, code }
}
