//! Scan journal commands.
//!
//! - `list`: every entry, newest first
//! - `show`: one entry by id (full id or unique prefix)
//! - `remove`: delete one entry
//! - `clear`: delete everything

use super::Reply;
use crate::core_state::CoreState;
use crate::journal::JournalEntry;
use crate::render;
use crate::share::share_text;

pub fn list_entries(state: &CoreState, json: bool) -> Reply {
    let entries = state.orchestrator().journal().list();
    if json {
        Reply::ok(render::to_json(true, &entries))
    } else {
        Reply::ok(render::journal_list_text(&entries))
    }
}

/// Full result for one entry. `share` prints the plain-text export instead.
pub fn show_entry(state: &CoreState, id: &str, share: bool, json: bool) -> Result<Reply, String> {
    let entry = resolve(state, id)?;
    let text = if json {
        render::to_json(true, &entry)
    } else if share {
        share_text(&entry.result)
    } else {
        render::journal_entry_text(&entry)
    };
    Ok(Reply::ok(text))
}

pub fn remove_entry(state: &CoreState, id: &str, json: bool) -> Result<Reply, String> {
    let entry = resolve(state, id)?;
    state.orchestrator().journal().remove(&entry.id);
    tracing::info!(entry_id = %entry.id, "Journal entry removed");
    Ok(if json {
        Reply::ok(render::to_json(true, serde_json::json!({ "removed": entry.id })))
    } else {
        Reply::ok(format!("Removed {}\n", entry.id))
    })
}

pub fn clear_entries(state: &CoreState, json: bool) -> Reply {
    let journal = state.orchestrator().journal();
    let count = journal.len();
    journal.clear();
    tracing::info!(count, "Journal cleared");
    if json {
        Reply::ok(render::to_json(true, serde_json::json!({ "cleared": count })))
    } else {
        Reply::ok(format!("Cleared {count} journal entries\n"))
    }
}

/// Exact id first, then a unique prefix (the list view shows 8 characters).
fn resolve(state: &CoreState, id: &str) -> Result<JournalEntry, String> {
    let id = id.trim();
    if id.is_empty() {
        return Err("Entry id is required".into());
    }
    let journal = state.orchestrator().journal();
    if let Some(entry) = journal.get(id) {
        return Ok(entry);
    }
    let mut matches = journal
        .list()
        .into_iter()
        .filter(|e| e.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry),
        (Some(_), Some(_)) => Err(format!("Entry id '{id}' is ambiguous")),
        (None, _) => Err(format!("No journal entry with id '{id}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AnalysisContext;
    use crate::pipeline::{MockInferenceClient, NoopObserver, RunMode, RunOutcome};
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn state() -> CoreState {
        CoreState::new(
            Arc::new(MockInferenceClient::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(NoopObserver),
        )
        .with_demo_delay(Duration::ZERO)
    }

    fn demo_entry(state: &CoreState, mode: RunMode) -> JournalEntry {
        match state
            .orchestrator()
            .run_demo(mode, &AnalysisContext::default())
        {
            RunOutcome::Succeeded(entry) => entry,
            other => panic!("demo failed: {other:?}"),
        }
    }

    #[test]
    fn list_shows_entries() {
        let state = state();
        assert_eq!(list_entries(&state, false).text, "Journal is empty.\n");
        demo_entry(&state, RunMode::Analyze);
        let reply = list_entries(&state, true);
        let v: serde_json::Value = serde_json::from_str(&reply.text).unwrap();
        assert_eq!(v["data"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn show_by_prefix_and_share() {
        let state = state();
        let entry = demo_entry(&state, RunMode::Analyze);
        let reply = show_entry(&state, &entry.id[..8], false, false).unwrap();
        assert!(reply.text.contains(&entry.id));
        let shared = show_entry(&state, &entry.id, true, false).unwrap();
        assert!(shared.text.starts_with("Horadric verdict"));
    }

    #[test]
    fn show_unknown_id_errors() {
        let state = state();
        let err = show_entry(&state, "deadbeef", false, false).unwrap_err();
        assert!(err.contains("No journal entry"));
        assert!(show_entry(&state, "  ", false, false).is_err());
    }

    #[test]
    fn remove_and_clear() {
        let state = state();
        let a = demo_entry(&state, RunMode::Analyze);
        demo_entry(&state, RunMode::Compare);
        demo_entry(&state, RunMode::Compare);

        remove_entry(&state, &a.id, false).unwrap();
        assert_eq!(state.orchestrator().journal().len(), 2);
        assert!(remove_entry(&state, &a.id, false).is_err());

        let reply = clear_entries(&state, false);
        assert_eq!(reply.text, "Cleared 2 journal entries\n");
        assert!(state.orchestrator().journal().is_empty());
    }
}
