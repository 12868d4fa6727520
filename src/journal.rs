//! Scan journal: history of successful runs.
//!
//! Newest first, capped at `JOURNAL_CAPACITY`. The in-memory list is the
//! source of truth for the process; every mutation is mirrored to the
//! key-value store on a best-effort basis (failures are logged, never
//! returned).

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::AnalysisContext;
use crate::config::JOURNAL_CAPACITY;
use crate::pipeline::{RunMode, RunResult};
use crate::store::{KeyValueStore, JOURNAL_KEY};

/// Class/build a scan was made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalContext {
    pub category: String,
    pub sub_category: String,
}

impl From<&AnalysisContext> for JournalContext {
    fn from(ctx: &AnalysisContext) -> Self {
        Self {
            category: ctx.category().to_string(),
            sub_category: ctx.sub_category().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub mode: RunMode,
    pub timestamp: DateTime<Utc>,
    pub context: JournalContext,
    pub result: RunResult,
}

impl JournalEntry {
    /// New entry stamped now; `mode` follows the result kind.
    pub fn new(context: &AnalysisContext, result: RunResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            mode: result.mode(),
            timestamp: Utc::now(),
            context: context.into(),
            result,
        }
    }
}

pub struct Journal {
    store: Arc<dyn KeyValueStore + Send + Sync>,
    entries: Mutex<Vec<JournalEntry>>,
}

impl Journal {
    /// Load the persisted journal. Missing or corrupt data starts empty.
    pub fn load(store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        let entries = match store.get(JOURNAL_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<JournalEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(JOURNAL_CAPACITY);
                    entries
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stored journal is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored journal, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = entries.len(), "Journal loaded");
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<JournalEntry>> {
        // A poisoned journal still holds valid entries; keep using them.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Newest first.
    pub fn list(&self) -> Vec<JournalEntry> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<JournalEntry> {
        self.lock().iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Insert at the head and evict the oldest entries beyond capacity.
    pub fn append(&self, entry: JournalEntry) {
        let mut entries = self.lock();
        entries.insert(0, entry);
        entries.truncate(JOURNAL_CAPACITY);
        self.persist(&entries);
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;
        if removed {
            self.persist(&entries);
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        if let Err(e) = self.store.remove(JOURNAL_KEY) {
            tracing::warn!(error = %e, "Failed to clear stored journal");
        }
    }

    fn persist(&self, entries: &[JournalEntry]) {
        let serialized = match serde_json::to_string(entries) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize journal");
                return;
            }
        };
        if let Err(e) = self.store.set(JOURNAL_KEY, &serialized) {
            tracing::warn!(error = %e, count = entries.len(), "Failed to persist journal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::demo::{demo_comparison, demo_single_item};
    use crate::store::MemoryStore;

    fn entry(title: &str) -> JournalEntry {
        let mut item = demo_single_item();
        item.title = title.to_string();
        JournalEntry::new(&AnalysisContext::default(), RunResult::Single(item))
    }

    fn title_of(entry: &JournalEntry) -> &str {
        match &entry.result {
            RunResult::Single(item) => &item.title,
            RunResult::Comparison(cmp) => &cmp.item_a.title,
        }
    }

    #[test]
    fn append_is_newest_first() {
        let journal = Journal::load(Arc::new(MemoryStore::new()));
        journal.append(entry("first"));
        journal.append(entry("second"));
        let list = journal.list();
        assert_eq!(title_of(&list[0]), "second");
        assert_eq!(title_of(&list[1]), "first");
    }

    #[test]
    fn capacity_evicts_oldest() {
        let journal = Journal::load(Arc::new(MemoryStore::new()));
        let first = entry("call-1");
        let first_id = first.id.clone();
        journal.append(first);
        for i in 2..=51 {
            journal.append(entry(&format!("call-{i}")));
        }
        let list = journal.list();
        assert_eq!(list.len(), 50);
        assert!(journal.get(&first_id).is_none());
        assert_eq!(title_of(&list[0]), "call-51");
    }

    #[test]
    fn persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let journal = Journal::load(store.clone());
        journal.append(entry("kept"));
        journal.append(JournalEntry::new(
            &AnalysisContext::new("Rogue", "Rapid Fire").unwrap(),
            RunResult::Comparison(demo_comparison()),
        ));

        let reloaded = Journal::load(store);
        let list = reloaded.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].mode, RunMode::Compare);
        assert_eq!(list[0].context.category, "Rogue");
        assert_eq!(list[0].context.sub_category, "Rapid Fire");
        assert_eq!(list[1].mode, RunMode::Analyze);
        assert_eq!(list, journal.list());
    }

    #[test]
    fn remove_and_clear() {
        let store = Arc::new(MemoryStore::new());
        let journal = Journal::load(store.clone());
        let a = entry("a");
        let a_id = a.id.clone();
        journal.append(a);
        journal.append(entry("b"));

        assert!(journal.remove(&a_id));
        assert!(!journal.remove(&a_id));
        assert_eq!(journal.len(), 1);
        assert_eq!(Journal::load(store.clone()).len(), 1);

        journal.clear();
        assert!(journal.is_empty());
        assert!(Journal::load(store).is_empty());
    }

    #[test]
    fn quota_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let journal = Journal::load(store.clone());
        journal.append(entry("too big to store"));
        assert_eq!(journal.len(), 1);
        assert_eq!(store.get(JOURNAL_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_store_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(JOURNAL_KEY, "{not a list").unwrap();
        let journal = Journal::load(store);
        assert!(journal.is_empty());
    }

    #[test]
    fn timestamp_serializes_as_iso8601() {
        let e = entry("x");
        let json = serde_json::to_value(&e).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(json["mode"], "analyze");
    }
}
