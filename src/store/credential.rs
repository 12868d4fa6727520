//! Non-confidential local storage for the inference API key.
//!
//! The key is base64-encoded before it is written. That only keeps it from
//! being read at a glance: anyone with access to the store can decode it.
//! Nothing here is encryption.

use std::sync::Arc;

use base64::Engine as _;

use super::{KeyValueStore, StoreError, CREDENTIAL_KEY};

pub struct NonConfidentialCredentialStore {
    store: Arc<dyn KeyValueStore + Send + Sync>,
}

impl NonConfidentialCredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Save a trimmed key. Blank keys are ignored and return `Ok(false)`.
    pub fn save(&self, credential: &str) -> Result<bool, StoreError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Ok(false);
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(credential);
        self.store.set(CREDENTIAL_KEY, &encoded)?;
        Ok(true)
    }

    /// Saved key, if any. Unreadable or undecodable values count as absent.
    pub fn load(&self) -> Option<String> {
        let encoded = match self.store.get(CREDENTIAL_KEY) {
            Ok(Some(encoded)) => encoded,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read saved API key");
                return None;
            }
        };
        match decode(&encoded) {
            Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Saved API key is corrupt, ignoring it");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(CREDENTIAL_KEY)
    }
}

fn decode(encoded: &str) -> Result<String, StoreError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn vault() -> (Arc<MemoryStore>, NonConfidentialCredentialStore) {
        let store = Arc::new(MemoryStore::new());
        let vault = NonConfidentialCredentialStore::new(store.clone());
        (store, vault)
    }

    #[test]
    fn save_and_load() {
        let (_, vault) = vault();
        assert!(vault.save("  AIzaSyExample  ").unwrap());
        assert_eq!(vault.load().as_deref(), Some("AIzaSyExample"));
    }

    #[test]
    fn stored_value_is_base64_not_plain() {
        let (store, vault) = vault();
        vault.save("AIzaSyExample").unwrap();
        let raw = store.get(CREDENTIAL_KEY).unwrap().unwrap();
        assert_ne!(raw, "AIzaSyExample");
        assert_eq!(raw, "QUl6YVN5RXhhbXBsZQ==");
    }

    #[test]
    fn blank_key_is_not_saved() {
        let (store, vault) = vault();
        assert!(!vault.save("   ").unwrap());
        assert_eq!(store.get(CREDENTIAL_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_value_loads_as_none() {
        let (store, vault) = vault();
        store.set(CREDENTIAL_KEY, "%%% not base64").unwrap();
        assert_eq!(vault.load(), None);
    }

    #[test]
    fn clear_removes_key() {
        let (_, vault) = vault();
        vault.save("k").unwrap();
        vault.clear().unwrap();
        assert_eq!(vault.load(), None);
    }
}
