use tracing::{debug, warn};

use crate::models::{Language, Settings, Transaction};
use crate::storage::{KeyValueStore, StorageError, LANGUAGE_KEY, SETTINGS_KEY, TRANSACTIONS_KEY};

/// Typed access to the three persisted values. Loads never fail: anything
/// missing or unreadable degrades to a default.
pub struct Store<K: KeyValueStore> {
    backend: K
}

impl<K: KeyValueStore> Store<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// `None` when no list was ever saved. A corrupt payload loads as an empty list.
    pub fn load_transactions(&self) -> Option<Vec<Transaction>> {
        let payload = match self.backend.get(TRANSACTIONS_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(error) => {
                warn!("{error}; starting with an empty list");
                return Some(Vec::new());
            }
        };

        match serde_json::from_str::<Vec<Transaction>>(&payload) {
            Ok(transactions) => {
                debug!("Loaded {} transactions", transactions.len());
                Some(transactions)
            }
            Err(error) => {
                warn!("Data corruption, resetting: {error}");
                Some(Vec::new())
            }
        }
    }

    pub fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(transactions)
            .map_err(|error| StorageError::serialize(TRANSACTIONS_KEY, error))?;

        self.backend.set(TRANSACTIONS_KEY, &payload)
    }

    pub fn load_language(&self) -> Language {
        match self.backend.get(LANGUAGE_KEY) {
            Ok(Some(code)) => code.trim().trim_matches('"').parse().unwrap_or_else(|error| {
                warn!("{error}; falling back to English");
                Language::default()
            }),
            Ok(None) => Language::default(),
            Err(error) => {
                warn!("{error}");
                Language::default()
            }
        }
    }

    pub fn save_language(&self, language: Language) -> Result<(), StorageError> {
        self.backend.set(LANGUAGE_KEY, language.code())
    }

    pub fn load_settings(&self) -> Settings {
        match self.backend.get(SETTINGS_KEY) {
            Ok(Some(payload)) => serde_json::from_str(&payload).unwrap_or_else(|error| {
                warn!("Unreadable settings, using defaults: {error}");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(error) => {
                warn!("{error}");
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let payload = serde_json::to_string(settings)
            .map_err(|error| StorageError::serialize(SETTINGS_KEY, error))?;

        self.backend.set(SETTINGS_KEY, &payload)
    }
}
