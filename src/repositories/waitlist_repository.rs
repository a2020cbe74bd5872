use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::error::StorageError;
use crate::models::waitlist_models::{WaitlistEntry, WAITLIST_STORAGE_KEY};
use crate::repositories::local_storage::LocalStorage;

/// Append-only waitlist kept as one JSON array under a single storage key.
pub struct WaitlistRepository {
    storage: Arc<dyn LocalStorage>,
    key: String,
    // Held across read-modify-write so overlapping appends don't drop entries
    append_lock: Mutex<()>,
}

impl WaitlistRepository {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self::with_key(storage, WAITLIST_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stored items as raw JSON. Missing, unreadable or corrupt data reads
    /// as an empty list.
    fn load_raw(&self) -> Vec<Value> {
        let stored = match self.storage.get_item(&self.key) {
            Ok(Some(stored)) => stored,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read {} from local storage, starting empty: {}", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&stored) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                tracing::warn!("Stored {} is not a list ({}), starting empty", self.key, json_kind(&other));
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Stored {} is not valid JSON, starting empty: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Well-formed entries in submission order.
    pub fn entries(&self) -> Vec<WaitlistEntry> {
        self.load_raw()
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }

    /// Appends `entry` and writes the whole list back. Items this version
    /// cannot parse are kept as they are. Returns the new list length.
    pub fn append(&self, entry: &WaitlistEntry) -> Result<usize, StorageError> {
        let _guard = self.append_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load_raw();
        items.push(serde_json::to_value(entry)?);
        let encoded = serde_json::to_string(&items)?;
        self.storage.set_item(&self.key, &encoded)?;
        Ok(items.len())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
