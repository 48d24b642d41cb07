//! Host key/value storage seam.
//!
//! The host platform owns a per-model persistent store; the adapter only
//! needs `get`/`set` of JSON values against it. `MemoryStorage` backs tests
//! and in-process embedding hosts.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::VertexError;

/// Key under which the deployment record is persisted.
pub const PREDICT_ARGS_KEY: &str = "predict_args";
/// Key under which the auxiliary args blob is persisted verbatim.
pub const VERTEX_ARGS_KEY: &str = "vertex_args";

/// Per-model key/value storage supplied by the host.
pub trait ModelStorage: Send + Sync {
    fn json_set(&self, key: &str, value: &Value) -> Result<(), VertexError>;
    fn json_get(&self, key: &str) -> Result<Option<Value>, VertexError>;
}

/// In-process storage backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStorage for MemoryStorage {
    fn json_set(&self, key: &str, value: &Value) -> Result<(), VertexError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| VertexError::StorageError("storage mutex poisoned".to_string()))?;
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn json_get(&self, key: &str) -> Result<Option<Value>, VertexError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| VertexError::StorageError("storage mutex poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }
}
