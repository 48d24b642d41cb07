//! Create-time arguments and the persisted deployment record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use crate::error::VertexError;

/// Section of the host invocation args that carries handler configuration.
pub const USING_KEY: &str = "using";

/// Arguments required by the create operation, taken from the invocation's
/// `using` section. `custom_model` defaults to false.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArgs {
    pub model_name: String,
    pub service_key_path: PathBuf,
    pub vertex_args_path: PathBuf,
    #[serde(default)]
    pub custom_model: bool,
}

impl CreateArgs {
    /// Parse and validate the `using` section of an invocation args value.
    pub fn from_invocation(args: &Value) -> Result<Self, VertexError> {
        let using = args.get(USING_KEY).ok_or_else(|| {
            VertexError::ConfigurationError(
                "Must provide USING arguments for this handler".to_string(),
            )
        })?;
        serde_json::from_value(using.clone())
            .map_err(|e| VertexError::ConfigurationError(format!("Invalid USING arguments: {e}")))
    }

    /// Load the auxiliary args blob. Its contents are opaque to the handler
    /// and forwarded to the client as-is.
    pub fn load_vertex_args(&self) -> Result<Value, VertexError> {
        let content = fs::read_to_string(&self.vertex_args_path).map_err(|e| {
            VertexError::ConfigurationError(format!(
                "Failed to read vertex args file {}: {}",
                self.vertex_args_path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            VertexError::ConfigurationError(format!(
                "Invalid JSON in vertex args file {}: {}",
                self.vertex_args_path.display(),
                e
            ))
        })
    }
}

/// Record written at create time and read back at predict time. Only ever
/// rewritten whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictArgs {
    pub endpoint_name: String,
    pub custom_model: bool,
    pub service_key_path: PathBuf,
}
