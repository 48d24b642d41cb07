//! The create/predict workflow.

use serde_json::Value;
use std::sync::Arc;

use crate::client::{GoogleVertexFactory, VertexClientFactory};
use crate::config::{CreateArgs, PredictArgs};
use crate::error::VertexError;
use crate::storage::{ModelStorage, PREDICT_ARGS_KEY, VERTEX_ARGS_KEY};
use crate::table::{ROW_ID_COLUMN, Table};

/// Suffix appended to the model name to derive its endpoint's display name.
pub const ENDPOINT_SUFFIX: &str = "_endpoint";

/// Deterministic endpoint display name for a model name.
pub fn endpoint_name_for(model_name: &str) -> String {
    format!("{model_name}{ENDPOINT_SUFFIX}")
}

/// Adapter presenting a deployed Vertex AI model to the host platform.
///
/// A fresh cloud client is built per call through the factory; the only
/// state between calls lives in the host storage.
pub struct VertexHandler {
    storage: Arc<dyn ModelStorage>,
    factory: Arc<dyn VertexClientFactory>,
}

impl VertexHandler {
    /// Handler talking to the real Vertex REST surface.
    pub fn new(storage: Arc<dyn ModelStorage>) -> Self {
        Self::with_factory(storage, Arc::new(GoogleVertexFactory))
    }

    /// Handler with a substitute client factory, for tests and embedding.
    pub fn with_factory(
        storage: Arc<dyn ModelStorage>,
        factory: Arc<dyn VertexClientFactory>,
    ) -> Self {
        Self { storage, factory }
    }

    /// Ensure the named model is deployed to its endpoint and persist the
    /// deployment record.
    ///
    /// An already-existing endpoint named `<model_name>_endpoint` makes this
    /// a no-op on the cloud side. Otherwise the model is deployed to a new
    /// endpoint and the endpoint renamed; that deploy is long-running
    /// (~15 minutes for a small model) and blocks until finished.
    ///
    /// The existence check and the deploy are separate calls with no cloud
    /// lock; concurrent creates for the same model can each deploy an
    /// endpoint.
    ///
    /// `target` and `df` come from the host contract and are not used here.
    pub async fn create(
        &self,
        _target: Option<&str>,
        _df: Option<&Table>,
        args: &Value,
    ) -> Result<(), VertexError> {
        let create_args = CreateArgs::from_invocation(args)?;
        let vertex_args = create_args.load_vertex_args()?;
        let client = self
            .factory
            .connect(&create_args.service_key_path, &vertex_args)?;

        let model = client
            .model_by_display_name(&create_args.model_name)
            .await?
            .ok_or_else(|| VertexError::ModelNotFound(create_args.model_name.clone()))?;

        let endpoint_name = endpoint_name_for(&create_args.model_name);
        if client
            .endpoint_by_display_name(&endpoint_name)
            .await?
            .is_some()
        {
            tracing::info!("Endpoint {endpoint_name} already exists, skipping deployment");
        } else {
            tracing::info!("Starting deployment at {endpoint_name}");
            let endpoint = client.deploy_model(&model).await?;
            client.rename_endpoint(&endpoint, &endpoint_name).await?;
            tracing::info!("Endpoint {endpoint_name} deployed");
        }

        let predict_args = PredictArgs {
            endpoint_name,
            custom_model: create_args.custom_model,
            service_key_path: create_args.service_key_path,
        };
        self.storage
            .json_set(PREDICT_ARGS_KEY, &serde_json::to_value(&predict_args)?)?;
        self.storage.json_set(VERTEX_ARGS_KEY, &vertex_args)?;
        Ok(())
    }

    /// Predict by calling the persisted endpoint with the given rows.
    ///
    /// The reserved row-identifier column is stripped before the call. A
    /// custom model's raw values come back as a single `prediction` column;
    /// otherwise the response objects' fields become the output columns.
    pub async fn predict(&self, df: Table) -> Result<Table, VertexError> {
        let mut df = df;
        df.drop_column(ROW_ID_COLUMN);

        let predict_args: PredictArgs = match self.storage.json_get(PREDICT_ARGS_KEY)? {
            Some(value) => serde_json::from_value(value)?,
            None => return Err(VertexError::NotDeployed(PREDICT_ARGS_KEY.to_string())),
        };
        let vertex_args = self
            .storage
            .json_get(VERTEX_ARGS_KEY)?
            .ok_or_else(|| VertexError::NotDeployed(VERTEX_ARGS_KEY.to_string()))?;

        let client = self
            .factory
            .connect(&predict_args.service_key_path, &vertex_args)?;
        let results = client
            .predict(&predict_args.endpoint_name, &df, predict_args.custom_model)
            .await?;

        if predict_args.custom_model {
            Ok(Table::single_column("prediction", results.predictions))
        } else {
            Table::from_records(&results.predictions)
        }
    }
}
