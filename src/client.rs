//! Cloud client capability surface and its REST implementation.
//!
//! The handler only ever talks to [`VertexOps`], a narrow trait covering the
//! five calls the workflow needs. [`GoogleVertexClient`] implements it over
//! the Vertex AI REST surface; tests substitute their own implementation.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::{EnvTokenProvider, TokenProvider, vertex_base_url};
use crate::error::VertexError;
use crate::table::Table;

/// A model resource, looked up by display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Full resource name, e.g. `projects/p/locations/l/models/123`.
    pub name: String,
    pub display_name: String,
}

/// An endpoint resource a model is served from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Full resource name, e.g. `projects/p/locations/l/endpoints/456`.
    pub name: String,
    pub display_name: String,
}

/// Raw prediction payload returned by an endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Predictions {
    #[serde(default)]
    pub predictions: Vec<Value>,
}

/// The cloud calls the create/predict workflow consumes.
#[async_trait]
pub trait VertexOps: Send + Sync {
    /// Find a model by display name. Display names are not unique; the first
    /// exact match wins.
    async fn model_by_display_name(&self, display_name: &str)
    -> Result<Option<Model>, VertexError>;

    /// Find an endpoint by display name.
    async fn endpoint_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<Endpoint>, VertexError>;

    /// Deploy a model to a freshly created endpoint. Long-running; blocks
    /// until the cloud side answers.
    async fn deploy_model(&self, model: &Model) -> Result<Endpoint, VertexError>;

    /// Change an endpoint's display name.
    async fn rename_endpoint(
        &self,
        endpoint: &Endpoint,
        display_name: &str,
    ) -> Result<Endpoint, VertexError>;

    /// Run prediction on the endpoint with the given display name.
    async fn predict(
        &self,
        endpoint_name: &str,
        rows: &Table,
        custom_model: bool,
    ) -> Result<Predictions, VertexError>;
}

/// Builds a fresh client per handler call from the credentials path and the
/// opaque args blob.
pub trait VertexClientFactory: Send + Sync {
    fn connect(
        &self,
        service_key_path: &Path,
        vertex_args: &Value,
    ) -> Result<Arc<dyn VertexOps>, VertexError>;
}

/// Factory producing [`GoogleVertexClient`]s.
#[derive(Debug, Clone, Default)]
pub struct GoogleVertexFactory;

impl VertexClientFactory for GoogleVertexFactory {
    fn connect(
        &self,
        service_key_path: &Path,
        vertex_args: &Value,
    ) -> Result<Arc<dyn VertexOps>, VertexError> {
        Ok(Arc::new(GoogleVertexClient::from_args(
            service_key_path,
            vertex_args,
        )?))
    }
}

/// Config for the REST client.
#[derive(Clone)]
pub struct GoogleVertexConfig {
    /// Base URL, typically
    /// `https://{location}-aiplatform.googleapis.com/v1/projects/{p}/locations/{l}`.
    pub base_url: String,
    /// Credentials file the token provider may read.
    pub service_key_path: PathBuf,
    /// Bearer token source injected into every request.
    pub token_provider: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for GoogleVertexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleVertexConfig")
            .field("base_url", &self.base_url)
            .field("service_key_path", &self.service_key_path)
            .finish()
    }
}

/// Vertex AI REST client.
#[derive(Debug, Clone)]
pub struct GoogleVertexClient {
    http_client: HttpClient,
    config: GoogleVertexConfig,
}

impl GoogleVertexClient {
    pub fn new(config: GoogleVertexConfig, http_client: HttpClient) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Build a client from the credentials path and the args blob. The blob
    /// must carry `project` and `location`; `base_url` overrides the derived
    /// URL (mock servers, private endpoints). Auth defaults to
    /// [`EnvTokenProvider`].
    pub fn from_args(
        service_key_path: impl Into<PathBuf>,
        vertex_args: &Value,
    ) -> Result<Self, VertexError> {
        let base_url = match vertex_args.get("base_url").and_then(Value::as_str) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let project = str_field(vertex_args, "project")?;
                let location = str_field(vertex_args, "location")?;
                vertex_base_url(project, location)
            }
        };
        Ok(Self::new(
            GoogleVertexConfig {
                base_url,
                service_key_path: service_key_path.into(),
                token_provider: Arc::new(EnvTokenProvider),
            },
            HttpClient::new(),
        ))
    }

    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.config.token_provider = provider;
        self
    }

    pub fn config(&self) -> &GoogleVertexConfig {
        &self.config
    }

    async fn send_json(&self, req: reqwest::RequestBuilder) -> Result<Value, VertexError> {
        let token = self.config.token_provider.token().await?;
        let resp = req.bearer_auth(token).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.get("error")?
                        .get("message")?
                        .as_str()
                        .map(str::to_string)
                })
                .unwrap_or(text);
            return Err(VertexError::ApiError {
                code: status.as_u16(),
                message,
            });
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| VertexError::ParseError(e.to_string()))
    }

    async fn get(&self, url: String) -> Result<Value, VertexError> {
        tracing::debug!(target: "vertex_adapter::http", %url, "GET");
        self.send_json(self.http_client.get(&url)).await
    }

    async fn post(&self, url: String, body: &Value) -> Result<Value, VertexError> {
        tracing::debug!(target: "vertex_adapter::http", %url, "POST");
        self.send_json(self.http_client.post(&url).json(body)).await
    }

    async fn patch(&self, url: String, body: &Value) -> Result<Value, VertexError> {
        tracing::debug!(target: "vertex_adapter::http", %url, "PATCH");
        self.send_json(self.http_client.patch(&url).json(body))
            .await
    }
}

fn str_field<'a>(args: &'a Value, key: &str) -> Result<&'a str, VertexError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            VertexError::ConfigurationError(format!(
                "Vertex args must provide a non-empty `{key}`"
            ))
        })
}

/// Trailing id of a full resource name.
fn resource_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, VertexError> {
    serde_json::from_value(value).map_err(|e| VertexError::ParseError(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<Model>,
}

#[derive(Debug, Default, Deserialize)]
struct EndpointList {
    #[serde(default)]
    endpoints: Vec<Endpoint>,
}

#[async_trait]
impl VertexOps for GoogleVertexClient {
    async fn model_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<Model>, VertexError> {
        let filter = format!("display_name=\"{display_name}\"");
        let url = format!(
            "{}/models?filter={}",
            self.config.base_url,
            urlencoding::encode(&filter)
        );
        let body = self.get(url).await?;
        if body.is_null() {
            return Ok(None);
        }
        let listed: ModelList = parse(body)?;
        Ok(listed
            .models
            .into_iter()
            .find(|m| m.display_name == display_name))
    }

    async fn endpoint_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<Endpoint>, VertexError> {
        let filter = format!("display_name=\"{display_name}\"");
        let url = format!(
            "{}/endpoints?filter={}",
            self.config.base_url,
            urlencoding::encode(&filter)
        );
        let body = self.get(url).await?;
        if body.is_null() {
            return Ok(None);
        }
        let listed: EndpointList = parse(body)?;
        Ok(listed
            .endpoints
            .into_iter()
            .find(|e| e.display_name == display_name))
    }

    async fn deploy_model(&self, model: &Model) -> Result<Endpoint, VertexError> {
        let body = self
            .post(
                format!("{}/endpoints", self.config.base_url),
                &json!({ "displayName": model.display_name }),
            )
            .await?;
        // Create may answer with the resource directly or wrapped in a done
        // operation's `response` field.
        let resource = body.get("response").cloned().unwrap_or(body);
        let endpoint: Endpoint = parse(resource)?;

        self.post(
            format!(
                "{}/endpoints/{}:deployModel",
                self.config.base_url,
                resource_id(&endpoint.name)
            ),
            &json!({
                "deployedModel": {
                    "model": model.name,
                    "displayName": model.display_name,
                    "automaticResources": { "minReplicaCount": 1, "maxReplicaCount": 1 },
                }
            }),
        )
        .await?;
        Ok(endpoint)
    }

    async fn rename_endpoint(
        &self,
        endpoint: &Endpoint,
        display_name: &str,
    ) -> Result<Endpoint, VertexError> {
        let url = format!(
            "{}/endpoints/{}?updateMask=displayName",
            self.config.base_url,
            resource_id(&endpoint.name)
        );
        let body = self
            .patch(url, &json!({ "displayName": display_name }))
            .await?;
        parse(body)
    }

    async fn predict(
        &self,
        endpoint_name: &str,
        rows: &Table,
        custom_model: bool,
    ) -> Result<Predictions, VertexError> {
        let endpoint = self
            .endpoint_by_display_name(endpoint_name)
            .await?
            .ok_or_else(|| VertexError::EndpointNotFound(endpoint_name.to_string()))?;
        // Custom containers take untyped value rows, AutoML-style models
        // take one object per row.
        let instances = if custom_model {
            rows.to_value_rows()
        } else {
            rows.to_instances()
        };
        let body = self
            .post(
                format!(
                    "{}/endpoints/{}:predict",
                    self.config.base_url,
                    resource_id(&endpoint.name)
                ),
                &json!({ "instances": instances }),
            )
            .await?;
        parse(body)
    }
}
