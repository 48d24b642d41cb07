//! Bearer token sources and Vertex URL helpers.
//!
//! Credential exchange is not this crate's business: callers hand the client
//! a [`TokenProvider`] and keep the mechanics (service-account signing, ADC,
//! metadata server) on their side of the seam.

use async_trait::async_trait;

use crate::error::VertexError;

/// Environment variable holding a pre-minted OAuth access token.
pub const GOOGLE_OAUTH_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Source of Bearer tokens for Vertex API calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, VertexError>;
}

/// Fixed token, mainly for tests and short-lived scripts.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String, VertexError> {
        Ok(self.token.clone())
    }
}

/// Reads `GOOGLE_OAUTH_ACCESS_TOKEN` on every call.
#[derive(Debug, Clone, Default)]
pub struct EnvTokenProvider;

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn token(&self) -> Result<String, VertexError> {
        match std::env::var(GOOGLE_OAUTH_TOKEN_ENV) {
            Ok(tok) if !tok.is_empty() => Ok(tok),
            _ => Err(VertexError::ConfigurationError(format!(
                "no access token: set {GOOGLE_OAUTH_TOKEN_ENV} or inject a TokenProvider"
            ))),
        }
    }
}

/// Build the Vertex AI regional base URL for a project and location.
///
/// `global` uses the location-less host.
pub fn vertex_base_url(project: &str, location: &str) -> String {
    let host = if location == "global" {
        "aiplatform.googleapis.com".to_string()
    } else {
        format!("{location}-aiplatform.googleapis.com")
    };
    format!("https://{host}/v1/projects/{project}/locations/{location}")
}
