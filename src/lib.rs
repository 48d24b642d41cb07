//! vertex-adapter
//!
//! An adapter that lets a host ML platform treat a cloud-hosted Vertex AI
//! model as a locally managed one.
//!
//! This crate owns:
//! - the create/predict workflow ([`handler::VertexHandler`])
//! - the narrow cloud capability surface ([`client::VertexOps`]) and its
//!   REST implementation ([`client::GoogleVertexClient`])
//! - the tabular boundary between host rows and endpoint payloads
//!   ([`table::Table`])
//!
//! The host's key/value storage and the bearer-token source are consumed
//! behind traits ([`storage::ModelStorage`], [`auth::TokenProvider`]) so the
//! workflow is testable without network access.
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod storage;
pub mod table;

pub use auth::{EnvTokenProvider, StaticTokenProvider, TokenProvider, vertex_base_url};
pub use client::{
    Endpoint, GoogleVertexClient, GoogleVertexConfig, GoogleVertexFactory, Model, Predictions,
    VertexClientFactory, VertexOps,
};
pub use config::{CreateArgs, PredictArgs};
pub use error::VertexError;
pub use handler::{VertexHandler, endpoint_name_for};
pub use storage::{MemoryStorage, ModelStorage, PREDICT_ARGS_KEY, VERTEX_ARGS_KEY};
pub use table::{ROW_ID_COLUMN, Table};
