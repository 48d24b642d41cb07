//! Mock API tests for the Vertex REST client.
//!
//! These use wiremock to stand in for the Vertex AI surface. Response shapes
//! follow the REST reference for `models.list`, `endpoints.*`, and
//! `endpoints:predict`.

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vertex_adapter::{
    Endpoint, GoogleVertexClient, Model, StaticTokenProvider, Table, VertexError, VertexOps,
};

const BASE_PATH: &str = "/v1/projects/p/locations/us-central1";

fn client(server: &MockServer) -> GoogleVertexClient {
    let args = json!({
        "project": "p",
        "location": "us-central1",
        "base_url": format!("{}{}", server.uri(), BASE_PATH),
    });
    GoogleVertexClient::from_args("/keys/sa.json", &args)
        .unwrap()
        .with_token_provider(Arc::new(StaticTokenProvider::new("test-token")))
}

fn sample_model() -> Model {
    Model {
        name: "projects/p/locations/us-central1/models/123".to_string(),
        display_name: "foo".to_string(),
    }
}

#[tokio::test]
async fn model_lookup_filters_by_display_name_and_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}/models")))
        .and(query_param("filter", "display_name=\"foo\""))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "projects/p/locations/us-central1/models/123", "displayName": "foo" }
            ]
        })))
        .mount(&server)
        .await;

    let model = client(&server)
        .model_by_display_name("foo")
        .await
        .unwrap()
        .expect("model found");
    assert_eq!(model, sample_model());
}

#[tokio::test]
async fn model_lookup_returns_none_on_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}/models")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(client(&server).model_by_display_name("foo").await.unwrap().is_none());
}

#[tokio::test]
async fn endpoint_lookup_requires_exact_display_name_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}/endpoints")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "endpoints": [
                { "name": "projects/p/locations/us-central1/endpoints/1", "displayName": "foo_endpoint_old" }
            ]
        })))
        .mount(&server)
        .await;

    let found = client(&server)
        .endpoint_by_display_name("foo_endpoint")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn deploy_creates_endpoint_then_deploys_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE_PATH}/endpoints")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "op/1",
            "done": true,
            "response": {
                "name": "projects/p/locations/us-central1/endpoints/9",
                "displayName": "foo"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE_PATH}/endpoints/9:deployModel")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let endpoint = client(&server).deploy_model(&sample_model()).await.unwrap();
    assert_eq!(endpoint.name, "projects/p/locations/us-central1/endpoints/9");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let deploy_body: serde_json::Value = requests[1].body_json().unwrap();
    assert_eq!(
        deploy_body["deployedModel"]["model"],
        "projects/p/locations/us-central1/models/123"
    );
}

#[tokio::test]
async fn rename_patches_display_name_with_update_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{BASE_PATH}/endpoints/9")))
        .and(query_param("updateMask", "displayName"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/p/locations/us-central1/endpoints/9",
            "displayName": "foo_endpoint"
        })))
        .mount(&server)
        .await;

    let endpoint = Endpoint {
        name: "projects/p/locations/us-central1/endpoints/9".to_string(),
        display_name: "foo".to_string(),
    };
    let renamed = client(&server)
        .rename_endpoint(&endpoint, "foo_endpoint")
        .await
        .unwrap();
    assert_eq!(renamed.display_name, "foo_endpoint");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body, json!({ "displayName": "foo_endpoint" }));
}

async fn mount_endpoint_lookup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}/endpoints")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "endpoints": [
                { "name": "projects/p/locations/us-central1/endpoints/9", "displayName": "foo_endpoint" }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn predict_sends_objects_for_standard_models() {
    let server = MockServer::start().await;
    mount_endpoint_lookup(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE_PATH}/endpoints/9:predict")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [ { "value": 1.0 } ]
        })))
        .mount(&server)
        .await;

    let mut rows = Table::new(["a", "b"]);
    rows.push_row(vec![json!(1), json!(2)]).unwrap();
    let results = client(&server)
        .predict("foo_endpoint", &rows, false)
        .await
        .unwrap();
    assert_eq!(results.predictions, vec![json!({ "value": 1.0 })]);

    let requests = server.received_requests().await.unwrap();
    let predict_body: serde_json::Value = requests.last().unwrap().body_json().unwrap();
    assert_eq!(predict_body["instances"], json!([{ "a": 1, "b": 2 }]));
}

#[tokio::test]
async fn predict_sends_value_rows_for_custom_models() {
    let server = MockServer::start().await;
    mount_endpoint_lookup(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE_PATH}/endpoints/9:predict")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [0.1, 0.2]
        })))
        .mount(&server)
        .await;

    let mut rows = Table::new(["a", "b"]);
    rows.push_row(vec![json!(1), json!(2)]).unwrap();
    let results = client(&server)
        .predict("foo_endpoint", &rows, true)
        .await
        .unwrap();
    assert_eq!(results.predictions, vec![json!(0.1), json!(0.2)]);

    let requests = server.received_requests().await.unwrap();
    let predict_body: serde_json::Value = requests.last().unwrap().body_json().unwrap();
    assert_eq!(predict_body["instances"], json!([[1, 2]]));
}

#[tokio::test]
async fn predict_fails_when_endpoint_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}/endpoints")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "endpoints": [] })))
        .mount(&server)
        .await;

    let err = client(&server)
        .predict("foo_endpoint", &Table::new(["a"]), false)
        .await
        .unwrap_err();
    assert!(matches!(err, VertexError::EndpointNotFound(name) if name == "foo_endpoint"));
}

#[tokio::test]
async fn api_errors_carry_status_and_google_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{BASE_PATH}/models")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .model_by_display_name("foo")
        .await
        .unwrap_err();
    match err {
        VertexError::ApiError { code, message } => {
            assert_eq!(code, 403);
            assert_eq!(message, "Permission denied");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}
