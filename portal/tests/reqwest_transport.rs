//! Route functions over the reqwest transport against a mock server.

use std::time::Duration;

use portal::{
    AuthLocation, Authentication, CallInput, Client, ClientConfig, OnHttpError, Payload,
    PortalError, RequestConfig, RestMethod, RouteSpec, TransportError,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::with_reqwest(ClientConfig::new(server.uri()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_get_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/_doc/1"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "1",
            "found": true,
        })))
        .mount(&server)
        .await;

    let route = client_for(&server)
        .route(RouteSpec::new("/:index:/_doc/:id:"))
        .unwrap();
    let response = route
        .call(CallInput::new().positional([json!("books"), json!(1)]))
        .await
        .unwrap();

    assert_eq!(response.status.code, Some(200));
    assert_eq!(response.status.word.as_deref(), Some("OK"));
    assert_eq!(response.body.as_json().unwrap()["found"], json!(true));
}

#[tokio::test]
async fn test_post_json_body_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books/_doc"))
        .and(header("authorization", "Bearer secret"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "title": "Dune" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": "created" })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder(server.uri())
        .unwrap()
        .authentication(Authentication::bearer("secret"))
        .unwrap()
        .build();
    let client = Client::with_reqwest(config).unwrap();
    let route = client
        .route(RouteSpec::new("/:index:/_doc").method(RestMethod::Post))
        .unwrap();

    let response = route
        .call(
            CallInput::new()
                .positional([json!("books")])
                .payload(json!({ "title": "Dune" })),
        )
        .await
        .unwrap();
    assert_eq!(response.status.code, Some(201));
}

#[tokio::test]
async fn test_text_body_and_query_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(query_param("api_key", "k"))
        .and(query_param("refresh", "true"))
        .and(header("content-type", "application/x-ndjson"))
        .and(body_string("{\"index\":{}}\n{\"a\":1}\n"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let config = ClientConfig::builder(server.uri())
        .unwrap()
        .authentication(Authentication::key("api_key", "k", AuthLocation::Query))
        .unwrap()
        .build();
    let client = Client::with_reqwest(config).unwrap();
    let route = client
        .route(
            RouteSpec::new("/_bulk")
                .method(RestMethod::Post)
                .content_type("application/x-ndjson"),
        )
        .unwrap();

    let response = route
        .call(
            CallInput::new()
                .with_query("refresh", "true")
                .payload(Payload::ndjson([json!({ "index": {} }), json!({ "a": 1 })])),
        )
        .await
        .unwrap();
    assert_eq!(response.body.as_text(), Some("ok"));
}

#[tokio::test]
async fn test_rejected_status_carries_response() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such index"))
        .mount(&server)
        .await;

    let route = client_for(&server)
        .route(RouteSpec::new("/:index:").method(RestMethod::Delete))
        .unwrap();

    let err = route
        .call(CallInput::new().positional([json!("books")]))
        .await
        .unwrap_err();
    match err {
        PortalError::Transport(TransportError::HttpStatus {
            status,
            message,
            response,
        }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "no such index");
            assert_eq!(response.status.code, Some(404));
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }

    let resolve = RequestConfig::new().on_http_error(OnHttpError::Resolve);
    let response = route
        .call(
            CallInput::new()
                .positional([json!("books")])
                .overrides(resolve),
        )
        .await
        .unwrap();
    assert_eq!(response.status.code, Some(404));
    assert_eq!(response.body.as_text(), Some("no such index"));
}

#[tokio::test]
async fn test_base_url_path_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client =
        Client::with_reqwest(ClientConfig::new(format!("{}/api/v1/", server.uri())).unwrap())
            .unwrap();
    let route = client.route(RouteSpec::new("/items")).unwrap();
    let response = route.call(CallInput::new()).await.unwrap();
    assert_eq!(response.body.as_json(), Some(&json!([])));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let route = client_for(&server).route(RouteSpec::new("/slow")).unwrap();
    let overrides = RequestConfig::new().timeout(Duration::from_millis(200));

    let err = route
        .call(CallInput::new().overrides(overrides))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Transport(TransportError::Timeout { duration_ms: 200 })
    ));
}

#[tokio::test]
async fn test_idempotent_request_is_retried_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let route = client_for(&server).route(RouteSpec::new("/flaky")).unwrap();
    let overrides = RequestConfig::new()
        .timeout(Duration::from_millis(100))
        .retries(2);

    let err = route
        .call(CallInput::new().overrides(overrides))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Transport(TransportError::Timeout { .. })
    ));
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(3));
}
