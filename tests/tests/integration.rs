//! End-to-end exercises against the assembled [`GatewayServer`] router,
//! driven through `tower::Service::oneshot` rather than a bound TCP socket.

use action_gateway::invoke::EchoInvoker;
use action_gateway::stores::{InMemoryEntityStore, InMemoryIdentityStore};
use action_gateway::{GatewayServer, GatewayServerConfig};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use gateway_kernel::gateway::Action;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn echo_action(namespace: &str, package: &str, name: &str) -> Action {
    let mut action = Action::new(namespace, package, name);
    action.annotations.insert("web-export".to_string(), serde_json::json!(true));
    action
}

async fn test_server(action: Action) -> axum::Router {
    let identity_store = Arc::new(InMemoryIdentityStore::new());
    identity_store
        .register(gateway_kernel::gateway::Identity::new(
            action.namespace.clone(),
            format!("{}-subject", action.namespace),
            gateway_kernel::gateway::AuthKey {
                uuid: "test-uuid".to_string(),
                secret: "test-secret".to_string(),
            },
        ))
        .await;
    let entity_store = Arc::new(InMemoryEntityStore::new());
    entity_store.register_action(action).await;

    let server = GatewayServer::new(
        GatewayServerConfig::default(),
        identity_store,
        entity_store,
        Arc::new(EchoInvoker),
    );
    server.into_router()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let router = test_server(echo_action("guest", "default", "hello")).await;
    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn exported_action_invoked_with_json_extension_echoes_query_params() {
    let router = test_server(echo_action("guest", "default", "hello")).await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/web/guest/default/hello.json?name=world")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "world");
    assert_eq!(body["__ow_method"], "get");
}

#[tokio::test]
async fn unexported_action_returns_404() {
    let mut action = Action::new("guest", "default", "hidden");
    action.annotations.remove("web-export");
    let router = test_server(action).await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/web/guest/default/hidden.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_namespace_returns_404() {
    let router = test_server(echo_action("guest", "default", "hello")).await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/web/ghost/default/hello.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn body_field_colliding_with_reserved_key_is_rejected() {
    let router = test_server(echo_action("guest", "default", "hello")).await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/web/guest/default/hello.json")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"__ow_method": "put"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn experimental_route_injects_meta_prefixed_keys() {
    let router = test_server(echo_action("guest", "default", "hello")).await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/experimental/web/guest/default/hello.json?name=world")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "world");
    assert_eq!(body["__ow_meta_verb"], "get");
    assert!(body.get("__ow_method").is_none());
}

#[tokio::test]
async fn experimental_route_without_extension_is_rejected() {
    let router = test_server(echo_action("guest", "default", "hello")).await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/experimental/web/guest/default/hello")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}
