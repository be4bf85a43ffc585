//! Integration tests for HTTP handlers
#![allow(clippy::expect_used)]

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::TenantRegistryPort,
    services::{CallerIdentity, TenantResolver},
};
use async_trait::async_trait;
use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{Next, from_fn},
    response::Response,
};
use axum_test::TestServer;
use domain::{TenantId, TenantRecord};
use infrastructure::{AppConfig, AsyncDatabase, SqliteTenantRegistry, TenantDataSources};
use presentation_http::{routes::create_router, state::AppState};
use serde_json::Value;

const TENANT: HeaderName = HeaderName::from_static("tenant");

async fn state_with(registry: Arc<dyn TenantRegistryPort>) -> AppState {
    let config = AppConfig::default();
    let shared = AsyncDatabase::in_memory()
        .await
        .expect("Failed to open database");
    shared.migrate().await.expect("Failed to migrate");

    AppState {
        resolver: Arc::new(TenantResolver::new(
            Arc::clone(&registry),
            config.tenancy.resolution_config(config.environment),
        )),
        registry,
        data_sources: Arc::new(TenantDataSources::new(shared, &config.database)),
        config: Arc::new(config),
    }
}

async fn seeded_state() -> AppState {
    let db = AsyncDatabase::in_memory()
        .await
        .expect("Failed to open database");
    db.migrate().await.expect("Failed to migrate");
    let registry = SqliteTenantRegistry::new(db.pool().clone());
    for record in [
        TenantRecord::shared(TenantId::root(), "Root"),
        TenantRecord::shared(TenantId::new("acme"), "Acme"),
        TenantRecord::shared(TenantId::new("globex"), "Globex"),
        TenantRecord::dedicated(TenantId::new("initech"), "Initech", "sqlite::memory:"),
        TenantRecord::shared(TenantId::new("hooli"), "Hooli").deactivated(),
    ] {
        registry.upsert(&record).await.expect("Failed to seed tenant");
    }
    state_with(Arc::new(registry)).await
}

async fn create_test_server() -> TestServer {
    TestServer::new(create_router(seeded_state().await)).expect("Failed to create test server")
}

/// Stand-in for an authentication layer that publishes caller claims
async fn authenticate_as_initech(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(
        CallerIdentity::new()
            .with_claim("tenant", "initech")
            .with_claim("uid", "peter"),
    );
    next.run(request).await
}

struct UnavailableRegistry;

#[async_trait]
impl TenantRegistryPort for UnavailableRegistry {
    async fn find(&self, _id: &TenantId) -> Result<Option<TenantRecord>, ApplicationError> {
        Err(ApplicationError::Storage("registry offline".to_string()))
    }

    async fn list(&self) -> Result<Vec<TenantRecord>, ApplicationError> {
        Err(ApplicationError::Storage("registry offline".to_string()))
    }
}

#[tokio::test]
async fn health_needs_no_tenant() {
    let server = create_test_server().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ready_reports_database() {
    let server = create_test_server().await;

    let response = server.get("/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["database"], true);
    assert_eq!(body["dedicated_pools"], 0);
}

#[tokio::test]
async fn request_without_signal_gets_default_tenant() {
    let server = create_test_server().await;

    let response = server.get("/v1/tenant").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["tenantId"], "root");
    assert_eq!(body["dedicated"], false);
}

#[tokio::test]
async fn header_selects_tenant() {
    let server = create_test_server().await;

    let response = server
        .get("/v1/tenant")
        .add_header(TENANT, HeaderValue::from_static("acme"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["tenantId"], "acme");
}

#[tokio::test]
async fn unknown_tenant_is_forbidden() {
    let server = create_test_server().await;

    let response = server
        .get("/v1/tenant")
        .add_header(TENANT, HeaderValue::from_static("umbrella"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn inactive_tenant_is_forbidden() {
    let server = create_test_server().await;

    let response = server
        .get("/v1/tenant")
        .add_header(TENANT, HeaderValue::from_static("hooli"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn identity_claim_wins_over_header() {
    let app: Router = create_router(seeded_state().await).layer(from_fn(authenticate_as_initech));
    let server = TestServer::new(app).expect("Failed to create test server");

    let response = server
        .get("/v1/tenant")
        .add_header(TENANT, HeaderValue::from_static("acme"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["tenantId"], "initech");
    assert_eq!(body["dedicated"], true);
    assert_eq!(body["userId"], "peter");
}

#[tokio::test]
async fn root_lists_tenants_sorted_and_paged() {
    let server = create_test_server().await;

    let response = server.get("/v1/tenants?page=1&pageSize=2&sort=-Name").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["totalCount"], 5);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["hasNextPage"], true);
    assert_eq!(body["data"][0]["name"], "Root");
    assert_eq!(body["data"][1]["name"], "Initech");
    assert_eq!(body["data"][1]["dedicated"], true);
}

#[tokio::test]
async fn tenants_default_to_id_order() {
    let server = create_test_server().await;

    let response = server.get("/v1/tenants?page=2&pageSize=2").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let ids: Vec<&str> = body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["hooli", "initech"]);
    assert_eq!(body["hasPreviousPage"], true);
}

#[tokio::test]
async fn non_root_tenant_cannot_list_tenants() {
    let server = create_test_server().await;

    let response = server
        .get("/v1/tenants")
        .add_header(TENANT, HeaderValue::from_static("acme"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn oversized_page_is_rejected() {
    let server = create_test_server().await;

    let response = server.get("/v1/tenants?pageSize=500").await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn zero_page_is_rejected() {
    let server = create_test_server().await;

    let response = server.get("/v1/tenants?page=0").await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() {
    let server = create_test_server().await;

    let response = server.get("/v1/tenants?sort=Colour").await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn registry_failure_is_internal_error() {
    let state = state_with(Arc::new(UnavailableRegistry)).await;
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    let response = server.get("/v1/tenant").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "An internal error occurred");
    assert!(body.get("details").is_none());
}
