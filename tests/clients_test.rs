//! Outbound API clients against mock servers.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitegen::config::{DatastoreConfig, DnsConfig, DomainMappingConfig};
use sitegen::dns::{CloudflareDns, DnsError, DnsProvider};
use sitegen::domains::{DomainError, DomainMapper, VercelDomains};
use sitegen::provision::Provisioned;
use sitegen::store::{NewSite, PostgrestStore, StoreError, TenantStore};

// =============================================================================
// Helpers
// =============================================================================

fn store(server: &MockServer) -> PostgrestStore {
    let config = DatastoreConfig {
        url: server.uri(),
        service_key: "service-key".into(),
        anon_key: Some("anon-key".into()),
        table: "sites".into(),
    };
    PostgrestStore::new(reqwest::Client::new(), &config)
}

fn dns(server: &MockServer) -> CloudflareDns {
    let config = DnsConfig {
        api_token: "cf-token".into(),
        zone_id: "zone1".into(),
        api_base: server.uri(),
    };
    CloudflareDns::new(reqwest::Client::new(), &config)
}

fn domains(server: &MockServer) -> VercelDomains {
    let config = DomainMappingConfig {
        api_token: "vc-token".into(),
        project_id: "prj_1".into(),
        api_base: server.uri(),
    };
    VercelDomains::new(reqwest::Client::new(), &config)
}

fn new_site() -> NewSite {
    NewSite {
        slug: "acme-plumbing".into(),
        business_name: "Acme Plumbing".into(),
        email: "hi@acme.test".into(),
        phone: "555-0100".into(),
        description: "Pipes".into(),
    }
}

fn row() -> serde_json::Value {
    json!({
        "slug": "acme-plumbing",
        "business_name": "Acme Plumbing",
        "email": "hi@acme.test",
        "phone": "555-0100",
        "description": "Pipes",
        "created_at": "2026-01-01T00:00:00Z"
    })
}

// =============================================================================
// Datastore
// =============================================================================

#[tokio::test]
async fn insert_sends_service_key_and_returns_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/sites"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({
            "slug": "acme-plumbing",
            "business_name": "Acme Plumbing",
            "email": "hi@acme.test",
            "phone": "555-0100",
            "description": "Pipes"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row()])))
        .expect(1)
        .mount(&server)
        .await;

    let site = store(&server).insert(&new_site()).await.unwrap();
    assert_eq!(site.slug, "acme-plumbing");
    assert_eq!(site.created_at.as_deref(), Some("2026-01-01T00:00:00Z"));
}

#[tokio::test]
async fn unique_violation_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"sites_slug_key\""
        })))
        .mount(&server)
        .await;

    let err = store(&server).insert(&new_site()).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }), "got {err:?}");
    assert_eq!(err.code(), Some("23505"));
}

#[tokio::test]
async fn other_datastore_errors_keep_their_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "PGRST204",
            "message": "Could not find the 'phone' column"
        })))
        .mount(&server)
        .await;

    let err = store(&server).insert(&new_site()).await.unwrap_err();
    assert_eq!(err.code(), Some("PGRST204"));
    assert_eq!(err.to_string(), "Could not find the 'phone' column");
}

#[tokio::test]
async fn rejected_key_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = store(&server).ping().await.unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized { status: 401 }));
}

#[tokio::test]
async fn lookup_filters_on_slug_with_read_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .and(query_param("slug", "eq.acme-plumbing"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/sites"))
        .and(query_param("slug", "eq.nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store(&server);
    let site = store.find_by_slug("acme-plumbing").await.unwrap().unwrap();
    assert_eq!(site.business_name, "Acme Plumbing");
    assert!(store.find_by_slug("nobody").await.unwrap().is_none());
}

// =============================================================================
// DNS
// =============================================================================

#[tokio::test]
async fn existing_record_is_detected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone1/dns_records"))
        .and(query_param("type", "CNAME"))
        .and(query_param("name", "acme.stonesystems.io"))
        .and(header("authorization", "Bearer cf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "result": [{ "id": "rec1", "name": "acme.stonesystems.io" }]
        })))
        .mount(&server)
        .await;

    assert!(dns(&server).cname_exists("acme.stonesystems.io").await.unwrap());
}

#[tokio::test]
async fn creates_cname_with_automatic_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone1/dns_records"))
        .and(body_json(json!({
            "type": "CNAME",
            "name": "acme.stonesystems.io",
            "content": "cname.vercel-dns.com",
            "ttl": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "result": { "id": "rec2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    dns(&server)
        .create_cname("acme.stonesystems.io", "cname.vercel-dns.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected_with_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone1/dns_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 81053, "message": "Record already exists." }],
            "result": null
        })))
        .mount(&server)
        .await;

    let err = dns(&server).create_cname("a.b.c", "t").await.unwrap_err();
    assert!(matches!(&err, DnsError::Rejected(msg) if msg == "Record already exists."));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn http_failures_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone1/dns_records"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = dns(&server).cname_exists("a.b.c").await.unwrap_err();
    assert_eq!(err.to_string(), "failed to check existing records: HTTP 503");
    assert!(err.is_transient());
}

// =============================================================================
// Domain mapping
// =============================================================================

#[tokio::test]
async fn maps_domain_onto_project() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v10/projects/prj_1/domains"))
        .and(header("authorization", "Bearer vc-token"))
        .and(body_json(json!({ "name": "acme.stonesystems.io" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "acme.stonesystems.io" })))
        .expect(1)
        .mount(&server)
        .await;

    let done = domains(&server).add_domain("acme.stonesystems.io").await.unwrap();
    assert_eq!(done, Provisioned::Created);
}

#[tokio::test]
async fn domain_in_use_counts_as_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v10/projects/prj_1/domains"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "domain_already_in_use", "message": "in use" }
        })))
        .mount(&server)
        .await;

    let done = domains(&server).add_domain("acme.stonesystems.io").await.unwrap();
    assert_eq!(done, Provisioned::AlreadyPresent);
}

#[tokio::test]
async fn conflict_status_counts_as_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v10/projects/prj_1/domains"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let done = domains(&server).add_domain("acme.stonesystems.io").await.unwrap();
    assert_eq!(done, Provisioned::AlreadyPresent);
}

#[tokio::test]
async fn other_domain_errors_carry_status_and_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v10/projects/prj_1/domains"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": "forbidden" }
        })))
        .mount(&server)
        .await;

    let err = domains(&server).add_domain("acme.stonesystems.io").await.unwrap_err();
    assert!(matches!(err, DomainError::Api { status: 403, .. }));
    assert_eq!(err.to_string(), "failed to add domain: HTTP 403 (forbidden)");
}
