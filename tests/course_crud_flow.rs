//! End-to-end course workflow against a mocked academics service: list is
//! served from the query cache until a successful create invalidates it.

use std::sync::Arc;

use campus_admin::auth::StaticToken;
use campus_admin::commands::{App, academics};
use campus_admin::config::Settings;
use campus_admin::http::Query;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> Settings {
    // ErpApi appends the service namespaces to this base.
    Settings {
        api_base_url: server.uri(),
        timeout_ms: 5_000,
        page_size: 25,
        credentials_file: "unused".into(),
        cache_ttl_secs: 300,
    }
}

#[tokio::test]
async fn create_course_invalidates_and_refetches_the_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/academics/api/courses/"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 1, "code": "CS100", "title": "Computing Basics", "credits": 2}
            ],
            "count": 1,
            "next": null,
            "previous": null
        })))
        .mount(&server)
        .await;

    let create_body = json!({
        "code": "CS101",
        "title": "Intro",
        "credits": 3,
        "department": "550e8400-e29b-41d4-a716-446655440000",
        "status": "ACTIVE"
    });
    Mock::given(method("POST"))
        .and(path("/v1/academics/api/courses/"))
        .and(body_json(create_body.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2, "code": "CS101"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::new(&settings_for(&server), Arc::new(StaticToken::new("test-token"))).unwrap();
    let query = Query::new().set("page", 1u32).set("page_size", 25u32);

    // Two reads, one wire fetch: the second is served from the cache.
    let first = academics::list_courses(&app, &query).await.unwrap();
    assert_eq!(first.count, 1);
    let second = academics::list_courses(&app, &query).await.unwrap();
    assert_eq!(second.count, 1);

    let list_calls = |requests: &[wiremock::Request]| {
        requests
            .iter()
            .filter(|r| r.method == wiremock::http::Method::GET)
            .count()
    };
    assert_eq!(list_calls(&server.received_requests().await.unwrap()), 1);

    // Create posts the exact JSON body once and drops the cached list.
    let payload =
        academics::course_payload("CS101", "Intro", 3, "550e8400-e29b-41d4-a716-446655440000", "ACTIVE")
            .unwrap();
    assert_eq!(payload, create_body);
    let created = academics::create_course(&app, &payload).await.unwrap();
    assert_eq!(created["id"], json!(2));

    // The next list goes back to the wire.
    let third = academics::list_courses(&app, &query).await.unwrap();
    assert_eq!(third.count, 1);
    assert_eq!(list_calls(&server.received_requests().await.unwrap()), 2);
}

#[tokio::test]
async fn validation_failure_surfaces_field_errors_and_keeps_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/academics/api/courses/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "count": 0})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/academics/api/courses/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": ["course code already exists"]})),
        )
        .mount(&server)
        .await;

    let app = App::new(&settings_for(&server), Arc::new(StaticToken::new("t"))).unwrap();
    let query = Query::new();

    academics::list_courses(&app, &query).await.unwrap();

    let payload = academics::course_payload("CS100", "Dup", 2, "d1", "ACTIVE").unwrap();
    let err = academics::create_course(&app, &payload).await.unwrap_err();
    let fields = match &err {
        campus_admin::HttpError::Api { status, body } => {
            assert_eq!(*status, 400);
            body.field_errors().unwrap()
        },
        other => panic!("expected Api error, got {other:?}"),
    };
    assert_eq!(fields["code"], vec!["course code already exists"]);

    // Failed mutation leaves the cached list intact: no second GET.
    academics::list_courses(&app, &query).await.unwrap();
    let gets = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method == wiremock::http::Method::GET)
        .count();
    assert_eq!(gets, 1);
}
