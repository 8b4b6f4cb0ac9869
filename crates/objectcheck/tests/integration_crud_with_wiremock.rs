//! Integration tests for the CRUD sequence using wiremock
//!
//! The happy path runs against the stateful fake. Failure paths mount a
//! higher-priority mock that breaks one step, then check that the sequence
//! stops there, later steps are never issued, and the object is cleaned up.

mod common;

use assert_matches::assert_matches;
use common::FakeObjectService;
use objectcheck::scenarios::{CrudState, run_crud_sequence};
use objectcheck::{Error, FailureKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

const SINGLE_OBJECT: &str = r"^/objects/[^/]+$";

#[tokio::test]
async fn test_crud_sequence_visits_every_state() {
    let (server, fake) = FakeObjectService::start().await;
    let ctx = common::context(&server);

    let report = run_crud_sequence(&ctx).await.expect("CRUD sequence failed");

    assert_eq!(report.initial_count, 13);
    assert!(!report.object_id.is_empty());
    assert_eq!(
        report.states,
        vec![
            CrudState::Absent,
            CrudState::Created,
            CrudState::FullyUpdated,
            CrudState::PartiallyUpdated,
            CrudState::Verified,
            CrudState::Deleted,
            CrudState::VerifiedAbsent,
        ]
    );
    assert!(!fake.contains(&report.object_id));
    assert_eq!(fake.len(), 13);
}

#[tokio::test]
async fn test_crud_sequence_issues_calls_in_order() {
    let (server, _fake) = FakeObjectService::start().await;
    run_crud_sequence(&common::context(&server)).await.unwrap();

    let calls: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.method.to_string())
        .collect();
    assert_eq!(
        calls,
        vec!["GET", "POST", "PUT", "PATCH", "GET", "DELETE", "GET"]
    );
}

#[tokio::test]
async fn test_initial_list_failure_stops_before_create() {
    let (server, fake) = FakeObjectService::start().await;

    Mock::given(method("GET"))
        .and(path("/objects"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;

    let err = run_crud_sequence(&common::context(&server)).await.unwrap_err();
    assert_eq!(err.step(), Some(1));
    assert_matches!(err.root(), Error::StatusMismatch { expected: 200, actual: 503, .. });
    assert_eq!(fake.len(), 13);

    server.verify().await;
}

#[tokio::test]
async fn test_rejected_create_response_still_cleans_up() {
    let (server, fake) = FakeObjectService::start().await;
    fake.mount_rejected_create(&server, "rejected-2").await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;

    let err = run_crud_sequence(&common::context(&server)).await.unwrap_err();

    assert_eq!(err.step(), Some(2));
    assert_eq!(err.kind(), FailureKind::Schema);
    assert_eq!(err.created_id(), Some("rejected-2"));
    assert!(!fake.contains("rejected-2"));
    assert_eq!(fake.len(), 13);

    server.verify().await;
}

#[tokio::test]
async fn test_put_failure_aborts_and_cleans_up() {
    let (server, fake) = FakeObjectService::start().await;

    Mock::given(method("PUT"))
        .and(path_regex(SINGLE_OBJECT))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(SINGLE_OBJECT))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;

    let err = run_crud_sequence(&common::context(&server)).await.unwrap_err();

    assert_eq!(err.step(), Some(3));
    assert_eq!(err.kind(), FailureKind::Status);
    assert!(err.to_string().starts_with("Step 3 (PUT /objects/{id}) failed:"));

    // The object created at step 2 was deleted on the way out.
    assert_eq!(fake.len(), 13);
    let deletes = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .count();
    assert_eq!(deletes, 1);

    server.verify().await;
}

#[tokio::test]
async fn test_put_carrying_over_old_data_is_field_mismatch() {
    let (server, fake) = FakeObjectService::start().await;

    // A service that merges instead of replacing keeps a key the PUT dropped.
    Mock::given(method("PUT"))
        .and(path_regex(SINGLE_OBJECT))
        .respond_with(|req: &wiremock::Request| {
            let id = req.url.path().trim_start_matches("/objects/").to_string();
            ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "name": "Apple MacBook Pro 16 (Updated)",
                "data": {
                    "year": 2023,
                    "price": 2199.99,
                    "CPU model": "M2 Max",
                    "Hard disk size": "2 TB",
                    "color": "Space Gray",
                    "legacy": true
                }
            }))
        })
        .with_priority(1)
        .mount(&server)
        .await;

    let err = run_crud_sequence(&common::context(&server)).await.unwrap_err();
    assert_eq!(err.step(), Some(3));
    assert_eq!(err.kind(), FailureKind::Field);
    assert_matches!(err.root(), Error::FieldMismatch { field, .. } if field == "/data");
    assert_eq!(fake.len(), 13);
}

#[tokio::test]
async fn test_patch_schema_violation_aborts() {
    let (server, fake) = FakeObjectService::start().await;

    Mock::given(method("PATCH"))
        .and(path_regex(SINGLE_OBJECT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "any",
            "name": "Apple MacBook Pro 16 (Updated)",
            "data": {"price": "2099.99", "color": "Silver"}
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let err = run_crud_sequence(&common::context(&server)).await.unwrap_err();
    assert_eq!(err.step(), Some(4));
    assert_eq!(err.kind(), FailureKind::Schema);
    assert_matches!(err.root(), Error::Schema(v) if v.path() == "/data/price");
    assert_eq!(fake.len(), 13);

    server.verify().await;
}

#[tokio::test]
async fn test_patch_that_drops_fields_is_caught() {
    let (server, _fake) = FakeObjectService::start().await;

    Mock::given(method("PATCH"))
        .and(path_regex(SINGLE_OBJECT))
        .respond_with(|req: &wiremock::Request| {
            let id = req.url.path().trim_start_matches("/objects/").to_string();
            ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "name": "Apple MacBook Pro 16 (Updated)",
                "data": {"price": 2099.99, "color": "Silver"}
            }))
        })
        .with_priority(1)
        .mount(&server)
        .await;

    let err = run_crud_sequence(&common::context(&server)).await.unwrap_err();
    assert_eq!(err.step(), Some(4));
    assert_matches!(err.root(), Error::FieldMismatch { field, .. } if field == "/data");
}

#[tokio::test]
async fn test_object_still_present_after_delete_fails_step_seven() {
    let (server, fake) = FakeObjectService::start().await;

    // DELETE is acknowledged but nothing is removed.
    Mock::given(method("DELETE"))
        .and(path_regex(SINGLE_OBJECT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .with_priority(1)
        .mount(&server)
        .await;

    let err = run_crud_sequence(&common::context(&server)).await.unwrap_err();
    assert_eq!(err.step(), Some(7));
    assert_matches!(err.root(), Error::StatusMismatch { expected: 404, actual: 200, .. });

    // Past step 6 the object counts as deleted, so no extra cleanup is sent.
    assert_eq!(fake.len(), 14);
}

#[tokio::test]
async fn test_timeout_mid_sequence_is_transport_failure() {
    let (server, _fake) = FakeObjectService::start().await;
    let config = objectcheck::ClientConfig::builder()
        .base_url(server.uri())
        .timeout(std::time::Duration::from_millis(200))
        .build();

    Mock::given(method("GET"))
        .and(path_regex(SINGLE_OBJECT))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(2)))
        .with_priority(1)
        .mount(&server)
        .await;

    let ctx = objectcheck::TestContext::new(&config).unwrap();
    let err = run_crud_sequence(&ctx).await.unwrap_err();
    assert_eq!(err.step(), Some(5));
    assert!(err.is_timeout());
    assert_eq!(err.kind(), FailureKind::Transport);
}
