//! HTTP-level tests against a local mock of the enterprise store API

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use acstore_core::{
    AppcircleClient, EnterpriseStoreApi, PersonalToken, PollOptions, PublishOutcome, PublishType,
    Publisher, ReleaseMetadata, Session, StoreError,
};
use serde_json::json;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> AppcircleClient {
    AppcircleClient::with_client(reqwest::Client::new(), &server.uri(), &server.uri())
}

fn artifact(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"fake binary contents").unwrap();
    path
}

fn session() -> Session {
    Session::new("A1")
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v2/token"))
        .and(body_string_contains("pat=T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "A1"})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/store/v2/profiles/app-versions"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"taskId": "X1"})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_task_states(server: &MockServer, waiting: u64) {
    if waiting > 0 {
        Mock::given(method("GET"))
            .and(path("/task/v1/tasks/X1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"stateValue": 1, "stateName": "Waiting"})),
            )
            .up_to_n_times(waiting)
            .with_priority(1)
            .expect(waiting)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/task/v1/tasks/X1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"stateValue": 3, "stateName": "Completed"})),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn fast_publisher(server: &MockServer) -> Publisher {
    Publisher::new(Arc::new(client(server))).with_poll_options(PollOptions {
        interval: Duration::from_millis(5),
        timeout: Some(Duration::from_secs(10)),
    })
}

#[tokio::test]
async fn test_exchange_token_posts_pat_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v2/token"))
        .and(header_regex("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("pat=T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A1"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .exchange_token(&PersonalToken::new("T1"))
        .await
        .unwrap();
    assert_eq!(session.access_token(), "A1");
}

#[tokio::test]
async fn test_exchange_token_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid pat"))
        .mount(&server)
        .await;

    let err = client(&server)
        .exchange_token(&PersonalToken::new("T1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Auth(msg) if msg.contains("401")));
}

#[tokio::test]
async fn test_exchange_token_unparseable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .exchange_token(&PersonalToken::new("T1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)));
}

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/store/v2/profiles/app-versions"))
        .and(header("Authorization", "Bearer A1"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"File\"; filename=\"app.ipa\""))
        .and(body_string_contains("fake binary contents"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"taskId": "X1", "taskType": 3})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let api = client(&server);
    let task_id = acstore_core::upload::upload(&api, &session(), &artifact(&dir, "app.ipa"))
        .await
        .unwrap();
    assert_eq!(task_id, "X1");
}

#[tokio::test]
async fn test_upload_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/store/v2/profiles/app-versions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported binary"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let api = client(&server);
    let err = acstore_core::upload::upload(&api, &session(), &artifact(&dir, "app.apk"))
        .await
        .unwrap_err();

    match err {
        StoreError::Upload { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "unsupported binary");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_extension_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let api = client(&server);
    let err = acstore_core::upload::upload(&api, &session(), &artifact(&dir, "app.tar.gz"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_task_status_unparseable_is_poll_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/task/v1/tasks/X1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).task_status(&session(), "X1").await.unwrap_err();
    assert!(matches!(err, StoreError::Poll(_)));
}

#[tokio::test]
async fn test_list_endpoints_parse_arrays() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/store/v2/profiles"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "P1",
                "name": "Staging",
                "lastBinaryReceivedDate": "2024-01-01T00:00:00Z",
                "iconUrl": null
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/store/v2/profiles/P1/app-versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "V1", "createDate": "2024-01-02T00:00:00Z", "version": "1.0.0"}
        ])))
        .mount(&server)
        .await;

    let api = client(&server);
    let profiles = api.list_profiles(&session()).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name.as_deref(), Some("Staging"));

    let versions = api.list_app_versions(&session(), "P1").await.unwrap();
    assert_eq!(versions[0].update_date, None);
    assert_eq!(versions[0].create_date.as_deref(), Some("2024-01-02T00:00:00Z"));
}

#[tokio::test]
async fn test_list_error_status_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/store/v2/profiles"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).list_profiles(&session()).await.unwrap_err();
    assert!(matches!(err, StoreError::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_publish_patch_body_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/store/v2/profiles/P2/app-versions/V1"))
        .and(query_param("action", "publish"))
        .and(body_json(json!({
            "summary": "Summary",
            "releaseNotes": "Notes",
            "publishType": "2"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let release = ReleaseMetadata::new("Summary", "Notes", PublishType::new("2"));
    let response = client(&server)
        .publish_version(&session(), "P2", "V1", &release)
        .await
        .unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn test_end_to_end_upload_and_publish() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_upload(&server).await;
    mount_task_states(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/store/v2/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "P1", "name": "Old", "lastBinaryReceivedDate": "2024-01-01T00:00:00Z"},
            {"id": "P2", "name": "New", "lastBinaryReceivedDate": "2024-06-01T00:00:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/store/v2/profiles/P2/app-versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "V1", "updateDate": "2024-06-02T00:00:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/store/v2/profiles/P2/app-versions/V1"))
        .and(query_param("action", "publish"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let release = ReleaseMetadata::new("Summary", "Notes", PublishType::new("1"));
    let outcome = fast_publisher(&server)
        .run(&PersonalToken::new("T1"), &artifact(&dir, "app.apk"), &release)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        PublishOutcome::UploadedAndPublished {
            profile_id: "P2".to_string(),
            version_id: "V1".to_string(),
        }
    );
}

#[tokio::test]
async fn test_end_to_end_upload_only() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_upload(&server).await;
    mount_task_states(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/store/v2/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let release = ReleaseMetadata::new("Summary", "Notes", PublishType::upload_only());
    let outcome = fast_publisher(&server)
        .run(&PersonalToken::new("T1"), &artifact(&dir, "app.apk"), &release)
        .await
        .unwrap();

    assert_eq!(outcome, PublishOutcome::UploadedOnly);
}

#[tokio::test]
async fn test_end_to_end_failed_processing() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_upload(&server).await;
    Mock::given(method("GET"))
        .and(path("/task/v1/tasks/X1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"stateValue": 2, "stateName": "Failed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let release = ReleaseMetadata::new("Summary", "Notes", PublishType::new("1"));
    let err = fast_publisher(&server)
        .run(&PersonalToken::new("T1"), &artifact(&dir, "app.aab"), &release)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::TaskFailed { ref task_id, .. } if task_id == "X1"));
}

#[tokio::test]
async fn test_cancel_during_slow_upload_returns_promptly() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/store/v2/profiles/app-versions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"taskId": "X1"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let publisher = fast_publisher(&server);
    let trigger = publisher.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let dir = TempDir::new().unwrap();
    let release = ReleaseMetadata::new("Summary", "Notes", PublishType::new("1"));
    let started = Instant::now();
    let err = publisher
        .run(&PersonalToken::new("T1"), &artifact(&dir, "app.apk"), &release)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(3));
}

/// Serve one response whose body is cut short of its declared length
async fn truncated_body_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"stateVal")
            .await
            .unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_interrupted_body_keeps_transport_error() {
    let url = truncated_body_server().await;
    let api = AppcircleClient::with_client(reqwest::Client::new(), &url, &url);

    let err = api.task_status(&session(), "X1").await.unwrap_err();
    assert!(matches!(err, StoreError::Http(_)), "unexpected error: {err:?}");
}
