use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use vidgrab_engine::{
    run_download, ExportSpec, FailureKind, HttpMediaService, HttpSettings, JobHandle, JobState,
    MediaMetadata, MediaService, PollSettings, RetryPolicy,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> HttpMediaService {
    let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    HttpMediaService::new(HttpSettings::new(base)).unwrap()
}

fn fast_polling() -> (PollSettings, RetryPolicy) {
    (
        PollSettings {
            interval: Duration::from_millis(10),
            max_wait: Duration::from_secs(5),
        },
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
        },
    )
}

fn metadata_json() -> serde_json::Value {
    json!({
        "title": "Launch Trailer",
        "author": "Studio",
        "duration": "02:10",
        "thumbnail": "https://img.example.com/t.jpg"
    })
}

#[tokio::test]
async fn submit_posts_url_and_returns_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/downloads"))
        .and(body_json(json!({ "url": "https://example.com/video" })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "job_id": "j-1" })))
        .mount(&server)
        .await;

    let job = service_for(&server)
        .submit_download("https://example.com/video")
        .await
        .expect("submit ok");
    assert_eq!(job, JobHandle("j-1".to_string()));
}

#[tokio::test]
async fn poll_maps_remote_states() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/running"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/done"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "succeeded", "metadata": metadata_json() })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/broken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "failed", "error": "unsupported platform" })),
        )
        .mount(&server)
        .await;

    let service = service_for(&server);
    assert_eq!(
        service.poll(&JobHandle("running".into())).await.unwrap(),
        JobState::Pending
    );
    assert_eq!(
        service.poll(&JobHandle("done".into())).await.unwrap(),
        JobState::Succeeded(MediaMetadata {
            title: "Launch Trailer".to_string(),
            author: "Studio".to_string(),
            duration_label: "02:10".to_string(),
            thumbnail_url: Some("https://img.example.com/t.jpg".to_string()),
        })
    );
    match service.poll(&JobHandle("broken".into())).await.unwrap() {
        JobState::Failed(err) => {
            assert_eq!(err.kind, FailureKind::Rejected);
            assert_eq!(err.message, "unsupported platform");
        }
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test]
async fn succeeded_job_with_sparse_metadata_still_settles() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/downloads"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "job_id": "sparse" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/sparse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "succeeded",
            "metadata": { "author": "A" }
        })))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let (poll, retry) = fast_polling();
    let (job, metadata) = run_download(&service, "https://example.com/video", &poll, &retry)
        .await
        .expect("sparse metadata is not a decode error");
    assert_eq!(job, JobHandle("sparse".to_string()));
    assert_eq!(
        metadata,
        MediaMetadata {
            title: String::new(),
            author: "A".to_string(),
            duration_label: String::new(),
            thumbnail_url: None,
        }
    );
}

#[tokio::test]
async fn http_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/downloads"))
        .respond_with(ResponseTemplate::new(422).set_body_string("url not supported"))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .submit_download("https://example.com/video")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(422));
    assert_eq!(err.message, "url not supported");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/j-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .poll(&JobHandle("j-1".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let err = service_for(&server)
        .submit_download("not a url")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn export_sends_trim_only_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/downloads/j-1/exports"))
        .and(body_json(json!({
            "format": "mp3",
            "trim_start": "00:10",
            "trim_end": "01:00"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "export_id": "e-1",
            "download_url": "https://cdn.example.com/e-1.mp3"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/downloads/j-1/exports"))
        .and(body_json(json!({ "format": "mp4-720" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "export_id": "e-2" })))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let job = JobHandle("j-1".into());
    let trimmed = service
        .request_export(
            &job,
            &ExportSpec {
                format: "mp3".into(),
                trim: Some(("00:10".into(), "01:00".into())),
            },
        )
        .await
        .unwrap();
    assert_eq!(trimmed.export_id, "e-1");
    assert_eq!(
        trimmed.download_url.as_deref(),
        Some("https://cdn.example.com/e-1.mp3")
    );

    let plain = service
        .request_export(
            &job,
            &ExportSpec {
                format: "mp4-720".into(),
                trim: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(plain.export_id, "e-2");
    assert_eq!(plain.download_url, None);
}

#[tokio::test]
async fn run_download_polls_through_transient_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/downloads"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "job_id": "j-9" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/j-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/j-9"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/j-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "succeeded", "metadata": metadata_json() })),
        )
        .mount(&server)
        .await;

    let (poll, retry) = fast_polling();
    let service = service_for(&server);
    let (job, metadata) = run_download(&service, "https://example.com/video", &poll, &retry)
        .await
        .expect("download settles");
    assert_eq!(job, JobHandle("j-9".into()));
    assert_eq!(metadata.title, "Launch Trailer");
}

#[tokio::test]
async fn run_download_gives_up_after_max_wait() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/downloads"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "job_id": "slow" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/downloads/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
        .mount(&server)
        .await;

    let (_, retry) = fast_polling();
    let poll = PollSettings {
        interval: Duration::from_millis(10),
        max_wait: Duration::from_millis(60),
    };
    let err = run_download(&service_for(&server), "https://example.com/v", &poll, &retry)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Expired);
}
