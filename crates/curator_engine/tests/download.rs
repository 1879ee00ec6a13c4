use std::sync::Once;

use curator_engine::{
    ApiError, AtomicFileWriter, BackendClient, ClientSettings, CurationBackend,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(curator_logging::initialize_for_tests);
}

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), &ClientSettings::default()).expect("client")
}

#[tokio::test]
async fn download_saves_bytes_under_the_display_name() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resume/download"))
        .and(query_param("ResumeId", "res-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"docx payload".to_vec()))
        .mount(&server)
        .await;

    let bytes = client(&server)
        .download_resume("res-1")
        .await
        .expect("download");

    let dir = tempfile::tempdir().expect("tempdir");
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());
    let saved = writer.write("My Resume.docx", &bytes).expect("persist");

    assert_eq!(saved, dir.path().join("My Resume.docx"));
    assert_eq!(std::fs::read(&saved).expect("read back"), b"docx payload");
}

#[tokio::test]
async fn download_error_body_passes_through_the_backend_message() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resume/download"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("{\"error\": \"resume not found\"}"),
        )
        .mount(&server)
        .await;

    let err = client(&server).download_resume("res-1").await.unwrap_err();
    assert_eq!(err, ApiError::Upstream("resume not found".to_string()));
}

#[tokio::test]
async fn download_non_json_error_body_reports_the_status() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resume/download"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server).download_resume("res-1").await.unwrap_err();
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
