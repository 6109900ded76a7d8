use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use mockito::{Matcher, Server};
use tokio_test::{assert_err, assert_ok};

use pixelproof_client::error::{AppError, AppResult, RequestError, ValidationError};
use pixelproof_client::models::{SelectedFile, Severity, VerificationOutcome};
use pixelproof_client::presentation::{affordances, ResultPanel};
use pixelproof_client::services::{ArtifactSink, DownloadedArtifact, ARTIFACT_FILE_NAME};
use pixelproof_client::workflow::embed_flow::EMBED_SUCCESS_MESSAGE;
use pixelproof_client::{
    Config, EmbedWorkflow, NotificationCenter, RequestState, Submission, VerifyWorkflow,
    WatermarkClient, WorkflowKind,
};

/// 记录下载而不落盘
#[derive(Default)]
struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl ArtifactSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> AppResult<DownloadedArtifact> {
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(DownloadedArtifact {
            path: PathBuf::from(file_name),
            size: bytes.len(),
        })
    }
}

struct Harness {
    embed: EmbedWorkflow,
    verify: VerifyWorkflow,
    notifications: NotificationCenter,
    sink: Arc<MemorySink>,
}

fn harness(url: &str) -> Harness {
    let config = Config {
        api_base_url: url.to_string(),
        ..Config::default()
    };
    let client = WatermarkClient::new(&config).unwrap();
    let notifications = NotificationCenter::new(Duration::from_secs(3));
    let sink = Arc::new(MemorySink::default());

    Harness {
        embed: EmbedWorkflow::new(client.clone(), notifications.clone(), sink.clone()),
        verify: VerifyWorkflow::new(client, notifications.clone()),
        notifications,
        sink,
    }
}

/// 让 mock 服务端停在响应之前，直到测试放行
struct Gate {
    arrived: AtomicBool,
    release: Mutex<mpsc::Receiver<()>>,
}

impl Gate {
    fn new() -> (Arc<Self>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let gate = Arc::new(Self {
            arrived: AtomicBool::new(false),
            release: Mutex::new(rx),
        });
        (gate, tx)
    }

    /// 在 mockito 的服务线程上阻塞
    fn hold(&self) {
        self.arrived.store(true, Ordering::SeqCst);
        let _ = self
            .release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5));
    }

    async fn wait_arrived(&self) {
        while !self.arrived.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

fn png(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/png", b"fakepng".to_vec())
}

fn last_error(notifications: &NotificationCenter) -> String {
    notifications
        .active()
        .into_iter()
        .filter(|n| n.severity == Severity::Error)
        .last()
        .map(|n| n.message)
        .unwrap_or_default()
}

// ========== 嵌入流程 ==========

#[tokio::test]
async fn test_embed_without_file_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/api/embed").expect(0).create_async().await;
    let h = harness(&server.url());

    h.embed.set_secret("owner");
    let err = h.embed.submit().await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::NoFileSelected(WorkflowKind::Embed))
    ));
    assert_eq!(last_error(&h.notifications), "Please select an image first.");
    assert_eq!(h.embed.state(), RequestState::Idle);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_embed_with_blank_secret_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/api/embed").expect(0).create_async().await;
    let h = harness(&server.url());

    h.embed.select(png("photo.png")).unwrap().ready().await.unwrap();
    h.embed.set_secret("   \n\t");
    let err = h.embed.submit().await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::EmptySecret)
    ));
    assert_eq!(last_error(&h.notifications), "Please enter a secret signature.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_embed_success_downloads_once_and_clears_secret() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/embed")
        .match_body(Matcher::Regex("\r\n\r\nowner\r\n".to_string()))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body("PNGDATA")
        .expect(1)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.embed.select(png("photo.jpg")).unwrap().ready().await.unwrap();
    h.embed.set_secret("  owner  ");

    let artifact = assert_ok!(h.embed.submit().await).settled().unwrap();

    assert_eq!(artifact.path, PathBuf::from(ARTIFACT_FILE_NAME));
    assert_eq!(
        h.sink.saved(),
        vec![(ARTIFACT_FILE_NAME.to_string(), b"PNGDATA".to_vec())]
    );
    assert_eq!(h.embed.secret(), "");
    assert!(h.embed.intake().has_file());
    assert_eq!(h.embed.state(), RequestState::Succeeded);

    let active = h.notifications.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, Severity::Info);
    assert_eq!(active[0].message, EMBED_SUCCESS_MESSAGE);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_embed_error_surfaces_message_and_keeps_input() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/embed")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "bad input"}"#)
        .expect(1)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.embed.select(png("photo.png")).unwrap().ready().await.unwrap();
    h.embed.set_secret("owner");

    let err = assert_err!(h.embed.submit().await);

    assert!(matches!(
        err,
        AppError::Request(RequestError::Status { status: 400, .. })
    ));
    assert!(last_error(&h.notifications).contains("bad input"));
    assert_eq!(h.embed.secret(), "owner");
    assert!(h.embed.intake().has_file());
    assert!(h.sink.saved().is_empty());
    assert_eq!(h.embed.state(), RequestState::Failed);
    assert!(affordances(&h.embed.view()).submit_enabled);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_embed_error_without_body_uses_generic_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/embed")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;
    let h = harness(&server.url());

    h.embed.select(png("photo.png")).unwrap().ready().await.unwrap();
    h.embed.set_secret("owner");
    h.embed.submit().await.unwrap_err();

    assert_eq!(last_error(&h.notifications), "Failed to embed text");
}

#[tokio::test]
async fn test_second_submission_while_in_flight_is_ignored() {
    let mut server = Server::new_async().await;
    let embed_mock = server.mock("POST", "/api/embed").expect(0).create_async().await;
    let verify_mock = server.mock("POST", "/api/extract").expect(0).create_async().await;
    let h = harness(&server.url());

    h.embed.select(png("a.png")).unwrap().ready().await.unwrap();
    h.embed.set_secret("owner");
    h.verify.select(png("b.png")).unwrap().ready().await.unwrap();

    let embed_guard = h.embed.orchestrator().begin().unwrap();
    let verify_guard = h.verify.orchestrator().begin().unwrap();
    assert!(!affordances(&h.embed.view()).submit_enabled);

    assert_eq!(h.embed.submit().await.unwrap(), Submission::Ignored);
    assert_eq!(h.verify.submit().await.unwrap(), Submission::Ignored);
    assert_eq!(h.embed.secret(), "owner");
    assert!(h.notifications.active().is_empty());

    embed_guard.settle(true);
    verify_guard.settle(true);
    embed_mock.assert_async().await;
    verify_mock.assert_async().await;
}

#[tokio::test]
async fn test_overlapping_embed_submissions_send_one_request() {
    let mut server = Server::new_async().await;
    let (gate, release) = Gate::new();
    let held = Arc::clone(&gate);
    let mock = server
        .mock("POST", "/api/embed")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body_from_request(move |_| {
            held.hold();
            b"PNGDATA".to_vec()
        })
        .expect(1)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.embed.select(png("photo.png")).unwrap().ready().await.unwrap();
    h.embed.set_secret("owner");

    let (first, second) = tokio::join!(h.embed.submit(), async {
        gate.wait_arrived().await;
        assert_eq!(h.embed.state(), RequestState::InFlight);
        let second = h.embed.submit().await;
        release.send(()).unwrap();
        second
    });

    assert!(assert_ok!(first).settled().is_some());
    assert_eq!(assert_ok!(second), Submission::Ignored);
    assert_eq!(h.sink.saved().len(), 1);
    assert_eq!(h.embed.state(), RequestState::Succeeded);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_image_selection_notifies_and_keeps_previous_file() {
    let server = Server::new_async().await;
    let h = harness(&server.url());

    h.embed.select(png("photo.png")).unwrap().ready().await.unwrap();
    let err = h
        .embed
        .select(SelectedFile::new("doc.pdf", "application/pdf", b"%PDF".to_vec()))
        .unwrap_err();

    assert!(matches!(err, ValidationError::NotAnImage { .. }));
    assert_eq!(last_error(&h.notifications), "Only image files are allowed.");
    assert_eq!(h.embed.intake().file().unwrap().name, "photo.png");
}

// ========== 验证流程 ==========

#[tokio::test]
async fn test_verify_found_text_is_escaped() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"found": true, "text": "<script>"}"#)
        .expect(1)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.verify.select(png("scan.png")).unwrap().ready().await.unwrap();
    let outcome = assert_ok!(h.verify.submit().await).settled().unwrap();

    assert_eq!(outcome, VerificationOutcome::Found("<script>".to_string()));
    match affordances(&h.verify.view()).result {
        ResultPanel::Success(html) => {
            assert!(html.contains("&lt;script&gt;"));
            assert!(!html.contains("<script>"));
        }
        other => panic!("unexpected panel: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_verify_not_found_renders_message_only() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"found": false, "message": "no watermark detected"}"#)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.verify.select(png("scan.png")).unwrap().ready().await.unwrap();
    let outcome = h.verify.submit().await.unwrap().settled().unwrap();

    assert_eq!(
        outcome,
        VerificationOutcome::NotFound("no watermark detected".to_string())
    );
    match affordances(&h.verify.view()).result {
        ResultPanel::Failure(html) => {
            assert!(html.contains("no watermark detected"));
            assert!(!html.contains("Watermark Found"));
        }
        other => panic!("unexpected panel: {other:?}"),
    }
}

#[tokio::test]
async fn test_new_selection_clears_previous_outcome_before_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"found": true, "text": "owner"}"#)
        .expect(1)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.verify.select(png("first.png")).unwrap().ready().await.unwrap();
    h.verify.submit().await.unwrap();
    assert!(h.verify.outcome().is_some());

    h.verify.select(png("second.png")).unwrap();

    assert!(h.verify.outcome().is_none());
    assert_eq!(affordances(&h.verify.view()).result, ResultPanel::Hidden);
    assert_eq!(h.verify.state(), RequestState::Idle);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_result_for_replaced_image_is_not_shown() {
    let mut server = Server::new_async().await;
    let (gate, release) = Gate::new();
    let held = Arc::clone(&gate);
    let mock = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            held.hold();
            br#"{"found": true, "text": "old-image-owner"}"#.to_vec()
        })
        .expect(1)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.verify.select(png("first.png")).unwrap().ready().await.unwrap();

    let (result, _) = tokio::join!(h.verify.submit(), async {
        gate.wait_arrived().await;
        h.verify.select(png("second.png")).unwrap().ready().await.unwrap();
        release.send(()).unwrap();
    });

    assert_ok!(result);
    assert_eq!(h.verify.intake().file().unwrap().name, "second.png");
    assert!(h.verify.outcome().is_none());
    assert_eq!(affordances(&h.verify.view()).result, ResultPanel::Hidden);
    assert_eq!(h.verify.state(), RequestState::Idle);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_verify_unparseable_success_is_a_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_body("<html>ok</html>")
        .create_async()
        .await;
    let h = harness(&server.url());

    h.verify.select(png("scan.png")).unwrap().ready().await.unwrap();
    let err = h.verify.submit().await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Request(RequestError::MalformedBody { .. })
    ));
    assert_eq!(last_error(&h.notifications), "Failed to extract watermark");
    assert_eq!(h.verify.state(), RequestState::Failed);
    assert!(h.verify.outcome().is_none());
}

#[tokio::test]
async fn test_verify_failure_hides_stale_outcome() {
    let mut server = Server::new_async().await;
    let found = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"found": true, "text": "owner"}"#)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.verify.select(png("scan.png")).unwrap().ready().await.unwrap();
    h.verify.submit().await.unwrap();
    assert!(h.verify.outcome().is_some());

    found.remove_async().await;
    let _failing = server
        .mock("POST", "/api/extract")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "cannot identify image file"}"#)
        .create_async()
        .await;

    h.verify.submit().await.unwrap_err();

    assert!(h.verify.outcome().is_none());
    assert_eq!(last_error(&h.notifications), "cannot identify image file");
    assert!(h.verify.intake().has_file());
}

#[tokio::test]
async fn test_verify_without_file_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/api/extract").expect(0).create_async().await;
    let h = harness(&server.url());

    let err = h.verify.submit().await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::NoFileSelected(WorkflowKind::Verify))
    ));
    assert_eq!(last_error(&h.notifications), "Please upload an image to scan.");
    mock.assert_async().await;
}

// ========== 两条流程互不影响 ==========

#[tokio::test]
async fn test_workflows_do_not_share_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/extract")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"found": false, "message": "nothing here"}"#)
        .create_async()
        .await;
    let h = harness(&server.url());

    h.embed.select(png("embed.png")).unwrap().ready().await.unwrap();
    h.verify.select(png("verify.png")).unwrap().ready().await.unwrap();

    // 嵌入请求在途时，验证流程照常工作
    let embed_guard = h.embed.orchestrator().begin().unwrap();
    let outcome = h.verify.submit().await.unwrap().settled().unwrap();
    assert!(!outcome.is_found());
    assert_eq!(h.embed.state(), RequestState::InFlight);
    embed_guard.settle(false);

    h.verify.clear();
    assert!(!h.verify.intake().has_file());
    assert!(h.verify.outcome().is_none());
    assert_eq!(h.embed.intake().file().unwrap().name, "embed.png");
}
