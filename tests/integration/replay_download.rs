//! Integration tests for single replay downloads: existing-file policy and retry

use ballchasing_downloader::api::{BallchasingHttpClient, Credential};
use ballchasing_downloader::downloader::{
    replay_path, DownloadError, DownloadOptions, DownloadOutcome, FixedAnswer, ManualClock,
    ReplayDownloader,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPLAY_ID: &str = "8c5ae2b6-4d6f-4b53-9a52-1d0b3f3f6a01";
const REPLAY_BYTES: &[u8] = b"\x00\x01RLREPLAYDATA\xff\xfe";

fn download_path() -> String {
    format!("/dl/replay/{REPLAY_ID}")
}

fn downloader(
    server: &MockServer,
    options: DownloadOptions,
    clock: &Arc<ManualClock>,
    answer: bool,
) -> ReplayDownloader {
    let client =
        BallchasingHttpClient::with_base_url(server.uri(), Credential::new("token")).unwrap();
    ReplayDownloader::new(Arc::new(client), options)
        .with_clock(clock.clone())
        .with_prompt(Arc::new(FixedAnswer(answer)))
}

async fn mount_success(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(download_path()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(REPLAY_BYTES))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_absent_target_is_downloaded() {
    let server = MockServer::start().await;
    mount_success(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new());

    let outcome = downloader(&server, DownloadOptions::new(dir.path()), &clock, false)
        .download(REPLAY_ID, false)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Downloaded {
            bytes: REPLAY_BYTES.len() as u64,
            attempts: 1
        }
    );
    let target = replay_path(dir.path(), REPLAY_ID);
    assert_eq!(std::fs::read(&target).unwrap(), REPLAY_BYTES);
    // Default inter-item delay after a successful download
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(500)]);
}

#[tokio::test]
async fn test_skip_delay_suppresses_item_delay() {
    let server = MockServer::start().await;
    mount_success(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new());

    let options = DownloadOptions::new(dir.path()).with_item_delay(Duration::from_secs(3));
    downloader(&server, options, &clock, false)
        .download(REPLAY_ID, true)
        .await
        .unwrap();

    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_failures_retry_every_minute_until_success() {
    let server = MockServer::start().await;
    let failures = 3;

    Mock::given(method("POST"))
        .and(path(download_path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(failures)
        .with_priority(1)
        .expect(failures)
        .mount(&server)
        .await;
    mount_success(&server, 1).await;

    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new());

    let outcome = downloader(&server, DownloadOptions::new(dir.path()), &clock, false)
        .download(REPLAY_ID, true)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Downloaded {
            bytes: REPLAY_BYTES.len() as u64,
            attempts: failures as u32 + 1
        }
    );
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_millis(60_000); failures as usize]
    );

    // Exactly one complete file, nothing else left behind
    assert_eq!(dir_entries(dir.path()), vec![format!("{REPLAY_ID}.replay")]);
    assert_eq!(
        std::fs::read(replay_path(dir.path(), REPLAY_ID)).unwrap(),
        REPLAY_BYTES
    );
}

#[tokio::test]
async fn test_keep_existing_makes_no_request() {
    let server = MockServer::start().await;
    mount_success(&server, 0).await;
    let dir = TempDir::new().unwrap();
    let target = replay_path(dir.path(), REPLAY_ID);
    std::fs::write(&target, b"old replay").unwrap();
    let clock = Arc::new(ManualClock::new());

    let options = DownloadOptions::new(dir.path()).with_keep_existing(true);
    let outcome = downloader(&server, options, &clock, true)
        .download(REPLAY_ID, false)
        .await
        .unwrap();

    assert_eq!(outcome, DownloadOutcome::Skipped);
    assert!(!outcome.requested_network());
    assert_eq!(std::fs::read(&target).unwrap(), b"old replay");
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_keep_existing_wins_over_overwrite() {
    let server = MockServer::start().await;
    mount_success(&server, 0).await;
    let dir = TempDir::new().unwrap();
    let target = replay_path(dir.path(), REPLAY_ID);
    std::fs::write(&target, b"old replay").unwrap();
    let clock = Arc::new(ManualClock::new());

    let options = DownloadOptions::new(dir.path())
        .with_keep_existing(true)
        .with_overwrite(true);
    let outcome = downloader(&server, options, &clock, true)
        .download(REPLAY_ID, true)
        .await
        .unwrap();

    assert_eq!(outcome, DownloadOutcome::Skipped);
}

#[tokio::test]
async fn test_overwrite_replaces_existing_file() {
    let server = MockServer::start().await;
    mount_success(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let target = replay_path(dir.path(), REPLAY_ID);
    std::fs::write(&target, b"old replay").unwrap();
    let clock = Arc::new(ManualClock::new());

    // The prompt would decline; overwrite must not consult it
    let options = DownloadOptions::new(dir.path()).with_overwrite(true);
    let outcome = downloader(&server, options, &clock, false)
        .download(REPLAY_ID, true)
        .await
        .unwrap();

    assert!(outcome.requested_network());
    assert_eq!(std::fs::read(&target).unwrap(), REPLAY_BYTES);
}

#[tokio::test]
async fn test_declined_prompt_leaves_file_untouched() {
    let server = MockServer::start().await;
    mount_success(&server, 0).await;
    let dir = TempDir::new().unwrap();
    let target = replay_path(dir.path(), REPLAY_ID);
    std::fs::write(&target, b"old replay").unwrap();
    let clock = Arc::new(ManualClock::new());

    let outcome = downloader(&server, DownloadOptions::new(dir.path()), &clock, false)
        .download(REPLAY_ID, false)
        .await
        .unwrap();

    assert_eq!(outcome, DownloadOutcome::Skipped);
    assert_eq!(std::fs::read(&target).unwrap(), b"old replay");
}

#[tokio::test]
async fn test_accepted_prompt_downloads_again() {
    let server = MockServer::start().await;
    mount_success(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let target = replay_path(dir.path(), REPLAY_ID);
    std::fs::write(&target, b"old replay").unwrap();
    let clock = Arc::new(ManualClock::new());

    let outcome = downloader(&server, DownloadOptions::new(dir.path()), &clock, true)
        .download(REPLAY_ID, true)
        .await
        .unwrap();

    assert!(outcome.requested_network());
    assert_eq!(std::fs::read(&target).unwrap(), REPLAY_BYTES);
}

#[tokio::test]
async fn test_local_filesystem_failure_is_not_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    // A regular file where the output directory should be
    let not_a_dir = dir.path().join("occupied");
    std::fs::write(&not_a_dir, b"").unwrap();
    let clock = Arc::new(ManualClock::new());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(REPLAY_BYTES))
        .mount(&server)
        .await;

    let result = downloader(&server, DownloadOptions::new(&not_a_dir), &clock, false)
        .download(REPLAY_ID, true)
        .await;

    assert!(matches!(result, Err(DownloadError::Io(_))));
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_malformed_credential_fails_without_retry() {
    let server = MockServer::start().await;
    mount_success(&server, 0).await;
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new());

    let client =
        BallchasingHttpClient::with_base_url(server.uri(), Credential::new("bad\ntoken")).unwrap();
    let result = ReplayDownloader::new(Arc::new(client), DownloadOptions::new(dir.path()))
        .with_clock(clock.clone())
        .with_prompt(Arc::new(FixedAnswer(false)))
        .download(REPLAY_ID, true)
        .await;

    assert!(matches!(result, Err(DownloadError::Api(_))));
    assert!(clock.sleeps().is_empty());
    assert!(dir_entries(dir.path()).is_empty());
}

/// Read an HTTP request head off the socket
async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            return;
        }
        head.extend_from_slice(&buf[..n]);
    }
}

#[tokio::test]
async fn test_body_cut_short_is_removed_and_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        // First response promises more bytes than it delivers
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            REPLAY_BYTES.len() * 4
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&REPLAY_BYTES[..6]).await.unwrap();
        socket.shutdown().await.unwrap();
        drop(socket);

        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            REPLAY_BYTES.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(REPLAY_BYTES).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new());
    let client = BallchasingHttpClient::with_base_url(base_url, Credential::new("token")).unwrap();
    let outcome = ReplayDownloader::new(Arc::new(client), DownloadOptions::new(dir.path()))
        .with_clock(clock.clone())
        .with_prompt(Arc::new(FixedAnswer(false)))
        .download(REPLAY_ID, true)
        .await
        .unwrap();
    server.await.unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Downloaded {
            bytes: REPLAY_BYTES.len() as u64,
            attempts: 2
        }
    );
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(60)]);
    assert_eq!(
        std::fs::read(replay_path(dir.path(), REPLAY_ID)).unwrap(),
        REPLAY_BYTES
    );
    assert_eq!(dir_entries(dir.path()), vec![format!("{REPLAY_ID}.replay")]);
}
