//! Interactive session tests against local mock catalogs.

use std::time::Duration;

use bookscout::{Catalog, CatalogId, ClientConfig, HttpClient, Scout};
use bookscout_cli::interactive::{run_session, ScriptedReader, SessionOutcome};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────── helpers ───────────────────────

/// Mount a Noor Book results page listing two books served by the same server.
async fn catalog_server() -> MockServer {
    let server = MockServer::start().await;
    let html = r#"
        <div class="book">
          <h2 class="book-title"><a href="/files/first.pdf">First/Book</a></h2>
          <span class="book-author">Al-Jahiz</span>
        </div>
        <div class="book">
          <h2 class="book-title"><a href="/files/second.pdf">Second Book</a></h2>
        </div>"#;
    Mock::given(method("GET"))
        .and(path_regex("/history$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;
    server
}

fn scout_for(server: &MockServer) -> Scout {
    let catalog = Catalog::for_id(CatalogId::NoorBook)
        .with_base_url(&server.uri())
        .unwrap();
    let client = HttpClient::new(ClientConfig::default()).unwrap();
    Scout::new(client, vec![catalog]).with_delay(Duration::ZERO)
}

async fn run(scout: &Scout, input: &str, dir: &std::path::Path) -> (SessionOutcome, String) {
    let mut reader = ScriptedReader::new(input.as_bytes());
    let mut out = Vec::new();
    let outcome = run_session(scout, &mut reader, &mut out, dir, false)
        .await
        .unwrap();
    (outcome, String::from_utf8(out).unwrap())
}

// ─────────────────────── tests ───────────────────────

#[tokio::test]
async fn selecting_first_result_downloads_its_url() {
    let server = catalog_server().await;
    Mock::given(method("GET"))
        .and(path("/files/first.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 first".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/second.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (outcome, text) = run(&scout_for(&server), "history\n1\n", dir.path()).await;

    assert!(text.contains("Found 2 results"));
    assert!(text.contains("1. First/Book - Al-Jahiz (Noor Book)"));
    assert!(text.contains("2. Second Book - unknown (Noor Book)"));

    let expected = dir.path().join("First_Book.pdf");
    match outcome {
        SessionOutcome::Downloaded(download) => {
            assert_eq!(download.path, expected);
            assert_eq!(download.bytes, 14);
        }
        other => panic!("expected a download, got {other:?}"),
    }
    assert_eq!(std::fs::read(&expected).unwrap(), b"%PDF-1.4 first");
}

#[tokio::test]
async fn out_of_range_selection_is_reported_and_reprompted() {
    let server = catalog_server().await;
    Mock::given(method("GET"))
        .and(path("/files/second.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (outcome, text) = run(&scout_for(&server), "history\n5\nabc\n2\n", dir.path()).await;

    assert!(text.contains("Invalid selection '5': expected a number between 1 and 2"));
    assert!(text.contains("Invalid selection 'abc': expected a number between 1 and 2"));
    assert!(matches!(outcome, SessionOutcome::Downloaded(_)));
    assert!(dir.path().join("Second Book.pdf").exists());
}

#[tokio::test]
async fn empty_selection_cancels() {
    let server = catalog_server().await;
    let dir = tempfile::tempdir().unwrap();

    let (outcome, _) = run(&scout_for(&server), "history\n\n", dir.path()).await;

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn failed_download_leaves_no_file() {
    let server = catalog_server().await;
    Mock::given(method("GET"))
        .and(path("/files/first.pdf"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (outcome, text) = run(&scout_for(&server), "history\n1\n", dir.path()).await;

    assert!(matches!(outcome, SessionOutcome::Failed(_)));
    assert!(text.contains("Download failed"));
    assert!(!dir.path().join("First_Book.pdf").exists());
}

#[tokio::test]
async fn no_results_ends_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (outcome, text) = run(&scout_for(&server), "nothing\n", dir.path()).await;

    assert_eq!(outcome, SessionOutcome::NoResults);
    assert!(text.contains("Found 0 results"));
}

#[tokio::test]
async fn follow_links_downloads_discovered_file() {
    let server = MockServer::start().await;
    let results = r#"
        <div class="book">
          <h2 class="book-title"><a href="/book/1">Page Book</a></h2>
        </div>"#;
    Mock::given(method("GET"))
        .and(path_regex("/history$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/book/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<a href="/get/1.pdf">Get</a>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get/1.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 32]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut reader = ScriptedReader::new("history\n1\n".as_bytes());
    let mut out = Vec::new();
    let outcome = run_session(&scout_for(&server), &mut reader, &mut out, dir.path(), true)
        .await
        .unwrap();

    match outcome {
        SessionOutcome::Downloaded(download) => assert_eq!(download.bytes, 32),
        other => panic!("expected a download, got {other:?}"),
    }
}
