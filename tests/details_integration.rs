//! Integration tests for the tree walker and repository detail extraction using wiremock

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use camino::Utf8PathBuf;
use chrono::Utc;
use gh_harvest::collectors::{InputWindow, collect_details};
use gh_harvest::config::Config;
use gh_harvest::facts::activity::MISSING_COUNT;
use gh_harvest::facts::documentation::MAX_DOC_SCORE;
use gh_harvest::facts::{GitHubClient, NoProgress, PathClassifier, RepoSpec, TokenRotator, TreeWalker};
use gh_harvest::reports::{CsvSink, InputRecord, decode_list, read_records};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const README: &str = "# Sample\n\nA sample app.\n\n## Getting Started\n\nRun `make`.\n\n## Contributing\n\nPull requests welcome.\n";

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api_base_url = server.uri();
    config.retry.max_attempts = 1;
    config.retry.backoff_factor_secs = 0.0;
    config.request_delay_ms = 0;
    config
}

fn client_for(config: &Config) -> GitHubClient {
    GitHubClient::new(config, Arc::new(TokenRotator::new(["t1"]).unwrap())).unwrap()
}

fn two_token_client(config: &Config) -> GitHubClient {
    GitHubClient::new(config, Arc::new(TokenRotator::new(["t1", "t2"]).unwrap())).unwrap()
}

fn rate_limited() -> ResponseTemplate {
    let reset = (Utc::now().timestamp() + 30).to_string();
    ResponseTemplate::new(403).insert_header("x-ratelimit-reset", reset.as_str())
}

fn app_record() -> InputRecord {
    [("owner", "octo"), ("repo_name", "app"), ("language", "Python")].into_iter().collect()
}

fn file(server: &MockServer, path: &str) -> Value {
    json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "type": "file",
        "url": format!("{}/repos/octo/app/contents/{path}", server.uri()),
        "size": 10
    })
}

fn dir(path: &str, url: &str) -> Value {
    json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "type": "dir",
        "url": url
    })
}

fn encoded(text: &str) -> Value {
    json!({ "content": STANDARD.encode(text), "encoding": "base64" })
}

async fn mount_listing(server: &MockServer, listing_path: &str, entries: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(listing_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .expect(times)
        .mount(server)
        .await;
}

/// A small repository: a README, a schema, a Travis file, a source directory that links back to
/// the root, a pruned `node_modules`, and an API docs directory.
async fn mount_repository(server: &MockServer) {
    let root = format!("{}/repos/octo/app/contents/", server.uri());
    let src = format!("{}/repos/octo/app/contents/src", server.uri());
    let api_docs = format!("{}/repos/octo/app/contents/api-docs", server.uri());
    let node_modules = format!("{}/repos/octo/app/contents/node_modules", server.uri());

    mount_listing(
        server,
        "/repos/octo/app/contents/",
        json!([
            file(server, "README.md"),
            file(server, "schema.sql"),
            file(server, ".travis.yml"),
            dir("src", &src),
            dir("node_modules", &node_modules),
            dir("api-docs", &api_docs),
        ]),
        1,
    )
    .await;

    mount_listing(
        server,
        "/repos/octo/app/contents/src",
        json!([file(server, "src/main.py"), dir("src/loop", &root)]),
        1,
    )
    .await;

    mount_listing(server, "/repos/octo/app/contents/api-docs", json!([file(server, "api-docs/openapi.yaml")]), 1).await;
    mount_listing(server, "/repos/octo/app/contents/node_modules", json!([]), 0).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/contents/README.md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(encoded(README)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/contents/schema.sql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(encoded("CREATE TABLE users (id INTEGER);\n-- runs on mysql\n")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_walk_classifies_files_and_visits_each_listing_once() {
    let server = MockServer::start().await;
    mount_repository(&server).await;

    let config = test_config(&server);
    let client = client_for(&config);
    let classifier = PathClassifier::from_config(&config).unwrap();
    let spec = RepoSpec::new("octo", "app").unwrap();

    let walk = TreeWalker::new(&client, &classifier, config.large_listing_threshold)
        .walk(&spec)
        .await
        .unwrap();

    assert!(walk.visited <= walk.pops);
    assert_eq!(walk.visited, 3);
    assert_eq!(walk.pops, 4);
    assert_eq!(walk.skipped, 0);

    assert!(walk.files.doc_files.contains("README.md"));
    assert!(walk.files.db_files.contains("schema.sql"));
    assert!(walk.files.cicd_files.contains(".travis.yml"));
    assert!(walk.files.api_files.contains("api-docs"));
    assert!(walk.files.api_files.contains("api-docs/openapi.yaml"));
    assert!(!walk.files.doc_files.contains("src/main.py"));
    server.verify().await;
}

#[tokio::test]
async fn test_walk_skips_oversized_listings() {
    let server = MockServer::start().await;
    let big = format!("{}/repos/octo/app/contents/vendor", server.uri());

    mount_listing(&server, "/repos/octo/app/contents/", json!([file(&server, "README.md"), dir("vendor", &big)]), 1).await;
    mount_listing(
        &server,
        "/repos/octo/app/contents/vendor",
        json!([file(&server, "vendor/a.sql"), file(&server, "vendor/b.sql"), file(&server, "vendor/c.sql")]),
        1,
    )
    .await;

    let mut config = test_config(&server);
    config.large_listing_threshold = 2;
    let client = client_for(&config);
    let classifier = PathClassifier::from_config(&config).unwrap();

    let walk = TreeWalker::new(&client, &classifier, config.large_listing_threshold)
        .walk(&RepoSpec::new("octo", "app").unwrap())
        .await
        .unwrap();

    assert_eq!(walk.skipped, 1);
    assert!(walk.files.db_files.is_empty());
    assert!(walk.files.doc_files.contains("README.md"));
}

#[tokio::test]
async fn test_walk_of_unavailable_repository_fails() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let client = client_for(&config);
    let classifier = PathClassifier::from_config(&config).unwrap();

    let result = TreeWalker::new(&client, &classifier, config.large_listing_threshold)
        .walk(&RepoSpec::new("octo", "missing").unwrap())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_walk_skips_unavailable_subdirectory() {
    let server = MockServer::start().await;
    let gone = format!("{}/repos/octo/app/contents/gone", server.uri());
    mount_listing(&server, "/repos/octo/app/contents/", json!([file(&server, "README.md"), dir("gone", &gone)]), 1).await;

    let config = test_config(&server);
    let client = client_for(&config);
    let classifier = PathClassifier::from_config(&config).unwrap();

    let walk = TreeWalker::new(&client, &classifier, config.large_listing_threshold)
        .walk(&RepoSpec::new("octo", "app").unwrap())
        .await
        .unwrap();

    assert_eq!(walk.visited, 2);
    assert_eq!(walk.skipped, 1);
    assert!(walk.files.doc_files.contains("README.md"));
}

#[tokio::test]
async fn test_unavailable_repository_is_missed_not_written() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let client = client_for(&config);

    let dir = tempfile::tempdir().unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("details.csv")).unwrap();
    let mut sink = CsvSink::open(&output).unwrap();

    let record: InputRecord = [("owner", "octo"), ("repo_name", "gone")].into_iter().collect();
    let summary = collect_details(&client, &config, vec![record], &mut sink, InputWindow::default(), &NoProgress)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(summary.written, 0);
    assert_eq!(summary.missed, ["octo/gone"]);
    assert!(read_records(&output).unwrap().is_empty());
}

#[tokio::test]
async fn test_rate_limit_during_extraction_is_reissued_with_next_token() {
    let server = MockServer::start().await;
    mount_repository(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits"))
        .and(header("authorization", "token t1"))
        .respond_with(rate_limited())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits"))
        .and(header("authorization", "token t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "sha": "a" }, { "sha": "b" }, { "sha": "c" }])))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = two_token_client(&config);

    let dir = tempfile::tempdir().unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("details.csv")).unwrap();
    let mut sink = CsvSink::open(&output).unwrap();

    let summary = collect_details(&client, &config, vec![app_record()], &mut sink, InputWindow::default(), &NoProgress)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(summary.written, 1);
    assert!(summary.missed.is_empty());
    assert_eq!(client.tokens().current(), "t2");

    let rows = read_records(&output).unwrap();
    assert_eq!(rows[0].get("commits_count"), Some("3"));
    server.verify().await;
}

#[tokio::test]
async fn test_persistent_rate_limit_marks_repository_missed() {
    let server = MockServer::start().await;
    mount_repository(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits"))
        .respond_with(rate_limited())
        .expect(2)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = two_token_client(&config);

    let dir = tempfile::tempdir().unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("details.csv")).unwrap();
    let mut sink = CsvSink::open(&output).unwrap();

    let summary = collect_details(&client, &config, vec![app_record()], &mut sink, InputWindow::default(), &NoProgress)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(summary.written, 0);
    assert_eq!(summary.missed, ["octo/app"]);
    assert!(read_records(&output).unwrap().is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_details_stage_end_to_end() {
    let server = MockServer::start().await;
    mount_repository(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/dependency-graph/sbom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sbom": { "packages": [
                { "name": "com.github.octo/app" },
                { "name": "pip:requests" },
                { "name": "pip:flask" }
            ] }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "v1.0" }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "sha": "a" }, { "sha": "b" }])))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let client = client_for(&config);

    let dir = tempfile::tempdir().unwrap();
    let output = Utf8PathBuf::from_path_buf(dir.path().join("details.csv")).unwrap();
    let mut sink = CsvSink::open(&output).unwrap();

    let record: InputRecord = [
        ("owner", "octo"),
        ("repo_name", "app"),
        ("repo_description", "A sample app using postgres"),
        ("topics", "web"),
        ("language", "Python"),
    ]
    .into_iter()
    .collect();
    let bad_record: InputRecord = [("language", "Go")].into_iter().collect();

    let summary = collect_details(&client, &config, vec![record, bad_record], &mut sink, InputWindow::default(), &NoProgress)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped, 1);
    assert!(summary.missed.is_empty());

    let rows = read_records(&output).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];

    assert_eq!(row.get("owner"), Some("octo"));
    assert_eq!(row.get("repo_name"), Some("app"));
    assert_eq!(decode_list(row.get("tags").unwrap()), ["v1.0"]);
    assert_eq!(decode_list(row.get("dependencies").unwrap()), ["requests", "flask"]);
    assert_eq!(row.get("commits_count"), Some("2"));
    assert_eq!(row.get("contributors_count"), Some(MISSING_COUNT.to_string().as_str()));
    assert_eq!(row.get("ci_cd_tool"), Some("Travis CI"));

    let databases = decode_list(row.get("database_types").unwrap());
    assert!(databases.contains(&"PostgreSQL".to_string()));
    assert!(databases.contains(&"MySQL".to_string()));

    let score: u8 = row.get("doc_score").unwrap().parse().unwrap();
    assert!(score > 0 && score <= MAX_DOC_SCORE);
}
