//! Integration tests for the GitHub client's retry, rate-limit and pagination handling

use chrono::Utc;
use gh_harvest::config::Config;
use gh_harvest::facts::activity::{self, MISSING_COUNT};
use gh_harvest::facts::hosting::ApiResult;
use gh_harvest::facts::{GitHubClient, RepoSpec, TokenRotator};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api_base_url = server.uri();
    config.retry.max_attempts = 3;
    config.retry.backoff_factor_secs = 0.0;
    config.request_delay_ms = 0;
    config
}

fn client_for(server: &MockServer, tokens: &[&str]) -> GitHubClient {
    GitHubClient::new(&test_config(server), Arc::new(TokenRotator::new(tokens.iter().copied()).unwrap())).unwrap()
}

fn rate_limited() -> ResponseTemplate {
    let reset = (Utc::now().timestamp() + 30).to_string();
    ResponseTemplate::new(403).insert_header("x-ratelimit-reset", reset.as_str())
}

#[tokio::test]
async fn test_transient_statuses_are_retried_until_attempts_run_out() {
    for status in [500, 502, 503, 504, 429] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app"))
            .respond_with(ResponseTemplate::new(status))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, &["t1"]);
        let url = client.endpoint("repos/octo/app", &[]).unwrap();
        let result = client.get::<Value>(&url).await.unwrap();

        assert!(result.is_none(), "status {status} should end up absent");
        server.verify().await;
    }
}

#[tokio::test]
async fn test_transient_failure_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "app" })))
        .mount(&server)
        .await;

    let client = client_for(&server, &["t1"]);
    let url = client.endpoint("repos/octo/app", &[]).unwrap();
    let body = client.get::<Value>(&url).await.unwrap().unwrap();

    assert_eq!(body["name"], "app");
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &["t1"]);
    let url = client.endpoint("repos/octo/gone", &[]).unwrap();

    assert!(matches!(client.api_call(&url).await, ApiResult::Absent(status) if status.as_u16() == 404));
}

#[tokio::test]
async fn test_rate_limit_rotates_token_and_reissues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app"))
        .and(header("authorization", "token first"))
        .respond_with(rate_limited())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app"))
        .and(header("authorization", "token second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "app" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &["first", "second"]);
    let url = client.endpoint("repos/octo/app", &[]).unwrap();

    assert_eq!(client.tokens().current_index(), 0);
    let body = client.get::<Value>(&url).await.unwrap().unwrap();

    assert_eq!(body["name"], "app");
    assert_eq!(client.tokens().current(), "second");
    server.verify().await;
}

#[tokio::test]
async fn test_rate_limit_that_persists_after_reissue_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app"))
        .respond_with(rate_limited())
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, &["first", "second"]);
    let url = client.endpoint("repos/octo/app", &[]).unwrap();

    assert!(client.get::<Value>(&url).await.is_err());
    server.verify().await;
}

#[tokio::test]
async fn test_rate_limit_with_single_token_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app"))
        .respond_with(rate_limited())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &["only"]);
    let url = client.endpoint("repos/octo/app", &[]).unwrap();

    assert!(client.get::<Value>(&url).await.is_err());
    assert_eq!(client.tokens().current_index(), 0);
    server.verify().await;
}

#[tokio::test]
async fn test_retry_after_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "3600"))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.retry.max_retry_after_secs = 0;
    let client = GitHubClient::new(&config, Arc::new(TokenRotator::new(["t1"]).unwrap())).unwrap();
    let url = client.endpoint("repos/octo/app", &[]).unwrap();

    let result = tokio::time::timeout(core::time::Duration::from_secs(10), client.get::<Value>(&url))
        .await
        .expect("Retry-After should be capped");

    assert!(result.unwrap().is_none());
    server.verify().await;
}

#[tokio::test]
async fn test_forbidden_without_reset_keeps_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/private"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, &["first", "second"]);
    let url = client.endpoint("repos/octo/private", &[]).unwrap();

    assert!(client.get::<Value>(&url).await.unwrap().is_none());
    assert_eq!(client.tokens().current_index(), 0);
}

#[tokio::test]
async fn test_undecodable_payload_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server, &["t1"]);
    let url = client.repo_endpoint(&RepoSpec::new("octo", "app").unwrap(), "/tags", &[]).unwrap();

    assert!(client.get::<Vec<Value>>(&url).await.is_err());
}

#[tokio::test]
async fn test_list_follows_next_link_up_to_page_limit() {
    let server = MockServer::start().await;
    let next = format!("<{}/repos/octo/app/tags?page=2>; rel=\"next\"", server.uri());

    Mock::given(method("GET"))
        .and(path("/repos/octo/app/tags"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "name": "v2.0" }, { "name": "v1.1" }]))
                .insert_header("link", next.as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/tags"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "v1.0" }])))
        .mount(&server)
        .await;

    let client = client_for(&server, &["t1"]);
    let spec = RepoSpec::new("octo", "app").unwrap();

    assert_eq!(activity::tags(&client, &spec, 1).await.unwrap(), ["v2.0", "v1.1"]);
    assert_eq!(activity::tags(&client, &spec, 5).await.unwrap(), ["v2.0", "v1.1", "v1.0"]);
}

#[tokio::test]
async fn test_counts_are_missing_when_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/app/issues"))
        .and(query_param("state", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "state": "open" },
            { "state": "closed" },
            { "state": "open", "pull_request": { "url": "x" } }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, &["t1"]);
    let spec = RepoSpec::new("octo", "app").unwrap();

    let issues = activity::issue_counts(&client, &spec, 1).await.unwrap();
    assert_eq!((issues.open, issues.closed), (1, 1));

    assert_eq!(activity::commits_count(&client, &spec, 1).await.unwrap(), MISSING_COUNT);
    assert_eq!(activity::pull_request_counts(&client, &spec, 1).await.unwrap().merged, MISSING_COUNT);
}
