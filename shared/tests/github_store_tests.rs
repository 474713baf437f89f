use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use shared::{
    submit_event, Config, DocumentStore, Error, EventDocument, GitHubContentStore, RevisionToken,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const CONTENTS_PATH: &str = "/repos/acme/event-links/contents/liens.json";

fn config(server: &MockServer, extra: &[(&str, &str)]) -> Config {
    let uri = server.uri();
    let mut vars: Vec<(String, String)> = vec![
        ("GITHUB_TOKEN".into(), "ghp_test".into()),
        ("EVENT_LINKS_REPO".into(), "acme/event-links".into()),
        ("GITHUB_API_URL".into(), uri),
        ("GITHUB_TIMEOUT_SECS".into(), "2".into()),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap()
}

fn store(server: &MockServer) -> GitHubContentStore {
    GitHubContentStore::new(&config(server, &[]), "ghp_test".to_string()).unwrap()
}

/// Contents API body with the base64 wrapped at 60 columns, as GitHub does.
fn contents_body(doc: &Value, sha: &str) -> Value {
    let encoded = STANDARD.encode(serde_json::to_string(doc).unwrap());
    let wrapped = encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join("\n");
    json!({"name": "liens.json", "content": wrapped, "encoding": "base64", "sha": sha})
}

fn decode_put_content(request: &Request) -> Value {
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    let bytes = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn last_put(requests: &[Request]) -> &Request {
    requests
        .iter()
        .rev()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap()
}

/// Serve `doc` at `sha` and accept one update against it.
async fn mount_revision(server: &MockServer, doc: &Value, sha: &str) {
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(contents_body(doc, sha)))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .and(body_partial_json(json!({ "sha": sha })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(server)
        .await;
}

// ── Read ────────────────────────────────────────────────────────

#[tokio::test]
async fn read_decodes_document_and_sha() {
    let server = MockServer::start().await;
    let stored = json!({
        "current_event": {"days": [{"date": "2024-12-25", "label": "X"}]},
        "past_events": []
    });

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .and(header("authorization", "token ghp_test"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(contents_body(&stored, "abc123")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (doc, revision) = store(&server).read().await.unwrap();
    assert_eq!(revision, RevisionToken("abc123".to_string()));
    assert_eq!(serde_json::to_value(&doc).unwrap(), stored);
}

#[tokio::test]
async fn read_uses_configured_branch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .and(query_param("ref", "gh-pages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(contents_body(&json!({}), "sha-branch")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server, &[("EVENT_LINKS_BRANCH", "gh-pages")]);
    let store = GitHubContentStore::new(&config, "ghp_test".to_string()).unwrap();
    let (doc, revision) = store.read().await.unwrap();
    assert_eq!(doc, EventDocument::default());
    assert_eq!(revision.as_str(), "sha-branch");
}

#[tokio::test]
async fn read_failure_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
        .mount(&server)
        .await;

    let err = store(&server).read().await.unwrap_err();
    assert!(matches!(err, Error::RemoteRead { status: Some(404), .. }));
    assert_eq!(err.to_string(), "GitHub GET failed: 404");
}

#[tokio::test]
async fn read_timeout_is_a_read_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(contents_body(&json!({}), "slow"))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = store(&server).read().await.unwrap_err();
    assert!(matches!(err, Error::RemoteRead { status: None, .. }));
}

// ── Write ───────────────────────────────────────────────────────

#[tokio::test]
async fn write_sends_message_sha_and_pretty_content() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .and(body_partial_json(json!({
            "message": "🔄 Update from SMHS admin panel",
            "sha": "abc123"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"content": {}, "commit": {}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let doc: EventDocument =
        serde_json::from_value(json!({"current_event": {"days": []}, "past_events": []})).unwrap();
    store(&server)
        .write(&doc, &RevisionToken("abc123".to_string()))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        decode_put_content(&requests[0]),
        json!({"current_event": {"days": []}, "past_events": []})
    );
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("branch").is_none());
}

#[tokio::test]
async fn write_with_stale_sha_fails_with_body() {
    let server = MockServer::start().await;
    let conflict = r#"{"message":"liens.json does not match abc123"}"#;

    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_string(conflict))
        .expect(1)
        .mount(&server)
        .await;

    let err = store(&server)
        .write(&EventDocument::default(), &RevisionToken("abc123".to_string()))
        .await
        .unwrap_err();

    match err {
        Error::RemoteWrite { status, body } => {
            assert_eq!(status, Some(409));
            assert_eq!(body, conflict);
        }
        other => panic!("expected RemoteWrite, got {other:?}"),
    }
}

// ── Full cycle ──────────────────────────────────────────────────

#[tokio::test]
async fn submission_archives_and_commits_once() {
    let server = MockServer::start().await;
    let stored = json!({
        "current_event": {"days": [{"date": "2024-12-25", "label": "X"}]},
        "past_events": []
    });
    mount_revision(&server, &stored, "sha-1").await;

    submit_event(&store(&server), br#"{"days":[{"date":"2025-12-25"}]}"#)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let written = decode_put_content(last_put(&requests));

    assert_eq!(written["current_event"]["days"][0]["label"], "Thursday, Dec. 25th");
    assert_eq!(written["past_events"][0]["days"][0]["label"], "X");
    assert!(written["past_events"][0]["archived_at"].is_string());
}

#[tokio::test]
async fn rejected_read_never_writes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = submit_event(&store(&server), br#"{"days":[]}"#).await.unwrap_err();
    assert_eq!(err.remote_status(), Some(401));
}

#[tokio::test]
async fn written_document_is_read_back_by_the_next_submission() {
    let server = MockServer::start().await;
    let stored = json!({
        "current_event": {"days": [{"date": "2024-12-25", "label": "X"}]},
        "past_events": []
    });
    mount_revision(&server, &stored, "sha-1").await;

    let first = br#"{
        "days": [{"date": "2025-11-02"}, {"date": null, "label": 3}],
        "archived_at": "2025-01-01T00:00:00.000Z"
    }"#;
    submit_event(&store(&server), first).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let committed = decode_put_content(last_put(&requests));
    server.reset().await;
    mount_revision(&server, &committed, "sha-2").await;

    submit_event(&store(&server), br#"{"days":[{"date":"2025-11-09"}]}"#)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let written = decode_put_content(last_put(&requests));

    assert_eq!(written["current_event"]["days"][0]["label"], "Sunday, Nov. 9th");
    let archived = &written["past_events"][0];
    assert_eq!(archived["days"][0]["label"], "Sunday, Nov. 2nd");
    assert_eq!(archived["days"][1], json!({"date": null, "label": 3}));
    assert_ne!(archived["archived_at"], "2025-01-01T00:00:00.000Z");
    assert_eq!(written["past_events"][1]["days"][0]["label"], "X");
}
