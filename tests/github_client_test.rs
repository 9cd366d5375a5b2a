use issue_relay::domain::errors::TrackerError;
use issue_relay::domain::ports::{GithubApi, GithubIssueUpdate, NewGithubIssue};
use issue_relay::infrastructure::trackers::{GithubClient, GithubClientConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GithubClient {
    GithubClient::new(GithubClientConfig {
        api_url: server.uri(),
        owner: "softguard".to_string(),
        api_key: "test-token".to_string(),
        user_agent: "Redmine-GitHub-Sync".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_create_issue_returns_number() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/softguard/livelaps-app/issues"))
        .and(header("authorization", "token test-token"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .and(body_json(json!({
            "title": "Crash",
            "body": "trace",
            "assignees": ["merc74"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "number": 42, "id": 99999 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let issue = NewGithubIssue {
        title: "Crash".to_string(),
        body: "trace".to_string(),
        assignees: vec!["merc74".to_string()],
    };
    let number = client(&mock_server).create_issue("livelaps-app", &issue).await.unwrap();
    assert_eq!(number, 42);
}

#[tokio::test]
async fn test_create_issue_error_carries_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/softguard/livelaps-app/issues"))
        .respond_with(ResponseTemplate::new(410).set_body_string("Issues are disabled"))
        .mount(&mock_server)
        .await;

    let issue = NewGithubIssue {
        title: "Crash".to_string(),
        body: String::new(),
        assignees: vec![],
    };
    let err = client(&mock_server)
        .create_issue("livelaps-app", &issue)
        .await
        .unwrap_err();
    match err {
        TrackerError::Status { status, body } => {
            assert_eq!(status, 410);
            assert_eq!(body, "Issues are disabled");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_issue_without_number_is_invalid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .mount(&mock_server)
        .await;

    let issue = NewGithubIssue {
        title: "t".to_string(),
        body: "b".to_string(),
        assignees: vec![],
    };
    let err = client(&mock_server).create_issue("x", &issue).await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_update_issue_sends_patch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/repos/softguard/livelaps-api/issues/7"))
        .and(body_json(json!({
            "title": "New title",
            "body": "New body",
            "assignees": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "number": 7 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let update = GithubIssueUpdate {
        title: Some("New title".to_string()),
        body: "New body".to_string(),
        assignees: vec![],
    };
    client(&mock_server)
        .update_issue("livelaps-api", 7, &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transfer_only_accepts_201() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/softguard/livelaps-api/issues/7/transfer"))
        .and(body_json(json!({ "new_repository": "livelaps-ui" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/softguard/livelaps-api/issues/8/transfer"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let github = client(&mock_server);
    github.transfer_issue("livelaps-api", 7, "livelaps-ui").await.unwrap();

    let err = github
        .transfer_issue("livelaps-api", 8, "livelaps-ui")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(200));
}

#[tokio::test]
async fn test_token_scopes_reads_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "token test-token"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-oauth-scopes", "repo, workflow"))
        .mount(&mock_server)
        .await;

    let check = client(&mock_server).token_scopes().await.unwrap();
    assert_eq!(check.status, 200);
    assert_eq!(check.scopes.as_deref(), Some("repo, workflow"));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let github = GithubClient::new(GithubClientConfig {
        api_url: "http://127.0.0.1:1".to_string(),
        owner: "softguard".to_string(),
        api_key: "test-token".to_string(),
        user_agent: "Redmine-GitHub-Sync".to_string(),
        timeout_secs: 5,
    })
    .unwrap();

    let update = GithubIssueUpdate {
        title: None,
        body: String::new(),
        assignees: vec![],
    };
    let err = github.update_issue("x", 1, &update).await.unwrap_err();
    assert!(matches!(err, TrackerError::Transport(_)));
}
