mod support;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use issue_migrator::config::DestinationConfig;
use issue_migrator::destination::{DestinationError, DestinationTracker, GitLabClient, NewIssue};
use issue_migrator::{clean_project, resolve_project};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use support::server::StubServer;

/// What the GitLab stub received.
#[derive(Clone, Default)]
struct Received {
    base_url: String,
    /// `(Sudo header, PRIVATE-TOKEN header, JSON body)` per issue creation.
    creates: Arc<Mutex<Vec<(Option<String>, Option<String>, Value)>>>,
    deletes: Arc<Mutex<Vec<u64>>>,
    /// `(Content-Type, body)` per upload.
    uploads: Arc<Mutex<Vec<(String, String)>>>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn get_project(Path(id): Path<String>) -> Response {
    if id == "group/project" {
        Json(json!({"id": 8, "path_with_namespace": "group/project"})).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "404 Project Not Found"})),
        )
            .into_response()
    }
}

async fn list_projects(
    State(state): State<Received>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    match query.get("page").map(String::as_str) {
        None => (
            [(
                header::LINK,
                format!(
                    "<{}api/v4/projects?search=moved&page=2>; rel=\"next\"",
                    state.base_url
                ),
            )],
            Json(json!([{"id": 3, "path_with_namespace": "other/moved"}])),
        )
            .into_response(),
        Some(_) => Json(json!([{"id": 11, "path_with_namespace": "group/moved"}])).into_response(),
    }
}

async fn list_issues(
    State(state): State<Received>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    match query.get("page").map(String::as_str) {
        None => (
            [(
                header::LINK,
                format!(
                    "<{0}api/v4/projects/8/issues?page=2&per_page=2>; rel=\"next\", \
                     <{0}api/v4/projects/8/issues?page=1&per_page=2>; rel=\"first\"",
                    state.base_url
                ),
            )],
            Json(json!([{"iid": 1, "title": "First"}, {"iid": 2, "title": "Second"}])),
        )
            .into_response(),
        Some(_) => (
            [(
                header::LINK,
                format!(
                    "<{}api/v4/projects/8/issues?page=1&per_page=2>; rel=\"first\"",
                    state.base_url
                ),
            )],
            Json(json!([{"iid": 3, "title": "Third"}])),
        )
            .into_response(),
    }
}

async fn delete_issue(
    State(state): State<Received>,
    Path((_project_id, iid)): Path<(u64, u64)>,
) -> StatusCode {
    state.deletes.lock().unwrap().push(iid);
    match iid {
        2 => StatusCode::OK,
        _ => StatusCode::NO_CONTENT,
    }
}

async fn create_issue(
    State(state): State<Received>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.creates.lock().unwrap().push((
        header_value(&headers, "sudo"),
        header_value(&headers, "private-token"),
        body,
    ));
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 101,
            "iid": 4,
            "web_url": format!("{}group/project/-/issues/4", state.base_url)
        })),
    )
}

async fn upload(
    State(state): State<Received>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    state.uploads.lock().unwrap().push((
        header_value(&headers, "content-type").unwrap_or_default(),
        String::from_utf8_lossy(&body).into_owned(),
    ));
    (
        StatusCode::CREATED,
        Json(json!({
            "alt": "trace.log",
            "url": "/uploads/abc123/trace.log",
            "markdown": "[trace.log](/uploads/abc123/trace.log)"
        })),
    )
}

async fn users(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    match query.get("username").map(String::as_str) {
        Some("ulgens") => Json(json!([
            {"id": 5, "username": "ulgens"},
            {"id": 6, "username": "ulgens"}
        ])),
        _ => Json(json!([])),
    }
}

async fn start() -> (StubServer, Received) {
    let received = Received::default();
    let shared = received.clone();
    let server = StubServer::start(move |base_url| {
        let state = Received {
            base_url: base_url.to_string(),
            ..shared
        };
        Router::new()
            .route("/api/v4/projects", get(list_projects))
            .route("/api/v4/projects/{id}", get(get_project))
            .route(
                "/api/v4/projects/{id}/issues",
                get(list_issues).post(create_issue),
            )
            .route("/api/v4/projects/{id}/issues/{iid}", delete(delete_issue))
            .route("/api/v4/projects/{id}/uploads", post(upload))
            .route("/api/v4/users", get(users))
            .with_state(state)
    })
    .await;
    (server, received)
}

fn destination(url: &str, project: &str) -> DestinationConfig {
    DestinationConfig {
        url: url.to_string(),
        token: "glpat-secret".to_string(),
        project: Some(project.to_string()),
        project_id: None,
    }
}

fn client(url: &str) -> GitLabClient {
    GitLabClient::new(&destination(url, "group/project"), Duration::from_secs(5)).unwrap()
}

fn new_issue(sudo: Option<&str>) -> NewIssue {
    NewIssue {
        title: "Crash on start".to_string(),
        description: None,
        created_at: "2019-03-05T10:22:33.000+0300".to_string(),
        labels: ",Open,Bug,PRO-7".to_string(),
        assignee_ids: Vec::new(),
        sudo: sudo.map(str::to_string),
    }
}

#[tokio::test]
async fn resolves_project_by_direct_lookup() {
    let (server, _) = start().await;
    let client = client(&server.url);

    let project = resolve_project(&client, &destination(&server.url, "group/project"))
        .await
        .unwrap();

    assert_eq!(project.id, 8);
}

#[tokio::test]
async fn missing_project_falls_back_to_paged_listing() {
    let (server, _) = start().await;
    let client = client(&server.url);

    assert_eq!(client.find_project("group/moved").await.unwrap(), None);

    let project = resolve_project(&client, &destination(&server.url, "group/moved"))
        .await
        .unwrap();
    assert_eq!(project.id, 11);
    assert_eq!(project.path_with_namespace, "group/moved");
}

#[tokio::test]
async fn cleanup_follows_next_links_and_requires_no_content() {
    let (server, received) = start().await;
    let client = client(&server.url);

    let report = clean_project(&client, 8).await.unwrap();

    assert_eq!(*received.deletes.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].iid, 2);
}

#[tokio::test]
async fn sudo_header_is_sent_only_when_impersonating() {
    let (server, received) = start().await;
    let client = client(&server.url);

    let created = client.create_issue(8, &new_issue(None)).await.unwrap();
    client
        .create_issue(8, &new_issue(Some("ulgens")))
        .await
        .unwrap();

    assert_eq!(created.iid, 4);
    assert_eq!(
        created.web_url,
        Some(format!("{}group/project/-/issues/4", server.url))
    );

    let creates = received.creates.lock().unwrap();
    let sudo: Vec<Option<String>> = creates.iter().map(|(sudo, _, _)| sudo.clone()).collect();
    assert_eq!(sudo, vec![None, Some("ulgens".to_string())]);
    for (_, token, body) in creates.iter() {
        assert_eq!(token.as_deref(), Some("glpat-secret"));
        assert!(body.get("sudo").is_none());
        assert_eq!(body["labels"], ",Open,Bug,PRO-7");
    }
}

#[tokio::test]
async fn uploads_file_as_multipart_and_returns_markdown() {
    let (server, received) = start().await;
    let client = client(&server.url);

    let upload = client
        .upload_file(8, "trace.log", b"log line".to_vec())
        .await
        .unwrap();

    assert_eq!(upload.markdown, "[trace.log](/uploads/abc123/trace.log)");

    let uploads = received.uploads.lock().unwrap();
    let (content_type, body) = &uploads[0];
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"trace.log\""));
    assert!(body.contains("log line"));
}

#[tokio::test]
async fn finds_first_matching_user() {
    let (server, _) = start().await;
    let client = client(&server.url);

    assert_eq!(client.find_user_id("ulgens").await.unwrap(), Some(5));
    assert_eq!(client.find_user_id("nobody").await.unwrap(), None);
}

#[tokio::test]
async fn probe_reports_unreachable_server() {
    let address = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client(&format!("http://{address}/"));

    let result = client.probe().await;

    assert!(matches!(result, Err(DestinationError::Unreachable { .. })));
}
