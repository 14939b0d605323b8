//! Jira REST v2 client.

use super::issue::{DetailResponse, ErrorResponse, SearchResponse};
use super::{IssueDetail, SourceError, SourceIssue, SourceTracker};
use crate::config::SourceConfig;
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

/// Basic-auth client for a Jira server.
#[derive(Clone)]
pub struct JiraClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl JiraClient {
    /// Builds a client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if the HTTP client can't be built.
    pub fn new(config: &SourceConfig, timeout: Duration) -> Result<Self, SourceError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            base_url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, SourceError> {
        request.send().await.map_err(|source| SourceError::Request {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl SourceTracker for JiraClient {
    async fn probe(&self) -> Result<(), SourceError> {
        let url = self.base_url.clone();
        debug!(url = %url, "Probing Jira");

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|source| SourceError::Unreachable {
                url: url.clone(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(status_error(&url, response.status()));
        }
        Ok(())
    }

    async fn search_issues(
        &self,
        project: &str,
        max_results: u32,
    ) -> Result<Vec<SourceIssue>, SourceError> {
        let url = self.endpoint("rest/api/2/search");
        let request = self.get(&url).query(&[
            ("jql", format!("project={project}")),
            ("maxResults", max_results.to_string()),
        ]);
        let response = self.send(request, &url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Query {
                status: status.as_u16(),
                messages: error_messages(&body, status),
            });
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|source| SourceError::Decode {
                url: url.clone(),
                source,
            })?;

        let issues = complete_issues(search)?;
        info!(project, count = issues.len(), "Fetched Jira issues");
        Ok(issues)
    }

    async fn issue_detail(&self, issue_id: &str) -> Result<IssueDetail, SourceError> {
        let url = self.endpoint(&format!("rest/api/2/issue/{issue_id}"));
        let request = self.get(&url).query(&[("fields", "attachment,comment")]);
        let response = self.send(request, &url).await?;

        if response.status() != StatusCode::OK {
            return Err(status_error(&url, response.status()));
        }

        let detail: DetailResponse = response
            .json()
            .await
            .map_err(|source| SourceError::Decode {
                url: url.clone(),
                source,
            })?;
        Ok(detail.into())
    }

    async fn download_attachment(&self, content_url: &str) -> Result<Vec<u8>, SourceError> {
        let response = self.send(self.get(content_url), content_url).await?;

        if !response.status().is_success() {
            return Err(status_error(content_url, response.status()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SourceError::Request {
                url: content_url.to_string(),
                source,
            })?;
        debug!(url = content_url, size = bytes.len(), "Downloaded attachment");
        Ok(bytes.to_vec())
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}browse/{key}", self.base_url)
    }
}

/// Converts a search result, rejecting it if the server capped it below `total`.
fn complete_issues(search: SearchResponse) -> Result<Vec<SourceIssue>, SourceError> {
    let fetched = search.issues.len();
    if let Some(total) = search.total.filter(|&total| total > fetched as u64) {
        return Err(SourceError::Truncated { fetched, total });
    }
    Ok(search.issues.into_iter().map(SourceIssue::from).collect())
}

fn status_error(url: &str, status: StatusCode) -> SourceError {
    SourceError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

/// Extracts `errorMessages` from a failed search body, falling back to the
/// raw body or the status reason.
fn error_messages(body: &str, status: StatusCode) -> Vec<String> {
    let parsed = serde_json::from_str::<ErrorResponse>(body).unwrap_or_default();
    if !parsed.error_messages.is_empty() {
        return parsed.error_messages;
    }
    let body = body.trim();
    if body.is_empty() {
        vec![status.canonical_reason().unwrap_or("Unknown").to_string()]
    } else {
        vec![body.to_string()]
    }
}
