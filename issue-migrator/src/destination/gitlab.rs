//! GitLab REST v4 client.

use super::models::{CloseIssue, UserRef};
use super::pagination::next_link;
use super::{
    CreatedIssue, DestinationError, DestinationTracker, ExistingIssue, NewIssue, NewNote, Page,
    ProjectRef, UploadResult,
};
use crate::config::DestinationConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const PRIVATE_TOKEN_HEADER: &str = "private-token";
const SUDO_HEADER: &str = "Sudo";
const PAGE_SIZE: &str = "100";

/// Token-authenticated client for a GitLab instance.
#[derive(Clone)]
pub struct GitLabClient {
    api_url: String,
    client: Client,
}

impl GitLabClient {
    /// Builds a client for the configured instance.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationError::InvalidToken`] if the token can't be sent as
    /// a header, or [`DestinationError::Client`] if the client can't be built.
    pub fn new(config: &DestinationConfig, timeout: Duration) -> Result<Self, DestinationError> {
        let mut token = header::HeaderValue::from_str(&config.token)
            .map_err(|_| DestinationError::InvalidToken)?;
        token.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::HeaderName::from_static(PRIVATE_TOKEN_HEADER), token);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(DestinationError::Client)?;

        Ok(Self {
            api_url: format!("{}api/v4/", config.url),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, DestinationError> {
        request.send().await.map_err(|source| DestinationError::Request {
            url: url.to_string(),
            source,
        })
    }

    /// Sends a request and fails on any non-2xx status.
    async fn send_checked(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<Response, DestinationError> {
        let response = self.send(request, url).await?;
        if !response.status().is_success() {
            return Err(status_error(url, response.status()));
        }
        Ok(response)
    }

    /// Fetches one page of a listing endpoint.
    async fn list_page<T: DeserializeOwned>(
        &self,
        first_page: RequestBuilder,
        first_url: &str,
        cursor: Option<String>,
    ) -> Result<Page<T>, DestinationError> {
        let (request, url) = match cursor {
            Some(next) => (self.client.get(&next), next),
            None => (first_page, first_url.to_string()),
        };

        let response = self.send_checked(request, &url).await?;
        let next = response
            .headers()
            .get(header::LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_link);
        let items = decode(&url, response).await?;
        Ok(Page { items, next })
    }
}

#[async_trait]
impl DestinationTracker for GitLabClient {
    async fn probe(&self) -> Result<(), DestinationError> {
        let url = self.endpoint("projects");
        debug!(url = %url, "Probing GitLab");

        let response = self
            .client
            .get(&url)
            .query(&[("per_page", "1")])
            .send()
            .await
            .map_err(|source| DestinationError::Unreachable {
                url: url.clone(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(status_error(&url, response.status()));
        }
        Ok(())
    }

    async fn find_project(&self, path: &str) -> Result<Option<ProjectRef>, DestinationError> {
        let url = self.endpoint(&format!("projects/{}", encode_path(path)));
        let response = self.send(self.client.get(&url), &url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => decode(&url, response).await.map(Some),
            status => Err(status_error(&url, status)),
        }
    }

    async fn list_projects(
        &self,
        search: &str,
        cursor: Option<String>,
    ) -> Result<Page<ProjectRef>, DestinationError> {
        let url = self.endpoint("projects");
        let first_page = self.client.get(&url).query(&[
            ("search", search),
            ("simple", "true"),
            ("per_page", PAGE_SIZE),
        ]);
        self.list_page(first_page, &url, cursor).await
    }

    async fn list_issues(
        &self,
        project_id: u64,
        cursor: Option<String>,
    ) -> Result<Page<ExistingIssue>, DestinationError> {
        let url = self.endpoint(&format!("projects/{project_id}/issues"));
        let first_page = self.client.get(&url).query(&[("per_page", PAGE_SIZE)]);
        self.list_page(first_page, &url, cursor).await
    }

    async fn delete_issue(&self, project_id: u64, iid: u64) -> Result<(), DestinationError> {
        let url = self.endpoint(&format!("projects/{project_id}/issues/{iid}"));
        let response = self.send(self.client.delete(&url), &url).await?;

        if response.status() != StatusCode::NO_CONTENT {
            return Err(status_error(&url, response.status()));
        }
        Ok(())
    }

    async fn create_issue(
        &self,
        project_id: u64,
        issue: &NewIssue,
    ) -> Result<CreatedIssue, DestinationError> {
        let url = self.endpoint(&format!("projects/{project_id}/issues"));
        let request = with_sudo(self.client.post(&url).json(issue), issue.sudo.as_deref());
        let response = self.send_checked(request, &url).await?;
        decode(&url, response).await
    }

    async fn close_issue(
        &self,
        project_id: u64,
        iid: u64,
        closed_at: &str,
    ) -> Result<(), DestinationError> {
        let url = self.endpoint(&format!("projects/{project_id}/issues/{iid}"));
        let body = CloseIssue {
            state_event: "close",
            updated_at: closed_at,
        };
        self.send_checked(self.client.put(&url).json(&body), &url)
            .await?;
        Ok(())
    }

    async fn create_note(
        &self,
        project_id: u64,
        iid: u64,
        note: &NewNote,
    ) -> Result<(), DestinationError> {
        let url = self.endpoint(&format!("projects/{project_id}/issues/{iid}/notes"));
        let request = with_sudo(self.client.post(&url).json(note), note.sudo.as_deref());
        self.send_checked(request, &url).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        project_id: u64,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<UploadResult, DestinationError> {
        let url = self.endpoint(&format!("projects/{project_id}/uploads"));
        let size = content.len();
        let form = Form::new().part("file", Part::bytes(content).file_name(filename.to_string()));

        let response = self
            .send_checked(self.client.post(&url).multipart(form), &url)
            .await?;
        debug!(filename, size, "Uploaded file");
        decode(&url, response).await
    }

    async fn find_user_id(&self, username: &str) -> Result<Option<u64>, DestinationError> {
        let url = self.endpoint("users");
        let request = self.client.get(&url).query(&[("username", username)]);
        let response = self.send_checked(request, &url).await?;
        let users: Vec<UserRef> = decode(&url, response).await?;
        Ok(users.first().map(|user| user.id))
    }
}

fn with_sudo(request: RequestBuilder, sudo: Option<&str>) -> RequestBuilder {
    match sudo {
        Some(username) => request.header(SUDO_HEADER, username),
        None => request,
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, DestinationError> {
    response
        .json()
        .await
        .map_err(|source| DestinationError::Decode {
            url: url.to_string(),
            source,
        })
}

fn status_error(url: &str, status: StatusCode) -> DestinationError {
    DestinationError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

/// Percent-encodes a namespaced path so it fits in one URL path segment.
fn encode_path(path: &str) -> String {
    url::form_urlencoded::byte_serialize(path.as_bytes()).collect()
}
