//! In-memory Jira and GitLab fakes for pipeline tests.

#![allow(dead_code)]

pub mod server;

use async_trait::async_trait;
use issue_migrator::config::{
    AuthorAttribution, DestinationConfig, IdentityMap, MigrationConfig, MigrationOptions,
    SourceConfig,
};
use issue_migrator::destination::{
    CreatedIssue, DestinationError, DestinationTracker, ExistingIssue, NewIssue, NewNote, Page,
    ProjectRef, UploadResult,
};
use issue_migrator::source::{
    Attachment, Comment, IssueDetail, SourceError, SourceIssue, SourceTracker,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const JIRA_URL: &str = "https://jira.example.com/";
pub const PROJECT_PATH: &str = "group/project";
pub const PROJECT_ID: u64 = 8;

/// A write or lookup the fake GitLab received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        title: String,
        labels: String,
        created_at: String,
        assignee_ids: Vec<u64>,
        sudo: Option<String>,
    },
    Close {
        iid: u64,
        closed_at: String,
    },
    Note {
        iid: u64,
        body: String,
        created_at: Option<String>,
        sudo: Option<String>,
    },
    Upload {
        filename: String,
        content: Vec<u8>,
    },
    Delete {
        iid: u64,
    },
    FindUser {
        username: String,
    },
}

pub fn server_error(url: &str) -> DestinationError {
    DestinationError::Status {
        url: url.to_string(),
        status: 500,
        reason: "Internal Server Error".to_string(),
    }
}

pub fn issue(key: &str, summary: &str) -> SourceIssue {
    SourceIssue {
        id: format!("id-{key}"),
        key: key.to_string(),
        summary: summary.to_string(),
        description: Some(format!("Description of {key}")),
        created: "2019-03-05T10:22:33.000+0300".to_string(),
        resolved: None,
        reporter: None,
        assignee: None,
        status: "Open".to_string(),
        issue_type: "Bug".to_string(),
        fix_versions: Vec::new(),
    }
}

pub fn comment(author: &str, body: &str, created: &str) -> Comment {
    Comment {
        author: Some(author.to_string()),
        body: body.to_string(),
        created: created.to_string(),
    }
}

pub fn attachment(author: &str, filename: &str, created: &str) -> Attachment {
    Attachment {
        author: Some(author.to_string()),
        filename: filename.to_string(),
        created: created.to_string(),
        content_url: format!("{JIRA_URL}secure/attachment/1/{filename}"),
    }
}

pub fn config(options: MigrationOptions, identities: IdentityMap) -> MigrationConfig {
    MigrationConfig {
        source: SourceConfig {
            url: JIRA_URL.to_string(),
            username: "bot".to_string(),
            password: "secret".to_string(),
            project: "PRO".to_string(),
        },
        destination: DestinationConfig {
            url: "https://gitlab.example.com/".to_string(),
            token: "glpat-secret".to_string(),
            project: Some(PROJECT_PATH.to_string()),
            project_id: None,
        },
        options,
        identities,
    }
}

pub fn options() -> MigrationOptions {
    MigrationOptions::default()
}

pub fn impersonating() -> MigrationOptions {
    MigrationOptions {
        author_attribution: AuthorAttribution::Impersonate,
        ..MigrationOptions::default()
    }
}

/// Jira fake serving a fixed issue set.
#[derive(Default)]
pub struct FakeJira {
    pub issues: Vec<SourceIssue>,
    pub details: HashMap<String, IssueDetail>,
    pub files: HashMap<String, Vec<u8>>,
    pub unreachable: bool,
    pub search_calls: AtomicUsize,
}

impl FakeJira {
    pub fn new(issues: Vec<SourceIssue>) -> Self {
        Self {
            issues,
            ..Default::default()
        }
    }

    pub fn with_detail(mut self, issue_id: &str, detail: IssueDetail) -> Self {
        for attachment in &detail.attachments {
            self.files.insert(
                attachment.content_url.clone(),
                format!("bytes of {}", attachment.filename).into_bytes(),
            );
        }
        self.details.insert(issue_id.to_string(), detail);
        self
    }
}

#[async_trait]
impl SourceTracker for FakeJira {
    async fn probe(&self) -> Result<(), SourceError> {
        if self.unreachable {
            return Err(SourceError::Status {
                url: JIRA_URL.to_string(),
                status: 401,
                reason: "Unauthorized".to_string(),
            });
        }
        Ok(())
    }

    async fn search_issues(
        &self,
        _project: &str,
        _max_results: u32,
    ) -> Result<Vec<SourceIssue>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.issues.clone())
    }

    async fn issue_detail(&self, issue_id: &str) -> Result<IssueDetail, SourceError> {
        Ok(self.details.get(issue_id).cloned().unwrap_or_default())
    }

    async fn download_attachment(&self, content_url: &str) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(content_url)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                url: content_url.to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            })
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{JIRA_URL}browse/{key}")
    }
}

/// An issue stored by the GitLab fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIssue {
    pub title: String,
    pub closed_at: Option<String>,
    pub notes: Vec<String>,
}

#[derive(Default)]
struct State {
    issues: BTreeMap<u64, StoredIssue>,
    next_iid: u64,
    calls: Vec<Call>,
}

/// GitLab fake keeping issues in memory and recording every call.
#[derive(Default)]
pub struct FakeGitLab {
    state: Mutex<State>,
    /// Projects known to the instance.
    pub projects: Vec<ProjectRef>,
    /// Whether `find_project` answers; when false only the listing finds projects.
    pub direct_lookup: bool,
    /// Page size of the issue and project listings.
    pub page_size: usize,
    pub users: HashMap<String, u64>,
    pub failing_titles: HashSet<String>,
    pub failing_note_bodies: HashSet<String>,
    pub failing_deletes: HashSet<u64>,
    /// Users without an account; creating an issue as one of them fails.
    pub unknown_users: HashSet<String>,
    /// Number of `find_project` and `list_projects` calls.
    pub project_lookups: AtomicUsize,
}

impl FakeGitLab {
    pub fn new() -> Self {
        Self {
            projects: vec![ProjectRef {
                id: PROJECT_ID,
                path_with_namespace: PROJECT_PATH.to_string(),
            }],
            direct_lookup: true,
            page_size: 2,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn issues(&self) -> BTreeMap<u64, StoredIssue> {
        self.state.lock().unwrap().issues.clone()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Create { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn page<T: Clone>(&self, items: &[T], cursor: Option<String>) -> Page<T> {
        let start: usize = cursor.map_or(0, |c| c.parse().unwrap());
        let end = (start + self.page_size).min(items.len());
        Page {
            items: items[start..end].to_vec(),
            next: (end < items.len()).then(|| end.to_string()),
        }
    }
}

#[async_trait]
impl DestinationTracker for FakeGitLab {
    async fn probe(&self) -> Result<(), DestinationError> {
        Ok(())
    }

    async fn find_project(&self, path: &str) -> Result<Option<ProjectRef>, DestinationError> {
        self.project_lookups.fetch_add(1, Ordering::SeqCst);
        if !self.direct_lookup {
            return Ok(None);
        }
        Ok(self
            .projects
            .iter()
            .find(|p| p.path_with_namespace == path)
            .cloned())
    }

    async fn list_projects(
        &self,
        _search: &str,
        cursor: Option<String>,
    ) -> Result<Page<ProjectRef>, DestinationError> {
        self.project_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.page(&self.projects, cursor))
    }

    async fn list_issues(
        &self,
        project_id: u64,
        cursor: Option<String>,
    ) -> Result<Page<ExistingIssue>, DestinationError> {
        assert_eq!(project_id, PROJECT_ID);
        let existing: Vec<ExistingIssue> = self
            .issues()
            .into_iter()
            .map(|(iid, issue)| ExistingIssue {
                iid,
                title: issue.title,
            })
            .collect();
        Ok(self.page(&existing, cursor))
    }

    async fn delete_issue(&self, _project_id: u64, iid: u64) -> Result<(), DestinationError> {
        self.record(Call::Delete { iid });
        if self.failing_deletes.contains(&iid) {
            return Err(server_error("delete"));
        }
        self.state.lock().unwrap().issues.remove(&iid);
        Ok(())
    }

    async fn create_issue(
        &self,
        project_id: u64,
        issue: &NewIssue,
    ) -> Result<CreatedIssue, DestinationError> {
        assert_eq!(project_id, PROJECT_ID);
        self.record(Call::Create {
            title: issue.title.clone(),
            labels: issue.labels.clone(),
            created_at: issue.created_at.clone(),
            assignee_ids: issue.assignee_ids.clone(),
            sudo: issue.sudo.clone(),
        });
        if self.failing_titles.contains(&issue.title) {
            return Err(server_error("create"));
        }
        if let Some(sudo) = &issue.sudo {
            if self.unknown_users.contains(sudo) {
                return Err(DestinationError::Status {
                    url: "create".to_string(),
                    status: 403,
                    reason: "Forbidden".to_string(),
                });
            }
        }

        let mut state = self.state.lock().unwrap();
        state.next_iid += 1;
        let iid = state.next_iid;
        state.issues.insert(
            iid,
            StoredIssue {
                title: issue.title.clone(),
                closed_at: None,
                notes: Vec::new(),
            },
        );
        Ok(CreatedIssue {
            iid,
            web_url: None,
        })
    }

    async fn close_issue(
        &self,
        _project_id: u64,
        iid: u64,
        closed_at: &str,
    ) -> Result<(), DestinationError> {
        self.record(Call::Close {
            iid,
            closed_at: closed_at.to_string(),
        });
        let mut state = self.state.lock().unwrap();
        if let Some(issue) = state.issues.get_mut(&iid) {
            issue.closed_at = Some(closed_at.to_string());
        }
        Ok(())
    }

    async fn create_note(
        &self,
        _project_id: u64,
        iid: u64,
        note: &NewNote,
    ) -> Result<(), DestinationError> {
        self.record(Call::Note {
            iid,
            body: note.body.clone(),
            created_at: note.created_at.clone(),
            sudo: note.sudo.clone(),
        });
        if self.failing_note_bodies.contains(&note.body) {
            return Err(server_error("note"));
        }
        let mut state = self.state.lock().unwrap();
        if let Some(issue) = state.issues.get_mut(&iid) {
            issue.notes.push(note.body.clone());
        }
        Ok(())
    }

    async fn upload_file(
        &self,
        _project_id: u64,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<UploadResult, DestinationError> {
        self.record(Call::Upload {
            filename: filename.to_string(),
            content,
        });
        Ok(UploadResult {
            markdown: format!("[{filename}](/uploads/abc123/{filename})"),
        })
    }

    async fn find_user_id(&self, username: &str) -> Result<Option<u64>, DestinationError> {
        self.record(Call::FindUser {
            username: username.to_string(),
        });
        Ok(self.users.get(username).copied())
    }
}
