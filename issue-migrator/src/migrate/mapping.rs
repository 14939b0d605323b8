//! Field mapping from Jira issues to GitLab issue payloads.

use crate::destination::NewIssue;
use crate::source::SourceIssue;

/// Builds the comma-joined label list for an issue.
///
/// Every entry is comma-prefixed, so the list starts with a separator:
/// status, issue type, key, then each fix version.
pub fn build_labels(issue: &SourceIssue) -> String {
    [
        issue.status.as_str(),
        issue.issue_type.as_str(),
        issue.key.as_str(),
    ]
    .into_iter()
    .chain(issue.fix_versions.iter().map(String::as_str))
    .fold(String::new(), |mut labels, label| {
        labels.push(',');
        labels.push_str(label);
        labels
    })
}

/// Maps a source issue onto the creation payload.
pub fn map_issue(issue: &SourceIssue, assignee_ids: Vec<u64>, sudo: Option<String>) -> NewIssue {
    NewIssue {
        title: issue.summary.clone(),
        description: issue.description.clone(),
        created_at: issue.created.clone(),
        labels: build_labels(issue),
        assignee_ids,
        sudo,
    }
}
