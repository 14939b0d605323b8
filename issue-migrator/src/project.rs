//! Destination project resolution.

use crate::config::DestinationConfig;
use crate::destination::{pages, DestinationError, DestinationTracker, ProjectRef};
use futures::TryStreamExt;
use std::pin::pin;
use tracing::{debug, info};

/// Determines the destination project.
///
/// A configured numeric id is used as-is. Otherwise the namespaced path is
/// looked up directly, and if that finds nothing the project listing is
/// scanned page by page until an entry with the same path turns up.
///
/// # Errors
///
/// Returns [`DestinationError::ProjectNotFound`] if no project matches, or the
/// underlying error if a lookup request fails.
pub async fn resolve_project<D: DestinationTracker>(
    destination: &D,
    config: &DestinationConfig,
) -> Result<ProjectRef, DestinationError> {
    if let Some(id) = config.project_id {
        debug!(id, "Using configured project id");
        return Ok(ProjectRef {
            id,
            path_with_namespace: config.project.clone().unwrap_or_default(),
        });
    }

    let Some(path) = config.project.as_deref() else {
        return Err(DestinationError::ProjectNotFound {
            project: String::new(),
        });
    };

    if let Some(project) = destination.find_project(path).await? {
        info!(id = project.id, path = %project.path_with_namespace, "Project found");
        return Ok(project);
    }

    debug!(path, "Direct lookup found nothing, scanning project listing");
    let search = path.rsplit('/').next().unwrap_or(path);
    let mut listing = pin!(pages(move |cursor| destination.list_projects(search, cursor)));
    while let Some(page) = listing.try_next().await? {
        if let Some(project) = page
            .into_iter()
            .find(|project| project.path_with_namespace == path)
        {
            info!(id = project.id, path = %project.path_with_namespace, "Project found");
            return Ok(project);
        }
    }

    Err(DestinationError::ProjectNotFound {
        project: path.to_string(),
    })
}
