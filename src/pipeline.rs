//! Fans the "my open items" query out over the configured projects and
//! merges the results into one list.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::azure::{fields, RawWorkItem, RemoteError, WorkItemClient, BATCH_SIZE};
use crate::model::project::{Project, ProjectScope};
use crate::model::work_item::WorkItem;

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("Failed to load work items from {project}: {source}")]
    Project {
        project: String,
        #[source]
        source: RemoteError,
    },

    #[error("Loading work items was aborted: {0}")]
    Aborted(String),
}

/// Load every open item assigned to the user within `scope`.
///
/// With [`ProjectScope::All`] a failing project is logged and left out of
/// the result. With a single project scope the failure is returned.
pub async fn load_work_items(
    client: &dyn WorkItemClient,
    projects: &[Project],
    scope: &ProjectScope,
) -> Result<Vec<WorkItem>, AggregationError> {
    let targets = scope.resolve(projects);
    if targets.is_empty() {
        debug!("no projects in scope, nothing to load");
        return Ok(Vec::new());
    }

    match scope {
        ProjectScope::Project(_) => {
            let mut items = Vec::new();
            for project in targets {
                let loaded = load_project(client, project).await.map_err(|source| {
                    AggregationError::Project {
                        project: project.name.clone(),
                        source,
                    }
                })?;
                items.extend(loaded);
            }
            Ok(items)
        }
        ProjectScope::All => {
            let results = join_all(targets.iter().map(|p| load_project(client, p))).await;
            let mut items = Vec::new();
            for (project, result) in targets.iter().zip(results) {
                match result {
                    Ok(loaded) => items.extend(loaded),
                    Err(e) => warn!(project = %project.name, error = %e, "skipping project"),
                }
            }
            info!(count = items.len(), "loaded work items across all projects");
            Ok(items)
        }
    }
}

async fn load_project(
    client: &dyn WorkItemClient,
    project: &Project,
) -> Result<Vec<WorkItem>, RemoteError> {
    let ids = client.query_assigned_open_item_ids(project).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let raw = fetch_in_batches(client, project, &ids).await?;
    Ok(raw
        .into_iter()
        .map(|r| to_work_item(r, project))
        .collect())
}

/// Fetch details in sequential batches of at most [`BATCH_SIZE`] ids,
/// concatenated in request order.
pub async fn fetch_in_batches(
    client: &dyn WorkItemClient,
    project: &Project,
    ids: &[i64],
) -> Result<Vec<RawWorkItem>, RemoteError> {
    let mut all = Vec::with_capacity(ids.len());
    for batch in ids.chunks(BATCH_SIZE) {
        let records = client
            .fetch_item_details(project, batch, fields::DETAIL_FIELDS)
            .await?;
        all.extend(records);
    }
    Ok(all)
}

pub fn to_work_item(raw: RawWorkItem, project: &Project) -> WorkItem {
    let f = raw.fields;
    WorkItem {
        id: raw.id,
        revision: raw.rev,
        work_item_type: f.work_item_type.unwrap_or_default(),
        title: f.title.unwrap_or_default(),
        state: f.state.unwrap_or_default(),
        iteration_path: f.iteration_path.unwrap_or_default(),
        area_path: f.area_path.unwrap_or_default(),
        assigned_to: f.assigned_to.map(|a| a.display_name).unwrap_or_default(),
        description: f.description.unwrap_or_default(),
        priority: f.priority,
        original_estimate: f.original_estimate,
        remaining_work: f.remaining_work,
        completed_work: f.completed_work,
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        organization: project.organization.clone(),
        project: project.project.clone(),
    }
}
