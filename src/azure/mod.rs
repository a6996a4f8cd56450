pub mod client;
pub mod error;
pub mod urls;

use async_trait::async_trait;
use serde::Deserialize;

pub use error::RemoteError;

use crate::model::project::Project;

/// Maximum ids per batch detail request.
pub const BATCH_SIZE: usize = 200;

pub mod fields {
    pub const ID: &str = "System.Id";
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
    pub const TITLE: &str = "System.Title";
    pub const STATE: &str = "System.State";
    pub const ITERATION_PATH: &str = "System.IterationPath";
    pub const AREA_PATH: &str = "System.AreaPath";
    pub const ASSIGNED_TO: &str = "System.AssignedTo";
    pub const DESCRIPTION: &str = "System.Description";
    pub const PRIORITY: &str = "Microsoft.VSTS.Common.Priority";
    pub const ORIGINAL_ESTIMATE: &str = "Microsoft.VSTS.Scheduling.OriginalEstimate";
    pub const REMAINING_WORK: &str = "Microsoft.VSTS.Scheduling.RemainingWork";
    pub const COMPLETED_WORK: &str = "Microsoft.VSTS.Scheduling.CompletedWork";

    /// Everything the dashboard shows, in request order.
    pub const DETAIL_FIELDS: &[&str] = &[
        ID,
        WORK_ITEM_TYPE,
        TITLE,
        STATE,
        ITERATION_PATH,
        AREA_PATH,
        ASSIGNED_TO,
        DESCRIPTION,
        PRIORITY,
        ORIGINAL_ESTIMATE,
        REMAINING_WORK,
        COMPLETED_WORK,
    ];
}

pub const CLOSED_STATES: &[&str] = &["Closed", "Done", "Removed", "Resolved"];

/// WIQL for open items assigned to the token's identity, newest change first.
pub fn assigned_open_items_query() -> String {
    let closed = CLOSED_STATES
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT [System.Id] FROM WorkItems WHERE [System.AssignedTo] = @Me AND [System.State] NOT IN ({closed}) ORDER BY [System.ChangedDate] DESC"
    )
}

/// A work item as returned by the batch and update endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWorkItem {
    pub id: i64,
    #[serde(default)]
    pub rev: i64,
    #[serde(default)]
    pub fields: RawFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFields {
    #[serde(rename = "System.WorkItemType")]
    pub work_item_type: Option<String>,
    #[serde(rename = "System.Title")]
    pub title: Option<String>,
    #[serde(rename = "System.State")]
    pub state: Option<String>,
    #[serde(rename = "System.IterationPath")]
    pub iteration_path: Option<String>,
    #[serde(rename = "System.AreaPath")]
    pub area_path: Option<String>,
    #[serde(rename = "System.AssignedTo")]
    pub assigned_to: Option<IdentityRef>,
    #[serde(rename = "System.Description")]
    pub description: Option<String>,
    #[serde(rename = "Microsoft.VSTS.Common.Priority")]
    pub priority: Option<i64>,
    #[serde(rename = "Microsoft.VSTS.Scheduling.OriginalEstimate")]
    pub original_estimate: Option<f64>,
    #[serde(rename = "Microsoft.VSTS.Scheduling.RemainingWork")]
    pub remaining_work: Option<f64>,
    #[serde(rename = "Microsoft.VSTS.Scheduling.CompletedWork")]
    pub completed_work: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub display_name: String,
}

/// Remote work item operations, authenticated per project.
#[async_trait]
pub trait WorkItemClient: Send + Sync {
    /// Ids of open items assigned to the caller, most recently changed first.
    async fn query_assigned_open_item_ids(&self, project: &Project)
        -> Result<Vec<i64>, RemoteError>;

    /// Field values for at most [`BATCH_SIZE`] ids.
    async fn fetch_item_details(
        &self,
        project: &Project,
        ids: &[i64],
        fields: &[&str],
    ) -> Result<Vec<RawWorkItem>, RemoteError>;

    /// Replace a single numeric field.
    async fn update_field(
        &self,
        project: &Project,
        item_id: i64,
        field: &str,
        value: f64,
    ) -> Result<RawWorkItem, RemoteError>;
}

#[cfg(test)]
pub mod fake;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_excludes_closed_states() {
        let query = assigned_open_items_query();
        assert!(query.contains("[System.AssignedTo] = @Me"));
        assert!(query.contains("NOT IN ('Closed', 'Done', 'Removed', 'Resolved')"));
        assert!(query.ends_with("ORDER BY [System.ChangedDate] DESC"));
    }

    #[test]
    fn raw_item_parses_missing_fields_as_none() {
        let json = r#"{
            "id": 42,
            "rev": 3,
            "fields": {
                "System.Title": "Fix login",
                "System.AssignedTo": { "displayName": "Ada", "uniqueName": "ada@contoso.com" },
                "Microsoft.VSTS.Scheduling.RemainingWork": 4.5
            }
        }"#;
        let raw: RawWorkItem = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, 42);
        assert_eq!(raw.rev, 3);
        assert_eq!(raw.fields.title.as_deref(), Some("Fix login"));
        assert_eq!(raw.fields.assigned_to.unwrap().display_name, "Ada");
        assert_eq!(raw.fields.remaining_work, Some(4.5));
        assert_eq!(raw.fields.original_estimate, None);
        assert_eq!(raw.fields.priority, None);
    }

    #[test]
    fn detail_fields_cover_all_columns() {
        assert_eq!(fields::DETAIL_FIELDS.len(), 12);
        assert!(fields::DETAIL_FIELDS.contains(&fields::COMPLETED_WORK));
    }
}
