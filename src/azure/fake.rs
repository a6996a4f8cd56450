//! In-memory [`WorkItemClient`] used by pipeline and app tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{RawFields, RawWorkItem, RemoteError, WorkItemClient};
use crate::model::project::Project;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(String),
    Fetch(String, Vec<i64>),
    Update {
        project_id: String,
        token: String,
        item_id: i64,
        field: String,
        value: f64,
    },
}

#[derive(Clone, Default)]
pub struct FakeClient {
    ids: HashMap<String, Vec<i64>>,
    failing_queries: HashSet<String>,
    failing_fetches: HashSet<String>,
    fail_updates: bool,
    pub calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(mut self, project_id: &str, ids: Vec<i64>) -> Self {
        self.ids.insert(project_id.to_string(), ids);
        self
    }

    pub fn with_query_failure(mut self, project_id: &str) -> Self {
        self.failing_queries.insert(project_id.to_string());
        self
    }

    pub fn with_fetch_failure(mut self, project_id: &str) -> Self {
        self.failing_fetches.insert(project_id.to_string());
        self
    }

    pub fn with_update_failure(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .count()
    }
}

pub fn raw_item(id: i64, title: &str) -> RawWorkItem {
    RawWorkItem {
        id,
        rev: 1,
        fields: RawFields {
            work_item_type: Some("Task".into()),
            title: Some(title.into()),
            state: Some("Active".into()),
            iteration_path: Some("Contoso\\Sprint 1".into()),
            ..RawFields::default()
        },
    }
}

#[async_trait]
impl WorkItemClient for FakeClient {
    async fn query_assigned_open_item_ids(
        &self,
        project: &Project,
    ) -> Result<Vec<i64>, RemoteError> {
        self.calls.lock().unwrap().push(Call::Query(project.id.clone()));
        if self.failing_queries.contains(&project.id) {
            return Err(RemoteError::Query {
                status: 401,
                body: "unauthorized".into(),
            });
        }
        Ok(self.ids.get(&project.id).cloned().unwrap_or_default())
    }

    async fn fetch_item_details(
        &self,
        project: &Project,
        ids: &[i64],
        _fields: &[&str],
    ) -> Result<Vec<RawWorkItem>, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Fetch(project.id.clone(), ids.to_vec()));
        if self.failing_fetches.contains(&project.id) {
            return Err(RemoteError::Fetch {
                status: 500,
                body: "server error".into(),
            });
        }
        Ok(ids
            .iter()
            .map(|id| raw_item(*id, &format!("{} item {id}", project.name)))
            .collect())
    }

    async fn update_field(
        &self,
        project: &Project,
        item_id: i64,
        field: &str,
        value: f64,
    ) -> Result<RawWorkItem, RemoteError> {
        self.calls.lock().unwrap().push(Call::Update {
            project_id: project.id.clone(),
            token: project.access_token.clone(),
            item_id,
            field: field.to_string(),
            value,
        });
        if self.fail_updates {
            return Err(RemoteError::Update {
                status: 400,
                body: "rule violation".into(),
            });
        }
        Ok(raw_item(item_id, "updated"))
    }
}
