use std::collections::BTreeSet;

/// Snapshot of a remote work item as of the last load.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub id: i64,
    pub revision: i64,
    pub work_item_type: String,
    pub title: String,
    pub state: String,
    pub iteration_path: String,
    pub area_path: String,
    pub assigned_to: String,
    /// Raw HTML from the server, untrusted
    pub description: String,
    pub priority: Option<i64>,
    pub original_estimate: Option<f64>,
    pub remaining_work: Option<f64>,
    pub completed_work: Option<f64>,
    /// Id of the configured project this item was loaded through
    pub project_id: String,
    pub project_name: String,
    pub organization: String,
    /// Remote project name, used for links
    pub project: String,
}

impl WorkItem {
    pub fn iteration_name(&self) -> &str {
        last_segment(&self.iteration_path)
    }

    pub fn area_name(&self) -> &str {
        last_segment(&self.area_path)
    }

    pub fn priority_label(&self) -> String {
        match self.priority {
            Some(p) if p != 0 => format!("P{p}"),
            _ => "-".into(),
        }
    }
}

/// Display form of a `\`-separated classification path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}

/// Distinct filter values derived from the loaded items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facets {
    pub types: Vec<String>,
    pub iterations: Vec<String>,
}

impl Facets {
    pub fn from_items(items: &[WorkItem]) -> Self {
        let types: BTreeSet<&str> = items
            .iter()
            .map(|i| i.work_item_type.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        let iterations: BTreeSet<&str> = items
            .iter()
            .map(|i| i.iteration_path.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            types: types.into_iter().map(String::from).collect(),
            iterations: iterations.into_iter().map(String::from).collect(),
        }
    }
}

/// The loaded item list together with its facets. The list is only ever
/// replaced as a whole, and facets are rebuilt on every replacement.
#[derive(Debug, Default)]
pub struct WorkItems {
    items: Vec<WorkItem>,
    facets: Facets,
}

impl WorkItems {
    pub fn replace(&mut self, items: Vec<WorkItem>) {
        self.facets = Facets::from_items(&items);
        self.items = items;
    }

    pub fn all(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn find(&self, project_id: &str, id: i64) -> Option<&WorkItem> {
        self.items
            .iter()
            .find(|i| i.id == id && i.project_id == project_id)
    }

    pub fn find_mut(&mut self, project_id: &str, id: i64) -> Option<&mut WorkItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id && i.project_id == project_id)
    }
}

#[cfg(test)]
pub(crate) fn sample_item(id: i64, project_id: &str) -> WorkItem {
    WorkItem {
        id,
        revision: 1,
        work_item_type: "Task".into(),
        title: format!("Work item {id}"),
        state: "Active".into(),
        iteration_path: "Contoso\\Sprint 1".into(),
        area_path: "Contoso\\Web".into(),
        assigned_to: "Ada Lovelace".into(),
        description: String::new(),
        priority: Some(2),
        original_estimate: None,
        remaining_work: None,
        completed_work: None,
        project_id: project_id.into(),
        project_name: format!("Project {project_id}"),
        organization: "contoso".into(),
        project: "Contoso".into(),
    }
}
