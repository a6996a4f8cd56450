use serde::{Deserialize, Serialize};

/// One configured Azure DevOps connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Display label
    pub name: String,
    pub organization: String,
    pub project: String,
    pub access_token: String,
}

impl Project {
    /// Build a project with an id that is not already used in `existing`.
    pub fn new(
        name: String,
        organization: String,
        project: String,
        access_token: String,
        existing: &[Project],
    ) -> Self {
        Self {
            id: generate_id(existing),
            name,
            organization,
            project,
            access_token,
        }
    }
}

fn generate_id(existing: &[Project]) -> String {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    while existing.iter().any(|p| p.id == stamp.to_string()) {
        stamp += 1;
    }
    stamp.to_string()
}

/// Which projects a load covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectScope {
    #[default]
    All,
    Project(String),
}

impl ProjectScope {
    /// Projects a load in this scope should query, in configured order.
    pub fn resolve<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        match self {
            ProjectScope::All => projects.iter().collect(),
            ProjectScope::Project(id) => projects.iter().filter(|p| &p.id == id).collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ProjectScope::All)
    }

    /// All, then each project in order, then back to All.
    pub fn cycle(&self, projects: &[Project]) -> ProjectScope {
        let next_index = match self {
            ProjectScope::All => 0,
            ProjectScope::Project(id) => match projects.iter().position(|p| &p.id == id) {
                Some(i) => i + 1,
                None => projects.len(),
            },
        };
        match projects.get(next_index) {
            Some(p) => ProjectScope::Project(p.id.clone()),
            None => ProjectScope::All,
        }
    }

    pub fn label(&self, projects: &[Project]) -> String {
        match self {
            ProjectScope::All => "All projects".into(),
            ProjectScope::Project(id) => projects
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unknown project".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str) -> Project {
        Project {
            id: id.into(),
            name: format!("Project {id}"),
            organization: "contoso".into(),
            project: id.into(),
            access_token: "pat".into(),
        }
    }

    #[test]
    fn new_project_id_is_unique() {
        let first = Project::new("A".into(), "org".into(), "A".into(), "t".into(), &[]);
        let existing = vec![first.clone()];
        let second = Project::new("B".into(), "org".into(), "B".into(), "t".into(), &existing);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn resolve_single_scope_filters_by_id() {
        let projects = vec![project("1"), project("2")];
        let scope = ProjectScope::Project("2".into());
        let resolved = scope.resolve(&projects);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "2");
    }

    #[test]
    fn resolve_unknown_project_is_empty() {
        let projects = vec![project("1")];
        assert!(ProjectScope::Project("9".into()).resolve(&projects).is_empty());
    }

    #[test]
    fn cycle_walks_projects_and_wraps() {
        let projects = vec![project("1"), project("2")];
        let s1 = ProjectScope::All.cycle(&projects);
        assert_eq!(s1, ProjectScope::Project("1".into()));
        let s2 = s1.cycle(&projects);
        assert_eq!(s2, ProjectScope::Project("2".into()));
        assert_eq!(s2.cycle(&projects), ProjectScope::All);
    }

    #[test]
    fn cycle_with_no_projects_stays_all() {
        assert_eq!(ProjectScope::All.cycle(&[]), ProjectScope::All);
    }
}
