use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::azure::urls::{parse_devops_url, token_settings_url, ParsedLocation};
use crate::azure::client::AzureDevOpsClient;
use crate::azure::WorkItemClient;
use crate::config;
use crate::model::project::Project;

const ADD_USAGE: &str = "Usage: hours add <project-url | org/project> -t <token> [-n <name>]\n\nExamples:\n  hours add https://dev.azure.com/contoso/WebShop -t <token>\n  hours add contoso/WebShop -t <token> -n \"Web shop\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    pub location: ParsedLocation,
    pub token: Option<String>,
    pub name: Option<String>,
}

/// Parse CLI args for `hours add`, check the connection and store the project.
pub async fn handle_add(args: &[String]) -> Result<()> {
    let add = parse_add_args(args)?;
    let client = AzureDevOpsClient::new();
    let project = add_project(&config::config_path(), add, &client).await?;
    println!(
        "Added {} ({}/{}) as {}",
        project.name, project.organization, project.project, project.id
    );
    Ok(())
}

/// Verify the credentials with one query, then append the project to the
/// config at `path`.
pub async fn add_project(
    path: &Path,
    add: AddArgs,
    client: &dyn WorkItemClient,
) -> Result<Project> {
    let ParsedLocation {
        organization,
        project,
    } = add.location;
    let Some(token) = add.token.filter(|t| !t.trim().is_empty()) else {
        bail!(
            "A personal access token is required (-t <token>).\nCreate one with the Work Items (Read & Write) scope at:\n  {}",
            token_settings_url(&organization)
        );
    };

    let mut config = config::load_config_from(path)?;
    if config
        .projects
        .iter()
        .any(|p| p.organization == organization && p.project == project)
    {
        bail!("{organization}/{project} is already configured");
    }

    let name = add.name.unwrap_or_else(|| project.clone());
    let new_project = Project::new(
        name,
        organization,
        project,
        token.trim().to_string(),
        &config.projects,
    );

    let ids = client
        .query_assigned_open_item_ids(&new_project)
        .await
        .with_context(|| {
            format!(
                "Could not connect to {}/{}",
                new_project.organization, new_project.project
            )
        })?;
    tracing::info!(project = %new_project.name, open_items = ids.len(), "project added");

    config.projects.push(new_project.clone());
    config::save_config_to(path, &config)?;
    Ok(new_project)
}

/// Parse `hours add` arguments.
///
/// Supported forms:
///   hours add https://dev.azure.com/contoso/WebShop -t <token>
///   hours add https://contoso.visualstudio.com/WebShop --token <token>
///   hours add contoso/WebShop -t <token> -n "Web shop"
pub fn parse_add_args(args: &[String]) -> Result<AddArgs> {
    if args.is_empty() {
        bail!("{ADD_USAGE}");
    }

    let mut location: Option<String> = None;
    let mut token: Option<String> = None;
    let mut name: Option<String> = None;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            flag @ ("-t" | "--token" | "-n" | "--name") => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("Missing value for {flag}");
                };
                match flag {
                    "-t" | "--token" => token = Some(value.clone()),
                    _ => name = Some(value.clone()),
                }
            }
            other if location.is_none() => location = Some(other.to_string()),
            other => bail!("Unexpected argument '{other}'\n\n{ADD_USAGE}"),
        }
        i += 1;
    }

    let Some(raw) = location else {
        bail!("Missing project location\n\n{ADD_USAGE}");
    };
    let location = parse_location(&raw)
        .with_context(|| format!("Could not read an organization and project from '{raw}'"))?;

    Ok(AddArgs {
        location,
        token,
        name: name.filter(|n| !n.trim().is_empty()),
    })
}

/// A project URL or `org/project`. Both parts must be present.
fn parse_location(raw: &str) -> Option<ParsedLocation> {
    let location = if raw.contains("://") {
        parse_devops_url(raw)?
    } else {
        let (organization, project) = raw.trim().trim_matches('/').split_once('/')?;
        ParsedLocation {
            organization: organization.to_string(),
            project: project.to_string(),
        }
    };
    let valid = !location.organization.is_empty()
        && !location.project.is_empty()
        && !location.project.contains('/');
    valid.then_some(location)
}

pub fn list_projects() -> Result<()> {
    let config = config::load_config()?;
    if config.projects.is_empty() {
        println!("No projects configured. Add one with `hours add`.");
        return Ok(());
    }
    for line in project_lines(&config.projects) {
        println!("{line}");
    }
    Ok(())
}

fn project_lines(projects: &[Project]) -> Vec<String> {
    let width = projects.iter().map(|p| p.name.len()).max().unwrap_or(0);
    projects
        .iter()
        .map(|p| {
            format!(
                "{}  {:width$}  {}/{}",
                p.id, p.name, p.organization, p.project
            )
        })
        .collect()
}

pub fn handle_remove(args: &[String]) -> Result<()> {
    let Some(id) = args.first() else {
        bail!("Usage: hours remove <id>\n\nRun `hours projects` to see ids.");
    };
    let removed = remove_project(&config::config_path(), id)?;
    println!("Removed {}", removed.name);
    Ok(())
}

pub fn remove_project(path: &Path, id: &str) -> Result<Project> {
    let mut config = config::load_config_from(path)?;
    let Some(project) = config.find_project(id).cloned() else {
        bail!("No project with id {id}");
    };
    config.remove_project(id);
    config::save_config_to(path, &config)?;
    Ok(project)
}

pub fn print_help() {
    println!("hours — track effort on your Azure DevOps work items\n");
    println!("USAGE:");
    println!("  hours                        Launch the dashboard");
    println!("  hours add <url> -t <token>   Add an Azure DevOps project");
    println!("  hours projects               List configured projects");
    println!("  hours remove <id>            Remove a project");
    println!();
    println!("ADD OPTIONS:");
    println!("  -t, --token <pat>   Personal access token with Work Items (Read & Write)");
    println!("  -n, --name <name>   Display name (defaults to the project name)");
    println!();
    println!("EXAMPLES:");
    println!("  hours add https://dev.azure.com/contoso/WebShop -t <token>");
    println!("  hours add contoso/WebShop -t <token> -n \"Web shop\"");
    println!();
    println!("Logs are written to {}", config::data_dir().join("logs").display());
}
