use reqwest::Url;

use super::client::DEFAULT_BASE_URL;

/// Browser link for a single work item.
pub fn work_item_url(organization: &str, project: &str, id: i64) -> String {
    format!(
        "{DEFAULT_BASE_URL}/{}/{}/_workitems/edit/{id}",
        urlencoding::encode(organization),
        urlencoding::encode(project)
    )
}

/// Page where a personal access token for the organization is created.
pub fn token_settings_url(organization: &str) -> String {
    format!(
        "{DEFAULT_BASE_URL}/{}/_usersSettings/tokens",
        urlencoding::encode(organization)
    )
}

/// Organization and (possibly empty) project taken from a pasted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocation {
    pub organization: String,
    pub project: String,
}

/// Understands `https://dev.azure.com/{org}/{project}/...` and
/// `https://{org}.visualstudio.com/{project}/...`.
pub fn parse_devops_url(raw: &str) -> Option<ParsedLocation> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    let segments: Vec<String> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).map(decode).collect())
        .unwrap_or_default();

    if host == "dev.azure.com" {
        let organization = segments.first()?.clone();
        let project = segments.get(1).cloned().unwrap_or_default();
        return Some(ParsedLocation {
            organization,
            project,
        });
    }

    let organization = host.strip_suffix(".visualstudio.com")?;
    if organization.is_empty() {
        return None;
    }
    Some(ParsedLocation {
        organization: organization.to_string(),
        project: segments.first().cloned().unwrap_or_default(),
    })
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
