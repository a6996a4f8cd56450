use async_trait::async_trait;
use base64::Engine;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{assigned_open_items_query, RawWorkItem, RemoteError, WorkItemClient, BATCH_SIZE};
use crate::model::project::Project;

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
const API_VERSION: &str = "7.1";

/// Azure DevOps REST client. Holds no credentials; every call is signed
/// with the token of the project it targets.
pub struct AzureDevOpsClient {
    base_url: String,
    client: reqwest::Client,
}

impl AzureDevOpsClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn project_base(&self, project: &Project) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(&project.organization),
            urlencoding::encode(&project.project)
        )
    }

    fn authorized(&self, request: RequestBuilder, project: &Project) -> RequestBuilder {
        request.header("Authorization", auth_header(&project.access_token))
    }
}

impl Default for AzureDevOpsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Basic credential with an empty user name and the token as password.
pub fn auth_header(access_token: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{access_token}"));
    format!("Basic {encoded}")
}

#[derive(Deserialize)]
struct WiqlResponse {
    #[serde(rename = "workItems", default)]
    work_items: Vec<WiqlReference>,
}

#[derive(Deserialize)]
struct WiqlReference {
    id: i64,
}

#[derive(Deserialize)]
struct BatchResponse {
    #[serde(default)]
    value: Vec<RawWorkItem>,
}

/// Split a response into its body text when the status is not a success.
async fn failure_body(resp: Response) -> Result<Response, (u16, String)> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| String::from("Unable to read response"));
    Err((status.as_u16(), body))
}

#[async_trait]
impl WorkItemClient for AzureDevOpsClient {
    async fn query_assigned_open_item_ids(
        &self,
        project: &Project,
    ) -> Result<Vec<i64>, RemoteError> {
        let url = format!(
            "{}/_apis/wit/wiql?api-version={API_VERSION}",
            self.project_base(project)
        );
        let resp = self
            .authorized(self.client.post(&url), project)
            .json(&json!({ "query": assigned_open_items_query() }))
            .send()
            .await?;
        let resp = failure_body(resp)
            .await
            .map_err(|(status, body)| RemoteError::Query { status, body })?;

        let wiql: WiqlResponse = resp.json().await?;
        let ids: Vec<i64> = wiql.work_items.into_iter().map(|r| r.id).collect();
        debug!(project = %project.name, count = ids.len(), "wiql query returned ids");
        Ok(ids)
    }

    async fn fetch_item_details(
        &self,
        project: &Project,
        ids: &[i64],
        fields: &[&str],
    ) -> Result<Vec<RawWorkItem>, RemoteError> {
        if ids.len() > BATCH_SIZE {
            return Err(RemoteError::BatchTooLarge(ids.len()));
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/_apis/wit/workitems?ids={ids}&fields={}&api-version={API_VERSION}",
            self.project_base(project),
            fields.join(",")
        );
        let resp = self
            .authorized(self.client.get(&url), project)
            .send()
            .await?;
        let resp = failure_body(resp)
            .await
            .map_err(|(status, body)| RemoteError::Fetch { status, body })?;

        let batch: BatchResponse = resp.json().await?;
        Ok(batch.value)
    }

    async fn update_field(
        &self,
        project: &Project,
        item_id: i64,
        field: &str,
        value: f64,
    ) -> Result<RawWorkItem, RemoteError> {
        let url = format!(
            "{}/{}/_apis/wit/workitems/{item_id}?api-version={API_VERSION}",
            self.base_url,
            urlencoding::encode(&project.organization)
        );
        let patch = json!([{ "op": "replace", "path": format!("/fields/{field}"), "value": value }]);
        let resp = self
            .authorized(self.client.patch(&url), project)
            .header("Content-Type", "application/json-patch+json")
            .body(patch.to_string())
            .send()
            .await?;
        let resp = failure_body(resp)
            .await
            .map_err(|(status, body)| RemoteError::Update { status, body })?;

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::fields;
    use httpmock::MockServer;

    fn project() -> Project {
        Project {
            id: "1".into(),
            name: "Web".into(),
            organization: "contoso".into(),
            project: "WebShop".into(),
            access_token: "secret-pat".into(),
        }
    }

    #[test]
    fn project_base_escapes_components() {
        let client = AzureDevOpsClient::with_base_url("https://dev.azure.com/");
        let mut p = project();
        p.organization = "my org".into();
        p.project = "Web Shop".into();
        assert_eq!(
            client.project_base(&p),
            "https://dev.azure.com/my%20org/Web%20Shop"
        );
    }

    #[test]
    fn auth_header_uses_empty_user() {
        // base64(":secret-pat")
        assert_eq!(auth_header("secret-pat"), "Basic OnNlY3JldC1wYXQ=");
    }

    #[tokio::test]
    async fn query_posts_wiql_with_auth() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/contoso/WebShop/_apis/wit/wiql")
                    .query_param("api-version", "7.1")
                    .header("Authorization", auth_header("secret-pat"))
                    .body_contains("@Me");
                then.status(200).json_body(serde_json::json!({
                    "queryType": "flat",
                    "workItems": [ { "id": 12, "url": "x" }, { "id": 7, "url": "y" } ]
                }));
            })
            .await;

        let client = AzureDevOpsClient::with_base_url(&server.base_url());
        let ids = client.query_assigned_open_item_ids(&project()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(ids, vec![12, 7]);
    }

    #[tokio::test]
    async fn query_without_work_items_is_empty() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("POST");
                then.status(200).json_body(serde_json::json!({ "queryType": "flat" }));
            })
            .await;

        let client = AzureDevOpsClient::with_base_url(&server.base_url());
        let ids = client.query_assigned_open_item_ids(&project()).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn query_failure_carries_status_and_body() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("POST");
                then.status(401).body("Access denied");
            })
            .await;

        let client = AzureDevOpsClient::with_base_url(&server.base_url());
        let err = client
            .query_assigned_open_item_ids(&project())
            .await
            .unwrap_err();
        match err {
            RemoteError::Query { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Access denied");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fetch_details_requests_ids_and_fields() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/contoso/WebShop/_apis/wit/workitems")
                    .query_param("ids", "1,2")
                    .query_param("fields", fields::DETAIL_FIELDS.join(","))
                    .header("Authorization", auth_header("secret-pat"));
                then.status(200).json_body(serde_json::json!({
                    "count": 2,
                    "value": [
                        { "id": 1, "rev": 4, "fields": { "System.Title": "One" } },
                        { "id": 2, "rev": 1, "fields": { "System.Title": "Two",
                            "Microsoft.VSTS.Scheduling.OriginalEstimate": 8.0 } }
                    ]
                }));
            })
            .await;

        let client = AzureDevOpsClient::with_base_url(&server.base_url());
        let items = client
            .fetch_item_details(&project(), &[1, 2], fields::DETAIL_FIELDS)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].rev, 4);
        assert_eq!(items[1].fields.original_estimate, Some(8.0));
    }

    #[tokio::test]
    async fn fetch_details_rejects_oversized_batch() {
        let client = AzureDevOpsClient::with_base_url("http://127.0.0.1:9");
        let ids: Vec<i64> = (0..201).collect();
        let err = client
            .fetch_item_details(&project(), &ids, fields::DETAIL_FIELDS)
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::BatchTooLarge(201)));
    }

    #[tokio::test]
    async fn fetch_failure_is_fetch_error() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("GET");
                then.status(500).body("boom");
            })
            .await;

        let client = AzureDevOpsClient::with_base_url(&server.base_url());
        let err = client
            .fetch_item_details(&project(), &[1], fields::DETAIL_FIELDS)
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Fetch { status: 500, .. }));
    }

    #[tokio::test]
    async fn update_sends_json_patch_to_org_endpoint() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("PATCH")
                    .path("/contoso/_apis/wit/workitems/42")
                    .query_param("api-version", "7.1")
                    .header("Content-Type", "application/json-patch+json")
                    .header("Authorization", auth_header("secret-pat"))
                    .json_body(serde_json::json!([{
                        "op": "replace",
                        "path": "/fields/Microsoft.VSTS.Scheduling.RemainingWork",
                        "value": 3.5
                    }]));
                then.status(200).json_body(serde_json::json!({
                    "id": 42, "rev": 9,
                    "fields": { "Microsoft.VSTS.Scheduling.RemainingWork": 3.5 }
                }));
            })
            .await;

        let client = AzureDevOpsClient::with_base_url(&server.base_url());
        let updated = client
            .update_field(&project(), 42, fields::REMAINING_WORK, 3.5)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(updated.rev, 9);
        assert_eq!(updated.fields.remaining_work, Some(3.5));
    }

    #[tokio::test]
    async fn update_failure_carries_body() {
        let server = MockServer::start();
        server
            .mock_async(|when, then| {
                when.method("PATCH");
                then.status(400).body("TF401320: Rule Error");
            })
            .await;

        let client = AzureDevOpsClient::with_base_url(&server.base_url());
        let err = client
            .update_field(&project(), 42, fields::COMPLETED_WORK, 1.0)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Update failed (400): TF401320: Rule Error");
    }
}
