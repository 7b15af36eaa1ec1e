use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::{FieldSet, IssueTracker, RemoteIssue};
use crate::config::JiraConfig;
use crate::error::AppError;

pub struct JiraClient {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Self {
        let creds = format!("{}:{}", config.email, config.api_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            base_url: config.base_url.clone(),
            auth_header: format!("Basic {encoded}"),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client and make sure the credentials are accepted.
    pub async fn connect(config: &JiraConfig) -> crate::error::Result<Self> {
        let client = Self::new(config);
        let me = client
            .myself()
            .await
            .map_err(|e| AppError::Connection(format!("{e:#}")))?;
        tracing::info!(
            server = %client.base_url,
            user = me.display_name.as_deref().unwrap_or("unknown"),
            "Connected to Jira"
        );
        Ok(client)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/api/2/{path}", self.base_url))
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }

    async fn myself(&self) -> Result<Myself> {
        let resp = self
            .request(Method::GET, "myself")
            .send()
            .await
            .context("Jira API request failed")?;
        let resp = check_status(resp).await?;
        resp.json().await.context("Failed to parse Jira response")
    }
}

#[derive(Deserialize)]
struct Myself {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Deserialize)]
struct JiraIssue {
    id: String,
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Deserialize, Default)]
struct IssueFields {
    summary: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(rename = "errorMessages", default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

impl ErrorBody {
    fn describe(&self) -> Option<String> {
        let mut parts = self.error_messages.clone();
        for (field, msg) in &self.errors {
            match msg.as_str() {
                Some(text) => parts.push(format!("{field}: {text}")),
                None => parts.push(format!("{field}: {msg}")),
            }
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }
}

/// Turn a non-2xx response into an error carrying Jira's own messages.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.describe())
        .unwrap_or(body);
    if detail.is_empty() {
        bail!("Jira returned {status}");
    }
    bail!("Jira returned {status}: {detail}")
}

#[async_trait]
impl IssueTracker for JiraClient {
    fn name(&self) -> &str {
        "Jira"
    }

    async fn create_issue(&self, fields: FieldSet) -> Result<String> {
        let resp = self
            .request(Method::POST, "issue")
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .context("Jira API request failed")?;
        let created: CreatedIssue = check_status(resp)
            .await?
            .json()
            .await
            .context("Failed to parse Jira response")?;
        Ok(created.key)
    }

    async fn get_issue(&self, key: &str) -> Result<RemoteIssue> {
        let path = format!("issue/{}?fields=summary", urlencoding::encode(key));
        let resp = self
            .request(Method::GET, &path)
            .send()
            .await
            .context("Jira API request failed")?;
        let issue: JiraIssue = check_status(resp)
            .await?
            .json()
            .await
            .context("Failed to parse Jira response")?;
        Ok(RemoteIssue {
            id: issue.id,
            key: issue.key,
            summary: issue.fields.summary,
        })
    }

    async fn update_issue(&self, issue: &RemoteIssue, fields: FieldSet) -> Result<()> {
        let path = format!("issue/{}", urlencoding::encode(&issue.key));
        let resp = self
            .request(Method::PUT, &path)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .context("Jira API request failed")?;
        check_status(resp).await?;
        Ok(())
    }
}
