pub mod fields;
pub mod jira;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A field set as sent in the `fields` object of a Jira request body.
pub type FieldSet = Map<String, Value>;

/// An issue as returned by the tracker. Only what the loader needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIssue {
    pub id: String,
    pub key: String,
    pub summary: Option<String>,
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    fn name(&self) -> &str;
    /// Create an issue and return its key.
    async fn create_issue(&self, fields: FieldSet) -> Result<String>;
    async fn get_issue(&self, key: &str) -> Result<RemoteIssue>;
    async fn update_issue(&self, issue: &RemoteIssue, fields: FieldSet) -> Result<()>;
}
