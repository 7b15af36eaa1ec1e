use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{AppError, Result};

pub const ENV_EMAIL: &str = "EMAIL";
pub const ENV_API_TOKEN: &str = "JIRA_API_KEY";
pub const ENV_DOMAIN: &str = "DOMAIN";

pub const DEFAULT_INPUT: &str = "user_stories.csv";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira: JiraConfig,
    pub fields: FieldMapping,
    pub input: PathBuf,
}

#[derive(Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

// Manual Debug impl to avoid leaking the API token
impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// How record columns land in the Jira field schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub project_key: String,
    pub issue_type: String,
    pub acceptance_criteria: String,
    pub design_link: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            project_key: "NA".into(),
            issue_type: "Story".into(),
            acceptance_criteria: "customfield_10130".into(),
            design_link: "customfield_10131".into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    fields: Option<FieldMapping>,
    input: Option<PathBuf>,
}

impl JiraConfig {
    /// Build credentials from any key/value source. Empty values count as
    /// missing. The API token is checked first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_token = get(ENV_API_TOKEN).ok_or_else(|| {
            AppError::Config(format!("{ENV_API_TOKEN} not found in environment variables."))
        })?;
        let email = get(ENV_EMAIL).ok_or_else(|| {
            AppError::Config(format!("{ENV_EMAIL} not found in environment variables."))
        })?;
        let domain = get(ENV_DOMAIN).ok_or_else(|| {
            AppError::Config(format!("{ENV_DOMAIN} not found in environment variables."))
        })?;

        Ok(Self {
            base_url: normalize_base_url(&domain),
            email,
            api_token,
        })
    }
}

/// Accept either a full server URL or a bare Atlassian site name.
pub fn normalize_base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{domain}.atlassian.net")
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read config from {}: {e}", path.display()))
    })?;
    toml::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Failed to parse {}: {e}", path.display())))
}

/// Resolve the run configuration. Precedence is CLI, then TOML file, then
/// built-in defaults.
pub fn load_config(cli: &Cli, jira: JiraConfig) -> Result<AppConfig> {
    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let mut fields = file.fields.unwrap_or_default();
    if let Some(project) = &cli.project {
        fields.project_key = project.clone();
    }

    let input = cli
        .input
        .clone()
        .or(file.input)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    Ok(AppConfig {
        jira,
        fields,
        input,
    })
}
