use serde::Deserialize;

pub const COL_ISSUE_ID: &str = "Issue ID";
pub const COL_SUMMARY: &str = "Summary";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_ACCEPTANCE: &str = "Acceptance Criteria";

pub const REQUIRED_FIELDS: [&str; 3] = [COL_SUMMARY, COL_DESCRIPTION, COL_ACCEPTANCE];

/// One user story row. Columns absent from the header read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "Issue ID")]
    pub issue_id: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Acceptance Criteria")]
    pub acceptance_criteria: String,
    #[serde(rename = "Design Link")]
    pub design_link: String,
    #[serde(rename = "Epic")]
    pub epic: String,
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl Record {
    /// Required columns that are missing or blank, in column order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [&self.summary, &self.description, &self.acceptance_criteria];
        REQUIRED_FIELDS
            .into_iter()
            .zip(values)
            .filter(|(_, value)| non_blank(value).is_none())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Existing Jira key, if this row has already been synced.
    pub fn issue_key(&self) -> Option<&str> {
        non_blank(&self.issue_id)
    }

    pub fn design_link(&self) -> Option<&str> {
        non_blank(&self.design_link)
    }

    pub fn epic(&self) -> Option<&str> {
        non_blank(&self.epic)
    }
}
