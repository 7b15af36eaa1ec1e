/// Which remote call failed for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Fetch,
    Update,
    Create,
}

/// Result of handling a single CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// `persisted` is false when the new key could not be written back.
    Created { key: String, persisted: bool },
    Updated { key: String },
    Skipped { missing: Vec<&'static str> },
    Failed { reason: FailureReason, message: String },
}

impl RowOutcome {
    /// Jira key for rows that reached Jira successfully.
    pub fn key(&self) -> Option<&str> {
        match self {
            RowOutcome::Created { key, .. } | RowOutcome::Updated { key } => Some(key),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Keys in processing order.
    pub processed: Vec<String>,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Created { .. } => self.created += 1,
            RowOutcome::Updated { .. } => self.updated += 1,
            RowOutcome::Skipped { .. } => self.skipped += 1,
            RowOutcome::Failed { .. } => self.failed += 1,
        }
        if let Some(key) = outcome.key() {
            self.processed.push(key.to_string());
        }
    }

    pub fn message(&self) -> String {
        if self.processed.is_empty() {
            "No issues were processed.".to_string()
        } else {
            format!(
                "Successfully processed {} issues: {}",
                self.processed.len(),
                self.processed.join(", ")
            )
        }
    }
}
