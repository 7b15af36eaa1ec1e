use crate::config::FieldMapping;
use crate::error::Result;
use crate::model::outcome::{FailureReason, RowOutcome, RunSummary};
use crate::model::record::Record;
use crate::store::CsvStore;
use crate::tracker::fields::{create_fields, update_fields};
use crate::tracker::IssueTracker;

/// Walks the CSV once and syncs every valid row with the tracker.
pub struct Pipeline<'a> {
    tracker: &'a dyn IssueTracker,
    store: &'a CsvStore,
    fields: &'a FieldMapping,
}

impl<'a> Pipeline<'a> {
    pub fn new(tracker: &'a dyn IssueTracker, store: &'a CsvStore, fields: &'a FieldMapping) -> Self {
        Self {
            tracker,
            store,
            fields,
        }
    }

    /// Process all rows. Only reading the input can fail the run; per-row
    /// problems end up in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let records = self.store.read_records()?;
        tracing::info!(
            file = %self.store.path().display(),
            rows = records.len(),
            "Loaded user stories"
        );

        let mut summary = RunSummary::default();
        for (row, record) in records.iter().enumerate() {
            let outcome = self.process_record(row, record).await;
            summary.record(&outcome);
        }
        Ok(summary)
    }

    pub async fn process_record(&self, row: usize, record: &Record) -> RowOutcome {
        if !record.is_valid() {
            let missing = record.missing_fields();
            tracing::warn!(
                row = row + 1,
                ?missing,
                ?record,
                "Invalid row, skipping"
            );
            return RowOutcome::Skipped { missing };
        }

        match record.issue_key() {
            Some(key) => self.update_story(key, record).await,
            None => self.create_story(row, record).await,
        }
    }

    async fn update_story(&self, key: &str, record: &Record) -> RowOutcome {
        let issue = match self.tracker.get_issue(key).await {
            Ok(issue) => issue,
            Err(e) => {
                tracing::error!(key, error = %format!("{e:#}"), "Error fetching issue");
                return RowOutcome::Failed {
                    reason: FailureReason::Fetch,
                    message: format!("{e:#}"),
                };
            }
        };
        tracing::debug!(key = %issue.key, id = %issue.id, summary = ?issue.summary, "Fetched issue");

        let fields = update_fields(record, self.fields);
        match self.tracker.update_issue(&issue, fields).await {
            Ok(()) => {
                if issue.key != key {
                    tracing::info!(key, jira_key = %issue.key, "Updated issue (moved in Jira)");
                } else {
                    tracing::info!(key, "Updated issue");
                }
                RowOutcome::Updated {
                    key: key.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(key, error = %format!("{e:#}"), "Error updating issue");
                RowOutcome::Failed {
                    reason: FailureReason::Update,
                    message: format!("{e:#}"),
                }
            }
        }
    }

    async fn create_story(&self, row: usize, record: &Record) -> RowOutcome {
        let fields = create_fields(record, self.fields);
        let key = match self.tracker.create_issue(fields).await {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(
                    summary = %record.summary,
                    error = %format!("{e:#}"),
                    "Error creating issue"
                );
                return RowOutcome::Failed {
                    reason: FailureReason::Create,
                    message: format!("{e:#}"),
                };
            }
        };
        tracing::info!(key = %key, "Created issue");

        let persisted = match self.store.write_issue_id(row, &record.issue_id, &key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    row = row + 1,
                    error = %format!("{e:#}"),
                    "Created issue but could not write its key back to the CSV"
                );
                false
            }
        };
        RowOutcome::Created { key, persisted }
    }
}
