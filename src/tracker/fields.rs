use serde_json::{json, Value};

use super::FieldSet;
use crate::config::FieldMapping;
use crate::model::record::Record;
use crate::util::wiki::format_acceptance_criteria;

fn core_fields(record: &Record, mapping: &FieldMapping) -> FieldSet {
    let mut fields = FieldSet::new();
    fields.insert("summary".into(), Value::String(record.summary.clone()));
    fields.insert("description".into(), Value::String(record.description.clone()));
    fields.insert(
        mapping.acceptance_criteria.clone(),
        Value::String(format_acceptance_criteria(&record.acceptance_criteria)),
    );
    fields
}

/// Fields for a new story. Empty optional columns are left out entirely.
pub fn create_fields(record: &Record, mapping: &FieldMapping) -> FieldSet {
    let mut fields = core_fields(record, mapping);
    fields.insert("project".into(), json!({ "key": mapping.project_key }));
    fields.insert("issuetype".into(), json!({ "name": mapping.issue_type }));
    if let Some(link) = record.design_link() {
        fields.insert(mapping.design_link.clone(), Value::String(link.to_string()));
    }
    if let Some(epic) = record.epic() {
        fields.insert("parent".into(), json!({ "key": epic }));
    }
    fields
}

/// Fields for an existing story. Empty optional columns are sent as null so
/// a value removed from the sheet is also removed in Jira.
pub fn update_fields(record: &Record, mapping: &FieldMapping) -> FieldSet {
    let mut fields = core_fields(record, mapping);
    fields.insert(
        mapping.design_link.clone(),
        record
            .design_link()
            .map_or(Value::Null, |link| Value::String(link.to_string())),
    );
    fields.insert(
        "parent".into(),
        record.epic().map_or(Value::Null, |epic| json!({ "key": epic })),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(design_link: &str, epic: &str) -> Record {
        Record {
            issue_id: String::new(),
            summary: "Checkout flow".into(),
            description: "Users can pay by card".into(),
            acceptance_criteria: r"Given a cart\n*Pay button shown".into(),
            design_link: design_link.into(),
            epic: epic.into(),
        }
    }

    #[test]
    fn create_includes_project_type_and_formatted_criteria() {
        let fields = create_fields(&record("", ""), &FieldMapping::default());
        assert_eq!(fields["project"], json!({ "key": "NA" }));
        assert_eq!(fields["issuetype"], json!({ "name": "Story" }));
        assert_eq!(fields["summary"], "Checkout flow");
        assert_eq!(fields["description"], "Users can pay by card");
        assert_eq!(fields["customfield_10130"], "Given a cart\n- Pay button shown");
    }

    #[test]
    fn create_omits_empty_optionals() {
        let fields = create_fields(&record("", "  "), &FieldMapping::default());
        assert!(!fields.contains_key("customfield_10131"));
        assert!(!fields.contains_key("parent"));
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn create_includes_present_optionals() {
        let fields = create_fields(
            &record("https://figma.com/file/abc", "NA-1"),
            &FieldMapping::default(),
        );
        assert_eq!(fields["customfield_10131"], "https://figma.com/file/abc");
        assert_eq!(fields["parent"], json!({ "key": "NA-1" }));
    }

    #[test]
    fn update_clears_empty_optionals() {
        let fields = update_fields(&record("", ""), &FieldMapping::default());
        assert!(fields.contains_key("customfield_10131"));
        assert!(fields["customfield_10131"].is_null());
        assert!(fields.contains_key("parent"));
        assert!(fields["parent"].is_null());
    }

    #[test]
    fn update_sets_present_optionals() {
        let fields = update_fields(&record("https://figma.com/x", "NA-2"), &FieldMapping::default());
        assert_eq!(fields["customfield_10131"], "https://figma.com/x");
        assert_eq!(fields["parent"], json!({ "key": "NA-2" }));
    }

    #[test]
    fn update_never_touches_project_or_type() {
        let fields = update_fields(&record("", ""), &FieldMapping::default());
        assert!(!fields.contains_key("project"));
        assert!(!fields.contains_key("issuetype"));
        assert_eq!(fields["customfield_10130"], "Given a cart\n- Pay button shown");
    }

    #[test]
    fn custom_mapping_is_honoured() {
        let mapping = FieldMapping {
            project_key: "WEB".into(),
            issue_type: "Task".into(),
            acceptance_criteria: "customfield_1".into(),
            design_link: "customfield_2".into(),
        };
        let fields = create_fields(&record("link", ""), &mapping);
        assert_eq!(fields["project"], json!({ "key": "WEB" }));
        assert_eq!(fields["issuetype"], json!({ "name": "Task" }));
        assert!(fields.contains_key("customfield_1"));
        assert_eq!(fields["customfield_2"], "link");
    }
}
