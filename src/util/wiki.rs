/// Convert spreadsheet-encoded acceptance criteria into plain text.
///
/// Cells carry line breaks as the two-character sequence `\n` and use
/// wiki-style `*` bullets. Each pseudo-line gets its bullets rewritten to
/// `- `, is trimmed, and the lines are joined with real newlines.
pub fn format_acceptance_criteria(criteria: &str) -> String {
    criteria
        .split("\\n")
        .map(|line| line.replace('*', "- ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
