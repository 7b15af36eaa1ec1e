use anyhow::{anyhow, bail, Context};
use csv::StringRecord;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{AppError, Result};
use crate::model::record::{Record, COL_ISSUE_ID};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Split off a leading UTF-8 BOM so it can be written back unchanged.
fn split_bom(bytes: &[u8]) -> (&[u8], &[u8]) {
    if bytes.starts_with(UTF8_BOM) {
        bytes.split_at(UTF8_BOM.len())
    } else {
        (&bytes[..0], bytes)
    }
}

// Rows may be shorter or longer than the header; missing cells read as empty.
fn reader(body: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new().flexible(true).from_reader(body)
}

fn is_line_break(b: &u8) -> bool {
    matches!(b, b'\r' | b'\n')
}

/// Serialize one record without its terminator.
fn encode_record(record: &StringRecord) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record)?;
    let mut out = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to encode row: {}", e.error()))?;
    out.pop();
    Ok(out)
}

/// The CSV file user stories are read from and new keys are written back to.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every data row. Row positions in the returned vec are the row
    /// indices `write_issue_id` expects.
    pub fn read_records(&self) -> Result<Vec<Record>> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::InputNotFound(self.path.clone()),
            _ => AppError::Io(e),
        })?;
        let (_, body) = split_bom(&bytes);
        let mut rdr = reader(body);
        let headers = rdr.headers()?.clone();
        let mut records = Vec::new();
        for result in rdr.records() {
            let raw = result?;
            let cells: StringRecord = (0..headers.len())
                .map(|i| raw.get(i).unwrap_or(""))
                .collect();
            records.push(cells.deserialize::<Record>(Some(&headers))?);
        }
        Ok(records)
    }

    /// Set the Issue ID cell of data row `row` to `key`.
    ///
    /// The cell must still hold `expected` (compared trimmed), otherwise the
    /// file was changed under us and nothing is written. Only the bytes of
    /// the target row change: the header, every other row, line endings and
    /// a leading BOM are copied through as they were. The result goes to a
    /// sibling temp file which then replaces the original.
    pub fn write_issue_id(&self, row: usize, expected: &str, key: &str) -> anyhow::Result<()> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let (bom, body) = split_bom(&bytes);

        let mut rdr = reader(body);
        let headers = rdr.headers()?.clone();
        let col = headers
            .iter()
            .position(|h| h == COL_ISSUE_ID)
            .ok_or_else(|| anyhow!("No '{COL_ISSUE_ID}' column in {}", self.path.display()))?;

        let mut target = None;
        let mut end = body.len();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let start = record
                .position()
                .map(|p| p.byte() as usize)
                .ok_or_else(|| anyhow!("Row {} has no position", i + 1))?;
            if i == row {
                target = Some((start, record));
            } else if i > row {
                end = start;
                break;
            }
        }
        let (start, record) =
            target.ok_or_else(|| anyhow!("Row {} not found in {}", row + 1, self.path.display()))?;

        let current = record.get(col).unwrap_or("").trim();
        if current != expected.trim() {
            bail!("Row {} now has Issue ID '{current}', expected '{expected}'", row + 1);
        }

        let width = record.len().max(headers.len());
        let updated: StringRecord = (0..width)
            .map(|j| if j == col { key } else { record.get(j).unwrap_or("") })
            .collect();

        // Keep whatever line breaks surround the row in the original.
        let original = &body[start..end];
        let lead = original.iter().take_while(|b| is_line_break(b)).count();
        let trail = original[lead..]
            .iter()
            .rev()
            .take_while(|b| is_line_break(b))
            .count();

        let mut out = Vec::with_capacity(bytes.len() + key.len());
        out.extend_from_slice(bom);
        out.extend_from_slice(&body[..start + lead]);
        out.extend_from_slice(&encode_record(&updated)?);
        out.extend_from_slice(&body[end - trail..]);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(&out)?;

        let permissions = std::fs::metadata(&self.path)?.permissions();
        std::fs::set_permissions(tmp.path(), permissions)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
