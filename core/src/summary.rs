//! Downloadable JSON summary of a support request.

use std::path::Path;
use std::path::PathBuf;

use chrono::Local;
use chrono::NaiveDate;
use support_protocol::SupportRecord;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("failed to write summary: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode summary: {0}")]
    Encode(#[from] serde_json::Error),
}

/// `support-request-{name}-{YYYY-MM-DD}.json`, where `name` is the
/// submitter's name reduced to lowercase ASCII words joined by dashes.
pub fn summary_file_name(record: &SupportRecord, date: NaiveDate) -> String {
    format!(
        "support-request-{}-{}.json",
        sanitize_name(&record.name),
        date.format("%Y-%m-%d")
    )
}

fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "anonymous".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pretty-printed record. Files appear as `{name, size, type}` only.
pub fn render_summary(record: &SupportRecord) -> Result<String, SummaryError> {
    Ok(serde_json::to_string_pretty(record)?)
}

pub fn write_summary_on(
    record: &SupportRecord,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, SummaryError> {
    let contents = render_summary(record)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(summary_file_name(record, date));
    std::fs::write(&path, contents)?;
    info!(path = %path.display(), "summary written");
    Ok(path)
}

/// Write the summary into `dir`, dated today in local time.
pub fn write_summary(record: &SupportRecord, dir: &Path) -> Result<PathBuf, SummaryError> {
    write_summary_on(record, dir, Local::now().date_naive())
}
