//! Commands that work on a saved record file.
//!
//! The file is a JSON object of record fields (wire names). It is applied
//! to a fresh record the same way a form edit is, so list fields of the
//! wrong type become empty lists instead of failing the load.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use serde_json::json;
use support_core::RelayGateway;
use support_core::Step;
use support_core::SubmitError;
use support_core::SupportSession;
use support_core::config::ConfigLoader;
use support_core::summary::write_summary;
use support_core::translate;
use support_protocol::RecordPatch;
use support_protocol::SupportPayload;
use support_protocol::SupportRecord;

use crate::EXIT_INVALID_RECORD;
use crate::EXIT_SUBMISSION_FAILED;

/// Arguments for `submit`
#[derive(Debug, Parser)]
pub struct SubmitArgs {
    /// JSON file holding the record fields
    #[arg(long = "record", short = 'r', value_name = "FILE")]
    pub record: PathBuf,

    /// Client configuration file (defaults to ./support-form.toml)
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output as JSON instead of text
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}

/// Arguments for `preview`
#[derive(Debug, Parser)]
pub struct PreviewArgs {
    /// JSON file holding the record fields
    #[arg(long = "record", short = 'r', value_name = "FILE")]
    pub record: PathBuf,
}

/// Arguments for `summary`
#[derive(Debug, Parser)]
pub struct SummaryArgs {
    /// JSON file holding the record fields
    #[arg(long = "record", short = 'r', value_name = "FILE")]
    pub record: PathBuf,

    /// Directory the summary is written to
    #[arg(long = "out", short = 'o', value_name = "DIR", default_value = ".")]
    pub out: PathBuf,
}

pub fn load_patch(path: &Path) -> anyhow::Result<RecordPatch> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("record {} is not valid JSON", path.display()))?;
    RecordPatch::from_json(value)
        .with_context(|| format!("record {} has invalid fields", path.display()))
}

pub fn load_record(path: &Path) -> anyhow::Result<SupportRecord> {
    let mut record = SupportRecord::default();
    record.apply(load_patch(path)?);
    Ok(record)
}

impl SubmitArgs {
    pub async fn run(self) -> anyhow::Result<i32> {
        let config = ConfigLoader::load_from(self.config.as_deref())?;
        let patch = load_patch(&self.record)?;
        let gateway = RelayGateway::new(&config.relay_url, config.request_timeout())?;
        let session = SupportSession::new(config.flow_options(), Arc::new(gateway));
        session.update(patch).await;

        // Walk the steps in order so the first invalid one is reported.
        while session.current_step().await != Step::Review {
            if let Err(err) = session.advance().await {
                if self.json {
                    print_json(&json!({
                        "success": false,
                        "kind": "invalid_record",
                        "message": err.to_string(),
                    }))?;
                } else {
                    eprintln!("Error: {err}");
                }
                return Ok(EXIT_INVALID_RECORD);
            }
        }

        match session.submit().await {
            Ok(receipt) => {
                let ticket_id = receipt.ticket_id.map(|id| id.to_string());
                if self.json {
                    print_json(&json!({
                        "success": true,
                        "message": receipt.message,
                        "ticketId": ticket_id,
                    }))?;
                } else {
                    println!("{}", receipt.message);
                    println!("Ticket ID: {}", ticket_id.as_deref().unwrap_or("Pending"));
                }
                Ok(0)
            }
            Err(SubmitError::Rejected(err)) => {
                if self.json {
                    print_json(&json!({
                        "success": false,
                        "kind": err.kind,
                        "status": err.status,
                        "message": err.message,
                        "retryable": err.is_retryable(),
                    }))?;
                } else {
                    eprintln!("Error: {}", err.message);
                }
                Ok(EXIT_SUBMISSION_FAILED)
            }
            Err(err) => {
                eprintln!("Error: {err}");
                Ok(EXIT_INVALID_RECORD)
            }
        }
    }
}

impl PreviewArgs {
    pub fn run(self) -> anyhow::Result<i32> {
        let record = load_record(&self.record)?;
        let envelope = translate(&SupportPayload::from(&record));
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        Ok(0)
    }
}

impl SummaryArgs {
    pub fn run(self) -> anyhow::Result<i32> {
        let record = load_record(&self.record)?;
        let path = write_summary(&record, &self.out)?;
        println!("{}", path.display());
        Ok(0)
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
