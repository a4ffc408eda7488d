//! The support record composed across the form steps.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::ProblemType;
use crate::catalog::SupportMethod;
use crate::catalog::UrgencyLevel;

/// Metadata for a file the submitter attached locally.
///
/// File contents never leave the client; only this triple is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    /// Size in kibibytes with one decimal, as listed on the review step.
    pub fn size_kb(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }
}

/// Identifier the ticketing backend assigned to a created ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TicketId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// One support request being composed.
///
/// Optional free-text fields are plain strings; blank means absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportRecord {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,

    pub device_model: String,
    /// Device EUI.
    pub serial_number: String,
    pub firmware_version: String,

    pub problem_type: ProblemType,
    pub issue_description: String,
    pub error_message: String,
    pub error_screenshots: Vec<FileMeta>,
    pub steps_to_reproduce: String,
    pub previous_ticket_id: String,

    pub support_method: SupportMethod,
    pub urgency_level: UrgencyLevel,

    pub attachments: Vec<FileMeta>,

    pub privacy_agreed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_ticket_id: Option<TicketId>,
}

impl SupportRecord {
    /// True iff the submitter attached at least one file locally.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty() || !self.error_screenshots.is_empty()
    }

    /// Every attached file, screenshots last.
    pub fn all_files(&self) -> impl Iterator<Item = &FileMeta> {
        self.attachments.iter().chain(self.error_screenshots.iter())
    }

    pub fn apply(&mut self, patch: RecordPatch) {
        let RecordPatch {
            name,
            company,
            email,
            phone,
            device_model,
            serial_number,
            firmware_version,
            problem_type,
            issue_description,
            error_message,
            error_screenshots,
            steps_to_reproduce,
            previous_ticket_id,
            support_method,
            urgency_level,
            attachments,
            privacy_agreed,
        } = patch;

        set(&mut self.name, name);
        set(&mut self.company, company);
        set(&mut self.email, email);
        set(&mut self.phone, phone);
        set(&mut self.device_model, device_model);
        set(&mut self.serial_number, serial_number);
        set(&mut self.firmware_version, firmware_version);
        set(&mut self.problem_type, problem_type);
        set(&mut self.issue_description, issue_description);
        set(&mut self.error_message, error_message);
        set(&mut self.error_screenshots, error_screenshots);
        set(&mut self.steps_to_reproduce, steps_to_reproduce);
        set(&mut self.previous_ticket_id, previous_ticket_id);
        set(&mut self.support_method, support_method);
        set(&mut self.urgency_level, urgency_level);
        set(&mut self.attachments, attachments);
        set(&mut self.privacy_agreed, privacy_agreed);
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("invalid field update: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Partial update merged into a [`SupportRecord`].
///
/// `None` leaves the field untouched. The outcome field is deliberately
/// absent: only a successful submission may set it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub device_model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub problem_type: Option<ProblemType>,
    pub issue_description: Option<String>,
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_file_list")]
    pub error_screenshots: Option<Vec<FileMeta>>,
    pub steps_to_reproduce: Option<String>,
    pub previous_ticket_id: Option<String>,
    pub support_method: Option<SupportMethod>,
    pub urgency_level: Option<UrgencyLevel>,
    #[serde(default, deserialize_with = "lenient_file_list")]
    pub attachments: Option<Vec<FileMeta>>,
    pub privacy_agreed: Option<bool>,
}

impl RecordPatch {
    /// Parse a JSON object of field changes.
    ///
    /// List fields never fail: anything that is not an array becomes an
    /// empty list and entries that are not file metadata are dropped.
    pub fn from_json(value: Value) -> Result<Self, PatchError> {
        Ok(serde_json::from_value(value)?)
    }
}

fn lenient_file_list<'de, D>(deserializer: D) -> Result<Option<Vec<FileMeta>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let files = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<FileMeta>(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(Some(files))
}
