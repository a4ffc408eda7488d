//! JSON bodies exchanged between the form client and the relay.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use crate::present;
use crate::record::SupportRecord;
use crate::record::TicketId;

/// Fields the relay requires before it will contact the ticketing backend.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "email", "issueDescription"];

/// Request body accepted by the relay.
///
/// Only the recognized field set is kept; anything else in the incoming
/// JSON object is dropped during deserialization and never forwarded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_to_reproduce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_ticket_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<String>,
    /// Only the length of this array is ever consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,
}

impl SupportPayload {
    pub fn has_attachments(&self) -> bool {
        matches!(&self.attachments, Some(Value::Array(items)) if !items.is_empty())
    }

    /// Names of required fields that are missing or blank, in wire order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let values = [&self.name, &self.email, &self.issue_description];
        REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.as_deref().and_then(present).is_none())
            .map(|(field, _)| *field)
            .collect()
    }
}

fn text(value: &str) -> Option<String> {
    present(value).map(str::to_string)
}

impl From<&SupportRecord> for SupportPayload {
    fn from(record: &SupportRecord) -> Self {
        let files: Vec<Value> = record
            .all_files()
            .filter_map(|file| serde_json::to_value(file).ok())
            .collect();

        Self {
            name: text(&record.name),
            email: text(&record.email),
            company: text(&record.company),
            phone: text(&record.phone),
            device_model: text(&record.device_model),
            serial_number: text(&record.serial_number),
            firmware_version: text(&record.firmware_version),
            problem_type: Some(record.problem_type.to_string()),
            issue_description: text(&record.issue_description),
            error_message: text(&record.error_message),
            steps_to_reproduce: text(&record.steps_to_reproduce),
            previous_ticket_id: text(&record.previous_ticket_id),
            support_method: Some(record.support_method.to_string()),
            urgency_level: Some(record.urgency_level.to_string()),
            attachments: (!files.is_empty()).then_some(Value::Array(files)),
        }
    }
}

/// Response body returned by the relay for every non-preflight request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayReply {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// Absent when the backend's id is missing or of an unexpected shape.
    #[serde(
        default,
        deserialize_with = "lenient_ticket_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub ticket_id: Option<TicketId>,
}

impl RelayReply {
    pub fn created(ticket_id: Option<TicketId>) -> Self {
        Self {
            success: true,
            message: "Support request submitted successfully!".to_string(),
            ticket_id,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ticket_id: None,
        }
    }
}

fn lenient_ticket_id<'de, D>(deserializer: D) -> Result<Option<TicketId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<TicketId>(value).ok())
}
