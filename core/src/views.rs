//! Presentation models for each step.
//!
//! Every view is a pure function of the record, so a front end only needs
//! the record and the store's callbacks to render a step.

use std::str::FromStr;

use support_protocol::DEVICE_MODELS;
use support_protocol::ProblemType;
use support_protocol::RecordPatch;
use support_protocol::SupportMethod;
use support_protocol::SupportRecord;
use support_protocol::UrgencyLevel;
use support_protocol::present;

use crate::step::Step;
use crate::step::StepSequence;
use crate::validate;

/// Editable fields, keyed by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Name,
    Company,
    Email,
    Phone,
    DeviceModel,
    SerialNumber,
    FirmwareVersion,
    ProblemType,
    IssueDescription,
    ErrorMessage,
    StepsToReproduce,
    PreviousTicketId,
    UrgencyLevel,
    SupportMethod,
    PrivacyAgreed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldInputError {
    #[error("{value:?} is not one of the choices for {field}")]
    UnknownChoice { field: &'static str, value: String },
}

impl FieldKey {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Company => "company",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::DeviceModel => "deviceModel",
            Self::SerialNumber => "serialNumber",
            Self::FirmwareVersion => "firmwareVersion",
            Self::ProblemType => "problemType",
            Self::IssueDescription => "issueDescription",
            Self::ErrorMessage => "errorMessage",
            Self::StepsToReproduce => "stepsToReproduce",
            Self::PreviousTicketId => "previousTicketId",
            Self::UrgencyLevel => "urgencyLevel",
            Self::SupportMethod => "supportMethod",
            Self::PrivacyAgreed => "privacyAgreed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::Company => "Company",
            Self::Email => "Email Address",
            Self::Phone => "Phone Number",
            Self::DeviceModel => "Device Model",
            Self::SerialNumber => "Device EUI/Serial Number",
            Self::FirmwareVersion => "Firmware Version",
            Self::ProblemType => "Problem Type",
            Self::IssueDescription => "Issue Description",
            Self::ErrorMessage => "Error Message",
            Self::StepsToReproduce => "Steps to Reproduce",
            Self::PreviousTicketId => "Previous Ticket ID",
            Self::UrgencyLevel => "Urgency Level",
            Self::SupportMethod => "Preferred Support Method",
            Self::PrivacyAgreed => "Privacy Policy Agreement",
        }
    }

    /// Choices offered for picker fields, as `(wire value, label)`.
    pub fn choices(self) -> Vec<(String, &'static str)> {
        match self {
            Self::DeviceModel => DEVICE_MODELS
                .iter()
                .map(|model| ((*model).to_string(), *model))
                .collect(),
            Self::ProblemType => ProblemType::all()
                .map(|kind| (kind.to_string(), kind.label()))
                .collect(),
            Self::UrgencyLevel => UrgencyLevel::all()
                .map(|level| (level.to_string(), level.label()))
                .collect(),
            Self::SupportMethod => SupportMethod::all()
                .map(|method| (method.to_string(), method.label()))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn value(self, record: &SupportRecord) -> String {
        match self {
            Self::Name => record.name.clone(),
            Self::Company => record.company.clone(),
            Self::Email => record.email.clone(),
            Self::Phone => record.phone.clone(),
            Self::DeviceModel => record.device_model.clone(),
            Self::SerialNumber => record.serial_number.clone(),
            Self::FirmwareVersion => record.firmware_version.clone(),
            Self::ProblemType => record.problem_type.to_string(),
            Self::IssueDescription => record.issue_description.clone(),
            Self::ErrorMessage => record.error_message.clone(),
            Self::StepsToReproduce => record.steps_to_reproduce.clone(),
            Self::PreviousTicketId => record.previous_ticket_id.clone(),
            Self::UrgencyLevel => record.urgency_level.to_string(),
            Self::SupportMethod => record.support_method.to_string(),
            Self::PrivacyAgreed => {
                let agreed = if record.privacy_agreed { "yes" } else { "no" };
                agreed.to_string()
            }
        }
    }

    /// Turn raw user input into a record update.
    ///
    /// Picker fields accept either the wire value or the 1-based position
    /// of the choice. The device model also accepts any freeform text.
    pub fn patch(self, input: &str) -> Result<RecordPatch, FieldInputError> {
        let text = Some(input.trim().to_string());
        let mut patch = RecordPatch::default();
        match self {
            Self::Name => patch.name = text,
            Self::Company => patch.company = text,
            Self::Email => patch.email = text,
            Self::Phone => patch.phone = text,
            Self::DeviceModel => {
                let model = pick_index(input, DEVICE_MODELS.iter().copied())
                    .map(str::to_string)
                    .or(text);
                patch.device_model = model;
            }
            Self::SerialNumber => patch.serial_number = text,
            Self::FirmwareVersion => patch.firmware_version = text,
            Self::ProblemType => {
                patch.problem_type = Some(self.pick(input, ProblemType::all())?);
            }
            // Multi-line fields keep their inner layout.
            Self::IssueDescription => patch.issue_description = Some(input.to_string()),
            Self::ErrorMessage => patch.error_message = Some(input.to_string()),
            Self::StepsToReproduce => patch.steps_to_reproduce = Some(input.to_string()),
            Self::PreviousTicketId => patch.previous_ticket_id = text,
            Self::UrgencyLevel => {
                patch.urgency_level = Some(self.pick(input, UrgencyLevel::all())?);
            }
            Self::SupportMethod => {
                patch.support_method = Some(self.pick(input, SupportMethod::all())?);
            }
            Self::PrivacyAgreed => {
                let agreed = match input.trim().to_ascii_lowercase().as_str() {
                    "y" | "yes" | "true" | "1" => true,
                    "n" | "no" | "false" | "0" | "" => false,
                    _ => return Err(self.unknown(input)),
                };
                patch.privacy_agreed = Some(agreed);
            }
        }
        Ok(patch)
    }

    fn pick<T>(self, input: &str, options: impl Iterator<Item = T>) -> Result<T, FieldInputError>
    where
        T: FromStr,
    {
        let wanted = input.trim().to_ascii_lowercase();
        if let Ok(value) = wanted.parse::<T>() {
            return Ok(value);
        }
        pick_index(input, options).ok_or_else(|| self.unknown(input))
    }

    fn unknown(self, input: &str) -> FieldInputError {
        FieldInputError::UnknownChoice {
            field: self.wire_name(),
            value: input.trim().to_string(),
        }
    }
}

fn pick_index<T>(input: &str, mut options: impl Iterator<Item = T>) -> Option<T> {
    let index = input.trim().parse::<usize>().ok()?;
    options.nth(index.checked_sub(1)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub key: FieldKey,
    pub label: &'static str,
    pub required: bool,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSection {
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub step: Step,
    pub title: &'static str,
    pub fields: Vec<FieldView>,
    pub sections: Vec<ReviewSection>,
    pub notices: Vec<String>,
}

const CLIENT_FIELDS: &[(FieldKey, bool)] = &[
    (FieldKey::Name, true),
    (FieldKey::Company, false),
    (FieldKey::Email, true),
    (FieldKey::Phone, false),
];

const DEVICE_FIELDS: &[(FieldKey, bool)] = &[
    (FieldKey::DeviceModel, true),
    (FieldKey::SerialNumber, false),
    (FieldKey::FirmwareVersion, false),
];

const ISSUE_FIELDS: &[(FieldKey, bool)] = &[
    (FieldKey::ProblemType, true),
    (FieldKey::IssueDescription, true),
    (FieldKey::ErrorMessage, false),
    (FieldKey::StepsToReproduce, false),
    (FieldKey::PreviousTicketId, false),
];

const SUPPORT_FIELDS: &[(FieldKey, bool)] = &[
    (FieldKey::SupportMethod, false),
    (FieldKey::UrgencyLevel, true),
    (FieldKey::PrivacyAgreed, true),
];

/// View of `step` in the default flow.
pub fn step_view(step: Step, record: &SupportRecord) -> StepView {
    flow_step_view(&StepSequence::default(), step, record)
}

/// View of `step` within `sequence`. Urgency is asked on the issue step
/// unless the flow has a support-request step, which asks it instead.
pub fn flow_step_view(sequence: &StepSequence, step: Step, record: &SupportRecord) -> StepView {
    match step {
        Step::ClientInfo => form(step, "Client Information", CLIENT_FIELDS, record),
        Step::DeviceInfo => form(step, "Device Information", DEVICE_FIELDS, record),
        Step::IssueDescription => {
            let mut fields = ISSUE_FIELDS.to_vec();
            if !sequence.contains(Step::SupportRequest) {
                fields.push((FieldKey::UrgencyLevel, true));
            }
            form(step, "Issue Description", &fields, record)
        }
        Step::SupportRequest => form(step, "Support Request", SUPPORT_FIELDS, record),
        Step::Review => review(record),
        Step::Confirmation => confirmation(record),
    }
}

fn form(
    step: Step,
    title: &'static str,
    fields: &[(FieldKey, bool)],
    record: &SupportRecord,
) -> StepView {
    let missing = validate::missing_fields(step, record);
    let fields = fields
        .iter()
        .map(|(key, required)| FieldView {
            key: *key,
            label: key.label(),
            required: *required,
            value: key.value(record),
            error: missing
                .contains(&key.wire_name())
                .then(|| field_error(*key, record)),
        })
        .collect();

    StepView {
        step,
        title,
        fields,
        sections: Vec::new(),
        notices: Vec::new(),
    }
}

fn field_error(key: FieldKey, record: &SupportRecord) -> String {
    match key {
        FieldKey::Email if present(&record.email).is_some() => validate::EMAIL_ERROR.to_string(),
        FieldKey::PrivacyAgreed => "You must agree to the privacy policy".to_string(),
        _ => format!("{} is required", key.label()),
    }
}

fn review(record: &SupportRecord) -> StepView {
    let mut client = vec![
        ("Name", record.name.clone()),
        ("Email", record.email.clone()),
    ];
    push_present(&mut client, "Company", &record.company);
    push_present(&mut client, "Phone", &record.phone);

    let device = vec![
        ("Device Model", record.device_model.clone()),
        ("Serial Number", record.serial_number.clone()),
        ("Firmware Version", record.firmware_version.clone()),
    ];

    let mut issue = vec![
        ("Problem Type", record.problem_type.label().to_string()),
        ("Description", record.issue_description.clone()),
    ];
    push_present(&mut issue, "Error Message", &record.error_message);
    push_present(&mut issue, "Steps to Reproduce", &record.steps_to_reproduce);
    push_present(&mut issue, "Previous Ticket ID", &record.previous_ticket_id);

    let request = vec![
        ("Support Method", record.support_method.label().to_string()),
        ("Urgency Level", record.urgency_level.label().to_string()),
    ];

    let mut sections = vec![
        ReviewSection {
            title: "Client Information",
            rows: client,
        },
        ReviewSection {
            title: "Device Information",
            rows: device,
        },
        ReviewSection {
            title: "Issue Description",
            rows: issue,
        },
        ReviewSection {
            title: "Support Request",
            rows: request,
        },
    ];

    if record.has_attachments() {
        let count = record.all_files().count();
        let mut rows = vec![("Files", format!("{count} file(s) attached"))];
        rows.extend(
            record
                .all_files()
                .map(|file| ("File", format!("{} ({})", file.name, file.size_kb()))),
        );
        sections.push(ReviewSection {
            title: "Attachments",
            rows,
        });
    }

    StepView {
        step: Step::Review,
        title: "Review Your Support Request",
        fields: Vec::new(),
        sections,
        notices: Vec::new(),
    }
}

fn push_present(rows: &mut Vec<(&'static str, String)>, label: &'static str, value: &str) {
    if let Some(value) = present(value) {
        rows.push((label, value.to_string()));
    }
}

fn confirmation(record: &SupportRecord) -> StepView {
    let ticket = record
        .submitted_ticket_id
        .as_ref()
        .map_or_else(|| "Pending".to_string(), ToString::to_string);

    let notices = vec![
        "Thank you for contacting RAK Technical Support".to_string(),
        format!("Ticket ID: {ticket}"),
        format!("Support Request for: {}", record.device_model.trim()),
        format!(
            "A confirmation email has been sent to {}",
            record.email.trim()
        ),
        format!(
            "Our support team will review your request and respond within: {}",
            record.urgency_level.response_window()
        ),
    ];

    StepView {
        step: Step::Confirmation,
        title: "Support Request Submitted",
        fields: Vec::new(),
        sections: Vec::new(),
        notices,
    }
}
