//! Submission Translator: support payload to ticket-creation request.
//!
//! The mapping is pure and total. The same payload always produces the
//! same envelope, byte for byte, so the client preview matches what the
//! relay sends.

use serde::Deserialize;
use serde::Serialize;
use support_protocol::ProblemType;
use support_protocol::SupportMethod;
use support_protocol::SupportPayload;
use support_protocol::UrgencyLevel;
use support_protocol::present;

pub const CHANNEL_TAG: &str = "web_support_form";
pub const PRODUCT_TAG: &str = "rak_support";

const NOT_PROVIDED: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketEnvelope {
    pub ticket: NewTicket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub subject: String,
    pub comment: TicketComment,
    pub requester: Requester,
    pub priority: TicketPriority,
    pub tags: Vec<String>,
    /// Assigned by the relay from its configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketComment {
    pub html_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub name: String,
    pub email: String,
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Urgent,
    Normal,
    Low,
}

impl TicketPriority {
    /// High urgency maps to the top tier; anything unrecognized maps to the
    /// bottom tier.
    pub fn from_urgency(urgency: Option<&str>) -> Self {
        match urgency.and_then(|level| level.trim().parse::<UrgencyLevel>().ok()) {
            Some(UrgencyLevel::High) => Self::Urgent,
            Some(UrgencyLevel::Medium) => Self::Normal,
            Some(UrgencyLevel::Low) | None => Self::Low,
        }
    }
}

impl TicketEnvelope {
    pub fn with_group(mut self, group_id: u64) -> Self {
        self.ticket.group_id = Some(group_id);
        self
    }
}

fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(present)
}

pub fn translate(payload: &SupportPayload) -> TicketEnvelope {
    let name = field(&payload.name);
    let email = field(&payload.email);
    let device = field(&payload.device_model);
    let urgency = field(&payload.urgency_level);

    let subject = format!(
        "Support Request: {} from {}",
        device.unwrap_or("General Inquiry"),
        name.unwrap_or(NOT_PROVIDED)
    );

    let tags = vec![
        CHANNEL_TAG.to_string(),
        PRODUCT_TAG.to_string(),
        device.map_or_else(|| "unknown_device".to_string(), tag_slug),
        format!("urgency_{}", urgency.map_or_else(|| "unknown".to_string(), tag_slug)),
    ];

    TicketEnvelope {
        ticket: NewTicket {
            subject,
            comment: TicketComment {
                html_body: ticket_body(payload),
            },
            requester: Requester {
                name: name.unwrap_or_default().to_string(),
                email: email.unwrap_or_default().to_string(),
                verified: true,
            },
            priority: TicketPriority::from_urgency(urgency),
            tags,
            group_id: None,
        },
    }
}

/// Lowercase tag token; runs of anything but ASCII alphanumerics become a
/// single underscore.
pub fn tag_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("unknown");
    }
    slug
}

/// Escape text for inclusion in the HTML comment body.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape, then turn line breaks into `<br>`.
fn multiline(text: &str) -> String {
    escape_html(text)
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
}

fn item(lines: &mut Vec<String>, label: &str, value: &str) {
    lines.push(format!(
        "<li><strong>{label}:</strong> {}</li>",
        escape_html(value)
    ));
}

fn optional_item(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        item(lines, label, value);
    }
}

fn block(lines: &mut Vec<String>, label: &str, value: &str) {
    lines.push(format!("<p><strong>{label}:</strong></p>"));
    lines.push(format!("<p>{}</p>", multiline(value)));
}

fn ticket_body(payload: &SupportPayload) -> String {
    let mut lines = vec![
        "<h2>New RAK Support Request</h2>".to_string(),
        "<p>A new support request has been submitted via the web form.</p>".to_string(),
        "<hr>".to_string(),
        "<h3>Client Information</h3>".to_string(),
        "<ul>".to_string(),
    ];
    item(&mut lines, "Name", field(&payload.name).unwrap_or(NOT_PROVIDED));
    item(&mut lines, "Email", field(&payload.email).unwrap_or(NOT_PROVIDED));
    optional_item(&mut lines, "Company", field(&payload.company));
    optional_item(&mut lines, "Phone", field(&payload.phone));
    lines.push("</ul>".to_string());

    lines.push("<hr>".to_string());
    lines.push("<h3>Device Information</h3>".to_string());
    lines.push("<ul>".to_string());
    item(
        &mut lines,
        "Device Model",
        field(&payload.device_model).unwrap_or(NOT_PROVIDED),
    );
    item(
        &mut lines,
        "Device EUI/Serial",
        field(&payload.serial_number).unwrap_or(NOT_PROVIDED),
    );
    optional_item(&mut lines, "Firmware Version", field(&payload.firmware_version));
    lines.push("</ul>".to_string());

    lines.push("<hr>".to_string());
    lines.push("<h3>Issue Details</h3>".to_string());
    lines.push("<ul>".to_string());
    let problem = field(&payload.problem_type)
        .map_or_else(|| ProblemType::Other.label().to_string(), ProblemType::label_for);
    item(&mut lines, "Problem Type", &problem);
    let urgency = field(&payload.urgency_level).map(|raw| {
        raw.parse::<UrgencyLevel>()
            .map_or_else(|_| raw.to_string(), |level| level.short_label().to_string())
    });
    optional_item(&mut lines, "Urgency", urgency.as_deref());
    let method = field(&payload.support_method).map(|raw| {
        raw.parse::<SupportMethod>()
            .map_or_else(|_| raw.to_string(), |method| method.label().to_string())
    });
    optional_item(&mut lines, "Preferred Support Method", method.as_deref());
    lines.push("</ul>".to_string());

    lines.push("<p><strong>Issue Description:</strong></p>".to_string());
    lines.push(format!(
        "<p>{}</p>",
        field(&payload.issue_description).map_or_else(
            || "No description provided.".to_string(),
            multiline
        )
    ));
    if let Some(error) = field(&payload.error_message) {
        block(&mut lines, "Error Message", error);
    }
    if let Some(steps) = field(&payload.steps_to_reproduce) {
        block(&mut lines, "Steps to Reproduce", steps);
    }

    if payload.has_attachments() {
        lines.push(
            "<p><em>Note: The submitter indicated attachments, but files are not transmitted \
             through the web form. Please request them from the requester if needed.</em></p>"
                .to_string(),
        );
    }
    if let Some(previous) = field(&payload.previous_ticket_id) {
        lines.push(format!(
            "<p><strong>Related to previous ticket:</strong> #{}</p>",
            escape_html(previous.trim_start_matches('#'))
        ));
    }

    lines.push("<hr>".to_string());
    lines.push("<p><em>Ticket created via Web Support Form</em></p>".to_string());
    lines.join("\n")
}
