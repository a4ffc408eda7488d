//! One pass of the relay per request: preflight, method check, body parse,
//! required fields, configuration, vendor call, status mapping.

use std::sync::Arc;

use serde_json::Value;
use support_core::translate;
use support_protocol::RelayReply;
use support_protocol::SupportPayload;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::ConfigError;
use crate::config::RelayConfig;
use crate::vendor::TicketVendor;
use crate::vendor::VendorError;
use crate::vendor::ZendeskClient;

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body.";
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: name, email, and issueDescription.";
pub const CONFIG_ERROR_MESSAGE: &str = "Internal server configuration error.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed.";
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed with Zendesk.";
pub const RATE_LIMITED_MESSAGE: &str =
    "Rate limit exceeded contacting support system. Please try again later.";
pub const VENDOR_TIMEOUT_MESSAGE: &str = "Timed out contacting support system.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred.";
pub const BODY_TOO_LARGE_MESSAGE: &str = "Request body too large.";

const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Transport-neutral view of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEvent {
    pub method: String,
    pub body: Option<Vec<u8>>,
}

impl RelayEvent {
    pub fn new(method: impl Into<String>, body: Option<Vec<u8>>) -> Self {
        Self {
            method: method.into(),
            body,
        }
    }

    pub fn post(body: impl Into<Vec<u8>>) -> Self {
        Self::new("POST", Some(body.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    /// Empty for preflight, otherwise a serialized [`RelayReply`].
    pub body: String,
}

impl RelayResponse {
    fn preflight() -> Self {
        Self {
            status: 200,
            headers: cors_headers(),
            body: String::new(),
        }
    }

    fn reply(status: u16, reply: &RelayReply) -> Self {
        Self {
            status,
            headers: cors_headers(),
            body: serde_json::to_string(reply).unwrap_or_default(),
        }
    }

    fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::reply(status, &RelayReply::failure(message))
    }

    /// Response for a POST whose body the host could not buffer. 413 keeps
    /// its status; any other read failure is an invalid body.
    pub fn body_rejected(status: u16) -> Self {
        if status == 413 {
            Self::failure(413, BODY_TOO_LARGE_MESSAGE)
        } else {
            Self::failure(400, INVALID_BODY_MESSAGE)
        }
    }

    fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn cors_headers() -> Vec<(&'static str, String)> {
    vec![
        ("Content-Type", "application/json".to_string()),
        ("Access-Control-Allow-Origin", "*".to_string()),
        ("Access-Control-Allow-Methods", ALLOWED_METHODS.to_string()),
        ("Access-Control-Allow-Headers", "Content-Type".to_string()),
    ]
}

/// Stateless request handler. Holds the startup configuration (or the
/// reason it could not be built) and the vendor client.
pub struct Relay {
    config: Result<RelayConfig, ConfigError>,
    vendor: Arc<dyn TicketVendor>,
}

impl Relay {
    pub fn new(config: Result<RelayConfig, ConfigError>) -> Self {
        Self::with_vendor(config, Arc::new(ZendeskClient::new()))
    }

    pub fn with_vendor(
        config: Result<RelayConfig, ConfigError>,
        vendor: Arc<dyn TicketVendor>,
    ) -> Self {
        if let Err(err) = &config {
            error!(error = %err, "relay configuration is incomplete; submissions will fail");
        }
        Self { config, vendor }
    }

    pub fn from_env() -> Self {
        Self::new(RelayConfig::from_env())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_ok()
    }

    pub async fn handle(&self, event: RelayEvent) -> RelayResponse {
        if event.method.eq_ignore_ascii_case("OPTIONS") {
            return RelayResponse::preflight();
        }
        if !event.method.eq_ignore_ascii_case("POST") {
            warn!(method = %event.method, "rejected non-POST request");
            return RelayResponse::failure(405, METHOD_NOT_ALLOWED_MESSAGE)
                .with_header("Allow", ALLOWED_METHODS);
        }

        let payload = match parse_body(event.body.as_deref()) {
            Some(payload) => payload,
            None => {
                warn!("rejected request with an unreadable body");
                return RelayResponse::failure(400, INVALID_BODY_MESSAGE);
            }
        };

        let missing = payload.missing_required();
        if !missing.is_empty() {
            warn!(?missing, "rejected request with missing required fields");
            return RelayResponse::failure(400, MISSING_FIELDS_MESSAGE);
        }

        let config = match &self.config {
            Ok(config) => config,
            Err(err) => {
                error!(error = %err, "cannot create ticket without configuration");
                return RelayResponse::failure(500, CONFIG_ERROR_MESSAGE);
            }
        };

        let envelope = translate(&payload).with_group(config.group_id);
        match self.vendor.create_ticket(config, &envelope).await {
            Ok(ticket_id) => {
                info!(ticket_id = ?ticket_id, "support ticket created");
                RelayResponse::reply(201, &RelayReply::created(ticket_id))
            }
            Err(err) => vendor_failure(&err),
        }
    }
}

/// Decode the body into the recognized field set. A JSON value that is not
/// an object carries no fields, so it falls through to the required-field
/// check; `null`, malformed JSON, or an object with mistyped fields does not.
fn parse_body(body: Option<&[u8]>) -> Option<SupportPayload> {
    let body = body.filter(|bytes| !bytes.is_empty())?;
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Null => None,
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => Some(SupportPayload::default()),
    }
}

fn vendor_failure(err: &VendorError) -> RelayResponse {
    match err {
        VendorError::Status {
            status: status @ (401 | 403),
            ..
        } => RelayResponse::failure(*status, AUTH_FAILED_MESSAGE),
        VendorError::Status {
            status: 422,
            description,
        } => RelayResponse::failure(
            422,
            format!(
                "Invalid data sent to Zendesk: {}",
                description.as_deref().unwrap_or("Validation error")
            ),
        ),
        VendorError::Status { status: 429, .. } => {
            RelayResponse::failure(429, RATE_LIMITED_MESSAGE)
        }
        VendorError::Status { status, .. } => {
            let client_status = if *status >= 500 { 500 } else { *status };
            RelayResponse::failure(
                client_status,
                format!("Failed to communicate with support system (Status: {status})."),
            )
        }
        VendorError::Timeout => RelayResponse::failure(504, VENDOR_TIMEOUT_MESSAGE),
        VendorError::Transport(_) => RelayResponse::failure(500, UNEXPECTED_MESSAGE),
    }
}
