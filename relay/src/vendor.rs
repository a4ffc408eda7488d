//! Ticket-creation calls against the Zendesk REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use support_core::TicketEnvelope;
use support_protocol::TicketId;
use tracing::debug;
use tracing::error;

use crate::config::RelayConfig;

#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// The vendor answered with a non-2xx status.
    #[error("ticketing API returned status {status}")]
    Status {
        status: u16,
        description: Option<String>,
    },

    #[error("ticketing API did not answer in time")]
    Timeout,

    #[error("ticketing API request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait TicketVendor: Send + Sync {
    /// Create one ticket. Returns the vendor's id when it sent one back.
    async fn create_ticket(
        &self,
        config: &RelayConfig,
        envelope: &TicketEnvelope,
    ) -> Result<Option<TicketId>, VendorError>;
}

#[derive(Deserialize)]
struct CreatedTicket {
    #[serde(default)]
    ticket: Option<CreatedTicketBody>,
}

#[derive(Deserialize)]
struct CreatedTicketBody {
    #[serde(default)]
    id: Option<TicketId>,
}

#[derive(Deserialize)]
struct VendorErrorBody {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ZendeskClient {
    client: reqwest::Client,
}

impl ZendeskClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketVendor for ZendeskClient {
    async fn create_ticket(
        &self,
        config: &RelayConfig,
        envelope: &TicketEnvelope,
    ) -> Result<Option<TicketId>, VendorError> {
        let url = config.tickets_url();
        debug!(%url, "creating ticket");

        let response = self
            .client
            .post(&url)
            .basic_auth(format!("{}/token", config.user_email), Some(&config.api_token))
            .json(envelope)
            .timeout(config.vendor_timeout)
            .send()
            .await
            .map_err(|err| transport_error(&err, config.vendor_timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(&err, config.vendor_timeout))?;

        if status.is_success() {
            let created = serde_json::from_str::<CreatedTicket>(&body).ok();
            return Ok(created.and_then(|created| created.ticket).and_then(|ticket| ticket.id));
        }

        error!(status = status.as_u16(), body = %body, "ticketing API rejected request");
        let description = serde_json::from_str::<VendorErrorBody>(&body)
            .ok()
            .and_then(|body| body.description)
            .filter(|description| !description.trim().is_empty());
        Err(VendorError::Status {
            status: status.as_u16(),
            description,
        })
    }
}

fn transport_error(err: &reqwest::Error, timeout: Duration) -> VendorError {
    if err.is_timeout() {
        error!(timeout_secs = timeout.as_secs(), "ticketing API timed out");
        VendorError::Timeout
    } else {
        error!(error = %err, "ticketing API unreachable");
        VendorError::Transport(err.to_string())
    }
}
