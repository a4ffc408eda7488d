//! Submission Gateway: the client's single network boundary.
//!
//! One POST per submission, bounded by a request timeout, never retried.
//! Whatever comes back is either a created ticket or a [`ClassifiedError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use support_protocol::RelayReply;
use support_protocol::SupportPayload;
use support_protocol::TicketId;
use tracing::info;
use tracing::warn;

use crate::classify::ClassifiedError;
use crate::classify::ErrorKind;
use crate::classify::SERVER_MESSAGE;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketCreated {
    /// `None` when the relay reported success without an id.
    pub ticket_id: Option<TicketId>,
    pub message: String,
}

#[async_trait]
pub trait TicketGateway: Send + Sync {
    async fn submit(&self, payload: &SupportPayload) -> Result<TicketCreated, ClassifiedError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("relay URL {0:?} is not an absolute http(s) URL")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Gateway that posts to the deployed relay over HTTP.
#[derive(Debug, Clone)]
pub struct RelayGateway {
    client: reqwest::Client,
    relay_url: reqwest::Url,
}

impl RelayGateway {
    pub fn new(relay_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let relay_url = reqwest::Url::parse(relay_url.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| GatewayError::InvalidUrl(relay_url.to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, relay_url })
    }

    pub fn relay_url(&self) -> &str {
        self.relay_url.as_str()
    }
}

#[async_trait]
impl TicketGateway for RelayGateway {
    async fn submit(&self, payload: &SupportPayload) -> Result<TicketCreated, ClassifiedError> {
        let response = self
            .client
            .post(self.relay_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    warn!(url = %self.relay_url, "relay request timed out");
                    ClassifiedError::timeout()
                } else {
                    warn!(url = %self.relay_url, error = %err, "relay request failed");
                    ClassifiedError::unexpected()
                }
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) if err.is_timeout() => return Err(ClassifiedError::timeout()),
            Err(err) => {
                warn!(status = status.as_u16(), error = %err, "failed to read relay response");
                String::new()
            }
        };
        let reply = serde_json::from_str::<RelayReply>(&body).ok();

        if status == StatusCode::CREATED {
            return match reply {
                Some(reply) if reply.success => {
                    info!(ticket_id = ?reply.ticket_id, "support ticket created");
                    Ok(TicketCreated {
                        ticket_id: reply.ticket_id,
                        message: reply.message,
                    })
                }
                _ => {
                    warn!("relay answered 201 without a success flag");
                    Err(ClassifiedError::new(
                        ErrorKind::Server,
                        Some(status.as_u16()),
                        SERVER_MESSAGE,
                    ))
                }
            };
        }

        let relay_message = reply.as_ref().map(|reply| reply.message.as_str());
        let classified = ClassifiedError::from_status(status.as_u16(), relay_message);
        warn!(
            status = status.as_u16(),
            kind = %classified.kind,
            "relay rejected submission"
        );
        Err(classified)
    }
}
