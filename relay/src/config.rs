//! Relay configuration, read once from the environment at startup.

use std::fmt;
use std::time::Duration;

pub const SUBDOMAIN_VAR: &str = "ZENDESK_SUBDOMAIN";
pub const API_TOKEN_VAR: &str = "ZENDESK_API_TOKEN";
pub const USER_EMAIL_VAR: &str = "ZENDESK_USER_EMAIL";
pub const GROUP_ID_VAR: &str = "ZENDESK_TECH_SUPPORT_ASSIGNEE_ID";
pub const API_BASE_URL_VAR: &str = "ZENDESK_API_BASE_URL";
pub const VENDOR_TIMEOUT_VAR: &str = "SUPPORT_RELAY_VENDOR_TIMEOUT_SECS";

const DEFAULT_VENDOR_TIMEOUT_SECS: u64 = 15;

/// Configuration problems. Messages name variables, never their values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("{0} must be an unsigned integer group id")]
    InvalidGroupId(&'static str),

    #[error("{0} must be a positive number of seconds")]
    InvalidTimeout(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub subdomain: String,
    pub api_token: String,
    pub user_email: String,
    pub group_id: u64,
    /// Scheme and host of the ticketing API, without a trailing slash.
    pub api_base_url: String,
    pub vendor_timeout: Duration,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("subdomain", &self.subdomain)
            .field("api_token", &"<redacted>")
            .field("user_email", &self.user_email)
            .field("group_id", &self.group_id)
            .field("api_base_url", &self.api_base_url)
            .field("vendor_timeout", &self.vendor_timeout)
            .finish()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let subdomain = require(SUBDOMAIN_VAR)?;
        let api_token = require(API_TOKEN_VAR)?;
        let user_email = require(USER_EMAIL_VAR)?;
        let group_id = require(GROUP_ID_VAR)?
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidGroupId(GROUP_ID_VAR))?;

        let api_base_url = get(API_BASE_URL_VAR)
            .unwrap_or_else(|| format!("https://{subdomain}.zendesk.com"))
            .trim_end_matches('/')
            .to_string();

        let vendor_timeout = match get(VENDOR_TIMEOUT_VAR) {
            None => Duration::from_secs(DEFAULT_VENDOR_TIMEOUT_SECS),
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout(VENDOR_TIMEOUT_VAR))?,
        };

        Ok(Self {
            subdomain,
            api_token,
            user_email,
            group_id,
            api_base_url,
            vendor_timeout,
        })
    }

    pub fn tickets_url(&self) -> String {
        format!("{}/api/v2/tickets.json", self.api_base_url)
    }
}
