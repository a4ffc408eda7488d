use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::config::error::ConfigError;
use crate::config::error::Result;
use crate::step::FlowOptions;

const ENV_PREFIX: &str = "SUPPORT_FORM";
const CONFIG_FILE_NAME: &str = "support-form.toml";

/// Settings for the form client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay endpoint that accepts the support payload.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Bound on the single submission request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Ask for support method, urgency and privacy consent before review.
    #[serde(default)]
    pub consent_step: bool,

    /// Where downloaded summaries are written.
    #[serde(default = "default_summary_dir")]
    pub summary_dir: PathBuf,
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8888/support-ticket".to_string()
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_summary_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            request_timeout_secs: default_request_timeout_secs(),
            consent_step: false,
            summary_dir: default_summary_dir(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn flow_options(&self) -> FlowOptions {
        FlowOptions {
            consent_step: self.consent_step,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.relay_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "relay_url",
                problem: "must not be empty",
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                problem: "must be greater than zero",
            });
        }
        Ok(())
    }
}

/// Configuration loader with layered merging support
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration with layered merging:
    /// 1. Start with defaults
    /// 2. Merge config file if provided
    /// 3. Override with environment variables (SUPPORT_FORM_ prefix)
    pub fn load(&self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();
        let mut builder = Config::builder()
            .set_default("relay_url", defaults.relay_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("consent_step", defaults.consent_step)?
            .set_default(
                "summary_dir",
                defaults.summary_dir.to_string_lossy().into_owned(),
            )?;

        if let Some(ref path) = self.config_path {
            if !path.exists() {
                return Err(ConfigError::Missing(path.clone()));
            }
            builder = builder.add_source(File::from(path.as_path()));
        }

        // Example: SUPPORT_FORM_RELAY_URL=https://example.netlify.app/.netlify/functions/support-ticket
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let client_config: ClientConfig = builder.build()?.try_deserialize()?;
        client_config.validate()?;
        Ok(client_config)
    }

    /// Locate the default config file in standard locations:
    /// 1. Current directory: ./support-form.toml
    /// 2. XDG config: ~/.config/support-form/config.toml
    pub fn find_config_file() -> Option<PathBuf> {
        let cwd_config = PathBuf::from(".").join(CONFIG_FILE_NAME);
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("support-form").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Load from an explicit path, else from the default locations.
    pub fn load_from(path: Option<&Path>) -> Result<ClientConfig> {
        let loader = match path.map(Path::to_path_buf).or_else(Self::find_config_file) {
            Some(path) => ConfigLoader::new().with_file(path),
            None => ConfigLoader::new(),
        };
        loader.load()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
