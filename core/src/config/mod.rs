/// Client configuration for the support form.
///
/// Layered the 12-factor way:
/// 1. Defaults (from code)
/// 2. Config file (`support-form.toml`)
/// 3. Environment variables (`SUPPORT_FORM_*`)
pub mod error;
pub mod loader;

pub use error::ConfigError;
pub use error::Result;
pub use loader::ClientConfig;
pub use loader::ConfigLoader;
