//! Serverless relay between the support form and the ticketing vendor.
//!
//! [`Relay`] is transport-neutral; [`http`] hosts it behind axum.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod handler;
pub mod http;
pub mod vendor;

pub use config::ConfigError;
pub use config::RelayConfig;
pub use handler::Relay;
pub use handler::RelayEvent;
pub use handler::RelayResponse;
pub use vendor::TicketVendor;
pub use vendor::VendorError;
pub use vendor::ZendeskClient;
