use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use support_relay::Relay;
use support_relay::RelayConfig;
use support_relay::http;
use tokio::net::TcpListener;
use wiremock::MockServer;

mod end_to_end;
mod http_host;
mod vendor;

pub const API_TOKEN: &str = "s3cr3t-token";
pub const USER_EMAIL: &str = "bot@rakwireless.com";
pub const GROUP_ID: u64 = 360001234567;

/// Relay configuration pointed at a wiremock stand-in for the vendor.
pub fn vendor_config(vendor: &MockServer) -> RelayConfig {
    RelayConfig {
        subdomain: "rakwireless".to_string(),
        api_token: API_TOKEN.to_string(),
        user_email: USER_EMAIL.to_string(),
        group_id: GROUP_ID,
        api_base_url: vendor.uri(),
        vendor_timeout: Duration::from_secs(5),
    }
}

/// Serve the real router on an ephemeral port for the rest of the test.
pub async fn spawn_relay(relay: Relay) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind relay");
    let addr = listener.local_addr().expect("relay addr");
    tokio::spawn(http::serve(
        listener,
        Arc::new(relay),
        std::future::pending::<()>(),
    ));
    addr
}

pub fn ticket_url(addr: SocketAddr) -> String {
    format!("http://{addr}{}", http::NETLIFY_RELAY_PATH)
}
