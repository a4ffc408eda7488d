//! axum host for [`Relay`].

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::any;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;
use tracing::warn;

use crate::handler::Relay;
use crate::handler::RelayEvent;
use crate::handler::RelayResponse;

pub const RELAY_PATH: &str = "/support-ticket";
pub const NETLIFY_RELAY_PATH: &str = "/.netlify/functions/support-ticket";

/// Largest request body the relay buffers.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Router, separated out so tests can serve it on an ephemeral port.
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route(RELAY_PATH, any(handle_ticket))
        .route(NETLIFY_RELAY_PATH, any(handle_ticket))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(relay)
}

pub async fn serve<F>(listener: TcpListener, relay: Arc<Relay>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, configured = relay.is_configured(), "support relay listening");
    }
    axum::serve(listener, router(relay))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn handle_ticket(
    State(relay): State<Arc<Relay>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => (!body.is_empty()).then(|| body.to_vec()),
        Err(rejection) if method == Method::POST => {
            warn!(error = %rejection, "could not read request body");
            return RelayResponse::body_rejected(rejection.status().as_u16()).into_response();
        }
        // Preflight and 405 answers never look at the body.
        Err(_) => None,
    };
    relay
        .handle(RelayEvent::new(method.as_str(), body))
        .await
        .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = name, "dropping invalid response header"),
            }
        }
        response
    }
}
