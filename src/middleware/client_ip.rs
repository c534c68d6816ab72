// Submitter address resolution for the admission gate

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::models::AppState;

pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Address of the client as observed by the server, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub Option<String>);

impl ClientAddress {
    /// Prefer the server-observed address; fall back to the one the client
    /// reported in its body.
    pub fn or_reported(self, reported: Option<&str>) -> Option<String> {
        self.0.or_else(|| {
            reported
                .map(str::trim)
                .filter(|a| !a.is_empty() && *a != UNKNOWN_ADDRESS)
                .map(str::to_string)
        })
    }
}

/// Client address from the header a trusted proxy sets.
///
/// For list headers such as `X-Forwarded-For` the rightmost hop is used: it is
/// the one the trusted proxy appended, everything left of it came from the
/// client.
pub fn address_from_header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').map(str::trim).find(|s| !s.is_empty()))
        .filter(|v| *v != UNKNOWN_ADDRESS)
        .map(str::to_string)
}

/// Proxy headers are only consulted when `trusted_header` names one; any
/// other header is client-controlled and ignored in favor of the peer.
pub fn resolve_address(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_header: Option<&str>,
) -> Option<String> {
    let peer = peer.map(|addr| addr.ip().to_string());

    match trusted_header {
        Some(name) => address_from_header(headers, name).or(peer),
        None => peer,
    }
}

impl FromRequestParts<AppState> for ClientAddress {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientAddress(resolve_address(
            &parts.headers,
            peer,
            state.config.server.trusted_proxy_header.as_deref(),
        )))
    }
}
