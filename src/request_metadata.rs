use std::net::SocketAddr;

use axum::http::{header, HeaderMap};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client details pulled off an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Raw `X-Forwarded-For` value, empty when the header is missing.
    pub forwarded_chain: String,
    pub client_ip: Option<String>,
    pub user_agent: String,
}

impl RequestMetadata {
    pub fn from_parts(headers: &HeaderMap, peer_addr: Option<SocketAddr>) -> Self {
        let forwarded_chain = forwarded_chain(headers);
        let client_ip = client_ip(&forwarded_chain, peer_addr);
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        RequestMetadata {
            forwarded_chain,
            client_ip,
            user_agent,
        }
    }
}

// repeated header lines are folded the way proxies would join them
fn forwarded_chain(headers: &HeaderMap) -> String {
    headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(", ")
}

fn client_ip(forwarded_chain: &str, peer_addr: Option<SocketAddr>) -> Option<String> {
    if forwarded_chain.is_empty() {
        return peer_addr.map(|addr| addr.ip().to_string());
    }

    let first_hop = forwarded_chain.split(',').next().unwrap_or_default().trim();
    Some(first_hop.to_string())
}
