//! Client identification for upload sidecars

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use passdrop_store::ClientInfo;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Address and user agent of the caller
///
/// The address is taken from `X-Real-IP`, then the first `X-Forwarded-For`
/// entry, then the socket peer.
#[derive(Clone, Debug, Default)]
pub struct Client(pub ClientInfo);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Client(ClientInfo {
            remote_ip: forwarded_ip(&parts.headers).or(peer),
            user_agent: header_str(&parts.headers, header::USER_AGENT.as_str()),
        }))
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-real-ip").or_else(|| {
        header_str(headers, "x-forwarded-for")
            .and_then(|list| list.split(',').next().map(|ip| ip.trim().to_string()))
            .filter(|ip| !ip.is_empty())
    })
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
