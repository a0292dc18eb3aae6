use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::admission::Scope;
use crate::errors::AppError;
use crate::state::AppState;

/// Middleware enforcing the global per-IP limit on every route.
///
/// The client address is the TCP peer unless `trusted_proxy_hops` proxies sit
/// in front of the service, in which case it is read from `x-forwarded-for`.
/// Requests whose address cannot be determined are let through.
pub async fn limit_by_ip(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match client_ip(req.headers(), peer, state.trusted_proxy_hops) {
        Some(ip) => state.gate.admit(&Scope::Ip(ip)).await?,
        None => debug!("No client address for {}, skipping IP limit", req.uri()),
    }

    Ok(next.run(req).await)
}

/// Resolves the address the IP limit applies to.
///
/// Each trusted proxy appends the address it received the request from, so
/// with `trusted_hops` proxies the client is the `trusted_hops`-th entry from
/// the right. Entries further left are client-supplied and ignored. With no
/// trusted proxies the header is ignored entirely.
fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trusted_hops: usize) -> Option<IpAddr> {
    if trusted_hops == 0 {
        return peer;
    }
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let hops: Vec<&str> = v.split(',').map(str::trim).collect();
            hops.len()
                .checked_sub(trusted_hops)
                .and_then(|i| hops.get(i).copied())
        })
        .and_then(|hop| hop.parse::<IpAddr>().ok())
        .or(peer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_header_is_ignored_without_trusted_proxies() {
        let headers = forwarded("203.0.113.9");
        assert_eq!(client_ip(&headers, ip("192.0.2.4"), 0), ip("192.0.2.4"));
    }

    #[test]
    fn test_single_proxy_uses_rightmost_hop() {
        // The client prepended a forged address; the proxy appended the real one.
        let headers = forwarded("10.0.0.99, 203.0.113.9");
        assert_eq!(client_ip(&headers, ip("10.0.0.1"), 1), ip("203.0.113.9"));
    }

    #[test]
    fn test_two_proxies_skip_the_inner_hop() {
        let headers = forwarded("10.0.0.99, 203.0.113.9, 172.16.0.2");
        assert_eq!(client_ip(&headers, ip("10.0.0.1"), 2), ip("203.0.113.9"));
    }

    #[test]
    fn test_short_or_garbage_header_falls_back_to_peer() {
        let peer = ip("192.0.2.4");
        assert_eq!(client_ip(&forwarded("203.0.113.9"), peer, 2), peer);
        assert_eq!(client_ip(&forwarded("not-an-ip"), peer, 1), peer);
        assert_eq!(client_ip(&HeaderMap::new(), peer, 1), peer);
    }

    #[test]
    fn test_no_address_at_all() {
        assert_eq!(client_ip(&HeaderMap::new(), None, 0), None);
    }
}
