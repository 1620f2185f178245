pub mod categories;
pub mod comments;
pub mod compilations;
pub mod events;
pub mod requests;
pub mod users;

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::HeaderMap;

/// Client address for hit recording: the first `X-Forwarded-For` entry when
/// the service sits behind a proxy, the socket peer otherwise.
pub(crate) fn client_ip(headers: &HeaderMap, addr: &ConnectInfo<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| addr.0.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn addr() -> ConnectInfo<SocketAddr> {
        ConnectInfo("10.0.0.7:43210".parse().unwrap())
    }

    #[test]
    fn prefers_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        assert_eq!(client_ip(&headers, &addr()), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_socket_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), &addr()), "10.0.0.7");
    }
}
