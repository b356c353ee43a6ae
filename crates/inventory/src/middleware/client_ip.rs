use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use std::{
    convert::Infallible,
    net::{IpAddr, SocketAddr},
};

/// Best-effort client address: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the socket peer, else `unknown`. Header values that are
/// not an address are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    let value = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)?;

    value
        .parse::<IpAddr>()
        .ok()
        .or_else(|| value.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = header_ip(&parts.headers, "x-forwarded-for")
            .or_else(|| header_ip(&parts.headers, "x-real-ip"))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientIp(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> String {
        let (mut parts, _) = req.into_parts();
        let ClientIp(ip) = ClientIp::from_request_parts(&mut parts, &()).await.unwrap();
        ip
    }

    #[tokio::test]
    async fn prefers_first_forwarded_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.2")
            .header("x-real-ip", "10.0.0.9")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await, "203.0.113.7");
    }

    #[tokio::test]
    async fn falls_back_to_unknown() {
        let req = Request::builder().body(()).unwrap();
        assert_eq!(extract(req).await, "unknown");
    }

    #[tokio::test]
    async fn oversized_forwarded_value_falls_back_to_peer() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "a".repeat(300))
            .header("x-real-ip", "not-an-address")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 4], 55012))));

        assert_eq!(extract(req).await, "198.51.100.4");
    }

    #[tokio::test]
    async fn forwarded_address_with_port_keeps_the_ip() {
        let req = Request::builder()
            .header("x-forwarded-for", "[2001:db8::1]:443")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await, "2001:db8::1");
    }
}
