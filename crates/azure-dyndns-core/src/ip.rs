//! Public-IP discovery over HTTP.
//!
//! One GET against a plain-text echo endpoint, no retries; retry policy, if
//! any, belongs to the caller.

use crate::error::Error;
use async_trait::async_trait;
use reqwest::Client;
use std::{net::Ipv4Addr, time::Duration};
use tokio::time::timeout;
use tracing::info;

/// Same well-known endpoint the original client queried.
const IP_ENDPOINT: &str = "https://ifconfig.me";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the caller's current public IPv4 address.
#[async_trait]
pub trait IpResolver: Send + Sync {
    async fn current_ip(&self) -> Result<Ipv4Addr, Error>;
}

pub struct HttpIpResolver {
    client: Client,
    url: String,
}

impl HttpIpResolver {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl Default for HttpIpResolver {
    fn default() -> Self {
        Self::new(IP_ENDPOINT)
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn current_ip(&self) -> Result<Ipv4Addr, Error> {
        let fut = async {
            let resp = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| Error::Network(format!("request to {} failed: {e}", self.url)))?
                .error_for_status()
                .map_err(|e| Error::Network(format!("{} answered with: {e}", self.url)))?;
            resp.text()
                .await
                .map_err(|e| Error::Network(format!("cannot read body from {}: {e}", self.url)))
        };
        let body = timeout(REQUEST_TIMEOUT, fut)
            .await
            .map_err(|_| Error::Network(format!("request to {} timed out", self.url)))??;
        let ip = parse_ip_body(&body)?;
        info!("public IP {ip} via {}", self.url);
        Ok(ip)
    }
}

/// The endpoint answers with the address as plain text, possibly padded
/// with whitespace. Anything that is not an IPv4 address is refused so a
/// broken endpoint can never end up inside an A record.
fn parse_ip_body(body: &str) -> Result<Ipv4Addr, Error> {
    let trimmed = body.trim();
    trimmed
        .parse()
        .map_err(|_| Error::Network(format!("`{trimmed}` is not an IPv4 address")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_trimmed() {
        assert_eq!(
            parse_ip_body("  203.0.113.7\n").unwrap(),
            Ipv4Addr::new(203, 0, 113, 7)
        );
    }

    #[test]
    fn non_ipv4_bodies_are_network_errors() {
        for body in ["", "<html>busy</html>", "2001:db8::1", "999.1.1.1"] {
            assert!(matches!(parse_ip_body(body), Err(Error::Network(_))), "{body}");
        }
    }
}
