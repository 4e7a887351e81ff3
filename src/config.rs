use std::net::SocketAddr;

use crate::error::CompareError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Reads `HOST` and `PORT`, falling back to `0.0.0.0:8080`.
    pub fn from_env() -> Result<Self, CompareError> {
        Self::from_parts(
            std::env::var("HOST").ok().as_deref(),
            std::env::var("PORT").ok().as_deref(),
        )
    }

    fn from_parts(host: Option<&str>, port: Option<&str>) -> Result<Self, CompareError> {
        let host = host.unwrap_or(DEFAULT_HOST);
        let port = match port {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| CompareError::Config(format!("PORT must be a port number, got {raw:?}")))?,
            None => DEFAULT_PORT,
        };
        let addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|_| CompareError::Config(format!("HOST must be an IP address, got {host:?}")))?;
        Ok(Self { addr })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_interfaces_on_8080() {
        let config = ServerConfig::from_parts(None, None).expect("valid defaults");
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
    }

    #[test]
    fn reads_host_and_port_and_allows_override() {
        let config = ServerConfig::from_parts(Some("127.0.0.1"), Some("9001")).expect("valid config");
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 9001)));
        assert_eq!(config.with_port(3000).addr.port(), 3000);
    }

    #[test]
    fn rejects_bad_port_and_host() {
        let err = ServerConfig::from_parts(None, Some("http")).expect_err("must reject port");
        assert!(err.to_string().contains("PORT"));
        let err = ServerConfig::from_parts(Some("not a host"), None).expect_err("must reject host");
        assert!(err.to_string().contains("HOST"));
    }
}
