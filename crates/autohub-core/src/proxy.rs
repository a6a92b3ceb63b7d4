use crate::{Error, Result};
use std::fmt;
use url::Url;

const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "socks4", "socks5"];

/// A validated proxy server address, e.g. `socks5://127.0.0.1:1080`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    scheme: String,
    host: String,
    port: u16,
}

impl ProxyAddress {
    /// Parse `host:port` or `scheme://host:port`. A bare address defaults to http.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidProxy("empty address".to_string()));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| Error::InvalidProxy(format!("{}: {}", trimmed, e)))?;

        let scheme = url.scheme().to_lowercase();
        if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
            return Err(Error::InvalidProxy(format!(
                "{}: unsupported scheme '{}'",
                trimmed, scheme
            )));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::InvalidProxy(format!("{}: missing host", trimmed)))?
            .to_string();

        // The url crate drops a port equal to the scheme default, so look at the text too.
        let port = url
            .port()
            .or_else(|| has_explicit_port(&with_scheme).then(|| url.port_or_known_default()).flatten())
            .ok_or_else(|| Error::InvalidProxy(format!("{}: missing port", trimmed)))?;

        Ok(Self { scheme, host, port })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

fn has_explicit_port(address: &str) -> bool {
    let authority = address
        .split_once("://")
        .map_or(address, |(_, rest)| rest)
        .split('/')
        .next()
        .unwrap_or_default();
    authority
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}
