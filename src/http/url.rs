//! Request URL model.
//!
//! Parsing goes through the `url` crate and is then narrowed to what the
//! client supports: `http`/`https` only, a plain host name, a path stored
//! without leading or trailing slashes and an ordered raw query.
//!
//! Identity (`Eq`/`Hash`) is scheme, host, port and path. The query is
//! deliberately left out; use the rendered string when the query matters.

use crate::base::neterror::NetError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpUrl {
    scheme: String,
    host: String,
    port: u16,
    path: String,
    query: Vec<(String, String)>,
}

impl HttpUrl {
    /// Parse a URL. Input without `://` is treated as `https`.
    pub fn parse(input: &str) -> Result<Self, NetError> {
        let input = input.trim();
        let owned;
        let input = if input.contains("://") {
            input
        } else {
            owned = format!("https://{}", input);
            owned.as_str()
        };

        let url = Url::parse(input).map_err(|e| NetError::InvalidUrl(format!("{}: {}", input, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| NetError::InvalidUrl(format!("{}: missing host", input)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| NetError::InvalidUrl(format!("{}: missing port", input)))?;

        Self::from_parts(
            url.scheme(),
            host,
            url.path(),
            url.query().map(parse_query).unwrap_or_default(),
            Some(port),
        )
    }

    /// Build a URL from its pieces, applying the same validation as [`parse`](Self::parse).
    pub fn from_parts(
        scheme: &str,
        host: &str,
        path: &str,
        query: Vec<(String, String)>,
        port: Option<u16>,
    ) -> Result<Self, NetError> {
        let scheme = scheme.to_ascii_lowercase();
        let default_port = default_port(&scheme)
            .ok_or_else(|| NetError::InvalidUrl(format!("unsupported scheme {:?}", scheme)))?;
        if host.is_empty() || host.contains(&['/', ':', '?', '&'][..]) {
            return Err(NetError::InvalidUrl(format!("invalid host {:?}", host)));
        }

        Ok(Self {
            scheme,
            host: host.to_ascii_lowercase(),
            port: port.unwrap_or(default_port),
            path: path.trim_matches('/').to_string(),
            query,
        })
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

    /// Path without leading or trailing `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn is_https(&self) -> bool {
        self.scheme == "https"
    }

    /// Copy with `extra_path` appended to the path and `extra_query` to the query.
    pub fn join(&self, extra_path: &str, extra_query: &[(&str, &str)]) -> HttpUrl {
        let extra_path = extra_path.trim_matches('/');
        let path = match (self.path.is_empty(), extra_path.is_empty()) {
            (_, true) => self.path.clone(),
            (true, false) => extra_path.to_string(),
            (false, false) => format!("{}/{}", self.path, extra_path),
        };
        let mut query = self.query.clone();
        query.extend(
            extra_query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        HttpUrl {
            path,
            query,
            ..self.clone()
        }
    }

    /// Rendered form without the query string.
    pub fn without_query(&self) -> String {
        let mut out = format!("{}://{}", self.scheme, self.host);
        if Some(self.port) != default_port(&self.scheme) {
            out.push_str(&format!(":{}", self.port));
        }
        if !self.path.is_empty() {
            out.push('/');
            out.push_str(&self.path);
        }
        out
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

impl fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.without_query())?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        Ok(())
    }
}

impl FromStr for HttpUrl {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpUrl::parse(s)
    }
}

impl PartialEq for HttpUrl {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.host == other.host
            && self.port == other.port
            && self.path == other.path
    }
}

impl Eq for HttpUrl {}

impl Hash for HttpUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scheme.hash(state);
        self.host.hash(state);
        self.port.hash(state);
        self.path.hash(state);
    }
}
