//! Transport engine contract.
//!
//! The client never talks to sockets itself. It hands a
//! [`TransportRequest`] to an injected [`Transport`] and gets a
//! [`TransportResponse`] back. Redirects, connection reuse and TLS are the
//! transport's business.
//!
//! Shipped implementations:
//! - [`HyperTransport`](hyper::HyperTransport): plain HTTP over `hyper`
//! - [`MockTransport`](mock::MockTransport): canned responses per method and URL
//! - [`EchoTransport`](echo::EchoTransport): returns the request back

pub mod echo;
pub mod hyper;
pub mod mock;

use crate::base::neterror::NetError;
use crate::http::headers::Headers;
use crate::io::source::{BytesSource, Source};
use bytes::Bytes;
use futures::future::BoxFuture;
use http::Method;
use std::sync::Arc;

#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Box<dyn Source>>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn with_body(mut self, body: Box<dyn Source>) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug)]
pub struct TransportResponse {
    pub code: u16,
    pub headers: Headers,
    pub body: Option<Box<dyn Source>>,
    /// Set when the response was produced without calling the transport.
    pub from_cache: bool,
}

impl TransportResponse {
    pub fn new(code: u16, headers: Headers, body: Option<Box<dyn Source>>) -> Self {
        Self {
            code,
            headers,
            body,
            from_cache: false,
        }
    }

    /// Response with an in-memory body. An empty body becomes no body.
    pub fn with_bytes(code: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let body = (!body.is_empty()).then(|| Box::new(BytesSource::new(body)) as Box<dyn Source>);
        Self::new(code, headers, body)
    }

    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Alias for the `Future` type returned by a transport.
pub type Launching<'a> = BoxFuture<'a, Result<TransportResponse, NetError>>;

/// Executes one request.
///
/// Implementations must be thread-safe; one transport serves every request
/// of a client concurrently.
pub trait Transport: Send + Sync {
    fn launch(&self, request: TransportRequest) -> Launching<'_>;
}

/// Blanket implementation for Arc-wrapped transports.
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn launch(&self, request: TransportRequest) -> Launching<'_> {
        (**self).launch(request)
    }
}
