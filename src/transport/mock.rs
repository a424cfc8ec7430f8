//! In-process transport answering from registered handlers.

use crate::base::neterror::NetError;
use crate::http::headers::Headers;
use crate::transport::{Launching, Transport, TransportRequest, TransportResponse};
use bytes::Bytes;
use dashmap::DashMap;
use http::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Handler = Arc<dyn Fn(TransportRequest) -> Result<TransportResponse, NetError> + Send + Sync>;

/// Responds from handlers keyed by method and URL.
///
/// A request whose exact URL is not registered is retried without its query
/// string. Unknown requests fail with [`NetError::NotMocked`].
#[derive(Default)]
pub struct MockTransport {
    handlers: DashMap<(Method, String), Handler>,
    calls: AtomicUsize,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("handlers", &self.handlers.len())
            .field("calls", &self.calls.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, method: Method, url: impl Into<String>, handler: F)
    where
        F: Fn(TransportRequest) -> Result<TransportResponse, NetError> + Send + Sync + 'static,
    {
        self.handlers.insert((method, url.into()), Arc::new(handler));
    }

    /// Register a fixed response.
    pub fn respond(
        &self,
        method: Method,
        url: impl Into<String>,
        code: u16,
        headers: Headers,
        body: impl Into<Bytes>,
    ) {
        let body = body.into();
        self.on(method, url, move |_| {
            Ok(TransportResponse::with_bytes(code, headers.clone(), body.clone()))
        });
    }

    /// Number of requests that reached a handler.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn handler(&self, method: &Method, url: &str) -> Option<Handler> {
        let exact = (method.clone(), url.to_string());
        if let Some(handler) = self.handlers.get(&exact) {
            return Some(handler.value().clone());
        }
        let (bare, _) = url.split_once('?')?;
        self.handlers
            .get(&(method.clone(), bare.to_string()))
            .map(|h| h.value().clone())
    }
}

impl Transport for MockTransport {
    fn launch(&self, request: TransportRequest) -> Launching<'_> {
        Box::pin(async move {
            let Some(handler) = self.handler(&request.method, &request.url) else {
                return Err(NetError::NotMocked {
                    method: request.method.to_string(),
                    url: request.url,
                });
            };
            self.calls.fetch_add(1, Ordering::SeqCst);
            handler(request)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exact_and_query_fallback() {
        let mock = MockTransport::new();
        mock.respond(Method::GET, "http://api.test/items", 200, Headers::new(), "list");
        mock.respond(Method::GET, "http://api.test/items?page=2", 200, Headers::new(), "page2");

        let page2 = mock
            .launch(TransportRequest::new(Method::GET, "http://api.test/items?page=2"))
            .await
            .unwrap();
        let mut body = page2.body.unwrap();
        assert_eq!(crate::io::read_to_string(body.as_mut()).unwrap(), "page2");

        let other = mock
            .launch(TransportRequest::new(Method::GET, "http://api.test/items?page=9"))
            .await
            .unwrap();
        let mut body = other.body.unwrap();
        assert_eq!(crate::io::read_to_string(body.as_mut()).unwrap(), "list");
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_not_mocked() {
        let mock = MockTransport::new();
        mock.respond(Method::GET, "http://api.test/items", 200, Headers::new(), "");
        let err = mock
            .launch(TransportRequest::new(Method::POST, "http://api.test/items"))
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::NotMocked { ref method, .. } if method == "POST"));
        assert_eq!(mock.calls(), 0);
    }
}
