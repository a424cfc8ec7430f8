//! Transport that answers every request with the request itself.

use crate::transport::{Launching, Transport, TransportRequest, TransportResponse};

/// Request header selecting the status code of the echoed response.
pub const ECHO_RESPONSE_CODE: &str = "Echo-Response-Code";

/// Responds with the request headers and body. The status is taken from the
/// `Echo-Response-Code` request header, defaulting to 200.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoTransport;

impl EchoTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for EchoTransport {
    fn launch(&self, request: TransportRequest) -> Launching<'_> {
        Box::pin(async move {
            let code = request
                .headers
                .get(ECHO_RESPONSE_CODE)
                .and_then(|c| c.trim().parse().ok())
                .unwrap_or(200);
            tracing::debug!(method = %request.method, url = %request.url, code, "echo");
            Ok(TransportResponse::new(code, request.headers, request.body))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_to_string;
    use crate::io::source::BytesSource;
    use http::Method;

    #[tokio::test]
    async fn test_echo_returns_request() {
        let request = TransportRequest::new(Method::POST, "http://echo.test/a")
            .with_header("Content-Type", "text/plain")
            .with_header(ECHO_RESPONSE_CODE, "418")
            .with_body(Box::new(BytesSource::new("ping")));

        let mut response = EchoTransport::new().launch(request).await.unwrap();
        assert_eq!(response.code, 418);
        assert_eq!(response.headers.get("content-type"), Some("text/plain"));
        let mut body = response.body.take().unwrap();
        assert_eq!(read_to_string(body.as_mut()).unwrap(), "ping");
    }

    #[tokio::test]
    async fn test_echo_default_code() {
        let request = TransportRequest::new(Method::GET, "http://echo.test");
        let response = EchoTransport::new().launch(request).await.unwrap();
        assert_eq!(response.code, 200);
        assert!(response.body.is_none());
    }
}
