//! Plain-HTTP transport over `hyper`'s HTTP/1.1 client connection.
//!
//! One connection per request; the body is buffered in both directions.
//! Content codings are not decoded, so `Accept-Encoding` is never sent.

use crate::base::neterror::NetError;
use crate::http::headers::{Headers, ACCEPT_ENCODING};
use crate::io::read_to_bytes;
use crate::transport::{Launching, Transport, TransportRequest, TransportResponse};
use bytes::Bytes;
use http::header::HOST;
use http::Request;
use http_body_util::{BodyExt, Full};
use ::hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use url::Url;

#[derive(Debug, Default, Clone, Copy)]
pub struct HyperTransport;

impl HyperTransport {
    pub fn new() -> Self {
        Self
    }

    async fn execute(request: TransportRequest) -> Result<TransportResponse, NetError> {
        let url = Url::parse(&request.url).map_err(|e| NetError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(NetError::DisallowedUrlScheme(url.scheme().to_string()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| NetError::InvalidUrl(request.url.clone()))?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(80);

        let body = match request.body {
            Some(mut source) => read_to_bytes(source.as_mut())?,
            None => Bytes::new(),
        };

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.clone(),
        };
        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let mut builder = Request::builder().method(request.method).uri(path);
        let mut headers = request.headers;
        headers.remove(ACCEPT_ENCODING);
        if !headers.contains(HOST.as_str()) {
            builder = builder.header(HOST, authority);
        }
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        let hyper_request = builder
            .body(Full::new(body))
            .map_err(|e| NetError::InvalidHeader(e.to_string()))?;

        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?;
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?;

        // Drive the connection until the exchange completes
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });

        let response = sender
            .send_request(hyper_request)
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?;

        let code = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?
            .to_bytes();

        Ok(TransportResponse::with_bytes(code, headers, body))
    }
}

impl Transport for HyperTransport {
    fn launch(&self, request: TransportRequest) -> Launching<'_> {
        Box::pin(Self::execute(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[tokio::test]
    async fn test_https_is_refused() {
        let request = TransportRequest::new(Method::GET, "https://example.com/");
        let err = HyperTransport::new().launch(request).await.unwrap_err();
        assert!(matches!(err, NetError::DisallowedUrlScheme(s) if s == "https"));
    }

    #[tokio::test]
    async fn test_round_trip_against_local_server() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let head = String::from_utf8_lossy(&buf[..n]).to_string();
            socket
                .write_all(b"HTTP/1.1 201 Created\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nok")
                .await
                .unwrap();
            head
        });

        let request = TransportRequest::new(Method::GET, format!("http://{}/items?q=1", addr))
            .with_header("Accept-Encoding", "gzip");
        let mut response = HyperTransport::new().launch(request).await.unwrap();
        assert_eq!(response.code, 201);
        assert_eq!(response.headers.get("content-type"), Some("text/plain"));
        let mut body = response.body.take().unwrap();
        assert_eq!(crate::io::read_to_string(body.as_mut()).unwrap(), "ok");

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /items?q=1 HTTP/1.1"));
        assert!(!head.to_ascii_lowercase().contains("accept-encoding"));
    }
}
