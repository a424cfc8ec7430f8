//! HTTP client with builder pattern.
//!
//! Turns typed [`Content`] into transport requests and transport responses
//! back into [`Content`], with optional caching, cookies and logging.
//!
//! # Example
//!
//! ```rust,ignore
//! use contentnet::{Client, Content};
//!
//! let client = Client::builder()
//!     .folder("/tmp/contentnet")
//!     .disk_cache()
//!     .cookie_file()
//!     .build();
//!
//! let result = client.post("http://example.com/notes", Content::text("hello")).await;
//! let body = result.success_or_none();
//! ```

use crate::base::blocking::run_blocking;
use crate::base::clock::{Clock, SystemClock};
use crate::base::neterror::NetError;
use crate::cache::manager::{CacheManager, DiskCacheManager};
use crate::cookies::cookie::cookies_of;
use crate::cookies::jar::{CookieJar, CookieManager};
use crate::http::content::{Content, Single};
use crate::http::dispatch::surface_for;
use crate::http::headers::{Headers, ACCEPT_ENCODING, CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, USER_AGENT};
use crate::http::mime::ContentType;
use crate::http::multipart::{generate_boundary, MultipartSource, MultipartSurface};
use crate::http::printer::{LogConfig, Printer};
use crate::http::result::HttpResult;
use crate::http::url::HttpUrl;
use crate::io::folder::Folder;
use crate::io::source::Source;
use crate::io::surface::Surface;
use crate::io::transfer;
use crate::transport::hyper::HyperTransport;
use crate::transport::{Transport, TransportRequest, TransportResponse};
use http::Method;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Plain settings of a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Working directory. Downloaded files land in `files/`, the disk cache
    /// in `cache/` and the cookie file is `cookies.cn`.
    pub folder: Folder,
    pub user_agent: String,
    /// Request/response logging; off when `None`.
    pub logging: Option<LogConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            folder: Folder::new(std::env::temp_dir().join("contentnet")),
            user_agent: format!("contentnet/{}", env!("CARGO_PKG_VERSION")),
            logging: None,
        }
    }
}

/// HTTP client.
///
/// Cheap to clone; clones share the transport, cache and cookie jar. Use
/// [`Client::builder()`] to configure one.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    files: Folder,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheManager>>,
    cookies: Option<Arc<dyn CookieManager>>,
    printer: Option<Printer>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("cache", &self.inner.cache.is_some())
            .field("cookies", &self.inner.cookies.is_some())
            .finish()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Client over plain HTTP with no cache and no cookies.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> Option<&Arc<dyn CacheManager>> {
        self.inner.cache.as_ref()
    }

    pub fn cookies(&self) -> Option<&Arc<dyn CookieManager>> {
        self.inner.cookies.as_ref()
    }

    pub async fn get<U: AsRef<str>>(&self, url: U) -> HttpResult<Content, Content> {
        self.launch(Method::GET, url, Content::empty()).await
    }

    pub async fn post<U: AsRef<str>>(&self, url: U, content: Content) -> HttpResult<Content, Content> {
        self.launch(Method::POST, url, content).await
    }

    pub async fn put<U: AsRef<str>>(&self, url: U, content: Content) -> HttpResult<Content, Content> {
        self.launch(Method::PUT, url, content).await
    }

    pub async fn patch<U: AsRef<str>>(&self, url: U, content: Content) -> HttpResult<Content, Content> {
        self.launch(Method::PATCH, url, content).await
    }

    pub async fn delete<U: AsRef<str>>(&self, url: U) -> HttpResult<Content, Content> {
        self.launch(Method::DELETE, url, Content::empty()).await
    }

    /// Execute one request.
    ///
    /// 1xx and 2xx responses are `Success`, every other status is `Error`
    /// with its body decoded the same way. Anything that prevents getting a
    /// decoded response is a `Failure`.
    pub async fn launch<U: AsRef<str>>(
        &self,
        method: Method,
        url: U,
        content: Content,
    ) -> HttpResult<Content, Content> {
        match self.execute(method, url.as_ref(), content).await {
            Ok((code, content)) => HttpResult::classify(code, content),
            Err(err) => HttpResult::Failure(err),
        }
    }

    /// Like [`launch`](Self::launch), with non-success statuses turned into
    /// [`NetError::HttpStatus`].
    pub async fn launch_or_throw<U: AsRef<str>>(
        &self,
        method: Method,
        url: U,
        content: Content,
    ) -> Result<Content, NetError> {
        self.launch(method, url, content)
            .await
            .success_or_else(|code, content| NetError::HttpStatus {
                code,
                content: Box::new(content),
            })
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        content: Content,
    ) -> Result<(u16, Content), NetError> {
        let inner = &self.inner;
        let url = HttpUrl::parse(url)?;
        let client = self.clone();
        let request_url = url.clone();
        let request = run_blocking(move || client.request_of(method, &request_url, content)).await?;
        let target = request.url.clone();

        if let Some(printer) = &inner.printer {
            printer.request(&request);
        }
        let started = Instant::now();
        let response = match &inner.cache {
            Some(cache) => cache.get_or_put(request, inner.transport.as_ref()).await,
            None => inner.transport.launch(request).await,
        };
        if let Some(printer) = &inner.printer {
            printer.response(&target, &response, started.elapsed());
        }

        let response = response?;
        let code = response.code;
        let client = self.clone();
        let content = run_blocking(move || client.content_of(&url, response)).await?;
        Ok((code, content))
    }

    /// Build the transport request for `content`.
    fn request_of(&self, method: Method, url: &HttpUrl, content: Content) -> Result<TransportRequest, NetError> {
        let inner = &self.inner;
        let (mut headers, body): (Headers, Option<Box<dyn Source>>) = match content {
            Content::Empty { headers } => (headers, None),
            Content::Single(Single { data, mut headers }) => {
                headers.set(CONTENT_TYPE, data.content_type().to_string());
                (headers, Some(data.into_source()?))
            }
            Content::Mix { parts, mut headers } => {
                let boundary = generate_boundary();
                headers.set(CONTENT_TYPE, multipart_type("mixed", &boundary));
                let parts = parts
                    .into_iter()
                    .map(|Single { data, mut headers }| {
                        headers.set(CONTENT_TYPE, data.content_type().to_string());
                        Single::with_headers(data, headers)
                    })
                    .collect();
                let body: Box<dyn Source> = Box::new(MultipartSource::from_singles(&boundary, parts)?);
                (headers, Some(body))
            }
            Content::Form { parts, mut headers } => {
                let boundary = generate_boundary();
                headers.set(CONTENT_TYPE, multipart_type("form-data", &boundary));
                let parts = parts
                    .into_iter()
                    .map(|(name, Single { data, mut headers })| {
                        headers.set(CONTENT_TYPE, data.content_type().to_string());
                        headers.set(CONTENT_DISPOSITION, data.content_disposition(&name).to_string());
                        Single::with_headers(data, headers)
                    })
                    .collect();
                let body: Box<dyn Source> = Box::new(MultipartSource::from_singles(&boundary, parts)?);
                (headers, Some(body))
            }
        };

        if !headers.contains(USER_AGENT) {
            headers.push(USER_AGENT, inner.config.user_agent.as_str());
        }
        if !headers.contains(ACCEPT_ENCODING) {
            headers.push(ACCEPT_ENCODING, "gzip");
        }
        if let Some(cookies) = &inner.cookies {
            let pairs: Vec<String> = cookies.for_url(url)?.iter().map(|c| c.pair()).collect();
            if !pairs.is_empty() {
                headers.push(COOKIE, pairs.join("; "));
            }
        }

        Ok(TransportRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    /// Decode a transport response into content.
    fn content_of(&self, url: &HttpUrl, response: TransportResponse) -> Result<Content, NetError> {
        let inner = &self.inner;
        let TransportResponse {
            headers,
            body,
            from_cache,
            ..
        } = response;

        if let (Some(cookies), false) = (&inner.cookies, from_cache) {
            let received = cookies_of(url, &headers, inner.clock.now());
            if !received.is_empty() {
                cookies.set(received)?;
            }
        }

        let (Some(content_type), Some(mut body)) = (headers.content_type()?, body) else {
            return Ok(Content::Empty { headers });
        };

        if content_type.primary.eq_ignore_ascii_case("multipart") {
            let boundary = content_type.param("boundary").ok_or(NetError::MissingBoundary)?;
            let mut surface = Box::new(MultipartSurface::new(boundary, inner.files.clone()));
            transfer(body.as_mut(), surface.as_mut())?;
            let parts = surface.close()?;
            return multipart_content(&content_type, parts, headers);
        }

        let mut surface = surface_for(&content_type, &inner.files)?;
        transfer(body.as_mut(), surface.as_mut())?;
        Ok(Content::Single(Single::with_headers(surface.close()?, headers)))
    }
}

fn multipart_type(subtype: &str, boundary: &str) -> String {
    ContentType::new("multipart", subtype)
        .with_param("boundary", boundary)
        .to_string()
}

fn multipart_content(content_type: &ContentType, parts: Vec<Single>, headers: Headers) -> Result<Content, NetError> {
    if !content_type.subtype.eq_ignore_ascii_case("form-data") {
        return Ok(Content::Mix { parts, headers });
    }
    let mut named = BTreeMap::new();
    for part in parts {
        let name = part
            .headers
            .content_disposition()?
            .and_then(|d| d.name().map(str::to_string))
            .ok_or(NetError::MissingPartName)?;
        named.insert(name, part);
    }
    Ok(Content::Form {
        parts: named,
        headers,
    })
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn CacheManager>>,
    disk_cache: bool,
    cookies: Option<Arc<dyn CookieManager>>,
    cookie_file: bool,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    /// Start from ready-made settings.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the working directory.
    pub fn folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.folder = Folder::new(path);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the transport engine. Defaults to [`HyperTransport`].
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Enable request/response logging.
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.config.logging = Some(config);
        self
    }

    /// Use a custom cache manager.
    pub fn cache<M: CacheManager + 'static>(mut self, manager: M) -> Self {
        self.cache = Some(Arc::new(manager));
        self
    }

    /// Cache on disk in `cache/` under the working directory.
    pub fn disk_cache(mut self) -> Self {
        self.disk_cache = true;
        self
    }

    /// Use a custom cookie manager.
    pub fn cookie_manager<M: CookieManager + 'static>(mut self, manager: M) -> Self {
        self.cookies = Some(Arc::new(manager));
        self
    }

    /// Keep cookies in `cookies.cn` under the working directory.
    pub fn cookie_file(mut self) -> Self {
        self.cookie_file = true;
        self
    }

    /// Time source for cache and cookie lifetimes.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the client.
    pub fn build(self) -> Client {
        let folder = self.config.folder.clone();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HyperTransport::new()));

        let cache = match (self.cache, self.disk_cache) {
            (Some(cache), _) => Some(cache),
            (None, true) => Some(Arc::new(DiskCacheManager::with_clock(
                folder.child("cache"),
                clock.clone(),
            )) as Arc<dyn CacheManager>),
            (None, false) => None,
        };
        let cookies = match (self.cookies, self.cookie_file) {
            (Some(cookies), _) => Some(cookies),
            (None, true) => Some(Arc::new(CookieJar::with_clock(
                folder.file("cookies.cn"),
                clock.clone(),
            )) as Arc<dyn CookieManager>),
            (None, false) => None,
        };
        let printer = self.config.logging.clone().map(Printer::new);

        Client {
            inner: Arc::new(ClientInner {
                files: folder.child("files"),
                config: self.config,
                transport,
                cache,
                cookies,
                printer,
                clock,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::content::ContentData;
    use crate::transport::echo::EchoTransport;

    fn client(dir: &std::path::Path) -> Client {
        Client::builder()
            .folder(dir)
            .transport(EchoTransport::new())
            .build()
    }

    #[tokio::test]
    async fn test_default_headers() {
        let dir = tempfile::tempdir().unwrap();
        let content = client(dir.path())
            .get("http://example.com/")
            .await
            .success_or_none()
            .unwrap();
        let headers = content.headers();
        assert!(headers.get("user-agent").unwrap().starts_with("contentnet/"));
        assert_eq!(headers.get("accept-encoding"), Some("gzip"));
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_single_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let data = client(dir.path())
            .post("http://example.com/", Content::text("hello"))
            .await
            .success_or_none()
            .unwrap()
            .expect_data()
            .unwrap();
        assert!(matches!(data, ContentData::Text(s) if s == "hello"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = client(dir.path()).get("ftp://example.com").await;
        assert!(matches!(result.failure_or_none(), Some(NetError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_launch_or_throw() {
        let dir = tempfile::tempdir().unwrap();
        let err = client(dir.path())
            .launch_or_throw(
                Method::POST,
                "http://example.com/",
                Content::text("nope").with_header("Echo-Response-Code", "409"),
            )
            .await
            .unwrap_err();
        match err {
            NetError::HttpStatus { code, content } => {
                assert_eq!(code, 409);
                assert_eq!(content.expect_data().unwrap().expect_text().unwrap(), "nope");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_builder_wiring() {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::builder()
            .folder(dir.path())
            .disk_cache()
            .cookie_file()
            .user_agent("agent/1")
            .build();
        assert!(client.cache().is_some());
        assert!(client.cookies().is_some());
        assert_eq!(client.config().user_agent, "agent/1");
        assert!(Client::new().cache().is_none());
    }
}
