//! # contentnet
//!
//! An HTTP client runtime that models bodies as typed, streamable content.
//!
//! `contentnet` sits on top of a pluggable transport and adds what the
//! transport does not: content-type driven body decoding, a streaming
//! multipart codec, an RFC 7234 style disk cache and an RFC 6265 style
//! cookie jar.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contentnet::{Client, Content};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::builder()
//!         .folder("/tmp/contentnet")
//!         .disk_cache()
//!         .cookie_file()
//!         .build();
//!
//!     let text = client
//!         .get("http://example.com/motd")
//!         .await
//!         .success_or_none()
//!         .and_then(|content| content.expect_data().ok())
//!         .and_then(|data| data.expect_text().ok());
//!     println!("{:?}", text);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error type, clock and IO error context
//! - [`io`] - Single-use byte sources, surfaces and folders
//! - [`http`] - Headers, media types, URLs, content, multipart codec
//! - [`cache`] - Cache lifetimes, cache files and the cache manager
//! - [`cookies`] - Cookie parsing, matching and the cookie jar
//! - [`transport`] - Transport contract and the shipped transports
//! - [`client`] - Request orchestration

pub mod base;
pub mod cache;
pub mod client;
pub mod cookies;
pub mod http;
pub mod io;
pub mod transport;

// Re-exports for convenience
pub use base::neterror::NetError;
pub use client::{Client, ClientBuilder, ClientConfig};
pub use http::{Content, ContentData, Headers, HttpResult, HttpUrl, Single};
