//! Cookie management.
//!
//! - [`cookie`]: `Set-Cookie` parsing and request matching
//! - [`jar`]: the [`CookieManager`](jar::CookieManager) seam and its
//!   file-backed [`CookieJar`](jar::CookieJar)
//! - [`persistence`]: the on-disk line format
//! - [`psl`]: Public Suffix List checks for `Domain` attributes

pub mod cookie;
pub mod jar;
pub mod persistence;
pub mod psl;

pub use cookie::{cookies_of, HttpCookie, Validity};
pub use jar::{CookieJar, CookieManager};
