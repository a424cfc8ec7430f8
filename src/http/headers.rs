//! Ordered header list.
//!
//! Keeps duplicates and original casing; lookups ignore case.

use crate::base::neterror::NetError;
use crate::cache::control::CacheControl;
use crate::http::mime::{ContentDisposition, ContentType};

pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const AGE: &str = "Age";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const COOKIE: &str = "Cookie";
pub const DATE: &str = "Date";
pub const EXPIRES: &str = "Expires";
pub const SET_COOKIE: &str = "Set-Cookie";
pub const USER_AGENT: &str = "User-Agent";

const LINE: &str = "\r\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any existing ones with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Replace every header called `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn content_type(&self) -> Result<Option<ContentType>, NetError> {
        self.get(CONTENT_TYPE).map(ContentType::parse).transpose()
    }

    pub fn content_disposition(&self) -> Result<Option<ContentDisposition>, NetError> {
        self.get(CONTENT_DISPOSITION)
            .map(ContentDisposition::parse)
            .transpose()
    }

    /// All `Cache-Control` headers merged into one directive set.
    pub fn cache_control(&self) -> CacheControl {
        CacheControl::parse(self.get_all(CACHE_CONTROL))
    }

    /// Render as `name: value` lines joined by CRLF.
    pub fn to_lines(&self) -> String {
        self.entries
            .iter()
            .map(|(n, v)| format!("{}: {}", n, v))
            .collect::<Vec<_>>()
            .join(LINE)
    }

    /// Parse `name: value` lines separated by CRLF (or bare LF).
    ///
    /// Lines without a colon or with an empty name are skipped. Empty values
    /// are kept.
    pub fn parse_lines(text: &str) -> Headers {
        text.split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                let (name, value) = (name.trim(), value.trim());
                (!name.is_empty()).then(|| (name, value))
            })
            .collect()
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Headers {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

impl<N, V> Extend<(N, V)> for Headers
where
    N: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(n, v)| (n.into(), v.into())));
    }
}
