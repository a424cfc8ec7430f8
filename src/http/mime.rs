//! `Content-Type` and `Content-Disposition` values.

use crate::base::neterror::NetError;
use std::borrow::Cow;
use std::fmt;

/// A media type with its parameters, e.g. `text/html; charset=utf-8`.
///
/// A parsed value displays as the exact header text it came from, so an
/// unrecognised type can be passed on untouched. Equality ignores that text.
#[derive(Debug, Clone, Eq)]
pub struct ContentType {
    pub primary: String,
    pub subtype: String,
    pub params: Vec<(String, String)>,
    raw: Option<String>,
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.primary == other.primary && self.subtype == other.subtype && self.params == other.params
    }
}

impl ContentType {
    pub fn new(primary: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            subtype: subtype.into(),
            params: Vec::new(),
            raw: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self.raw = None;
        self
    }

    pub fn parse(text: &str) -> Result<Self, NetError> {
        let mut sections = text.split(';');
        let essence = sections.next().unwrap_or_default().trim();
        let (primary, subtype) = essence
            .split_once('/')
            .map(|(p, s)| (p.trim(), s.trim()))
            .filter(|(p, s)| !p.is_empty() && !s.is_empty())
            .ok_or_else(|| NetError::InvalidHeader(format!("content type {:?}", text)))?;

        Ok(Self {
            primary: primary.to_string(),
            subtype: subtype.to_string(),
            params: parse_params(sections),
            raw: Some(text.trim().to_string()),
        })
    }

    /// Case-insensitive match on type and subtype.
    pub fn is(&self, primary: &str, subtype: &str) -> bool {
        self.primary.eq_ignore_ascii_case(primary) && self.subtype.eq_ignore_ascii_case(subtype)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        find_param(&self.params, name)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw) = &self.raw {
            return f.write_str(raw);
        }
        write!(f, "{}/{}", self.primary, self.subtype)?;
        for (name, value) in &self.params {
            if needs_quotes(value) {
                write!(f, "; {}=\"{}\"", name, escape_quotes(value))?;
            } else {
                write!(f, "; {}={}", name, value)?;
            }
        }
        Ok(())
    }
}

/// A disposition with its parameters, e.g. `form-data; name="file"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    pub kind: String,
    pub params: Vec<(String, String)>,
}

impl ContentDisposition {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn parse(text: &str) -> Result<Self, NetError> {
        let mut sections = text.split(';');
        let kind = sections.next().unwrap_or_default().trim();
        if kind.is_empty() || kind.contains('=') {
            return Err(NetError::InvalidHeader(format!(
                "content disposition {:?}",
                text
            )));
        }
        Ok(Self {
            kind: kind.to_string(),
            params: parse_params(sections),
        })
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        find_param(&self.params, name)
    }

    pub fn name(&self) -> Option<&str> {
        self.param("name")
    }

    pub fn filename(&self) -> Option<&str> {
        self.param("filename")
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        for (name, value) in &self.params {
            write!(f, "; {}=\"{}\"", name, escape_quotes(value))?;
        }
        Ok(())
    }
}

fn parse_params<'a>(sections: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
    sections
        .filter_map(|section| {
            let (name, value) = section.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), unquote(value.trim())))
        })
        .collect()
}

fn find_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn unquote(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c))
}

/// Escape quotes and backslashes in a string.
fn escape_quotes(s: &str) -> Cow<'_, str> {
    if s.contains('"') || s.contains('\\') || s.contains('\r') || s.contains('\n') {
        Cow::Owned(
            s.replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\r', "\\r")
                .replace('\n', "\\n"),
        )
    } else {
        Cow::Borrowed(s)
    }
}
