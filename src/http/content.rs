//! Typed request and response bodies.
//!
//! [`ContentData`] is the payload of a single body; [`Content`] is the
//! envelope, either empty, a single payload, or a multipart list/form.

use crate::base::neterror::NetError;
use crate::http::headers::Headers;
use crate::http::mime::{ContentDisposition, ContentType};
use crate::io::folder::FileRef;
use crate::io::source::{BytesSource, Source};
use bytes::Bytes;
use std::collections::BTreeMap;

#[derive(Debug)]
pub enum ContentData {
    Audio { subtype: String, file: FileRef },
    Image { subtype: String, file: FileRef },
    Video { subtype: String, file: FileRef },
    Pdf(FileRef),
    Zip(FileRef),
    Binary(FileRef),
    Text(String),
    Html(String),
    Xml(String),
    Json(String),
    Form(BTreeMap<String, String>),
    /// A body whose type is not understood, kept as raw bytes with the
    /// content type it arrived with.
    Other {
        content_type: ContentType,
        source: Box<dyn Source>,
    },
}

impl ContentData {
    pub fn other(content_type: ContentType, bytes: impl Into<Bytes>) -> Self {
        ContentData::Other {
            content_type,
            source: Box::new(BytesSource::new(bytes)),
        }
    }

    /// Canonical media type of this payload.
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentData::Audio { subtype, .. } => ContentType::new("audio", subtype.as_str()),
            ContentData::Image { subtype, .. } => ContentType::new("image", subtype.as_str()),
            ContentData::Video { subtype, .. } => ContentType::new("video", subtype.as_str()),
            ContentData::Pdf(_) => ContentType::new("application", "pdf"),
            ContentData::Zip(_) => ContentType::new("application", "zip"),
            ContentData::Binary(_) => ContentType::new("application", "octet-stream"),
            ContentData::Text(_) => ContentType::new("text", "plain"),
            ContentData::Html(_) => ContentType::new("text", "html"),
            ContentData::Xml(_) => ContentType::new("application", "xml"),
            ContentData::Json(_) => ContentType::new("application", "json"),
            ContentData::Form(_) => ContentType::new("application", "x-www-form-urlencoded"),
            ContentData::Other { content_type, .. } => content_type.clone(),
        }
    }

    /// `form-data` disposition for this payload under `name`; file-backed
    /// payloads also carry their file name.
    pub fn content_disposition(&self, name: &str) -> ContentDisposition {
        let disposition = ContentDisposition::new("form-data").with_param("name", name);
        match self.file() {
            Some(file) => disposition.with_param("filename", file.name()),
            None => disposition,
        }
    }

    pub fn file(&self) -> Option<&FileRef> {
        match self {
            ContentData::Audio { file, .. }
            | ContentData::Image { file, .. }
            | ContentData::Video { file, .. }
            | ContentData::Pdf(file)
            | ContentData::Zip(file)
            | ContentData::Binary(file) => Some(file),
            _ => None,
        }
    }

    /// Short name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentData::Audio { .. } => "audio",
            ContentData::Image { .. } => "image",
            ContentData::Video { .. } => "video",
            ContentData::Pdf(_) => "pdf",
            ContentData::Zip(_) => "zip",
            ContentData::Binary(_) => "binary",
            ContentData::Text(_) => "text",
            ContentData::Html(_) => "html",
            ContentData::Xml(_) => "xml",
            ContentData::Json(_) => "json",
            ContentData::Form(_) => "form",
            ContentData::Other { .. } => "other",
        }
    }

    /// Turn the payload into a single-use byte stream.
    pub fn into_source(self) -> Result<Box<dyn Source>, NetError> {
        Ok(match self {
            ContentData::Audio { file, .. }
            | ContentData::Image { file, .. }
            | ContentData::Video { file, .. }
            | ContentData::Pdf(file)
            | ContentData::Zip(file)
            | ContentData::Binary(file) => Box::new(file.source()),
            ContentData::Text(s)
            | ContentData::Html(s)
            | ContentData::Xml(s)
            | ContentData::Json(s) => Box::new(BytesSource::new(s)),
            ContentData::Form(fields) => Box::new(BytesSource::new(encode_form(&fields))),
            ContentData::Other { source, .. } => source,
        })
    }

    pub fn expect_text(self) -> Result<String, NetError> {
        match self {
            ContentData::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    pub fn expect_html(self) -> Result<String, NetError> {
        match self {
            ContentData::Html(s) => Ok(s),
            other => Err(other.mismatch("html")),
        }
    }

    pub fn expect_xml(self) -> Result<String, NetError> {
        match self {
            ContentData::Xml(s) => Ok(s),
            other => Err(other.mismatch("xml")),
        }
    }

    pub fn expect_json(self) -> Result<String, NetError> {
        match self {
            ContentData::Json(s) => Ok(s),
            other => Err(other.mismatch("json")),
        }
    }

    pub fn expect_form(self) -> Result<BTreeMap<String, String>, NetError> {
        match self {
            ContentData::Form(fields) => Ok(fields),
            other => Err(other.mismatch("form")),
        }
    }

    /// The backing file of any file variant.
    pub fn expect_file(self) -> Result<FileRef, NetError> {
        match self.file() {
            Some(file) => Ok(file.clone()),
            None => Err(self.mismatch("file")),
        }
    }

    /// Deserialize a `Json` payload.
    #[cfg(feature = "json")]
    pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        match self {
            ContentData::Json(s) => Ok(serde_json::from_str(s)?),
            other => Err(other.mismatch("json")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> NetError {
        NetError::ContentMismatch {
            expected,
            found: self.kind(),
        }
    }
}

pub(crate) fn encode_form(fields: &BTreeMap<String, String>) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

pub(crate) fn decode_form(text: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(text.as_bytes())
        .into_owned()
        .collect()
}

/// One body with its own headers.
#[derive(Debug)]
pub struct Single {
    pub data: ContentData,
    pub headers: Headers,
}

impl Single {
    pub fn new(data: ContentData) -> Self {
        Self {
            data,
            headers: Headers::new(),
        }
    }

    pub fn with_headers(data: ContentData, headers: Headers) -> Self {
        Self { data, headers }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(name, value);
        self
    }
}

#[derive(Debug)]
pub enum Content {
    Empty {
        headers: Headers,
    },
    Single(Single),
    /// `multipart/mixed`
    Mix {
        parts: Vec<Single>,
        headers: Headers,
    },
    /// `multipart/form-data`, keyed by part name.
    Form {
        parts: BTreeMap<String, Single>,
        headers: Headers,
    },
}

impl Default for Content {
    fn default() -> Self {
        Content::empty()
    }
}

impl Content {
    pub fn empty() -> Self {
        Content::Empty {
            headers: Headers::new(),
        }
    }

    pub fn single(data: ContentData) -> Self {
        Content::Single(Single::new(data))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Content::single(ContentData::Text(text.into()))
    }

    pub fn mix(parts: Vec<Single>) -> Self {
        Content::Mix {
            parts,
            headers: Headers::new(),
        }
    }

    pub fn form(parts: BTreeMap<String, Single>) -> Self {
        Content::Form {
            parts,
            headers: Headers::new(),
        }
    }

    /// Serialize `value` as a JSON body.
    #[cfg(feature = "json")]
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, NetError> {
        Ok(Content::single(ContentData::Json(serde_json::to_string(
            value,
        )?)))
    }

    pub fn headers(&self) -> &Headers {
        match self {
            Content::Empty { headers }
            | Content::Mix { headers, .. }
            | Content::Form { headers, .. } => headers,
            Content::Single(single) => &single.headers,
        }
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        match self {
            Content::Empty { headers }
            | Content::Mix { headers, .. }
            | Content::Form { headers, .. } => headers,
            Content::Single(single) => &mut single.headers,
        }
    }

    /// Builder form of adding a header to the envelope.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers_mut().push(name, value);
        self
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Content::Empty { .. } => "empty",
            Content::Single(_) => "single",
            Content::Mix { .. } => "mix",
            Content::Form { .. } => "form",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Empty { .. })
    }

    pub fn expect_single(self) -> Result<Single, NetError> {
        match self {
            Content::Single(single) => Ok(single),
            other => Err(other.mismatch("single")),
        }
    }

    pub fn expect_data(self) -> Result<ContentData, NetError> {
        self.expect_single().map(|single| single.data)
    }

    pub fn expect_mix(self) -> Result<Vec<Single>, NetError> {
        match self {
            Content::Mix { parts, .. } => Ok(parts),
            other => Err(other.mismatch("mix")),
        }
    }

    pub fn expect_form(self) -> Result<BTreeMap<String, Single>, NetError> {
        match self {
            Content::Form { parts, .. } => Ok(parts),
            other => Err(other.mismatch("form")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> NetError {
        NetError::ContentMismatch {
            expected,
            found: self.kind(),
        }
    }
}
