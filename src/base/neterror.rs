use crate::http::content::Content;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    // Malformed Input
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(&'static str),
    #[error("Multipart content type has no boundary")]
    MissingBoundary,
    #[error("Multipart form part has no name")]
    MissingPartName,
    #[error("Body is not valid UTF-8")]
    InvalidUtf8,

    // Content Dispatch
    #[error("Content mismatch: expected {expected}, found {found}")]
    ContentMismatch {
        expected: &'static str,
        found: &'static str,
    },

    // Transport and Environment
    #[error("Disallowed URL scheme: {0}")]
    DisallowedUrlScheme(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("No mock registered for {method} {url}")]
    NotMocked { method: String, url: String },
    #[error("Source already consumed")]
    SourceConsumed,
    #[error("Blocking task failed: {0}")]
    BlockingTaskFailed(String),
    #[error("IO error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Protocol outcome raised by `launch_or_throw`
    #[error("HTTP status {code}")]
    HttpStatus { code: u16, content: Box<Content> },

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetError {
    /// Create an IO error annotated with the file it happened on.
    pub fn file_io(path: &Path, source: io::Error) -> Self {
        NetError::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for faults raised by the environment rather than by bad input.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NetError::DisallowedUrlScheme(_)
                | NetError::ConnectionFailed(_)
                | NetError::NotMocked { .. }
                | NetError::SourceConsumed
                | NetError::BlockingTaskFailed(_)
                | NetError::FileIo { .. }
        )
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionFailed(_) => -104,
            NetError::FileIo { .. } => -15,
            NetError::SourceConsumed => -16,

            NetError::InvalidUrl(_) => -300,
            NetError::DisallowedUrlScheme(_) => -301,
            NetError::InvalidHeader(_) => -320,
            NetError::ContentMismatch { .. } => -330,
            NetError::InvalidMultipart(_) => -331,
            NetError::MissingBoundary => -332,
            NetError::MissingPartName => -333,
            NetError::InvalidUtf8 => -340,

            // Crate specific codes start at -1000
            NetError::InvalidDate(_) => -1000,
            NetError::NotMocked { .. } => -1001,
            NetError::HttpStatus { .. } => -1002,
            #[cfg(feature = "json")]
            NetError::Json(_) => -1003,
            NetError::BlockingTaskFailed(_) => -1004,
        }
    }
}
