//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `NetError` variants.

use crate::base::neterror::NetError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add file context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use contentnet::base::context::IoResultExt;
    ///
    /// let bytes = std::fs::read(&path).file_context(&path)?;
    /// // Error: "IO error on /tmp/x.info: No such file or directory"
    /// ```
    fn file_context(self, path: &Path) -> Result<T, NetError>;

    /// Like [`file_context`](Self::file_context), but a missing file is `None`.
    fn optional_file(self, path: &Path) -> Result<Option<T>, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn file_context(self, path: &Path) -> Result<T, NetError> {
        self.map_err(|e| NetError::file_io(path, e))
    }

    fn optional_file(self, path: &Path) -> Result<Option<T>, NetError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NetError::file_io(path, e)),
        }
    }
}
