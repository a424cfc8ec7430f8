//! Forward-only, single-consumption byte readers.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use bytes::{Buf, Bytes};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// A forward-only byte reader.
///
/// `read` returns `Ok(Some(n))` with `n > 0` while data remains and
/// `Ok(None)` once at end of stream. After end of stream has been reported
/// the source is consumed, and any further `read` fails with
/// [`NetError::SourceConsumed`].
pub trait Source: fmt::Debug + Send + Sync {
    fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, NetError>;

    fn is_consumed(&self) -> bool;

    /// Total length in bytes, when known up front.
    fn length(&self) -> Option<u64>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, NetError> {
        (**self).read(buf)
    }

    fn is_consumed(&self) -> bool {
        (**self).is_consumed()
    }

    fn length(&self) -> Option<u64> {
        (**self).length()
    }
}

/// In-memory source.
#[derive(Debug, Clone)]
pub struct BytesSource {
    data: Bytes,
    len: u64,
    consumed: bool,
}

impl BytesSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            len: data.len() as u64,
            data,
            consumed: false,
        }
    }
}

impl Source for BytesSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, NetError> {
        if self.consumed {
            return Err(NetError::SourceConsumed);
        }
        if self.data.is_empty() {
            self.consumed = true;
            return Ok(None);
        }
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data.advance(n);
        Ok(Some(n))
    }

    fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn length(&self) -> Option<u64> {
        Some(self.len)
    }
}

/// Source over a file on disk. The file is opened on first read.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    file: Option<File>,
    len: Option<u64>,
    consumed: bool,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let len = std::fs::metadata(&path).ok().map(|m| m.len());
        Self {
            path,
            file: None,
            len,
            consumed: false,
        }
    }
}

impl Source for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, NetError> {
        if self.consumed {
            return Err(NetError::SourceConsumed);
        }
        if self.file.is_none() {
            self.file = Some(File::open(&self.path).file_context(&self.path)?);
        }
        let Some(file) = self.file.as_mut() else {
            return Err(NetError::SourceConsumed);
        };
        loop {
            match file.read(buf) {
                Ok(0) if !buf.is_empty() => {
                    self.consumed = true;
                    self.file = None;
                    return Ok(None);
                }
                Ok(n) => return Ok(Some(n)),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(NetError::file_io(&self.path, e)),
            }
        }
    }

    fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn length(&self) -> Option<u64> {
        self.len
    }
}
