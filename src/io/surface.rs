//! Write sinks that produce a typed value on close.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::io::folder::FileRef;
use bytes::{Bytes, BytesMut};
use std::fs::File;
use std::io::{BufWriter, Write};

/// A byte sink that yields `Output` once closed.
///
/// `close` takes the surface by box so that `Box<dyn Surface<Output = T>>`
/// can be finished without knowing the concrete type.
pub trait Surface: Send {
    type Output;

    fn write(&mut self, bytes: &[u8]) -> Result<(), NetError>;

    fn close(self: Box<Self>) -> Result<Self::Output, NetError>;
}

pub trait SurfaceExt: Surface + Sized {
    /// Transform the closed value.
    fn map<T, F>(self, f: F) -> Map<Self, F>
    where
        F: FnOnce(Self::Output) -> Result<T, NetError> + Send,
    {
        Map { inner: self, f }
    }
}

impl<S: Surface + Sized> SurfaceExt for S {}

pub struct Map<S, F> {
    inner: S,
    f: F,
}

impl<S, F, T> Surface for Map<S, F>
where
    S: Surface,
    F: FnOnce(S::Output) -> Result<T, NetError> + Send,
{
    type Output = T;

    fn write(&mut self, bytes: &[u8]) -> Result<(), NetError> {
        self.inner.write(bytes)
    }

    fn close(self: Box<Self>) -> Result<T, NetError> {
        let Map { inner, f } = *self;
        f(Box::new(inner).close()?)
    }
}

/// Buffers everything in memory.
#[derive(Debug, Default)]
pub struct BytesSurface {
    buf: BytesMut,
}

impl BytesSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for BytesSurface {
    type Output = Bytes;

    fn write(&mut self, bytes: &[u8]) -> Result<(), NetError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<Bytes, NetError> {
        Ok(self.buf.freeze())
    }
}

/// Buffers everything and decodes it as UTF-8 on close.
#[derive(Debug, Default)]
pub struct StringSurface {
    buf: Vec<u8>,
}

impl StringSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for StringSurface {
    type Output = String;

    fn write(&mut self, bytes: &[u8]) -> Result<(), NetError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<String, NetError> {
        String::from_utf8(self.buf).map_err(|_| NetError::InvalidUtf8)
    }
}

/// Streams into a file. The file is created on first write, or on close
/// when nothing was written.
#[derive(Debug)]
pub struct FileSurface {
    target: FileRef,
    writer: Option<BufWriter<File>>,
}

impl FileSurface {
    pub fn new(target: FileRef) -> Self {
        Self {
            target,
            writer: None,
        }
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, NetError> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                let path = self.target.path();
                BufWriter::new(File::create(path).file_context(path)?)
            }
        };
        Ok(self.writer.insert(writer))
    }
}

impl Surface for FileSurface {
    type Output = FileRef;

    fn write(&mut self, bytes: &[u8]) -> Result<(), NetError> {
        let path = self.target.path().to_path_buf();
        self.writer()?.write_all(bytes).file_context(&path)
    }

    fn close(mut self: Box<Self>) -> Result<FileRef, NetError> {
        let path = self.target.path().to_path_buf();
        self.writer()?.flush().file_context(&path)?;
        self.writer = None;
        Ok(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_surface() {
        let mut surface = StringSurface::new();
        surface.write(b"hel").unwrap();
        surface.write(b"lo").unwrap();
        assert_eq!(Box::new(surface).close().unwrap(), "hello");
    }

    #[test]
    fn test_string_surface_invalid_utf8() {
        let mut surface = StringSurface::new();
        surface.write(&[0xff, 0xfe]).unwrap();
        assert!(matches!(
            Box::new(surface).close(),
            Err(NetError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_map_surface() {
        let mut surface = BytesSurface::new().map(|bytes| Ok(bytes.len()));
        surface.write(b"abcd").unwrap();
        assert_eq!(Box::new(surface).close().unwrap(), 4);
    }

    #[test]
    fn test_file_surface_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = FileRef::new(dir.path().join("empty.bin"));
        let file = Box::new(FileSurface::new(target)).close().unwrap();
        assert!(file.exists());
        assert_eq!(file.len(), Some(0));
    }

    #[test]
    fn test_file_surface_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = FileSurface::new(FileRef::new(dir.path().join("out.txt")));
        surface.write(b"one ").unwrap();
        surface.write(b"two").unwrap();
        let file = Box::new(surface).close().unwrap();
        assert_eq!(file.read_string().unwrap(), "one two");
    }
}
