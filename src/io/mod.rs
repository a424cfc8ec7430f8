//! Streaming I/O primitives.
//!
//! A [`Source`](source::Source) is a forward-only reader that can be
//! consumed once; a [`Surface`](surface::Surface) is a sink that produces a
//! typed value when closed. Every body codec in the crate is built from
//! these two.

pub mod folder;
pub mod source;
pub mod surface;

use crate::base::neterror::NetError;
use bytes::Bytes;
use source::Source;
use std::sync::atomic::{AtomicU32, Ordering};
use surface::{BytesSurface, StringSurface, Surface};

const BUFFER_SIZE: usize = 8 * 1024;

/// Pump `source` into `surface` until end of stream.
///
/// Returns the number of bytes moved. The surface is left open.
pub fn transfer<S>(source: &mut dyn Source, surface: &mut S) -> Result<u64, NetError>
where
    S: Surface + ?Sized,
{
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;
    while let Some(n) = source.read(&mut buf)? {
        surface.write(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}

pub fn read_to_bytes(source: &mut dyn Source) -> Result<Bytes, NetError> {
    let mut surface = BytesSurface::new();
    transfer(source, &mut surface)?;
    Box::new(surface).close()
}

pub fn read_to_string(source: &mut dyn Source) -> Result<String, NetError> {
    let mut surface = StringSurface::new();
    transfer(source, &mut surface)?;
    Box::new(surface).close()
}

/// A token unique within this process and unlikely to repeat across
/// processes: timestamp, process id and a counter.
pub(crate) fn unique_token() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    format!(
        "{:016x}{:08x}{:04x}",
        nanos as u64,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed) & 0xffff
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use source::BytesSource;

    #[test]
    fn test_transfer_counts_bytes() {
        let data = vec![7u8; BUFFER_SIZE * 2 + 3];
        let mut source = BytesSource::new(data.clone());
        let mut surface = BytesSurface::new();
        assert_eq!(transfer(&mut source, &mut surface).unwrap(), data.len() as u64);
        assert_eq!(Box::new(surface).close().unwrap(), data);
        assert!(source.is_consumed());
    }

    #[test]
    fn test_read_to_string() {
        let mut source = BytesSource::new("text body");
        assert_eq!(read_to_string(&mut source).unwrap(), "text body");
    }

    #[test]
    fn test_unique_token() {
        assert_ne!(unique_token(), unique_token());
    }
}
