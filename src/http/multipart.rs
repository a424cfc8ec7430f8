//! Streaming multipart codec.
//!
//! [`MultipartSource`] lazily encodes a list of parts as a
//! `multipart/*` body. [`MultipartSurface`] decodes one incrementally from
//! writes of any size, including writes that split a boundary marker.
//!
//! # Example
//! ```ignore
//! use contentnet::http::multipart::{generate_boundary, MultipartSource, MultipartSurface};
//!
//! let boundary = generate_boundary();
//! let mut body = MultipartSource::from_singles(&boundary, parts)?;
//!
//! let mut surface = MultipartSurface::new(&boundary, folder);
//! contentnet::io::transfer(&mut body, &mut surface)?;
//! let decoded = Box::new(surface).close()?;
//! ```

use crate::base::neterror::NetError;
use crate::http::content::Single;
use crate::http::dispatch::{surface_for, DataSurface};
use crate::http::headers::Headers;
use crate::http::mime::ContentType;
use crate::io::folder::Folder;
use crate::io::source::Source;
use crate::io::surface::Surface;
use crate::io::unique_token;
use bytes::{Buf, Bytes};
use std::collections::VecDeque;

const LINE: &[u8] = b"\r\n";
const HEADERS_END: &[u8] = b"\r\n\r\n";
const TERMINATOR: &[u8] = b"--";

/// Generate a fresh boundary token.
pub fn generate_boundary() -> String {
    format!("----contentnet-boundary-{}", unique_token())
}

#[derive(Debug)]
enum Segment {
    Bytes(Bytes),
    Body(Box<dyn Source>),
}

/// Encodes parts as a multipart body, reading each part body exactly once
/// and only when the encoded stream reaches it.
#[derive(Debug)]
pub struct MultipartSource {
    segments: VecDeque<Segment>,
    length: Option<u64>,
    consumed: bool,
}

impl MultipartSource {
    pub fn new(boundary: &str, parts: Vec<(Headers, Box<dyn Source>)>) -> Self {
        let mut segments = VecDeque::with_capacity(parts.len() * 3 + 1);
        let mut length = Some(0u64);

        for (headers, body) in parts {
            let mut head = format!("--{}\r\n", boundary);
            for (name, value) in headers.iter() {
                head.push_str(&format!("{}: {}\r\n", name, value));
            }
            head.push_str("\r\n");

            length = match (length, body.length()) {
                (Some(total), Some(body_len)) => {
                    Some(total + head.len() as u64 + body_len + LINE.len() as u64)
                }
                _ => None,
            };
            segments.push_back(Segment::Bytes(Bytes::from(head)));
            segments.push_back(Segment::Body(body));
            segments.push_back(Segment::Bytes(Bytes::from_static(LINE)));
        }

        let tail = format!("--{}--", boundary);
        length = length.map(|total| total + tail.len() as u64);
        segments.push_back(Segment::Bytes(Bytes::from(tail)));

        Self {
            segments,
            length,
            consumed: false,
        }
    }

    /// Encode ready-made parts, using each part's own headers verbatim.
    pub fn from_singles(boundary: &str, parts: Vec<Single>) -> Result<Self, NetError> {
        let parts = parts
            .into_iter()
            .map(|part| Ok((part.headers, part.data.into_source()?)))
            .collect::<Result<Vec<_>, NetError>>()?;
        Ok(Self::new(boundary, parts))
    }
}

impl Source for MultipartSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, NetError> {
        if self.consumed {
            return Err(NetError::SourceConsumed);
        }
        loop {
            match self.segments.front_mut() {
                None => {
                    self.consumed = true;
                    return Ok(None);
                }
                Some(Segment::Bytes(bytes)) => {
                    if bytes.is_empty() {
                        self.segments.pop_front();
                        continue;
                    }
                    let n = buf.len().min(bytes.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    bytes.advance(n);
                    return Ok(Some(n));
                }
                Some(Segment::Body(body)) => match body.read(buf)? {
                    Some(n) => return Ok(Some(n)),
                    None => {
                        self.segments.pop_front();
                    }
                },
            }
        }
    }

    fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn length(&self) -> Option<u64> {
        self.length
    }
}

/// Outcome of looking for a byte pattern in a partially received buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    Found(usize),
    /// The bytes needed to decide are present and do not match.
    NotFound,
    /// The buffer ends before a decision can be made.
    NeedMoreData,
}

/// First occurrence of `needle` at or after `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Search {
    if from > haystack.len() {
        return Search::NeedMoreData;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map_or(Search::NeedMoreData, |i| Search::Found(from + i))
}

/// Whether `needle` sits exactly at `at`.
fn match_at(haystack: &[u8], needle: &[u8], at: usize) -> Search {
    match haystack.get(at..at + needle.len()) {
        None => Search::NeedMoreData,
        Some(slice) if slice == needle => Search::Found(at),
        Some(_) => Search::NotFound,
    }
}

enum PartStart {
    /// A part was opened; its body starts at this offset.
    Opened(usize),
    Terminated,
    NeedMoreData,
}

struct OpenPart {
    headers: Headers,
    body: DataSurface,
}

/// Incremental multipart decoder producing the list of parts on close.
///
/// A part that is still open when the surface closes (no closing boundary
/// was ever seen) is dropped; detecting a truncated body is left to the
/// transport.
pub struct MultipartSurface {
    boundary_start: Vec<u8>,
    boundary_end: Vec<u8>,
    folder: Folder,
    pending: Vec<u8>,
    current: Option<OpenPart>,
    result: Vec<Single>,
    finished: bool,
}

impl MultipartSurface {
    pub fn new(boundary: &str, folder: Folder) -> Self {
        Self {
            boundary_start: format!("--{}", boundary).into_bytes(),
            boundary_end: format!("\r\n--{}", boundary).into_bytes(),
            folder,
            pending: Vec::new(),
            current: None,
            result: Vec::new(),
            finished: false,
        }
    }

    fn open_part(&mut self, buf: &[u8]) -> Result<PartStart, NetError> {
        let start = match find(buf, &self.boundary_start, 0) {
            Search::Found(i) => i + self.boundary_start.len(),
            _ => return Ok(PartStart::NeedMoreData),
        };
        match match_at(buf, TERMINATOR, start) {
            Search::Found(_) => return Ok(PartStart::Terminated),
            Search::NeedMoreData => return Ok(PartStart::NeedMoreData),
            Search::NotFound => {}
        }
        // Anything after the marker up to the line break is padding.
        let headers_start = match find(buf, LINE, start) {
            Search::Found(i) => i + LINE.len(),
            _ => return Ok(PartStart::NeedMoreData),
        };
        // Searching from the line break that ends the marker line lets an
        // empty header block show up as a separator right after it.
        let headers_end = match find(buf, HEADERS_END, headers_start - LINE.len()) {
            Search::Found(i) => i,
            _ => return Ok(PartStart::NeedMoreData),
        };

        let headers = if headers_end < headers_start {
            Headers::new()
        } else {
            Headers::parse_lines(&String::from_utf8_lossy(&buf[headers_start..headers_end]))
        };
        if headers.is_empty() {
            return Err(NetError::InvalidMultipart("part without headers"));
        }

        let content_type = headers
            .content_type()?
            .unwrap_or_else(|| ContentType::new("text", "plain"));
        let body = surface_for(&content_type, &self.folder)?;
        self.current = Some(OpenPart { headers, body });
        Ok(PartStart::Opened(headers_end + HEADERS_END.len()))
    }
}

impl Surface for MultipartSurface {
    type Output = Vec<Single>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), NetError> {
        if self.finished {
            return Ok(());
        }
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(bytes);
        let mut offset = 0;

        loop {
            let rest = &buf[offset..];
            match self.current.as_mut() {
                None => match self.open_part(rest)? {
                    PartStart::Opened(body_start) => offset += body_start,
                    PartStart::Terminated => {
                        self.finished = true;
                        return Ok(());
                    }
                    PartStart::NeedMoreData => {
                        self.pending = rest.to_vec();
                        return Ok(());
                    }
                },
                Some(part) => match find(rest, &self.boundary_end, 0) {
                    Search::Found(end) => {
                        part.body.write(&rest[..end])?;
                        if let Some(OpenPart { headers, body }) = self.current.take() {
                            self.result.push(Single::with_headers(body.close()?, headers));
                        }
                        // Keep the leading "--boundary" for the next part.
                        offset += end + LINE.len();
                    }
                    Search::NotFound | Search::NeedMoreData => {
                        // A marker may straddle this write; hold back enough
                        // bytes to see it whole next time.
                        let withhold = self.boundary_end.len();
                        if rest.len() > withhold {
                            let cut = rest.len() - withhold;
                            part.body.write(&rest[..cut])?;
                            self.pending = rest[cut..].to_vec();
                        } else {
                            self.pending = rest.to_vec();
                        }
                        return Ok(());
                    }
                },
            }
        }
    }

    fn close(self: Box<Self>) -> Result<Vec<Single>, NetError> {
        if let Some(part) = &self.current {
            tracing::debug!(
                headers = part.headers.len(),
                "dropping unterminated multipart part"
            );
        }
        Ok(self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::content::ContentData;
    use crate::io::source::BytesSource;
    use crate::io::{read_to_bytes, read_to_string};

    fn text_part(text: &str, headers: &[(&str, &str)]) -> Single {
        Single::with_headers(
            ContentData::Text(text.to_string()),
            headers.iter().copied().collect(),
        )
    }

    fn decode_chunked(boundary: &str, body: &[u8], chunk: usize, folder: &Folder) -> Vec<Single> {
        let mut surface = MultipartSurface::new(boundary, folder.clone());
        for piece in body.chunks(chunk) {
            surface.write(piece).unwrap();
        }
        Box::new(surface).close().unwrap()
    }

    #[test]
    fn test_find_and_match_at() {
        assert_eq!(find(b"abc--b", b"--b", 0), Search::Found(3));
        assert_eq!(find(b"abc--", b"--b", 0), Search::NeedMoreData);
        assert_eq!(find(b"ab", b"--b", 5), Search::NeedMoreData);
        assert_eq!(match_at(b"x--", b"--", 1), Search::Found(1));
        assert_eq!(match_at(b"x-", b"--", 1), Search::NeedMoreData);
        assert_eq!(match_at(b"x\r\n", b"--", 1), Search::NotFound);
    }

    #[test]
    fn test_encode_layout() {
        let parts = vec![text_part("hello", &[("A", "1")]), text_part("", &[("B", "2")])];
        let mut source = MultipartSource::from_singles("XYZ", parts).unwrap();
        let expected = "--XYZ\r\nA: 1\r\n\r\nhello\r\n--XYZ\r\nB: 2\r\n\r\n\r\n--XYZ--";
        assert_eq!(source.length(), Some(expected.len() as u64));
        assert_eq!(read_to_string(&mut source).unwrap(), expected);
        assert!(source.is_consumed());
    }

    #[derive(Debug)]
    struct Unsized(BytesSource);

    impl Source for Unsized {
        fn read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, NetError> {
            self.0.read(buf)
        }
        fn is_consumed(&self) -> bool {
            self.0.is_consumed()
        }
        fn length(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn test_encode_unknown_length() {
        let parts: Vec<(Headers, Box<dyn Source>)> = vec![
            (Headers::new().with("A", "1"), Box::new(BytesSource::new("x"))),
            (Headers::new().with("B", "2"), Box::new(Unsized(BytesSource::new("y")))),
        ];
        let mut source = MultipartSource::new("b", parts);
        assert_eq!(source.length(), None);
        assert!(read_to_bytes(&mut source).unwrap().ends_with(b"--b--"));
    }

    #[test]
    fn test_encode_rejects_second_read() {
        let mut source = MultipartSource::new("b", Vec::new());
        assert_eq!(read_to_string(&mut source).unwrap(), "--b--");
        let mut buf = [0u8; 8];
        assert!(matches!(source.read(&mut buf), Err(NetError::SourceConsumed)));
    }

    #[test]
    fn test_roundtrip_every_chunk_size() {
        let dir = tempfile::tempdir().unwrap();
        let folder = Folder::new(dir.path());
        let boundary = "q1w2e3r4t5";
        let make = || {
            vec![
                text_part("first body\r\nwith lines", &[("Content-Disposition", "form-data; name=\"a\"")]),
                Single::with_headers(
                    ContentData::Json("{\"k\":1}".into()),
                    Headers::new().with("Content-Type", "application/json"),
                ),
            ]
        };
        let encoded =
            read_to_bytes(&mut MultipartSource::from_singles(boundary, make()).unwrap()).unwrap();

        for chunk in 1..=encoded.len() + 1 {
            let parts = decode_chunked(boundary, &encoded, chunk, &folder);
            assert_eq!(parts.len(), 2, "chunk size {}", chunk);
            let expected = make();
            assert_eq!(parts[0].headers, expected[0].headers);
            assert_eq!(parts[1].headers, expected[1].headers);
            match &parts[0].data {
                ContentData::Text(s) => assert_eq!(s, "first body\r\nwith lines"),
                other => panic!("unexpected {:?}", other),
            }
            match &parts[1].data {
                ContentData::Json(s) => assert_eq!(s, "{\"k\":1}"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_no_headers_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = MultipartSurface::new("b", Folder::new(dir.path()));
        let err = surface.write(b"--b\r\n\r\n\r\nbody\r\n--b--").unwrap_err();
        assert!(matches!(err, NetError::InvalidMultipart(_)));
    }

    #[test]
    fn test_data_after_terminator_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = MultipartSurface::new("b", Folder::new(dir.path()));
        surface.write(b"--b\r\nA: 1\r\n\r\nx\r\n--b--\r\n").unwrap();
        surface.write(b"--b\r\nB: 2\r\n\r\ny\r\n--b--").unwrap();
        let parts = Box::new(surface).close().unwrap();
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_unterminated_part_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = MultipartSurface::new("b", Folder::new(dir.path()));
        surface.write(b"--b\r\nA: 1\r\n\r\nfirst\r\n--b\r\nA: 2\r\n\r\nsecond, cut").unwrap();
        let parts = Box::new(surface).close().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].headers.get("A"), Some("1"));
    }

    #[test]
    fn test_generate_boundary() {
        let a = generate_boundary();
        assert!(a.starts_with("----contentnet-boundary-"));
        assert_ne!(a, generate_boundary());
    }
}
