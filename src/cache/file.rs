//! On-disk projection of one cached response.
//!
//! Every entry is three files sharing a stem derived from the request URL:
//! - `<hash>.info`: lifetime and status code as `key: value` lines
//! - `<hash>.info.h`: response header lines
//! - `<hash>.info.b`: response body
//!
//! A missing `.info` means "not cached", so it is always written last.

use crate::base::clock::{epoch_millis, from_epoch_millis};
use crate::base::neterror::NetError;
use crate::cache::record::CacheRecord;
use crate::http::headers::Headers;
use crate::io::folder::{FileRef, Folder};
use crate::io::source::Source;
use crate::io::surface::{FileSurface, Surface};
use crate::io::transfer;
use crate::transport::TransportResponse;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

const EXTENSION: &str = "info";
const BORN: &str = "cache.born";
const DEATH: &str = "cache.death";
const GONE: &str = "cache.gone";
const RESPONSE: &str = "cache.response";

/// Lifetime and status code as stored in the info file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Info {
    record: CacheRecord,
    code: u16,
}

#[derive(Debug, Clone)]
pub struct CacheFile {
    info: FileRef,
    headers: FileRef,
    body: FileRef,
}

impl CacheFile {
    /// Entry for `url`; the query string is part of the key.
    pub fn new(folder: &Folder, url: &str) -> Self {
        let key = hex::encode(Sha256::digest(url.as_bytes()));
        Self::from_info(folder.file(&format!("{}.{}", key, EXTENSION)))
    }

    fn from_info(info: FileRef) -> Self {
        let headers = FileRef::new(info.path().with_extension(format!("{}.h", EXTENSION)));
        let body = FileRef::new(info.path().with_extension(format!("{}.b", EXTENSION)));
        Self {
            info,
            headers,
            body,
        }
    }

    /// Every entry stored in `folder`.
    pub fn all(folder: &Folder) -> Result<Vec<CacheFile>, NetError> {
        Ok(folder
            .files_with_extension(EXTENSION)?
            .into_iter()
            .map(Self::from_info)
            .collect())
    }

    pub fn exists(&self) -> bool {
        self.info.exists()
    }

    pub fn clear(&self) -> Result<(), NetError> {
        self.info.delete()?;
        self.headers.delete()?;
        self.body.delete()
    }

    /// Persist `response` under `record`. Consumes the response body.
    pub fn save(&self, record: &CacheRecord, response: &mut TransportResponse) -> Result<(), NetError> {
        if let Some(mut body) = response.body.take() {
            if let Some(parent) = self.body.path().parent() {
                Folder::new(parent).create()?;
            }
            let mut surface = Box::new(FileSurface::new(self.body.clone()));
            transfer(body.as_mut(), surface.as_mut())?;
            surface.close()?;
        }

        if !response.headers.is_empty() {
            self.headers.write(response.headers.to_lines())?;
        }

        let info = Headers::new()
            .with(BORN, epoch_millis(record.born).to_string())
            .with(DEATH, epoch_millis(record.death).to_string())
            .with(GONE, epoch_millis(record.gone).to_string())
            .with(RESPONSE, response.code.to_string());
        self.info.write(info.to_lines())
    }

    /// Read the stored response back. The status defaults to 200 when the
    /// info file is unreadable.
    pub fn load(&self, from_cache: bool) -> Result<TransportResponse, NetError> {
        let code = self.read_info()?.map(|i| i.code).unwrap_or(200);
        let headers = self
            .headers
            .read_string_if_exists()?
            .map(|text| Headers::parse_lines(&text))
            .unwrap_or_default();
        let body = self
            .body
            .exists()
            .then(|| Box::new(self.body.source()) as Box<dyn Source>);

        let mut response = TransportResponse::new(code, headers, body);
        response.from_cache = from_cache;
        Ok(response)
    }

    /// `now` in `[born, death)` and within the optional request limits.
    ///
    /// The fresh, stale and gone windows are half-open, so every instant
    /// falls in exactly one of them: at `death` an entry is stale and at
    /// `gone` it is gone.
    pub fn is_fresh(
        &self,
        now: OffsetDateTime,
        max_age: Option<i64>,
        min_fresh: Option<i64>,
    ) -> Result<bool, NetError> {
        let Some(Info { record, .. }) = self.read_info()? else {
            return Ok(false);
        };
        Ok(record.born <= now
            && now < record.death
            && max_age.map_or(true, |s| now - record.born <= Duration::seconds(s))
            && min_fresh.map_or(true, |s| record.death - now >= Duration::seconds(s)))
    }

    /// `now` in `[death, gone)` and within the optional staleness limit.
    pub fn is_stale(&self, now: OffsetDateTime, max_stale: Option<i64>) -> Result<bool, NetError> {
        let Some(Info { record, .. }) = self.read_info()? else {
            return Ok(false);
        };
        Ok(record.death <= now
            && now < record.gone
            && max_stale.map_or(true, |s| now - record.death <= Duration::seconds(s)))
    }

    /// `now` outside `[born, gone)`. A missing entry is not gone.
    pub fn is_gone(&self, now: OffsetDateTime) -> Result<bool, NetError> {
        let Some(Info { record, .. }) = self.read_info()? else {
            return Ok(false);
        };
        Ok(now < record.born || now >= record.gone)
    }

    fn read_info(&self) -> Result<Option<Info>, NetError> {
        let Some(text) = self.info.read_string_if_exists()? else {
            return Ok(None);
        };
        let lines = Headers::parse_lines(&text);
        let millis = |key: &str| lines.get(key).and_then(|v| v.trim().parse::<i64>().ok());

        let (Some(born), Some(death), Some(gone), Some(code)) = (
            millis(BORN),
            millis(DEATH),
            millis(GONE),
            lines.get(RESPONSE).and_then(|v| v.trim().parse::<u16>().ok()),
        ) else {
            tracing::warn!(path = %self.info.path().display(), "unreadable cache info");
            return Ok(None);
        };

        Ok(Some(Info {
            record: CacheRecord {
                born: from_epoch_millis(born)?,
                death: from_epoch_millis(death)?,
                gone: from_epoch_millis(gone)?,
            },
            code,
        }))
    }
}
