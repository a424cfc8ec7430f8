//! Cache-or-execute wrapper around a transport.

use crate::base::blocking::run_blocking;
use crate::base::clock::{Clock, SystemClock};
use crate::base::neterror::NetError;
use crate::cache::control::{CacheFlag, CacheParam};
use crate::cache::file::CacheFile;
use crate::cache::record::cache_of;
use crate::http::headers::Headers;
use crate::io::folder::Folder;
use crate::transport::{Launching, Transport, TransportRequest, TransportResponse};
use http::Method;
use std::sync::Arc;

/// Serves requests from a cache where allowed, otherwise executes them and
/// stores cacheable results.
pub trait CacheManager: Send + Sync {
    fn get_or_put<'a>(&'a self, request: TransportRequest, transport: &'a dyn Transport) -> Launching<'a>;

    /// Delete every stored entry.
    fn clear(&self) -> Result<(), NetError>;

    /// Delete the entries that are past their lifetime.
    fn purge(&self) -> Result<(), NetError>;
}

impl<M: CacheManager + ?Sized> CacheManager for Arc<M> {
    fn get_or_put<'a>(&'a self, request: TransportRequest, transport: &'a dyn Transport) -> Launching<'a> {
        (**self).get_or_put(request, transport)
    }

    fn clear(&self) -> Result<(), NetError> {
        (**self).clear()
    }

    fn purge(&self) -> Result<(), NetError> {
        (**self).purge()
    }
}

/// [`CacheManager`] storing entries as [`CacheFile`]s in one folder.
///
/// Disk access during [`get_or_put`](CacheManager::get_or_put) runs on the
/// blocking pool; `clear` and `purge` run on the calling thread.
#[derive(Debug, Clone)]
pub struct DiskCacheManager {
    folder: Folder,
    clock: Arc<dyn Clock>,
}

impl DiskCacheManager {
    pub fn new(folder: Folder) -> Self {
        Self::with_clock(folder, Arc::new(SystemClock))
    }

    pub fn with_clock(folder: Folder, clock: Arc<dyn Clock>) -> Self {
        Self { folder, clock }
    }

    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    /// Cached answer for `request`, if the request allows one.
    fn lookup(&self, request: &TransportRequest) -> Result<Option<TransportResponse>, NetError> {
        let control = request.headers.cache_control();
        if control.has(CacheFlag::NoStore) || control.has(CacheFlag::NoCache) {
            return Ok(None);
        }

        let now = self.clock.now();
        let file = CacheFile::new(&self.folder, &request.url);
        let max_age = control.param(CacheParam::MaxAge);
        let min_fresh = control.param(CacheParam::MinFresh);
        if file.is_fresh(now, max_age, min_fresh)? {
            tracing::debug!(url = %request.url, "cache hit");
            return file.load(true).map(Some);
        }

        if file.is_gone(now)? {
            tracing::debug!(url = %request.url, "dropping expired cache entry");
            file.clear()?;
        }

        if control.has(CacheFlag::OnlyIfCached) {
            tracing::debug!(url = %request.url, "only-if-cached without a fresh entry");
            return Ok(Some(TransportResponse::new(504, Headers::new(), None)));
        }
        Ok(None)
    }

    fn store(
        &self,
        method: &Method,
        url: &str,
        mut response: TransportResponse,
    ) -> Result<TransportResponse, NetError> {
        if *method != Method::GET || !response.is_successful() {
            return Ok(response);
        }

        let file = CacheFile::new(&self.folder, url);
        if file.exists() {
            file.clear()?;
        }

        let Some(record) = cache_of(&response.headers, self.clock.now()) else {
            tracing::debug!(url = %url, "response is not cacheable");
            return Ok(response);
        };
        file.save(&record, &mut response)?;
        tracing::debug!(
            url = %url,
            fresh = record.fresh_age(),
            stale = record.stale_age(),
            "stored response in cache"
        );
        file.load(false)
    }
}

impl CacheManager for DiskCacheManager {
    fn get_or_put<'a>(&'a self, request: TransportRequest, transport: &'a dyn Transport) -> Launching<'a> {
        Box::pin(async move {
            let this = self.clone();
            let (request, cached) = run_blocking(move || {
                let cached = this.lookup(&request)?;
                Ok((request, cached))
            })
            .await?;
            if let Some(cached) = cached {
                return Ok(cached);
            }

            tracing::debug!(url = %request.url, "cache miss");
            let method = request.method.clone();
            let url = request.url.clone();
            let response = transport.launch(request).await?;
            let this = self.clone();
            run_blocking(move || this.store(&method, &url, response)).await
        })
    }

    fn clear(&self) -> Result<(), NetError> {
        self.folder.delete()
    }

    fn purge(&self) -> Result<(), NetError> {
        let now = self.clock.now();
        let mut purged = 0usize;
        for file in CacheFile::all(&self.folder)? {
            if file.is_gone(now)? {
                file.clear()?;
                purged += 1;
            }
        }
        tracing::debug!(purged, "purged cache");
        Ok(())
    }
}
