//! Cookie storage.

use crate::base::clock::{Clock, SystemClock};
use crate::base::neterror::NetError;
use crate::cookies::cookie::HttpCookie;
use crate::cookies::persistence;
use crate::http::url::HttpUrl;
use crate::io::folder::FileRef;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Stores cookies between requests.
pub trait CookieManager: Send + Sync {
    /// Store `cookies`, replacing any with the same name, domain and path.
    fn set(&self, cookies: Vec<HttpCookie>) -> Result<(), NetError>;

    /// Every unexpired cookie accepted by `filter`.
    fn get(&self, filter: &dyn Fn(&HttpCookie) -> bool) -> Result<Vec<HttpCookie>, NetError>;

    fn remove(&self, filter: &dyn Fn(&HttpCookie) -> bool) -> Result<(), NetError>;

    /// Forget every cookie, including the persisted ones.
    fn clear(&self) -> Result<(), NetError>;

    /// Drop expired cookies.
    fn purge(&self) -> Result<(), NetError>;

    /// Cookies to send with a request to `url`.
    fn for_url(&self, url: &HttpUrl) -> Result<Vec<HttpCookie>, NetError> {
        self.get(&|cookie| cookie.is_applicable(url))
    }
}

impl<M: CookieManager + ?Sized> CookieManager for Arc<M> {
    fn set(&self, cookies: Vec<HttpCookie>) -> Result<(), NetError> {
        (**self).set(cookies)
    }

    fn get(&self, filter: &dyn Fn(&HttpCookie) -> bool) -> Result<Vec<HttpCookie>, NetError> {
        (**self).get(filter)
    }

    fn remove(&self, filter: &dyn Fn(&HttpCookie) -> bool) -> Result<(), NetError> {
        (**self).remove(filter)
    }

    fn clear(&self) -> Result<(), NetError> {
        (**self).clear()
    }

    fn purge(&self) -> Result<(), NetError> {
        (**self).purge()
    }
}

/// [`CookieManager`] backed by one file.
///
/// The file is read on first use. Every mutation rewrites it with the
/// permanent, unexpired cookies; session cookies stay in memory only. The
/// file is deleted when nothing is left to persist.
#[derive(Debug)]
pub struct CookieJar {
    file: FileRef,
    clock: Arc<dyn Clock>,
    cookies: Mutex<Option<Vec<HttpCookie>>>,
}

impl CookieJar {
    pub fn new(file: FileRef) -> Self {
        Self::with_clock(file, Arc::new(SystemClock))
    }

    pub fn with_clock(file: FileRef, clock: Arc<dyn Clock>) -> Self {
        Self {
            file,
            clock,
            cookies: Mutex::new(None),
        }
    }

    pub fn file(&self) -> &FileRef {
        &self.file
    }

    /// Lock the cookie set, loading it from disk the first time.
    fn lock(&self) -> Result<MutexGuard<'_, Option<Vec<HttpCookie>>>, NetError> {
        let mut guard = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            let loaded = match self.file.read_string_if_exists()? {
                Some(text) => persistence::decode(&text),
                None => Vec::new(),
            };
            tracing::debug!(path = %self.file.path().display(), count = loaded.len(), "loaded cookies");
            *guard = Some(loaded);
        }
        Ok(guard)
    }

    fn save(&self, cookies: &[HttpCookie]) -> Result<(), NetError> {
        let now = self.clock.now();
        let savable: Vec<&HttpCookie> = cookies.iter().filter(|c| c.is_savable(now)).collect();
        if savable.is_empty() {
            return self.file.delete();
        }
        tracing::debug!(path = %self.file.path().display(), count = savable.len(), "saving cookies");
        self.file.write(persistence::encode(savable))
    }
}

impl CookieManager for CookieJar {
    fn set(&self, cookies: Vec<HttpCookie>) -> Result<(), NetError> {
        let mut guard = self.lock()?;
        let current = guard.get_or_insert_with(Vec::new);
        for cookie in cookies {
            current.retain(|c| !c.same_identity(&cookie));
            current.push(cookie);
        }
        self.save(current)
    }

    fn get(&self, filter: &dyn Fn(&HttpCookie) -> bool) -> Result<Vec<HttpCookie>, NetError> {
        let now = self.clock.now();
        let guard = self.lock()?;
        Ok(guard
            .iter()
            .flatten()
            .filter(|c| !c.is_expired(now) && filter(*c))
            .cloned()
            .collect())
    }

    fn remove(&self, filter: &dyn Fn(&HttpCookie) -> bool) -> Result<(), NetError> {
        let mut guard = self.lock()?;
        let current = guard.get_or_insert_with(Vec::new);
        current.retain(|c| !filter(c));
        self.save(current)
    }

    fn clear(&self) -> Result<(), NetError> {
        let mut guard = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Vec::new());
        self.file.delete()
    }

    fn purge(&self) -> Result<(), NetError> {
        let now = self.clock.now();
        let mut guard = self.lock()?;
        let current = guard.get_or_insert_with(Vec::new);
        current.retain(|c| !c.is_expired(now));
        self.save(current)
    }
}
