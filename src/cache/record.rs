//! Cache lifetime computed from response headers.
//!
//! ```text
//! BORN ---------------- DEATH ---------------- GONE
//!          (fresh)                (stale)
//! ```

use crate::cache::control::{delta_seconds, CacheFlag, CacheParam, ONE_YEAR};
use crate::http::date;
use crate::http::headers::{Headers, AGE, DATE, EXPIRES};
use time::{Duration, OffsetDateTime};

/// Lifetime of one cached response. `born <= death <= gone` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub born: OffsetDateTime,
    pub death: OffsetDateTime,
    pub gone: OffsetDateTime,
}

impl CacheRecord {
    /// Seconds between born and death.
    pub fn fresh_age(&self) -> i64 {
        (self.death - self.born).whole_seconds()
    }

    /// Seconds between death and gone.
    pub fn stale_age(&self) -> i64 {
        (self.gone - self.death).whole_seconds()
    }
}

/// Compute the lifetime of a response, or `None` when it must not be cached.
///
/// `now` is used as the receive time when the response has no usable `Date`
/// header. An unusable `Age` counts as zero and an unusable `Expires` as
/// already expired. Delta-seconds are capped, and a lifetime that leaves the
/// representable date range makes the response uncacheable.
pub fn cache_of(headers: &Headers, now: OffsetDateTime) -> Option<CacheRecord> {
    let control = headers.cache_control();
    let max_age = control.param(CacheParam::MaxAge);
    if control.has(CacheFlag::NoStore) || max_age == Some(0) {
        return None;
    }

    let received = match headers.get(DATE).map(date::parse) {
        Some(Ok(at)) => at,
        Some(Err(err)) => {
            tracing::debug!(error = %err, "ignoring unparsable Date header");
            now
        }
        None => now,
    };
    let age = headers.get(AGE).and_then(delta_seconds).unwrap_or(0);
    let born = shift(received, -age)?;

    if control.has(CacheFlag::NoCache) {
        let window = control
            .param(CacheParam::StaleWhileRevalidate)
            .unwrap_or(ONE_YEAR);
        return Some(CacheRecord {
            born,
            death: born,
            gone: shift(born, window)?,
        });
    }

    let expire = if control.has(CacheFlag::Immutable) {
        shift(born, ONE_YEAR)?
    } else if let Some(s) = max_age {
        shift(born, s)?
    } else {
        date::parse(headers.get(EXPIRES)?).ok()?
    };
    if expire <= received {
        return None;
    }

    let gone = if control.has(CacheFlag::MustRevalidate) {
        shift(expire, ONE_YEAR)?
    } else if let Some(s) = control.param(CacheParam::StaleWhileRevalidate) {
        shift(expire, s)?
    } else {
        expire
    };
    Some(CacheRecord {
        born,
        death: expire,
        gone,
    })
}

/// `at` moved by `seconds`, or `None` past the representable range.
fn shift(at: OffsetDateTime, seconds: i64) -> Option<OffsetDateTime> {
    let moved = at.checked_add(Duration::seconds(seconds));
    if moved.is_none() {
        tracing::debug!(%at, seconds, "cache lifetime out of range");
    }
    moved
}
