//! `Cache-Control` directive parsing.

use std::collections::{HashMap, HashSet};

/// Seconds in the one-year horizon used for open-ended lifetimes.
pub const ONE_YEAR: i64 = 31_536_000;

/// Largest delta-seconds value kept; bigger values are capped to it
/// (RFC 7234 section 1.2.1).
pub const MAX_DELTA_SECONDS: i64 = 2_147_483_648;

/// Parse a delta-seconds value, clamped to `0..=MAX_DELTA_SECONDS`.
///
/// Digit strings too long for an `i64` are capped rather than rejected.
pub fn delta_seconds(value: &str) -> Option<i64> {
    let value = value.trim();
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match value.parse::<i64>() {
        Ok(s) => Some(s.clamp(0, MAX_DELTA_SECONDS)),
        Err(_) if value.starts_with('-') => Some(0),
        Err(_) => Some(MAX_DELTA_SECONDS),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheParam {
    MaxAge,
    MaxStale,
    MinFresh,
    StaleWhileRevalidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheFlag {
    NoStore,
    NoCache,
    OnlyIfCached,
    MustRevalidate,
    Immutable,
}

/// Directives of one or more `Cache-Control` header values.
///
/// `s-maxage` (also spelled `s-max-age`) overrides `max-age` regardless of
/// order. `proxy-revalidate` is folded into `must-revalidate`. Unknown
/// directives and unparsable values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    params: HashMap<CacheParam, i64>,
    flags: HashSet<CacheFlag>,
}

impl CacheControl {
    pub fn parse<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut control = CacheControl::default();
        let mut shared_max_age = None;

        for directive in values.into_iter().flat_map(|v| v.split(',')) {
            let directive = directive.trim();
            if directive.is_empty() {
                continue;
            }
            let (name, value) = match directive.split_once('=') {
                Some((n, v)) => (n.trim(), Some(v.trim().trim_matches('"'))),
                None => (directive, None),
            };
            let seconds = value.and_then(delta_seconds);

            match name.to_ascii_lowercase().as_str() {
                "no-store" => control.set(CacheFlag::NoStore),
                "no-cache" => control.set(CacheFlag::NoCache),
                "only-if-cached" => control.set(CacheFlag::OnlyIfCached),
                "must-revalidate" | "proxy-revalidate" => control.set(CacheFlag::MustRevalidate),
                "immutable" => control.set(CacheFlag::Immutable),
                "max-age" => {
                    if let Some(s) = seconds {
                        control.params.entry(CacheParam::MaxAge).or_insert(s);
                    }
                }
                "s-maxage" | "s-max-age" => {
                    if seconds.is_some() {
                        shared_max_age = seconds;
                    }
                }
                // A bare max-stale accepts any staleness
                "max-stale" => {
                    let s = if value.is_none() { Some(ONE_YEAR) } else { seconds };
                    if let Some(s) = s {
                        control.params.insert(CacheParam::MaxStale, s);
                    }
                }
                "min-fresh" => {
                    if let Some(s) = seconds {
                        control.params.insert(CacheParam::MinFresh, s);
                    }
                }
                "stale-while-revalidate" => {
                    if let Some(s) = seconds {
                        control.params.insert(CacheParam::StaleWhileRevalidate, s);
                    }
                }
                _ => {}
            }
        }

        if let Some(s) = shared_max_age {
            control.params.insert(CacheParam::MaxAge, s);
        }
        control
    }

    fn set(&mut self, flag: CacheFlag) {
        self.flags.insert(flag);
    }

    /// Value of a directive, in seconds.
    pub fn param(&self, param: CacheParam) -> Option<i64> {
        self.params.get(&param).copied()
    }

    pub fn has(&self, flag: CacheFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.flags.is_empty()
    }
}
