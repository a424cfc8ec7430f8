//! Cookies received through `Set-Cookie`.

use crate::cache::control::MAX_DELTA_SECONDS;
use crate::cookies::psl;
use crate::http::headers::{Headers, SET_COOKIE};
use crate::http::url::HttpUrl;
use cookie::Cookie;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Lives as long as the jar in memory; never written to disk.
    Session,
    Permanent(OffsetDateTime),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    /// Path without leading or trailing `/`; `None` applies to every path.
    pub path: Option<String>,
    pub validity: Validity,
    pub secure: bool,
}

impl HttpCookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into().to_lowercase(),
            path: None,
            validity: Validity::Session,
            secure: false,
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = normalize_path(path);
        self
    }

    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = validity;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// A stored cookie with the same identity is replaced by this one.
    pub fn same_identity(&self, other: &HttpCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        match self.validity {
            Validity::Permanent(expires) => now >= expires,
            Validity::Session => false,
        }
    }

    /// Permanent and not yet expired.
    pub fn is_savable(&self, now: OffsetDateTime) -> bool {
        match self.validity {
            Validity::Permanent(expires) => now < expires,
            Validity::Session => false,
        }
    }

    /// Whether this cookie should be sent with a request to `url`.
    pub fn is_applicable(&self, url: &HttpUrl) -> bool {
        if self.secure && !url.is_https() {
            return false;
        }
        if let Some(path) = &self.path {
            if !url.path().starts_with(path.as_str()) {
                return false;
            }
        }
        psl::domain_matches(url.host(), &self.domain)
    }

    /// `name=value` as sent in a `Cookie` header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

fn normalize_path(path: &str) -> Option<String> {
    let path = path.trim_matches('/');
    (!path.is_empty()).then(|| path.to_string())
}

/// Cookies set by a response to `url`.
///
/// `Max-Age` wins over `Expires`; a cookie with neither lives for the
/// session. Unparsable lines and cookies whose `Domain` is a public suffix
/// or does not cover the URL host are dropped.
pub fn cookies_of(url: &HttpUrl, headers: &Headers, now: OffsetDateTime) -> Vec<HttpCookie> {
    headers
        .get_all(SET_COOKIE)
        .filter_map(|line| parse_set_cookie(url, line, now))
        .collect()
}

fn parse_set_cookie(url: &HttpUrl, line: &str, now: OffsetDateTime) -> Option<HttpCookie> {
    let parsed = match Cookie::parse(line) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(error = %err, line, "ignoring unparsable Set-Cookie");
            return None;
        }
    };

    let domain = match parsed.domain() {
        Some(declared) => {
            let declared = declared.trim_start_matches('.').to_lowercase();
            if !psl::is_valid_cookie_domain(&declared, url.host()) {
                tracing::debug!(domain = %declared, host = %url.host(), "rejecting cookie domain");
                return None;
            }
            declared
        }
        None => url.host().to_string(),
    };

    let expires = match parsed.max_age() {
        Some(max_age) => Some(expiry_after(now, max_age)),
        None => parsed.expires().and_then(|e| e.datetime()),
    };
    let validity = match expires {
        Some(at) => Validity::Permanent(at),
        None => Validity::Session,
    };

    Some(HttpCookie {
        name: parsed.name().to_string(),
        value: parsed.value().to_string(),
        domain,
        path: parsed.path().and_then(normalize_path),
        validity,
        secure: parsed.secure().unwrap_or(false),
    })
}

/// `now` plus a `Max-Age`, capped like any delta-seconds value and
/// saturating at the latest representable date.
fn expiry_after(now: OffsetDateTime, max_age: Duration) -> OffsetDateTime {
    let seconds = max_age.whole_seconds().clamp(0, MAX_DELTA_SECONDS);
    now.checked_add(Duration::seconds(seconds))
        .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn url(s: &str) -> HttpUrl {
        HttpUrl::parse(s).unwrap()
    }

    #[test]
    fn test_cookies_of() {
        let headers = Headers::new()
            .with("Set-Cookie", "sid=abc; Path=/account/; Secure; HttpOnly")
            .with("Set-Cookie", "theme=dark; Max-Age=60; Expires=Wed, 21 Oct 2015 07:28:00 GMT")
            .with("Set-Cookie", "old=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT")
            .with("Set-Cookie", "gone=1; Max-Age=-5");
        let cookies = cookies_of(&url("https://www.example.com/"), &headers, now());
        assert_eq!(cookies.len(), 4);

        assert_eq!(cookies[0].domain, "www.example.com");
        assert_eq!(cookies[0].path.as_deref(), Some("account"));
        assert!(cookies[0].secure);
        assert_eq!(cookies[0].validity, Validity::Session);

        assert_eq!(cookies[1].validity, Validity::Permanent(now() + Duration::seconds(60)));
        assert!(cookies[2].is_expired(now()));
        assert_eq!(cookies[3].validity, Validity::Permanent(now()));
        assert!(cookies[3].is_expired(now()));
    }

    #[test]
    fn test_domain_attribute() {
        let headers = Headers::new()
            .with("Set-Cookie", "a=1; Domain=.Example.com")
            .with("Set-Cookie", "b=2; Domain=com")
            .with("Set-Cookie", "c=3; Domain=other.com")
            .with("Set-Cookie", "=");
        let cookies = cookies_of(&url("http://sub.example.com"), &headers, now());
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].domain, "example.com");
    }

    #[test]
    fn test_is_applicable_domain() {
        let cookie = HttpCookie::new("a", "1", "example.com");
        assert!(cookie.is_applicable(&url("http://sub.example.com")));
        assert!(cookie.is_applicable(&url("http://example.com")));
        assert!(!cookie.is_applicable(&url("http://notexample.com")));
    }

    #[test]
    fn test_is_applicable_path() {
        let cookie = HttpCookie::new("a", "1", "example.com").with_path("/deep");
        assert!(cookie.is_applicable(&url("http://example.com/deep")));
        assert!(cookie.is_applicable(&url("http://example.com/deep/more")));
        assert!(!cookie.is_applicable(&url("http://example.com/other")));
    }

    #[test]
    fn test_is_applicable_secure() {
        let cookie = HttpCookie::new("a", "1", "example.com").with_secure(true);
        assert!(cookie.is_applicable(&url("https://example.com")));
        assert!(!cookie.is_applicable(&url("http://example.com")));
    }

    #[test]
    fn test_savable() {
        let session = HttpCookie::new("a", "1", "example.com");
        assert!(!session.is_savable(now()));
        assert!(!session.is_expired(now()));

        let permanent = session
            .clone()
            .with_validity(Validity::Permanent(now() + Duration::minutes(1)));
        assert!(permanent.is_savable(now()));
        assert!(!permanent.is_savable(now() + Duration::minutes(1)));
        assert!(permanent.same_identity(&session));
        assert!(!permanent.same_identity(&session.with_path("x")));
    }

    #[test]
    fn test_oversized_max_age() {
        let headers = Headers::new().with("Set-Cookie", "a=1; Max-Age=999999999999");
        let cookies = cookies_of(&url("http://example.com"), &headers, now());
        assert_eq!(
            cookies[0].validity,
            Validity::Permanent(now() + Duration::seconds(MAX_DELTA_SECONDS))
        );

        let late = PrimitiveDateTime::MAX.assume_utc() - Duration::days(1);
        let cookies = cookies_of(&url("http://example.com"), &headers, late);
        assert_eq!(
            cookies[0].validity,
            Validity::Permanent(PrimitiveDateTime::MAX.assume_utc())
        );
    }
}
