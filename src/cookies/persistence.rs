//! Cookie file format.
//!
//! One cookie per line, six fields joined by `;;`:
//! `name;;value;;domain;;path;;expires;;secure`, where a missing path is a
//! single space and `expires` is epoch milliseconds. Only permanent cookies
//! are ever written.

use crate::base::clock::{epoch_millis, from_epoch_millis};
use crate::cookies::cookie::{HttpCookie, Validity};

const SEPARATOR: &str = ";;";
const LINE: &str = "\n";

/// Render `cookies`, skipping session cookies.
pub fn encode<'a>(cookies: impl IntoIterator<Item = &'a HttpCookie>) -> String {
    cookies
        .into_iter()
        .filter_map(encode_line)
        .collect::<Vec<_>>()
        .join(LINE)
}

fn encode_line(cookie: &HttpCookie) -> Option<String> {
    let Validity::Permanent(expires) = cookie.validity else {
        return None;
    };
    let expires = epoch_millis(expires).to_string();
    Some(
        [
            cookie.name.as_str(),
            cookie.value.as_str(),
            cookie.domain.as_str(),
            cookie.path.as_deref().unwrap_or(" "),
            expires.as_str(),
            if cookie.secure { "true" } else { "false" },
        ]
        .join(SEPARATOR),
    )
}

/// Parse a cookie file. Malformed lines are skipped.
pub fn decode(text: &str) -> Vec<HttpCookie> {
    text.split(LINE)
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let cookie = decode_line(line);
            if cookie.is_none() {
                tracing::warn!(line, "skipping malformed cookie line");
            }
            cookie
        })
        .collect()
}

fn decode_line(line: &str) -> Option<HttpCookie> {
    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    let [name, value, domain, path, expires, secure] = fields[..] else {
        return None;
    };
    let expires = from_epoch_millis(expires.trim().parse().ok()?).ok()?;
    let path = path.trim();

    Some(HttpCookie {
        name: name.to_string(),
        value: value.to_string(),
        domain: domain.to_string(),
        path: (!path.is_empty()).then(|| path.to_string()),
        validity: Validity::Permanent(expires),
        secure: secure.trim().eq_ignore_ascii_case("true"),
    })
}
