//! Request/response logging.
//!
//! Every exchange is rendered as a block of lines emitted through `tracing`
//! at `info` level. A mutex is held across each block so concurrent requests
//! do not interleave their lines.

use crate::base::neterror::NetError;
use crate::http::headers::Headers;
use crate::transport::{TransportRequest, TransportResponse};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Value of the `tag` field on every emitted event.
    pub tag: String,
    /// Longer lines are split into chunks of at most this many bytes.
    pub max_line: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            tag: "contentnet".to_string(),
            max_line: 32 * 1024,
        }
    }
}

#[derive(Debug, Default)]
pub struct Printer {
    config: LogConfig,
    lock: Mutex<()>,
}

impl Printer {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn request(&self, request: &TransportRequest) {
        let mut lines = vec![format!("--> {} {}", request.method, request.url)];
        push_headers(&mut lines, &request.headers);
        match &request.body {
            Some(body) => lines.push(match body.length() {
                Some(n) => format!("({}-byte body)", n),
                None => "(unknown-length body)".to_string(),
            }),
            None => lines.push("(no body)".to_string()),
        }
        lines.push(format!("--> END {}", request.method));
        self.emit(&lines);
    }

    pub fn response(
        &self,
        url: &str,
        response: &Result<TransportResponse, NetError>,
        elapsed: Duration,
    ) {
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.emit(&[format!("<-- HTTP FAILED: {}", err)]);
                return;
            }
        };

        let mut lines = vec![format!("<-- {} {}", response.code, url)];
        push_headers(&mut lines, &response.headers);
        let size = match response.body.as_ref().map(|b| b.length()) {
            None => "0-byte".to_string(),
            Some(Some(n)) => format!("{}-byte", n),
            Some(None) => "unknown-length".to_string(),
        };
        let origin = if response.from_cache { ", from cache" } else { "" };
        lines.push(format!(
            "<-- RESPONSE ({} body, {}ms{})",
            size,
            elapsed.as_millis(),
            origin
        ));
        lines.push("<-- END HTTP".to_string());
        self.emit(&lines);
    }

    fn emit(&self, lines: &[String]) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            for chunk in chunks(line, self.config.max_line) {
                tracing::info!(tag = %self.config.tag, "{}", chunk);
            }
        }
    }
}

fn push_headers(lines: &mut Vec<String>, headers: &Headers) {
    for (name, value) in headers.iter() {
        lines.push(format!("{}: {}", name, value));
    }
}

/// Split on char boundaries into pieces no longer than `max` bytes.
fn chunks(line: &str, max: usize) -> Vec<&str> {
    let max = max.max(4);
    let mut out = Vec::new();
    let mut rest = line;
    while rest.len() > max {
        let mut cut = max;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        out.push(head);
        rest = tail;
    }
    out.push(rest);
    out
}
