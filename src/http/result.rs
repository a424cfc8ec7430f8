//! Outcome of a single request.

use crate::base::neterror::NetError;

/// `Success` for 1xx/2xx, `Error` for any other status the transport
/// returned, `Failure` when no response was obtained at all.
#[derive(Debug)]
pub enum HttpResult<S, E> {
    Success { code: u16, body: S },
    Error { code: u16, body: E },
    Failure(NetError),
}

impl<T> HttpResult<T, T> {
    /// Classify a response body by status code.
    pub fn classify(code: u16, body: T) -> Self {
        if code < 300 {
            HttpResult::Success { code, body }
        } else {
            HttpResult::Error { code, body }
        }
    }
}

impl<S, E> HttpResult<S, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, HttpResult::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HttpResult::Error { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, HttpResult::Failure(_))
    }

    /// Status code, absent for failures.
    pub fn code(&self) -> Option<u16> {
        match self {
            HttpResult::Success { code, .. } | HttpResult::Error { code, .. } => Some(*code),
            HttpResult::Failure(_) => None,
        }
    }

    pub fn fold<T>(
        self,
        on_success: impl FnOnce(u16, S) -> T,
        on_error: impl FnOnce(u16, E) -> T,
        on_failure: impl FnOnce(NetError) -> T,
    ) -> T {
        match self {
            HttpResult::Success { code, body } => on_success(code, body),
            HttpResult::Error { code, body } => on_error(code, body),
            HttpResult::Failure(err) => on_failure(err),
        }
    }

    pub fn map_success<T>(self, f: impl FnOnce(u16, S) -> T) -> HttpResult<T, E> {
        self.and_then_success(|code, body| HttpResult::Success {
            code,
            body: f(code, body),
        })
    }

    /// Chain another outcome onto a success; errors and failures pass through.
    pub fn and_then_success<T>(
        self,
        f: impl FnOnce(u16, S) -> HttpResult<T, E>,
    ) -> HttpResult<T, E> {
        match self {
            HttpResult::Success { code, body } => f(code, body),
            HttpResult::Error { code, body } => HttpResult::Error { code, body },
            HttpResult::Failure(err) => HttpResult::Failure(err),
        }
    }

    pub fn map_error<T>(self, f: impl FnOnce(u16, E) -> T) -> HttpResult<S, T> {
        self.and_then_error(|code, body| HttpResult::Error {
            code,
            body: f(code, body),
        })
    }

    pub fn and_then_error<T>(
        self,
        f: impl FnOnce(u16, E) -> HttpResult<S, T>,
    ) -> HttpResult<S, T> {
        match self {
            HttpResult::Success { code, body } => HttpResult::Success { code, body },
            HttpResult::Error { code, body } => f(code, body),
            HttpResult::Failure(err) => HttpResult::Failure(err),
        }
    }

    pub fn map_failure(self, f: impl FnOnce(NetError) -> NetError) -> Self {
        match self {
            HttpResult::Failure(err) => HttpResult::Failure(f(err)),
            other => other,
        }
    }

    pub fn success_or_none(self) -> Option<S> {
        match self {
            HttpResult::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn error_or_none(self) -> Option<E> {
        match self {
            HttpResult::Error { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn failure_or_none(self) -> Option<NetError> {
        match self {
            HttpResult::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// The success body, or an error built from the status and error body.
    /// Failures are returned as they are.
    pub fn success_or_else(self, f: impl FnOnce(u16, E) -> NetError) -> Result<S, NetError> {
        match self {
            HttpResult::Success { body, .. } => Ok(body),
            HttpResult::Error { code, body } => Err(f(code, body)),
            HttpResult::Failure(err) => Err(err),
        }
    }
}
