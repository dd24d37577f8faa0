// Backend Error Classification
//
// Maps backend error codes to semantic failure kinds, both for the
// resolution path and for periodic reporting responses.

use serde_json::Value;
use tracing::warn;

use super::error::ResolveError;
use super::models::{BackendError, DomainObject};
use super::registry::default_registry;

/// Too many devices are streaming on the account
pub const CONCURRENCY_LIMIT_CODE: &str = "4001";

/// The session token is no longer valid
pub const SESSION_EXPIRED_CODE: &str = "500016";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    ConcurrencyLimit,
    SessionExpired,
    Other,
}

impl BackendErrorKind {
    #[must_use]
    pub fn of(code: Option<&str>) -> Self {
        match code {
            Some(CONCURRENCY_LIMIT_CODE) => Self::ConcurrencyLimit,
            Some(SESSION_EXPIRED_CODE) => Self::SessionExpired,
            _ => Self::Other,
        }
    }
}

/// Numeric login error codes callers may inspect. They are reported as
/// opaque server errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum OttErrorCode {
    UserNotActivated = 2016,
}

impl OttErrorCode {
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            2016 => Some(Self::UserNotActivated),
            _ => None,
        }
    }
}

/// Turn a backend-reported error into a resolution failure
#[must_use]
pub fn classify_backend_error(error: BackendError) -> ResolveError {
    match BackendErrorKind::of(error.code.as_deref()) {
        BackendErrorKind::ConcurrencyLimit => ResolveError::ConcurrencyLimit(error),
        BackendErrorKind::SessionExpired => ResolveError::SessionExpired(error),
        BackendErrorKind::Other => ResolveError::ServerError {
            code: error.code.unwrap_or_default(),
            message: error.message.unwrap_or_default(),
        },
    }
}

/// Event raised to the host when a reporting call is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    ConcurrencyLimit(BackendError),
    SessionExpired(BackendError),
}

#[must_use]
pub fn backend_event(error: &BackendError) -> Option<BackendEvent> {
    match BackendErrorKind::of(error.code.as_deref()) {
        BackendErrorKind::ConcurrencyLimit => Some(BackendEvent::ConcurrencyLimit(error.clone())),
        BackendErrorKind::SessionExpired => Some(BackendEvent::SessionExpired(error.clone())),
        BackendErrorKind::Other => None,
    }
}

/// Inspect a reporting (bookmark) response. Only error payloads with a
/// known code produce an event.
#[must_use]
pub fn report_event(payload: &Value) -> Option<BackendEvent> {
    match default_registry().parse(payload) {
        Ok(DomainObject::Error(error)) => {
            let event = backend_event(&error);
            if event.is_some() {
                warn!(code = ?error.code, message = ?error.message, "reporting call rejected");
            }
            event
        }
        _ => None,
    }
}
