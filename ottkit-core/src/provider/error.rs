// Resolution Error Types

use ottkit_client::ClientError;

use super::models::BackendError;

/// Failure of a media resolution call
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid input parameter: {0}")]
    InvalidInputParam(String),

    #[error("Unable to parse data: {0}")]
    UnableToParseData(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("No playable sources found")]
    NoSourcesFound,

    #[error("Concurrency limit exceeded: {}", .0.message.as_deref().unwrap_or_default())]
    ConcurrencyLimit(BackendError),

    #[error("Session expired: {}", .0.message.as_deref().unwrap_or_default())]
    SessionExpired(BackendError),

    #[error("Server error {code}: {message}")]
    ServerError { code: String, message: String },

    #[error("Resolution cancelled before dispatch")]
    Cancelled,

    #[error(transparent)]
    Transport(#[from] ClientError),
}

impl ResolveError {
    /// Error domain reported alongside `code()`
    pub const DOMAIN: &'static str = "PhoenixMediaProviderErrorDomain";

    /// Stable numeric code. Transport and cancellation failures have none.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::InvalidInputParam(_) => Some(0),
            Self::UnableToParseData(_) => Some(1),
            Self::NoSourcesFound => Some(2),
            Self::ConcurrencyLimit(_) | Self::SessionExpired(_) | Self::ServerError { .. } => {
                Some(3)
            }
            Self::EmptyResponse => Some(4),
            Self::Cancelled | Self::Transport(_) => None,
        }
    }

    /// `(code, message)` of a failure reported by the backend
    #[must_use]
    pub fn server_error(&self) -> Option<(&str, &str)> {
        match self {
            Self::ServerError { code, message } => Some((code.as_str(), message.as_str())),
            Self::ConcurrencyLimit(err) | Self::SessionExpired(err) => Some((
                err.code.as_deref().unwrap_or_default(),
                err.message.as_deref().unwrap_or_default(),
            )),
            _ => None,
        }
    }

    pub(crate) fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServerError {
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ResolveError::InvalidInputParam("baseUrl".into()).code(), Some(0));
        assert_eq!(ResolveError::UnableToParseData("x".into()).code(), Some(1));
        assert_eq!(ResolveError::NoSourcesFound.code(), Some(2));
        assert_eq!(ResolveError::server("1", "m").code(), Some(3));
        assert_eq!(
            ResolveError::SessionExpired(BackendError::new("500016", "expired")).code(),
            Some(3)
        );
        assert_eq!(ResolveError::EmptyResponse.code(), Some(4));
        assert_eq!(ResolveError::Cancelled.code(), None);
        assert_eq!(
            ResolveError::from(ClientError::Network("reset".into())).code(),
            None
        );
    }

    #[test]
    fn test_server_error_accessor() {
        let err = ResolveError::ConcurrencyLimit(BackendError::new("4001", "too many"));
        assert_eq!(err.server_error(), Some(("4001", "too many")));
        assert_eq!(
            ResolveError::server("Blocked", "Blocked").server_error(),
            Some(("Blocked", "Blocked"))
        );
        assert_eq!(ResolveError::EmptyResponse.server_error(), None);
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let inner = ClientError::Network("connection reset".into());
        let expected = inner.to_string();
        let err = ResolveError::from(inner);
        assert_eq!(err.to_string(), expected);
    }
}
