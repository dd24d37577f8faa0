// Anonymous Session Bootstrap

use ottkit_client::phoenix::ott_user;
use ottkit_client::RequestExecutor;
use tracing::{debug, warn};

use super::classify::classify_backend_error;
use super::error::{ResolveError, Result};
use super::models::{DomainObject, Session};
use super::registry::default_registry;

/// Standalone `ottUser.anonymousLogin` call
pub struct AnonymousSession;

impl AnonymousSession {
    /// Request a session token without user credentials. The returned
    /// session belongs to the caller and is never stored here.
    pub async fn fetch(
        executor: &dyn RequestExecutor,
        base_url: &str,
        partner_id: i64,
        udid: Option<&str>,
    ) -> Result<Session> {
        if base_url.trim().is_empty() {
            return Err(ResolveError::InvalidInputParam("baseUrl".to_string()));
        }

        let request = ott_user::anonymous_login(base_url, partner_id, udid);
        let body = executor.send(&request.into()).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ResolveError::EmptyResponse);
        }

        let payload: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| ResolveError::UnableToParseData(e.to_string()))?;

        match default_registry().parse(&payload) {
            Ok(DomainObject::Error(err)) => {
                warn!(code = ?err.code, message = ?err.message, "anonymous login failed");
                Err(classify_backend_error(err))
            }
            Ok(object) => {
                let login = object.login_session().ok_or_else(|| {
                    ResolveError::UnableToParseData(format!(
                        "expected a login session, got {:?}",
                        object.kind()
                    ))
                })?;
                debug!(partner_id, "anonymous session issued");
                Ok(Session {
                    token: login.ks.clone(),
                    expiration: login.expiry,
                    device_id: udid.map(str::to_string),
                })
            }
            Err(e) => Err(ResolveError::UnableToParseData(e.to_string())),
        }
    }
}
