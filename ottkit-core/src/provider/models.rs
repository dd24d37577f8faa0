// Backend Domain Objects
//
// Typed values decoded from Phoenix response payloads. Every object is built
// by a single parse call and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::registry::DomainKind;

/// Error reported by the backend, either as `{"error": {...}}` or as a
/// `KalturaAPIException` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }

    /// The code as a number, for callers matching numeric error codes
    #[must_use]
    pub fn numeric_code(&self) -> Option<i64> {
        self.code.as_deref().and_then(|code| code.parse().ok())
    }
}

/// Session token issued by a login call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    pub ks: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "optional_epoch_seconds")]
    pub expiry: Option<DateTime<Utc>>,
}

/// Login response wrapping a session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub login_session: LoginSession,
}

/// Server-side session details
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionInfo {
    #[serde(default, deserialize_with = "optional_epoch_seconds")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub udid: Option<String>,
}

/// A session held by the caller for the lifetime of a resolution attempt.
/// Never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub expiration: Option<DateTime<Utc>>,
    pub device_id: Option<String>,
}

/// DRM entry of a server-declared source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DrmDescriptor {
    /// Raw server vocabulary, e.g. `WIDEVINE_CENC`
    #[serde(default)]
    pub scheme: String,
    #[serde(default, rename = "licenseURL", alias = "licenseUrl")]
    pub license_url: Option<String>,
    /// Base64 certificate, required by FairPlay
    #[serde(default)]
    pub certificate: Option<String>,
}

/// Server-declared playback source
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SourceDescriptor {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Format tag used for caller preferences (e.g. `Mobile_Devices_Main_HD`)
    #[serde(default, rename = "type")]
    pub source_type: String,
    /// Delivery format (e.g. `applehttp`, `mpegdash`, `url`)
    #[serde(default)]
    pub format: String,
    pub url: String,
    #[serde(default, rename = "duration", deserialize_with = "nullable")]
    pub duration_seconds: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub drm: Vec<DrmDescriptor>,
}

impl SourceDescriptor {
    #[must_use]
    pub fn has_drm(&self) -> bool {
        !self.drm.is_empty()
    }
}

/// Access rule attached to a playback context
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleAction {
    #[serde(default, rename = "type")]
    pub action_type: String,
}

impl RuleAction {
    #[must_use]
    pub fn is_block(&self) -> bool {
        self.action_type.eq_ignore_ascii_case("BLOCK")
    }
}

/// Backend-computed playback context of one asset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawPlaybackContext")]
pub struct PlaybackContext {
    pub sources: Vec<SourceDescriptor>,
    /// Present when the backend blocks playback
    pub block_action: Option<RuleAction>,
    /// First access-control message that is not `OK`
    pub error_message: Option<BackendError>,
}

#[derive(Deserialize)]
struct RawPlaybackContext {
    #[serde(default, deserialize_with = "nullable")]
    sources: Vec<SourceDescriptor>,
    #[serde(default, deserialize_with = "nullable")]
    actions: Vec<RuleAction>,
    #[serde(default, deserialize_with = "nullable")]
    messages: Vec<BackendError>,
}

impl From<RawPlaybackContext> for PlaybackContext {
    fn from(raw: RawPlaybackContext) -> Self {
        Self {
            sources: raw.sources,
            block_action: raw.actions.into_iter().find(RuleAction::is_block),
            error_message: raw
                .messages
                .into_iter()
                .find(|message| message.code.as_deref() != Some("OK")),
        }
    }
}

/// Payload tagged with an `objectType` that has no dedicated type
#[derive(Debug, Clone, PartialEq)]
pub struct BaseObject {
    pub object_type: String,
    pub raw: Value,
}

/// Result of parsing one payload
#[derive(Debug, Clone, PartialEq)]
pub enum DomainObject {
    Error(BackendError),
    PlaybackContext(PlaybackContext),
    LoginResponse(LoginResponse),
    LoginSession(LoginSession),
    Session(SessionInfo),
    Base(BaseObject),
}

impl DomainObject {
    #[must_use]
    pub const fn kind(&self) -> DomainKind {
        match self {
            Self::Error(_) => DomainKind::Error,
            Self::PlaybackContext(_) => DomainKind::PlaybackContext,
            Self::LoginResponse(_) => DomainKind::LoginResponse,
            Self::LoginSession(_) => DomainKind::LoginSession,
            Self::Session(_) => DomainKind::Session,
            Self::Base(_) => DomainKind::Base,
        }
    }

    /// Session token carried by a login object, if any
    #[must_use]
    pub fn login_session(&self) -> Option<&LoginSession> {
        match self {
            Self::LoginSession(session) => Some(session),
            Self::LoginResponse(response) => Some(&response.login_session),
            _ => None,
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn optional_epoch_seconds<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = Option::<f64>::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation)]
    Ok(seconds.and_then(|secs| DateTime::from_timestamp(secs as i64, 0)))
}
