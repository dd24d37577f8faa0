// Domain Object Registry
//
// Maps raw response payloads to typed domain objects by their shape.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::models::{
    BackendError, BaseObject, DomainObject, LoginResponse, LoginSession, PlaybackContext,
    SessionInfo,
};

const OBJECT_TYPE_KEY: &str = "objectType";
const ERROR_KEY: &str = "error";
const RESULT_KEY: &str = "result";
const API_EXCEPTION_TYPE: &str = "KalturaAPIException";

static DEFAULT_REGISTRY: LazyLock<ObjectRegistry> = LazyLock::new(ObjectRegistry::with_defaults);

/// Kinds of domain objects a payload can decode into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    Error,
    PlaybackContext,
    LoginResponse,
    LoginSession,
    Session,
    /// Tagged with an `objectType` that has no dedicated kind
    Base,
}

/// Parse failures
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no registered object type matches the payload")]
    UnknownType,

    #[error("invalid {kind:?} payload: {reason}")]
    InvalidPayload { kind: DomainKind, reason: String },
}

/// Structural signature: does this object look like a given kind?
pub type Signature = fn(&Map<String, Value>) -> bool;

/// Registry of payload shapes
///
/// Classification order:
/// 1. error shape (`error` object, or a `KalturaAPIException` tag)
/// 2. `objectType` discriminator looked up by name, unknown names are `Base`
/// 3. structural signatures, in registration order
pub struct ObjectRegistry {
    /// Kinds by `objectType` name
    names: HashMap<String, DomainKind>,

    /// Key-presence signatures for untagged payloads
    signatures: Vec<(DomainKind, Signature)>,
}

impl ObjectRegistry {
    /// Create an empty registry (only the error shape is recognized)
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            signatures: Vec::new(),
        }
    }

    /// Registry with every built-in Phoenix object
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_name("KalturaPlaybackContext", DomainKind::PlaybackContext);
        registry.register_name("KalturaLoginResponse", DomainKind::LoginResponse);
        registry.register_name("KalturaLoginSession", DomainKind::LoginSession);
        registry.register_name("KalturaSession", DomainKind::Session);

        registry.register_signature(DomainKind::PlaybackContext, |obj| {
            obj.get("sources").is_some_and(Value::is_array)
        });
        registry.register_signature(DomainKind::LoginResponse, |obj| {
            obj.get("loginSession").is_some_and(Value::is_object)
        });
        registry.register_signature(DomainKind::LoginSession, |obj| {
            obj.get("ks").is_some_and(Value::is_string)
        });
        registry.register_signature(DomainKind::Session, |obj| {
            obj.get("expiry").is_some_and(Value::is_number)
                || obj.get("udid").is_some_and(Value::is_string)
        });

        registry
    }

    /// Register an `objectType` name
    pub fn register_name(&mut self, object_type: &str, kind: DomainKind) {
        self.names.insert(object_type.to_string(), kind);
    }

    /// Register a structural signature, checked after those already registered
    pub fn register_signature(&mut self, kind: DomainKind, signature: Signature) {
        self.signatures.push((kind, signature));
    }

    /// Classify a payload by shape alone, without unwrapping any envelope
    #[must_use]
    pub fn classify(&self, payload: &Value) -> Option<DomainKind> {
        let obj = payload.as_object()?;

        if is_error_shape(obj) {
            return Some(DomainKind::Error);
        }

        if let Some(name) = obj.get(OBJECT_TYPE_KEY).and_then(Value::as_str) {
            return Some(self.names.get(name).copied().unwrap_or(DomainKind::Base));
        }

        self.signatures
            .iter()
            .find(|(_, signature)| signature(obj))
            .map(|(kind, _)| *kind)
    }

    /// Parse a payload into a domain object
    ///
    /// The bare payload is tried first (multi-request legs carry no
    /// envelope), then the contents of its `result` envelope.
    pub fn parse(&self, payload: &Value) -> Result<DomainObject, ParseError> {
        if let Some(kind) = self.classify(payload) {
            return decode(kind, payload);
        }

        let inner = payload
            .get(RESULT_KEY)
            .filter(|inner| inner.is_object())
            .ok_or(ParseError::UnknownType)?;
        let kind = self.classify(inner).ok_or(ParseError::UnknownType)?;
        decode(kind, inner)
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Shared registry with the built-in objects
#[must_use]
pub fn default_registry() -> &'static ObjectRegistry {
    &DEFAULT_REGISTRY
}

fn is_error_shape(obj: &Map<String, Value>) -> bool {
    obj.get(ERROR_KEY).is_some_and(Value::is_object)
        || obj.get(OBJECT_TYPE_KEY).and_then(Value::as_str) == Some(API_EXCEPTION_TYPE)
}

fn decode(kind: DomainKind, payload: &Value) -> Result<DomainObject, ParseError> {
    let object = match kind {
        DomainKind::Error => {
            let body = payload.get(ERROR_KEY).filter(|e| e.is_object()).unwrap_or(payload);
            DomainObject::Error(decode_as::<BackendError>(kind, body)?)
        }
        DomainKind::PlaybackContext => {
            DomainObject::PlaybackContext(decode_as::<PlaybackContext>(kind, payload)?)
        }
        DomainKind::LoginResponse => {
            DomainObject::LoginResponse(decode_as::<LoginResponse>(kind, payload)?)
        }
        DomainKind::LoginSession => {
            DomainObject::LoginSession(decode_as::<LoginSession>(kind, payload)?)
        }
        DomainKind::Session => DomainObject::Session(decode_as::<SessionInfo>(kind, payload)?),
        DomainKind::Base => {
            let object_type = payload
                .get(OBJECT_TYPE_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| ParseError::InvalidPayload {
                    kind,
                    reason: "missing objectType".to_string(),
                })?;
            DomainObject::Base(BaseObject {
                object_type: object_type.to_string(),
                raw: payload.clone(),
            })
        }
    };
    Ok(object)
}

fn decode_as<T: DeserializeOwned>(kind: DomainKind, payload: &Value) -> Result<T, ParseError> {
    T::deserialize(payload).map_err(|e| ParseError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}
