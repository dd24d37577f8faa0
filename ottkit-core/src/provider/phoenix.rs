//! Phoenix MediaProvider
//!
//! Resolves an asset into a [`MediaDescription`] against a Phoenix (OTT)
//! backend. With a session token the playback context is fetched in one
//! call. Without one, an anonymous login and the context fetch are sent as
//! one multi-request; the context leg reads the login's token through a
//! server-side placeholder.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use ottkit_client::phoenix::{asset, ott_user, result_reference};
use ottkit_client::{
    AssetType, MultiRequestBuilder, PlaybackContextOptions, PlaybackContextType, Request,
    RequestExecutor,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

use crate::logging::generate_call_id;
use super::classify::classify_backend_error;
use super::config::{MediaProviderConfig, SupportPolicy};
use super::error::{ResolveError, Result};
use super::media::MediaDescription;
use super::models::{DomainObject, PlaybackContext};
use super::registry::ObjectRegistry;
use super::selector::{select, SourcePreference};
use super::traits::MediaProvider;

const DEFAULT_PROTOCOL: &str = "https";
const BLOCKED: &str = "Blocked";
const MULTI_RESULT_KEY: &str = "result";

/// Phoenix MediaProvider
///
/// Holds no per-call state, so one instance can serve overlapping calls.
pub struct PhoenixMediaProvider {
    executor: Arc<dyn RequestExecutor>,
    registry: Arc<ObjectRegistry>,
    policy: SupportPolicy,
}

impl PhoenixMediaProvider {
    /// Create a provider with the built-in registry and the default support policy
    pub fn new(executor: Arc<dyn RequestExecutor>) -> Self {
        Self {
            executor,
            registry: Arc::new(ObjectRegistry::with_defaults()),
            policy: SupportPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SupportPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &SupportPolicy {
        &self.policy
    }

    async fn resolve(
        &self,
        call: ResolutionRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<MediaDescription> {
        if cancel.is_cancelled() {
            info!("cancelled before dispatch");
            return Err(ResolveError::Cancelled);
        }

        let request = call.build_request();
        let body = self.executor.send(&request).await?;

        let payload = decode_body(&body)?;
        let context = match call.mode() {
            Mode::Single => self.context_leg(&payload)?,
            Mode::Batched => self.batched_context(payload)?,
        };

        let description = self.assemble(&call, context)?;
        info!(
            sources = description.sources.len(),
            duration_seconds = description.duration_seconds,
            "media resolved"
        );
        Ok(description)
    }

    fn batched_context(&self, payload: Value) -> Result<PlaybackContext> {
        let legs = match split_batch(payload) {
            Ok(legs) => legs,
            // The whole multi-request was rejected, e.g. a malformed partner id
            Err(whole) => return self.context_leg(&whole),
        };

        let [login, context, ..] = legs.as_slice() else {
            warn!(legs = legs.len(), "multi-request returned too few results");
            return Err(ResolveError::EmptyResponse);
        };

        self.inspect_login_leg(login);
        self.context_leg(context)
    }

    /// The login leg only feeds the placeholder on the server. Its outcome
    /// shows up again in the context leg, so it is logged and not acted on.
    fn inspect_login_leg(&self, leg: &Value) {
        match self.registry.parse(leg) {
            Ok(DomainObject::Error(err)) => {
                warn!(code = ?err.code, message = ?err.message, "anonymous login failed");
            }
            Ok(object) if object.login_session().is_some() => {
                debug!("anonymous session issued");
            }
            Ok(object) => debug!(kind = ?object.kind(), "unexpected login result"),
            Err(e) => debug!(error = %e, "unparsable login result"),
        }
    }

    fn context_leg(&self, leg: &Value) -> Result<PlaybackContext> {
        match self.registry.parse(leg) {
            Ok(DomainObject::PlaybackContext(context)) => Ok(context),
            Ok(DomainObject::Error(err)) => {
                warn!(code = ?err.code, message = ?err.message, "backend reported an error");
                Err(classify_backend_error(err))
            }
            Ok(object) => Err(ResolveError::UnableToParseData(format!(
                "expected a playback context, got {:?}",
                object.kind()
            ))),
            Err(e) => Err(ResolveError::UnableToParseData(e.to_string())),
        }
    }

    fn assemble(
        &self,
        call: &ResolutionRequest<'_>,
        context: PlaybackContext,
    ) -> Result<MediaDescription> {
        if context.block_action.is_some() {
            let err = match context.error_message {
                Some(message) => ResolveError::server(
                    message.code.unwrap_or_default(),
                    message.message.unwrap_or_default(),
                ),
                None => ResolveError::server(BLOCKED, BLOCKED),
            };
            warn!(error = %err, "playback blocked");
            return Err(err);
        }

        let selection = select(&context.sources, &call.preference, &self.policy);
        if selection.sources.is_empty() {
            warn!(declared = context.sources.len(), "no playable sources");
            return Err(ResolveError::NoSourcesFound);
        }

        Ok(MediaDescription {
            asset_id: call.asset_id.to_string(),
            sources: selection.sources,
            duration_seconds: selection.duration_seconds,
        })
    }
}

#[async_trait]
impl MediaProvider for PhoenixMediaProvider {
    fn name(&self) -> &'static str {
        "phoenix"
    }

    async fn load_media(
        &self,
        config: &MediaProviderConfig,
        cancel: &CancellationToken,
    ) -> Result<MediaDescription> {
        let call = ResolutionRequest::from_config(config).inspect_err(|e| {
            warn!(error = %e, "rejected media request");
        })?;

        let span = info_span!(
            "load_media",
            call_id = %generate_call_id(),
            asset_id = %call.asset_id,
            mode = %call.mode(),
        );
        self.resolve(call, cancel).instrument(span).await
    }

    /// Does nothing; requests already dispatched run to completion.
    fn cancel(&self) {
        debug!("cancel requested, in-flight requests are not aborted");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Single,
    Batched,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Batched => "batched",
        })
    }
}

#[derive(Debug)]
enum Auth<'a> {
    Session(&'a str),
    Anonymous { partner_id: i64, udid: Option<&'a str> },
}

/// Validated inputs of one call
#[derive(Debug)]
struct ResolutionRequest<'a> {
    base_url: &'a str,
    asset_id: &'a str,
    asset_type: AssetType,
    auth: Auth<'a>,
    options: PlaybackContextOptions,
    preference: SourcePreference,
}

impl<'a> ResolutionRequest<'a> {
    fn from_config(config: &'a MediaProviderConfig) -> Result<Self> {
        let base_url = present(&config.base_url)
            .filter(|url| Url::parse(url).is_ok())
            .ok_or_else(|| missing("baseUrl"))?;
        let asset_id = present(&config.asset_id).ok_or_else(|| missing("assetId"))?;
        if config.asset_type == AssetType::Unknown {
            return Err(missing("type"));
        }
        if config.context_type == PlaybackContextType::Unknown {
            return Err(missing("contextType"));
        }

        let auth = match present(&config.ks) {
            Some(ks) => Auth::Session(ks),
            None => Auth::Anonymous {
                partner_id: config.partner_id.ok_or_else(|| missing("partnerId"))?,
                udid: present(&config.udid),
            },
        };

        let protocol = present(&config.network_protocol).unwrap_or(DEFAULT_PROTOCOL);
        let options = PlaybackContextOptions {
            context_type: config.context_type,
            protocols: vec![protocol.to_string()],
            file_ids: config.file_ids.clone(),
            referrer: present(&config.referrer).map(str::to_string),
        };

        Ok(Self {
            base_url,
            asset_id,
            asset_type: config.asset_type,
            auth,
            options,
            preference: SourcePreference::new(config.formats.clone(), config.file_ids.clone()),
        })
    }

    const fn mode(&self) -> Mode {
        match self.auth {
            Auth::Session(_) => Mode::Single,
            Auth::Anonymous { .. } => Mode::Batched,
        }
    }

    fn build_request(&self) -> Request {
        match &self.auth {
            Auth::Session(ks) => asset::get_playback_context(
                self.base_url,
                ks,
                self.asset_id,
                self.asset_type,
                &self.options,
            )
            .into(),
            Auth::Anonymous { partner_id, udid } => {
                let mut multi = MultiRequestBuilder::new(self.base_url);
                let login = multi.add(ott_user::anonymous_login(self.base_url, *partner_id, *udid));
                let ks = result_reference(login, "ks");
                multi.add(asset::get_playback_context(
                    self.base_url,
                    &ks,
                    self.asset_id,
                    self.asset_type,
                    &self.options,
                ));
                multi.build()
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn missing(name: &str) -> ResolveError {
    ResolveError::InvalidInputParam(name.to_string())
}

/// Empty, whitespace-only and `null` bodies all count as no response.
fn decode_body(body: &Bytes) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ResolveError::EmptyResponse);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => Err(ResolveError::EmptyResponse),
        Ok(value) => Ok(value),
        Err(e) => Err(ResolveError::UnableToParseData(e.to_string())),
    }
}

/// Split a multi-request response into its legs. Accepts `{"result": [...]}`
/// and a bare array; anything else is handed back untouched.
fn split_batch(payload: Value) -> std::result::Result<Vec<Value>, Value> {
    match payload {
        Value::Array(legs) => Ok(legs),
        Value::Object(mut obj) => match obj.remove(MULTI_RESULT_KEY) {
            Some(Value::Array(legs)) => Ok(legs),
            Some(other) => {
                obj.insert(MULTI_RESULT_KEY.to_string(), other);
                Err(Value::Object(obj))
            }
            None => Err(Value::Object(obj)),
        },
        other => Err(other),
    }
}
