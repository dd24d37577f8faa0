//! Phoenix service request builders
//!
//! One function per backend action used during media resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::request::OttRequest;

/// Asset object type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Media,
    Epg,
    #[default]
    Unknown,
}

impl AssetType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Epg => "epg",
            Self::Unknown => "",
        }
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "media" => Ok(Self::Media),
            "epg" => Ok(Self::Epg),
            other => Err(format!("unknown asset type: {other}")),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the playback context is requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackContextType {
    Trailer,
    Catchup,
    StartOver,
    Playback,
    #[default]
    Unknown,
}

impl PlaybackContextType {
    /// Backend vocabulary
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trailer => "TRAILER",
            Self::Catchup => "CATCHUP",
            Self::StartOver => "START_OVER",
            Self::Playback => "PLAYBACK",
            Self::Unknown => "",
        }
    }
}

impl FromStr for PlaybackContextType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trailer" => Ok(Self::Trailer),
            "catchup" => Ok(Self::Catchup),
            "start_over" | "startover" => Ok(Self::StartOver),
            "playback" => Ok(Self::Playback),
            other => Err(format!("unknown playback context type: {other}")),
        }
    }
}

impl fmt::Display for PlaybackContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `contextDataParams` of `asset.getPlaybackContext`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackContextOptions {
    pub context_type: PlaybackContextType,
    pub protocols: Vec<String>,
    pub file_ids: Option<Vec<String>>,
    pub referrer: Option<String>,
}

impl PlaybackContextOptions {
    fn to_value(&self) -> Value {
        let mut params = Map::new();
        params.insert("objectType".to_string(), json!("KalturaPlaybackContextOptions"));
        params.insert("context".to_string(), json!(self.context_type.as_str()));
        params.insert("mediaProtocols".to_string(), json!(self.protocols));
        if let Some(file_ids) = &self.file_ids {
            params.insert("assetFileIds".to_string(), json!(file_ids.join(",")));
        }
        if let Some(referrer) = &self.referrer {
            params.insert("referrer".to_string(), json!(referrer));
        }
        Value::Object(params)
    }
}

/// `ottUser` service
pub mod ott_user {
    use super::OttRequest;

    /// Issue a session token without user credentials
    #[must_use]
    pub fn anonymous_login(base_url: &str, partner_id: i64, udid: Option<&str>) -> OttRequest {
        let request = OttRequest::new(base_url, "ottUser", "anonymousLogin")
            .with_param("partnerId", partner_id);
        match udid {
            Some(udid) => request.with_param("udid", udid),
            None => request,
        }
    }
}

/// `asset` service
pub mod asset {
    use super::{AssetType, OttRequest, PlaybackContextOptions};

    /// Request the playback context of an asset. `ks` may be a literal
    /// session token or a multi-request result placeholder.
    #[must_use]
    pub fn get_playback_context(
        base_url: &str,
        ks: &str,
        asset_id: &str,
        asset_type: AssetType,
        options: &PlaybackContextOptions,
    ) -> OttRequest {
        OttRequest::new(base_url, "asset", "getPlaybackContext")
            .with_param("ks", ks)
            .with_param("assetId", asset_id)
            .with_param("assetType", asset_type.as_str())
            .with_param("contextDataParams", options.to_value())
    }
}
