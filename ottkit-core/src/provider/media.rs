// Player-Ready Media Types
//
// Output of the resolution pipeline: ranked playable sources with their
// resolved DRM parameters.

use serde::{Deserialize, Serialize};

/// Media container/delivery format understood by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Hls,
    Dash,
    Mp4,
    /// Widevine classic container
    Wvm,
    Mp3,
    Unknown,
}

impl MediaFormat {
    /// Every format except `Unknown`
    pub const KNOWN: [Self; 5] = [Self::Hls, Self::Dash, Self::Mp4, Self::Wvm, Self::Mp3];

    /// Map a source's delivery format. `url` sources are progressive
    /// downloads, Widevine classic when they carry DRM.
    #[must_use]
    pub fn from_backend(format: &str, has_drm: bool) -> Self {
        match format.to_lowercase().as_str() {
            "applehttp" | "hls" => Self::Hls,
            "mpegdash" | "dash" => Self::Dash,
            "url" if has_drm => Self::Wvm,
            "url" | "mp4" => Self::Mp4,
            "wvm" => Self::Wvm,
            "mp3" => Self::Mp3,
            _ => Self::Unknown,
        }
    }
}

/// Content protection scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrmScheme {
    WidevineCenc,
    PlayreadyCenc,
    WidevineClassic,
    Fairplay,
    Unknown,
}

impl DrmScheme {
    /// Every scheme except `Unknown`
    pub const KNOWN: [Self; 4] = [
        Self::WidevineCenc,
        Self::PlayreadyCenc,
        Self::WidevineClassic,
        Self::Fairplay,
    ];

    /// Map the backend scheme vocabulary
    #[must_use]
    pub fn from_backend(scheme: &str) -> Self {
        match scheme {
            "WIDEVINE_CENC" => Self::WidevineCenc,
            "PLAYREADY_CENC" => Self::PlayreadyCenc,
            "WIDEVINE" => Self::WidevineClassic,
            "FAIRPLAY" => Self::Fairplay,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn requires_certificate(self) -> bool {
        matches!(self, Self::Fairplay)
    }
}

/// DRM parameters handed to the player for license acquisition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "DrmParamsRecord")]
pub enum DrmParams {
    Standard {
        scheme: DrmScheme,
        license_url: Option<String>,
    },
    FairPlay {
        license_url: Option<String>,
        /// Base64 application certificate
        certificate: String,
    },
}

impl DrmParams {
    #[must_use]
    pub const fn scheme(&self) -> DrmScheme {
        match self {
            Self::Standard { scheme, .. } => *scheme,
            Self::FairPlay { .. } => DrmScheme::Fairplay,
        }
    }

    #[must_use]
    pub fn license_url(&self) -> Option<&str> {
        match self {
            Self::Standard { license_url, .. } | Self::FairPlay { license_url, .. } => {
                license_url.as_deref()
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DrmParamsRecord {
    scheme: DrmScheme,
    license_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<String>,
}

impl From<DrmParams> for DrmParamsRecord {
    fn from(params: DrmParams) -> Self {
        let scheme = params.scheme();
        match params {
            DrmParams::Standard { license_url, .. } => Self {
                scheme,
                license_url,
                certificate: None,
            },
            DrmParams::FairPlay {
                license_url,
                certificate,
            } => Self {
                scheme,
                license_url,
                certificate: Some(certificate),
            },
        }
    }
}

/// A source the player can open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayableSource {
    pub id: String,
    pub content_url: String,
    pub media_format: MediaFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drm: Option<Vec<DrmParams>>,
}

/// Final, player-ready description of an asset
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescription {
    pub asset_id: String,
    /// Ranked, never empty
    pub sources: Vec<PlayableSource>,
    /// Longest duration among the included sources
    pub duration_seconds: f64,
}
