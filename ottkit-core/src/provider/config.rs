// Provider Configuration Types
//
// Inputs of a media resolution call and the platform support policy.

use ottkit_client::{AssetType, PlaybackContextType};
use serde::{Deserialize, Serialize};

use super::media::{DrmScheme, MediaFormat};

/// Everything one `load_media` call needs, built in one step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaProviderConfig {
    /// Backend API root (e.g. `https://ott.example.com/api_v3`)
    pub base_url: Option<String>,

    /// Tenant id, required when no session token is supplied
    pub partner_id: Option<i64>,

    /// Existing session token. Without one an anonymous session is requested.
    pub ks: Option<String>,

    /// Device id passed to the anonymous login
    pub udid: Option<String>,

    pub asset_id: Option<String>,

    pub asset_type: AssetType,

    pub context_type: PlaybackContextType,

    /// Preferred source types, in order. Filters and ranks sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,

    /// Preferred file ids, in order. Used only when `formats` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,

    /// Delivery protocol requested from the backend (default: https)
    pub network_protocol: Option<String>,

    pub referrer: Option<String>,
}

/// Formats and DRM schemes the target player can handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportPolicy {
    pub formats: Vec<MediaFormat>,
    pub drm_schemes: Vec<DrmScheme>,
}

impl SupportPolicy {
    #[must_use]
    pub fn supports_format(&self, format: MediaFormat) -> bool {
        format != MediaFormat::Unknown && self.formats.contains(&format)
    }

    #[must_use]
    pub fn supports_scheme(&self, scheme: DrmScheme) -> bool {
        scheme != DrmScheme::Unknown && self.drm_schemes.contains(&scheme)
    }
}

impl Default for SupportPolicy {
    fn default() -> Self {
        Self {
            formats: MediaFormat::KNOWN.to_vec(),
            drm_schemes: DrmScheme::KNOWN.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_supports_known_values() {
        let policy = SupportPolicy::default();
        assert!(policy.supports_format(MediaFormat::Hls));
        assert!(policy.supports_format(MediaFormat::Wvm));
        assert!(!policy.supports_format(MediaFormat::Unknown));
        assert!(policy.supports_scheme(DrmScheme::Fairplay));
        assert!(!policy.supports_scheme(DrmScheme::Unknown));
    }

    #[test]
    fn test_unknown_is_never_supported() {
        let policy = SupportPolicy {
            formats: vec![MediaFormat::Unknown],
            drm_schemes: vec![DrmScheme::Unknown],
        };
        assert!(!policy.supports_format(MediaFormat::Unknown));
        assert!(!policy.supports_scheme(DrmScheme::Unknown));
    }

    #[test]
    fn test_media_config_from_json() {
        let config: MediaProviderConfig = serde_json::from_value(serde_json::json!({
            "base_url": "https://ott.example.com/api_v3",
            "partner_id": 198,
            "asset_id": "259",
            "asset_type": "media",
            "context_type": "start_over",
            "formats": ["Mobile_Devices_Main_HD"],
        }))
        .unwrap();

        assert_eq!(config.partner_id, Some(198));
        assert_eq!(config.asset_type, AssetType::Media);
        assert_eq!(config.context_type, PlaybackContextType::StartOver);
        assert!(config.ks.is_none());
        assert!(config.file_ids.is_none());
    }
}
