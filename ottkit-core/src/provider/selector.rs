// Source Selector
//
// Filters, ranks and resolves server-declared sources into playable ones.

use tracing::debug;

use super::config::SupportPolicy;
use super::media::{DrmParams, DrmScheme, MediaFormat, PlayableSource};
use super::models::{DrmDescriptor, SourceDescriptor};

/// Caller preference. Only one mode is honored per call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourcePreference {
    /// Keep sources whose type tag is listed, ranked by list position
    Formats(Vec<String>),
    /// Keep sources whose id is listed, ranked by list position
    FileIds(Vec<String>),
    #[default]
    Any,
}

impl SourcePreference {
    /// Formats take precedence over file ids when both are given.
    #[must_use]
    pub fn new(formats: Option<Vec<String>>, file_ids: Option<Vec<String>>) -> Self {
        match (formats, file_ids) {
            (Some(formats), _) => Self::Formats(formats),
            (None, Some(file_ids)) => Self::FileIds(file_ids),
            (None, None) => Self::Any,
        }
    }

    fn lookup<'a>(&'a self, source: &'a SourceDescriptor) -> Option<(&'a [String], &'a str)> {
        match self {
            Self::Formats(formats) => Some((formats.as_slice(), source.source_type.as_str())),
            Self::FileIds(file_ids) => Some((file_ids.as_slice(), source.id.as_str())),
            Self::Any => None,
        }
    }

    #[must_use]
    pub fn accepts(&self, source: &SourceDescriptor) -> bool {
        self.lookup(source)
            .is_none_or(|(list, key)| list.iter().any(|entry| entry == key))
    }

    /// Position of the source's key in the preference list. Keys missing
    /// from the list rank as position 0.
    #[must_use]
    pub fn rank(&self, source: &SourceDescriptor) -> usize {
        self.lookup(source)
            .and_then(|(list, key)| list.iter().position(|entry| entry == key))
            .unwrap_or(0)
    }
}

/// Playable sources plus the aggregate duration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub sources: Vec<PlayableSource>,
    /// Longest declared duration among `sources`, 0 when empty
    pub duration_seconds: f64,
}

/// Filter, rank and resolve descriptors. Ranking is stable, so sources
/// with equal rank keep the server's order.
#[must_use]
pub fn select(
    descriptors: &[SourceDescriptor],
    preference: &SourcePreference,
    policy: &SupportPolicy,
) -> Selection {
    let mut kept: Vec<&SourceDescriptor> = descriptors
        .iter()
        .filter(|descriptor| preference.accepts(descriptor))
        .collect();
    kept.sort_by_key(|descriptor| preference.rank(descriptor));

    let mut selection = Selection::default();
    for descriptor in kept {
        if let Some(source) = resolve_source(descriptor, policy) {
            selection.duration_seconds = selection.duration_seconds.max(descriptor.duration_seconds);
            selection.sources.push(source);
        }
    }
    selection
}

/// Ordered playable sources for the given descriptors
#[must_use]
pub fn select_playable_sources(
    descriptors: &[SourceDescriptor],
    preference: &SourcePreference,
    policy: &SupportPolicy,
) -> Vec<PlayableSource> {
    select(descriptors, preference, policy).sources
}

fn resolve_source(descriptor: &SourceDescriptor, policy: &SupportPolicy) -> Option<PlayableSource> {
    let format = MediaFormat::from_backend(&descriptor.format, descriptor.has_drm());
    if !policy.supports_format(format) {
        debug!(source_id = %descriptor.id, format = %descriptor.format, "dropping source with unsupported format");
        return None;
    }

    let drm = if descriptor.has_drm() {
        let mut resolved = Vec::with_capacity(descriptor.drm.len());
        for entry in &descriptor.drm {
            match resolve_drm(entry, policy) {
                DrmResolution::Resolved(params) => resolved.push(params),
                DrmResolution::Unsupported => {}
                DrmResolution::Incomplete => {
                    debug!(source_id = %descriptor.id, scheme = %entry.scheme, "dropping source with incomplete DRM data");
                    return None;
                }
            }
        }
        if resolved.is_empty() {
            debug!(source_id = %descriptor.id, "dropping source without any supported DRM scheme");
            return None;
        }
        Some(resolved)
    } else {
        None
    };

    Some(PlayableSource {
        id: descriptor.id.clone(),
        content_url: descriptor.url.clone(),
        media_format: format,
        drm,
    })
}

enum DrmResolution {
    Resolved(DrmParams),
    /// Scheme unknown or not supported by the player; the entry is skipped
    Unsupported,
    /// Supported scheme missing a required field; the whole source is unplayable
    Incomplete,
}

fn resolve_drm(entry: &DrmDescriptor, policy: &SupportPolicy) -> DrmResolution {
    let scheme = DrmScheme::from_backend(&entry.scheme);
    if !policy.supports_scheme(scheme) {
        return DrmResolution::Unsupported;
    }

    if scheme.requires_certificate() {
        return match entry.certificate.as_deref().filter(|cert| !cert.is_empty()) {
            Some(certificate) => DrmResolution::Resolved(DrmParams::FairPlay {
                license_url: entry.license_url.clone(),
                certificate: certificate.to_string(),
            }),
            None => DrmResolution::Incomplete,
        };
    }

    DrmResolution::Resolved(DrmParams::Standard {
        scheme,
        license_url: entry.license_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, source_type: &str, format: &str, drm: Vec<DrmDescriptor>) -> SourceDescriptor {
        SourceDescriptor {
            id: id.to_string(),
            source_type: source_type.to_string(),
            format: format.to_string(),
            url: format!("https://cdn.example.com/{id}"),
            duration_seconds: 0.0,
            drm,
        }
    }

    fn drm(scheme: &str, certificate: Option<&str>) -> DrmDescriptor {
        DrmDescriptor {
            scheme: scheme.to_string(),
            license_url: Some("https://x".to_string()),
            certificate: certificate.map(str::to_string),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn ids(sources: &[PlayableSource]) -> Vec<&str> {
        sources.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_formats_order_sources() {
        let descriptors = vec![
            source("1", "mp4", "mp4", vec![]),
            source("2", "hls", "hls", vec![]),
        ];
        let preference = SourcePreference::new(Some(strings(&["hls", "mp4"])), None);
        let sources = select_playable_sources(&descriptors, &preference, &SupportPolicy::default());

        assert_eq!(ids(&sources), vec!["2", "1"]);
        assert_eq!(sources[0].media_format, MediaFormat::Hls);
        assert_eq!(sources[1].media_format, MediaFormat::Mp4);
    }

    #[test]
    fn test_formats_filter_out_unlisted() {
        let descriptors = vec![
            source("1", "Main_HD", "applehttp", vec![]),
            source("2", "Main_SD", "applehttp", vec![]),
            source("3", "Trailer", "url", vec![]),
        ];
        let preference = SourcePreference::new(Some(strings(&["Main_SD", "Trailer"])), None);
        let sources = select_playable_sources(&descriptors, &preference, &SupportPolicy::default());

        assert_eq!(ids(&sources), vec!["2", "3"]);
    }

    #[test]
    fn test_formats_take_precedence_over_file_ids() {
        let descriptors = vec![
            source("1", "Main_HD", "applehttp", vec![]),
            source("2", "Main_SD", "applehttp", vec![]),
        ];
        let preference =
            SourcePreference::new(Some(strings(&["Main_HD"])), Some(strings(&["2"])));
        assert!(matches!(preference, SourcePreference::Formats(_)));

        let sources = select_playable_sources(&descriptors, &preference, &SupportPolicy::default());
        assert_eq!(ids(&sources), vec!["1"]);
    }

    #[test]
    fn test_file_ids_filter_and_order() {
        let descriptors = vec![
            source("10", "a", "applehttp", vec![]),
            source("11", "b", "mpegdash", vec![]),
            source("12", "c", "url", vec![]),
        ];
        let preference = SourcePreference::new(None, Some(strings(&["12", "10"])));
        let sources = select_playable_sources(&descriptors, &preference, &SupportPolicy::default());

        assert_eq!(ids(&sources), vec!["12", "10"]);
    }

    #[test]
    fn test_no_preference_keeps_server_order() {
        let descriptors = vec![
            source("3", "a", "mpegdash", vec![]),
            source("1", "b", "applehttp", vec![]),
            source("2", "c", "url", vec![]),
        ];
        let sources =
            select_playable_sources(&descriptors, &SourcePreference::Any, &SupportPolicy::default());
        assert_eq!(ids(&sources), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_missing_key_ranks_as_first_position() {
        let preference = SourcePreference::Formats(strings(&["hls", "mp4"]));
        assert_eq!(preference.rank(&source("1", "dash", "mpegdash", vec![])), 0);
        assert_eq!(preference.rank(&source("2", "hls", "applehttp", vec![])), 0);
        assert_eq!(preference.rank(&source("3", "mp4", "url", vec![])), 1);
        assert_eq!(SourcePreference::Any.rank(&source("4", "mp4", "url", vec![])), 0);
    }

    #[test]
    fn test_fairplay_without_certificate_is_excluded() {
        let descriptors = vec![source("3", "hls", "applehttp", vec![drm("FAIRPLAY", None)])];
        let sources =
            select_playable_sources(&descriptors, &SourcePreference::Any, &SupportPolicy::default());
        assert!(sources.is_empty());
    }

    #[test]
    fn test_fairplay_with_certificate() {
        let descriptors = vec![source("3", "hls", "applehttp", vec![drm("FAIRPLAY", Some("MIIE"))])];
        let sources =
            select_playable_sources(&descriptors, &SourcePreference::Any, &SupportPolicy::default());

        let drm = sources[0].drm.as_ref().unwrap();
        assert_eq!(drm.len(), 1);
        assert_eq!(drm[0].scheme(), DrmScheme::Fairplay);
        assert_eq!(drm[0].license_url(), Some("https://x"));
    }

    #[test]
    fn test_incomplete_fairplay_disqualifies_multi_drm_source() {
        let descriptors = vec![source(
            "4",
            "dash",
            "mpegdash",
            vec![drm("WIDEVINE_CENC", None), drm("FAIRPLAY", None)],
        )];
        let sources =
            select_playable_sources(&descriptors, &SourcePreference::Any, &SupportPolicy::default());
        assert!(sources.is_empty());
    }

    #[test]
    fn test_unsupported_schemes_are_skipped() {
        let descriptors = vec![source(
            "5",
            "dash",
            "mpegdash",
            vec![drm("CUSTOM_DRM", None), drm("PLAYREADY_CENC", None), drm("WIDEVINE_CENC", None)],
        )];
        let policy = SupportPolicy {
            drm_schemes: vec![DrmScheme::WidevineCenc],
            ..SupportPolicy::default()
        };
        let sources = select_playable_sources(&descriptors, &SourcePreference::Any, &policy);

        let drm = sources[0].drm.as_ref().unwrap();
        assert_eq!(drm.len(), 1);
        assert_eq!(drm[0].scheme(), DrmScheme::WidevineCenc);
    }

    #[test]
    fn test_source_with_only_unknown_schemes_is_excluded() {
        let descriptors = vec![source("6", "dash", "mpegdash", vec![drm("CUSTOM_DRM", None)])];
        let sources =
            select_playable_sources(&descriptors, &SourcePreference::Any, &SupportPolicy::default());
        assert!(sources.is_empty());
    }

    #[test]
    fn test_unsupported_format_is_dropped() {
        let descriptors = vec![
            source("1", "a", "smoothstreaming", vec![]),
            source("2", "b", "mpegdash", vec![]),
        ];
        let policy = SupportPolicy {
            formats: vec![MediaFormat::Hls, MediaFormat::Mp4],
            ..SupportPolicy::default()
        };
        let sources = select_playable_sources(&descriptors, &SourcePreference::Any, &policy);
        assert!(sources.is_empty());
    }

    #[test]
    fn test_url_with_drm_resolves_to_wvm() {
        let descriptors = vec![source("7", "a", "url", vec![drm("WIDEVINE", None)])];
        let sources =
            select_playable_sources(&descriptors, &SourcePreference::Any, &SupportPolicy::default());
        assert_eq!(sources[0].media_format, MediaFormat::Wvm);
        assert_eq!(sources[0].drm.as_ref().unwrap()[0].scheme(), DrmScheme::WidevineClassic);
    }

    #[test]
    fn test_duration_is_max_of_included_sources() {
        let mut long = source("1", "a", "smoothstreaming", vec![]);
        long.duration_seconds = 9000.0;
        let mut hls = source("2", "b", "applehttp", vec![]);
        hls.duration_seconds = 120.0;
        let mut dash = source("3", "c", "mpegdash", vec![]);
        dash.duration_seconds = 121.5;

        let selection = select(&[long, hls, dash], &SourcePreference::Any, &SupportPolicy::default());
        assert_eq!(selection.sources.len(), 2);
        assert!((selection.duration_seconds - 121.5).abs() < f64::EPSILON);

        let empty = select(&[], &SourcePreference::Any, &SupportPolicy::default());
        assert!(empty.sources.is_empty());
        assert!(empty.duration_seconds.abs() < f64::EPSILON);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let descriptors = vec![
            source("1", "a", "applehttp", vec![]),
            source("2", "b", "applehttp", vec![]),
            source("3", "a", "mpegdash", vec![]),
        ];
        let preference = SourcePreference::Formats(strings(&["b", "a"]));
        let first = select_playable_sources(&descriptors, &preference, &SupportPolicy::default());
        let second = select_playable_sources(&descriptors, &preference, &SupportPolicy::default());

        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["2", "1", "3"]);
    }
}
