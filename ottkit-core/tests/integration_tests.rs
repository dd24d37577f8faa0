//! Integration tests for ottkit-core media resolution
//!
//! Drive `PhoenixMediaProvider` through the real `HttpExecutor` against a
//! mock Phoenix backend.
//!
//! Run with: cargo test --test integration_tests

use std::sync::Arc;

use ottkit_client::phoenix::request::{API_VERSION, CLIENT_TAG};
use ottkit_client::{AssetType, ClientError, HttpExecutor, PlaybackContextType};
use ottkit_core::provider::{
    AnonymousSession, DrmScheme, MediaFormat, MediaProvider, MediaProviderConfig,
    PhoenixMediaProvider, ResolveError,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn playback_context() -> Value {
    json!({
        "objectType": "KalturaPlaybackContext",
        "sources": [
            {
                "objectType": "KalturaPlaybackSource",
                "id": 542,
                "type": "Mobile_Devices_Main_SD",
                "format": "mpegdash",
                "url": "https://cdn.example.com/542/manifest.mpd",
                "duration": 3600,
                "drm": [
                    {"scheme": "WIDEVINE_CENC", "licenseURL": "https://lic.example.com/wv"},
                    {"scheme": "PLAYREADY_CENC", "licenseURL": "https://lic.example.com/pr"}
                ]
            },
            {
                "objectType": "KalturaPlaybackSource",
                "id": 543,
                "type": "Mobile_Devices_Main_HD",
                "format": "applehttp",
                "url": "https://cdn.example.com/543/master.m3u8",
                "duration": 3600.5,
                "drm": [{"scheme": "FAIRPLAY", "licenseURL": "https://lic.example.com/fps"}]
            },
            {
                "objectType": "KalturaPlaybackSource",
                "id": 544,
                "type": "Mobile_Devices_Main_HD",
                "format": "url",
                "url": "https://cdn.example.com/544/video.mp4",
                "duration": 3600,
                "drm": null
            }
        ],
        "actions": [],
        "messages": [{"objectType": "KalturaAccessControlMessage", "code": "OK", "message": "OK"}]
    })
}

async fn mount(server: &MockServer, route: &str, expected_body: Value, response: Value) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(body_partial_json(expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(server)
        .await;
}

fn config(server: &MockServer) -> MediaProviderConfig {
    MediaProviderConfig {
        base_url: Some(format!("{}/api_v3", server.uri())),
        partner_id: Some(198),
        asset_id: Some("259".to_string()),
        asset_type: AssetType::Media,
        context_type: PlaybackContextType::Playback,
        formats: Some(vec![
            "Mobile_Devices_Main_HD".to_string(),
            "Mobile_Devices_Main_SD".to_string(),
        ]),
        ..MediaProviderConfig::default()
    }
}

fn provider() -> PhoenixMediaProvider {
    PhoenixMediaProvider::new(Arc::new(HttpExecutor::new()))
}

#[tokio::test]
async fn test_single_call_with_session_token() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api_v3/service/asset/action/getPlaybackContext",
        json!({
            "ks": "user-ks",
            "assetId": "259",
            "assetType": "media",
            "clientTag": CLIENT_TAG,
            "apiVersion": API_VERSION,
            "contextDataParams": {
                "objectType": "KalturaPlaybackContextOptions",
                "context": "PLAYBACK",
                "mediaProtocols": ["https"]
            }
        }),
        json!({"executionTime": 0.05, "result": playback_context()}),
    )
    .await;

    let config = MediaProviderConfig {
        ks: Some("user-ks".to_string()),
        ..config(&server)
    };
    let description = provider()
        .load_media(&config, &CancellationToken::new())
        .await
        .unwrap();

    // 543 declares FairPlay without a certificate
    let ids: Vec<_> = description.sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["544", "542"]);
    assert_eq!(description.sources[0].media_format, MediaFormat::Mp4);
    assert!(description.sources[0].drm.is_none());

    let dash = &description.sources[1];
    assert_eq!(dash.media_format, MediaFormat::Dash);
    let schemes: Vec<_> = dash.drm.as_ref().unwrap().iter().map(|d| d.scheme()).collect();
    assert_eq!(schemes, vec![DrmScheme::WidevineCenc, DrmScheme::PlayreadyCenc]);
    assert!((description.duration_seconds - 3600.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_batched_anonymous_login() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api_v3/service/multirequest",
        json!({
            "1": {"service": "ottUser", "action": "anonymousLogin", "partnerId": 198},
            "2": {"service": "asset", "action": "getPlaybackContext", "ks": "{1:result:ks}", "assetId": "259"},
            "clientTag": CLIENT_TAG
        }),
        json!({"result": [
            {"objectType": "KalturaLoginSession", "ks": "anon-ks", "expiry": 1_700_000_000},
            playback_context()
        ]}),
    )
    .await;

    let description = provider()
        .load_media(&config(&server), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(description.asset_id, "259");
    assert_eq!(description.sources.len(), 2);
}

#[tokio::test]
async fn test_batched_session_expired() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api_v3/service/multirequest",
        json!({"1": {"action": "anonymousLogin"}}),
        json!({"result": [
            {"objectType": "KalturaLoginSession", "ks": "anon-ks"},
            {"objectType": "KalturaAPIException", "code": "500016", "message": "KS expired"}
        ]}),
    )
    .await;

    let err = provider()
        .load_media(&config(&server), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::SessionExpired(_)));
    assert_eq!(err.code(), Some(3));
}

#[tokio::test]
async fn test_http_failure_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = provider()
        .load_media(&config(&server), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Transport(ClientError::Http { .. })));
}

#[tokio::test]
async fn test_empty_body_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = provider()
        .load_media(&config(&server), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::EmptyResponse));
}

#[tokio::test]
async fn test_anonymous_session_fetch() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/api_v3/service/ottUser/action/anonymousLogin",
        json!({"partnerId": 198, "udid": "device-1"}),
        json!({"result": {"objectType": "KalturaLoginSession", "ks": "anon-ks", "refreshToken": "r"}}),
    )
    .await;

    let executor = HttpExecutor::new();
    let base_url = format!("{}/api_v3", server.uri());
    let session = AnonymousSession::fetch(&executor, &base_url, 198, Some("device-1"))
        .await
        .unwrap();

    assert_eq!(session.token, "anon-ks");
    assert_eq!(session.device_id.as_deref(), Some("device-1"));
}
