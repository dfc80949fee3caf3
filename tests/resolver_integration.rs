//! Integration tests for metadata-API-backed source resolution.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mote_core::{ResolveError, SourceDescriptor, build_default_registry};

fn emote_descriptor(id: &str) -> SourceDescriptor {
    SourceDescriptor::classify(&format!("https://7tv.app/emotes/{id}")).unwrap()
}

fn metadata_body(id: &str, name: &str, animated: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "animated": animated,
        "host": {
            "url": format!("//cdn.7tv.app/emote/{id}"),
            "files": [
                {"name": "1x.webp", "format": "WEBP", "size": 9_000},
                {"name": "2x.webp", "format": "WEBP", "size": 28_000},
                {"name": "4x.webp", "format": "WEBP", "size": 120_000},
                {"name": "4x.avif", "format": "AVIF", "size": 60_000},
            ],
        },
    })
}

// ---- Integration test: emote page URL resolves through the metadata API ----

#[tokio::test]
async fn test_emote_page_resolves_to_ordered_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emotes/6042089e77137b000de9e669"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(metadata_body("6042089e77137b000de9e669", "pepeLaugh", true)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = build_default_registry(&format!("{}/emotes", server.uri()));
    let asset = registry
        .resolve(&emote_descriptor("6042089e77137b000de9e669"), None)
        .await
        .unwrap();

    assert_eq!(asset.name, "pepeLaugh");
    assert!(asset.animated);
    assert_eq!(asset.source_id.as_deref(), Some("6042089e77137b000de9e669"));

    // Largest first, AVIF variant excluded, animated assets point at GIFs.
    let sizes: Vec<u64> = asset.candidates.iter().filter_map(|c| c.declared_size).collect();
    assert_eq!(sizes, vec![120_000, 28_000, 9_000]);
    assert!(asset.candidates.iter().all(|c| c.url.ends_with(".gif")));
    assert!(
        asset.candidates[0]
            .url
            .starts_with("https://cdn.7tv.app/emote/6042089e77137b000de9e669/")
    );
}

#[tokio::test]
async fn test_suggested_name_overrides_declared_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emotes/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body("abc", "orig", false)))
        .mount(&server)
        .await;

    let registry = build_default_registry(&format!("{}/emotes", server.uri()));
    let asset = registry
        .resolve(&emote_descriptor("abc"), Some("renamed"))
        .await
        .unwrap();

    assert_eq!(asset.name, "renamed");
    assert!(asset.candidates.iter().all(|c| c.url.ends_with(".png")));
}

// ---- Integration test: remote failures surface as resolution errors ----

#[tokio::test]
async fn test_unknown_emote_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let registry = build_default_registry(&format!("{}/emotes", server.uri()));
    let err = registry
        .resolve(&emote_descriptor("nope"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::NotFound { status: 404, .. }));
}

#[tokio::test]
async fn test_metadata_without_webp_variants_is_rejected() {
    let server = MockServer::start().await;
    let body = json!({
        "id": "abc",
        "name": "pepeLaugh",
        "animated": false,
        "host": {
            "url": "//cdn.7tv.app/emote/abc",
            "files": [{"name": "4x.avif", "format": "AVIF", "size": 60_000}],
        },
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let registry = build_default_registry(&format!("{}/emotes", server.uri()));
    let err = registry
        .resolve(&emote_descriptor("abc"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::NoSuitableVariant { .. }));
}

// ---- Integration test: non-API sources dispatch without any network ----

#[tokio::test]
async fn test_cdn_url_resolves_to_size_ladder_offline() {
    let registry = build_default_registry("http://127.0.0.1:1/emotes");
    let descriptor =
        SourceDescriptor::classify("https://cdn.7tv.app/emote/6042089e77137b000de9e669/2x.webp")
            .unwrap();

    let asset = registry.resolve(&descriptor, Some("pepeLaugh")).await.unwrap();

    assert_eq!(asset.name, "pepeLaugh");
    let urls: Vec<&str> = asset.candidates.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://cdn.7tv.app/emote/6042089e77137b000de9e669/4x.webp",
            "https://cdn.7tv.app/emote/6042089e77137b000de9e669/3x.webp",
            "https://cdn.7tv.app/emote/6042089e77137b000de9e669/2x.webp",
            "https://cdn.7tv.app/emote/6042089e77137b000de9e669/1x.webp",
        ]
    );
}

#[tokio::test]
async fn test_attachment_requires_a_name() {
    let registry = build_default_registry("http://127.0.0.1:1/emotes");
    let descriptor =
        SourceDescriptor::classify("https://cdn.discordapp.com/attachments/1/2/pepe.png").unwrap();

    let err = registry.resolve(&descriptor, None).await.unwrap_err();
    assert!(matches!(err, ResolveError::MissingName { .. }));

    let asset = registry.resolve(&descriptor, Some("pepe_png")).await.unwrap();
    assert_eq!(asset.candidates.len(), 1);
    assert!(!asset.animated);
}
