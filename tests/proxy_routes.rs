//! Route-level tests driven through the full middleware stack against a
//! fake upstream.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::body::Body;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tower::ServiceExt;

use iwara_proxy::upstream::{BodyMode, UpstreamError};

mod common;
use common::{app, body_bytes, body_json, get, test_config, FakeUpstream};

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

#[tokio::test]
async fn test_view_without_url_is_bad_request() {
    let upstream = FakeUpstream::with_body(200, "video/mp4", "");
    let res = app(test_config(), upstream.clone())
        .oneshot(get("/view"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(res.into_body()).await["error"].is_string());
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_view_foreign_host_is_forbidden() {
    let upstream = FakeUpstream::with_body(200, "video/mp4", "");
    let app = app(test_config(), upstream.clone());

    for url in [
        "https%3A%2F%2Fevil.example.com%2Fx",
        "ftp%3A%2F%2Fabc.iwara.tv%2Fvideo.mp4",
        "https%3A%2F%2Fiwara.tv.evil.com%2Fvideo.mp4",
    ] {
        let res = app
            .clone()
            .oneshot(get(&format!("/view?url={url}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{url}");
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_view_streams_allowed_host() {
    let upstream = FakeUpstream::new(|_| {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("10"));
        headers.insert(header::CONTENT_RANGE, HeaderValue::from_static("bytes 0-9/2048"));
        Ok(common::streamed(206, headers, vec![&b"01234"[..], &b"56789"[..]]))
    });

    let request = Request::builder()
        .uri("/view?url=https%3A%2F%2Fabc.iwara.tv%2Fvideo.mp4%3Ffilename%3Dclip.mp4")
        .header(header::RANGE, "bytes=0-9")
        .body(Body::empty())
        .unwrap();
    let res = app(test_config(), upstream.clone()).oneshot(request).await.unwrap();

    assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
    let headers = res.headers();
    assert!(headers.get(header::CONTENT_ENCODING).is_none());
    assert!(headers.get(header::TRANSFER_ENCODING).is_none());
    assert!(headers.get(header::CONNECTION).is_none());
    assert_eq!(headers[header::CONTENT_LENGTH], "10");
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 0-9/2048");
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(body_bytes(res.into_body()).await, "0123456789");

    let sent = upstream.last_request();
    assert_eq!(sent.url, "https://abc.iwara.tv/video.mp4?filename=clip.mp4");
    assert_eq!(sent.mode, BodyMode::Streamed);
    assert_eq!(sent.headers[header::RANGE], "bytes=0-9");
    assert_eq!(sent.timeout.as_secs(), 15);
}

#[tokio::test]
async fn test_view_transport_error_is_500() {
    let upstream = FakeUpstream::failing("dns error: no such host");
    let res = app(test_config(), upstream)
        .oneshot(get("/view?url=https://abc.iwara.tv/video.mp4"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(res.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("dns error"));
}

#[tokio::test]
async fn test_api_json_passthrough() {
    let upstream = FakeUpstream::with_body(200, "application/json", r#"{"id":1}"#);
    let res = app(test_config(), upstream.clone())
        .oneshot(get("/videos?rating=all&page=0"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res.into_body()).await, serde_json::json!({"id": 1}));

    let sent = upstream.last_request();
    assert_eq!(sent.url, "https://api.iwara.tv/videos?rating=all&page=0");
    assert_eq!(sent.mode, BodyMode::Buffered);
}

#[tokio::test]
async fn test_api_status_is_preserved() {
    let upstream = FakeUpstream::with_body(404, "application/json", r#"{"message":"errors.notFound"}"#);
    let res = app(test_config(), upstream.clone())
        .oneshot(get("/video/AbCd1234"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res.into_body()).await["message"], "errors.notFound");
    assert_eq!(upstream.last_request().url, "https://api.iwara.tv/video/AbCd1234");
}

#[tokio::test]
async fn test_api_malformed_json_is_500() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{\"id\":");
    let res = app(test_config(), upstream)
        .oneshot(get("/videos"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(res.into_body()).await["error"].is_string());
}

#[tokio::test]
async fn test_file_route_copies_raw_body() {
    let upstream = FakeUpstream::with_body(200, "text/plain; charset=utf-8", "raw file listing");
    let res = app(test_config(), upstream.clone())
        .oneshot(get("/file/abc123?download=1"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(body_bytes(res.into_body()).await, "raw file listing");
    assert_eq!(
        upstream.last_request().url,
        "https://files.iwara.tv/file/abc123?download=1"
    );
}

#[tokio::test]
async fn test_upstream_timeout_is_500() {
    let upstream = FakeUpstream::new(|r| Err(UpstreamError::Timeout(r.timeout)));
    let res = app(test_config(), upstream)
        .oneshot(get("/videos"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(res.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_customized_token_overrides_default() {
    let mut config = test_config();
    config.credentials.default_token = "server-token".into();
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");

    let request = Request::builder()
        .uri("/videos")
        .header("CustomizedToken", "caller-token")
        .header(header::AUTHORIZATION, "Bearer forged")
        .body(Body::empty())
        .unwrap();
    app(config, upstream.clone()).oneshot(request).await.unwrap();

    let sent = upstream.last_request();
    assert_eq!(sent.headers[header::AUTHORIZATION], "Bearer caller-token");
    assert!(sent.headers.get("customizedtoken").is_none());
}

#[tokio::test]
async fn test_default_token_is_injected() {
    let mut config = test_config();
    config.credentials.default_token = "Bearer server-token".into();
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");

    app(config, upstream.clone()).oneshot(get("/videos")).await.unwrap();
    assert_eq!(
        upstream.last_request().headers[header::AUTHORIZATION],
        "Bearer server-token"
    );
}

#[tokio::test]
async fn test_no_credential_sends_no_authorization() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let request = Request::builder()
        .uri("/videos")
        .header(header::AUTHORIZATION, "Bearer forged")
        .header(header::COOKIE, "session=1")
        .header("x-version", "v1")
        .body(Body::empty())
        .unwrap();
    app(test_config(), upstream.clone()).oneshot(request).await.unwrap();

    let sent = upstream.last_request().headers;
    assert!(sent.get(header::AUTHORIZATION).is_none());
    assert!(sent.get(header::COOKIE).is_none());
    assert_eq!(sent["x-version"], "v1");
    assert_eq!(sent[header::ACCEPT], "*/*");
    assert!(sent.get(header::USER_AGENT).is_some());
}

#[tokio::test]
async fn test_token_status_not_configured() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(test_config(), upstream).oneshot(get("/token-status")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(res.headers()[header::RETRY_AFTER], "86400");
}

#[tokio::test]
async fn test_token_status_expired() {
    let mut config = test_config();
    config.credentials.default_token = common::token_with_exp(now() - 60);
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(config, upstream).oneshot(get("/token-status")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res.into_body()).await;
    assert_eq!(json["code"], "backend_token_expired");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_token_status_valid() {
    let mut config = test_config();
    config.credentials.default_token = format!("Bearer {}", common::token_with_exp(now() + 3600));
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(config, upstream).oneshot(get("/token-status")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.headers().get(header::RETRY_AFTER).is_none());
}

#[tokio::test]
async fn test_token_status_garbage_is_expired() {
    let mut config = test_config();
    config.credentials.default_token = "definitely-not-a-jwt".into();
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(config, upstream).oneshot(get("/token-status")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

fn gated_config() -> iwara_proxy::ProxyConfig {
    let mut config = test_config();
    config.auth.basic_user = "admin".into();
    config.auth.basic_pass = "s3cret".into();
    config
}

fn with_basic(uri: &str, credentials: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode(credentials)),
        )
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_gate_rejects_missing_credentials() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let app = app(gated_config(), upstream.clone());

    for uri in ["/", "/videos", "/token-status", "/no-such-route"] {
        let res = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert!(res.headers()[header::WWW_AUTHENTICATE]
            .to_str()
            .unwrap()
            .starts_with("Basic"));
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_gate_rejects_wrong_password() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(gated_config(), upstream.clone())
        .oneshot(with_basic("/videos", "admin:s3creT"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::WWW_AUTHENTICATE).is_some());
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_gate_admits_correct_credentials() {
    let upstream = FakeUpstream::with_body(200, "application/json", r#"{"ok":true}"#);
    let res = app(gated_config(), upstream.clone())
        .oneshot(with_basic("/videos", "admin:s3cret"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(upstream.calls(), 1);
    // The gate's Basic credentials never reach the upstream.
    assert!(upstream.last_request().headers.get(header::AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(test_config(), upstream).oneshot(get("/nope")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(res.into_body()).await["error"], "route not found");
}

#[tokio::test]
async fn test_landing_page_fallback() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(test_config(), upstream).oneshot(get("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(body_bytes(res.into_body()).await, "<h1>Loading...</h1>");
}

#[tokio::test]
async fn test_landing_page_from_file() {
    let path = std::env::temp_dir().join(format!("iwara-proxy-index-{}.html", std::process::id()));
    std::fs::write(&path, "<h1>Iwara</h1>").unwrap();

    let mut config = test_config();
    config.site.index_path = path.to_string_lossy().into_owned();
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let res = app(config, upstream).oneshot(get("/")).await.unwrap();

    assert_eq!(body_bytes(res.into_body()).await, "<h1>Iwara</h1>");
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_request_id_is_assigned_and_echoed() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let app = app(test_config(), upstream);

    let res = app.clone().oneshot(get("/token-status")).await.unwrap();
    assert!(res.headers().get("x-request-id").is_some());

    let request = Request::builder()
        .uri("/token-status")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(request).await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn test_non_get_method_is_rejected() {
    let upstream = FakeUpstream::with_body(200, "application/json", "{}");
    let request = Request::builder()
        .method("POST")
        .uri("/videos")
        .body(Body::empty())
        .unwrap();
    let res = app(test_config(), upstream.clone()).oneshot(request).await.unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(upstream.calls(), 0);
}
