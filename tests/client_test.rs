use contentnet::base::clock::ManualClock;
use contentnet::cache::CacheManager;
use contentnet::transport::echo::{EchoTransport, ECHO_RESPONSE_CODE};
use contentnet::transport::mock::MockTransport;
use contentnet::transport::TransportResponse;
use contentnet::{Client, Content, ContentData, Headers, HttpResult, NetError, Single};
use http::Method;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;

fn echo_client(dir: &tempfile::TempDir) -> Client {
    Client::builder()
        .folder(dir.path())
        .transport(EchoTransport::new())
        .build()
}

fn mock_client(dir: &tempfile::TempDir, mock: Arc<MockTransport>) -> Client {
    Client::builder().folder(dir.path()).transport(mock).build()
}

fn text_headers() -> Headers {
    Headers::new().with("Content-Type", "text/plain")
}

#[tokio::test]
async fn test_status_classification() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    for code in [101u16, 204, 404, 500] {
        mock.respond(
            Method::GET,
            format!("http://api.test/status/{}", code),
            code,
            Headers::new(),
            "",
        );
    }
    let client = mock_client(&dir, mock.clone());

    for code in [101u16, 204] {
        let result = client.get(format!("http://api.test/status/{}", code)).await;
        assert!(result.is_success(), "{}", code);
        assert_eq!(result.code(), Some(code));
    }
    for code in [404u16, 500] {
        let result = client.get(format!("http://api.test/status/{}", code)).await;
        assert!(result.is_error(), "{}", code);
        assert_eq!(result.code(), Some(code));
    }

    let result = client.get("http://api.test/unknown").await;
    assert!(matches!(
        result.failure_or_none(),
        Some(NetError::NotMocked { .. })
    ));
    assert_eq!(mock.calls(), 4);
}

#[tokio::test]
async fn test_error_body_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let client = echo_client(&dir);

    let result = client
        .post(
            "http://echo.test/fail",
            Content::text("broken").with_header(ECHO_RESPONSE_CODE, "422"),
        )
        .await;
    match result {
        HttpResult::Error { code, body } => {
            assert_eq!(code, 422);
            assert_eq!(body.expect_data().unwrap().expect_text().unwrap(), "broken");
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[cfg(feature = "json")]
#[tokio::test]
async fn test_json_round_trip() {
    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct Note {
        id: u32,
        title: String,
    }

    let dir = tempfile::tempdir().unwrap();
    let note = Note {
        id: 7,
        title: "groceries".into(),
    };
    let data = echo_client(&dir)
        .put("http://echo.test/notes/7", Content::json(&note).unwrap())
        .await
        .success_or_none()
        .unwrap()
        .expect_data()
        .unwrap();
    assert_eq!(data.parse_json::<Note>().unwrap(), note);
}

#[tokio::test]
async fn test_mix_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let parts = vec![
        Single::new(ContentData::Text("first".into())).with_header("X-Index", "0"),
        Single::new(ContentData::Json("{\"n\":1}".into())).with_header("X-Index", "1"),
    ];

    let parts = echo_client(&dir)
        .post("http://echo.test/mix", Content::mix(parts))
        .await
        .success_or_none()
        .unwrap()
        .expect_mix()
        .unwrap();

    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].headers.get("X-Index"), Some("0"));
    assert_eq!(parts[0].headers.get("Content-Type"), Some("text/plain"));
    assert!(matches!(&parts[0].data, ContentData::Text(s) if s == "first"));
    assert!(matches!(&parts[1].data, ContentData::Json(s) if s == "{\"n\":1}"));
}

#[tokio::test]
async fn test_form_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let upload = dir.path().join("avatar.png");
    std::fs::write(&upload, [0x89u8, b'P', b'N', b'G', 0, 1, 2, 3]).unwrap();

    let mut fields = BTreeMap::new();
    fields.insert(
        "nickname".to_string(),
        Single::new(ContentData::Text("neo".into())),
    );
    fields.insert(
        "avatar".to_string(),
        Single::new(ContentData::Image {
            subtype: "png".into(),
            file: contentnet::io::folder::FileRef::new(&upload),
        }),
    );

    let mut parts = echo_client(&dir)
        .post("http://echo.test/profile", Content::form(fields))
        .await
        .success_or_none()
        .unwrap()
        .expect_form()
        .unwrap();

    let nickname = parts.remove("nickname").unwrap();
    assert_eq!(
        nickname.headers.get("Content-Disposition"),
        Some("form-data; name=\"nickname\"")
    );
    assert!(matches!(nickname.data, ContentData::Text(s) if s == "neo"));

    let avatar = parts.remove("avatar").unwrap();
    let disposition = avatar.headers.content_disposition().unwrap().unwrap();
    assert_eq!(disposition.filename(), Some("avatar.png"));
    match avatar.data {
        ContentData::Image { subtype, file } => {
            assert_eq!(subtype, "png");
            assert_eq!(file.read_bytes().unwrap(), std::fs::read(&upload).unwrap());
            assert!(file.path().starts_with(dir.path().join("files")));
        }
        other => panic!("expected image, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_form_part_without_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "http://api.test/form",
        200,
        Headers::new().with("Content-Type", "multipart/form-data; boundary=xyz"),
        "--xyz\r\nX-Other: 1\r\n\r\nvalue\r\n--xyz--",
    );

    let result = mock_client(&dir, mock).get("http://api.test/form").await;
    assert!(matches!(
        result.failure_or_none(),
        Some(NetError::MissingPartName)
    ));
}

#[tokio::test]
async fn test_multipart_without_boundary_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "http://api.test/mixed",
        200,
        Headers::new().with("Content-Type", "multipart/mixed"),
        "--xyz\r\nA: 1\r\n\r\nvalue\r\n--xyz--",
    );

    let result = mock_client(&dir, mock).get("http://api.test/mixed").await;
    assert!(matches!(
        result.failure_or_none(),
        Some(NetError::MissingBoundary)
    ));
}

#[tokio::test]
async fn test_cookies_are_stored_and_sent() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::POST,
        "http://api.test/login",
        204,
        Headers::new()
            .with("Set-Cookie", "sid=abc123; Max-Age=3600")
            .with("Set-Cookie", "theme=dark"),
        "",
    );
    mock.on(Method::GET, "http://api.test/me", |request| {
        let cookie = request.headers.get("Cookie").unwrap_or_default().to_string();
        Ok(TransportResponse::with_bytes(200, text_headers(), cookie))
    });

    let client = Client::builder()
        .folder(dir.path())
        .transport(mock)
        .cookie_file()
        .build();

    assert!(client.post("http://api.test/login", Content::empty()).await.is_success());
    let sent = client
        .get("http://api.test/me")
        .await
        .success_or_none()
        .unwrap()
        .expect_data()
        .unwrap()
        .expect_text()
        .unwrap();
    let mut pairs: Vec<&str> = sent.split("; ").collect();
    pairs.sort();
    assert_eq!(pairs, vec!["sid=abc123", "theme=dark"]);

    let persisted = std::fs::read_to_string(dir.path().join("cookies.cn")).unwrap();
    assert!(persisted.starts_with("sid;;abc123;;api.test"));
    assert!(!persisted.contains("theme"));
}

#[tokio::test]
async fn test_disk_cache_through_client() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "http://api.test/motd",
        200,
        text_headers().with("Cache-Control", "max-age=60"),
        "hello",
    );
    let clock = ManualClock::new(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap());

    let client = Client::builder()
        .folder(dir.path())
        .transport(mock.clone())
        .clock(Arc::new(clock.clone()))
        .disk_cache()
        .build();

    for _ in 0..3 {
        let text = client
            .get("http://api.test/motd")
            .await
            .success_or_none()
            .unwrap()
            .expect_data()
            .unwrap()
            .expect_text()
            .unwrap();
        assert_eq!(text, "hello");
    }
    assert_eq!(mock.calls(), 1);

    clock.advance(time::Duration::seconds(60));
    client.get("http://api.test/motd").await;
    assert_eq!(mock.calls(), 2);

    client.cache().unwrap().clear().unwrap();
    assert!(!dir.path().join("cache").exists());
}

#[tokio::test]
async fn test_unknown_type_keeps_raw_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Method::GET,
        "http://api.test/blob",
        200,
        Headers::new().with("Content-Type", "application/x-custom"),
        "raw",
    );

    let data = mock_client(&dir, mock)
        .get("http://api.test/blob")
        .await
        .success_or_none()
        .unwrap()
        .expect_data()
        .unwrap();
    match data {
        ContentData::Other {
            content_type,
            mut source,
        } => {
            assert_eq!(content_type.to_string(), "application/x-custom");
            assert_eq!(contentnet::io::read_to_string(source.as_mut()).unwrap(), "raw");
        }
        other => panic!("expected raw bytes, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_default_headers_are_not_duplicated() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::GET, "http://api.test/agent", |request| {
        let agents: Vec<&str> = request.headers.get_all("User-Agent").collect();
        let encodings: Vec<&str> = request.headers.get_all("Accept-Encoding").collect();
        let seen = format!("{}|{}", agents.join(","), encodings.join(","));
        Ok(TransportResponse::with_bytes(200, text_headers(), seen))
    });
    let client = mock_client(&dir, mock);
    let seen = |content: Content| {
        let client = client.clone();
        async move {
            client
                .launch(Method::GET, "http://api.test/agent", content)
                .await
                .success_or_none()
                .unwrap()
                .expect_data()
                .unwrap()
                .expect_text()
                .unwrap()
        }
    };

    let defaults = seen(Content::empty()).await;
    assert_eq!(defaults, format!("contentnet/{}|gzip", env!("CARGO_PKG_VERSION")));

    let custom = seen(
        Content::empty()
            .with_header("User-Agent", "custom-agent/1")
            .with_header("Accept-Encoding", "identity"),
    )
    .await;
    assert_eq!(custom, "custom-agent/1|identity");
}

#[tokio::test]
async fn test_unknown_type_header_is_echoed_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockTransport::new());
    let header = "application/x-custom;charset=\"utf-8\"";
    mock.respond(
        Method::GET,
        "http://api.test/raw",
        200,
        Headers::new().with("Content-Type", header),
        "raw",
    );
    let client = mock_client(&dir, mock);

    let data = client
        .get("http://api.test/raw")
        .await
        .success_or_none()
        .unwrap()
        .expect_data()
        .unwrap();
    assert_eq!(data.content_type().to_string(), header);

    let echoed = echo_client(&dir)
        .post("http://echo.test/raw", Content::single(data))
        .await
        .success_or_none()
        .unwrap();
    assert_eq!(echoed.headers().get("Content-Type"), Some(header));
}
