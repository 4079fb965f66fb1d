//! Audio proxy and static file server.
//!
//! `GET /audio/surah/:number` walks the configured mirror list in order and
//! streams the first acceptable upstream response straight through, so the
//! player never has to talk to the mirrors itself. Every other path is served
//! from the static root.
//!
//! Design notes
//! ─────────────
//! • Each request opens its own upstream connection; the only shared state is
//!   the immutable mirror list and one `reqwest::Client`.
//! • The per-mirror timeout covers connect + headers. Once a mirror answers,
//!   the body streams for as long as it takes.
//! • CORS headers are added to every response by a middleware, which also
//!   answers `OPTIONS` preflights itself.
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::TryStreamExt;
use reqwest::Client;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use quran_core::config::ProxyConfig;
use quran_core::error::PlayerError;
use quran_core::model::is_valid_chapter;
use quran_core::prober::{probe_in_order, render_mirror};

const DEFAULT_AUDIO_TYPE: &str = "audio/mpeg";
const AUDIO_CACHE_CONTROL: &str = "public, max-age=86400";

// ── Shared state ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ProxyState {
    client: Client,
    mirrors: Arc<Vec<String>>,
    static_root: Arc<PathBuf>,
    mirror_timeout: Duration,
}

impl ProxyState {
    pub fn new(client: Client, mirrors: Vec<String>, static_root: PathBuf, mirror_timeout: Duration) -> Self {
        Self {
            client,
            mirrors: Arc::new(mirrors),
            static_root: Arc::new(static_root),
            mirror_timeout,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            // Some mirrors redirect to a CDN node
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build reqwest client for proxy")?;
        Ok(Self::new(
            client,
            config.mirrors.clone(),
            config.static_root.clone(),
            Duration::from_secs(config.mirror_timeout_secs),
        ))
    }
}

// ── Audio route ───────────────────────────────────────────────────────────────

/// Digits only, within 1..=114.
fn parse_chapter(raw: &str) -> Option<u16> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u16>().ok().filter(|n| is_valid_chapter(*n))
}

fn is_audio_content_type(content_type: &str) -> bool {
    content_type.contains("audio") || content_type.contains("octet-stream")
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Open `url` and accept it only if it answers 200 with an audio body.
async fn fetch_upstream(client: &Client, url: String, timeout: Duration) -> anyhow::Result<reqwest::Response> {
    debug!("proxy: trying {}", url);
    let response = match tokio::time::timeout(timeout, client.get(&url).send()).await {
        Ok(sent) => sent.with_context(|| format!("fetch failed for {}", url))?,
        Err(_) => bail!("timeout fetching audio from {}", url),
    };

    if response.status() != reqwest::StatusCode::OK {
        bail!("HTTP {} from {}", response.status().as_u16(), url);
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !is_audio_content_type(content_type) {
        bail!("invalid content-type: {}", content_type);
    }
    Ok(response)
}

async fn surah_audio(Path(raw): Path<String>, State(state): State<ProxyState>) -> Response {
    let Some(chapter) = parse_chapter(&raw) else {
        warn!("proxy: rejected surah number {:?}", raw);
        return json_error(StatusCode::BAD_REQUEST, "Invalid surah number");
    };

    info!("proxy: GET /audio/surah/{}", chapter);
    let urls: Vec<String> = state
        .mirrors
        .iter()
        .map(|template| render_mirror(template, chapter))
        .collect();
    let client = &state.client;
    let timeout = state.mirror_timeout;

    let upstream = match probe_in_order(urls, move |_, url| fetch_upstream(client, url, timeout)).await {
        Ok(probed) => probed.value,
        Err(exhausted) => {
            let err = PlayerError::ProxyExhausted { chapter };
            error!(
                "proxy: {} after {} mirrors (last: {})",
                err,
                exhausted.tried,
                exhausted.last_error.as_deref().unwrap_or("none")
            );
            return json_error(StatusCode::SERVICE_UNAVAILABLE, err.to_string());
        }
    };
    info!("proxy: surah {} streaming from {}", chapter, upstream.url());

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        upstream
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_AUDIO_TYPE)),
    );
    if let Some(len) = upstream.headers().get(CONTENT_LENGTH) {
        headers.insert(CONTENT_LENGTH, len.clone());
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(AUDIO_CACHE_CONTROL));

    // Stream bytes from upstream directly to the client
    let body = Body::from_stream(
        upstream
            .bytes_stream()
            .inspect_err(move |e| warn!("proxy: surah {} upstream broke mid-stream: {}", chapter, e)),
    );

    (StatusCode::OK, headers, body).into_response()
}

// ── Static files ──────────────────────────────────────────────────────────────

/// Map a request path onto the static root. `None` for paths that try to
/// leave it.
fn resolve_static_path(root: &FsPath, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return Some(root.join("index.html"));
    }
    let mut out = root.to_path_buf();
    for part in relative.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            p if p.contains('\\') => return None,
            p => out.push(p),
        }
    }
    Some(out)
}

fn content_type_for(path: &FsPath) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "text/plain")],
        "404 Not Found",
    )
        .into_response()
}

async fn static_file(State(state): State<ProxyState>, uri: Uri) -> Response {
    let Some(path) = resolve_static_path(&state.static_root, uri.path()) else {
        warn!("proxy: refused static path {}", uri.path());
        return not_found();
    };
    match tokio::fs::read(&path).await {
        Ok(content) => ([(CONTENT_TYPE, content_type_for(&path))], content).into_response(),
        Err(e) => {
            debug!("proxy: static {} unavailable: {}", path.display(), e);
            not_found()
        }
    }
}

// ── CORS ──────────────────────────────────────────────────────────────────────

async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, HEAD, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

// ── Server startup ────────────────────────────────────────────────────────────

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/audio/surah/:number", get(surah_audio))
        .fallback(static_file)
        .with_state(state)
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
}

/// Bind `bind_address:port` and serve until the listener fails.
pub async fn serve(bind_address: &str, port: u16, state: ProxyState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", bind_address, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind proxy on {}", addr))?;
    info!("Audio proxy listening on http://{}", addr);
    info!("Audio route: http://{}/audio/surah/:number", addr);
    axum::serve(listener, router(state))
        .await
        .context("proxy server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Request as HttpRequest;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const MP3: &[u8] = b"ID3\x04\x00fake-mp3-bytes";

    /// Upstream with one route per failure mode.
    async fn mock_upstream(hits: Arc<AtomicUsize>) -> SocketAddr {
        let app = Router::new()
            .route(
                "/ok/:file",
                get(|| async { ([(CONTENT_TYPE, "audio/mpeg")], MP3) }),
            )
            .route(
                "/octet/:file",
                get(|| async { ([(CONTENT_TYPE, "application/octet-stream")], MP3) }),
            )
            .route(
                "/html/:file",
                get(|| async { ([(CONTENT_TYPE, "text/html")], "<html>mirror parking page</html>") }),
            )
            .route(
                "/chunked/:file",
                get(|| async {
                    let chunks = (0..64u8).map(|i| Ok::<_, std::io::Error>(vec![i; 4096]));
                    (
                        [(CONTENT_TYPE, "audio/mpeg")],
                        Body::from_stream(futures_util::stream::iter(chunks)),
                    )
                }),
            )
            .route(
                "/slow/:file",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    ([(CONTENT_TYPE, "audio/mpeg")], MP3)
                }),
            )
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(middleware::from_fn(move |req: Request, next: Next| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    next.run(req).await
                }
            }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn state(mirrors: Vec<String>, root: PathBuf) -> ProxyState {
        ProxyState::new(Client::new(), mirrors, root, Duration::from_millis(300))
    }

    fn mirror(addr: SocketAddr, kind: &str) -> String {
        format!("http://{}/{}/{{num}}.mp3", addr, kind)
    }

    async fn get_path(app: Router, path: &str) -> Response {
        app.oneshot(HttpRequest::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn chapter_numbers_parse_strictly() {
        assert_eq!(parse_chapter("1"), Some(1));
        assert_eq!(parse_chapter("114"), Some(114));
        assert_eq!(parse_chapter("007"), Some(7));
        for bad in ["0", "115", "abc", "12abc", "", "-1", "+5", "99999999"] {
            assert_eq!(parse_chapter(bad), None, "{:?}", bad);
        }
    }

    #[tokio::test]
    async fn invalid_numbers_are_rejected_without_touching_mirrors() {
        let hits = Arc::new(AtomicUsize::new(0));
        let upstream = mock_upstream(hits.clone()).await;
        for path in ["/audio/surah/0", "/audio/surah/115", "/audio/surah/abc"] {
            let app = router(state(vec![mirror(upstream, "ok")], PathBuf::from(".")));
            let response = get_path(app, path).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
                "*"
            );
            assert_eq!(body_string(response).await, r#"{"error":"Invalid surah number"}"#);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_acceptable_mirror_is_streamed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let upstream = mock_upstream(hits.clone()).await;
        let mirrors = vec![
            mirror(upstream, "missing"),
            mirror(upstream, "html"),
            mirror(upstream, "ok"),
            mirror(upstream, "octet"),
        ];
        let app = router(state(mirrors, PathBuf::from(".")));
        let response = get_path(app, "/audio/surah/2").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "audio/mpeg");
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "public, max-age=86400"
        );
        assert_eq!(
            response.headers().get(CONTENT_LENGTH).unwrap(),
            MP3.len().to_string().as_str()
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], MP3);
        // the fourth mirror was never contacted
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn chunked_upstream_arrives_intact() {
        let upstream = mock_upstream(Arc::new(AtomicUsize::new(0))).await;
        let app = router(state(vec![mirror(upstream, "chunked")], PathBuf::from(".")));
        let response = get_path(app, "/audio/surah/18").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(CONTENT_LENGTH).is_none());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.len(), 64 * 4096);
        for (i, chunk) in bytes.chunks(4096).enumerate() {
            assert!(chunk.iter().all(|&b| b as usize == i), "chunk {} reordered", i);
        }
    }

    #[tokio::test]
    async fn slow_mirror_is_abandoned() {
        let upstream = mock_upstream(Arc::new(AtomicUsize::new(0))).await;
        let app = router(state(
            vec![mirror(upstream, "slow"), mirror(upstream, "octet")],
            PathBuf::from("."),
        ));
        let response = get_path(app, "/audio/surah/114").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn exhausted_mirrors_answer_503() {
        let upstream = mock_upstream(Arc::new(AtomicUsize::new(0))).await;
        let app = router(state(
            vec![mirror(upstream, "missing"), mirror(upstream, "html")],
            PathBuf::from("."),
        ));
        let response = get_path(app, "/audio/surah/5").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"All audio sources failed for Surah 5"}"#
        );
    }

    #[tokio::test]
    async fn static_files_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>player</h1>").unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
        std::fs::write(dir.path().join("secret.txt"), "nope").unwrap();
        let root = dir.path().join("site");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("index.html"), "<h1>site</h1>").unwrap();
        std::fs::write(root.join("app.js"), "run()").unwrap();

        let app = router(state(vec![], root.clone()));

        let index = get_path(app.clone(), "/").await;
        assert_eq!(index.status(), StatusCode::OK);
        assert_eq!(
            index.headers().get(CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(body_string(index).await, "<h1>site</h1>");

        let js = get_path(app.clone(), "/app.js").await;
        assert_eq!(
            js.headers().get(CONTENT_TYPE).unwrap(),
            "application/javascript; charset=utf-8"
        );

        let missing = get_path(app.clone(), "/nope.html").await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.headers().get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(body_string(missing).await, "404 Not Found");

        let escape = get_path(app.clone(), "/../secret.txt").await;
        assert_eq!(escape.status(), StatusCode::NOT_FOUND);

        let bare = get_path(app, "/audio/surah/").await;
        assert_eq!(bare.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn options_is_answered_with_cors_headers() {
        let app = router(state(vec![], PathBuf::from(".")));
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method(Method::OPTIONS)
                    .uri("/audio/surah/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, HEAD, OPTIONS"
        );
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Content-Type"
        );
        assert!(body_string(response).await.is_empty());
    }

    #[test]
    fn static_paths_stay_inside_the_root() {
        let root = FsPath::new("/srv/www");
        assert_eq!(resolve_static_path(root, "/"), Some(root.join("index.html")));
        assert_eq!(
            resolve_static_path(root, "/css/./main.css"),
            Some(root.join("css").join("main.css"))
        );
        assert_eq!(resolve_static_path(root, "/a/../../etc/passwd"), None);
        assert_eq!(content_type_for(FsPath::new("x.json")), "application/json; charset=utf-8");
        assert_eq!(content_type_for(FsPath::new("x.mp3")), "application/octet-stream");
    }
}
