//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::blog::FilterState;
use crate::content::{ContentError, ContentRepository};
use crate::generator::Generator;
use crate::helpers::url_for;
use crate::Site;

/// Shared server state
pub struct ServerState {
    site: Site,
    generator: Generator,
    repo: RwLock<Arc<ContentRepository>>,
    reload_tx: broadcast::Sender<()>,
}

impl ServerState {
    /// Load the site content; pages carry the live-reload client when `live_reload` is set
    pub fn new(site: &Site, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            site: site.clone(),
            generator: Generator::new(site)?.with_livereload(live_reload),
            repo: RwLock::new(Arc::new(site.load_content()?)),
            reload_tx,
        })
    }

    /// Current content snapshot; the lock is released before returning
    pub fn repo(&self) -> Arc<ContentRepository> {
        match self.repo.read() {
            Ok(repo) => repo.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rebuild the content, regenerate the public directory and notify clients
    pub fn reload(&self) -> Result<()> {
        let repo = Arc::new(self.site.load_content()?);
        Generator::new(&self.site)?.generate(&repo)?;

        match self.repo.write() {
            Ok(mut current) => *current = repo,
            Err(poisoned) => *poisoned.into_inner() = repo,
        }
        // No receivers simply means no browser is connected
        let _ = self.reload_tx.send(());
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.reload_tx.subscribe()
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let config = &state.site.config;
    let blog = config.blog_base();
    let home = url_for(config, "");

    Router::new()
        .route("/__livereload", get(livereload_handler))
        .route(&home, get(home_handler))
        .route(&blog, get(listing_handler))
        .route(&format!("{}/*slug", blog), get(post_handler))
        .route(&url_for(config, "atom.xml"), get(atom_handler))
        .route(&url_for(config, "search.json"), get(search_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(site, watch)?);
    Generator::new(site)?.generate(&state.repo())?;

    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, url_for(&site.config, ""));
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch content and static files, reloading the state on change
fn watch_and_reload(state: Arc<ServerState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&state.site.content_dir, &state.site.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant(&e.path.to_string_lossy()))
                    .collect();
                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match state.reload() {
                    Ok(()) => tracing::info!("Reloaded content"),
                    Err(e) => tracing::error!("Reload failed: {}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor and VCS noise does not trigger a reload
fn is_relevant(path: &str) -> bool {
    !path.contains(".git")
        && !path.contains(".DS_Store")
        && !path.ends_with('~')
        && !path.ends_with(".swp")
}

#[derive(Debug, Default, Deserialize)]
struct ListingQuery {
    tag: Option<String>,
    q: Option<String>,
}

async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    let repo = state.repo();
    html_response(StatusCode::OK, state.generator.render_home(&repo))
}

async fn listing_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let mut filter = FilterState::from_query(query.tag.as_deref());
    if let Some(q) = query.q.as_deref() {
        filter.set_query(q);
    }

    let repo = state.repo();
    html_response(StatusCode::OK, state.generator.render_listing(&repo, filter))
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let slugs: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    let repo = state.repo();

    match state.generator.render_post(&repo, &slugs) {
        Ok(html) => Html(html).into_response(),
        Err(e) if is_not_found(&e) => not_found(&state),
        Err(e) => html_response(StatusCode::INTERNAL_SERVER_ERROR, Err(e)),
    }
}

async fn atom_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.generator.atom_feed(&state.repo()) {
        Ok(feed) => ([(header::CONTENT_TYPE, "application/atom+xml")], feed).into_response(),
        Err(e) => html_response(StatusCode::INTERNAL_SERVER_ERROR, Err(e)),
    }
}

async fn search_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.generator.search_index(&state.repo()) {
        Ok(json) => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => html_response(StatusCode::INTERNAL_SERVER_ERROR, Err(e)),
    }
}

/// Static pages first, then files from the public directory, then 404
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let root = state.site.config.root.trim_end_matches('/');
    let path = request.uri().path().to_string();
    let route = path.strip_prefix(root).unwrap_or(&path).trim_matches('/');

    if !route.is_empty() {
        let repo = state.repo();
        if let Some(page) = repo.get_page(route) {
            return html_response(StatusCode::OK, state.generator.render_page(page));
        }
    }

    let mut service = ServeDir::new(&state.site.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve {}: {}", path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ContentError>()
        .is_some_and(|e| e.is_not_found())
}

fn not_found(state: &ServerState) -> Response {
    html_response(StatusCode::NOT_FOUND, state.generator.render_not_found())
}

fn html_response(status: StatusCode, html: Result<String>) -> Response {
    match html {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Render failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Render failed").into_response()
        }
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn write(dir: &std::path::Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn setup() -> (TempDir, Arc<ServerState>) {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        write(
            base,
            "content/blog/alpha.md",
            "---\ntitle: Alpha breach\ndate: 2024-02-01\ntags: [web]\n---\n\nSQLi.\n",
        );
        write(
            base,
            "content/blog/beta.md",
            "---\ntitle: Beta ctf\ndate: 2024-01-01\ntags: [ctf]\n---\n\nPwn.\n",
        );
        write(base, "content/pages/about.md", "---\ntitle: About\n---\n\nWho am I.\n");
        write(base, "static/robots.txt", "User-agent: *\n");

        let site = Site::new(base).unwrap();
        let state = Arc::new(ServerState::new(&site, false).unwrap());
        Generator::new(&site).unwrap().generate(&state.repo()).unwrap();
        (dir, state)
    }

    async fn fetch(state: &Arc<ServerState>, uri: &str) -> (StatusCode, String) {
        let response = router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_post_detail() {
        let (_dir, state) = setup();
        let (status, body) = fetch(&state, "/blog/alpha").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Alpha breach | Blog</title>"));
        assert!(body.contains("SQLi."));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let (_dir, state) = setup();
        let (status, body) = fetch(&state, "/blog/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Cette page n'existe pas."));
    }

    #[tokio::test]
    async fn test_listing_filters_server_side() {
        let (_dir, state) = setup();
        let (status, body) = fetch(&state, "/blog?tag=ctf").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("1 / 2 articles"));
        assert!(body.contains(r#"data-post-url="/blog/beta">"#));
        assert!(body.contains(r#"data-post-url="/blog/alpha" hidden>"#));
        assert!(body.contains(r#"data-tag="""#));

        let (_, body) = fetch(&state, "/blog?q=ALPHA").await;
        assert!(body.contains("1 / 2 articles"));

        let (_, body) = fetch(&state, "/blog?tag=web&q=beta").await;
        assert!(body.contains("0 / 2 articles"));
        assert!(body.contains("Aucun article trouvé"));
    }

    #[tokio::test]
    async fn test_pages_and_static_files() {
        let (_dir, state) = setup();
        let (status, body) = fetch(&state, "/about").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Who am I."));

        let (status, body) = fetch(&state, "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "User-agent: *\n");

        let (status, _) = fetch(&state, "/missing.png").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_feed_and_search() {
        let (_dir, state) = setup();
        let (status, body) = fetch(&state, "/atom.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Alpha breach</title>"));

        let (status, body) = fetch(&state, "/search.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/blog/beta"));
    }

    #[test]
    fn test_reload_swaps_repository() {
        let (dir, state) = setup();
        let mut rx = state.subscribe();
        let before = state.repo();
        assert_eq!(before.list_posts().len(), 2);

        write(
            dir.path(),
            "content/blog/gamma.md",
            "---\ntitle: Gamma\ndate: 2024-03-01\n---\n\nNew.\n",
        );
        state.reload().unwrap();

        assert_eq!(state.repo().list_posts().len(), 3);
        assert_eq!(state.repo().list_posts()[0].title, "Gamma");
        // earlier snapshots are unaffected
        assert_eq!(before.list_posts().len(), 2);
        assert!(rx.try_recv().is_ok());
        assert!(state.site.public_dir.join("blog/gamma/index.html").exists());
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant("/site/content/blog/a.mdx"));
        assert!(!is_relevant("/site/.git/index"));
        assert!(!is_relevant("/site/content/blog/a.mdx~"));
    }
}
