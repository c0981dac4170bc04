//! Development server: an explicit route table over the content repository
//!
//! Every request reads posts through the shared [`ContentCache`] and renders
//! them with the built-in templates. With watching enabled, file changes
//! clear the cache and connected browsers reload.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::cache::ContentCache;
use crate::config::SiteConfig;
use crate::content::{ContentError, FsStore};
use crate::templates::TemplateRenderer;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    site: Site,
    cache: ContentCache<FsStore>,
    renderer: TemplateRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    fn new(site: &Site, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            site: site.clone(),
            cache: site.cache(),
            renderer: TemplateRenderer::new(&site.config)?,
            reload_tx,
            live_reload,
        })
    }
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(site, watch)?);
    let app = router(Arc::clone(&state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
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
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The route table
fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/blog", get(blog_handler))
        .route("/blog/", get(blog_handler))
        .route("/blog/:slug", get(post_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch content, static files and config; clear the cache and notify browsers on change
fn watch_and_reload(state: &ServerState) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in state.site.watch_paths() {
        debouncer
            .watcher()
            .watch(&path, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", path);
    }

    for result in rx {
        match result {
            Ok(events) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_watched_change(&e.path))
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                    if event.path.file_name().and_then(|n| n.to_str()).map_or(false, |n| {
                        crate::config::CONFIG_FILES.contains(&n)
                    }) {
                        tracing::warn!("Config changes take effect after a server restart");
                    }
                }

                state.cache.clear();
                let _ = state.reload_tx.send(());
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Whether a changed path should trigger a reload
fn is_watched_change(path: &std::path::Path) -> bool {
    let ignored = path
        .components()
        .any(|c| c.as_os_str() == ".git" || c.as_os_str() == ".DS_Store");
    !ignored && !path.to_string_lossy().ends_with('~')
}

/// Run a content read on the blocking pool
async fn read_content<T, F>(state: &Arc<ServerState>, read: F) -> Result<T, ContentError>
where
    T: Send + 'static,
    F: FnOnce(&ContentCache<FsStore>, &SiteConfig) -> Result<T, ContentError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || read(&state.cache, &state.site.config))
        .await
        .unwrap_or_else(|e| Err(ContentError::Io(std::io::Error::other(e))))
}

/// Home page: recent posts, never an error because of the listing
async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    let recent = read_content(&state, |cache, config| {
        cache.get_contents(&config.blog_category, Some(config.recent_posts))
    })
    .await
    .unwrap_or_else(|e| {
        tracing::warn!("Showing empty post list: {}", e);
        Vec::new()
    });

    let html = state.renderer.render_home(&recent);
    page(&state, StatusCode::OK, html)
}

/// Blog index: every post
async fn blog_handler(State(state): State<Arc<ServerState>>) -> Response {
    let posts = read_content(&state, |cache, config| {
        cache.get_contents(&config.blog_category, None)
    })
    .await;

    match posts {
        Ok(posts) => {
            let html = state.renderer.render_blog(&posts);
            page(&state, StatusCode::OK, html)
        }
        Err(e) => error_page(&state, e),
    }
}

/// A single post by slug
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let entry = read_content(&state, move |cache, config| {
        cache.get_content(&config.blog_category, &slug)
    })
    .await;

    match entry {
        Ok(entry) => {
            let html = state.renderer.render_post(&entry);
            page(&state, StatusCode::OK, html)
        }
        Err(e) => error_page(&state, e),
    }
}

/// Serve static files, with the not-found page as the last resort
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.site.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => {
            let html = state.renderer.render_not_found("No such page.");
            page(&state, StatusCode::NOT_FOUND, html)
        }
        Err(e) => {
            tracing::error!("Static file error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Map a content error to the matching error boundary
fn error_page(state: &ServerState, error: ContentError) -> Response {
    if error.is_not_found() {
        tracing::debug!("Not found: {}", error);
        let html = state.renderer.render_not_found(&error.to_string());
        page(state, StatusCode::NOT_FOUND, html)
    } else {
        tracing::error!("Failed to read content: {}", error);
        let html = state.renderer.render_error("The content could not be read.");
        page(state, StatusCode::INTERNAL_SERVER_ERROR, html)
    }
}

/// Wrap a rendered page, injecting the live reload script when enabled
fn page(state: &ServerState, status: StatusCode, html: Result<String>) -> Response {
    match html {
        Ok(html) if state.live_reload => (status, Html(inject_live_reload(&html))).into_response(),
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Render error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Render error").into_response()
        }
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
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

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
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
