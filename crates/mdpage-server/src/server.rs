//! Preview server implementation.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use mdpage_static::{expand_inputs, BuildError, OutputTarget, PageBuilder, PageOptions};

use crate::reload::{
    reload_client_script, ReloadHub, ReloadMessage, RELOAD_SCRIPT_PATH, RELOAD_WS_PATH,
};
use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct PreviewServerConfig {
    /// Input paths or glob patterns, re-expanded on every rebuild
    pub inputs: Vec<String>,

    /// Directory the preview pages are written to
    pub out_dir: PathBuf,

    /// Page rendering options
    pub options: PageOptions,

    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Open browser on start
    pub open: bool,
}

impl Default for PreviewServerConfig {
    fn default() -> Self {
        Self {
            inputs: vec![],
            out_dir: PathBuf::from(".mdpage"),
            options: PageOptions::default(),
            host: "127.0.0.1".to_string(),
            port: 7878,
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    BuildError(#[from] BuildError),
}

/// Shared server state.
struct ServerState {
    config: PreviewServerConfig,
    reload: ReloadHub,
    pages: RwLock<Vec<PathBuf>>,
}

/// Preview server.
pub struct PreviewServer {
    config: PreviewServerConfig,
}

impl PreviewServer {
    /// Create a new preview server.
    pub fn new(config: PreviewServerConfig) -> Self {
        Self { config }
    }

    /// Build the pages once, then serve them until the process exits.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let mut config = self.config;
        config
            .options
            .extra_scripts
            .push(RELOAD_SCRIPT_PATH.to_string());

        let state = Arc::new(ServerState {
            config,
            reload: ReloadHub::new(),
            pages: RwLock::new(Vec::new()),
        });

        // Initial build must succeed; later failures are reported to the browser
        let built = {
            let state = Arc::clone(&state);
            tokio::task::spawn_blocking(move || build_pages(&state.config))
                .await
                .map_err(|e| ServerError::WatchError(e.to_string()))??
        };
        let watch_paths = watch_dirs(&built.inputs, state.config.options.custom_css.as_deref());
        *state.pages.write().await = built.pages;

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(Arc::clone(&state));

        tracing::info!("Serving preview at http://{}", addr);

        if state.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

fn router(state: Arc<ServerState>) -> Router {
    let pages = ServeDir::new(&state.config.out_dir);

    Router::new()
        .route("/", get(index_handler))
        .route(RELOAD_WS_PATH, get(ws_handler))
        .route(RELOAD_SCRIPT_PATH, get(reload_script_handler))
        .fallback_service(pages)
        .with_state(state)
}

/// Files involved in one preview build.
struct BuiltPages {
    /// Rendered Markdown files
    inputs: Vec<PathBuf>,
    /// Written pages, relative to the preview directory
    pages: Vec<PathBuf>,
}

/// Expand the inputs and render them into the preview directory.
fn build_pages(config: &PreviewServerConfig) -> Result<BuiltPages, BuildError> {
    let inputs = expand_inputs(&config.inputs)?;
    let builder = PageBuilder::new(config.options.clone())?;
    let result = builder.build(&inputs, &OutputTarget::Directory(config.out_dir.clone()))?;

    tracing::info!(
        "Built {} pages in {}ms",
        result.pages.len(),
        result.duration_ms
    );

    let pages = result
        .pages
        .iter()
        .map(|page| page.strip_prefix(&config.out_dir).unwrap_or(page).to_path_buf())
        .collect();
    Ok(BuiltPages { inputs, pages })
}

/// Directories to watch: every input's parent plus the custom stylesheet's.
fn watch_dirs(inputs: &[PathBuf], custom_css: Option<&Path>) -> Vec<PathBuf> {
    let dirs: BTreeSet<PathBuf> = inputs
        .iter()
        .map(PathBuf::as_path)
        .chain(custom_css)
        .map(|p| match p.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        })
        .collect();
    dirs.into_iter().collect()
}

/// Handle file watch events.
async fn handle_watch_event(state: &Arc<ServerState>, event: WatchEvent) {
    let path = event.path().display();
    match &event {
        WatchEvent::MarkdownModified(_) => tracing::info!("Markdown modified: {}", path),
        WatchEvent::AssetModified(_) => tracing::info!("Asset modified: {}", path),
        WatchEvent::Created(_) => tracing::debug!("Created: {}", path),
        WatchEvent::Deleted(_) => tracing::debug!("Deleted: {}", path),
    }

    rebuild(state).await;
}

/// Rebuild all pages and tell connected browsers the outcome.
async fn rebuild(state: &Arc<ServerState>) {
    let task_state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || build_pages(&task_state.config)).await;

    match result {
        Ok(Ok(built)) => {
            *state.pages.write().await = built.pages;
            tracing::debug!("Reloading {} clients", state.reload.subscriber_count());
            state.reload.send(ReloadMessage::Reload);
        }
        Ok(Err(e)) => {
            tracing::warn!("Rebuild failed: {}", e);
            state.reload.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
        Err(e) => {
            tracing::error!("Rebuild task panicked: {}", e);
        }
    }
}

/// Handler for the index page, linking every rendered page.
async fn index_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let pages = state.pages.read().await;

    let items: String = pages
        .iter()
        .map(|page| page_url(page))
        .map(|url| {
            format!(
                "    <li><a href=\"/{}\">{}</a></li>\n",
                escape(&url),
                escape(&url)
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>mdpage preview</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 800px; margin: 2rem auto; padding: 0 1rem; }}
    li {{ margin: 0.25rem 0; }}
  </style>
</head>
<body>
  <h1>Pages</h1>
  <ul>
{}  </ul>
  <script src="{}"></script>
</body>
</html>"#,
        items, RELOAD_SCRIPT_PATH
    ))
}

/// URL path of a page relative to the preview directory.
fn page_url(page: &Path) -> String {
    page.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.reload.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected)
        .await
        .is_err()
    {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the live reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn state_for(dir: &Path) -> Arc<ServerState> {
        let mut options = PageOptions::default();
        options.extra_scripts.push(RELOAD_SCRIPT_PATH.to_string());

        Arc::new(ServerState {
            config: PreviewServerConfig {
                inputs: vec![format!("{}/*.md", dir.display())],
                out_dir: dir.join("preview"),
                options,
                open: false,
                ..Default::default()
            },
            reload: ReloadHub::new(),
            pages: RwLock::new(Vec::new()),
        })
    }

    #[test]
    fn creates_server_with_default_config() {
        let server = PreviewServer::new(PreviewServerConfig::default());
        assert_eq!(server.config.port, 7878);
        assert!(server.config.open);
    }

    #[test]
    fn watches_input_parents_once() {
        let dirs = watch_dirs(
            &[
                PathBuf::from("docs/a.md"),
                PathBuf::from("docs/b.md"),
                PathBuf::from("top.md"),
            ],
            Some(Path::new("theme/extra.css")),
        );

        assert_eq!(
            dirs,
            vec![
                PathBuf::from("."),
                PathBuf::from("docs"),
                PathBuf::from("theme")
            ]
        );
    }

    #[tokio::test]
    async fn rebuild_writes_pages_and_notifies() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("guide.md"), "# Guide\n").unwrap();
        let state = state_for(temp.path());
        let mut rx = state.reload.subscribe();

        rebuild(&state).await;

        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
        let html = fs::read_to_string(temp.path().join("preview/guide.md.html")).unwrap();
        assert!(html.contains("__reload.js"));
        assert_eq!(*state.pages.read().await, vec![PathBuf::from("guide.md.html")]);
    }

    #[tokio::test]
    async fn rebuild_reports_failures() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("broken.md"), "---\ntitle: [a, b]\n---\n").unwrap();
        let state = state_for(temp.path());
        let mut rx = state.reload.subscribe();

        rebuild(&state).await;

        assert!(matches!(
            rx.try_recv().unwrap(),
            ReloadMessage::BuildFailed { .. }
        ));
    }

    #[tokio::test]
    async fn index_lists_pages() {
        let temp = tempdir().unwrap();
        let state = state_for(temp.path());
        *state.pages.write().await = vec![
            PathBuf::from("guide.md.html"),
            PathBuf::from("notes/guide.md.html"),
        ];

        let html = index_handler(State(state)).await.into_response();
        let body = axum::body::to_bytes(html.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert!(body.contains(r#"<a href="/guide.md.html">guide.md.html</a>"#));
        assert!(body.contains(r#"<a href="/notes/guide.md.html">notes/guide.md.html</a>"#));
    }
}
