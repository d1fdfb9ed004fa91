//! File watching for live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// Markdown source was modified
    MarkdownModified(PathBuf),

    /// Stylesheet or image referenced by a page was modified
    AssetModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::MarkdownModified(p)
            | Self::AssetModified(p)
            | Self::Created(p)
            | Self::Deleted(p) => p,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::NonRecursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        std::thread::spawn(move || {
            let mut last_event_time: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                // Editors write in bursts; keep the first event of each burst
                let now = std::time::Instant::now();
                if last_event_time.is_some_and(|last| now.duration_since(last) < debounce_duration)
                {
                    continue;
                }

                let mut forwarded = false;
                for path in event.paths {
                    if let Some(e) = classify_event(&path, &event.kind) {
                        forwarded = true;
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
                if forwarded {
                    last_event_time = Some(now);
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
///
/// Generated pages are ignored so rebuilding does not retrigger itself.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "html" {
        return None;
    }

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => match ext.as_str() {
            "md" | "markdown" | "mdown" => Some(WatchEvent::MarkdownModified(path.to_path_buf())),
            "css" | "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" => {
                Some(WatchEvent::AssetModified(path.to_path_buf()))
            }
            _ => None,
        },
        _ => None,
    }
}
