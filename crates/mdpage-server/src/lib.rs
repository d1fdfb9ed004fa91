//! Preview server for mdpage.
//!
//! Renders pages into a preview directory, serves them, and reloads open
//! browsers over a WebSocket whenever a source file changes.

pub mod reload;
pub mod server;
pub mod watcher;

pub use reload::{ReloadHub, ReloadMessage};
pub use server::{PreviewServer, PreviewServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
