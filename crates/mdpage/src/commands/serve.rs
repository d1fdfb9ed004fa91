//! Preview server command.

use std::path::Path;

use anyhow::Result;
use mdpage_server::{PreviewServer, PreviewServerConfig};

use crate::config::load_config;
use crate::PageArgs;

/// Run the preview server.
pub async fn run(
    config_path: &Path,
    inputs: Vec<String>,
    port: Option<u16>,
    open: bool,
    page: PageArgs,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("Please specify input Markdown");
    }

    let file_config = load_config(config_path)?;
    let port = port.unwrap_or(file_config.serve.port);

    tracing::info!("Starting preview server on port {}", port);

    let config = PreviewServerConfig {
        inputs,
        out_dir: file_config.serve.dir.clone(),
        options: file_config.page_options(&page),
        port,
        open: open && file_config.serve.open,
        ..Default::default()
    };

    PreviewServer::new(config).start().await?;

    Ok(())
}
