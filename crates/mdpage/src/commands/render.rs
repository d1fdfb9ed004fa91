//! Render command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use mdpage_static::{expand_inputs, BuildResult, OutputTarget, PageBuilder};

use crate::config::{load_config, ConfigFile};
use crate::PageArgs;

/// Run the render command.
pub async fn run(
    config_path: &Path,
    inputs: Vec<String>,
    output: Option<PathBuf>,
    page: PageArgs,
) -> Result<()> {
    let file_config = load_config(config_path)?;

    let result =
        tokio::task::spawn_blocking(move || render(&file_config, &inputs, output, &page)).await??;

    tracing::info!(
        "Rendered {} pages with {} headings in {}ms",
        result.pages.len(),
        result.headings,
        result.duration_ms
    );

    Ok(())
}

/// Expand `inputs` and render them, concatenated into `output` when given
/// or each beside its source otherwise.
fn render(
    config: &ConfigFile,
    inputs: &[String],
    output: Option<PathBuf>,
    page: &PageArgs,
) -> Result<BuildResult> {
    if inputs.is_empty() {
        anyhow::bail!("Please specify input Markdown");
    }

    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("File is not found");
    }

    let target = match output {
        Some(path) => OutputTarget::Single(path),
        None => OutputTarget::Beside,
    };

    let builder = PageBuilder::new(config.page_options(page))?;
    Ok(builder.build(&files, &target)?)
}
