//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if write_default_config(config_path, yes)? {
        tracing::info!("Created {}", config_path.display());
        tracing::info!("Run 'mdpage render <file.md>' to render a page.");
    } else {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    }

    Ok(())
}

/// Returns whether the file was written.
fn write_default_config(path: &Path, overwrite: bool) -> Result<bool> {
    if path.exists() && !overwrite {
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(true)
}

const DEFAULT_CONFIG: &str = r##"# mdpage configuration

[render]
# Add a table of contents with scroll tracking
toc = false

# Render ```math blocks with MathJax
mathjax = false

# Embed local images as data URIs
embed = false

# Table row/column spans
span = false

# Minify the inline stylesheet
minify = true

# Extra stylesheet appended after the theme
# css = "custom.css"

# Favicon embedded into every page
# favicon = "favicon.ico"

[mathjax]
url = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js"

[style.button.color]
# Button background while the outline is collapsed
active = "#e06c75"
# Button background while the outline is expanded
bg = "#4078c0"

[style.toc]
width = "20%"
minwidth = "200px"

[serve]
port = 7878
open = true
dir = ".mdpage"
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::tempdir;

    #[test]
    fn default_config_round_trips_to_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("mdpage.toml");

        assert!(write_default_config(&path, false).unwrap());

        let config = load_config(&path).unwrap();
        assert!(!config.render.toc);
        assert!(config.render.minify);
        assert_eq!(config.style, mdpage_toc::TocConfig::default());
        assert_eq!(config.serve.port, 7878);
    }

    #[test]
    fn keeps_existing_file_without_yes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("mdpage.toml");
        fs::write(&path, "[render]\ntoc = true\n").unwrap();

        assert!(!write_default_config(&path, false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[render]\ntoc = true\n");

        assert!(write_default_config(&path, true).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("[serve]"));
    }
}
