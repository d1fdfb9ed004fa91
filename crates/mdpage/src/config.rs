//! Configuration file (mdpage.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use mdpage_static::builder::DEFAULT_MATHJAX_URL;
use mdpage_static::PageOptions;
use mdpage_toc::TocConfig;

use crate::PageArgs;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub mathjax: MathjaxSettings,
    #[serde(default)]
    pub style: TocConfig,
    #[serde(default)]
    pub serve: ServeSettings,
}

#[derive(Debug, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub toc: bool,
    #[serde(default)]
    pub mathjax: bool,
    #[serde(default)]
    pub embed: bool,
    #[serde(default)]
    pub span: bool,
    #[serde(default = "default_minify")]
    pub minify: bool,
    pub css: Option<PathBuf>,
    pub favicon: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            toc: false,
            mathjax: false,
            embed: false,
            span: false,
            minify: default_minify(),
            css: None,
            favicon: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MathjaxSettings {
    #[serde(default = "default_mathjax_url")]
    pub url: String,
}

impl Default for MathjaxSettings {
    fn default() -> Self {
        Self {
            url: default_mathjax_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServeSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_open")]
    pub open: bool,
    #[serde(default = "default_preview_dir")]
    pub dir: PathBuf,
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            open: default_open(),
            dir: default_preview_dir(),
        }
    }
}

fn default_minify() -> bool {
    true
}
fn default_mathjax_url() -> String {
    DEFAULT_MATHJAX_URL.to_string()
}
fn default_port() -> u16 {
    7878
}
fn default_open() -> bool {
    true
}
fn default_preview_dir() -> PathBuf {
    PathBuf::from(".mdpage")
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

impl ConfigFile {
    /// Page options from the file, with command line flags taking precedence.
    pub fn page_options(&self, args: &PageArgs) -> PageOptions {
        let render = &self.render;

        PageOptions {
            toc: args.toc || render.toc,
            mathjax: args.mathjax || render.mathjax,
            mathjax_url: self.mathjax.url.clone(),
            embed_images: args.embed || render.embed,
            table_span: args.span || render.span,
            minify: !args.no_minify && render.minify,
            favicon: args.favicon.clone().or_else(|| render.favicon.clone()),
            custom_css: args.css.clone().or_else(|| render.css.clone()),
            style: self.style.clone(),
            extra_scripts: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/mdpage.toml")).unwrap();

        assert_eq!(config.serve.port, 7878);
        assert!(config.render.minify);
        assert_eq!(config.mathjax.url, DEFAULT_MATHJAX_URL);
        assert_eq!(config.style, TocConfig::default());
    }

    #[test]
    fn parses_partial_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("mdpage.toml");
        fs::write(
            &path,
            r##"
[render]
toc = true
css = "theme.css"

[style.button.color]
active = "#ff0000"

[serve]
port = 9000
"##,
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert!(config.render.toc);
        assert_eq!(config.render.css, Some(PathBuf::from("theme.css")));
        assert_eq!(config.style.button.color.active, "#ff0000");
        assert_eq!(config.style.button.color.bg, "#4078c0");
        assert_eq!(config.style.toc.width, "20%");
        assert_eq!(config.serve.port, 9000);
        assert!(config.serve.open);
    }

    #[test]
    fn rejects_malformed_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("mdpage.toml");
        fs::write(&path, "[render\ntoc = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn flags_override_file() {
        let config = ConfigFile {
            render: RenderSettings {
                css: Some(PathBuf::from("file.css")),
                ..Default::default()
            },
            ..Default::default()
        };
        let args = PageArgs {
            toc: true,
            no_minify: true,
            css: Some(PathBuf::from("flag.css")),
            ..Default::default()
        };

        let options = config.page_options(&args);

        assert!(options.toc);
        assert!(!options.minify);
        assert!(!options.mathjax);
        assert_eq!(options.custom_css, Some(PathBuf::from("flag.css")));
    }
}
