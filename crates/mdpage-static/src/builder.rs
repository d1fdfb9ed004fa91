//! Page builder.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use mdpage_markdown::{
    embed_images, encode_file_base64, parse_markdown_with_ids, render_html, HeadingIds, ParsedDoc,
    RenderOptions, TocEntry,
};
use mdpage_toc::{Element, Heading, HeadingLevel, MemoryPage, TocConfig, TocController};

use crate::assets::AssetPipeline;
use crate::templates::{Context, TemplateEngine, TocItem, TocView};

/// Vertical gap assumed between headings when prerendering the outline.
const PRERENDER_HEADING_GAP: f64 = 100.0;

/// Default MathJax bundle.
pub const DEFAULT_MATHJAX_URL: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js";

/// Options for building pages.
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Emit the table of contents container, outline and toggle button
    pub toc: bool,

    /// Convert math blocks and include MathJax
    pub mathjax: bool,

    /// MathJax script URL
    pub mathjax_url: String,

    /// Inline local images as data URIs
    pub embed_images: bool,

    /// Apply table row/column spans
    pub table_span: bool,

    /// Minify the inline stylesheet
    pub minify: bool,

    /// Favicon file, embedded as base64
    pub favicon: Option<PathBuf>,

    /// Extra stylesheet appended after the theme
    pub custom_css: Option<PathBuf>,

    /// Outline styling
    pub style: TocConfig,

    /// Extra external scripts, e.g. a live reload client
    pub extra_scripts: Vec<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            toc: false,
            mathjax: false,
            mathjax_url: DEFAULT_MATHJAX_URL.to_string(),
            embed_images: false,
            table_span: false,
            minify: true,
            favicon: None,
            custom_css: None,
            style: TocConfig::default(),
            extra_scripts: vec![],
        }
    }
}

/// Where rendered pages are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// All inputs concatenated into one page
    Single(PathBuf),

    /// One page per input, written next to it as `<input>.html`
    Beside,

    /// One page per input, written into a directory as `<file name>.html`,
    /// keeping each input's path below the inputs' common directory
    Directory(PathBuf),
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Pages written
    pub pages: Vec<PathBuf>,

    /// Headings across all pages
    pub headings: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Please specify input Markdown")]
    NoInputs,

    #[error("Failed to read {0}")]
    ReadError(String),

    #[error("Failed to parse Markdown: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A rendered Markdown file.
#[derive(Debug, Clone)]
struct RenderedFile {
    title: Option<String>,
    description: Option<String>,
    html: String,
    toc: Vec<TocEntry>,
}

/// Page builder.
pub struct PageBuilder {
    options: PageOptions,
    templates: TemplateEngine,
    scripts: Vec<String>,
    styles: Vec<String>,
    favicon: Option<String>,
}

impl PageBuilder {
    /// Create a builder, loading the favicon and custom stylesheet.
    pub fn new(options: PageOptions) -> Result<Self, BuildError> {
        let mut scripts = vec![
            options
                .style
                .to_script()
                .map_err(|e| BuildError::TemplateError(e.to_string()))?,
        ];
        if options.toc {
            scripts.push(AssetPipeline::toc_js());
        }
        if options.mathjax {
            scripts.push(AssetPipeline::mathjax_config_js());
        }

        let css = AssetPipeline::generate_css();
        let css = if options.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Skipping CSS minification: {}", e);
                css
            })
        } else {
            css
        };
        let mut styles = vec![css];

        if let Some(ref path) = options.custom_css {
            let custom = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;
            styles.push(custom);
        }

        let favicon = match options.favicon {
            Some(ref path) => Some(
                encode_file_base64(path)
                    .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?,
            ),
            None => None,
        };

        Ok(Self {
            options,
            templates: TemplateEngine::new(),
            scripts,
            styles,
            favicon,
        })
    }

    /// Render `inputs` and write the resulting pages.
    pub fn build(&self, inputs: &[PathBuf], target: &OutputTarget) -> Result<BuildResult, BuildError> {
        if inputs.is_empty() {
            return Err(BuildError::NoInputs);
        }
        let start = Instant::now();

        let rendered: Vec<RenderedFile> = match target {
            // One page: heading ids must stay unique across all inputs
            OutputTarget::Single(_) => {
                let mut ids = HeadingIds::default();
                let docs = inputs
                    .iter()
                    .map(|input| parse_file(input, &mut ids))
                    .collect::<Result<Vec<_>, _>>()?;
                inputs
                    .par_iter()
                    .zip(docs.into_par_iter())
                    .map(|(input, doc)| self.render_doc(input, doc))
                    .collect()
            }
            OutputTarget::Beside | OutputTarget::Directory(_) => inputs
                .par_iter()
                .map(|input| {
                    let doc = parse_file(input, &mut HeadingIds::default())?;
                    Ok(self.render_doc(input, doc))
                })
                .collect::<Result<_, BuildError>>()?,
        };

        let headings: usize = rendered.iter().map(|r| r.toc.len()).sum();

        let pages = match target {
            OutputTarget::Single(output) => {
                let title = output
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("index")
                    .to_string();
                let page = concat(rendered);
                self.write_page(&page, title, output)?;
                vec![output.clone()]
            }
            OutputTarget::Beside | OutputTarget::Directory(_) => {
                let root = common_root(inputs);
                let outputs: Vec<PathBuf> = inputs
                    .iter()
                    .map(|input| page_output_path(input, target, &root))
                    .collect();
                check_distinct_outputs(inputs, &outputs)?;

                inputs
                    .par_iter()
                    .zip(rendered.par_iter())
                    .zip(outputs.into_par_iter())
                    .map(|((input, page), output)| {
                        let title = page
                            .title
                            .clone()
                            .unwrap_or_else(|| input.display().to_string());
                        self.write_page(page, title, &output)?;
                        Ok(output)
                    })
                    .collect::<Result<Vec<_>, BuildError>>()?
            }
        };

        Ok(BuildResult {
            pages,
            headings,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Render one parsed Markdown file.
    fn render_doc(&self, path: &Path, doc: ParsedDoc) -> RenderedFile {
        let options = RenderOptions {
            math: self.options.mathjax,
            table_span: self.options.table_span,
        };
        let mut html = render_html(&doc, &options);

        if self.options.embed_images {
            let base_dir = path.parent().unwrap_or(Path::new(""));
            html = embed_images(&html, base_dir);
        }

        tracing::debug!("Rendered {} ({} headings)", path.display(), doc.toc.len());

        RenderedFile {
            title: doc.title().map(str::to_string),
            description: doc.frontmatter.as_ref().and_then(|f| f.description.clone()),
            html,
            toc: doc.toc,
        }
    }

    /// Render the page template and write it to `output`.
    fn write_page(&self, page: &RenderedFile, title: String, output: &Path) -> Result<(), BuildError> {
        let toc = self
            .options
            .toc
            .then(|| prerender_outline(&page.toc, &self.options.style));

        let context = Context {
            title,
            description: page.description.clone(),
            favicon: self.favicon.clone(),
            scripts: self.scripts.clone(),
            script_urls: self.script_urls(),
            styles: self.styles.clone(),
            content: page.html.clone(),
            toc,
        };

        let html = self
            .templates
            .render_page("page.html", &context)
            .map_err(|e: minijinja::Error| BuildError::TemplateError(e.to_string()))?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(output, html)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output.display(), e)))?;

        tracing::info!("Wrote {}", output.display());
        Ok(())
    }

    fn script_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if self.options.mathjax {
            urls.push(self.options.mathjax_url.clone());
        }
        urls.extend(self.options.extra_scripts.iter().cloned());
        urls
    }
}

/// Read and parse one Markdown file, drawing heading ids from `ids`.
fn parse_file(path: &Path, ids: &mut HeadingIds) -> Result<ParsedDoc, BuildError> {
    let source = fs::read_to_string(path)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

    parse_markdown_with_ids(&source, ids).map_err(|e| BuildError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge rendered files into one page, in input order.
fn concat(files: Vec<RenderedFile>) -> RenderedFile {
    let mut page = RenderedFile {
        title: None,
        description: None,
        html: String::new(),
        toc: Vec::new(),
    };
    for file in files {
        page.html.push_str(&file.html);
        page.toc.extend(file.toc);
        if page.description.is_none() {
            page.description = file.description;
        }
    }
    page
}

/// Output path for one input.
///
/// `root` is the inputs' common directory; directory output keeps each
/// input's path below it.
fn page_output_path(input: &Path, target: &OutputTarget, root: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index.md".to_string());
    let page_name = format!("{}.html", file_name);

    match target {
        OutputTarget::Directory(dir) => {
            let relative: PathBuf = input
                .strip_prefix(root)
                .unwrap_or(input)
                .parent()
                .map(|p| {
                    p.components()
                        .filter(|c| matches!(c, Component::Normal(_)))
                        .collect()
                })
                .unwrap_or_default();
            dir.join(relative).join(page_name)
        }
        OutputTarget::Single(output) => output.clone(),
        OutputTarget::Beside => input.with_file_name(page_name),
    }
}

/// Deepest directory containing every input.
fn common_root(inputs: &[PathBuf]) -> PathBuf {
    let mut parents = inputs
        .iter()
        .map(|input| input.parent().unwrap_or(Path::new("")));
    let Some(first) = parents.next() else {
        return PathBuf::new();
    };

    let mut root: Vec<Component> = first.components().collect();
    for parent in parents {
        let shared = root
            .iter()
            .zip(parent.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        root.truncate(shared);
    }
    root.iter().collect()
}

/// Reject two different inputs rendering to the same page.
fn check_distinct_outputs(inputs: &[PathBuf], outputs: &[PathBuf]) -> Result<(), BuildError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for (input, output) in inputs.iter().zip(outputs) {
        if let Some(previous) = seen.insert(output.as_path(), input.as_path()) {
            if previous != input.as_path() {
                return Err(BuildError::WriteError(format!(
                    "{} and {} both render to {}",
                    previous.display(),
                    input.display(),
                    output.display()
                )));
            }
        }
    }
    Ok(())
}

/// Run the outline controller over an in-memory page built from the
/// document's headings and capture the mounted result.
pub fn prerender_outline(toc: &[TocEntry], style: &TocConfig) -> TocView {
    let headings: Vec<Heading> = toc
        .iter()
        .filter_map(|entry| {
            HeadingLevel::from_level(entry.level)
                .map(|level| Heading::new(level, entry.id.clone(), entry.title.clone()))
        })
        .collect();

    let page = MemoryPage::from_headings(headings, PRERENDER_HEADING_GAP, true);
    let mut controller = TocController::new(page, style.clone());
    controller.initialize();
    let page = controller.into_host();

    let items = page
        .mounted()
        .map(|outline| {
            outline
                .entries()
                .iter()
                .enumerate()
                .map(|(i, entry)| TocItem {
                    label: entry.label.clone(),
                    href: entry.href(),
                    class: entry.class_name(),
                    active: page.is_active(i),
                })
                .collect()
        })
        .unwrap_or_default();

    TocView {
        items,
        container_style: page.style_attr(Element::Container),
        wrapper_style: page.style_attr(Element::Wrapper),
    }
}
