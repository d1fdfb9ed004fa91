//! Template engine for rendering pages.

use minijinja::{context, Environment};

/// A prerendered outline entry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TocItem {
    /// Link text
    pub label: String,
    /// Link target, `#<id>`
    pub href: String,
    /// List item class, e.g. `toc-h2`
    pub class: String,
    /// Whether the entry carries the active marker
    pub active: bool,
}

/// The prerendered outline with the inline styles set on mount.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TocView {
    pub items: Vec<TocItem>,
    pub container_style: String,
    pub wrapper_style: String,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Meta description
    pub description: Option<String>,
    /// Base64 favicon data
    pub favicon: Option<String>,
    /// Inline scripts
    pub scripts: Vec<String>,
    /// External script URLs
    pub script_urls: Vec<String>,
    /// Inline stylesheets
    pub styles: Vec<String>,
    /// Rendered content HTML
    pub content: String,
    /// Outline, when the page has one
    pub toc: Option<TocView>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the page templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("page.html".to_string(), PAGE_TEMPLATE.to_string())
            .expect("Failed to add page template");

        env.add_template_owned("toc.html".to_string(), TOC_TEMPLATE.to_string())
            .expect("Failed to add toc template");

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        context: &Context,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            title => &context.title,
            description => &context.description,
            favicon => &context.favicon,
            scripts => &context.scripts,
            script_urls => &context.script_urls,
            styles => &context.styles,
            content => &context.content,
            toc => &context.toc,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta http-equiv="X-UA-Compatible" content="IE=edge">
{% if description %}<meta name="description" content="{{ description }}">
{% endif %}{% if favicon %}<link rel='shortcut icon' href='data:image/x-icon;base64,{{ favicon }}'/>
{% endif %}<title>{{ title }}</title>
{% for script in scripts %}<script type="text/javascript">
{{ script | safe }}
</script>
{% endfor %}{% for url in script_urls %}<script type="text/javascript" src="{{ url }}" async></script>
{% endfor %}{% for style in styles %}<style type="text/css">
{{ style | safe }}
</style>
{% endfor %}</head>
<body>
<div class="container">
{% if toc %}{% include "toc.html" %}{% endif %}<div class="markdown-body">
{{ content | safe }}
</div>
</div>
{% if toc %}<div class="toc-button"></div>
{% endif %}</body>
</html>
"##;

const TOC_TEMPLATE: &str = r##"<div id="markdown-toc"{% if toc.container_style %} style="{{ toc.container_style }}"{% endif %}><div class="scroll"{% if toc.wrapper_style %} style="{{ toc.wrapper_style }}"{% endif %}><ul>
{% for item in toc.items %}<li class="{{ item.class }}{% if item.active %} toc-active{% endif %}"><a href="{{ item.href }}">{{ item.label }}</a></li>
{% endfor %}</ul></div></div>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_page() {
        let engine = TemplateEngine::new();

        let context = Context {
            title: "notes".to_string(),
            content: "<p>Hello world</p>".to_string(),
            ..Default::default()
        };

        let html = engine.render_page("page.html", &context).unwrap();

        assert!(html.contains("<title>notes</title>"));
        assert!(html.contains("<p>Hello world</p>"));
        assert!(!html.contains("markdown-toc"));
        assert!(!html.contains("toc-button"));
    }

    #[test]
    fn renders_outline() {
        let engine = TemplateEngine::new();

        let context = Context {
            title: "Guide".to_string(),
            toc: Some(TocView {
                items: vec![
                    TocItem {
                        label: "Intro".to_string(),
                        href: "#intro".to_string(),
                        class: "toc-h1".to_string(),
                        active: true,
                    },
                    TocItem {
                        label: "A & B".to_string(),
                        href: "#a-b".to_string(),
                        class: "toc-h2".to_string(),
                        active: false,
                    },
                ],
                container_style: "direction: rtl".to_string(),
                wrapper_style: "direction: ltr".to_string(),
            }),
            ..Default::default()
        };

        let html = engine.render_page("page.html", &context).unwrap();

        assert!(html.contains(r#"<div id="markdown-toc" style="direction: rtl">"#));
        assert!(html.contains(r#"<div class="scroll" style="direction: ltr">"#));
        assert!(html.contains(r##"<li class="toc-h1 toc-active"><a href="#intro">Intro</a></li>"##));
        assert!(html.contains(r##"<li class="toc-h2"><a href="#a-b">A &amp; B</a></li>"##));
        assert!(html.contains(r#"<div class="toc-button"></div>"#));
    }

    #[test]
    fn inlines_scripts_and_styles() {
        let engine = TemplateEngine::new();

        let context = Context {
            title: "t".to_string(),
            favicon: Some("AAAA".to_string()),
            scripts: vec!["var config = {};".to_string()],
            script_urls: vec!["https://cdn.example/mathjax.js".to_string()],
            styles: vec!["body{margin:0}".to_string()],
            ..Default::default()
        };

        let html = engine.render_page("page.html", &context).unwrap();

        assert!(html.contains("var config = {};"));
        assert!(html.contains("mathjax.js\" async></script>"));
        assert!(html.contains("body{margin:0}"));
        assert!(html.contains("data:image/x-icon;base64,AAAA"));
    }
}
