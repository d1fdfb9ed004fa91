//! Asset pipeline for the inline stylesheet and scripts.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Page stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Outline runtime script. Reads the global `config` object.
    pub fn toc_js() -> String {
        TOC_JS.to_string()
    }

    /// MathJax configuration script.
    pub fn mathjax_config_js() -> String {
        MATHJAX_CONFIG_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* mdpage theme */

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
  font-size: 16px;
  line-height: 1.6;
  color: #24292e;
  background: #fff;
}

.container {
  display: flex;
  align-items: flex-start;
}

.markdown-body {
  flex: 1;
  min-width: 0;
  max-width: 980px;
  margin: 0 auto;
  padding: 45px;
}

.markdown-body h1,
.markdown-body h2 {
  padding-bottom: 0.3em;
  border-bottom: 1px solid #eaecef;
}

.markdown-body h1,
.markdown-body h2,
.markdown-body h3,
.markdown-body h4 {
  margin-top: 24px;
  margin-bottom: 16px;
  font-weight: 600;
  line-height: 1.25;
}

.markdown-body a {
  color: #0366d6;
  text-decoration: none;
}

.markdown-body a:hover {
  text-decoration: underline;
}

.markdown-body code {
  padding: 0.2em 0.4em;
  font-size: 85%;
  background: rgba(27, 31, 35, 0.05);
  border-radius: 3px;
  font-family: SFMono-Regular, Consolas, "Liberation Mono", Menlo, monospace;
}

.markdown-body pre {
  padding: 16px;
  overflow: auto;
  background: #f6f8fa;
  border-radius: 3px;
}

.markdown-body pre code {
  padding: 0;
  background: none;
}

.markdown-body blockquote {
  margin: 0;
  padding: 0 1em;
  color: #6a737d;
  border-left: 0.25em solid #dfe2e5;
}

.markdown-body table {
  border-collapse: collapse;
  margin-bottom: 16px;
}

.markdown-body table th,
.markdown-body table td {
  padding: 6px 13px;
  border: 1px solid #dfe2e5;
}

.markdown-body table tr:nth-child(2n) {
  background: #f6f8fa;
}

.markdown-body img {
  max-width: 100%;
}

.markdown-body .task-list-item {
  list-style-type: none;
}

.markdown-body .task-list-item input {
  margin: 0 0.2em 0.25em -1.6em;
  vertical-align: middle;
}

/* Table of contents */
#markdown-toc {
  position: sticky;
  top: 0;
  width: 20%;
  min-width: 200px;
  height: 100vh;
  overflow-y: auto;
  background: #f6f8fa;
  border-right: 1px solid #eaecef;
  transition: width 0.2s, min-width 0.2s;
}

#markdown-toc .scroll ul {
  margin: 0;
  padding: 16px 0;
  list-style: none;
}

#markdown-toc li a {
  display: block;
  padding: 2px 16px;
  color: #586069;
  text-decoration: none;
  white-space: nowrap;
  overflow: hidden;
  text-overflow: ellipsis;
}

#markdown-toc li a:hover {
  color: #24292e;
}

#markdown-toc .toc-h1 a {
  font-weight: 600;
}

#markdown-toc .toc-h2 a {
  padding-left: 28px;
}

#markdown-toc .toc-h3 a {
  padding-left: 40px;
}

#markdown-toc .toc-h4 a {
  padding-left: 52px;
  font-size: 90%;
}

#markdown-toc .toc-active > a {
  color: #0366d6;
  background: #e1e4e8;
}

.toc-button {
  position: fixed;
  left: 12px;
  bottom: 12px;
  width: 32px;
  height: 32px;
  border-radius: 50%;
  background: #4078c0;
  cursor: pointer;
  transition: transform 0.2s, background 0.2s;
}

.toc-button::before,
.toc-button::after {
  content: "";
  position: absolute;
  top: 15px;
  left: 8px;
  width: 16px;
  height: 2px;
  background: #fff;
}

.toc-button::after {
  transform: rotate(90deg);
}

@media print {
  #markdown-toc,
  .toc-button {
    display: none;
  }
}
"#;

const TOC_JS: &str = r##"// mdpage - table of contents
document.addEventListener('DOMContentLoaded', function() {
  'use strict';

  var toc = document.getElementById('markdown-toc');
  if (toc == null) {
    return;
  }

  var anchors = document.querySelectorAll('h1,h2,h3,h4');

  // Reuse the prerendered outline when present
  var scroll = toc.querySelector('.scroll');
  if (scroll == null) {
    scroll = document.createElement('div');
    scroll.classList.add('scroll');
    var list = document.createElement('ul');
    [].forEach.call(anchors, function(h) {
      var li = document.createElement('li');
      li.classList.add('toc-' + h.tagName.toLowerCase());
      var a = document.createElement('a');
      a.setAttribute('href', '#' + h.id);
      a.textContent = h.textContent;
      li.appendChild(a);
      list.appendChild(li);
    });
    scroll.appendChild(list);
    toc.appendChild(scroll);
  }
  toc.style.direction = 'rtl';
  scroll.style.direction = 'ltr';

  var button = document.querySelector('.toc-button');
  if (button == null) {
    button = document.createElement('div');
    button.classList.add('toc-button');
    document.body.appendChild(button);
  }

  button.onclick = function() {
    if (toc.offsetWidth > 0) {
      button.style.background = config.button.color.active;
      button.style.transform = 'rotate(-45deg)';
      toc.style.width = '0';
      toc.style.minWidth = '0';
    } else {
      button.style.background = config.button.color.bg;
      button.style.transform = 'rotate(0)';
      toc.style.width = config.toc.width;
      toc.style.minWidth = config.toc.minwidth;
    }
  };

  function highlight() {
    if (anchors.length === 0) {
      return null;
    }
    var active = anchors[0];
    for (var i = 0; i < anchors.length; i++) {
      var top = anchors[i].getBoundingClientRect().top;
      if (top > 0) {
        if (top < Math.abs(active.getBoundingClientRect().top)) {
          active = anchors[i];
        }
        break;
      }
      active = anchors[i];
    }
    [].forEach.call(toc.querySelectorAll('.toc-active'), function(li) {
      li.classList.remove('toc-active');
    });
    var link = toc.querySelector('a[href="#' + CSS.escape(active.id) + '"]');
    if (link == null) {
      return null;
    }
    link.parentNode.classList.add('toc-active');
    return link.parentNode;
  }

  function reveal(li) {
    if (li == null) {
      return;
    }
    if (li.scrollIntoViewIfNeeded) {
      li.scrollIntoViewIfNeeded();
    } else {
      li.scrollIntoView({ block: 'nearest' });
    }
  }

  var timeout = null;
  window.addEventListener('scroll', function() {
    if (timeout) {
      clearTimeout(timeout);
    }
    timeout = setTimeout(function() {
      timeout = null;
      reveal(highlight());
    }, 50);
  });

  highlight();
}, false);
"##;

const MATHJAX_CONFIG_JS: &str = r#"window.MathJax = {
  tex: {
    inlineMath: [['$', '$'], ['\\(', '\\)']],
    displayMath: [['$$', '$$'], ['\\[', '\\]']]
  },
  svg: { fontCache: 'global' }
};
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains("#markdown-toc"));
        assert!(css.contains(".toc-active"));
        assert!(css.contains(".task-list-item"));
    }

    #[test]
    fn toc_script_reads_config() {
        let js = AssetPipeline::toc_js();
        assert!(js.contains("config.button.color.active"));
        assert!(js.contains("config.toc.minwidth"));
        assert!(js.contains("setTimeout"));
    }

    #[test]
    fn toc_script_is_complete() {
        let js = AssetPipeline::toc_js();
        assert!(js.contains(r##"a[href="#' + CSS.escape(active.id) + '"]"##));
        assert!(js.trim_end().ends_with("}, false);"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.toc-button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".toc-button"));
    }

    #[test]
    fn minifies_default_stylesheet() {
        let minified = AssetPipeline::minify_css(&AssetPipeline::generate_css()).unwrap();
        assert!(minified.len() < DEFAULT_CSS.len());
    }
}
