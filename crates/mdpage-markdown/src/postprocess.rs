//! Rewrites applied to rendered HTML.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};

static IMAGE_OPTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<img[^>]*?src=)"([^"?]+)\?([^"\s]+)"([^>]*?/?>)"#)
        .expect("Invalid image options regex")
});

static IMAGE_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<img[^>]*?src=")([^"]+)("[^>]*>)"#).expect("Invalid image src regex")
});

static REMOTE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?:)?//|^data:").expect("Invalid remote url regex"));

static TASK_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<li>(\s*<input[^>]*type="checkbox")"#).expect("Invalid task item regex")
});

/// Turn `src="a.png?width=10&amp;height=5"` into `src="a.png" width=10 height=5`.
pub fn parse_image_options(html: &str) -> String {
    IMAGE_OPTIONS_RE
        .replace_all(html, |caps: &Captures| {
            let options = caps[3].split("&amp;").collect::<Vec<_>>().join(" ");
            format!("{}\"{}\" {}{}", &caps[1], &caps[2], options, &caps[4])
        })
        .into_owned()
}

/// Add the `task-list-item` class to list items holding a checkbox.
pub fn mark_task_list_items(html: &str) -> String {
    TASK_ITEM_RE
        .replace_all(html, r#"<li class="task-list-item">$1"#)
        .into_owned()
}

/// Inline local images as base64 data URIs.
///
/// Relative sources resolve against `base_dir`. Remote URLs are left alone,
/// as are images that cannot be read; those are logged and skipped.
pub fn embed_images(html: &str, base_dir: &Path) -> String {
    IMAGE_SRC_RE
        .replace_all(html, |caps: &Captures| {
            let src = &caps[2];
            if REMOTE_URL_RE.is_match(src) {
                return caps[0].to_string();
            }

            let path = base_dir.join(decode_src(src));
            match encode_file_base64(&path) {
                Ok(encoded) => format!(
                    "{}data:{};base64,{}{}",
                    &caps[1],
                    mime_type(&path),
                    encoded,
                    &caps[3]
                ),
                Err(e) => {
                    tracing::warn!("Failed to embed image {}: {}", path.display(), e);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Read a file and encode it as standard base64.
pub fn encode_file_base64(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(STANDARD.encode(bytes))
}

/// MIME type for an image path, `image` when unknown.
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => "image",
    }
}

/// Undo the escaping applied to `src` attributes by the renderer.
fn decode_src(src: &str) -> String {
    let src = src.replace("&amp;", "&");
    let bytes = src.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = [bytes[i + 1], bytes[i + 2]];
            if let Some(byte) = std::str::from_utf8(&hex)
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok())
            {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Escape text for inclusion in HTML.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
