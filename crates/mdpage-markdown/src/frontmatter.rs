//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Parsed frontmatter from a Markdown file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title, overrides the file-derived title
    #[serde(default)]
    pub title: Option<String>,

    /// Page description, emitted as a meta tag
    #[serde(default)]
    pub description: Option<String>,
}

/// Extract frontmatter from Markdown content.
///
/// A leading `---` line opens a frontmatter block only when a later line is
/// exactly `---` and the text between them is a YAML mapping. Anything else,
/// e.g. a thematic break, leaves the source untouched.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    let Some(body) = trimmed
        .strip_prefix("---\n")
        .or_else(|| trimmed.strip_prefix("---\r\n"))
    else {
        return Ok((None, source));
    };

    let mut offset = 0;
    let mut close = None;
    for line in body.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            close = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((yaml_end, rest_start)) = close else {
        return Ok((None, source));
    };

    let value = match serde_yaml::from_str::<serde_yaml::Value>(&body[..yaml_end]) {
        Ok(value @ serde_yaml::Value::Mapping(_)) => value,
        _ => return Ok((None, source)),
    };

    let frontmatter: Frontmatter = serde_yaml::from_value(value)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    Ok((Some(frontmatter), body[rest_start..].trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Invalid frontmatter: {0}")]
    InvalidYaml(String),
}
