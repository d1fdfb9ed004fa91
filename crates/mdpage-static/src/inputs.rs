//! Input path expansion.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::builder::BuildError;

/// Expand input patterns into file paths.
///
/// Plain paths are kept when they exist. Patterns with glob characters are
/// matched under their literal leading directory; each pattern's matches
/// are sorted. A pattern that matches nothing contributes nothing. Leading
/// `./` is dropped from patterns and results alike.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, BuildError> {
    expand_from(Path::new("."), patterns)
}

/// Expand `patterns` with relative ones resolved against `root`. Results
/// under `root` are returned relative to it.
fn expand_from(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern = strip_current_dir_str(pattern);

        if !has_glob_chars(pattern) {
            let path = strip_current_dir(Path::new(pattern));
            if root.join(path).is_file() {
                files.push(path.to_path_buf());
            }
            continue;
        }

        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| BuildError::ReadError(format!("Invalid pattern {}: {}", pattern, e)))?
            .compile_matcher();

        let (base, depth) = walk_root(Path::new(pattern));
        let base = if base == Path::new(".") {
            root.to_path_buf()
        } else {
            root.join(base)
        };

        let mut matched: Vec<PathBuf> = WalkDir::new(&base)
            .max_depth(depth)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| relative_to(root, e.path()))
            .filter(|p| glob.is_match(p))
            .collect();
        matched.sort();

        tracing::debug!("Pattern {} matched {} files", pattern, matched.len());
        files.extend(matched);
    }

    Ok(files)
}

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Literal directory prefix of a pattern and how deep below it to walk.
fn walk_root(pattern: &Path) -> (PathBuf, usize) {
    let mut base = PathBuf::new();
    let mut rest = Vec::new();

    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();
        if rest.is_empty() && !has_glob_chars(&text) {
            base.push(component);
        } else {
            rest.push(text.into_owned());
        }
    }

    let depth = if rest.iter().any(|c| c.contains("**")) {
        usize::MAX
    } else {
        rest.len()
    };

    if base.as_os_str().is_empty() {
        (PathBuf::from("."), depth)
    } else {
        (base, depth)
    }
}

/// `path` relative to `root` when it lies under it, without a leading `./`.
fn relative_to(root: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix(root).unwrap_or(path);
    strip_current_dir(relative).to_path_buf()
}

/// Drop leading `./` components.
fn strip_current_dir(path: &Path) -> &Path {
    let mut path = path;
    while let Some(Component::CurDir) = path.components().next() {
        path = path.strip_prefix(".").unwrap_or(path);
        if path.as_os_str().is_empty() {
            break;
        }
    }
    path
}

fn strip_current_dir_str(pattern: &str) -> &str {
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.trim_start_matches('/');
    }
    pattern
}
