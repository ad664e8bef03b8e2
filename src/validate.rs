//! Key checks for config files.
//!
//! Every key in a file must be the config file name of some option. A key
//! that names an option which exists but may only be set on the command line
//! is a [`SchemaViolation`](ConfigError::SchemaViolation) and fails
//! immediately; any other unrecognised keys are collected and reported
//! together, each with its file path and best-effort line number.

use std::path::Path;

use crate::error::{ConfigError, Layer};
use crate::schema::Schema;

pub(crate) fn check_keys(
    schema: &Schema,
    keys: &[&str],
    content: &str,
    path: &Path,
) -> Result<(), ConfigError> {
    let mut unknown = Vec::new();
    for &key in keys {
        if schema.by_cfg_name(key).is_some() {
            continue;
        }
        if let Some(meta) = schema.file_forbidden(key) {
            return Err(ConfigError::SchemaViolation {
                option: meta.name.to_string(),
                layer: Layer::File,
            });
        }
        unknown.push(ConfigError::UnknownKey {
            key: key.to_string(),
            path: path.to_path_buf(),
            line: find_key_line(content, key),
        });
    }
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::UnknownKeys(unknown))
    }
}

/// Find the 1-indexed line on which `dotted_key` is assigned.
///
/// Tracks `[section]` headers while scanning so `common.typo` is only matched
/// inside `[common]`. Quoted keys and inline tables are not handled.
/// Returns 0 if the key cannot be located.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let (section, leaf) = dotted_key.rsplit_once('.').unwrap_or(("", dotted_key));
    let mut current = String::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[')
            && !header.starts_with('[')
        {
            current = header
                .trim_end_matches(']')
                .split('.')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(".");
            continue;
        }
        if current == section
            && let Some(rest) = trimmed.strip_prefix(leaf)
            && rest.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
