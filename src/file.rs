//! Config file discovery and loading.
//!
//! # Discovery
//!
//! Each [`SearchPath`] resolves to one directory. Search paths are listed in
//! priority-ascending order (last = highest priority). Discovery checks
//! `{dir}/{file_name}` from the highest-priority end and stops at the first
//! file that exists; missing files are skipped, other I/O errors are
//! reported.
//!
//! # Loading
//!
//! The syntax is picked by extension: `*.toml` files are TOML, anything else
//! is read as INI. Both are flattened into dotted keys, so the INI file
//!
//! ```ini
//! cfg_only_int=12345
//!
//! [power2]
//! item=64
//! item=128
//! ```
//!
//! and the TOML file
//!
//! ```toml
//! cfg_only_int = 12345
//!
//! [power2]
//! item = [64, 128]
//! ```
//!
//! both yield the keys `cfg_only_int` and `power2.item`. In INI files a
//! list option takes one line per value; values are unquoted text handed to
//! the option's [`Scalar`](crate::Scalar) parser. Every key must match the
//! config file name of an option (see [`validate`](crate::validate)).

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};

use crate::error::ConfigError;
use crate::option::{BackendCell, ErasedOption};
use crate::schema::Schema;
use crate::types::SearchPath;
use crate::validate;

/// Values read from one config file, keyed by schema position.
#[derive(Default)]
pub(crate) struct FileLayer {
    pub path: Option<PathBuf>,
    pub cells: Vec<(usize, BackendCell)>,
}

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the
/// platform-specific config directory (e.g. `~/.config/{app_name}/` on Linux).
/// Returns `None` if the directory cannot be determined.
pub(crate) fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Find and read the highest-priority existing config file.
pub(crate) fn discover(
    search_paths: &[SearchPath],
    file_name: &str,
    app_name: &str,
) -> Result<Option<(PathBuf, String)>, ConfigError> {
    let dirs: Vec<PathBuf> = search_paths
        .iter()
        .filter_map(|sp| resolve_search_path(sp, app_name))
        .collect();
    first_existing(&dirs, file_name)
}

fn first_existing(
    dirs: &[PathBuf],
    file_name: &str,
) -> Result<Option<(PathBuf, String)>, ConfigError> {
    for dir in dirs.iter().rev() {
        let file_path = dir.join(file_name);
        match std::fs::read_to_string(&file_path) {
            Ok(content) => {
                tracing::debug!(path = %file_path.display(), "discovered config file");
                return Ok(Some((file_path, content)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::trace!(path = %file_path.display(), "no config file");
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: file_path,
                    source: e,
                });
            }
        }
    }
    Ok(None)
}

/// Read and parse the file at `path`. A missing file is an error.
pub(crate) fn load(path: &Path, schema: &Schema) -> Result<FileLayer, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(path, &content, schema)
}

/// Config file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Ini,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Ini,
        }
    }
}

/// Parse file `content` against the schema's file-enabled options.
pub(crate) fn parse(path: &Path, content: &str, schema: &Schema) -> Result<FileLayer, ConfigError> {
    match Format::of(path) {
        Format::Toml => parse_toml(path, content, schema),
        Format::Ini => parse_ini(path, content, schema),
    }
}

fn parse_toml(path: &Path, content: &str, schema: &Schema) -> Result<FileLayer, ConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| ConfigError::FileParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    flatten(&table, "", &mut entries);
    build_layer(path, content, schema, entries, |option, value| {
        option.cell_from_toml(value)
    })
}

fn parse_ini(path: &Path, content: &str, schema: &Schema) -> Result<FileLayer, ConfigError> {
    let opt = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(content, opt).map_err(|e| ConfigError::IniParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Repeated keys (even across repeated sections) collect in file order.
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();
    for (section, props) in ini.iter() {
        for (key, value) in props.iter() {
            let full = match section {
                Some(section) => format!("{section}.{key}"),
                None => key.to_string(),
            };
            match entries.iter_mut().find(|(k, _)| *k == full) {
                Some((_, values)) => values.push(value.to_string()),
                None => entries.push((full, vec![value.to_string()])),
            }
        }
    }
    build_layer(path, content, schema, entries, |option, texts| {
        option.cell_from_texts(texts)
    })
}

/// Check every key, then read each value with its option's parser.
fn build_layer<V>(
    path: &Path,
    content: &str,
    schema: &Schema,
    entries: Vec<(String, V)>,
    read: impl Fn(&dyn ErasedOption, &V) -> Result<BackendCell, String>,
) -> Result<FileLayer, ConfigError> {
    let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
    validate::check_keys(schema, &keys, content, path)?;

    let mut cells = Vec::with_capacity(entries.len());
    for (key, value) in &entries {
        let index = schema
            .by_cfg_name(key)
            .ok_or_else(|| ConfigError::Internal(format!("unchecked key '{key}'")))?;
        let cell = read(schema.options()[index].as_ref(), value).map_err(|reason| {
            ConfigError::InvalidFileValue {
                key: key.clone(),
                path: path.to_path_buf(),
                reason,
            }
        })?;
        tracing::trace!(key = %key, "read from file");
        cells.push((index, cell));
    }
    tracing::debug!(path = %path.display(), values = cells.len(), "loaded config file");
    Ok(FileLayer {
        path: Some(path.to_path_buf()),
        cells,
    })
}

/// Collect `(dotted.key, value)` pairs for every non-table value.
fn flatten<'a>(table: &'a toml::Table, prefix: &str, out: &mut Vec<(String, &'a toml::Value)>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten(inner, &full, out),
            other => out.push((full, other)),
        }
    }
}
